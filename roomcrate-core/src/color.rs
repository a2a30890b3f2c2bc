//! RGB colors

use serde::{Deserialize, Serialize};

/// An RGB color with channels in `[0, 1]`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Color {
    pub const WHITE: Color = Color { r: 1.0, g: 1.0, b: 1.0 };
    pub const BLACK: Color = Color { r: 0.0, g: 0.0, b: 0.0 };

    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// Build a color from a `0xRRGGBB` value
    pub fn from_hex(hex: u32) -> Self {
        Self {
            r: ((hex >> 16) & 0xff) as f32 / 255.0,
            g: ((hex >> 8) & 0xff) as f32 / 255.0,
            b: (hex & 0xff) as f32 / 255.0,
        }
    }

    pub fn to_hex(&self) -> u32 {
        let channel = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u32;
        (channel(self.r) << 16) | (channel(self.g) << 8) | channel(self.b)
    }

    /// Build a color from a three-element array, as found in legacy model files
    pub fn from_slice(values: &[f32]) -> Option<Self> {
        match values {
            [r, g, b, ..] => Some(Self::new(*r, *g, *b)),
            _ => None,
        }
    }

    /// Parse a CSS color: `#rgb`, `#rrggbb` or a basic named color
    pub fn parse_css(value: &str) -> Option<Self> {
        let value = value.trim();
        if let Some(hex) = value.strip_prefix('#') {
            return match hex.len() {
                3 => {
                    let expanded: String = hex.chars().flat_map(|c| [c, c]).collect();
                    u32::from_str_radix(&expanded, 16).ok().map(Self::from_hex)
                }
                6 => u32::from_str_radix(hex, 16).ok().map(Self::from_hex),
                _ => None,
            };
        }

        let hex = match value.to_ascii_lowercase().as_str() {
            "white" => 0xffffff,
            "black" => 0x000000,
            "red" => 0xff0000,
            "green" => 0x008000,
            "blue" => 0x0000ff,
            "gray" | "grey" => 0x808080,
            "beige" => 0xf5f5dc,
            "ivory" => 0xfffff0,
            _ => return None,
        };
        Some(Self::from_hex(hex))
    }

    pub fn to_array(&self) -> [f32; 3] {
        [self.r, self.g, self.b]
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::WHITE
    }
}

impl From<u32> for Color {
    fn from(hex: u32) -> Self {
        Self::from_hex(hex)
    }
}

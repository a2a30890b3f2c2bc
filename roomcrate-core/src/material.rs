//! Surface materials shared by the converter and the room scene

use serde::{Deserialize, Serialize};

use crate::color::Color;

/// Texture wrapping along one axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum WrapMode {
    #[default]
    ClampToEdge,
    Repeat,
    MirroredRepeat,
}

impl WrapMode {
    /// Parse the wrap names used by legacy model files
    pub fn from_legacy(name: &str) -> Self {
        match name {
            "repeat" => WrapMode::Repeat,
            "mirror" => WrapMode::MirroredRepeat,
            _ => WrapMode::ClampToEdge,
        }
    }
}

/// An image referenced by a material, resolved relative to the model file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextureRef {
    pub uri: String,
    pub wrap_s: WrapMode,
    pub wrap_t: WrapMode,
    pub repeat: [f32; 2],
}

impl TextureRef {
    pub fn new(uri: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            wrap_s: WrapMode::default(),
            wrap_t: WrapMode::default(),
            repeat: [1.0, 1.0],
        }
    }
}

/// A metallic-roughness surface description
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Material {
    pub name: Option<String>,
    pub color: Color,
    pub emissive: Color,
    pub metalness: f32,
    pub roughness: f32,
    pub opacity: f32,
    pub transparent: bool,
    pub double_sided: bool,
    pub map: Option<TextureRef>,
}

impl Material {
    /// A standard material as produced by the model converter
    pub fn standard(color: Color) -> Self {
        Self {
            name: None,
            color,
            emissive: Color::BLACK,
            metalness: 0.0,
            roughness: 0.9,
            opacity: 1.0,
            transparent: false,
            double_sided: false,
            map: None,
        }
    }

    /// A fully diffuse material, used for room geometry
    pub fn lambert(color: Color) -> Self {
        Self {
            roughness: 1.0,
            ..Self::standard(color)
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the opacity; anything below 1 turns on blending
    pub fn with_opacity(mut self, opacity: f32) -> Self {
        self.opacity = opacity.clamp(0.0, 1.0);
        self.transparent = self.opacity < 1.0;
        self
    }
}

impl Default for Material {
    fn default() -> Self {
        Self::standard(Color::WHITE)
    }
}

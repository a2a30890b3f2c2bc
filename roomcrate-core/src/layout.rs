//! Room layout data model
//!
//! Walls live on the ground plane as `(x, z)` segments, furniture is placed by
//! `(x, y)` where `y` maps onto the ground-plane `z` axis. All values are in
//! layout units; the scene crate divides them by its world scale.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::error::{Error, Result};

/// A point on the ground plane
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct FloorPoint {
    pub x: f64,
    pub z: f64,
}

impl FloorPoint {
    pub fn new(x: f64, z: f64) -> Self {
        Self { x, z }
    }

    pub fn distance_to(&self, other: &FloorPoint) -> f64 {
        ((other.x - self.x).powi(2) + (other.z - self.z).powi(2)).sqrt()
    }
}

/// A wall segment. Walls carry no thickness or material of their own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Wall {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub start: FloorPoint,
    pub end: FloorPoint,
}

impl Wall {
    pub fn new(start: FloorPoint, end: FloorPoint) -> Self {
        Self { id: None, start, end }
    }

    pub fn length(&self) -> f64 {
        self.start.distance_to(&self.end)
    }

    pub fn midpoint(&self) -> FloorPoint {
        FloorPoint::new(
            (self.start.x + self.end.x) / 2.0,
            (self.start.z + self.end.z) / 2.0,
        )
    }

    /// Direction of the segment measured from +X towards +Z
    pub fn angle(&self) -> f64 {
        (self.end.z - self.start.z).atan2(self.end.x - self.start.x)
    }
}

/// The geometry family a furniture item is drawn with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FurnitureKind {
    Sofa,
    Bed,
    Table,
    Chair,
    Other,
}

impl FurnitureKind {
    /// Resolve a kind from a display name, ignoring case
    pub fn from_name(name: &str) -> Self {
        match name.to_lowercase().as_str() {
            "sofa" => FurnitureKind::Sofa,
            "bed" => FurnitureKind::Bed,
            "table" => FurnitureKind::Table,
            "chair" => FurnitureKind::Chair,
            _ => FurnitureKind::Other,
        }
    }
}

/// A placed piece of furniture
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FurnitureItem {
    pub id: u64,
    pub name: String,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    /// Footprint depth; the item's vertical size comes from its kind
    pub height: f64,
    pub locked: bool,
    /// Rotation around the vertical axis in radians
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rotation: Option<f64>,
    /// CSS color overriding the kind's default color
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl FurnitureItem {
    pub fn new(id: u64, name: impl Into<String>, x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            id,
            name: name.into(),
            x,
            y,
            width,
            height,
            locked: false,
            rotation: None,
            color: None,
        }
    }

    pub fn kind(&self) -> FurnitureKind {
        FurnitureKind::from_name(&self.name)
    }
}

/// A furniture template offered by the editor's palette
#[derive(Debug, Clone, PartialEq)]
pub struct FurnitureType {
    pub name: &'static str,
    pub width: f64,
    pub height: f64,
}

/// Built-in furniture palette
pub const FURNITURE_TYPES: [FurnitureType; 4] = [
    FurnitureType { name: "Sofa", width: 160.0, height: 80.0 },
    FurnitureType { name: "Bed", width: 140.0, height: 200.0 },
    FurnitureType { name: "Table", width: 120.0, height: 120.0 },
    FurnitureType { name: "Chair", width: 60.0, height: 60.0 },
];

/// Look up a palette entry by name, ignoring case
pub fn furniture_type(name: &str) -> Option<&'static FurnitureType> {
    FURNITURE_TYPES
        .iter()
        .find(|t| t.name.eq_ignore_ascii_case(name))
}

/// Floor finishes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FloorMaterial {
    #[default]
    Hardwood,
    Carpet,
    Tile,
    Concrete,
    Marble,
}

impl FloorMaterial {
    pub const ALL: [FloorMaterial; 5] = [
        FloorMaterial::Hardwood,
        FloorMaterial::Carpet,
        FloorMaterial::Tile,
        FloorMaterial::Concrete,
        FloorMaterial::Marble,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FloorMaterial::Hardwood => "hardwood",
            FloorMaterial::Carpet => "carpet",
            FloorMaterial::Tile => "tile",
            FloorMaterial::Concrete => "concrete",
            FloorMaterial::Marble => "marble",
        }
    }
}

impl fmt::Display for FloorMaterial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FloorMaterial {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        FloorMaterial::ALL
            .iter()
            .copied()
            .find(|m| m.as_str() == s)
            .ok_or_else(|| Error::InvalidData(format!("unknown floor material: {}", s)))
    }
}

/// Which camera preset the editor shows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ViewMode {
    #[default]
    #[serde(rename = "3d")]
    Perspective,
    #[serde(rename = "floorplan")]
    Floorplan,
}

impl FromStr for ViewMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "3d" => Ok(ViewMode::Perspective),
            "floorplan" | "top" => Ok(ViewMode::Floorplan),
            other => Err(Error::InvalidData(format!("unknown view mode: {}", other))),
        }
    }
}

/// What pointer input does in the viewport
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InteractionMode {
    #[default]
    Select,
    MoveWalls,
    DrawWalls,
}

/// Everything that gets persisted for a room
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub walls: Vec<Wall>,
    pub furniture: Vec<FurnitureItem>,
    pub floor_material: FloorMaterial,
    pub wall_color: String,
}

pub const DEFAULT_WALL_COLOR: &str = "#ffffff";

impl Default for Project {
    fn default() -> Self {
        Self {
            walls: default_walls(),
            furniture: default_furniture(),
            floor_material: FloorMaterial::default(),
            wall_color: DEFAULT_WALL_COLOR.to_string(),
        }
    }
}

/// A closed 1000 x 1000 room centred on the origin
pub fn default_walls() -> Vec<Wall> {
    let corners = [
        FloorPoint::new(-500.0, -500.0),
        FloorPoint::new(500.0, -500.0),
        FloorPoint::new(500.0, 500.0),
        FloorPoint::new(-500.0, 500.0),
    ];
    (0..corners.len())
        .map(|i| Wall::new(corners[i], corners[(i + 1) % corners.len()]))
        .collect()
}

pub fn default_furniture() -> Vec<FurnitureItem> {
    vec![
        FurnitureItem::new(1, "Sofa", 0.0, -200.0, 160.0, 80.0),
        FurnitureItem::new(2, "Table", 0.0, 100.0, 120.0, 120.0),
        FurnitureItem::new(3, "Chair", -150.0, 100.0, 60.0, 60.0),
        FurnitureItem::new(4, "Chair", 150.0, 100.0, 60.0, 60.0),
        FurnitureItem::new(5, "Bed", 300.0, 0.0, 140.0, 200.0),
    ]
}

/// Allocate an id for a new item.
///
/// Ids are wall-clock milliseconds, bumped past the largest id already in use
/// so two items added within the same millisecond never collide.
pub fn next_furniture_id(existing: &[FurnitureItem]) -> u64 {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0);
    let max_existing = existing.iter().map(|item| item.id).max().unwrap_or(0);
    now.max(max_existing + 1)
}

/// Create an unlocked item, scattered near the origin unless a position is given
pub fn create_furniture_item(
    existing: &[FurnitureItem],
    name: &str,
    width: f64,
    height: f64,
    position: Option<(f64, f64)>,
) -> FurnitureItem {
    let (x, y) = position.unwrap_or_else(|| {
        let mut rng = rand::thread_rng();
        (rng.gen_range(-100.0..100.0), rng.gen_range(-100.0..100.0))
    });
    FurnitureItem::new(next_furniture_id(existing), name, x, y, width, height)
}

/// Blueprint item type codes used by the model catalogue
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogueItemType {
    Furniture = 0,
    Window = 6,
    Door = 7,
}

/// A prebuilt glTF model offered alongside the box furniture
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogueItem {
    pub name: &'static str,
    pub thumbnail: &'static str,
    pub model_url: &'static str,
    pub item_type: CatalogueItemType,
}

pub const CATALOGUE: [CatalogueItem; 5] = [
    CatalogueItem {
        name: "Closed Door 28×80",
        thumbnail: "/models/thumbnails/closed-door.png",
        model_url: "/models/closed-door28x80_baked.gltf",
        item_type: CatalogueItemType::Door,
    },
    CatalogueItem {
        name: "Open Door 28×80",
        thumbnail: "/models/thumbnails/open-door.png",
        model_url: "/models/open-door28x80_baked.gltf",
        item_type: CatalogueItemType::Door,
    },
    CatalogueItem {
        name: "Window 48×48",
        thumbnail: "/models/thumbnails/window-48x48.png",
        model_url: "/models/window48x48_baked.gltf",
        item_type: CatalogueItemType::Window,
    },
    CatalogueItem {
        name: "Sofa 2-Seater",
        thumbnail: "/models/thumbnails/sofa.png",
        model_url: "/models/sofa_baked.gltf",
        item_type: CatalogueItemType::Furniture,
    },
    CatalogueItem {
        name: "Dining Table 6-Seat",
        thumbnail: "/models/thumbnails/dining-table.png",
        model_url: "/models/dining-table_baked.gltf",
        item_type: CatalogueItemType::Furniture,
    },
];

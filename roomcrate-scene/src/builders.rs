//! Scene object builders for furniture, walls, the floor and lights
//!
//! Furniture is made of plain boxes sized from the item footprint; the vertical
//! proportions come from the furniture kind. Every part of an object shares one
//! material.

use crate::config::SceneConfig;
use roomcrate_core::{
    Color, FloorMaterial, FurnitureItem, FurnitureKind, Material, Point3f, Transform3D, TriangleMesh, Vector3f, Wall,
};

pub const LOCKED_COLOR: u32 = 0xff4444;
pub const SELECTED_COLOR: u32 = 0x3b82f6;

/// Chair legs sit this fraction of the footprint away from the centre
const CHAIR_LEG_SPREAD: f32 = 5.0 / 12.0;

/// Geometry of one object part, in part-local space
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Shape {
    /// Axis-aligned box centred on the part origin
    Box(Vector3f),
    /// Horizontal plane facing +Y, `(width, depth)`
    Plane(f32, f32),
}

impl Shape {
    pub fn to_mesh(&self) -> TriangleMesh {
        match *self {
            Shape::Box(size) => TriangleMesh::cuboid(size.x, size.y, size.z),
            Shape::Plane(width, depth) => TriangleMesh::plane(width, depth),
        }
    }
}

/// A shape placed inside its object
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Part {
    pub shape: Shape,
    pub offset: Vector3f,
}

impl Part {
    pub fn cuboid(width: f32, height: f32, depth: f32, offset: Vector3f) -> Self {
        Self {
            shape: Shape::Box(Vector3f::new(width, height, depth)),
            offset,
        }
    }

    /// Part-local to object-local
    pub fn transform(&self) -> Transform3D {
        Transform3D::translation(self.offset)
    }
}

/// What a scene object stands for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectTag {
    /// Tagged with the owning item id
    Furniture(u64),
    Wall(usize),
    Floor,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SceneObject {
    pub name: String,
    pub tag: ObjectTag,
    /// Object-local to world
    pub transform: Transform3D,
    pub parts: Vec<Part>,
    pub material: Material,
}

impl SceneObject {
    pub fn furniture_id(&self) -> Option<u64> {
        match self.tag {
            ObjectTag::Furniture(id) => Some(id),
            _ => None,
        }
    }

    /// All parts as one world-space mesh
    pub fn world_mesh(&self) -> TriangleMesh {
        use roomcrate_core::Transformable;

        let mut mesh = TriangleMesh::new();
        for part in &self.parts {
            let mut part_mesh = part.shape.to_mesh();
            part_mesh.transform(&self.transform.compose(part.transform()));
            mesh.append(&part_mesh, 0);
        }
        mesh
    }
}

/// Shadow camera settings for a directional light
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShadowSettings {
    pub map_size: u32,
    pub near: f32,
    pub far: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Light {
    Ambient {
        color: Color,
        intensity: f32,
    },
    Directional {
        color: Color,
        intensity: f32,
        position: Point3f,
        shadow: Option<ShadowSettings>,
    },
    Point {
        color: Color,
        intensity: f32,
        position: Point3f,
        range: f32,
    },
}

/// Flat reference grid on the floor, shown in the floorplan view
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridHelper {
    pub size: f32,
    pub divisions: u32,
}

/// The fixed lighting rig
pub fn default_lights() -> Vec<Light> {
    vec![
        Light::Ambient {
            color: Color::from_hex(0x404040),
            intensity: 0.6,
        },
        Light::Directional {
            color: Color::WHITE,
            intensity: 0.8,
            position: Point3f::new(20.0, 20.0, 10.0),
            shadow: Some(ShadowSettings {
                map_size: 2048,
                near: 0.5,
                far: 500.0,
            }),
        },
        Light::Point {
            color: Color::WHITE,
            intensity: 0.5,
            position: Point3f::new(10.0, 10.0, 10.0),
            range: 100.0,
        },
        Light::Point {
            color: Color::WHITE,
            intensity: 0.5,
            position: Point3f::new(-10.0, 10.0, -10.0),
            range: 100.0,
        },
    ]
}

/// Display color: locked beats selected beats the item's own color beats its kind
pub fn furniture_color(item: &FurnitureItem, selected: bool) -> Color {
    if item.locked {
        return Color::from_hex(LOCKED_COLOR);
    }
    if selected {
        return Color::from_hex(SELECTED_COLOR);
    }
    if let Some(color) = item.color.as_deref().and_then(Color::parse_css) {
        return color;
    }
    Color::from_hex(match item.kind() {
        FurnitureKind::Sofa | FurnitureKind::Chair => 0x8b5cf6,
        FurnitureKind::Bed => 0x654321,
        FurnitureKind::Table => 0x8b4513,
        FurnitureKind::Other => 0x888888,
    })
}

fn four_legs(size: Vector3f, spread_x: f32, spread_z: f32) -> impl Iterator<Item = Part> {
    [(-1.0, -1.0), (1.0, -1.0), (-1.0, 1.0), (1.0, 1.0)]
        .into_iter()
        .map(move |(sx, sz)| Part {
            shape: Shape::Box(size),
            offset: Vector3f::new(sx * spread_x, size.y / 2.0, sz * spread_z),
        })
}

/// Box parts for one item in object-local world units
pub fn furniture_parts(item: &FurnitureItem, config: &SceneConfig) -> Vec<Part> {
    let w = config.to_world(item.width);
    let d = config.to_world(item.height);

    match item.kind() {
        FurnitureKind::Table => {
            let mut parts = vec![Part::cuboid(w, 0.1, d, Vector3f::new(0.0, 0.75, 0.0))];
            parts.extend(four_legs(Vector3f::new(0.1, 0.75, 0.1), w / 2.0, d / 2.0));
            parts
        }
        FurnitureKind::Chair => {
            let mut parts = vec![
                Part::cuboid(w, 0.1, d, Vector3f::new(0.0, 0.45, 0.0)),
                Part::cuboid(w, 0.8, 0.1, Vector3f::new(0.0, 0.8, -d / 2.0)),
            ];
            parts.extend(four_legs(
                Vector3f::new(0.08, 0.45, 0.08),
                w * CHAIR_LEG_SPREAD,
                d * CHAIR_LEG_SPREAD,
            ));
            parts
        }
        kind => {
            let height = match kind {
                FurnitureKind::Sofa => 0.8,
                FurnitureKind::Bed => 0.6,
                _ => 0.5,
            };
            vec![Part::cuboid(w, height, d, Vector3f::new(0.0, height / 2.0, 0.0))]
        }
    }
}

pub fn build_furniture(item: &FurnitureItem, selected: bool, config: &SceneConfig) -> SceneObject {
    let position = Vector3f::new(config.to_world(item.x), 0.0, config.to_world(item.y));
    SceneObject {
        name: item.name.clone(),
        tag: ObjectTag::Furniture(item.id),
        transform: Transform3D::from_translation_yaw(position, item.rotation.unwrap_or(0.0) as f32),
        parts: furniture_parts(item, config),
        material: Material::lambert(furniture_color(item, selected)).with_name(item.name.clone()),
    }
}

/// A wall box centred on the segment midpoint and turned to run along it
pub fn build_wall(index: usize, wall: &Wall, color: Color, config: &SceneConfig) -> SceneObject {
    let mid = wall.midpoint();
    let position = Vector3f::new(config.to_world(mid.x), config.wall_height / 2.0, config.to_world(mid.z));
    SceneObject {
        name: wall.id.clone().unwrap_or_else(|| format!("wall-{}", index)),
        tag: ObjectTag::Wall(index),
        // positive yaw turns +X towards -Z, the segment angle is measured towards +Z
        transform: Transform3D::from_translation_yaw(position, -wall.angle() as f32),
        parts: vec![Part::cuboid(
            config.to_world(wall.length()),
            config.wall_height,
            config.wall_thickness,
            Vector3f::zeros(),
        )],
        material: Material::lambert(color).with_name("wall"),
    }
}

/// Color and opacity of each floor finish
pub fn floor_appearance(material: FloorMaterial) -> (Color, f32) {
    let (hex, opacity) = match material {
        FloorMaterial::Hardwood => (0x8b4513, 0.8),
        FloorMaterial::Carpet => (0x654321, 0.9),
        FloorMaterial::Tile => (0xcccccc, 0.8),
        FloorMaterial::Concrete => (0x666666, 0.8),
        FloorMaterial::Marble => (0xf5f5f5, 0.9),
    };
    (Color::from_hex(hex), opacity)
}

/// A translucent square floor plane
pub fn build_floor(material: FloorMaterial, config: &SceneConfig) -> SceneObject {
    let (color, opacity) = floor_appearance(material);
    SceneObject {
        name: "floor".to_string(),
        tag: ObjectTag::Floor,
        transform: Transform3D::identity(),
        parts: vec![Part {
            shape: Shape::Plane(config.floor_size, config.floor_size),
            offset: Vector3f::zeros(),
        }],
        material: Material::lambert(color)
            .with_name(format!("floor-{}", material))
            .with_opacity(opacity),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use roomcrate_core::{Drawable, FloorPoint};

    #[test]
    fn test_color_priority() {
        let mut chair = FurnitureItem::new(1, "Chair", 0.0, 0.0, 60.0, 60.0);
        assert_eq!(furniture_color(&chair, false).to_hex(), 0x8b5cf6);
        chair.color = Some("#00ff00".to_string());
        assert_eq!(furniture_color(&chair, false).to_hex(), 0x00ff00);
        assert_eq!(furniture_color(&chair, true).to_hex(), SELECTED_COLOR);
        chair.locked = true;
        assert_eq!(furniture_color(&chair, true).to_hex(), LOCKED_COLOR);

        let lamp = FurnitureItem::new(2, "Lamp", 0.0, 0.0, 30.0, 30.0);
        assert_eq!(furniture_color(&lamp, false).to_hex(), 0x888888);
        let bed = FurnitureItem::new(3, "bed", 0.0, 0.0, 140.0, 200.0);
        assert_eq!(furniture_color(&bed, false).to_hex(), 0x654321);
    }

    #[test]
    fn test_table_has_top_and_four_legs() {
        let config = SceneConfig::default();
        let table = FurnitureItem::new(1, "Table", 0.0, 0.0, 120.0, 100.0);
        let parts = furniture_parts(&table, &config);
        assert_eq!(parts.len(), 5);
        assert_eq!(parts[0].shape, Shape::Box(Vector3f::new(2.4, 0.1, 2.0)));
        assert_relative_eq!(parts[0].offset.y, 0.75);
        // legs at (+-width/100, 0.375, +-height/100)
        assert_relative_eq!(parts[4].offset, Vector3f::new(1.2, 0.375, 1.0), epsilon = 1e-6);
    }

    #[test]
    fn test_chair_back_and_leg_positions() {
        let config = SceneConfig::default();
        let chair = FurnitureItem::new(1, "Chair", 0.0, 0.0, 60.0, 60.0);
        let parts = furniture_parts(&chair, &config);
        assert_eq!(parts.len(), 6);
        assert_relative_eq!(parts[1].offset, Vector3f::new(0.0, 0.8, -0.6), epsilon = 1e-6);
        // (+-width/120, 0.225, +-height/120) in layout units
        assert_relative_eq!(parts[5].offset, Vector3f::new(0.5, 0.225, 0.5), epsilon = 1e-6);
    }

    #[test]
    fn test_single_box_kinds() {
        let config = SceneConfig::default();
        for (name, height) in [("Sofa", 0.8), ("Bed", 0.6), ("Bookshelf", 0.5)] {
            let item = FurnitureItem::new(1, name, 0.0, 0.0, 100.0, 50.0);
            let parts = furniture_parts(&item, &config);
            assert_eq!(parts.len(), 1);
            assert_eq!(parts[0].shape, Shape::Box(Vector3f::new(2.0, height, 1.0)));
            assert_relative_eq!(parts[0].offset.y, height / 2.0);
        }
    }

    #[test]
    fn test_furniture_sits_at_layout_position() {
        let config = SceneConfig::default();
        let sofa = FurnitureItem::new(9, "Sofa", 100.0, -50.0, 160.0, 80.0);
        let object = build_furniture(&sofa, false, &config);
        assert_eq!(object.furniture_id(), Some(9));

        let (min, max) = object.world_mesh().bounding_box();
        assert_relative_eq!(min, Point3f::new(0.4, 0.0, -1.8), epsilon = 1e-5);
        assert_relative_eq!(max, Point3f::new(3.6, 0.8, -0.2), epsilon = 1e-5);
    }

    #[test]
    fn test_diagonal_wall_follows_segment() {
        let config = SceneConfig::default();
        let wall = Wall::new(FloorPoint::new(0.0, 0.0), FloorPoint::new(150.0, 200.0));
        let object = build_wall(0, &wall, Color::WHITE, &config);
        let mesh = object.world_mesh();

        let (min, max) = mesh.bounding_box();
        assert_relative_eq!(min.y, 0.0, epsilon = 1e-5);
        assert_relative_eq!(max.y, 3.0, epsilon = 1e-5);

        // both end faces are centred on the segment endpoints
        let ends = [Point3f::new(0.0, 1.5, 0.0), Point3f::new(3.0, 1.5, 4.0)];
        for end in ends {
            let nearest = mesh
                .vertices
                .iter()
                .map(|v| (v - end).norm())
                .fold(f32::MAX, f32::min);
            // corners sit half the thickness and half the height away
            assert_relative_eq!(nearest, (0.1f32 * 0.1 + 1.5 * 1.5).sqrt(), epsilon = 1e-4);
        }
    }

    #[test]
    fn test_floor_appearance() {
        let config = SceneConfig::default();
        let floor = build_floor(FloorMaterial::Carpet, &config);
        assert_eq!(floor.material.color.to_hex(), 0x654321);
        assert_relative_eq!(floor.material.opacity, 0.9);
        assert!(floor.material.transparent);
        assert_eq!(floor.parts[0].shape, Shape::Plane(50.0, 50.0));
    }

    #[test]
    fn test_light_rig() {
        let lights = default_lights();
        assert_eq!(lights.len(), 4);
        assert!(matches!(
            lights[1],
            Light::Directional { shadow: Some(ShadowSettings { map_size: 2048, .. }), .. }
        ));
    }
}

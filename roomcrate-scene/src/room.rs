//! The room scene: everything a renderer needs to draw a layout

use crate::builders::{
    build_floor, build_furniture, build_wall, default_lights, GridHelper, Light, SceneObject, Shape,
};
use crate::config::SceneConfig;
use crate::picking::Ray;
use log::debug;
use roomcrate_core::{Color, FloorMaterial, FurnitureItem, Material, TriangleMesh, ViewMode, Wall};

/// A renderer-agnostic description of one room
#[derive(Debug, Clone)]
pub struct RoomScene {
    config: SceneConfig,
    view: ViewMode,
    pub background: Color,
    pub lights: Vec<Light>,
    pub grid: Option<GridHelper>,
    pub floor: SceneObject,
    pub walls: Vec<SceneObject>,
    pub furniture: Vec<SceneObject>,
}

impl RoomScene {
    /// An empty room with lights and a hardwood floor
    pub fn new(view: ViewMode, config: SceneConfig) -> Self {
        let grid = (view == ViewMode::Floorplan).then(|| GridHelper {
            size: config.floor_size,
            divisions: config.grid_divisions,
        });
        Self {
            background: config.background,
            lights: default_lights(),
            grid,
            floor: build_floor(FloorMaterial::default(), &config),
            walls: Vec::new(),
            furniture: Vec::new(),
            view,
            config,
        }
    }

    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    pub fn view(&self) -> ViewMode {
        self.view
    }

    /// Replace every wall object; an unparsable color falls back to the default wall color
    pub fn sync_walls(&mut self, walls: &[Wall], wall_color: &str) {
        let color = Color::parse_css(wall_color).unwrap_or(self.config.fallback_wall_color);
        self.walls = walls
            .iter()
            .enumerate()
            .map(|(i, wall)| build_wall(i, wall, color, &self.config))
            .collect();
        debug!("synced {} walls", self.walls.len());
    }

    /// Replace every furniture object
    pub fn sync_furniture(&mut self, furniture: &[FurnitureItem], selected: Option<u64>) {
        self.furniture = furniture
            .iter()
            .map(|item| build_furniture(item, selected == Some(item.id), &self.config))
            .collect();
        debug!("synced {} furniture items", self.furniture.len());
    }

    pub fn set_floor_material(&mut self, material: FloorMaterial) {
        self.floor = build_floor(material, &self.config);
    }

    pub fn furniture_object(&self, id: u64) -> Option<&SceneObject> {
        self.furniture.iter().find(|o| o.furniture_id() == Some(id))
    }

    /// Floor, then walls, then furniture
    pub fn objects(&self) -> impl Iterator<Item = &SceneObject> {
        std::iter::once(&self.floor).chain(&self.walls).chain(&self.furniture)
    }

    /// The item whose geometry the ray meets first. Walls and the floor never block.
    pub fn pick_furniture(&self, ray: &Ray) -> Option<u64> {
        let mut nearest: Option<(f32, u64)> = None;
        for object in &self.furniture {
            let Some(id) = object.furniture_id() else { continue };
            let Some(to_local) = object.transform.inverse() else { continue };
            let local = ray.transformed(&to_local);

            for part in &object.parts {
                let Shape::Box(size) = part.shape else { continue };
                let half = size / 2.0;
                let min = part.offset - half;
                let max = part.offset + half;
                if let Some(t) = local.intersect_box(&min.into(), &max.into()) {
                    if nearest.map_or(true, |(best, _)| t < best) {
                        nearest = Some((t, id));
                    }
                }
            }
        }
        nearest.map(|(_, id)| id)
    }

    /// Flatten every object into one world-space mesh.
    ///
    /// Faces are grouped per object; objects with identical materials share a
    /// material slot.
    pub fn bake(&self) -> (TriangleMesh, Vec<Material>) {
        let mut mesh = TriangleMesh::new();
        let mut materials: Vec<Material> = Vec::new();

        for object in self.objects() {
            let slot = match materials.iter().position(|m| *m == object.material) {
                Some(slot) => slot,
                None => {
                    materials.push(object.material.clone());
                    materials.len() - 1
                }
            };
            mesh.append(&object.world_mesh(), slot);
        }
        (mesh, materials)
    }
}

impl Default for RoomScene {
    fn default() -> Self {
        Self::new(ViewMode::default(), SceneConfig::default())
    }
}

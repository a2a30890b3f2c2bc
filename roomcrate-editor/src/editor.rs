//! Editor state and layout operations

use crate::config::EditorConfig;
use crate::pointer::Drag;
use log::{debug, info, warn};
use roomcrate_core::{
    create_furniture_item, FloorMaterial, FloorPoint, FurnitureItem, FurnitureType, InteractionMode, Project,
    ViewMode, Wall,
};
use roomcrate_io::{load_project, save_project, KeyValueStore};
use roomcrate_scene::{OrbitCamera, RoomScene, Viewport};
use std::fmt;

/// Sidebar tab shown next to the viewport
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SidebarTab {
    #[default]
    Walls,
    Design,
    Items,
}

/// Editable dimension of the selected item
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dimension {
    Width,
    Height,
    /// Writes the item height, which doubles as footprint depth
    Depth,
}

/// Dimension fields shown for the selected item
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ItemDimensions {
    pub width: f64,
    pub height: f64,
    pub depth: f64,
}

impl ItemDimensions {
    pub fn of(item: &FurnitureItem) -> Self {
        Self {
            width: item.width,
            height: item.height,
            depth: item.height,
        }
    }

    fn set(&mut self, dimension: Dimension, value: f64) {
        match dimension {
            Dimension::Width => self.width = value,
            Dimension::Height => self.height = value,
            Dimension::Depth => self.depth = value,
        }
    }
}

/// A partial furniture update; `None` fields are left alone
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FurnitureUpdate {
    pub name: Option<String>,
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub locked: Option<bool>,
    pub rotation: Option<f64>,
    pub color: Option<String>,
}

impl FurnitureUpdate {
    fn apply(self, item: &mut FurnitureItem) {
        if let Some(name) = self.name {
            item.name = name;
        }
        if let Some(x) = self.x {
            item.x = x;
        }
        if let Some(y) = self.y {
            item.y = y;
        }
        if let Some(width) = self.width {
            item.width = width;
        }
        if let Some(height) = self.height {
            item.height = height;
        }
        if let Some(locked) = self.locked {
            item.locked = locked;
        }
        if self.rotation.is_some() {
            item.rotation = self.rotation;
        }
        if self.color.is_some() {
            item.color = self.color;
        }
    }
}

/// User-facing outcome of a save or load
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Saved,
    SaveFailed(String),
    Loaded,
    NoSavedProject,
    LoadFailed(String),
}

impl Notice {
    pub fn message(&self) -> &'static str {
        match self {
            Notice::Saved => "Project saved successfully!",
            Notice::SaveFailed(_) => "Failed to save project. Please try again.",
            Notice::Loaded => "Project loaded successfully!",
            Notice::NoSavedProject => "No saved project found.",
            Notice::LoadFailed(_) => "Failed to load project. Please try again.",
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Notice::SaveFailed(_) | Notice::LoadFailed(_))
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// Leading-number parse: `"12.5cm"` is 12.5, anything unparsable is 0
pub fn parse_dimension(value: &str) -> f64 {
    let value = value.trim_start();
    let candidate: String = value
        .chars()
        .take_while(|c| c.is_ascii_digit() || matches!(c, '.' | '-' | '+' | 'e' | 'E'))
        .collect();
    (1..=candidate.len())
        .rev()
        .find_map(|end| candidate[..end].parse::<f64>().ok())
        .filter(|v| v.is_finite())
        .unwrap_or(0.0)
}

/// The room editor
#[derive(Debug, Clone)]
pub struct Editor {
    pub(crate) config: EditorConfig,
    pub(crate) walls: Vec<Wall>,
    pub(crate) furniture: Vec<FurnitureItem>,
    pub(crate) selected: Option<u64>,
    dimensions: ItemDimensions,
    floor_material: FloorMaterial,
    wall_color: String,
    view_mode: ViewMode,
    pub(crate) mode: InteractionMode,
    active_tab: SidebarTab,
    pub(crate) scene: RoomScene,
    pub(crate) camera: OrbitCamera,
    pub(crate) drag: Option<Drag>,
}

impl Editor {
    pub fn new(config: EditorConfig) -> Self {
        let project = if config.load_defaults {
            Project::default()
        } else {
            Project {
                walls: Vec::new(),
                furniture: Vec::new(),
                ..Project::default()
            }
        };
        let view_mode = ViewMode::default();
        let scene = RoomScene::new(view_mode, config.scene.clone());
        let camera = OrbitCamera::for_view(view_mode, config.viewport.aspect_ratio(), &config.scene);

        let mut editor = Self {
            walls: project.walls,
            furniture: project.furniture,
            selected: None,
            dimensions: ItemDimensions::default(),
            floor_material: project.floor_material,
            wall_color: project.wall_color,
            view_mode,
            mode: InteractionMode::default(),
            active_tab: SidebarTab::default(),
            scene,
            camera,
            drag: None,
            config,
        };
        editor.sync_scene();
        editor
    }

    pub fn walls(&self) -> &[Wall] {
        &self.walls
    }

    pub fn furniture(&self) -> &[FurnitureItem] {
        &self.furniture
    }

    pub fn item(&self, id: u64) -> Option<&FurnitureItem> {
        self.furniture.iter().find(|item| item.id == id)
    }

    fn item_mut(&mut self, id: u64) -> Option<&mut FurnitureItem> {
        self.furniture.iter_mut().find(|item| item.id == id)
    }

    pub fn selected_id(&self) -> Option<u64> {
        self.selected
    }

    pub fn selected_item(&self) -> Option<&FurnitureItem> {
        self.selected.and_then(|id| self.item(id))
    }

    pub fn dimensions(&self) -> ItemDimensions {
        self.dimensions
    }

    pub fn floor_material(&self) -> FloorMaterial {
        self.floor_material
    }

    pub fn wall_color(&self) -> &str {
        &self.wall_color
    }

    pub fn view_mode(&self) -> ViewMode {
        self.view_mode
    }

    pub fn mode(&self) -> InteractionMode {
        self.mode
    }

    pub fn active_tab(&self) -> SidebarTab {
        self.active_tab
    }

    pub fn set_active_tab(&mut self, tab: SidebarTab) {
        self.active_tab = tab;
    }

    pub fn scene(&self) -> &RoomScene {
        &self.scene
    }

    pub fn camera(&self) -> &OrbitCamera {
        &self.camera
    }

    pub fn viewport(&self) -> Viewport {
        self.config.viewport
    }

    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.config.viewport = viewport;
        self.camera.set_aspect_ratio(viewport.aspect_ratio());
    }

    /// Snapshot of everything that gets persisted
    pub fn project(&self) -> Project {
        Project {
            walls: self.walls.clone(),
            furniture: self.furniture.clone(),
            floor_material: self.floor_material,
            wall_color: self.wall_color.clone(),
        }
    }

    /// Replace the layout wholesale and clear the selection
    pub fn apply_project(&mut self, project: Project) {
        self.walls = project.walls;
        self.furniture = project.furniture;
        self.floor_material = project.floor_material;
        self.wall_color = project.wall_color;
        self.selected = None;
        self.drag = None;
        self.sync_scene();
    }

    pub(crate) fn sync_walls(&mut self) {
        self.scene.sync_walls(&self.walls, &self.wall_color);
    }

    pub(crate) fn sync_furniture(&mut self) {
        self.scene.sync_furniture(&self.furniture, self.selected);
    }

    fn sync_scene(&mut self) {
        self.scene.set_floor_material(self.floor_material);
        self.sync_walls();
        self.sync_furniture();
    }

    /// Add an item of the given type at a random spot near the origin
    pub fn add_furniture(&mut self, kind: &FurnitureType) -> u64 {
        let item = create_furniture_item(&self.furniture, kind.name, kind.width, kind.height, None);
        self.push_item(item)
    }

    pub fn add_furniture_at(&mut self, kind: &FurnitureType, x: f64, y: f64) -> u64 {
        let item = create_furniture_item(&self.furniture, kind.name, kind.width, kind.height, Some((x, y)));
        self.push_item(item)
    }

    fn push_item(&mut self, item: FurnitureItem) -> u64 {
        let id = item.id;
        debug!("adding {} #{} at ({:.1}, {:.1})", item.name, id, item.x, item.y);
        self.furniture.push(item);
        self.sync_furniture();
        id
    }

    /// Remove an item. Locked and unknown items are left alone.
    pub fn delete_furniture(&mut self, id: u64) -> bool {
        match self.item(id) {
            Some(item) if !item.locked => {}
            Some(_) => {
                debug!("item #{} is locked, not deleting", id);
                return false;
            }
            None => return false,
        }
        self.furniture.retain(|item| item.id != id);
        if self.selected == Some(id) {
            self.selected = None;
        }
        self.sync_furniture();
        true
    }

    pub fn delete_selected(&mut self) -> bool {
        match self.selected {
            Some(id) => self.delete_furniture(id),
            None => false,
        }
    }

    /// Merge `update` into an item regardless of its lock state
    pub fn update_furniture(&mut self, id: u64, update: FurnitureUpdate) -> bool {
        let Some(item) = self.item_mut(id) else {
            return false;
        };
        update.apply(item);
        if self.selected == Some(id) {
            if let Some(item) = self.item(id) {
                self.dimensions = ItemDimensions::of(item);
            }
        }
        self.sync_furniture();
        true
    }

    /// Flip the lock flag; returns the new state
    pub fn toggle_lock(&mut self, id: u64) -> Option<bool> {
        let item = self.item_mut(id)?;
        item.locked = !item.locked;
        let locked = item.locked;
        self.sync_furniture();
        Some(locked)
    }

    pub fn toggle_selected_lock(&mut self) -> Option<bool> {
        self.toggle_lock(self.selected?)
    }

    /// Select an item by id, or clear the selection
    pub fn select_item(&mut self, id: Option<u64>) {
        self.selected = id.filter(|id| self.item(*id).is_some());
        if let Some(item) = self.selected_item() {
            self.dimensions = ItemDimensions::of(item);
        }
        self.sync_furniture();
    }

    /// Resize the selected item. Does nothing without a selection or when it is locked.
    pub fn update_dimension(&mut self, dimension: Dimension, value: f64) -> bool {
        let Some(id) = self.selected else {
            return false;
        };
        let Some(item) = self.item_mut(id) else {
            return false;
        };
        if item.locked {
            return false;
        }
        match dimension {
            Dimension::Width => item.width = value,
            Dimension::Height | Dimension::Depth => item.height = value,
        }
        self.dimensions.set(dimension, value);
        self.sync_furniture();
        true
    }

    /// [`Self::update_dimension`] from form input text
    pub fn update_dimension_str(&mut self, dimension: Dimension, value: &str) -> bool {
        self.update_dimension(dimension, parse_dimension(value))
    }

    /// Move an item in layout units. Locked items stay put.
    pub fn move_item(&mut self, id: u64, x: f64, y: f64) -> bool {
        match self.item_mut(id) {
            Some(item) if !item.locked => {
                item.x = x;
                item.y = y;
            }
            _ => return false,
        }
        self.sync_furniture();
        true
    }

    /// Add a wall segment; zero-length segments are ignored
    pub fn add_wall(&mut self, start: FloorPoint, end: FloorPoint) -> bool {
        if start.distance_to(&end) < 1e-9 {
            return false;
        }
        self.walls.push(Wall::new(start, end));
        self.sync_walls();
        true
    }

    pub fn set_floor_material(&mut self, material: FloorMaterial) {
        self.floor_material = material;
        self.scene.set_floor_material(material);
    }

    pub fn set_wall_color(&mut self, color: impl Into<String>) {
        self.wall_color = color.into();
        self.sync_walls();
    }

    /// Switch views; the scene and the camera are rebuilt from their presets
    pub fn set_view_mode(&mut self, view: ViewMode) {
        self.view_mode = view;
        self.scene = RoomScene::new(view, self.config.scene.clone());
        self.camera = OrbitCamera::for_view(view, self.config.viewport.aspect_ratio(), &self.config.scene);
        self.drag = None;
        self.sync_scene();
    }

    pub fn set_mode(&mut self, mode: InteractionMode) {
        self.mode = mode;
        self.drag = None;
    }

    /// Back to the sample room
    pub fn reset_layout(&mut self) {
        self.apply_project(Project::default());
    }

    pub fn save_project(&self, store: &mut dyn KeyValueStore) -> Notice {
        match save_project(store, &self.project()) {
            Ok(()) => Notice::Saved,
            Err(e) => {
                warn!("saving project failed: {}", e);
                Notice::SaveFailed(e.to_string())
            }
        }
    }

    pub fn load_project(&mut self, store: &dyn KeyValueStore) -> Notice {
        match load_project(store) {
            Ok(Some(project)) => {
                self.apply_project(project);
                info!("loaded project with {} furniture items", self.furniture.len());
                Notice::Loaded
            }
            Ok(None) => Notice::NoSavedProject,
            Err(e) => {
                warn!("loading project failed: {}", e);
                Notice::LoadFailed(e.to_string())
            }
        }
    }
}

impl Default for Editor {
    fn default() -> Self {
        Self::new(EditorConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use roomcrate_core::{furniture_type, FURNITURE_TYPES};
    use roomcrate_io::{IoError, MemoryStore};

    struct BrokenStore;

    impl KeyValueStore for BrokenStore {
        fn get(&self, _key: &str) -> Result<Option<String>, IoError> {
            Err(IoError::Io(std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied")))
        }

        fn set(&mut self, _key: &str, _value: &str) -> Result<(), IoError> {
            Err(IoError::Io(std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied")))
        }

        fn remove(&mut self, _key: &str) -> Result<(), IoError> {
            Ok(())
        }
    }

    #[test]
    fn test_starts_with_sample_room() {
        let editor = Editor::default();
        assert_eq!(editor.walls().len(), 4);
        assert_eq!(editor.furniture().len(), 5);
        assert_eq!(editor.scene().furniture.len(), 5);
        assert_eq!(editor.scene().walls.len(), 4);
        assert_eq!(editor.floor_material(), FloorMaterial::Hardwood);
        assert_eq!(editor.wall_color(), "#ffffff");
        assert_eq!(editor.mode(), InteractionMode::Select);
        assert_eq!(editor.view_mode(), ViewMode::Perspective);
        assert_eq!(editor.active_tab(), SidebarTab::Walls);

        let empty = Editor::new(EditorConfig::empty());
        assert!(empty.walls().is_empty());
        assert!(empty.scene().furniture.is_empty());
    }

    #[test]
    fn test_add_furniture_uses_type_size_and_fresh_id() {
        let mut editor = Editor::default();
        let id = editor.add_furniture(&FURNITURE_TYPES[1]);
        let bed = editor.item(id).unwrap();
        assert_eq!((bed.name.as_str(), bed.width, bed.height), ("Bed", 140.0, 200.0));
        assert!(!bed.locked);
        assert!((-100.0..100.0).contains(&bed.x) && (-100.0..100.0).contains(&bed.y));
        assert!(id > 5);

        let chair = furniture_type("chair").unwrap();
        let second = editor.add_furniture_at(chair, 10.0, 20.0);
        assert!(second > id);
        assert_eq!(editor.item(second).map(|i| (i.x, i.y)), Some((10.0, 20.0)));
        assert_eq!(editor.scene().furniture.len(), 7);
    }

    #[test]
    fn test_locked_item_cannot_be_deleted() {
        let mut editor = Editor::default();
        editor.select_item(Some(1));
        assert_eq!(editor.toggle_selected_lock(), Some(true));

        let before = editor.furniture().to_vec();
        assert!(!editor.delete_furniture(1));
        assert!(!editor.delete_selected());
        assert_eq!(editor.furniture(), &before[..]);
        assert_eq!(editor.selected_id(), Some(1));
        assert_eq!(editor.scene().furniture_object(1).unwrap().material.color.to_hex(), 0xff4444);
    }

    #[test]
    fn test_delete_clears_selection() {
        let mut editor = Editor::default();
        editor.select_item(Some(2));
        assert!(editor.delete_selected());
        assert_eq!(editor.selected_id(), None);
        assert!(editor.item(2).is_none());
        assert!(editor.scene().furniture_object(2).is_none());
        assert!(!editor.delete_furniture(2));
    }

    #[test]
    fn test_toggle_lock_twice_restores() {
        let mut editor = Editor::default();
        let before = editor.project();
        assert_eq!(editor.toggle_lock(3), Some(true));
        assert_eq!(editor.toggle_lock(3), Some(false));
        assert_eq!(editor.project(), before);
        assert_eq!(editor.toggle_lock(999), None);
    }

    #[test]
    fn test_selection_refreshes_dimensions() {
        let mut editor = Editor::default();
        editor.select_item(Some(5));
        assert_eq!(
            editor.dimensions(),
            ItemDimensions { width: 140.0, height: 200.0, depth: 200.0 }
        );
        assert_eq!(editor.scene().furniture_object(5).unwrap().material.color.to_hex(), 0x3b82f6);

        editor.select_item(Some(12345));
        assert_eq!(editor.selected_id(), None);
    }

    #[test]
    fn test_dimension_edits() {
        let mut editor = Editor::default();
        assert!(!editor.update_dimension(Dimension::Width, 10.0));

        editor.select_item(Some(2));
        assert!(editor.update_dimension(Dimension::Width, 150.0));
        assert!(editor.update_dimension(Dimension::Depth, 90.0));
        let table = editor.item(2).unwrap();
        assert_eq!((table.width, table.height), (150.0, 90.0));
        assert_eq!(editor.dimensions().depth, 90.0);
        assert_eq!(editor.dimensions().height, 120.0);

        assert!(editor.update_dimension_str(Dimension::Height, "75.5cm"));
        assert_eq!(editor.item(2).unwrap().height, 75.5);
        assert!(editor.update_dimension_str(Dimension::Width, "wide"));
        assert_eq!(editor.item(2).unwrap().width, 0.0);

        editor.toggle_selected_lock();
        assert!(!editor.update_dimension(Dimension::Width, 50.0));
        assert_eq!(editor.item(2).unwrap().width, 0.0);
    }

    #[test]
    fn test_parse_dimension() {
        assert_eq!(parse_dimension("42"), 42.0);
        assert_eq!(parse_dimension("  -3.5e1 units"), -35.0);
        assert_eq!(parse_dimension("1e"), 1.0);
        assert_eq!(parse_dimension(""), 0.0);
        assert_eq!(parse_dimension("abc"), 0.0);
    }

    #[test]
    fn test_move_and_update() {
        let mut editor = Editor::default();
        assert!(editor.move_item(4, 10.0, -10.0));
        assert_eq!(editor.item(4).map(|i| (i.x, i.y)), Some((10.0, -10.0)));

        editor.toggle_lock(4);
        assert!(!editor.move_item(4, 0.0, 0.0));
        assert_eq!(editor.item(4).map(|i| (i.x, i.y)), Some((10.0, -10.0)));

        let update = FurnitureUpdate {
            rotation: Some(0.5),
            color: Some("#00ff00".to_string()),
            locked: Some(false),
            ..FurnitureUpdate::default()
        };
        assert!(editor.update_furniture(4, update));
        let chair = editor.item(4).unwrap();
        assert_eq!(chair.rotation, Some(0.5));
        assert!(!chair.locked);
        assert_eq!(editor.scene().furniture_object(4).unwrap().material.color.to_hex(), 0x00ff00);
        assert!(!editor.update_furniture(77, FurnitureUpdate::default()));
    }

    #[test]
    fn test_walls_and_finishes() {
        let mut editor = Editor::default();
        assert!(editor.add_wall(FloorPoint::new(0.0, 0.0), FloorPoint::new(0.0, 200.0)));
        assert!(!editor.add_wall(FloorPoint::new(5.0, 5.0), FloorPoint::new(5.0, 5.0)));
        assert_eq!(editor.scene().walls.len(), 5);

        editor.set_wall_color("#123456");
        assert!(editor.scene().walls.iter().all(|w| w.material.color.to_hex() == 0x123456));

        editor.set_floor_material(FloorMaterial::Tile);
        assert_eq!(editor.scene().floor.material.color.to_hex(), 0xcccccc);

        editor.set_view_mode(ViewMode::Floorplan);
        assert!(editor.scene().grid.is_some());
        assert_eq!(editor.scene().walls.len(), 5);
        assert_eq!(editor.scene().floor.material.color.to_hex(), 0xcccccc);
        assert_eq!(editor.camera().position.y, 50.0);

        editor.reset_layout();
        assert_eq!(editor.walls().len(), 4);
        assert_eq!(editor.floor_material(), FloorMaterial::Hardwood);
        assert_eq!(editor.wall_color(), "#ffffff");
    }

    #[test]
    fn test_save_and_load_notices() {
        let mut store = MemoryStore::new();
        let mut editor = Editor::default();
        assert_eq!(editor.load_project(&store), Notice::NoSavedProject);

        editor.set_floor_material(FloorMaterial::Concrete);
        editor.set_wall_color("#abcdef");
        editor.delete_furniture(5);
        let saved = editor.project();
        assert_eq!(editor.save_project(&mut store), Notice::Saved);

        let mut other = Editor::new(EditorConfig::empty());
        other.select_item(None);
        let notice = other.load_project(&store);
        assert_eq!(notice, Notice::Loaded);
        assert_eq!(notice.to_string(), "Project loaded successfully!");
        assert_eq!(other.project(), saved);
        assert_eq!(other.selected_id(), None);
        assert_eq!(other.scene().furniture.len(), 4);
    }

    #[test]
    fn test_load_clears_selection_and_reports_store_failures() {
        let mut store = MemoryStore::new();
        let mut editor = Editor::default();
        editor.save_project(&mut store);
        editor.select_item(Some(1));
        editor.load_project(&store);
        assert_eq!(editor.selected_id(), None);

        let mut broken = BrokenStore;
        let saved = editor.save_project(&mut broken);
        assert!(matches!(saved, Notice::SaveFailed(_)));
        assert!(saved.is_error());
        assert!(matches!(editor.load_project(&broken), Notice::LoadFailed(_)));
        assert_eq!(editor.furniture().len(), 5);
    }
}

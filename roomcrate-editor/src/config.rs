//! Editor configuration

use roomcrate_scene::{SceneConfig, Viewport};

#[derive(Debug, Clone, PartialEq)]
pub struct EditorConfig {
    pub scene: SceneConfig,
    /// Start with the sample room instead of an empty one
    pub load_defaults: bool,
    /// How close, in layout units, a press must be to grab a wall endpoint
    pub wall_snap_distance: f64,
    pub viewport: Viewport,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            scene: SceneConfig::default(),
            load_defaults: true,
            wall_snap_distance: 25.0,
            viewport: Viewport::default(),
        }
    }
}

impl EditorConfig {
    /// An editor with no walls or furniture
    pub fn empty() -> Self {
        Self {
            load_defaults: false,
            ..Self::default()
        }
    }
}

//! Scene configuration

use roomcrate_core::{Color, Point3f, ViewMode};
use serde::{Deserialize, Serialize};

/// Dimensions, colors and camera behavior for a room scene
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneConfig {
    /// Layout units per world unit
    pub world_scale: f32,
    pub wall_height: f32,
    pub wall_thickness: f32,
    /// Used when the project wall color cannot be parsed
    pub fallback_wall_color: Color,
    /// Edge length of the square floor plane
    pub floor_size: f32,
    pub grid_divisions: u32,
    pub background: Color,
    /// Vertical field of view in degrees
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
    pub perspective_position: Point3f,
    pub floorplan_position: Point3f,
    /// Radians per pixel of pointer drag
    pub orbit_speed: f32,
    /// Polar angle kept between this and `PI - min_polar_angle`
    pub min_polar_angle: f32,
    pub zoom_out_factor: f32,
    pub zoom_in_factor: f32,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            world_scale: 50.0,
            wall_height: 3.0,
            wall_thickness: 0.2,
            fallback_wall_color: Color::from_hex(0xeeeeee),
            floor_size: 50.0,
            grid_divisions: 50,
            background: Color::from_hex(0xf5f5f5),
            fov_degrees: 75.0,
            near: 0.1,
            far: 1000.0,
            perspective_position: Point3f::new(15.0, 15.0, 15.0),
            floorplan_position: Point3f::new(0.0, 50.0, 0.0),
            orbit_speed: 0.01,
            min_polar_angle: 0.1,
            zoom_out_factor: 1.1,
            zoom_in_factor: 0.9,
        }
    }
}

impl SceneConfig {
    /// Where the camera starts for a view mode
    pub fn camera_position(&self, view: ViewMode) -> Point3f {
        match view {
            ViewMode::Perspective => self.perspective_position,
            ViewMode::Floorplan => self.floorplan_position,
        }
    }

    /// Convert a layout length to world units
    pub fn to_world(&self, layout: f64) -> f32 {
        (layout / self.world_scale as f64) as f32
    }

    /// Convert a world length back to layout units
    pub fn to_layout(&self, world: f32) -> f64 {
        world as f64 * self.world_scale as f64
    }
}

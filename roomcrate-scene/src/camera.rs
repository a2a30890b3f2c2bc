//! Orbit camera for the room views

use crate::config::SceneConfig;
use crate::picking::Ray;
use nalgebra::{Matrix4, Perspective3, Point3, Vector3};
use roomcrate_core::ViewMode;

/// A perspective camera orbiting the origin
#[derive(Debug, Clone, PartialEq)]
pub struct OrbitCamera {
    pub position: Point3<f32>,
    pub target: Point3<f32>,
    pub up: Vector3<f32>,
    /// Vertical field of view in radians
    pub fov: f32,
    pub aspect_ratio: f32,
    pub near: f32,
    pub far: f32,
    pub view: ViewMode,
    orbit_speed: f32,
    min_polar_angle: f32,
    zoom_out_factor: f32,
    zoom_in_factor: f32,
}

impl OrbitCamera {
    /// The preset camera for a view mode
    pub fn for_view(view: ViewMode, aspect_ratio: f32, config: &SceneConfig) -> Self {
        Self {
            position: config.camera_position(view),
            target: Point3::origin(),
            up: Vector3::y(),
            fov: config.fov_degrees.to_radians(),
            aspect_ratio,
            near: config.near,
            far: config.far,
            view,
            orbit_speed: config.orbit_speed,
            min_polar_angle: config.min_polar_angle,
            zoom_out_factor: config.zoom_out_factor,
            zoom_in_factor: config.zoom_in_factor,
        }
    }

    pub fn set_aspect_ratio(&mut self, aspect_ratio: f32) {
        if aspect_ratio.is_finite() && aspect_ratio > 0.0 {
            self.aspect_ratio = aspect_ratio;
        }
    }

    fn forward(&self) -> Vector3<f32> {
        (self.target - self.position)
            .try_normalize(f32::EPSILON)
            .unwrap_or(-Vector3::z())
    }

    /// The up vector actually used; looking straight down falls back to -Z
    pub fn effective_up(&self) -> Vector3<f32> {
        if self.forward().cross(&self.up).norm() < 1e-6 {
            -Vector3::z()
        } else {
            self.up
        }
    }

    /// Get the view matrix
    pub fn view_matrix(&self) -> Matrix4<f32> {
        Matrix4::look_at_rh(&self.position, &self.target, &self.effective_up())
    }

    /// Get the projection matrix
    pub fn projection_matrix(&self) -> Matrix4<f32> {
        let perspective = Perspective3::new(self.aspect_ratio, self.fov, self.near, self.far);
        perspective.into_inner()
    }

    /// Rotate around the target by a pointer drag in pixels.
    ///
    /// Spherical coordinates with the polar angle measured from +Y and the
    /// azimuth from +Z towards +X. Ignored in the floorplan view.
    pub fn orbit(&mut self, dx: f32, dy: f32) {
        if self.view == ViewMode::Floorplan {
            return;
        }
        let offset = self.position - self.target;
        let radius = offset.norm();
        if radius <= f32::EPSILON {
            return;
        }

        let theta = offset.x.atan2(offset.z) - dx * self.orbit_speed;
        let phi = ((offset.y / radius).clamp(-1.0, 1.0).acos() + dy * self.orbit_speed)
            .clamp(self.min_polar_angle, std::f32::consts::PI - self.min_polar_angle);

        self.position = self.target
            + Vector3::new(
                radius * phi.sin() * theta.sin(),
                radius * phi.cos(),
                radius * phi.sin() * theta.cos(),
            );
    }

    /// Wheel zoom: scroll down moves away, scroll up moves closer
    pub fn zoom(&mut self, delta_y: f32) {
        if self.view == ViewMode::Floorplan {
            return;
        }
        let factor = if delta_y > 0.0 { self.zoom_out_factor } else { self.zoom_in_factor };
        self.position = Point3::from(self.position.coords * factor);
    }

    pub fn distance(&self) -> f32 {
        (self.position - self.target).norm()
    }

    /// Normalized device coordinates of a world point, `None` behind the camera
    pub fn project_point(&self, point: &Point3<f32>) -> Option<(f32, f32)> {
        let clip = self.projection_matrix() * self.view_matrix() * point.to_homogeneous();
        if clip.w <= f32::EPSILON {
            return None;
        }
        Some((clip.x / clip.w, clip.y / clip.w))
    }

    /// Ray through a point given in normalized device coordinates
    pub fn ray_from_ndc(&self, ndc_x: f32, ndc_y: f32) -> Ray {
        let forward = self.forward();
        let right = forward.cross(&self.effective_up()).normalize();
        let up = right.cross(&forward);
        let half_height = (self.fov / 2.0).tan();
        let direction = forward + right * (ndc_x * half_height * self.aspect_ratio) + up * (ndc_y * half_height);
        Ray::new(self.position, direction)
    }
}

impl Default for OrbitCamera {
    fn default() -> Self {
        Self::for_view(ViewMode::Perspective, 16.0 / 9.0, &SceneConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_presets() {
        let config = SceneConfig::default();
        let camera = OrbitCamera::for_view(ViewMode::Perspective, 1.5, &config);
        assert_eq!(camera.position, Point3::new(15.0, 15.0, 15.0));
        assert_relative_eq!(camera.fov, 75f32.to_radians());

        let top = OrbitCamera::for_view(ViewMode::Floorplan, 1.5, &config);
        assert_eq!(top.position, Point3::new(0.0, 50.0, 0.0));
        assert_eq!(top.effective_up(), -Vector3::z());
        assert!(top.view_matrix().iter().all(|v| v.is_finite()));
    }

    #[test]
    fn test_orbit_keeps_radius_and_clamps_polar_angle() {
        let mut camera = OrbitCamera::default();
        let radius = camera.distance();

        camera.orbit(30.0, 0.0);
        assert_relative_eq!(camera.distance(), radius, epsilon = 1e-3);
        assert_relative_eq!(camera.position.y, 15.0, epsilon = 1e-3);

        camera.orbit(0.0, -10_000.0);
        let polar = (camera.position.y / camera.distance()).acos();
        assert_relative_eq!(polar, 0.1, epsilon = 1e-4);

        camera.orbit(0.0, 10_000.0);
        let polar = (camera.position.y / camera.distance()).acos();
        assert_relative_eq!(polar, std::f32::consts::PI - 0.1, epsilon = 1e-4);
    }

    #[test]
    fn test_drag_right_turns_azimuth_negative() {
        let mut camera = OrbitCamera::default();
        let before = camera.position.x.atan2(camera.position.z);
        camera.orbit(10.0, 0.0);
        let after = camera.position.x.atan2(camera.position.z);
        assert_relative_eq!(after, before - 0.1, epsilon = 1e-5);
    }

    #[test]
    fn test_zoom_scales_position() {
        let mut camera = OrbitCamera::default();
        camera.zoom(120.0);
        assert_relative_eq!(camera.position.x, 16.5, epsilon = 1e-4);
        camera.zoom(-120.0);
        assert_relative_eq!(camera.position.x, 14.85, epsilon = 1e-4);
    }

    #[test]
    fn test_floorplan_ignores_orbit_and_zoom() {
        let mut camera = OrbitCamera::for_view(ViewMode::Floorplan, 1.0, &SceneConfig::default());
        let start = camera.position;
        camera.orbit(50.0, 50.0);
        camera.zoom(1.0);
        assert_eq!(camera.position, start);
    }

    #[test]
    fn test_projection_and_rays_agree() {
        let config = SceneConfig::default();
        for view in [ViewMode::Perspective, ViewMode::Floorplan] {
            let camera = OrbitCamera::for_view(view, 4.0 / 3.0, &config);
            let point = Point3::new(3.0, 0.5, -2.0);
            let (x, y) = camera.project_point(&point).unwrap();
            let ray = camera.ray_from_ndc(x, y);
            let to_point = (point - ray.origin).normalize();
            assert_relative_eq!(ray.direction, to_point, epsilon = 1e-4);
        }
    }

    #[test]
    fn test_center_ray_points_at_target() {
        let camera = OrbitCamera::default();
        let ray = camera.ray_from_ndc(0.0, 0.0);
        let expected = (camera.target - camera.position).normalize();
        assert_relative_eq!(ray.direction, expected, epsilon = 1e-6);

        // top of the screen in the floorplan view is -Z
        let top = OrbitCamera::for_view(ViewMode::Floorplan, 1.0, &SceneConfig::default());
        let ray = top.ray_from_ndc(0.0, 1.0);
        assert!(ray.direction.z < 0.0);
        let right = top.ray_from_ndc(1.0, 0.0);
        assert!(right.direction.x > 0.0);
    }
}

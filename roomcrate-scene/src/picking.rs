//! Rays, viewport mapping and intersection tests

use roomcrate_core::{FloorPoint, Point3f, Transform3D, Vector3f};

/// A half-line with a unit direction
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Point3f,
    pub direction: Vector3f,
}

impl Ray {
    pub fn new(origin: Point3f, direction: Vector3f) -> Self {
        Self {
            origin,
            direction: direction.try_normalize(f32::EPSILON).unwrap_or(-Vector3f::y()),
        }
    }

    pub fn at(&self, t: f32) -> Point3f {
        self.origin + self.direction * t
    }

    /// Move the ray into another space.
    ///
    /// The direction is not renormalized, so distances along rigid transforms
    /// stay comparable with the original ray.
    pub fn transformed(&self, transform: &Transform3D) -> Ray {
        Ray {
            origin: transform.transform_point(&self.origin),
            direction: transform.transform_vector(&self.direction),
        }
    }

    /// Slab test against an axis-aligned box; the nearest non-negative hit distance
    pub fn intersect_box(&self, min: &Point3f, max: &Point3f) -> Option<f32> {
        let mut t_near = 0.0f32;
        let mut t_far = f32::INFINITY;

        for axis in 0..3 {
            let origin = self.origin[axis];
            let direction = self.direction[axis];
            if direction.abs() < f32::EPSILON {
                if origin < min[axis] || origin > max[axis] {
                    return None;
                }
                continue;
            }
            let inv = 1.0 / direction;
            let mut t0 = (min[axis] - origin) * inv;
            let mut t1 = (max[axis] - origin) * inv;
            if t0 > t1 {
                std::mem::swap(&mut t0, &mut t1);
            }
            t_near = t_near.max(t0);
            t_far = t_far.min(t1);
            if t_near > t_far {
                return None;
            }
        }
        Some(t_near)
    }

    /// Where the ray meets the horizontal plane `y = height`
    pub fn intersect_ground(&self, height: f32) -> Option<Point3f> {
        if self.direction.y.abs() < f32::EPSILON {
            return None;
        }
        let t = (height - self.origin.y) / self.direction.y;
        (t >= 0.0).then(|| self.at(t))
    }
}

/// The on-screen rectangle a scene is drawn into, in client pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(left: f32, top: f32, width: f32, height: f32) -> Self {
        Self { left, top, width, height }
    }

    /// Client coordinates to normalized device coordinates, +Y up
    pub fn to_ndc(&self, client_x: f32, client_y: f32) -> (f32, f32) {
        let width = self.width.max(1.0);
        let height = self.height.max(1.0);
        (
            (client_x - self.left) / width * 2.0 - 1.0,
            -(client_y - self.top) / height * 2.0 + 1.0,
        )
    }

    /// Normalized device coordinates back to client coordinates
    pub fn from_ndc(&self, ndc_x: f32, ndc_y: f32) -> (f32, f32) {
        (
            self.left + (ndc_x + 1.0) / 2.0 * self.width,
            self.top + (1.0 - ndc_y) / 2.0 * self.height,
        )
    }

    pub fn aspect_ratio(&self) -> f32 {
        if self.height > 0.0 {
            self.width / self.height
        } else {
            1.0
        }
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(0.0, 0.0, 800.0, 600.0)
    }
}

/// World position on the ground plane back to layout units
pub fn world_to_floor(point: &Point3f, world_scale: f32) -> FloorPoint {
    FloorPoint::new(point.x as f64 * world_scale as f64, point.z as f64 * world_scale as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_viewport_ndc() {
        let viewport = Viewport::new(100.0, 50.0, 400.0, 200.0);
        assert_eq!(viewport.to_ndc(100.0, 50.0), (-1.0, 1.0));
        assert_eq!(viewport.to_ndc(300.0, 150.0), (0.0, 0.0));
        assert_eq!(viewport.to_ndc(500.0, 250.0), (1.0, -1.0));
        assert_eq!(viewport.aspect_ratio(), 2.0);
        assert_eq!(viewport.from_ndc(0.5, -0.5), (400.0, 200.0));
    }

    #[test]
    fn test_box_hits_and_misses() {
        let min = Point3f::new(-1.0, -1.0, -1.0);
        let max = Point3f::new(1.0, 1.0, 1.0);

        let ray = Ray::new(Point3f::new(0.0, 0.0, 5.0), -Vector3f::z());
        assert_relative_eq!(ray.intersect_box(&min, &max).unwrap(), 4.0);

        let miss = Ray::new(Point3f::new(3.0, 0.0, 5.0), -Vector3f::z());
        assert!(miss.intersect_box(&min, &max).is_none());

        let behind = Ray::new(Point3f::new(0.0, 0.0, 5.0), Vector3f::z());
        assert!(behind.intersect_box(&min, &max).is_none());

        let inside = Ray::new(Point3f::origin(), Vector3f::x());
        assert_eq!(inside.intersect_box(&min, &max), Some(0.0));
    }

    #[test]
    fn test_ground_intersection() {
        let ray = Ray::new(Point3f::new(0.0, 10.0, 0.0), Vector3f::new(1.0, -1.0, 0.0));
        let hit = ray.intersect_ground(0.0).unwrap();
        assert_relative_eq!(hit, Point3f::new(10.0, 0.0, 0.0), epsilon = 1e-5);

        let up = Ray::new(Point3f::new(0.0, 10.0, 0.0), Vector3f::y());
        assert!(up.intersect_ground(0.0).is_none());

        let floor = world_to_floor(&hit, 50.0);
        assert_relative_eq!(floor.x, 500.0, epsilon = 1e-3);
    }
}

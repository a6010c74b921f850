//! Workplane of the active sketch

use glam::{Mat4, Vec3};
use sk_renderer::scene::collision::ray_plane_intersection;

/// Plane that pointer rays are projected onto while sketching
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SketchPlane {
    transform: Mat4,
    origin: Vec3,
    normal: Vec3,
}

impl Default for SketchPlane {
    fn default() -> Self {
        Self::new(Mat4::IDENTITY)
    }
}

impl SketchPlane {
    /// Plane through the transform's origin, normal to its local Z
    pub fn new(transform: Mat4) -> Self {
        Self {
            transform,
            origin: transform.transform_point3(Vec3::ZERO),
            normal: transform.transform_vector3(Vec3::Z).normalize_or_zero(),
        }
    }

    pub fn transform(&self) -> Mat4 {
        self.transform
    }

    pub fn origin(&self) -> Vec3 {
        self.origin
    }

    pub fn normal(&self) -> Vec3 {
        self.normal
    }

    /// Where a pointer ray meets the plane
    pub fn intersect_ray(&self, origin: Vec3, direction: Vec3) -> Option<Vec3> {
        ray_plane_intersection(origin, direction, self.origin, self.normal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_intersect_offset_plane() {
        let plane = SketchPlane::new(Mat4::from_translation(Vec3::new(0.0, 0.0, 2.0)));
        let hit = plane
            .intersect_ray(Vec3::new(1.0, 1.0, 10.0), Vec3::NEG_Z)
            .unwrap();
        assert_relative_eq!(hit.z, 2.0);
        assert_relative_eq!(hit.x, 1.0);
    }

    #[test]
    fn test_parallel_ray_misses() {
        let plane = SketchPlane::default();
        assert!(plane.intersect_ray(Vec3::Z, Vec3::X).is_none());
    }
}

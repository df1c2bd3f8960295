//! Ray and bounding-volume math for the scene, independent of any
//! rendering context so it can be tested headless.

use glam::Vec3;

/// Intersect a ray with the reference plane `z = 0`.
///
/// Newly spawned plums are placed on this plane and held plums are
/// dragged along it. Rays parallel to the plane, or whose intersection
/// lies behind the origin, yield `None`.
pub fn ray_plane(origin: Vec3, dir: Vec3) -> Option<Vec3> {
    let (num, denom) = (-origin.z, dir.z);
    if denom.abs() <= 1.0e-6 {
        return None;
    }

    let t = num / denom;
    if t <= 0.0 {
        return None;
    }

    Some(origin + dir * t)
}

/// Smallest non-negative ray parameter at which the ray hits the
/// sphere, or `None` on a miss. `dir` must be normalized.
pub fn ray_sphere(origin: Vec3, dir: Vec3, center: Vec3, radius: f32) -> Option<f32> {
    let oc = origin - center;
    let b = oc.dot(dir);
    let c = oc.length_squared() - radius * radius;
    let disc = b * b - c;
    if disc < 0.0 {
        return None;
    }

    let sqrt_disc = disc.sqrt();
    let near = -b - sqrt_disc;
    if near >= 0.0 {
        return Some(near);
    }

    // Origin inside the sphere: the exit point still counts as a hit.
    let far = -b + sqrt_disc;
    if far >= 0.0 {
        return Some(far);
    }

    None
}

/// Axis-aligned bounding box in world coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    pub fn from_center_half_extents(center: Vec3, half: Vec3) -> Self {
        Self {
            min: center - half,
            max: center + half,
        }
    }

    /// Overlap test; touching faces count as overlapping.
    pub fn intersects(&self, other: &Aabb) -> bool {
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
            && self.min.z <= other.max.z
            && self.max.z >= other.min.z
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ray_plane_hits_in_front() {
        let hit = ray_plane(Vec3::new(1.0, 2.0, 5.0), Vec3::new(0.0, 0.0, -1.0)).unwrap();
        assert_eq!(hit, Vec3::new(1.0, 2.0, 0.0));
    }

    #[test]
    fn ray_plane_parallel_is_none() {
        assert!(ray_plane(Vec3::new(0.0, 0.0, 5.0), Vec3::new(1.0, 0.0, 0.0)).is_none());
    }

    #[test]
    fn ray_plane_behind_origin_is_none() {
        // Plane lies behind the ray origin.
        assert!(ray_plane(Vec3::new(0.0, 0.0, 5.0), Vec3::new(0.0, 0.0, 1.0)).is_none());
    }

    #[test]
    fn ray_sphere_reports_near_surface_distance() {
        let t = ray_sphere(
            Vec3::new(0.0, 0.0, 10.0),
            Vec3::new(0.0, 0.0, -1.0),
            Vec3::ZERO,
            2.0,
        )
        .unwrap();
        assert!((t - 8.0).abs() < 1.0e-5);
    }

    #[test]
    fn ray_sphere_misses_off_axis() {
        assert!(ray_sphere(
            Vec3::new(0.0, 5.0, 10.0),
            Vec3::new(0.0, 0.0, -1.0),
            Vec3::ZERO,
            2.0,
        )
        .is_none());
    }

    #[test]
    fn ray_sphere_from_inside_hits_exit() {
        let t = ray_sphere(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0), Vec3::ZERO, 2.0).unwrap();
        assert!((t - 2.0).abs() < 1.0e-5);
    }

    #[test]
    fn aabb_overlap_and_separation() {
        let a = Aabb::from_center_half_extents(Vec3::ZERO, Vec3::splat(1.0));
        let b = Aabb::from_center_half_extents(Vec3::new(1.5, 0.0, 0.0), Vec3::splat(1.0));
        let c = Aabb::from_center_half_extents(Vec3::new(3.5, 0.0, 0.0), Vec3::splat(1.0));
        assert!(a.intersects(&b));
        assert!(b.intersects(&a));
        assert!(!a.intersects(&c));
    }

    #[test]
    fn aabb_touching_faces_overlap() {
        let a = Aabb::from_center_half_extents(Vec3::ZERO, Vec3::splat(1.0));
        let b = Aabb::from_center_half_extents(Vec3::new(2.0, 0.0, 0.0), Vec3::splat(1.0));
        assert!(a.intersects(&b));
    }
}

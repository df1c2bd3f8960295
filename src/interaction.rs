//! Pointer-driven pick, drag and drop of plums.
//!
//! All state lives in [`Interaction`]; the scene widget forwards raw
//! pointer events here and renders whatever the collection holds
//! afterwards. One event is processed to completion at a time, so no
//! synchronization is involved.

use glam::Vec3;
use iced::{Point, Rectangle};

use crate::camera::{ray_from_cursor, Camera};
use crate::geom::{ray_plane, ray_sphere, Aabb};

pub const PLUM_RADIUS: f32 = 0.5;

pub const ICEBOX_SIZE: f32 = 5.0;
pub const ICEBOX_SCALE: f32 = 2.0;

/// World-space bounds of the icebox, centered at the origin.
pub fn icebox_bounds() -> Aabb {
    Aabb::from_center_half_extents(Vec3::ZERO, Vec3::splat(ICEBOX_SIZE * ICEBOX_SCALE * 0.5))
}

/// A movable sphere. All plums share one geometry/material; only the
/// position is per instance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plum {
    pub id: u64,
    pub position: Vec3,
}

impl Plum {
    pub fn bounds(&self) -> Aabb {
        Aabb::from_center_half_extents(self.position, Vec3::splat(PLUM_RADIUS))
    }
}

/// What a pointer event did, for logging and snapshot publication.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerOutcome {
    /// Pick ray missed everything; a new plum was placed on the
    /// reference plane.
    Spawned(u64),
    /// A drag session opened on an existing plum.
    Picked(u64),
    /// The held plum followed the pointer.
    Dragged(u64),
    /// Session ended with the plum inside the icebox; it is gone.
    DroppedIn(u64),
    /// Session ended outside the icebox; the plum stays put.
    DroppedOut(u64),
    /// Nothing happened (no session, or the ray missed the plane).
    Ignored,
}

/// Owns the live plum collection and the at-most-one drag session.
#[derive(Debug, Clone)]
pub struct Interaction {
    plums: Vec<Plum>,
    icebox: Aabb,
    held: Option<u64>,
    next_id: u64,
}

impl Interaction {
    pub fn new(icebox: Aabb) -> Self {
        Self {
            plums: Vec::new(),
            icebox,
            held: None,
            next_id: 1,
        }
    }

    pub fn plums(&self) -> &[Plum] {
        &self.plums
    }

    /// Id of the plum currently being dragged, if any. While this is
    /// `Some`, camera orbit/pan/zoom input must stay disabled.
    pub fn held(&self) -> Option<u64> {
        self.held
    }

    /// Pick or spawn. A ray is cast against the plums only; the icebox
    /// and other scenery are never pick candidates. The nearest hit
    /// along the ray opens a session. On a miss, a plum is spawned at
    /// the ray's intersection with the reference plane and no session
    /// opens.
    pub fn pointer_down(
        &mut self,
        cursor: Point,
        bounds: Rectangle,
        camera: &Camera,
    ) -> PointerOutcome {
        let Some((origin, dir)) = ray_from_cursor(cursor, bounds, camera) else {
            return PointerOutcome::Ignored;
        };

        let mut nearest: Option<(u64, f32)> = None;
        for plum in &self.plums {
            if let Some(t) = ray_sphere(origin, dir, plum.position, PLUM_RADIUS) {
                if nearest.map(|(_, best)| t < best).unwrap_or(true) {
                    nearest = Some((plum.id, t));
                }
            }
        }

        if let Some((id, _)) = nearest {
            self.held = Some(id);
            return PointerOutcome::Picked(id);
        }

        let Some(position) = ray_plane(origin, dir) else {
            return PointerOutcome::Ignored;
        };

        PointerOutcome::Spawned(self.spawn_at(position))
    }

    /// Track the pointer while a session is active: the held plum's
    /// position is replaced by the fresh ray/plane intersection, not
    /// moved by a delta, so identical coordinates never drift.
    pub fn pointer_move(
        &mut self,
        cursor: Point,
        bounds: Rectangle,
        camera: &Camera,
    ) -> PointerOutcome {
        let Some(id) = self.held else {
            return PointerOutcome::Ignored;
        };

        let Some((origin, dir)) = ray_from_cursor(cursor, bounds, camera) else {
            return PointerOutcome::Ignored;
        };
        let Some(position) = ray_plane(origin, dir) else {
            return PointerOutcome::Ignored;
        };

        if let Some(plum) = self.plums.iter_mut().find(|p| p.id == id) {
            plum.position = position;
            PointerOutcome::Dragged(id)
        } else {
            PointerOutcome::Ignored
        }
    }

    /// End the session. Bounds are recomputed from the current
    /// transforms; a plum overlapping the icebox is removed for good,
    /// anything else stays where it was dropped.
    pub fn pointer_up(&mut self) -> PointerOutcome {
        let Some(id) = self.held.take() else {
            return PointerOutcome::Ignored;
        };

        let Some(index) = self.plums.iter().position(|p| p.id == id) else {
            return PointerOutcome::Ignored;
        };

        if self.plums[index].bounds().intersects(&self.icebox) {
            self.plums.remove(index);
            PointerOutcome::DroppedIn(id)
        } else {
            PointerOutcome::DroppedOut(id)
        }
    }

    fn spawn_at(&mut self, position: Vec3) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.plums.push(Plum { id, position });
        id
    }
}

impl Default for Interaction {
    fn default() -> Self {
        Self::new(icebox_bounds())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::CameraMode;
    use iced::Size;

    fn bounds_800x600() -> Rectangle {
        Rectangle::new(Point::ORIGIN, Size::new(800.0, 600.0))
    }

    /// Orthographic camera on the +Z axis looking at the origin, so
    /// pixel (400, 300) maps to the world origin on the z = 0 plane.
    fn camera_down_z() -> Camera {
        Camera {
            eye: Vec3::new(0.0, 0.0, 10.0),
            forward: Vec3::NEG_Z,
            right: Vec3::X,
            up: Vec3::Y,
            aspect: 800.0 / 600.0,
            fovy: 45.0_f32.to_radians(),
            mode: CameraMode::Orthographic,
            ortho_half_h: 6.0,
            near: 0.01,
            far: 1000.0,
        }
    }

    /// Camera looking straight down -Y; its rays run parallel to the
    /// z = 0 reference plane.
    fn camera_down_y() -> Camera {
        Camera {
            eye: Vec3::new(0.0, 10.0, 0.0),
            forward: Vec3::NEG_Y,
            right: Vec3::X,
            up: Vec3::NEG_Z,
            aspect: 800.0 / 600.0,
            fovy: 45.0_f32.to_radians(),
            mode: CameraMode::Orthographic,
            ortho_half_h: 6.0,
            near: 0.01,
            far: 1000.0,
        }
    }

    #[test]
    fn miss_spawns_one_plum_on_plane_without_session() {
        let mut interaction = Interaction::default();
        let outcome =
            interaction.pointer_down(Point::new(400.0, 300.0), bounds_800x600(), &camera_down_z());

        assert!(matches!(outcome, PointerOutcome::Spawned(_)));
        assert_eq!(interaction.plums().len(), 1);
        assert!((interaction.plums()[0].position - Vec3::ZERO).length() < 1.0e-5);
        assert_eq!(interaction.held(), None);
    }

    #[test]
    fn parallel_ray_is_a_silent_no_op() {
        let mut interaction = Interaction::default();
        let outcome =
            interaction.pointer_down(Point::new(400.0, 300.0), bounds_800x600(), &camera_down_y());

        assert_eq!(outcome, PointerOutcome::Ignored);
        assert!(interaction.plums().is_empty());
        assert_eq!(interaction.held(), None);
    }

    #[test]
    fn pick_selects_nearest_along_ray() {
        let mut interaction = Interaction::default();
        // Ray from z = 10 towards -z: surface distances 3.0 and 5.0.
        let far = interaction.spawn_at(Vec3::new(0.0, 0.0, 4.5));
        let near = interaction.spawn_at(Vec3::new(0.0, 0.0, 6.5));

        let outcome =
            interaction.pointer_down(Point::new(400.0, 300.0), bounds_800x600(), &camera_down_z());

        assert_eq!(outcome, PointerOutcome::Picked(near));
        assert_eq!(interaction.held(), Some(near));
        assert_ne!(interaction.held(), Some(far));
        // A hit never spawns.
        assert_eq!(interaction.plums().len(), 2);
    }

    #[test]
    fn coincident_plums_resolve_to_first_in_iteration_order() {
        let mut interaction = Interaction::default();
        let first = interaction.spawn_at(Vec3::ZERO);
        let _second = interaction.spawn_at(Vec3::ZERO);

        let outcome =
            interaction.pointer_down(Point::new(400.0, 300.0), bounds_800x600(), &camera_down_z());

        assert_eq!(outcome, PointerOutcome::Picked(first));
    }

    #[test]
    fn drag_replaces_position_and_repeated_moves_do_not_drift() {
        let mut interaction = Interaction::default();
        let bounds = bounds_800x600();
        let camera = camera_down_z();

        interaction.pointer_down(Point::new(400.0, 300.0), bounds, &camera);
        interaction.pointer_down(Point::new(400.0, 300.0), bounds, &camera);
        assert!(interaction.held().is_some());

        // half_w = 8, so pixel 500 is ndc 0.25 -> world x = 2.0.
        let cursor = Point::new(500.0, 300.0);
        interaction.pointer_move(cursor, bounds, &camera);
        let once = interaction.plums()[0].position;
        interaction.pointer_move(cursor, bounds, &camera);
        interaction.pointer_move(cursor, bounds, &camera);

        assert!((once.x - 2.0).abs() < 1.0e-4);
        assert_eq!(interaction.plums()[0].position, once);
    }

    #[test]
    fn drop_inside_icebox_removes_the_plum() {
        let mut interaction = Interaction::default();
        let bounds = bounds_800x600();
        let camera = camera_down_z();

        interaction.pointer_down(Point::new(400.0, 300.0), bounds, &camera);
        interaction.pointer_down(Point::new(400.0, 300.0), bounds, &camera);
        interaction.pointer_move(Point::new(500.0, 300.0), bounds, &camera);
        let outcome = interaction.pointer_up();

        assert!(matches!(outcome, PointerOutcome::DroppedIn(_)));
        assert!(interaction.plums().is_empty());
        assert_eq!(interaction.held(), None);
    }

    #[test]
    fn drop_outside_icebox_retains_the_plum_in_place() {
        let mut interaction = Interaction::default();
        let bounds = bounds_800x600();
        let camera = camera_down_z();

        interaction.pointer_down(Point::new(400.0, 300.0), bounds, &camera);
        interaction.pointer_down(Point::new(400.0, 300.0), bounds, &camera);
        // ndc x = 1.0 -> world x = 8.0, clear of the box (extends to 5).
        interaction.pointer_move(Point::new(800.0, 300.0), bounds, &camera);
        let outcome = interaction.pointer_up();

        assert!(matches!(outcome, PointerOutcome::DroppedOut(_)));
        assert_eq!(interaction.plums().len(), 1);
        assert!((interaction.plums()[0].position.x - 8.0).abs() < 1.0e-4);
        assert_eq!(interaction.held(), None);
    }

    #[test]
    fn move_and_release_without_session_are_ignored() {
        let mut interaction = Interaction::default();
        assert_eq!(
            interaction.pointer_move(Point::new(100.0, 100.0), bounds_800x600(), &camera_down_z()),
            PointerOutcome::Ignored
        );
        assert_eq!(interaction.pointer_up(), PointerOutcome::Ignored);
    }

    #[test]
    fn next_interaction_starts_fresh_after_a_session_ends() {
        let mut interaction = Interaction::default();
        let bounds = bounds_800x600();
        let camera = camera_down_z();

        interaction.pointer_down(Point::new(400.0, 300.0), bounds, &camera);
        interaction.pointer_down(Point::new(400.0, 300.0), bounds, &camera);
        interaction.pointer_move(Point::new(800.0, 300.0), bounds, &camera);
        interaction.pointer_up();

        // Empty spot: spawns again instead of resuming the old session.
        let outcome = interaction.pointer_down(Point::new(400.0, 300.0), bounds, &camera);
        assert!(matches!(outcome, PointerOutcome::Spawned(_)));
        assert_eq!(interaction.plums().len(), 2);
        assert_eq!(interaction.held(), None);
    }
}

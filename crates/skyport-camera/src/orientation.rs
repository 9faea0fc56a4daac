//! Free-flying camera position and orthonormal basis.

use glam::{Mat4, Vec3};

/// World up axis. Rotation and the view transform are always built against it.
pub const WORLD_UP: Vec3 = Vec3::Y;

/// Discrete movement commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveDirection {
    /// Along the horizontal projection of `front`.
    Forward,
    /// Against the horizontal projection of `front`.
    Backward,
    /// Against `right`.
    Left,
    /// Along `right`.
    Right,
}

/// Camera position plus the `front`/`right` basis the view matrix is built from.
///
/// The basis is re-derived from `(pitch, yaw)` on every rotation instead of
/// being integrated, so it never drifts away from orthonormal.
#[derive(Debug, Clone, PartialEq)]
pub struct OrientationModel {
    position: Vec3,
    front: Vec3,
    right: Vec3,
    /// Half-extent of the axis-aligned box movement is confined to.
    bounds: Option<f32>,
}

impl OrientationModel {
    /// Build the initial basis from an eye/target/up triple.
    ///
    /// A degenerate triple (eye on target, or looking straight along `up`)
    /// falls back to looking down -Z with +X as right.
    pub fn new(eye: Vec3, target: Vec3, up: Vec3) -> Self {
        let front = (target - eye).try_normalize().unwrap_or(Vec3::NEG_Z);
        let right = front.cross(up).try_normalize().unwrap_or(Vec3::X);
        Self {
            position: eye,
            front,
            right,
            bounds: None,
        }
    }

    /// Confine movement to `[-half_extent, half_extent]` on every axis.
    #[must_use]
    pub fn with_bounds(mut self, half_extent: f32) -> Self {
        self.bounds = Some(half_extent.abs());
        self
    }

    /// Move by `speed` units.
    ///
    /// Forward and backward use the horizontal projection of `speed * front`
    /// (its y component is dropped, so looking up or down never changes the
    /// camera height). Left and right move along `right` unchanged. A step
    /// that would leave the bounds box is dropped; returns whether the
    /// camera moved.
    pub fn move_by(&mut self, direction: MoveDirection, speed: f32) -> bool {
        let v = self.front * speed;
        let horizontal = Vec3::new(v.x, 0.0, v.z);
        let displacement = match direction {
            MoveDirection::Forward => horizontal,
            MoveDirection::Backward => -horizontal,
            MoveDirection::Right => self.right * speed,
            MoveDirection::Left => -self.right * speed,
        };

        let candidate = self.position + displacement;
        if let Some(bounds) = self.bounds
            && candidate.abs().max_element() > bounds
        {
            return false;
        }
        self.position = candidate;
        true
    }

    /// Recompute the basis from pitch and yaw in degrees.
    ///
    /// The caller clamps pitch; no clamping happens here.
    pub fn rotate(&mut self, pitch_deg: f32, yaw_deg: f32) {
        let (pitch, yaw) = (pitch_deg.to_radians(), yaw_deg.to_radians());
        self.front = Vec3::new(
            pitch.cos() * yaw.cos(),
            pitch.sin(),
            pitch.cos() * yaw.sin(),
        );
        self.right = self.front.cross(WORLD_UP).normalize();
    }

    /// Look-at transform for `(position, position + front, WORLD_UP)`.
    #[must_use]
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.position + self.front, WORLD_UP)
    }

    /// Current eye position.
    #[must_use]
    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// Unit view direction.
    #[must_use]
    pub fn front(&self) -> Vec3 {
        self.front
    }

    /// Unit right vector.
    #[must_use]
    pub fn right(&self) -> Vec3 {
        self.right
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-5;

    fn default_camera() -> OrientationModel {
        OrientationModel::new(Vec3::new(0.0, 0.0, 3.0), Vec3::new(0.0, 0.0, -10.0), Vec3::Y)
    }

    #[test]
    fn test_construct_derives_basis() {
        let cam = default_camera();
        assert!((cam.front() - Vec3::NEG_Z).length() < EPS);
        assert!((cam.right() - Vec3::X).length() < EPS);
        assert_eq!(cam.position(), Vec3::new(0.0, 0.0, 3.0));
    }

    #[test]
    fn test_initial_yaw_matches_constructed_front() {
        let mut cam = default_camera();
        let before = cam.front();
        cam.rotate(0.0, -90.0);
        assert!((cam.front() - before).length() < EPS);
    }

    #[test]
    fn test_forward_ignores_pitch_height() {
        let mut cam = default_camera();
        cam.rotate(45.0, -90.0);
        assert!(cam.move_by(MoveDirection::Forward, 0.1));

        let p = cam.position();
        assert!((p.y - 0.0).abs() < EPS, "height changed: {}", p.y);
        let expected_z = 3.0 - 0.1 * 45.0_f32.to_radians().cos();
        assert!((p.z - expected_z).abs() < EPS);
    }

    #[test]
    fn test_backward_undoes_forward() {
        let mut cam = default_camera();
        cam.rotate(-30.0, 10.0);
        cam.move_by(MoveDirection::Forward, 0.1);
        cam.move_by(MoveDirection::Backward, 0.1);
        assert!((cam.position() - Vec3::new(0.0, 0.0, 3.0)).length() < EPS);
    }

    #[test]
    fn test_strafe_moves_along_right() {
        let mut cam = default_camera();
        cam.move_by(MoveDirection::Right, 0.5);
        assert!((cam.position() - Vec3::new(0.5, 0.0, 3.0)).length() < EPS);
        cam.move_by(MoveDirection::Left, 1.0);
        assert!((cam.position() - Vec3::new(-0.5, 0.0, 3.0)).length() < EPS);
    }

    #[test]
    fn test_bounds_drop_escaping_step() {
        let mut cam =
            OrientationModel::new(Vec3::new(0.0, 0.0, 0.95), Vec3::ZERO, Vec3::Y).with_bounds(1.0);
        // Front is -Z, so backward pushes towards +Z.
        assert!(!cam.move_by(MoveDirection::Backward, 0.1));
        assert!((cam.position().z - 0.95).abs() < EPS);
        // Moving back towards the centre still works.
        assert!(cam.move_by(MoveDirection::Forward, 0.1));
    }

    #[test]
    fn test_unbounded_moves_anywhere() {
        let mut cam = default_camera();
        for _ in 0..10_000 {
            assert!(cam.move_by(MoveDirection::Forward, 1.0));
        }
        assert!(cam.position().z < -9_000.0);
    }

    #[test]
    fn test_rotate_keeps_basis_orthonormal() {
        let mut cam = default_camera();
        for pitch in [-89.0, -45.0, 0.0, 30.0, 89.0] {
            for yaw in [-720.0, -90.0, 0.0, 45.0, 133.0, 400.0] {
                cam.rotate(pitch, yaw);
                assert!((cam.front().length() - 1.0).abs() < EPS);
                assert!((cam.right().length() - 1.0).abs() < EPS);
                assert!(cam.front().dot(cam.right()).abs() < EPS);
                assert!(cam.right().y.abs() < EPS, "right must stay horizontal");
            }
        }
    }

    #[test]
    fn test_view_matrix_is_idempotent() {
        let mut cam = default_camera();
        cam.rotate(12.0, -70.0);
        cam.move_by(MoveDirection::Left, 0.3);
        assert_eq!(cam.view_matrix(), cam.view_matrix());
    }

    #[test]
    fn test_view_matrix_maps_eye_to_origin() {
        let cam = default_camera();
        let eye_in_view = cam.view_matrix().transform_point3(cam.position());
        assert!(eye_in_view.length() < EPS);
        // A point in front of the camera lands on -Z in view space.
        let ahead = cam.view_matrix().transform_point3(Vec3::new(0.0, 0.0, 0.0));
        assert!((ahead - Vec3::new(0.0, 0.0, -3.0)).length() < EPS);
    }

    #[test]
    fn test_degenerate_triple_falls_back() {
        let cam = OrientationModel::new(Vec3::ONE, Vec3::ONE, Vec3::Y);
        assert_eq!(cam.front(), Vec3::NEG_Z);
        assert!((cam.right() - Vec3::X).length() < EPS);
    }
}

//! Mouse look: accumulates pointer motion into yaw and pitch.

use glam::Vec2;

use crate::orientation::OrientationModel;

/// Accumulated look angles in degrees.
///
/// Yaw is unbounded. Pitch is clamped to `[-pitch_limit, pitch_limit]` before
/// the camera sees it.
#[derive(Debug, Clone, PartialEq)]
pub struct MouseLook {
    yaw: f32,
    pitch: f32,
    sensitivity: f32,
    pitch_limit: f32,
}

impl Default for MouseLook {
    fn default() -> Self {
        Self::new(0.0, -90.0, 0.5, 89.0)
    }
}

impl MouseLook {
    /// Start from the given angles. `sensitivity` is degrees per pixel.
    pub fn new(pitch: f32, yaw: f32, sensitivity: f32, pitch_limit: f32) -> Self {
        let pitch_limit = pitch_limit.abs();
        Self {
            yaw,
            pitch: pitch.clamp(-pitch_limit, pitch_limit),
            sensitivity,
            pitch_limit,
        }
    }

    /// Fold a pointer delta (+x right, +y down, in pixels) into the angles and
    /// re-derive the camera basis. Moving the pointer up raises the pitch.
    ///
    /// Returns `false` and leaves the camera alone when the delta is zero.
    pub fn apply(&mut self, delta: Vec2, camera: &mut OrientationModel) -> bool {
        if delta == Vec2::ZERO {
            return false;
        }
        self.yaw += delta.x * self.sensitivity;
        self.pitch = (self.pitch - delta.y * self.sensitivity)
            .clamp(-self.pitch_limit, self.pitch_limit);
        camera.rotate(self.pitch, self.yaw);
        true
    }

    /// Current yaw in degrees.
    #[must_use]
    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    /// Current (clamped) pitch in degrees.
    #[must_use]
    pub fn pitch(&self) -> f32 {
        self.pitch
    }
}

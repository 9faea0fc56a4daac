//! Directional light that can be swung around the vertical axis.

use glam::{Quat, Vec3};

use crate::animation::StepDirection;

/// A single directional light.
///
/// `base_direction` is rotated around Y by the accumulated `angle_deg`. The
/// shader receives the rotated direction in world space.
#[derive(Clone, Debug, PartialEq)]
pub struct LightRig {
    base_direction: Vec3,
    /// Linear RGB color.
    pub color: Vec3,
    angle_deg: f32,
    step_deg: f32,
}

impl Default for LightRig {
    fn default() -> Self {
        Self::new(Vec3::new(0.0, 1.0, 1.0), Vec3::ONE, 1.0)
    }
}

impl LightRig {
    /// A zero `base_direction` falls back to straight up.
    pub fn new(base_direction: Vec3, color: Vec3, step_deg: f32) -> Self {
        Self {
            base_direction: base_direction.try_normalize().unwrap_or(Vec3::Y),
            color,
            angle_deg: 0.0,
            step_deg,
        }
    }

    /// Swing the light by one step. Returns the new direction.
    pub fn rotate(&mut self, direction: StepDirection) -> Vec3 {
        match direction {
            StepDirection::Decrease => self.angle_deg -= self.step_deg,
            StepDirection::Increase => self.angle_deg += self.step_deg,
        }
        self.direction()
    }

    /// Current normalized direction.
    #[must_use]
    pub fn direction(&self) -> Vec3 {
        Quat::from_rotation_y(self.angle_deg.to_radians()) * self.base_direction
    }

    /// Accumulated rotation around Y in degrees.
    #[must_use]
    pub fn angle_deg(&self) -> f32 {
        self.angle_deg
    }
}

//! Fixed world layout: where each entity sits and how it is scaled.

use glam::{Mat4, Vec3};

/// Everything the viewer draws.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Entity {
    /// Grass plane under the city.
    Ground,
    /// Cubemap background.
    Skybox,
    /// Transport shuttle circling the origin.
    Shuttle,
    /// City backdrop.
    City,
    /// Freighter sliding along X.
    Freighter,
    /// Combat jet, drawn only while visible.
    Jet,
    /// Parked UFO.
    Ufo,
    /// Alien moving between the UFO and the ground.
    Alien,
}

/// Draw order for one frame. Later entries are drawn over earlier ones.
pub const DRAW_ORDER: [Entity; 8] = [
    Entity::Ground,
    Entity::Skybox,
    Entity::Shuttle,
    Entity::City,
    Entity::Freighter,
    Entity::Jet,
    Entity::Ufo,
    Entity::Alien,
];

/// The animated parameters the layout depends on, sampled once per frame.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct EntityLayout {
    /// Shuttle rotation around Y, degrees.
    pub shuttle_spin_deg: f32,
    /// Freighter X offset.
    pub freighter_x: f32,
    /// Alien Y offset.
    pub alien_y: f32,
}

impl EntityLayout {
    /// Model matrix for `entity`. The skybox always uses the identity.
    #[must_use]
    pub fn model_matrix(&self, entity: Entity) -> Mat4 {
        match entity {
            Entity::Ground => {
                Mat4::from_translation(Vec3::new(0.0, -1.0, 0.0))
                    * Mat4::from_scale(Vec3::splat(1.0 / 20.0))
                    * Mat4::from_rotation_x(90.0_f32.to_radians())
            }
            Entity::Skybox => Mat4::IDENTITY,
            Entity::Shuttle => {
                Mat4::from_rotation_y(self.shuttle_spin_deg.to_radians())
                    * Mat4::from_translation(Vec3::new(-1.0, 0.0, -5.0))
                    * Mat4::from_scale(Vec3::splat(1.0 / 30.0))
            }
            Entity::City => {
                Mat4::from_rotation_y(0.0)
                    * Mat4::from_translation(Vec3::new(0.0, -1.0, 0.0))
                    * Mat4::from_scale(Vec3::splat(1.0 / 10_000.0))
            }
            Entity::Freighter => {
                Mat4::from_translation(Vec3::new(self.freighter_x, 0.0, -2.0))
                    * Mat4::from_scale(Vec3::splat(1.0 / 20.0))
                    * Mat4::from_rotation_y(90.0_f32.to_radians())
            }
            Entity::Jet => {
                Mat4::from_translation(Vec3::new(0.6, -0.7, -1.8))
                    * Mat4::from_scale(Vec3::splat(1.0 / 25.0))
            }
            Entity::Ufo => {
                Mat4::from_translation(Vec3::new(2.7, 1.4, 0.0))
                    * Mat4::from_scale(Vec3::splat(1.0 / 230.0))
                    * Mat4::from_rotation_x(270.0_f32.to_radians())
            }
            Entity::Alien => {
                Mat4::from_translation(Vec3::new(2.7, self.alien_y, 0.0))
                    * Mat4::from_scale(Vec3::splat(1.0 / 330.0))
                    * Mat4::from_rotation_x(270.0_f32.to_radians())
            }
        }
    }
}

/// Inverse-transpose of the upper 3x3 of `view * model`, used to bring
/// normals into view space under non-uniform transforms.
#[must_use]
pub fn normal_matrix(view: Mat4, model: Mat4) -> glam::Mat3 {
    glam::Mat3::from_mat4((view * model).inverse().transpose())
}

//! Loaded scene geometry as seen by the viewer.

use glam::Mat4;

use crate::graphics::{GraphicsApi, MeshId};
use crate::layout::Entity;
use crate::shader::{ShaderBinding, SkyboxShader};

/// Something that can be drawn with the currently bound program.
pub trait Drawable {
    fn draw(&self, gfx: &mut dyn GraphicsApi);
}

/// A model made of one or more meshes sharing a transform.
#[derive(Debug, Clone, PartialEq)]
pub struct Model {
    meshes: Vec<MeshId>,
}

impl Model {
    pub fn new(meshes: Vec<MeshId>) -> Self {
        Self { meshes }
    }

    #[must_use]
    pub fn meshes(&self) -> &[MeshId] {
        &self.meshes
    }
}

impl Drawable for Model {
    fn draw(&self, gfx: &mut dyn GraphicsApi) {
        for mesh in &self.meshes {
            gfx.draw_mesh(*mesh);
        }
    }
}

/// Cube mesh with its cubemap. Draws with its own program and binds its own
/// view and projection.
#[derive(Debug, Clone, PartialEq)]
pub struct Skybox {
    mesh: MeshId,
}

impl Skybox {
    pub fn new(mesh: MeshId) -> Self {
        Self { mesh }
    }

    #[must_use]
    pub fn mesh(&self) -> MeshId {
        self.mesh
    }

    /// Bind `shader`, upload identity model plus the shared view and
    /// projection, then draw. Leaves the skybox program bound.
    pub fn draw_with(
        &self,
        gfx: &mut dyn GraphicsApi,
        shader: &SkyboxShader,
        view: Mat4,
        projection: Mat4,
    ) {
        shader.bind(gfx);
        shader.set_model(gfx, Mat4::IDENTITY);
        shader.set_view(gfx, view);
        shader.set_projection(gfx, projection);
        gfx.draw_mesh(self.mesh);
    }
}

/// Every loaded entity.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneAssets {
    pub ground: Model,
    pub skybox: Skybox,
    pub shuttle: Model,
    pub city: Model,
    pub freighter: Model,
    pub jet: Model,
    pub ufo: Model,
    pub alien: Model,
}

impl SceneAssets {
    /// The lit model for `entity`, or `None` for the skybox.
    #[must_use]
    pub fn model(&self, entity: Entity) -> Option<&Model> {
        match entity {
            Entity::Ground => Some(&self.ground),
            Entity::Skybox => None,
            Entity::Shuttle => Some(&self.shuttle),
            Entity::City => Some(&self.city),
            Entity::Freighter => Some(&self.freighter),
            Entity::Jet => Some(&self.jet),
            Entity::Ufo => Some(&self.ufo),
            Entity::Alien => Some(&self.alien),
        }
    }
}

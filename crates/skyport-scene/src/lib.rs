//! Viewer scene: animated entity state, render toggles, the fixed world
//! layout and the frame orchestrator that turns input into ordered draws.

pub mod animation;
pub mod drawable;
pub mod graphics;
pub mod layout;
pub mod lighting;
pub mod orchestrator;
pub mod shader;
pub mod toggles;

pub use animation::{Oscillator, StepDirection};
pub use drawable::{Drawable, Model, SceneAssets, Skybox};
pub use graphics::{
    GpuError, GraphicsApi, MeshId, ProgramId, ScenePrograms, UniformLocation, UniformValue,
};
pub use layout::{DRAW_ORDER, Entity, EntityLayout, normal_matrix};
pub use lighting::LightRig;
pub use orchestrator::Viewer;
pub use shader::{LitShader, ShaderBinding, ShaderError, SkyboxShader};
pub use toggles::{RenderToggles, ShadingMode};

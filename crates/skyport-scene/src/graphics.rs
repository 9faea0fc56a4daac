//! The narrow graphics interface the viewer drives.
//!
//! The viewer never touches a GPU API directly. It binds programs, writes
//! uniforms through locations resolved up front, switches shading modes and
//! issues mesh draws. The wgpu backend implements [`GraphicsApi`]; tests use a
//! recording double.

use glam::{Mat3, Mat4, Vec3};

use crate::shader::ShaderError;
use crate::toggles::ShadingMode;

/// Handle to a linked shader program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProgramId(pub u32);

/// Handle to an uploaded mesh.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MeshId(pub u32);

/// A resolved uniform slot inside one program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UniformLocation {
    /// Program the slot belongs to.
    pub program: ProgramId,
    /// Backend-defined slot index.
    pub slot: u32,
}

/// Values that can be written to a uniform.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UniformValue {
    /// 4x4 matrix.
    Mat4(Mat4),
    /// 3x3 matrix.
    Mat3(Mat3),
    /// 3-component vector.
    Vec3(Vec3),
    /// Signed integer (used as a boolean flag by the shaders).
    Int(i32),
}

/// Errors reported by the device after commands were issued.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GpuError {
    /// The device ran out of memory.
    #[error("GPU out of memory")]
    OutOfMemory,
    /// A command failed validation.
    #[error("GPU validation error: {0}")]
    Validation(String),
    /// Driver or backend failure.
    #[error("GPU internal error: {0}")]
    Internal(String),
}

/// The two programs the viewer draws with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScenePrograms {
    /// Lit, optionally fogged program used for every model.
    pub lit: ProgramId,
    /// Cubemap background program.
    pub skybox: ProgramId,
}

/// Immediate-mode style graphics interface.
///
/// Uniform writes apply to the program named in the location and persist
/// until overwritten, so values set once (projection, light color) stay valid
/// across frames.
pub trait GraphicsApi {
    /// Look up a uniform by name.
    fn uniform_location(&self, program: ProgramId, name: &str)
    -> Result<UniformLocation, ShaderError>;

    /// Make `program` current for subsequent draws.
    fn use_program(&mut self, program: ProgramId);

    /// Write a uniform value.
    fn set_uniform(&mut self, location: UniformLocation, value: UniformValue);

    /// Switch the rasterization style for lit draws.
    fn set_shading_mode(&mut self, mode: ShadingMode);

    /// Resize the viewport.
    fn set_viewport(&mut self, width: u32, height: u32);

    /// Draw a mesh with the current program and its uniforms.
    fn draw_mesh(&mut self, mesh: MeshId);

    /// Take every error reported since the last call.
    fn drain_errors(&mut self) -> Vec<GpuError>;
}

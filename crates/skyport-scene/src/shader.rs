//! Typed shader bindings with uniform locations resolved once at link time.

use glam::{Mat3, Mat4, Vec3};

use crate::graphics::{GraphicsApi, ProgramId, UniformLocation, UniformValue};

/// Errors raised while linking a typed binding against a program.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ShaderError {
    /// The program has no uniform with this name.
    #[error("program {program:?} has no uniform `{name}`")]
    MissingUniform {
        /// Program that was searched.
        program: ProgramId,
        /// Requested uniform name.
        name: String,
    },
    /// The handle does not name a linked program.
    #[error("unknown program {0:?}")]
    UnknownProgram(ProgramId),
}

/// Common behaviour of the typed bindings.
pub trait ShaderBinding {
    /// Program this binding was linked against.
    fn program(&self) -> ProgramId;

    /// Make the program current.
    fn bind(&self, gfx: &mut dyn GraphicsApi) {
        gfx.use_program(self.program());
    }
}

fn resolve(
    gfx: &dyn GraphicsApi,
    program: ProgramId,
    name: &str,
) -> Result<UniformLocation, ShaderError> {
    gfx.uniform_location(program, name)
}

/// Binding for the lit model program.
#[derive(Debug, Clone, PartialEq)]
pub struct LitShader {
    program: ProgramId,
    model: UniformLocation,
    view: UniformLocation,
    projection: UniformLocation,
    normal_matrix: UniformLocation,
    light_dir: UniformLocation,
    light_color: UniformLocation,
    put_fog: UniformLocation,
}

impl LitShader {
    /// Resolve every uniform the viewer writes. Fails on the first missing one.
    pub fn link(gfx: &dyn GraphicsApi, program: ProgramId) -> Result<Self, ShaderError> {
        Ok(Self {
            program,
            model: resolve(gfx, program, "model")?,
            view: resolve(gfx, program, "view")?,
            projection: resolve(gfx, program, "projection")?,
            normal_matrix: resolve(gfx, program, "normalMatrix")?,
            light_dir: resolve(gfx, program, "lightDir")?,
            light_color: resolve(gfx, program, "lightColor")?,
            put_fog: resolve(gfx, program, "putFog")?,
        })
    }

    /// Object-to-world transform of the next draw.
    pub fn set_model(&self, gfx: &mut dyn GraphicsApi, model: Mat4) {
        gfx.set_uniform(self.model, UniformValue::Mat4(model));
    }

    /// World-to-eye transform for the frame.
    pub fn set_view(&self, gfx: &mut dyn GraphicsApi, view: Mat4) {
        gfx.set_uniform(self.view, UniformValue::Mat4(view));
    }

    /// Eye-to-clip transform.
    pub fn set_projection(&self, gfx: &mut dyn GraphicsApi, projection: Mat4) {
        gfx.set_uniform(self.projection, UniformValue::Mat4(projection));
    }

    /// Inverse-transpose of view·model, for eye-space normals.
    pub fn set_normal_matrix(&self, gfx: &mut dyn GraphicsApi, normal: Mat3) {
        gfx.set_uniform(self.normal_matrix, UniformValue::Mat3(normal));
    }

    /// Direction towards the light, in world space.
    pub fn set_light_dir(&self, gfx: &mut dyn GraphicsApi, dir: Vec3) {
        gfx.set_uniform(self.light_dir, UniformValue::Vec3(dir));
    }

    /// Light colour as linear RGB.
    pub fn set_light_color(&self, gfx: &mut dyn GraphicsApi, color: Vec3) {
        gfx.set_uniform(self.light_color, UniformValue::Vec3(color));
    }

    /// Fog flag, uploaded as an int (0 or 1).
    pub fn set_put_fog(&self, gfx: &mut dyn GraphicsApi, enabled: bool) {
        gfx.set_uniform(self.put_fog, UniformValue::Int(i32::from(enabled)));
    }
}

impl ShaderBinding for LitShader {
    fn program(&self) -> ProgramId {
        self.program
    }
}

/// Binding for the cubemap program.
#[derive(Debug, Clone, PartialEq)]
pub struct SkyboxShader {
    program: ProgramId,
    model: UniformLocation,
    view: UniformLocation,
    projection: UniformLocation,
}

impl SkyboxShader {
    /// Resolve the three transforms. Fails on the first missing one.
    pub fn link(gfx: &dyn GraphicsApi, program: ProgramId) -> Result<Self, ShaderError> {
        Ok(Self {
            program,
            model: resolve(gfx, program, "model")?,
            view: resolve(gfx, program, "view")?,
            projection: resolve(gfx, program, "projection")?,
        })
    }

    /// Box transform, normally identity.
    pub fn set_model(&self, gfx: &mut dyn GraphicsApi, model: Mat4) {
        gfx.set_uniform(self.model, UniformValue::Mat4(model));
    }

    /// Only the rotation part of `view` is kept so the box stays centred on
    /// the eye.
    pub fn set_view(&self, gfx: &mut dyn GraphicsApi, view: Mat4) {
        let rotation_only = Mat4::from_mat3(Mat3::from_mat4(view));
        gfx.set_uniform(self.view, UniformValue::Mat4(rotation_only));
    }

    /// Shared eye-to-clip transform.
    pub fn set_projection(&self, gfx: &mut dyn GraphicsApi, projection: Mat4) {
        gfx.set_uniform(self.projection, UniformValue::Mat4(projection));
    }
}

impl ShaderBinding for SkyboxShader {
    fn program(&self) -> ProgramId {
        self.program
    }
}

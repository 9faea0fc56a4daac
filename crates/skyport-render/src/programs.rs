//! WGSL programs and the CPU-side uniform blocks that feed them.
//!
//! Each program reads one uniform struct at `@group(0) @binding(0)`. The
//! field table maps the names the scene asks for to byte offsets inside that
//! struct, following WGSL uniform layout rules (mat3 columns and vec3 are
//! padded to 16 bytes).

use skyport_scene::{ProgramId, UniformValue};

/// Shape of a uniform field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UniformKind {
    Mat4,
    Mat3,
    Vec3,
    Int,
}

impl UniformKind {
    /// Bytes the field occupies, including column padding.
    pub const fn size(self) -> usize {
        match self {
            UniformKind::Mat4 => 64,
            UniformKind::Mat3 => 48,
            UniformKind::Vec3 => 12,
            UniformKind::Int => 4,
        }
    }

    fn of(value: &UniformValue) -> Self {
        match value {
            UniformValue::Mat4(_) => UniformKind::Mat4,
            UniformValue::Mat3(_) => UniformKind::Mat3,
            UniformValue::Vec3(_) => UniformKind::Vec3,
            UniformValue::Int(_) => UniformKind::Int,
        }
    }
}

/// One named field in a program's uniform struct.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UniformField {
    pub name: &'static str,
    pub offset: usize,
    pub kind: UniformKind,
}

/// A program's source plus the layout of its uniform struct.
#[derive(Debug)]
pub struct ProgramLayout {
    pub label: &'static str,
    pub source: &'static str,
    pub fields: &'static [UniformField],
    /// Struct size rounded up to its 16-byte alignment.
    pub block_size: usize,
}

impl ProgramLayout {
    /// Slot index of `name`.
    pub fn slot(&self, name: &str) -> Option<u32> {
        self.fields
            .iter()
            .position(|field| field.name == name)
            .map(|index| index as u32)
    }
}

/// Program id the backend hands out for the lit program.
pub const LIT_PROGRAM_ID: ProgramId = ProgramId(0);
/// Program id the backend hands out for the skybox program.
pub const SKYBOX_PROGRAM_ID: ProgramId = ProgramId(1);

pub const LIT_PROGRAM: ProgramLayout = ProgramLayout {
    label: "lit",
    source: LIT_SHADER_SOURCE,
    fields: &[
        UniformField {
            name: "model",
            offset: 0,
            kind: UniformKind::Mat4,
        },
        UniformField {
            name: "view",
            offset: 64,
            kind: UniformKind::Mat4,
        },
        UniformField {
            name: "projection",
            offset: 128,
            kind: UniformKind::Mat4,
        },
        UniformField {
            name: "normalMatrix",
            offset: 192,
            kind: UniformKind::Mat3,
        },
        UniformField {
            name: "lightDir",
            offset: 240,
            kind: UniformKind::Vec3,
        },
        UniformField {
            name: "lightColor",
            offset: 256,
            kind: UniformKind::Vec3,
        },
        UniformField {
            name: "putFog",
            offset: 268,
            kind: UniformKind::Int,
        },
    ],
    block_size: 272,
};

pub const SKYBOX_PROGRAM: ProgramLayout = ProgramLayout {
    label: "skybox",
    source: SKYBOX_SHADER_SOURCE,
    fields: &[
        UniformField {
            name: "model",
            offset: 0,
            kind: UniformKind::Mat4,
        },
        UniformField {
            name: "view",
            offset: 64,
            kind: UniformKind::Mat4,
        },
        UniformField {
            name: "projection",
            offset: 128,
            kind: UniformKind::Mat4,
        },
    ],
    block_size: 192,
};

/// Why a uniform write was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UniformWriteError {
    /// No field has this slot.
    UnknownSlot(u32),
    /// The value does not match the field's declared shape.
    KindMismatch {
        expected: UniformKind,
        actual: UniformKind,
    },
}

/// Current uniform values of one program, laid out exactly as the GPU reads them.
#[derive(Debug, Clone)]
pub struct UniformBlock {
    layout: &'static ProgramLayout,
    bytes: Vec<u8>,
}

impl UniformBlock {
    /// Zero-initialized block.
    pub fn new(layout: &'static ProgramLayout) -> Self {
        Self {
            layout,
            bytes: vec![0; layout.block_size],
        }
    }

    pub fn layout(&self) -> &'static ProgramLayout {
        self.layout
    }

    /// Write `value` into the field at `slot`.
    pub fn write(&mut self, slot: u32, value: &UniformValue) -> Result<(), UniformWriteError> {
        let field = self
            .layout
            .fields
            .get(slot as usize)
            .ok_or(UniformWriteError::UnknownSlot(slot))?;
        let actual = UniformKind::of(value);
        if actual != field.kind {
            return Err(UniformWriteError::KindMismatch {
                expected: field.kind,
                actual,
            });
        }

        let dst = &mut self.bytes[field.offset..field.offset + field.kind.size()];
        match value {
            UniformValue::Mat4(m) => dst.copy_from_slice(bytemuck::bytes_of(&m.to_cols_array())),
            UniformValue::Mat3(m) => {
                let mut padded = [0.0f32; 12];
                for (column, chunk) in m.to_cols_array_2d().iter().zip(padded.chunks_exact_mut(4)) {
                    chunk[..3].copy_from_slice(column);
                }
                dst.copy_from_slice(bytemuck::bytes_of(&padded));
            }
            UniformValue::Vec3(v) => dst.copy_from_slice(bytemuck::bytes_of(&v.to_array())),
            UniformValue::Int(i) => dst.copy_from_slice(bytemuck::bytes_of(i)),
        }
        Ok(())
    }

    /// Raw block contents.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }
}

/// Lit program: Phong lighting in eye space with optional exponential-squared fog.
pub const LIT_SHADER_SOURCE: &str = r#"
struct LitUniforms {
    model: mat4x4<f32>,
    view: mat4x4<f32>,
    projection: mat4x4<f32>,
    normal_matrix: mat3x3<f32>,
    light_dir: vec3<f32>,
    light_color: vec3<f32>,
    put_fog: i32,
};

@group(0) @binding(0) var<uniform> u: LitUniforms;

struct VertexInput {
    @location(0) position: vec3<f32>,
    @location(1) normal: vec3<f32>,
    @location(2) color: vec3<f32>,
};

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) eye_position: vec3<f32>,
    @location(1) eye_normal: vec3<f32>,
    @location(2) color: vec3<f32>,
};

const AMBIENT_STRENGTH: f32 = 0.2;
const SPECULAR_STRENGTH: f32 = 0.5;
const SHININESS: f32 = 32.0;
const FOG_DENSITY: f32 = 0.05;
const FOG_COLOR: vec3<f32> = vec3<f32>(0.5, 0.5, 0.5);

@vertex
fn vs_main(in: VertexInput) -> VertexOutput {
    let eye = u.view * u.model * vec4<f32>(in.position, 1.0);
    var out: VertexOutput;
    out.clip_position = u.projection * eye;
    out.eye_position = eye.xyz;
    out.eye_normal = u.normal_matrix * in.normal;
    out.color = in.color;
    return out;
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    let normal = normalize(in.eye_normal);
    let light = normalize((u.view * vec4<f32>(u.light_dir, 0.0)).xyz);
    let view_dir = normalize(-in.eye_position);

    let ambient = AMBIENT_STRENGTH * u.light_color;
    let diffuse = max(dot(normal, light), 0.0) * u.light_color;
    let reflected = reflect(-light, normal);
    let specular = SPECULAR_STRENGTH * pow(max(dot(view_dir, reflected), 0.0), SHININESS) * u.light_color;

    var color = min((ambient + diffuse) * in.color + specular, vec3<f32>(1.0));
    if (u.put_fog != 0) {
        let distance = length(in.eye_position);
        let visibility = clamp(exp(-pow(distance * FOG_DENSITY, 2.0)), 0.0, 1.0);
        color = mix(FOG_COLOR, color, visibility);
    }
    return vec4<f32>(color, 1.0);
}
"#;

/// Skybox program: samples the cube texture by direction and pins depth to the far plane.
pub const SKYBOX_SHADER_SOURCE: &str = r#"
struct SkyboxUniforms {
    model: mat4x4<f32>,
    view: mat4x4<f32>,
    projection: mat4x4<f32>,
};

@group(0) @binding(0) var<uniform> u: SkyboxUniforms;
@group(0) @binding(1) var skybox_texture: texture_cube<f32>;
@group(0) @binding(2) var skybox_sampler: sampler;

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) direction: vec3<f32>,
};

@vertex
fn vs_main(@location(0) position: vec3<f32>) -> VertexOutput {
    let clip = u.projection * u.view * u.model * vec4<f32>(position, 1.0);
    var out: VertexOutput;
    out.clip_position = clip.xyww;
    out.direction = position;
    return out;
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    return textureSample(skybox_texture, skybox_sampler, in.direction);
}
"#;

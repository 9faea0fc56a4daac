//! CPU half of the graphics backend.
//!
//! Uniform writes land in one [`UniformBlock`] per program. Each draw copies
//! the bound program's block into a slot of the frame's uniform arena and
//! records a [`DrawCommand`] pointing at that slot, so every draw sees the
//! uniforms as they were when it was issued even though the GPU work only
//! runs at present time.

use skyport_scene::{
    GpuError, MeshId, ProgramId, ScenePrograms, ShaderError, ShadingMode, UniformLocation,
    UniformValue,
};

use crate::programs::{
    LIT_PROGRAM, LIT_PROGRAM_ID, ProgramLayout, SKYBOX_PROGRAM, SKYBOX_PROGRAM_ID, UniformBlock,
};

/// Byte distance between arena slots for a given dynamic offset alignment.
pub fn slot_stride(offset_alignment: u32) -> usize {
    let block = LIT_PROGRAM.block_size.max(SKYBOX_PROGRAM.block_size);
    block.next_multiple_of(offset_alignment.max(1) as usize)
}

/// One recorded draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrawCommand {
    pub program: ProgramId,
    /// Shading mode in effect when the draw was issued.
    pub shading: ShadingMode,
    pub mesh: MeshId,
    /// Dynamic offset of this draw's uniforms inside the arena.
    pub offset: u32,
}

/// Everything recorded since the last present.
#[derive(Debug, Default)]
pub struct RecordedFrame {
    pub commands: Vec<DrawCommand>,
    pub arena: Vec<u8>,
    pub viewport: (u32, u32),
}

/// Records draws and uniform snapshots between presents.
#[derive(Debug)]
pub struct FrameRecorder {
    lit: UniformBlock,
    skybox: UniformBlock,
    current: Option<ProgramId>,
    shading: ShadingMode,
    viewport: (u32, u32),
    stride: usize,
    commands: Vec<DrawCommand>,
    arena: Vec<u8>,
    errors: Vec<GpuError>,
}

impl FrameRecorder {
    pub fn new(stride: usize, viewport: (u32, u32)) -> Self {
        Self {
            lit: UniformBlock::new(&LIT_PROGRAM),
            skybox: UniformBlock::new(&SKYBOX_PROGRAM),
            current: None,
            shading: ShadingMode::default(),
            viewport,
            stride,
            commands: Vec::new(),
            arena: Vec::new(),
            errors: Vec::new(),
        }
    }

    /// Program handles this recorder understands.
    pub fn programs() -> ScenePrograms {
        ScenePrograms {
            lit: LIT_PROGRAM_ID,
            skybox: SKYBOX_PROGRAM_ID,
        }
    }

    fn layout(program: ProgramId) -> Option<&'static ProgramLayout> {
        match program {
            LIT_PROGRAM_ID => Some(&LIT_PROGRAM),
            SKYBOX_PROGRAM_ID => Some(&SKYBOX_PROGRAM),
            _ => None,
        }
    }

    fn block_mut(&mut self, program: ProgramId) -> Option<&mut UniformBlock> {
        match program {
            LIT_PROGRAM_ID => Some(&mut self.lit),
            SKYBOX_PROGRAM_ID => Some(&mut self.skybox),
            _ => None,
        }
    }

    pub fn uniform_location(
        &self,
        program: ProgramId,
        name: &str,
    ) -> Result<UniformLocation, ShaderError> {
        let layout = Self::layout(program).ok_or(ShaderError::UnknownProgram(program))?;
        let slot = layout
            .slot(name)
            .ok_or_else(|| ShaderError::MissingUniform {
                program,
                name: name.to_string(),
            })?;
        Ok(UniformLocation { program, slot })
    }

    pub fn use_program(&mut self, program: ProgramId) {
        if Self::layout(program).is_none() {
            self.report(GpuError::Validation(format!(
                "use_program: unknown program {}",
                program.0
            )));
            return;
        }
        self.current = Some(program);
    }

    pub fn set_uniform(&mut self, location: UniformLocation, value: UniformValue) {
        let Some(block) = self.block_mut(location.program) else {
            self.report(GpuError::Validation(format!(
                "set_uniform: unknown program {}",
                location.program.0
            )));
            return;
        };
        if let Err(e) = block.write(location.slot, &value) {
            self.report(GpuError::Validation(format!(
                "set_uniform on program {}: {e:?}",
                location.program.0
            )));
        }
    }

    pub fn set_shading_mode(&mut self, mode: ShadingMode) {
        self.shading = mode;
    }

    pub fn set_viewport(&mut self, width: u32, height: u32) {
        self.viewport = (width, height);
    }

    /// Snapshot the bound program's uniforms and queue a draw of `mesh`.
    pub fn draw(&mut self, mesh: MeshId) {
        let Some(program) = self.current else {
            self.report(GpuError::Validation(format!(
                "draw_mesh {} with no program bound",
                mesh.0
            )));
            return;
        };
        let block = if program == SKYBOX_PROGRAM_ID {
            &self.skybox
        } else {
            &self.lit
        };

        let offset = self.arena.len();
        self.arena.extend_from_slice(block.bytes());
        self.arena.resize(offset + self.stride, 0);
        self.commands.push(DrawCommand {
            program,
            shading: self.shading,
            mesh,
            offset: offset as u32,
        });
    }

    /// Queue an error for the next drain.
    pub fn report(&mut self, error: GpuError) {
        log::debug!("Queued {error}");
        self.errors.push(error);
    }

    /// Take every error recorded since the last call.
    pub fn drain_errors(&mut self) -> Vec<GpuError> {
        std::mem::take(&mut self.errors)
    }

    /// Hand over the recorded frame. Uniform values, the bound program and the
    /// shading mode carry over to the next frame.
    pub fn take_frame(&mut self) -> RecordedFrame {
        RecordedFrame {
            commands: std::mem::take(&mut self.commands),
            arena: std::mem::take(&mut self.arena),
            viewport: self.viewport,
        }
    }

    /// Draws recorded so far this frame.
    pub fn pending_draws(&self) -> usize {
        self.commands.len()
    }

    pub fn viewport(&self) -> (u32, u32) {
        self.viewport
    }

    pub fn stride(&self) -> usize {
        self.stride
    }
}

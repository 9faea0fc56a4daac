//! wgpu implementation of the scene's [`GraphicsApi`].

use std::num::NonZeroU64;
use std::path::{Path, PathBuf};

use skyport_scene::{
    GpuError, GraphicsApi, MeshId, Model, ProgramId, ScenePrograms, ShaderError, ShadingMode,
    Skybox, UniformLocation, UniformValue,
};

use crate::assets::{self, AssetError};
use crate::buffer::{BufferAllocator, MeshBuffer};
use crate::depth::DepthBuffer;
use crate::gpu::{RenderContext, SurfaceError};
use crate::pass::{FrameEncoder, RenderPassBuilder, clear_color_from_rgb};
use crate::pipeline::ScenePipelines;
use crate::programs::{LIT_PROGRAM, SKYBOX_PROGRAM, SKYBOX_PROGRAM_ID};
use crate::recorder::{FrameRecorder, slot_stride};
use crate::texture::CubeTexture;

/// Arena slots allocated up front. Grows by doubling.
const INITIAL_ARENA_SLOTS: usize = 64;

/// GPU uniform arena plus the bind groups that view it.
struct UniformArena {
    buffer: wgpu::Buffer,
    slots: usize,
    lit_bind_group: wgpu::BindGroup,
    skybox_bind_group: Option<wgpu::BindGroup>,
}

/// Owns the device, every uploaded mesh and the frame recorder.
///
/// Draw calls only record. [`WgpuGraphics::present`] uploads the frame's
/// uniform snapshots and replays the draws in order in a single pass.
pub struct WgpuGraphics {
    context: RenderContext,
    depth: DepthBuffer,
    pipelines: ScenePipelines,
    meshes: Vec<MeshBuffer>,
    skybox_texture: Option<CubeTexture>,
    arena: UniformArena,
    recorder: FrameRecorder,
}

impl WgpuGraphics {
    pub fn new(context: RenderContext) -> Self {
        let (width, height) = context.size();
        let depth = DepthBuffer::new(&context.device, width, height);
        let pipelines = ScenePipelines::new(
            &context.device,
            context.surface_format,
            context.polygon_support,
        );
        let alignment = context.device.limits().min_uniform_buffer_offset_alignment;
        let recorder = FrameRecorder::new(slot_stride(alignment), (width, height));
        let arena = create_arena(
            &context.device,
            &pipelines,
            None,
            recorder.stride(),
            INITIAL_ARENA_SLOTS,
        );

        Self {
            context,
            depth,
            pipelines,
            meshes: Vec::new(),
            skybox_texture: None,
            arena,
            recorder,
        }
    }

    /// Handles of the lit and skybox programs.
    pub fn programs(&self) -> ScenePrograms {
        FrameRecorder::programs()
    }

    pub fn context(&self) -> &RenderContext {
        &self.context
    }

    /// Surface size in physical pixels.
    pub fn size(&self) -> (u32, u32) {
        self.context.size()
    }

    /// Load an OBJ file and upload each of its objects as a mesh.
    pub fn load_model(&mut self, path: &Path) -> Result<Model, AssetError> {
        let meshes = assets::load_obj(path)?;
        let allocator = BufferAllocator::new(&self.context.device);
        let mut ids = Vec::with_capacity(meshes.len());
        for mesh in &meshes {
            self.meshes
                .push(allocator.create_mesh(&mesh.label, &mesh.vertices, &mesh.indices));
            ids.push(MeshId(self.meshes.len() as u32 - 1));
        }
        log::info!("Loaded model {} ({} meshes)", path.display(), ids.len());
        Ok(Model::new(ids))
    }

    /// Load six cube faces (+X, -X, +Y, -Y, +Z, -Z) and upload the skybox cube.
    pub fn load_skybox(&mut self, faces: &[PathBuf; 6]) -> Result<Skybox, AssetError> {
        let decoded = assets::load_cube_faces(faces)?;
        let texture = CubeTexture::upload(&self.context.device, &self.context.queue, &decoded);

        let (vertices, indices) = assets::skybox_cube();
        let cube =
            BufferAllocator::new(&self.context.device).create_mesh("skybox", &vertices, &indices);
        self.meshes.push(cube);
        let mesh = MeshId(self.meshes.len() as u32 - 1);

        self.arena.skybox_bind_group = Some(create_skybox_bind_group(
            &self.context.device,
            &self.pipelines,
            &self.arena.buffer,
            &texture,
        ));
        self.skybox_texture = Some(texture);
        log::info!("Loaded skybox ({}px faces)", decoded.size);
        Ok(Skybox::new(mesh))
    }

    /// Reconfigure the surface and depth buffer. Zero sizes clamp to 1.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.context.resize(width, height);
        let (width, height) = self.context.size();
        self.depth.resize(&self.context.device, width, height);
    }

    /// Upload this frame's uniforms, replay its draws into one pass cleared to
    /// `clear_color` and present.
    ///
    /// The recorded frame is consumed even when the surface cannot be acquired.
    pub fn present(&mut self, clear_color: [f32; 3]) -> Result<(), SurfaceError> {
        let frame = self.recorder.take_frame();
        self.reserve_slots(frame.commands.len());
        if !frame.arena.is_empty() {
            self.context
                .queue
                .write_buffer(&self.arena.buffer, 0, &frame.arena);
        }

        let surface_texture = self.context.get_current_texture()?;
        let (surface_width, surface_height) = self.context.size();
        let viewport_width = frame.viewport.0.clamp(1, surface_width);
        let viewport_height = frame.viewport.1.clamp(1, surface_height);

        let builder = RenderPassBuilder::new()
            .clear_color(clear_color_from_rgb(clear_color))
            .depth(self.depth.view.clone(), DepthBuffer::CLEAR_VALUE)
            .label("scene-pass");

        let mut encoder =
            FrameEncoder::new(&self.context.device, &self.context.queue, surface_texture);
        if let Some(mut pass) = encoder.begin_render_pass(&builder) {
            pass.set_viewport(
                0.0,
                0.0,
                viewport_width as f32,
                viewport_height as f32,
                0.0,
                1.0,
            );
            for command in &frame.commands {
                let Some(mesh) = self.meshes.get(command.mesh.0 as usize) else {
                    continue;
                };
                let (pipeline, bind_group) = if command.program == SKYBOX_PROGRAM_ID {
                    let Some(bind_group) = self.arena.skybox_bind_group.as_ref() else {
                        continue;
                    };
                    (self.pipelines.skybox(), bind_group)
                } else {
                    (
                        self.pipelines.lit(command.shading),
                        &self.arena.lit_bind_group,
                    )
                };
                pass.set_pipeline(pipeline);
                pass.set_bind_group(0, bind_group, &[command.offset]);
                mesh.bind(&mut pass);
                mesh.draw(&mut pass);
            }
        }
        encoder.submit();
        Ok(())
    }

    /// Grow the arena so it holds at least `draws` slots.
    fn reserve_slots(&mut self, draws: usize) {
        if draws <= self.arena.slots {
            return;
        }
        let slots = draws.next_power_of_two();
        log::debug!("Growing uniform arena to {slots} slots");
        self.arena = create_arena(
            &self.context.device,
            &self.pipelines,
            self.skybox_texture.as_ref(),
            self.recorder.stride(),
            slots,
        );
    }
}

fn create_arena(
    device: &wgpu::Device,
    pipelines: &ScenePipelines,
    skybox_texture: Option<&CubeTexture>,
    stride: usize,
    slots: usize,
) -> UniformArena {
    let buffer = device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("uniform-arena"),
        size: (stride * slots) as u64,
        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    });

    let lit_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("lit-bind-group"),
        layout: &pipelines.lit_bind_group_layout,
        entries: &[arena_entry(&buffer, LIT_PROGRAM.block_size)],
    });
    let skybox_bind_group = skybox_texture
        .map(|texture| create_skybox_bind_group(device, pipelines, &buffer, texture));

    UniformArena {
        buffer,
        slots,
        lit_bind_group,
        skybox_bind_group,
    }
}

fn arena_entry(buffer: &wgpu::Buffer, block_size: usize) -> wgpu::BindGroupEntry<'_> {
    wgpu::BindGroupEntry {
        binding: 0,
        resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
            buffer,
            offset: 0,
            size: NonZeroU64::new(block_size as u64),
        }),
    }
}

fn create_skybox_bind_group(
    device: &wgpu::Device,
    pipelines: &ScenePipelines,
    buffer: &wgpu::Buffer,
    texture: &CubeTexture,
) -> wgpu::BindGroup {
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("skybox-bind-group"),
        layout: &pipelines.skybox_bind_group_layout,
        entries: &[
            arena_entry(buffer, SKYBOX_PROGRAM.block_size),
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::TextureView(&texture.view),
            },
            wgpu::BindGroupEntry {
                binding: 2,
                resource: wgpu::BindingResource::Sampler(&texture.sampler),
            },
        ],
    })
}

impl GraphicsApi for WgpuGraphics {
    fn uniform_location(
        &self,
        program: ProgramId,
        name: &str,
    ) -> Result<UniformLocation, ShaderError> {
        self.recorder.uniform_location(program, name)
    }

    fn use_program(&mut self, program: ProgramId) {
        self.recorder.use_program(program);
    }

    fn set_uniform(&mut self, location: UniformLocation, value: UniformValue) {
        self.recorder.set_uniform(location, value);
    }

    fn set_shading_mode(&mut self, mode: ShadingMode) {
        log::debug!("Shading mode {mode:?}");
        self.recorder.set_shading_mode(mode);
    }

    fn set_viewport(&mut self, width: u32, height: u32) {
        self.recorder.set_viewport(width, height);
    }

    fn draw_mesh(&mut self, mesh: MeshId) {
        if self.meshes.get(mesh.0 as usize).is_none() {
            self.recorder
                .report(GpuError::Validation(format!("draw_mesh: unknown mesh {}", mesh.0)));
            return;
        }
        self.recorder.draw(mesh);
    }

    fn drain_errors(&mut self) -> Vec<GpuError> {
        let mut errors = self.recorder.drain_errors();
        errors.extend(self.context.drain_errors());
        errors
    }
}

//! Render pipelines for the lit models and the skybox.

use std::num::NonZeroU64;

use skyport_scene::ShadingMode;

use crate::buffer::{VertexPosition, VertexPositionNormalColor};
use crate::depth::DepthBuffer;
use crate::gpu::PolygonSupport;
use crate::programs::{LIT_PROGRAM, ProgramLayout, SKYBOX_PROGRAM};

/// Rasterization and blending used for a lit pipeline.
pub fn shading_state(mode: ShadingMode) -> (wgpu::PolygonMode, Option<wgpu::BlendState>) {
    match mode {
        ShadingMode::Solid => (wgpu::PolygonMode::Fill, None),
        ShadingMode::Wireframe => (wgpu::PolygonMode::Line, None),
        ShadingMode::Points => (wgpu::PolygonMode::Point, None),
        ShadingMode::SolidBlended => (
            wgpu::PolygonMode::Fill,
            Some(wgpu::BlendState {
                color: wgpu::BlendComponent {
                    src_factor: wgpu::BlendFactor::SrcAlpha,
                    dst_factor: wgpu::BlendFactor::OneMinusDstAlpha,
                    operation: wgpu::BlendOperation::Add,
                },
                alpha: wgpu::BlendComponent::OVER,
            }),
        ),
    }
}

fn uniform_entry(layout: &ProgramLayout) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding: 0,
        visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: true,
            min_binding_size: NonZeroU64::new(layout.block_size as u64),
        },
        count: None,
    }
}

/// Every pipeline the scene draws with, plus their bind group layouts.
pub struct ScenePipelines {
    pub lit_bind_group_layout: wgpu::BindGroupLayout,
    pub skybox_bind_group_layout: wgpu::BindGroupLayout,
    /// Indexed by [`ShadingMode::index`].
    lit: Vec<wgpu::RenderPipeline>,
    skybox: wgpu::RenderPipeline,
}

impl ScenePipelines {
    /// Build the lit pipeline for each shading mode and the skybox pipeline.
    ///
    /// Modes whose polygon mode the device lacks get a fill pipeline instead.
    pub fn new(
        device: &wgpu::Device,
        surface_format: wgpu::TextureFormat,
        polygon_support: PolygonSupport,
    ) -> Self {
        let lit_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("lit-bind-group-layout"),
                entries: &[uniform_entry(&LIT_PROGRAM)],
            });

        let skybox_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("skybox-bind-group-layout"),
                entries: &[
                    uniform_entry(&SKYBOX_PROGRAM),
                    wgpu::BindGroupLayoutEntry {
                        binding: 1,
                        visibility: wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Texture {
                            sample_type: wgpu::TextureSampleType::Float { filterable: true },
                            view_dimension: wgpu::TextureViewDimension::Cube,
                            multisampled: false,
                        },
                        count: None,
                    },
                    wgpu::BindGroupLayoutEntry {
                        binding: 2,
                        visibility: wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                        count: None,
                    },
                ],
            });

        let lit_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(LIT_PROGRAM.label),
            source: wgpu::ShaderSource::Wgsl(LIT_PROGRAM.source.into()),
        });
        let lit_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("lit-pipeline-layout"),
            bind_group_layouts: &[&lit_bind_group_layout],
            immediate_size: 0,
        });

        let lit = ShadingMode::ALL
            .iter()
            .map(|&mode| {
                let (mut polygon_mode, blend) = shading_state(mode);
                if !polygon_support.supports(polygon_mode) {
                    log::warn!("{mode:?} shading unsupported by device, using fill");
                    polygon_mode = wgpu::PolygonMode::Fill;
                }
                create_pipeline(
                    device,
                    &PipelineParams {
                        label: "lit-pipeline",
                        layout: &lit_layout,
                        shader: &lit_shader,
                        vertex_layout: VertexPositionNormalColor::layout(),
                        surface_format,
                        polygon_mode,
                        blend,
                        cull_mode: Some(wgpu::Face::Back),
                        depth_write_enabled: true,
                        depth_compare: DepthBuffer::COMPARE_FUNCTION,
                    },
                )
            })
            .collect();

        let skybox_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(SKYBOX_PROGRAM.label),
            source: wgpu::ShaderSource::Wgsl(SKYBOX_PROGRAM.source.into()),
        });
        let skybox_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("skybox-pipeline-layout"),
            bind_group_layouts: &[&skybox_bind_group_layout],
            immediate_size: 0,
        });
        // Viewed from inside the cube, so nothing is culled. Depth sits at the
        // far plane and never occludes.
        let skybox = create_pipeline(
            device,
            &PipelineParams {
                label: "skybox-pipeline",
                layout: &skybox_layout,
                shader: &skybox_shader,
                vertex_layout: VertexPosition::layout(),
                surface_format,
                polygon_mode: wgpu::PolygonMode::Fill,
                blend: None,
                cull_mode: None,
                depth_write_enabled: false,
                depth_compare: wgpu::CompareFunction::LessEqual,
            },
        );

        Self {
            lit_bind_group_layout,
            skybox_bind_group_layout,
            lit,
            skybox,
        }
    }

    /// Lit pipeline for `mode`.
    pub fn lit(&self, mode: ShadingMode) -> &wgpu::RenderPipeline {
        &self.lit[mode.index()]
    }

    pub fn skybox(&self) -> &wgpu::RenderPipeline {
        &self.skybox
    }
}

struct PipelineParams<'a> {
    label: &'static str,
    layout: &'a wgpu::PipelineLayout,
    shader: &'a wgpu::ShaderModule,
    vertex_layout: wgpu::VertexBufferLayout<'static>,
    surface_format: wgpu::TextureFormat,
    polygon_mode: wgpu::PolygonMode,
    blend: Option<wgpu::BlendState>,
    cull_mode: Option<wgpu::Face>,
    depth_write_enabled: bool,
    depth_compare: wgpu::CompareFunction,
}

fn create_pipeline(device: &wgpu::Device, params: &PipelineParams) -> wgpu::RenderPipeline {
    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(params.label),
        layout: Some(params.layout),
        vertex: wgpu::VertexState {
            module: params.shader,
            entry_point: Some("vs_main"),
            buffers: &[params.vertex_layout.clone()],
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: params.shader,
            entry_point: Some("fs_main"),
            targets: &[Some(wgpu::ColorTargetState {
                format: params.surface_format,
                blend: params.blend,
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: params.cull_mode,
            unclipped_depth: false,
            polygon_mode: params.polygon_mode,
            conservative: false,
        },
        depth_stencil: Some(wgpu::DepthStencilState {
            format: DepthBuffer::FORMAT,
            depth_write_enabled: params.depth_write_enabled,
            depth_compare: params.depth_compare,
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        }),
        multisample: wgpu::MultisampleState {
            count: 1,
            mask: !0,
            alpha_to_coverage_enabled: false,
        },
        multiview_mask: None,
        cache: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gpu::create_test_device;

    #[test]
    fn test_shading_state_per_mode() {
        assert_eq!(shading_state(ShadingMode::Solid), (wgpu::PolygonMode::Fill, None));
        assert_eq!(shading_state(ShadingMode::Wireframe).0, wgpu::PolygonMode::Line);
        assert_eq!(shading_state(ShadingMode::Points).0, wgpu::PolygonMode::Point);

        let (mode, blend) = shading_state(ShadingMode::SolidBlended);
        assert_eq!(mode, wgpu::PolygonMode::Fill);
        let blend = blend.unwrap();
        assert_eq!(blend.color.src_factor, wgpu::BlendFactor::SrcAlpha);
        assert_eq!(blend.color.dst_factor, wgpu::BlendFactor::OneMinusDstAlpha);
    }

    #[test]
    fn test_blending_only_in_blended_mode() {
        for mode in ShadingMode::ALL {
            assert_eq!(
                shading_state(mode).1.is_some(),
                mode == ShadingMode::SolidBlended
            );
        }
    }

    #[test]
    fn test_pipelines_build_without_polygon_features() {
        let Some((device, _queue)) = create_test_device() else {
            return;
        };
        let sink = crate::gpu::install_error_sink(&device);
        let pipelines = ScenePipelines::new(
            &device,
            wgpu::TextureFormat::Bgra8UnormSrgb,
            PolygonSupport::default(),
        );
        let _ = pipelines.lit(ShadingMode::Points);
        let _ = pipelines.skybox();
        let _ = device.poll(wgpu::PollType::Wait {
            submission_index: None,
            timeout: None,
        });
        assert!(crate::gpu::drain_sink(&sink).is_empty());
    }
}

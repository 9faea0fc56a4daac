//! wgpu backend for the Skyport viewer.
//!
//! Owns the device and surface, turns OBJ models and skybox faces into GPU
//! resources, and implements the scene's `GraphicsApi` by recording draws
//! and replaying them in one render pass per frame.

pub mod assets;
pub mod buffer;
pub mod depth;
pub mod gpu;
pub mod graphics;
pub mod pass;
pub mod pipeline;
pub mod programs;
pub mod recorder;
pub mod texture;

pub use assets::{AssetError, CubeFaces, MeshData, load_cube_faces, load_obj, skybox_cube};
pub use buffer::{BufferAllocator, MeshBuffer, VertexPosition, VertexPositionNormalColor};
pub use depth::DepthBuffer;
pub use gpu::{
    PolygonSupport, RenderContext, RenderContextError, SurfaceError, init_render_context_blocking,
};
pub use graphics::WgpuGraphics;
pub use pass::{FrameEncoder, RenderPassBuilder};
pub use pipeline::ScenePipelines;
pub use programs::{LIT_PROGRAM, SKYBOX_PROGRAM, UniformBlock, UniformKind};
pub use recorder::{DrawCommand, FrameRecorder};
pub use texture::CubeTexture;

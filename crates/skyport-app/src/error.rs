//! Startup errors for the viewer binary.

use skyport_render::{AssetError, RenderContextError};
use skyport_scene::ShaderError;

use crate::platform::PlatformError;

/// Anything that stops the viewer before or while it starts rendering.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("event loop error: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),

    #[error("window creation failed: {0}")]
    Window(#[from] winit::error::OsError),

    #[error("GPU initialization failed: {0}")]
    Gpu(#[from] RenderContextError),

    #[error("asset loading failed: {0}")]
    Asset(#[from] AssetError),

    #[error("shader binding failed: {0}")]
    Scene(#[from] ShaderError),

    #[error(transparent)]
    Platform(#[from] PlatformError),
}

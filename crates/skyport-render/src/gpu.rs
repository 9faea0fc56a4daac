//! GPU device initialization and surface management.
//!
//! Provides [`RenderContext`] which owns all wgpu GPU state, and [`RenderContextError`]
//! for clear diagnostics when initialization fails. Device errors raised outside an
//! error scope are collected by the context and drained once per frame.

use std::sync::{Arc, Mutex};

use skyport_scene::GpuError;
use winit::window::Window;

/// Error type for render context initialization failures.
#[derive(Debug, thiserror::Error)]
pub enum RenderContextError {
    /// No compatible GPU adapter found.
    #[error("no compatible GPU adapter found")]
    NoAdapter,

    /// Failed to request GPU device.
    #[error("failed to request GPU device: {0}")]
    DeviceRequest(#[from] wgpu::RequestDeviceError),

    /// Failed to create surface.
    #[error("failed to create surface: {0}")]
    SurfaceCreation(#[from] wgpu::CreateSurfaceError),
}

/// Error type for surface acquisition failures.
#[derive(Debug, thiserror::Error)]
pub enum SurfaceError {
    /// Surface was lost and could not be recovered.
    #[error("surface lost")]
    Lost,

    /// GPU ran out of memory.
    #[error("out of memory")]
    OutOfMemory,

    /// Operation timed out (recoverable - skip frame).
    #[error("timeout")]
    Timeout,
}

/// Rasterization features beyond fill that the device was created with.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PolygonSupport {
    /// `PolygonMode::Line` is available.
    pub line: bool,
    /// `PolygonMode::Point` is available.
    pub point: bool,
}

impl PolygonSupport {
    /// Derive support from a feature set.
    pub fn from_features(features: wgpu::Features) -> Self {
        Self {
            line: features.contains(wgpu::Features::POLYGON_MODE_LINE),
            point: features.contains(wgpu::Features::POLYGON_MODE_POINT),
        }
    }

    /// Whether pipelines may use `mode`.
    pub fn supports(&self, mode: wgpu::PolygonMode) -> bool {
        match mode {
            wgpu::PolygonMode::Fill => true,
            wgpu::PolygonMode::Line => self.line,
            wgpu::PolygonMode::Point => self.point,
        }
    }
}

/// Shared sink the uncaptured-error handler pushes into.
pub type ErrorSink = Arc<Mutex<Vec<GpuError>>>;

/// Owns all GPU state: instance, adapter, device, queue, and surface.
pub struct RenderContext {
    pub instance: wgpu::Instance,
    pub adapter: wgpu::Adapter,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub surface: wgpu::Surface<'static>,
    pub surface_config: wgpu::SurfaceConfiguration,
    pub surface_format: wgpu::TextureFormat,
    pub polygon_support: PolygonSupport,
    errors: ErrorSink,
}

impl RenderContext {
    /// Initialize the GPU asynchronously from a window handle.
    ///
    /// Line and point rasterization are requested only when the adapter
    /// offers them; wireframe and point shading fall back to fill otherwise.
    pub async fn new(window: Arc<Window>, vsync: bool) -> Result<Self, RenderContextError> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let size = window.inner_size();
        let surface = instance.create_surface(window)?;

        let adapter = match instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
        {
            Ok(adapter) => adapter,
            Err(_) => return Err(RenderContextError::NoAdapter),
        };

        let info = adapter.get_info();
        log::info!(
            "Selected GPU: {} ({:?}, {:?})",
            info.name,
            info.backend,
            info.device_type
        );

        let wanted = wgpu::Features::POLYGON_MODE_LINE | wgpu::Features::POLYGON_MODE_POINT;
        let required_features = adapter.features() & wanted;
        let polygon_support = PolygonSupport::from_features(required_features);
        if !polygon_support.line || !polygon_support.point {
            log::warn!(
                "Adapter lacks polygon modes (line: {}, point: {}); falling back to fill",
                polygon_support.line,
                polygon_support.point
            );
        }

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("skyport-device"),
                required_features,
                required_limits: wgpu::Limits::default(),
                memory_hints: wgpu::MemoryHints::default(),
                experimental_features: wgpu::ExperimentalFeatures::default(),
                trace: wgpu::Trace::Off,
            })
            .await?;

        let errors = install_error_sink(&device);

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = select_preferred_srgb_format(&surface_caps.formats);
        let present_mode = select_present_mode(vsync, &surface_caps.present_modes);
        log::info!("Surface format {surface_format:?}, present mode {present_mode:?}");

        let surface_config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode,
            alpha_mode: surface_caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &surface_config);

        Ok(Self {
            instance,
            adapter,
            device,
            queue,
            surface,
            surface_config,
            surface_format,
            polygon_support,
            errors,
        })
    }

    /// Reconfigure the surface after a window resize.
    /// Clamps dimensions to max(1, val) to prevent zero-size surfaces.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.surface_config.width = width.max(1);
        self.surface_config.height = height.max(1);
        self.surface.configure(&self.device, &self.surface_config);
    }

    /// Current surface size in physical pixels.
    pub fn size(&self) -> (u32, u32) {
        (self.surface_config.width, self.surface_config.height)
    }

    /// Get the current surface texture, with automatic recovery for lost surfaces.
    pub fn get_current_texture(&self) -> Result<wgpu::SurfaceTexture, SurfaceError> {
        match self.surface.get_current_texture() {
            Ok(texture) => Ok(texture),
            Err(wgpu::SurfaceError::Lost) => {
                log::warn!("Surface lost, attempting to recover...");
                self.reacquire()
            }
            Err(wgpu::SurfaceError::Outdated) => {
                log::warn!("Surface outdated, attempting to recover...");
                self.reacquire()
            }
            Err(wgpu::SurfaceError::OutOfMemory) => Err(SurfaceError::OutOfMemory),
            Err(wgpu::SurfaceError::Timeout) => Err(SurfaceError::Timeout),
            Err(wgpu::SurfaceError::Other) => {
                log::error!("Unknown surface error occurred");
                Err(SurfaceError::Lost)
            }
        }
    }

    fn reacquire(&self) -> Result<wgpu::SurfaceTexture, SurfaceError> {
        self.surface.configure(&self.device, &self.surface_config);
        self.surface
            .get_current_texture()
            .map_err(|_| SurfaceError::Lost)
    }

    /// Take every device error reported since the last call.
    pub fn drain_errors(&self) -> Vec<GpuError> {
        drain_sink(&self.errors)
    }
}

/// Initialize the GPU synchronously using `pollster`.
pub fn init_render_context_blocking(
    window: Arc<Window>,
    vsync: bool,
) -> Result<RenderContext, RenderContextError> {
    pollster::block_on(RenderContext::new(window, vsync))
}

/// Route uncaptured device errors into a shared queue instead of the default panic.
pub fn install_error_sink(device: &wgpu::Device) -> ErrorSink {
    let sink: ErrorSink = Arc::new(Mutex::new(Vec::new()));
    let writer = Arc::clone(&sink);
    let handler: Box<dyn wgpu::UncapturedErrorHandler> = Box::new(move |error| {
        let error = classify_error(error);
        log::debug!("Captured {error}");
        if let Ok(mut errors) = writer.lock() {
            errors.push(error);
        }
    });
    device.on_uncaptured_error(handler.into());
    sink
}

/// Empty the sink. A poisoned lock yields nothing rather than panicking.
pub fn drain_sink(sink: &ErrorSink) -> Vec<GpuError> {
    sink.lock()
        .map(|mut errors| std::mem::take(&mut *errors))
        .unwrap_or_default()
}

fn classify_error(error: wgpu::Error) -> GpuError {
    match error {
        wgpu::Error::OutOfMemory { .. } => GpuError::OutOfMemory,
        wgpu::Error::Validation { description, .. } => GpuError::Validation(description),
        other => GpuError::Internal(other.to_string()),
    }
}

/// Fifo when vsync is on. Otherwise the lowest-latency mode the surface offers.
fn select_present_mode(vsync: bool, modes: &[wgpu::PresentMode]) -> wgpu::PresentMode {
    if vsync {
        return wgpu::PresentMode::Fifo;
    }
    [wgpu::PresentMode::Immediate, wgpu::PresentMode::Mailbox]
        .into_iter()
        .find(|mode| modes.contains(mode))
        .unwrap_or(wgpu::PresentMode::Fifo)
}

/// Select the preferred surface format, preferring sRGB.
fn select_preferred_srgb_format(formats: &[wgpu::TextureFormat]) -> wgpu::TextureFormat {
    if formats.contains(&wgpu::TextureFormat::Bgra8UnormSrgb) {
        wgpu::TextureFormat::Bgra8UnormSrgb
    } else if formats.contains(&wgpu::TextureFormat::Rgba8UnormSrgb) {
        wgpu::TextureFormat::Rgba8UnormSrgb
    } else {
        formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .or_else(|| formats.first().copied())
            .unwrap_or(wgpu::TextureFormat::Bgra8UnormSrgb)
    }
}

/// Headless device for tests. Returns `None` when no adapter is available (CI).
#[cfg(test)]
pub(crate) fn create_test_device() -> Option<(wgpu::Device, wgpu::Queue)> {
    pollster::block_on(async {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                force_fallback_adapter: false,
                compatible_surface: None,
            })
            .await
            .ok()?;

        adapter
            .request_device(&wgpu::DeviceDescriptor::default())
            .await
            .ok()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefers_bgra_srgb() {
        let formats = [
            wgpu::TextureFormat::Rgba8Unorm,
            wgpu::TextureFormat::Rgba8UnormSrgb,
            wgpu::TextureFormat::Bgra8UnormSrgb,
        ];
        assert_eq!(
            select_preferred_srgb_format(&formats),
            wgpu::TextureFormat::Bgra8UnormSrgb
        );
    }

    #[test]
    fn test_falls_back_to_first_format() {
        let formats = [wgpu::TextureFormat::Rgba16Float, wgpu::TextureFormat::Rgba8Unorm];
        assert_eq!(
            select_preferred_srgb_format(&formats),
            wgpu::TextureFormat::Rgba16Float
        );
    }

    #[test]
    fn test_empty_format_list_does_not_panic() {
        assert_eq!(
            select_preferred_srgb_format(&[]),
            wgpu::TextureFormat::Bgra8UnormSrgb
        );
    }

    #[test]
    fn test_vsync_forces_fifo() {
        let modes = [wgpu::PresentMode::Immediate, wgpu::PresentMode::Fifo];
        assert_eq!(select_present_mode(true, &modes), wgpu::PresentMode::Fifo);
    }

    #[test]
    fn test_no_vsync_prefers_immediate_then_mailbox() {
        let all = [
            wgpu::PresentMode::Fifo,
            wgpu::PresentMode::Mailbox,
            wgpu::PresentMode::Immediate,
        ];
        assert_eq!(select_present_mode(false, &all), wgpu::PresentMode::Immediate);
        let mailbox = [wgpu::PresentMode::Fifo, wgpu::PresentMode::Mailbox];
        assert_eq!(select_present_mode(false, &mailbox), wgpu::PresentMode::Mailbox);
        let fifo = [wgpu::PresentMode::Fifo];
        assert_eq!(select_present_mode(false, &fifo), wgpu::PresentMode::Fifo);
    }

    #[test]
    fn test_polygon_support_from_features() {
        let support = PolygonSupport::from_features(wgpu::Features::POLYGON_MODE_LINE);
        assert!(support.supports(wgpu::PolygonMode::Fill));
        assert!(support.supports(wgpu::PolygonMode::Line));
        assert!(!support.supports(wgpu::PolygonMode::Point));
        assert_eq!(
            PolygonSupport::from_features(wgpu::Features::empty()),
            PolygonSupport::default()
        );
    }

    #[test]
    fn test_drain_sink_empties_queue() {
        let sink: ErrorSink = Arc::new(Mutex::new(vec![
            GpuError::OutOfMemory,
            GpuError::Validation("bad bind group".into()),
        ]));
        let drained = drain_sink(&sink);
        assert_eq!(drained.len(), 2);
        assert_eq!(drained[0], GpuError::OutOfMemory);
        assert!(drain_sink(&sink).is_empty());
    }

    #[test]
    fn test_validation_error_is_captured() {
        let Some((device, _queue)) = create_test_device() else {
            return;
        };
        let sink = install_error_sink(&device);
        // Mapped-at-creation buffers must have a size that is a multiple of 4.
        let _buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("misaligned"),
            size: 3,
            usage: wgpu::BufferUsages::UNIFORM,
            mapped_at_creation: true,
        });
        let _ = device.poll(wgpu::PollType::Wait {
            submission_index: None,
            timeout: None,
        });
        let errors = drain_sink(&sink);
        assert!(
            errors.iter().any(|e| matches!(e, GpuError::Validation(_))),
            "expected a validation error, got {errors:?}"
        );
    }
}

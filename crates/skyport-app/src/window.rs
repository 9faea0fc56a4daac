//! Window creation and event handling via winit.
//!
//! [`ViewerApp`] implements winit's [`ApplicationHandler`]. It owns the input
//! state and, once the window exists, the graphics backend and the
//! [`Viewer`]. Every redraw resolves input into actions, runs one viewer
//! frame, presents it and asks for the next redraw.

use std::sync::Arc;

use skyport_config::Config;
use skyport_input::{ActionResolver, ActionState, InputMap, KeyboardState, MouseState};
use skyport_render::{SurfaceError, WgpuGraphics, init_render_context_blocking};
use skyport_scene::{GraphicsApi, Viewer};
use tracing::{error, info, instrument, warn};
use winit::application::ApplicationHandler;
use winit::event::{DeviceEvent, DeviceId, WindowEvent};
use winit::event_loop::{ActiveEventLoop, EventLoop};
use winit::window::{Window, WindowAttributes, WindowId};

use crate::error::AppError;
use crate::loader::load_scene_assets;

/// Returns [`WindowAttributes`] based on the given configuration.
pub fn window_attributes_from_config(config: &Config) -> WindowAttributes {
    WindowAttributes::default()
        .with_title(config.window.title.clone())
        .with_inner_size(winit::dpi::LogicalSize::new(
            config.window.width as f64,
            config.window.height as f64,
        ))
}

/// A presentation target whose size follows the window.
pub trait SurfaceTarget: GraphicsApi {
    /// Reconfigure for a new window size.
    fn resize_surface(&mut self, width: u32, height: u32);
    /// Size actually in use after clamping.
    fn surface_size(&self) -> (u32, u32);
}

impl SurfaceTarget for WgpuGraphics {
    fn resize_surface(&mut self, width: u32, height: u32) {
        self.resize(width, height);
    }

    fn surface_size(&self) -> (u32, u32) {
        self.size()
    }
}

/// Resize the surface, then bring the viewer's projection and viewport in
/// line with the size the surface settled on.
pub fn resize_viewer<S: SurfaceTarget>(gfx: &mut S, viewer: &mut Viewer, width: u32, height: u32) {
    gfx.resize_surface(width, height);
    let (w, h) = gfx.surface_size();
    viewer.resize(w, h, gfx);
    info!("Surface resized to {}x{}", w, h);
}

/// Everything that only exists while a window does.
struct Session {
    gfx: WgpuGraphics,
    viewer: Viewer,
}

/// Application state driven by the winit event loop.
pub struct ViewerApp {
    config: Config,
    input_map: InputMap,
    keyboard: KeyboardState,
    mouse: MouseState,
    actions: ActionState,
    window: Option<Arc<Window>>,
    session: Option<Session>,
    startup_error: Option<AppError>,
}

impl ViewerApp {
    pub fn new(config: Config) -> Self {
        let input_map = InputMap::default_viewer().with_overrides(&config.input.keybindings);
        Self {
            config,
            input_map,
            keyboard: KeyboardState::new(),
            mouse: MouseState::new(),
            actions: ActionState::new(),
            window: None,
            session: None,
            startup_error: None,
        }
    }

    /// Whether the window and renderer are up.
    pub fn is_running(&self) -> bool {
        self.session.is_some()
    }

    /// Error that stopped startup, if any.
    pub fn take_startup_error(&mut self) -> Option<AppError> {
        self.startup_error.take()
    }

    /// Create the window, the GPU backend, the scene assets and the viewer.
    fn start(&mut self, event_loop: &ActiveEventLoop) -> Result<(), AppError> {
        let window = Arc::new(event_loop.create_window(window_attributes_from_config(&self.config))?);
        let context = init_render_context_blocking(window.clone(), self.config.window.vsync)?;
        let mut gfx = WgpuGraphics::new(context);

        let assets = load_scene_assets(&mut gfx, &self.config.assets)?;
        let programs = gfx.programs();
        let (width, height) = gfx.size();
        let viewer = Viewer::new(&self.config, programs, assets, &mut gfx, width, height)?;

        self.mouse.set_captured(&window, true);
        info!(width, height, "Viewer window ready");
        window.request_redraw();

        self.window = Some(window);
        self.session = Some(Session { gfx, viewer });
        Ok(())
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let Some(session) = &mut self.session else {
            return;
        };

        ActionResolver::resolve(&self.input_map, &self.keyboard, &self.mouse, &mut self.actions);
        session.viewer.frame(&self.actions, &mut session.gfx);

        match session.gfx.present(self.config.render.clear_color) {
            Ok(()) => {}
            Err(SurfaceError::Lost) => {
                if let Some(window) = &self.window {
                    let size = window.inner_size();
                    resize_viewer(&mut session.gfx, &mut session.viewer, size.width, size.height);
                }
            }
            Err(SurfaceError::OutOfMemory) => {
                error!("GPU out of memory");
                event_loop.exit();
                return;
            }
            Err(SurfaceError::Timeout) => {
                warn!("Surface timeout, skipping frame");
            }
        }
        session.viewer.check_gpu_errors(&mut session.gfx);

        // Clear per-frame transient input state after the frame has consumed it.
        self.keyboard.clear_transients();
        self.mouse.clear_transients();

        if session.viewer.quit_requested() {
            info!("Quit requested, shutting down");
            event_loop.exit();
        } else if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}

impl ApplicationHandler for ViewerApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() || self.startup_error.is_some() {
            return;
        }
        if let Err(e) = self.start(event_loop) {
            error!("Startup failed: {e}");
            self.startup_error = Some(e);
            event_loop.exit();
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => {
                info!("Close requested, shutting down");
                event_loop.exit();
            }
            WindowEvent::Resized(new_size) => {
                if let Some(session) = &mut self.session {
                    resize_viewer(
                        &mut session.gfx,
                        &mut session.viewer,
                        new_size.width,
                        new_size.height,
                    );
                }
            }
            WindowEvent::KeyboardInput { event, .. } => {
                self.keyboard.process_event(&event);
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.mouse.on_cursor_moved(position.x, position.y);
            }
            WindowEvent::CursorLeft { .. } => {
                self.mouse.on_cursor_left();
            }
            WindowEvent::Focused(focused) => {
                if !focused {
                    self.keyboard.release_all();
                }
                if let Some(window) = &self.window {
                    self.mouse.set_captured(window, focused);
                }
            }
            WindowEvent::RedrawRequested => self.redraw(event_loop),
            _ => {}
        }
    }

    fn device_event(
        &mut self,
        _event_loop: &ActiveEventLoop,
        _device_id: DeviceId,
        event: DeviceEvent,
    ) {
        if let DeviceEvent::MouseMotion { delta } = event {
            self.mouse.on_raw_motion(delta.0, delta.1);
        }
    }
}

/// Creates an event loop and runs the viewer until the window closes or
/// quit is requested.
///
/// # Errors
///
/// Returns the error that stopped startup, or an event loop failure.
#[instrument(skip_all)]
pub fn run(config: Config) -> Result<(), AppError> {
    let event_loop = EventLoop::new()?;
    let mut app = ViewerApp::new(config);
    event_loop.run_app(&mut app)?;
    match app.take_startup_error() {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use skyport_input::Action;
    use skyport_render::FrameRecorder;
    use skyport_scene::{
        GpuError, MeshId, Model, ProgramId, SceneAssets, ShaderError, ShadingMode, Skybox,
        UniformLocation, UniformValue,
    };

    #[test]
    fn test_app_starts_without_window() {
        let mut app = ViewerApp::new(Config::default());
        assert!(app.window.is_none());
        assert!(!app.is_running());
        assert!(app.take_startup_error().is_none());
    }

    #[test]
    fn test_keybinding_overrides_reach_input_map() {
        let mut config = Config::default();
        config
            .input
            .keybindings
            .insert("Quit".to_string(), "KeyX".to_string());
        let app = ViewerApp::new(config);
        let defaults = InputMap::default_viewer();
        assert_ne!(
            app.input_map.get_bindings(Action::Quit),
            defaults.get_bindings(Action::Quit)
        );
    }

    /// CPU-only surface: a recorder plus a size clamped like the real one.
    struct FakeSurface {
        recorder: FrameRecorder,
        size: (u32, u32),
    }

    impl GraphicsApi for FakeSurface {
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
            self.recorder.set_shading_mode(mode);
        }

        fn set_viewport(&mut self, width: u32, height: u32) {
            self.recorder.set_viewport(width, height);
        }

        fn draw_mesh(&mut self, mesh: MeshId) {
            self.recorder.draw(mesh);
        }

        fn drain_errors(&mut self) -> Vec<GpuError> {
            self.recorder.drain_errors()
        }
    }

    impl SurfaceTarget for FakeSurface {
        fn resize_surface(&mut self, width: u32, height: u32) {
            self.size = (width.max(1), height.max(1));
        }

        fn surface_size(&self) -> (u32, u32) {
            self.size
        }
    }

    fn scene_assets() -> SceneAssets {
        let model = |id| Model::new(vec![MeshId(id)]);
        SceneAssets {
            ground: model(0),
            skybox: Skybox::new(MeshId(1)),
            shuttle: model(2),
            city: model(3),
            freighter: model(4),
            jet: model(5),
            ufo: model(6),
            alien: model(7),
        }
    }

    #[test]
    fn test_resize_reaches_viewer_projection_and_viewport() {
        let mut gfx = FakeSurface {
            recorder: FrameRecorder::new(512, (800, 600)),
            size: (800, 600),
        };
        let programs = FrameRecorder::programs();
        let mut viewer =
            Viewer::new(&Config::default(), programs, scene_assets(), &mut gfx, 800, 600).unwrap();

        resize_viewer(&mut gfx, &mut viewer, 1280, 720);
        assert_eq!(viewer.projection().size(), (1280, 720));
        assert_eq!(gfx.recorder.viewport(), (1280, 720));

        // Zero sizes clamp before reaching the viewer.
        resize_viewer(&mut gfx, &mut viewer, 0, 0);
        assert_eq!(viewer.projection().size(), (1, 1));
        assert!(gfx.drain_errors().is_empty());
    }

    #[test]
    fn test_window_attributes_from_config() {
        let mut config = Config::default();
        config.window.title = "Skyport test".to_string();
        let attrs = window_attributes_from_config(&config);
        assert_eq!(attrs.title, "Skyport test");
    }
}

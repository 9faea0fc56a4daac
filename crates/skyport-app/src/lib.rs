//! Skyport viewer application.
//!
//! Resolves platform directories, opens the window and drives the viewer
//! from the winit event loop.

pub mod error;
pub mod loader;
pub mod platform;
pub mod window;

pub use error::AppError;
pub use loader::{AssetSource, load_scene_assets};
pub use platform::{PlatformDirs, PlatformError};
pub use window::{ViewerApp, run, window_attributes_from_config};

//! Configuration system for the Skyport viewer.
//!
//! Runtime settings persist to disk as `config.ron`. Every section defaults
//! independently, so older files keep loading after new settings appear, and
//! CLI arguments can override individual values after load.

mod cli;
mod config;
mod error;

pub use cli::CliArgs;
pub use config::{
    AnimationConfig, AssetConfig, CameraConfig, Config, DebugConfig, InputConfig,
    OscillatorConfig, PresentationConfig, RenderConfig, WindowConfig,
};
pub use error::ConfigError;

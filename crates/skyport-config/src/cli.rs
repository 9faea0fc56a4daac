//! Command-line argument parsing for the Skyport viewer.

use std::path::PathBuf;

use clap::Parser;

use crate::Config;

/// Skyport viewer command-line arguments.
///
/// CLI values override settings loaded from `config.ron`.
#[derive(Parser, Debug, Default)]
#[command(name = "skyport", about = "Skyport 3D scene viewer")]
pub struct CliArgs {
    /// Window width.
    #[arg(long)]
    pub width: Option<u32>,

    /// Window height.
    #[arg(long)]
    pub height: Option<u32>,

    /// Start with fog enabled or disabled.
    #[arg(long)]
    pub fog: Option<bool>,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Path to config directory (overrides default location).
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Asset root directory (overrides `assets.root`).
    #[arg(long)]
    pub assets: Option<PathBuf>,
}

impl Config {
    /// Apply CLI overrides to a loaded config.
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        if let Some(w) = args.width {
            self.window.width = w;
        }
        if let Some(h) = args.height {
            self.window.height = h;
        }
        if let Some(fog) = args.fog {
            self.render.fog = fog;
        }
        if let Some(ref level) = args.log_level {
            self.debug.log_level = level.clone();
        }
        if let Some(ref root) = args.assets {
            self.assets.root = root.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_override() {
        let mut config = Config::default();
        let args = CliArgs {
            width: Some(1920),
            fog: Some(true),
            assets: Some(PathBuf::from("/opt/skyport")),
            ..CliArgs::default()
        };
        config.apply_cli_overrides(&args);
        assert_eq!(config.window.width, 1920);
        assert!(config.render.fog);
        assert_eq!(config.assets.root, PathBuf::from("/opt/skyport"));
        // Non-overridden fields retain defaults
        assert_eq!(config.window.height, 768);
        assert_eq!(config.debug.log_level, "info");
    }

    #[test]
    fn test_cli_no_override() {
        let original = Config::default();
        let mut config = Config::default();
        config.apply_cli_overrides(&CliArgs::default());
        assert_eq!(config, original);
    }

    #[test]
    fn test_cli_parses_flags() {
        let args = CliArgs::parse_from([
            "skyport",
            "--width",
            "800",
            "--log-level",
            "debug",
            "--fog",
            "false",
        ]);
        assert_eq!(args.width, Some(800));
        assert_eq!(args.log_level.as_deref(), Some("debug"));
        assert_eq!(args.fog, Some(false));
        assert!(args.config.is_none());
    }
}

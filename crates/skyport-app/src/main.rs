//! The binary entry point for the Skyport viewer.

use clap::Parser;
use skyport_app::{AppError, PlatformDirs};
use skyport_config::{CliArgs, Config};

fn main() {
    let args = CliArgs::parse();

    if let Err(e) = start(args) {
        tracing::error!("{e}");
        eprintln!("skyport: {e}");
        std::process::exit(1);
    }
}

fn start(args: CliArgs) -> Result<(), AppError> {
    let dirs = PlatformDirs::resolve()?.with_config_dir(args.config.clone());
    dirs.create_dirs()?;

    // Logging needs the config for its level, so a load failure is only
    // reported once the subscriber exists.
    let (mut config, load_error) = match Config::load_or_create(&dirs.config_dir) {
        Ok(config) => (config, None),
        Err(e) => (Config::default(), Some(e)),
    };
    config.apply_cli_overrides(&args);

    skyport_log::init_logging(Some(&dirs.log_dir), cfg!(debug_assertions), Some(&config));
    if let Some(e) = load_error {
        tracing::warn!("Using default config, {} could not be loaded: {e}", dirs.config_dir.display());
    }
    tracing::info!(
        config = %dirs.config_dir.display(),
        logs = %dirs.log_dir.display(),
        "Skyport starting"
    );

    skyport_app::run(config)
}

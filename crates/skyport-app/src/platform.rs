//! OS directory resolution for configuration and logs.

use std::io;
use std::path::{Path, PathBuf};

/// Errors that can occur while resolving or creating platform directories.
#[derive(Debug, thiserror::Error)]
pub enum PlatformError {
    /// The OS did not provide a configuration directory.
    #[error("could not determine OS configuration directory")]
    NoConfigDir,
    /// Directory creation failed.
    #[error("platform I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Where the viewer keeps its files.
///
/// Follows OS conventions (XDG on Linux, Known Folders on Windows, Library on
/// macOS) through the `dirs` crate.
#[derive(Debug, Clone, PartialEq)]
pub struct PlatformDirs {
    /// Holds `config.ron`.
    pub config_dir: PathBuf,
    /// Holds the debug-build JSON log.
    pub log_dir: PathBuf,
}

const APP_NAME: &str = "skyport";

impl PlatformDirs {
    /// Resolve platform-specific directories without creating them on disk.
    ///
    /// # Errors
    ///
    /// Returns [`PlatformError::NoConfigDir`] if the OS does not expose a
    /// configuration directory.
    pub fn resolve() -> Result<Self, PlatformError> {
        let app_config = dirs::config_dir()
            .ok_or(PlatformError::NoConfigDir)?
            .join(APP_NAME);

        let log_dir = dirs::data_local_dir()
            .map(|dir| dir.join(APP_NAME).join("logs"))
            .unwrap_or_else(|| app_config.join("logs"));

        Ok(Self {
            config_dir: app_config,
            log_dir,
        })
    }

    /// Resolve directories and create them on disk.
    ///
    /// # Errors
    ///
    /// Returns [`PlatformError`] if resolution or directory creation fails.
    pub fn resolve_and_create() -> Result<Self, PlatformError> {
        let dirs = Self::resolve()?;
        dirs.create_dirs()?;
        Ok(dirs)
    }

    /// Resolve directories rooted under a custom base path.
    pub fn resolve_with_root(root: &Path) -> Self {
        let app_dir = root.join(APP_NAME);
        Self {
            config_dir: app_dir.join("config"),
            log_dir: app_dir.join("logs"),
        }
    }

    /// Replace the config directory, as `--config` does.
    #[must_use]
    pub fn with_config_dir(mut self, config_dir: Option<PathBuf>) -> Self {
        if let Some(dir) = config_dir {
            self.config_dir = dir;
        }
        self
    }

    /// Create all directories on disk.
    ///
    /// # Errors
    ///
    /// Returns [`PlatformError::Io`] if any directory cannot be created.
    pub fn create_dirs(&self) -> Result<(), PlatformError> {
        std::fs::create_dir_all(&self.config_dir)?;
        std::fs::create_dir_all(&self.log_dir)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_with_root_layout() {
        let root = Path::new("/tmp/skyport-test");
        let dirs = PlatformDirs::resolve_with_root(root);
        assert_eq!(dirs.config_dir, root.join("skyport").join("config"));
        assert_eq!(dirs.log_dir, root.join("skyport").join("logs"));
    }

    #[test]
    fn test_directory_creation() {
        let tmp = tempfile::tempdir().unwrap();
        let dirs = PlatformDirs::resolve_with_root(tmp.path());
        dirs.create_dirs().unwrap();
        assert!(dirs.config_dir.is_dir());
        assert!(dirs.log_dir.is_dir());
        // Creating twice is fine.
        dirs.create_dirs().unwrap();
    }

    #[test]
    fn test_config_override() {
        let tmp = tempfile::tempdir().unwrap();
        let custom = tmp.path().join("elsewhere");
        let dirs = PlatformDirs::resolve_with_root(tmp.path()).with_config_dir(Some(custom.clone()));
        assert_eq!(dirs.config_dir, custom);

        let untouched = PlatformDirs::resolve_with_root(tmp.path()).with_config_dir(None);
        assert_eq!(untouched, PlatformDirs::resolve_with_root(tmp.path()));
    }

    #[test]
    fn test_resolve_uses_app_name() {
        // Headless CI may lack a config dir; only check when one exists.
        if let Ok(dirs) = PlatformDirs::resolve() {
            assert!(dirs.config_dir.ends_with(APP_NAME));
            assert!(dirs.log_dir.ends_with("logs"));
        }
    }
}

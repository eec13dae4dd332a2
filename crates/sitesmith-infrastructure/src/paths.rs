//! Unified path management for sitesmith files.
//!
//! Platform directories are resolved via AppPaths from the version-migrate
//! crate, the same resolver AsyncDirStorage uses.
//!
//! # Directory Structure
//!
//! ```text
//! ~/.config/sitesmith/         # Config directory
//! ├── config.toml              # User configuration
//! └── app_state.toml           # Last active project
//!
//! ~/.local/share/sitesmith/    # Data directory
//! ├── projects/                # One TOML file per project (AsyncDirStorage)
//! └── logs/                    # Daily log files
//! ```
//!
//! Setting `SITESMITH_DATA_DIR` puts every file above under that one
//! directory instead.

use std::path::{Path, PathBuf};

use version_migrate::AppPaths;

/// Environment variable that relocates all sitesmith files.
pub const DATA_DIR_ENV: &str = "SITESMITH_DATA_DIR";

const APP_NAME: &str = "sitesmith";

/// Errors that can occur during path resolution.
#[derive(Debug)]
pub enum PathError {
    /// Home directory could not be determined.
    HomeDirNotFound,
}

impl std::fmt::Display for PathError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PathError::HomeDirNotFound => write!(f, "Cannot find home directory"),
        }
    }
}

impl std::error::Error for PathError {}

/// Resolves where sitesmith keeps its files.
#[derive(Debug, Clone, Default)]
pub struct SitesmithPaths {
    base_dir: Option<PathBuf>,
}

impl SitesmithPaths {
    /// Creates a resolver. With `base_dir`, every path lives under it.
    pub fn new(base_dir: Option<&Path>) -> Self {
        Self {
            base_dir: base_dir.map(Path::to_path_buf),
        }
    }

    /// Honours `SITESMITH_DATA_DIR` when it is set and non-empty.
    pub fn from_env() -> Self {
        let base_dir = std::env::var_os(DATA_DIR_ENV)
            .filter(|value| !value.is_empty())
            .map(PathBuf::from);
        Self { base_dir }
    }

    fn app_paths() -> AppPaths {
        AppPaths::new(APP_NAME)
    }

    /// Directory for `config.toml` and `app_state.toml`.
    pub fn config_dir(&self) -> Result<PathBuf, PathError> {
        match &self.base_dir {
            Some(base) => Ok(base.clone()),
            None => Self::app_paths()
                .config_dir()
                .map_err(|_| PathError::HomeDirNotFound),
        }
    }

    /// Directory holding project data and logs.
    pub fn data_dir(&self) -> Result<PathBuf, PathError> {
        match &self.base_dir {
            Some(base) => Ok(base.clone()),
            None => Self::app_paths()
                .data_dir()
                .map_err(|_| PathError::HomeDirNotFound),
        }
    }

    pub fn config_file(&self) -> Result<PathBuf, PathError> {
        Ok(self.config_dir()?.join("config.toml"))
    }

    pub fn state_file(&self) -> Result<PathBuf, PathError> {
        Ok(self.config_dir()?.join("app_state.toml"))
    }

    /// Base directory handed to the project repository; project files land
    /// in its `projects/` subdirectory.
    pub fn projects_base_dir(&self) -> Result<PathBuf, PathError> {
        self.data_dir()
    }

    pub fn logs_dir(&self) -> Result<PathBuf, PathError> {
        Ok(self.data_dir()?.join("logs"))
    }

    /// Where exported archives go when the config names no directory:
    /// the platform download directory, else the working directory.
    pub fn default_export_dir() -> PathBuf {
        dirs::download_dir().unwrap_or_else(|| PathBuf::from("."))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_dir_override() {
        let paths = SitesmithPaths::new(Some(Path::new("/tmp/site")));
        assert_eq!(paths.config_file().unwrap(), PathBuf::from("/tmp/site/config.toml"));
        assert_eq!(paths.state_file().unwrap(), PathBuf::from("/tmp/site/app_state.toml"));
        assert_eq!(paths.projects_base_dir().unwrap(), PathBuf::from("/tmp/site"));
        assert_eq!(paths.logs_dir().unwrap(), PathBuf::from("/tmp/site/logs"));
    }

    #[test]
    fn test_default_paths_end_with_app_name() {
        let paths = SitesmithPaths::default();
        if let Ok(dir) = paths.config_dir() {
            assert!(dir.ends_with(APP_NAME));
        }
    }
}

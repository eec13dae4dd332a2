//! Configuration service implementation.
//!
//! Loads the root configuration from `~/.config/sitesmith/config.toml`,
//! writing a default file on first run.

use std::path::PathBuf;
use std::sync::{Arc, RwLock};

use version_migrate::{FileStorage, FileStorageStrategy, FormatStrategy, LoadBehavior};

use crate::dto::create_config_root_migrator;
use crate::paths::SitesmithPaths;
use sitesmith_core::config::RootConfig;
use sitesmith_core::error::{Result, SitesmithError};

/// Configuration service that loads and caches the root configuration.
#[derive(Debug, Clone)]
pub struct ConfigService {
    path: PathBuf,
    config: Arc<RwLock<Option<RootConfig>>>,
}

impl ConfigService {
    /// Creates a service for the config file at `path`. Loading is lazy.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            config: Arc::new(RwLock::new(None)),
        }
    }

    /// Creates a service at the default location, honouring
    /// `SITESMITH_DATA_DIR`.
    pub fn default_location() -> Result<Self> {
        let path = SitesmithPaths::from_env()
            .config_file()
            .map_err(|e| SitesmithError::config(e.to_string()))?;
        Ok(Self::new(path))
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    /// Gets the root configuration, loading from file if not cached.
    ///
    /// An unreadable file yields the defaults; the error is logged.
    pub fn get_config(&self) -> RootConfig {
        if let Ok(read_lock) = self.config.read() {
            if let Some(ref cached) = *read_lock {
                return cached.clone();
            }
        }

        let loaded = self.load_config().unwrap_or_else(|e| {
            tracing::warn!(
                "[ConfigService] Using default config, failed to load {}: {}",
                self.path.display(),
                e
            );
            RootConfig::default()
        });

        if let Ok(mut write_lock) = self.config.write() {
            *write_lock = Some(loaded.clone());
        }

        loaded
    }

    /// Invalidates the cache, forcing a reload on next access.
    pub fn invalidate_cache(&self) {
        if let Ok(mut write_lock) = self.config.write() {
            *write_lock = None;
        }
    }

    fn open_storage(&self) -> Result<FileStorage> {
        let migrator = create_config_root_migrator();
        let strategy = FileStorageStrategy::new()
            .with_format(FormatStrategy::Toml)
            .with_load_behavior(LoadBehavior::CreateIfMissing);

        FileStorage::new(self.path.clone(), migrator, strategy)
            .map_err(|e| SitesmithError::config(format!("Failed to create FileStorage: {}", e)))
    }

    /// Writes `config` to the file and refreshes the cache.
    pub fn save_config(&self, config: RootConfig) -> Result<()> {
        let mut storage = self.open_storage()?;
        storage
            .update_and_save("config_root", vec![config.clone()])
            .map_err(|e| SitesmithError::config(format!("Failed to save config: {}", e)))?;

        if let Ok(mut write_lock) = self.config.write() {
            *write_lock = Some(config);
        }
        Ok(())
    }

    /// Loads RootConfig from the config file using FileStorage.
    pub fn load_config(&self) -> Result<RootConfig> {
        let mut storage = self.open_storage()?;

        let configs: Vec<RootConfig> = storage
            .query("config_root")
            .map_err(|e| SitesmithError::config(format!("Failed to query config_root: {}", e)))?;

        match configs.into_iter().next() {
            Some(config) => Ok(config),
            None => {
                let default_config = RootConfig::default();
                storage
                    .update_and_save("config_root", vec![default_config.clone()])
                    .map_err(|e| {
                        SitesmithError::config(format!("Failed to save default config: {}", e))
                    })?;
                tracing::info!(
                    "[ConfigService] Wrote default config to {}",
                    self.path.display()
                );
                Ok(default_config)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sitesmith_core::config::DEFAULT_GENERATION_MODEL;
    use tempfile::TempDir;

    #[test]
    fn test_creates_default_config() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        let service = ConfigService::new(&path);

        let config = service.get_config();
        assert_eq!(config.generation.model, DEFAULT_GENERATION_MODEL);
        assert!(path.exists());
    }

    #[test]
    fn test_saved_config_is_reloaded() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");

        let mut config = RootConfig::default();
        config.preview.content_security_policy = Some("default-src 'self'".to_string());
        config.generation.temperature = 0.2;
        ConfigService::new(&path).save_config(config).unwrap();

        let service = ConfigService::new(&path);
        let reloaded = service.get_config();
        assert_eq!(
            reloaded.preview.content_security_policy.as_deref(),
            Some("default-src 'self'")
        );
        assert_eq!(reloaded.generation.temperature, 0.2);
        assert_eq!(reloaded.generation.model, DEFAULT_GENERATION_MODEL);

        service.invalidate_cache();
        assert_eq!(service.get_config(), reloaded);
    }
}

//! Application state service implementation.
//!
//! Persists the single-slot session state (the last active project) in
//! `app_state.toml`.

use std::path::PathBuf;
use std::sync::{Arc, Mutex, RwLock};

use async_trait::async_trait;
use version_migrate::{FileStorage, FileStorageStrategy, FormatStrategy, LoadBehavior};

use crate::dto::create_app_state_migrator;
use crate::paths::SitesmithPaths;
use sitesmith_core::error::{Result, SitesmithError};
use sitesmith_core::state::{AppState, StateRepository};

/// Service for managing application state.
///
/// Reads and writes the state through FileStorage and caches it to avoid
/// repeated file I/O.
#[derive(Clone)]
pub struct AppStateService {
    /// Cached app state loaded from storage.
    state: Arc<RwLock<Option<AppState>>>,
    storage: Arc<Mutex<FileStorage>>,
}

fn poisoned(what: &str) -> SitesmithError {
    SitesmithError::internal(format!("{} lock poisoned", what))
}

impl AppStateService {
    /// Creates a service at the default location, honouring
    /// `SITESMITH_DATA_DIR`.
    pub fn default_location() -> Result<Self> {
        let file_path = SitesmithPaths::from_env()
            .state_file()
            .map_err(|e| SitesmithError::config(e.to_string()))?;
        Self::new(file_path)
    }

    /// Creates a new AppStateService backed by `file_path`.
    ///
    /// The file is created with default values if it does not exist.
    pub fn new(file_path: impl Into<PathBuf>) -> Result<Self> {
        let migrator = create_app_state_migrator();

        let strategy = FileStorageStrategy::new()
            .with_format(FormatStrategy::Toml)
            .with_load_behavior(LoadBehavior::CreateIfMissing);

        let storage = FileStorage::new(file_path.into(), migrator, strategy)
            .map_err(|e| SitesmithError::io(format!("Failed to create FileStorage: {}", e)))?;

        Ok(Self {
            state: Arc::new(RwLock::new(None)),
            storage: Arc::new(Mutex::new(storage)),
        })
    }

    /// Loads the app state from storage if not already cached.
    fn load_state(&self) -> Result<AppState> {
        {
            let read_lock = self.state.read().map_err(|_| poisoned("app state"))?;
            if let Some(ref cached) = *read_lock {
                return Ok(cached.clone());
            }
        }

        let loaded = self.load_from_storage().unwrap_or_else(|e| {
            tracing::warn!("[AppStateService] Falling back to default state: {}", e);
            AppState::default()
        });

        let mut write_lock = self.state.write().map_err(|_| poisoned("app state"))?;
        *write_lock = Some(loaded.clone());
        Ok(loaded)
    }

    fn load_from_storage(&self) -> Result<AppState> {
        let storage = self.storage.lock().map_err(|_| poisoned("storage"))?;

        let states: Vec<AppState> = storage
            .query("app_state")
            .map_err(|e| SitesmithError::data_access(format!("Failed to query app_state: {}", e)))?;

        // app_state is a single object, take first or return default
        Ok(states.into_iter().next().unwrap_or_default())
    }

    fn store(&self, state: AppState) -> Result<()> {
        {
            let mut storage = self.storage.lock().map_err(|_| poisoned("storage"))?;
            storage
                .update_and_save("app_state", vec![state.clone()])
                .map_err(|e| {
                    SitesmithError::data_access(format!("Failed to save app_state: {}", e))
                })?;
        }

        let mut write_lock = self.state.write().map_err(|_| poisoned("app state"))?;
        *write_lock = Some(state);
        Ok(())
    }
}

#[async_trait]
impl StateRepository for AppStateService {
    async fn save_state(&self, state: AppState) -> Result<()> {
        self.store(state)
    }

    async fn get_state(&self) -> Result<AppState> {
        self.load_state()
    }

    async fn get_last_project(&self) -> Option<String> {
        self.load_state().ok().and_then(|state| state.last_project_id)
    }

    async fn set_last_project(&self, project_id: String) -> Result<()> {
        let mut state = self.load_state()?;
        state.last_project_id = Some(project_id);
        self.store(state)
    }

    async fn clear_last_project(&self) -> Result<()> {
        let mut state = self.load_state()?;
        state.last_project_id = None;
        self.store(state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_default_state_is_empty() {
        let temp_dir = TempDir::new().unwrap();
        let service = AppStateService::new(temp_dir.path().join("app_state.toml")).unwrap();
        assert!(service.get_last_project().await.is_none());
    }

    #[tokio::test]
    async fn test_last_project_persists_across_instances() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("app_state.toml");

        let service = AppStateService::new(&path).unwrap();
        service.set_last_project("p-1".to_string()).await.unwrap();

        let reopened = AppStateService::new(&path).unwrap();
        assert_eq!(reopened.get_last_project().await.as_deref(), Some("p-1"));

        reopened.clear_last_project().await.unwrap();
        let again = AppStateService::new(&path).unwrap();
        assert!(again.get_last_project().await.is_none());
    }
}

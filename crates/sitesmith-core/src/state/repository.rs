//! State repository trait.

use async_trait::async_trait;

use super::model::AppState;
use crate::error::Result;

/// Repository for the persisted session state.
#[async_trait]
pub trait StateRepository: Send + Sync {
    /// Saves the app state to storage.
    async fn save_state(&self, state: AppState) -> Result<()>;

    async fn get_state(&self) -> Result<AppState>;

    async fn get_last_project(&self) -> Option<String>;

    async fn set_last_project(&self, project_id: String) -> Result<()>;

    async fn clear_last_project(&self) -> Result<()>;
}

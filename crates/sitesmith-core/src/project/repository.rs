//! Project repository trait.
//!
//! Defines the interface for project persistence operations.

use async_trait::async_trait;

use super::model::Project;
use crate::error::Result;

/// An abstract repository for managing project persistence.
///
/// This trait decouples the use cases from the storage mechanism. The store
/// is responsible for durability only; business rules live in the callers.
///
/// # Implementation Notes
///
/// Implementations should handle:
/// - Schema versioning, normalizing older records at read time
/// - Ordering `list_all` newest-created first
#[async_trait]
pub trait ProjectRepository: Send + Sync {
    /// Finds a project by its ID.
    ///
    /// # Arguments
    ///
    /// * `project_id` - The ID of the project to find
    ///
    /// # Returns
    ///
    /// - `Ok(Some(Project))`: Project found
    /// - `Ok(None)`: Project not found
    /// - `Err(_)`: Error occurred during retrieval
    async fn find_by_id(&self, project_id: &str) -> Result<Option<Project>>;

    /// Saves a project, creating or replacing the stored record.
    ///
    /// # Arguments
    ///
    /// * `project` - The project to save
    async fn save(&self, project: &Project) -> Result<()>;

    /// Deletes a project from storage.
    ///
    /// # Returns
    ///
    /// - `Ok(())`: Project deleted successfully (or didn't exist)
    /// - `Err(_)`: Error occurred during deletion
    async fn delete(&self, project_id: &str) -> Result<()>;

    /// Lists all stored projects, newest-created first.
    async fn list_all(&self) -> Result<Vec<Project>>;

    /// Checks if a project exists.
    async fn exists(&self, project_id: &str) -> Result<bool> {
        Ok(self.find_by_id(project_id).await?.is_some())
    }
}

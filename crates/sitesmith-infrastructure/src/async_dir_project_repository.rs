//! AsyncDirStorage-based ProjectRepository implementation

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use version_migrate::{
    AppPaths, AsyncDirStorage, DirStorageStrategy, FilenameEncoding, FormatStrategy, PathStrategy,
};

use crate::dto::create_project_migrator;
use crate::paths::{PathError, SitesmithPaths};
use sitesmith_core::error::{Result, SitesmithError};
use sitesmith_core::project::{Project, ProjectRepository};

const ENTITY_NAME: &str = "project";

/// AsyncDirStorage-based project repository.
///
/// Directory structure:
/// ```text
/// base_dir/
/// └── projects/
///     ├── project-uuid-1.toml
///     └── project-uuid-2.toml
/// ```
///
/// Records written by older releases are migrated to the current schema on
/// load; they are rewritten in the current schema on the next save.
pub struct AsyncDirProjectRepository {
    storage: AsyncDirStorage,
    base_dir: PathBuf,
}

/// Matches the not-found messages the storage layer reports.
fn is_not_found(error: &impl std::fmt::Display) -> bool {
    let error_str = error.to_string();
    error_str.contains("No such file or directory")
        || error_str.contains("not found")
        || error_str.contains("cannot find")
}

impl AsyncDirProjectRepository {
    /// Creates a repository at the default location, honouring
    /// `SITESMITH_DATA_DIR`.
    pub async fn default_location() -> Result<Self> {
        let base_dir = SitesmithPaths::from_env()
            .projects_base_dir()
            .map_err(|e: PathError| SitesmithError::config(e.to_string()))?;
        Self::new(base_dir).await
    }

    /// Creates a new AsyncDirProjectRepository.
    ///
    /// # Arguments
    ///
    /// * `base_dir` - Directory that receives the `projects/` subdirectory
    pub async fn new(base_dir: impl AsRef<Path>) -> Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();

        fs::create_dir_all(&base_dir)
            .await
            .map_err(|e| SitesmithError::io(format!("Failed to create base directory: {}", e)))?;

        // Setup AppPaths with CustomBase strategy to use our base_dir
        let paths =
            AppPaths::new("sitesmith").data_strategy(PathStrategy::CustomBase(base_dir.clone()));

        let migrator = create_project_migrator();

        // TOML format, Direct filename encoding
        let strategy = DirStorageStrategy::default()
            .with_format(FormatStrategy::Toml)
            .with_filename_encoding(FilenameEncoding::Direct);

        let storage = AsyncDirStorage::new(paths, "projects", migrator, strategy)
            .await
            .map_err(|e| SitesmithError::io(format!("Failed to create project storage: {}", e)))?;

        Ok(Self { storage, base_dir })
    }

    /// Returns the directory that holds the project files.
    pub fn projects_dir(&self) -> &Path {
        self.storage.base_path()
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }
}

#[async_trait]
impl ProjectRepository for AsyncDirProjectRepository {
    async fn find_by_id(&self, project_id: &str) -> Result<Option<Project>> {
        match self.storage.load::<Project>(ENTITY_NAME, project_id).await {
            Ok(project) => Ok(Some(project)),
            Err(e) => {
                if is_not_found(&e) {
                    Ok(None)
                } else {
                    Err(SitesmithError::DataAccess(e.to_string()))
                }
            }
        }
    }

    async fn save(&self, project: &Project) -> Result<()> {
        tracing::debug!(
            "[ProjectRepository] Saving project {} ({} versions, {} messages)",
            project.id,
            project.versions.len(),
            project.chat.len()
        );
        self.storage
            .save(ENTITY_NAME, &project.id, project)
            .await
            .map_err(|e| SitesmithError::DataAccess(format!("Failed to save project: {}", e)))
    }

    async fn delete(&self, project_id: &str) -> Result<()> {
        match self.storage.delete(project_id).await {
            Ok(()) => Ok(()),
            Err(e) if is_not_found(&e) => Ok(()),
            Err(e) => Err(SitesmithError::DataAccess(format!(
                "Failed to delete project: {}",
                e
            ))),
        }
    }

    async fn list_all(&self) -> Result<Vec<Project>> {
        let all_projects = self
            .storage
            .load_all::<Project>(ENTITY_NAME)
            .await
            .map_err(|e| SitesmithError::DataAccess(format!("Failed to load projects: {}", e)))?;

        let mut projects: Vec<Project> = all_projects.into_iter().map(|(_, p)| p).collect();

        // Most recently created first
        projects.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        Ok(projects)
    }
}

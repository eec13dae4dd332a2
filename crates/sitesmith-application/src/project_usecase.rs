//! Project use case implementation.
//!
//! `ProjectUseCase` ties the project store, the session slot and the
//! generation service together: project lifecycle, the chat flow that turns
//! prompts into versions, manual edits of the file tree, rollback and export.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use sitesmith_core::bundle::{to_bundle, to_tree};
use sitesmith_core::error::{Result, SitesmithError};
use sitesmith_core::file_tree::FileTree;
use sitesmith_core::generation::{
    GenerationContext, GenerationError, GenerationMode, GenerationOutcome, GenerationService,
    validate_bundle,
};
use sitesmith_core::project::{
    ChatMessage, DEFAULT_PROJECT_NAME, FIRST_RUN_PROJECT_NAME, Project, ProjectRepository,
};
use sitesmith_core::state::StateRepository;
use sitesmith_infrastructure::ZipExporter;

/// Origin prompt recorded for versions committed from the editor.
pub const MANUAL_EDIT_PROMPT: &str = "Manual file edit / upload";

/// Result of [`ProjectUseCase::send_message`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendOutcome {
    /// Blank input, or another generation is still running.
    Ignored,
    /// A plan was appended to the chat.
    Planned(Project),
    /// A new version was recorded.
    Updated { project: Project, version_id: String },
    /// The request failed; the reason was appended as an error message.
    Failed { project: Project, reason: String },
}

impl SendOutcome {
    pub fn project(&self) -> Option<&Project> {
        match self {
            Self::Ignored => None,
            Self::Planned(project)
            | Self::Updated { project, .. }
            | Self::Failed { project, .. } => Some(project),
        }
    }
}

/// Clears the busy flag when the generation call ends, however it ends.
struct BusyGuard<'a>(&'a AtomicBool);

impl<'a> BusyGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Use case for working on website projects.
///
/// The last active project is kept in the [`StateRepository`] slot; every
/// operation that opens a project records it there.
pub struct ProjectUseCase {
    /// Repository for project persistence
    project_repository: Arc<dyn ProjectRepository>,
    /// Session slot holding the last active project
    state_repository: Arc<dyn StateRepository>,
    /// Backend that turns prompts into plans and code
    generation_service: Arc<dyn GenerationService>,
    exporter: ZipExporter,
    /// Set while a generation call is outstanding
    busy: AtomicBool,
}

impl ProjectUseCase {
    /// Creates a new `ProjectUseCase` instance.
    ///
    /// # Arguments
    ///
    /// * `project_repository` - Repository for project persistence
    /// * `state_repository` - Session slot for the last active project
    /// * `generation_service` - Backend for plan and code generation
    pub fn new(
        project_repository: Arc<dyn ProjectRepository>,
        state_repository: Arc<dyn StateRepository>,
        generation_service: Arc<dyn GenerationService>,
    ) -> Self {
        Self {
            project_repository,
            state_repository,
            generation_service,
            exporter: ZipExporter::new(),
            busy: AtomicBool::new(false),
        }
    }

    /// True while a generation call is outstanding.
    pub fn is_generating(&self) -> bool {
        self.busy.load(Ordering::SeqCst)
    }

    // ============================================================================
    // Project lifecycle
    // ============================================================================

    /// Creates a project, saves it and makes it the active one.
    pub async fn create_project(&self, name: Option<&str>) -> Result<Project> {
        let name = name
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .unwrap_or(DEFAULT_PROJECT_NAME);
        let project = Project::new(name);

        self.project_repository.save(&project).await?;
        self.state_repository
            .set_last_project(project.id.clone())
            .await?;

        tracing::info!("[ProjectUseCase] Created project {} ({})", project.name, project.id);
        Ok(project)
    }

    /// Opens the project the user worked on last.
    ///
    /// Falls back to the newest project, and creates the first-run project
    /// when the store is empty.
    pub async fn resume(&self) -> Result<Project> {
        if let Some(last_id) = self.state_repository.get_last_project().await {
            match self.project_repository.find_by_id(&last_id).await? {
                Some(project) => {
                    tracing::debug!("[ProjectUseCase] Resumed project {}", project.id);
                    return Ok(project);
                }
                None => tracing::warn!(
                    "[ProjectUseCase] Last project {} no longer exists, falling back",
                    last_id
                ),
            }
        }

        match self.project_repository.list_all().await?.into_iter().next() {
            Some(project) => {
                self.activate(&project).await?;
                Ok(project)
            }
            None => self.create_project(Some(FIRST_RUN_PROJECT_NAME)).await,
        }
    }

    /// Makes `project_id` the active project.
    pub async fn switch_project(&self, project_id: &str) -> Result<Project> {
        let project = self.load(project_id).await?;
        self.activate(&project).await?;
        tracing::info!("[ProjectUseCase] Switched to project {}", project.id);
        Ok(project)
    }

    pub async fn rename_project(&self, project_id: &str, name: &str) -> Result<Project> {
        let name = name.trim();
        if name.is_empty() {
            return Err(SitesmithError::validation("project name must not be empty"));
        }

        let mut project = self.load(project_id).await?;
        project.name = name.to_string();
        project.touch();
        self.project_repository.save(&project).await?;
        Ok(project)
    }

    /// Lists all projects, newest first.
    pub async fn list_projects(&self) -> Result<Vec<Project>> {
        self.project_repository.list_all().await
    }

    /// Deletes a project.
    ///
    /// When the active project is deleted, the newest remaining project (or a
    /// fresh one) becomes active and is returned.
    pub async fn delete_project(&self, project_id: &str) -> Result<Option<Project>> {
        self.project_repository.delete(project_id).await?;
        tracing::info!("[ProjectUseCase] Deleted project {}", project_id);

        let was_active =
            self.state_repository.get_last_project().await.as_deref() == Some(project_id);
        if !was_active {
            return Ok(None);
        }

        self.state_repository.clear_last_project().await?;
        let next = match self.project_repository.list_all().await?.into_iter().next() {
            Some(project) => {
                self.activate(&project).await?;
                project
            }
            None => self.create_project(None).await?,
        };
        Ok(Some(next))
    }

    // ============================================================================
    // Chat and generation
    // ============================================================================

    /// Sends a chat message and applies what the generation service returns.
    ///
    /// The message is ignored when blank or while another generation is
    /// running. Failures never abort the flow: they are appended to the chat
    /// as error messages and the current version stays in place.
    pub async fn send_message(
        &self,
        project_id: &str,
        text: &str,
        mode: GenerationMode,
    ) -> Result<SendOutcome> {
        let prompt = text.trim();
        if prompt.is_empty() {
            return Ok(SendOutcome::Ignored);
        }
        let Some(_busy) = BusyGuard::acquire(&self.busy) else {
            tracing::debug!("[ProjectUseCase] Generation in flight, ignoring message");
            return Ok(SendOutcome::Ignored);
        };

        let mut project = self.load(project_id).await?;
        project.push_message(ChatMessage::user(prompt));
        self.project_repository.save(&project).await?;

        let context = GenerationContext {
            current_bundle: project.current_bundle().cloned(),
            is_first_interaction: project.is_first_interaction(),
            mode,
        };
        tracing::info!(
            "[ProjectUseCase] Generating ({:?}, first interaction: {})",
            mode,
            context.is_first_interaction
        );

        let outcome = match self.generation_service.generate(prompt, &context).await {
            Ok(GenerationOutcome::Plan { content }) => {
                project.push_message(ChatMessage::assistant(content));
                SendOutcome::Planned(project)
            }
            Ok(GenerationOutcome::Code { bundle, plan }) => match validate_bundle(&bundle) {
                Ok(()) => {
                    let version = project
                        .versions
                        .create_version_with_plan(bundle, prompt, plan);
                    let version_id = version.id.clone();
                    let message = ChatMessage::code_update(version);
                    project.push_message(message);
                    SendOutcome::Updated {
                        project,
                        version_id,
                    }
                }
                Err(invalid) => Self::fail(project, GenerationError::from(invalid)),
            },
            Err(e) => Self::fail(project, e),
        };

        if let Some(project) = outcome.project() {
            self.project_repository.save(project).await?;
        }
        Ok(outcome)
    }

    fn fail(mut project: Project, error: GenerationError) -> SendOutcome {
        tracing::error!("[ProjectUseCase] Generation failed: {}", error);
        let reason = error.to_string();
        project.push_message(ChatMessage::error(format!("AI Error: {reason}")));
        SendOutcome::Failed { project, reason }
    }

    // ============================================================================
    // Editing, history and export
    // ============================================================================

    /// Records the edited tree as a new version.
    ///
    /// Returns the updated project and the tree rebuilt from the stored
    /// bundle, which is what the editor should show from now on. A tree that
    /// flattens to the head bundle records nothing.
    pub async fn commit_tree(&self, project_id: &str, tree: &FileTree) -> Result<(Project, FileTree)> {
        let mut project = self.load(project_id).await?;
        let bundle = to_bundle(tree, project.current_bundle());
        let normalized = to_tree(&bundle);

        if project.current_bundle() == Some(&bundle) {
            tracing::debug!("[ProjectUseCase] Edit of {} left the bundle unchanged", project.id);
            return Ok((project, normalized));
        }

        project.versions.create_version(bundle, MANUAL_EDIT_PROMPT);
        project.touch();
        self.project_repository.save(&project).await?;
        Ok((project, normalized))
    }

    /// Republishes an older version as the new head.
    pub async fn restore_version(&self, project_id: &str, version_id: &str) -> Result<Project> {
        let mut project = self.load(project_id).await?;
        if project.versions.restore(version_id).is_none() {
            return Err(SitesmithError::not_found("version", version_id));
        }
        project.touch();
        self.project_repository.save(&project).await?;
        Ok(project)
    }

    /// Writes the project's current tree as `{name}.zip` into `dest_dir`.
    pub async fn export_project(&self, project_id: &str, dest_dir: &Path) -> Result<PathBuf> {
        let project = self.load(project_id).await?;
        self.exporter
            .export_tree(&project.working_tree(), &project.name, dest_dir)
            .await
    }

    pub async fn get_project(&self, project_id: &str) -> Result<Project> {
        self.load(project_id).await
    }

    async fn load(&self, project_id: &str) -> Result<Project> {
        self.project_repository
            .find_by_id(project_id)
            .await?
            .ok_or_else(|| SitesmithError::not_found("project", project_id))
    }

    async fn activate(&self, project: &Project) -> Result<()> {
        self.state_repository
            .set_last_project(project.id.clone())
            .await
    }
}

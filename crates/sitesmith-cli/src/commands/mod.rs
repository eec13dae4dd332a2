pub mod files;
pub mod preview;
pub mod project;
pub mod prompt;

use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use sitesmith_application::ProjectUseCase;
use sitesmith_core::config::RootConfig;
use sitesmith_core::generation::{
    GenerationContext, GenerationError, GenerationOutcome, GenerationService,
};
use sitesmith_core::project::Project;
use sitesmith_infrastructure::{AppStateService, AsyncDirProjectRepository, ConfigService};
use sitesmith_interaction::{GeminiApiClient, WebsiteGenerator};

/// Composition root shared by all commands.
pub struct App {
    pub usecase: ProjectUseCase,
    pub config: RootConfig,
}

impl App {
    /// Wires the services at their default locations (see `SITESMITH_DATA_DIR`).
    pub async fn bootstrap() -> Result<Self> {
        let config = ConfigService::default_location()
            .context("Failed to resolve config path")?
            .get_config();

        let state = AppStateService::default_location().context("Failed to open app state")?;
        let projects = AsyncDirProjectRepository::default_location()
            .await
            .context("Failed to open project storage")?;

        let generator: Arc<dyn GenerationService> =
            match GeminiApiClient::from_settings(&config.generation) {
                Ok(client) => Arc::new(
                    WebsiteGenerator::new(client)
                        .with_plan_temperature(config.generation.temperature),
                ),
                Err(e) => {
                    tracing::warn!("[App] Generation disabled: {}", e);
                    Arc::new(NoApiKey(config.generation.api_key_env.clone()))
                }
            };

        Ok(Self {
            usecase: ProjectUseCase::new(Arc::new(projects), Arc::new(state), generator),
            config,
        })
    }

    /// The project every command acts on.
    pub async fn active_project(&self) -> Result<Project> {
        self.usecase
            .resume()
            .await
            .context("Failed to open the active project")
    }
}

/// Stands in for the backend when no API key is set, so the failure shows
/// up in the chat like any other generation error.
struct NoApiKey(String);

#[async_trait]
impl GenerationService for NoApiKey {
    async fn generate(
        &self,
        _prompt: &str,
        _context: &GenerationContext,
    ) -> Result<GenerationOutcome, GenerationError> {
        Err(GenerationError::MissingApiKey(self.0.clone()))
    }
}

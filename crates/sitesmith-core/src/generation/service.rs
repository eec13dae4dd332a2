use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::validation::ValidationError;
use crate::bundle::CodeBundle;

/// What the user asked the service for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GenerationMode {
    /// Prose plan only; nothing is written.
    Plan,
    /// A new or updated bundle.
    #[default]
    Code,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationContext {
    /// Head bundle of the project, `None` before the first version.
    pub current_bundle: Option<CodeBundle>,
    pub is_first_interaction: bool,
    pub mode: GenerationMode,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationOutcome {
    Plan {
        content: String,
    },
    Code {
        bundle: CodeBundle,
        /// Plan annotation produced alongside the code.
        plan: Option<String>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerationError {
    #[error("API key not found: set the {0} environment variable")]
    MissingApiKey(String),

    #[error("could not build the prompt: {0}")]
    Prompt(String),

    #[error("request failed: {0}")]
    Request(String),

    #[error("service returned HTTP {status}: {message}")]
    Http { status: u16, message: String },

    #[error("empty response from the generation service")]
    EmptyResponse,

    #[error("could not parse the generated output: {0}")]
    Parse(String),

    #[error(transparent)]
    Invalid(#[from] ValidationError),
}

/// A text-generation backend.
///
/// Calls may be slow and may fail; they are not cancellable.
#[async_trait]
pub trait GenerationService: Send + Sync {
    /// Produces a plan or a bundle for `prompt`.
    ///
    /// # Arguments
    ///
    /// * `prompt` - The user's request, verbatim
    /// * `context` - Current bundle and mode
    async fn generate(
        &self,
        prompt: &str,
        context: &GenerationContext,
    ) -> Result<GenerationOutcome, GenerationError>;
}

use async_trait::async_trait;
use sitesmith_core::generation::GenerationError;

/// Single-turn text completion.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    /// Sends `prompt` and returns the model's text.
    async fn complete(&self, prompt: &str, temperature: f32) -> Result<String, GenerationError>;
}

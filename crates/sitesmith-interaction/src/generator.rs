//! Website generation on top of a completion backend.
//!
//! A plan request returns prose. A code request on a project without code
//! first asks for a plan, then for all four files built from it. Later code
//! requests send the current files and merge back only the sections the
//! model returns.

use async_trait::async_trait;
use sitesmith_core::bundle::CodeBundle;
use sitesmith_core::generation::{
    GenerationContext, GenerationError, GenerationMode, GenerationOutcome, GenerationService,
};

use crate::completion::CompletionBackend;
use crate::gemini_api_client::GeminiApiClient;
use crate::prompts;
use crate::response::{clean_plan, parse_sections};

/// Temperature used for code output.
pub const CODE_TEMPERATURE: f32 = 0.4;

/// Plan annotation recorded for incremental updates.
pub const INCREMENTAL_PLAN_LABEL: &str = "Incremental Update";

/// [`GenerationService`] over any [`CompletionBackend`].
pub struct WebsiteGenerator<B> {
    backend: B,
    plan_temperature: f32,
}

/// The generator wired to Gemini.
pub type GeminiGenerationService = WebsiteGenerator<GeminiApiClient>;

impl<B: CompletionBackend> WebsiteGenerator<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            plan_temperature: 0.5,
        }
    }

    pub fn with_plan_temperature(mut self, temperature: f32) -> Self {
        self.plan_temperature = temperature;
        self
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    async fn plan(&self, prompt: &str) -> Result<String, GenerationError> {
        let request = prompts::plan_prompt(prompt)?;
        let raw = self.backend.complete(&request, self.plan_temperature).await?;
        let plan = clean_plan(&raw);
        if plan.is_empty() {
            return Err(GenerationError::EmptyResponse);
        }
        Ok(plan)
    }

    async fn generate_full(&self, prompt: &str) -> Result<GenerationOutcome, GenerationError> {
        let plan = self.plan(prompt).await?;
        tracing::debug!("[WebsiteGenerator] Plan ready ({} chars)", plan.len());

        let request = prompts::full_generation_prompt(&plan)?;
        let raw = self.backend.complete(&request, CODE_TEMPERATURE).await?;
        let bundle = parse_sections(&raw).into_full_bundle()?;

        Ok(GenerationOutcome::Code {
            bundle,
            plan: Some(plan),
        })
    }

    async fn generate_incremental(
        &self,
        prompt: &str,
        current: &CodeBundle,
    ) -> Result<GenerationOutcome, GenerationError> {
        let request = prompts::incremental_prompt(prompt, current)?;
        let raw = self.backend.complete(&request, CODE_TEMPERATURE).await?;
        let sections = parse_sections(&raw);

        let bundle = if sections.is_empty() {
            tracing::warn!("[WebsiteGenerator] No file sections in response, keeping current code");
            current.clone()
        } else {
            tracing::debug!(
                "[WebsiteGenerator] Updating {} file(s): {:?}",
                sections.len(),
                sections.kinds().collect::<Vec<_>>()
            );
            sections.merge_into(current)
        };

        Ok(GenerationOutcome::Code {
            bundle,
            plan: Some(INCREMENTAL_PLAN_LABEL.to_string()),
        })
    }
}

#[async_trait]
impl<B: CompletionBackend> GenerationService for WebsiteGenerator<B> {
    async fn generate(
        &self,
        prompt: &str,
        context: &GenerationContext,
    ) -> Result<GenerationOutcome, GenerationError> {
        match (context.mode, &context.current_bundle) {
            (GenerationMode::Plan, _) => {
                let content = self.plan(prompt).await?;
                Ok(GenerationOutcome::Plan { content })
            }
            (GenerationMode::Code, Some(current)) if !context.is_first_interaction => {
                self.generate_incremental(prompt, current).await
            }
            (GenerationMode::Code, _) => self.generate_full(prompt).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Replays canned responses and records every request.
    #[derive(Default)]
    struct ScriptedBackend {
        responses: Mutex<VecDeque<Result<String, GenerationError>>>,
        requests: Mutex<Vec<(String, f32)>>,
    }

    impl ScriptedBackend {
        fn new(responses: Vec<Result<String, GenerationError>>) -> Self {
            Self {
                responses: Mutex::new(responses.into()),
                requests: Mutex::new(Vec::new()),
            }
        }

        fn requests(&self) -> Vec<(String, f32)> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl CompletionBackend for ScriptedBackend {
        async fn complete(&self, prompt: &str, temperature: f32) -> Result<String, GenerationError> {
            self.requests
                .lock()
                .unwrap()
                .push((prompt.to_string(), temperature));
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(Err(GenerationError::EmptyResponse))
        }
    }

    const FULL: &str = "--- data.json ---\n{\"title\": \"Cafe\"}\n--- index.html ---\n<!DOCTYPE html><html></html>\n--- styles.css ---\nbody {}\n--- script.js ---\nrender();";

    fn context(mode: GenerationMode, current: Option<CodeBundle>, first: bool) -> GenerationContext {
        GenerationContext {
            current_bundle: current,
            is_first_interaction: first,
            mode,
        }
    }

    #[tokio::test]
    async fn test_plan_mode_returns_clean_prose() {
        let generator = WebsiteGenerator::new(ScriptedBackend::new(vec![Ok(
            "Cozy cafe.\n```html\n<p/>\n```".to_string(),
        )]))
        .with_plan_temperature(0.7);

        let outcome = generator
            .generate("a cafe", &context(GenerationMode::Plan, None, true))
            .await
            .unwrap();

        assert_eq!(
            outcome,
            GenerationOutcome::Plan {
                content: "Cozy cafe.".to_string()
            }
        );
        let requests = generator.backend().requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].1, 0.7);
    }

    #[tokio::test]
    async fn test_first_code_request_plans_then_builds() {
        let generator = WebsiteGenerator::new(ScriptedBackend::new(vec![
            Ok("Warm palette, one hero section.".to_string()),
            Ok(FULL.to_string()),
        ]));

        let outcome = generator
            .generate("a cafe", &context(GenerationMode::Code, None, true))
            .await
            .unwrap();

        let GenerationOutcome::Code { bundle, plan } = outcome else {
            panic!("expected code");
        };
        assert_eq!(bundle.markup, "<!DOCTYPE html><html></html>");
        assert_eq!(bundle.data_document, "{\"title\": \"Cafe\"}");
        assert_eq!(plan.as_deref(), Some("Warm palette, one hero section."));

        let requests = generator.backend().requests();
        assert_eq!(requests.len(), 2);
        assert!(requests[1].0.contains("Warm palette, one hero section."));
        assert_eq!(requests[1].1, CODE_TEMPERATURE);
    }

    #[tokio::test]
    async fn test_follow_up_merges_changed_sections() {
        let current = CodeBundle::new("<!DOCTYPE html>", "a {}", "old();", "{}");
        let generator = WebsiteGenerator::new(ScriptedBackend::new(vec![Ok(
            "--- styles.css ---\na { color: blue; }".to_string(),
        )]));

        let outcome = generator
            .generate(
                "make links blue",
                &context(GenerationMode::Code, Some(current.clone()), false),
            )
            .await
            .unwrap();

        let GenerationOutcome::Code { bundle, plan } = outcome else {
            panic!("expected code");
        };
        assert_eq!(bundle.style, "a { color: blue; }");
        assert_eq!(bundle.script, current.script);
        assert_eq!(plan.as_deref(), Some(INCREMENTAL_PLAN_LABEL));
        assert!(generator.backend().requests()[0].0.contains("old();"));
    }

    #[tokio::test]
    async fn test_follow_up_without_sections_keeps_code() {
        let current = CodeBundle::new("<!DOCTYPE html>", "a {}", "old();", "{}");
        let generator =
            WebsiteGenerator::new(ScriptedBackend::new(vec![Ok("Looks good already!".to_string())]));

        let outcome = generator
            .generate(
                "anything",
                &context(GenerationMode::Code, Some(current.clone()), false),
            )
            .await
            .unwrap();

        assert_eq!(
            outcome,
            GenerationOutcome::Code {
                bundle: current,
                plan: Some(INCREMENTAL_PLAN_LABEL.to_string())
            }
        );
    }

    #[tokio::test]
    async fn test_incomplete_full_response_is_a_parse_error() {
        let generator = WebsiteGenerator::new(ScriptedBackend::new(vec![
            Ok("A plan.".to_string()),
            Ok("--- index.html ---\n<!DOCTYPE html>".to_string()),
        ]));

        let err = generator
            .generate("x", &context(GenerationMode::Code, None, true))
            .await
            .unwrap_err();
        assert!(matches!(err, GenerationError::Parse(_)));
    }

    #[tokio::test]
    async fn test_backend_error_propagates() {
        let generator = WebsiteGenerator::new(ScriptedBackend::new(vec![Err(
            GenerationError::Http {
                status: 429,
                message: "quota".to_string(),
            },
        )]));

        let err = generator
            .generate("x", &context(GenerationMode::Plan, None, true))
            .await
            .unwrap_err();
        assert_eq!(
            err,
            GenerationError::Http {
                status: 429,
                message: "quota".to_string()
            }
        );
    }
}

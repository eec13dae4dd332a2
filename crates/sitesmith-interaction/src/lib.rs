//! Generation service implementations for sitesmith.
//!
//! [`WebsiteGenerator`] drives prompts and response parsing on top of a
//! [`CompletionBackend`]; [`GeminiApiClient`] is the production backend.

pub mod completion;
pub mod gemini_api_client;
pub mod generator;
pub mod prompts;
pub mod response;

pub use completion::CompletionBackend;
pub use gemini_api_client::GeminiApiClient;
pub use generator::{GeminiGenerationService, WebsiteGenerator};

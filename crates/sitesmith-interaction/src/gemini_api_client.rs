//! GeminiApiClient - Direct REST API client for Gemini text generation.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use sitesmith_core::config::{DEFAULT_GENERATION_ENDPOINT, GenerationSettings};
use sitesmith_core::generation::GenerationError;

use crate::completion::CompletionBackend;

/// Client for the Gemini `generateContent` endpoint.
#[derive(Clone)]
pub struct GeminiApiClient {
    client: Client,
    api_key: String,
    model: String,
    endpoint: String,
}

impl GeminiApiClient {
    /// Creates a new client with the provided API key and model.
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            model: model.into(),
            endpoint: DEFAULT_GENERATION_ENDPOINT.to_string(),
        }
    }

    /// Builds a client from the user configuration, reading the API key
    /// from the configured environment variable.
    pub fn from_settings(settings: &GenerationSettings) -> Result<Self, GenerationError> {
        let api_key = settings
            .api_key()
            .ok_or_else(|| GenerationError::MissingApiKey(settings.api_key_env.clone()))?;
        Ok(Self::new(api_key, settings.model.clone()).with_endpoint(settings.endpoint.clone()))
    }

    /// Overrides the API base URL (e.g. for a proxy).
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn url(&self) -> String {
        format!(
            "{}/models/{model}:generateContent?key={api_key}",
            self.endpoint.trim_end_matches('/'),
            model = self.model,
            api_key = self.api_key
        )
    }

    async fn send_request(&self, body: &GenerateContentRequest) -> Result<String, GenerationError> {
        let response = self
            .client
            .post(self.url())
            .json(body)
            .send()
            .await
            .map_err(|err| GenerationError::Request(format!("Gemini API request failed: {err}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read Gemini error body".to_string());
            return Err(map_http_error(status, body_text));
        }

        let parsed: GenerateContentResponse = response.json().await.map_err(|err| {
            GenerationError::Parse(format!("Failed to parse Gemini response: {err}"))
        })?;

        extract_text_response(parsed)
    }
}

#[async_trait]
impl CompletionBackend for GeminiApiClient {
    async fn complete(&self, prompt: &str, temperature: f32) -> Result<String, GenerationError> {
        tracing::debug!(
            "[GeminiApiClient] Sending {} chars to {} (temperature {})",
            prompt.len(),
            self.model,
            temperature
        );
        let request = GenerateContentRequest::new(prompt, temperature);
        self.send_request(&request).await
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

impl GenerateContentRequest {
    fn new(prompt: &str, temperature: f32) -> Self {
        Self {
            contents: vec![Content {
                role: "user".to_string(),
                parts: vec![Part {
                    text: prompt.to_string(),
                }],
            }],
            generation_config: GenerationConfig {
                temperature,
                max_output_tokens: MAX_OUTPUT_TOKENS,
            },
        }
    }
}

const MAX_OUTPUT_TOKENS: u32 = 8192;

#[derive(Serialize)]
struct Content {
    role: String,
    parts: Vec<Part>,
}

#[derive(Serialize)]
struct Part {
    text: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    max_output_tokens: u32,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    candidates: Option<Vec<Candidate>>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<ContentResponse>,
}

#[derive(Deserialize)]
struct ContentResponse {
    #[serde(default)]
    parts: Vec<PartResponse>,
}

#[derive(Deserialize)]
struct PartResponse {
    text: Option<String>,
}

#[derive(Deserialize)]
struct ErrorWrapper {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
    status: Option<String>,
}

fn extract_text_response(response: GenerateContentResponse) -> Result<String, GenerationError> {
    let text: String = response
        .candidates
        .and_then(|candidates| candidates.into_iter().next())
        .and_then(|candidate| candidate.content)
        .map(|content| {
            content
                .parts
                .into_iter()
                .filter_map(|part| part.text)
                .collect()
        })
        .unwrap_or_default();

    if text.trim().is_empty() {
        Err(GenerationError::EmptyResponse)
    } else {
        Ok(text)
    }
}

fn map_http_error(status: StatusCode, body: String) -> GenerationError {
    let message = serde_json::from_str::<ErrorWrapper>(&body)
        .map(|wrapper| {
            let status_text = wrapper.error.status.unwrap_or_default();
            let msg = wrapper.error.message.unwrap_or_else(|| body.clone());
            if status_text.is_empty() {
                msg
            } else {
                format!("{status_text}: {msg}")
            }
        })
        .unwrap_or_else(|_| body.clone());

    GenerationError::Http {
        status: status.as_u16(),
        message,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_shape() {
        let request = GenerateContentRequest::new("hello", 0.4);
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["contents"][0]["role"], "user");
        assert_eq!(value["contents"][0]["parts"][0]["text"], "hello");
        assert_eq!(value["generationConfig"]["maxOutputTokens"], 8192);
        assert!(value["generationConfig"]["temperature"].as_f64().unwrap() > 0.39);
    }

    #[test]
    fn test_extract_joins_text_parts() {
        let response: GenerateContentResponse = serde_json::from_str(
            r#"{"candidates":[{"content":{"parts":[{"text":"--- index.html ---\n"},{"text":"<!DOCTYPE html>"}]}}]}"#,
        )
        .unwrap();
        assert_eq!(
            extract_text_response(response).unwrap(),
            "--- index.html ---\n<!DOCTYPE html>"
        );
    }

    #[test]
    fn test_extract_empty_response() {
        let response: GenerateContentResponse = serde_json::from_str(r#"{"candidates":[]}"#).unwrap();
        assert_eq!(
            extract_text_response(response),
            Err(GenerationError::EmptyResponse)
        );
    }

    #[test]
    fn test_map_http_error_reads_api_message() {
        let body = r#"{"error":{"code":400,"message":"API key not valid","status":"INVALID_ARGUMENT"}}"#;
        assert_eq!(
            map_http_error(StatusCode::BAD_REQUEST, body.to_string()),
            GenerationError::Http {
                status: 400,
                message: "INVALID_ARGUMENT: API key not valid".to_string()
            }
        );
        assert_eq!(
            map_http_error(StatusCode::BAD_GATEWAY, "upstream".to_string()),
            GenerationError::Http {
                status: 502,
                message: "upstream".to_string()
            }
        );
    }

    #[test]
    fn test_url_uses_endpoint_and_model() {
        let client = GeminiApiClient::new("k", "gemini-2.5-flash").with_endpoint("http://localhost:8080/");
        assert_eq!(
            client.url(),
            "http://localhost:8080/models/gemini-2.5-flash:generateContent?key=k"
        );
    }
}

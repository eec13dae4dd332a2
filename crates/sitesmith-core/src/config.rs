//! User configuration (`config.toml`).

use serde::{Deserialize, Serialize};
use version_migrate::DeriveQueryable as Queryable;

use crate::preview::SandboxPolicy;

pub const DEFAULT_GENERATION_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_API_KEY_ENV: &str = "GEMINI_API_KEY";
pub const DEFAULT_GENERATION_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Root of the configuration file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Queryable, Default)]
#[queryable(entity = "config_root")]
pub struct RootConfig {
    #[serde(default)]
    pub generation: GenerationSettings,
    #[serde(default)]
    pub preview: PreviewSettings,
    #[serde(default)]
    pub export: ExportSettings,
}

/// Settings for the text-generation backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationSettings {
    pub model: String,
    /// Environment variable holding the API key. The key itself is never
    /// written to the config file.
    pub api_key_env: String,
    pub endpoint: String,
    /// Sampling temperature for plan prose.
    pub temperature: f32,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            model: DEFAULT_GENERATION_MODEL.to_string(),
            api_key_env: DEFAULT_API_KEY_ENV.to_string(),
            endpoint: DEFAULT_GENERATION_ENDPOINT.to_string(),
            temperature: 0.5,
        }
    }
}

impl GenerationSettings {
    /// Reads the API key from the configured environment variable.
    pub fn api_key(&self) -> Option<String> {
        std::env::var(&self.api_key_env)
            .ok()
            .filter(|key| !key.trim().is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PreviewSettings {
    /// Content-Security-Policy applied inside the preview sandbox.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_security_policy: Option<String>,
}

impl PreviewSettings {
    pub fn sandbox_policy(&self) -> SandboxPolicy {
        SandboxPolicy {
            content_security_policy: self.content_security_policy.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ExportSettings {
    /// Where archives are written; the platform download dir when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub directory: Option<String>,
}

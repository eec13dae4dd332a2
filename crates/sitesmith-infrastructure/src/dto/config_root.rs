//! ConfigRoot DTOs and migrations
//!
//! Versioned shape of `config.toml`. The API key itself is never stored; the
//! file only names the environment variable that holds it.

use serde::{Deserialize, Serialize};
use version_migrate::{IntoDomain, Versioned};

use sitesmith_core::config::{
    DEFAULT_API_KEY_ENV, DEFAULT_GENERATION_ENDPOINT, DEFAULT_GENERATION_MODEL, ExportSettings,
    GenerationSettings, PreviewSettings, RootConfig,
};

fn default_model() -> String {
    DEFAULT_GENERATION_MODEL.to_string()
}

fn default_api_key_env() -> String {
    DEFAULT_API_KEY_ENV.to_string()
}

fn default_endpoint() -> String {
    DEFAULT_GENERATION_ENDPOINT.to_string()
}

fn default_temperature() -> f32 {
    GenerationSettings::default().temperature
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationSettingsDTO {
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
}

impl Default for GenerationSettingsDTO {
    fn default() -> Self {
        GenerationSettings::default().into()
    }
}

impl From<GenerationSettings> for GenerationSettingsDTO {
    fn from(settings: GenerationSettings) -> Self {
        Self {
            model: settings.model,
            api_key_env: settings.api_key_env,
            endpoint: settings.endpoint,
            temperature: settings.temperature,
        }
    }
}

impl From<GenerationSettingsDTO> for GenerationSettings {
    fn from(dto: GenerationSettingsDTO) -> Self {
        Self {
            model: dto.model,
            api_key_env: dto.api_key_env,
            endpoint: dto.endpoint,
            temperature: dto.temperature,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PreviewSettingsDTO {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_security_policy: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExportSettingsDTO {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub directory: Option<String>,
}

/// Root configuration V1.0.0.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Versioned)]
#[versioned(version = "1.0.0")]
pub struct ConfigRootV1_0_0 {
    #[serde(default)]
    pub generation: GenerationSettingsDTO,
    #[serde(default)]
    pub preview: PreviewSettingsDTO,
    #[serde(default)]
    pub export: ExportSettingsDTO,
}

impl IntoDomain<RootConfig> for ConfigRootV1_0_0 {
    fn into_domain(self) -> RootConfig {
        RootConfig {
            generation: self.generation.into(),
            preview: PreviewSettings {
                content_security_policy: self.preview.content_security_policy,
            },
            export: ExportSettings {
                directory: self.export.directory,
            },
        }
    }
}

impl version_migrate::FromDomain<RootConfig> for ConfigRootV1_0_0 {
    fn from_domain(config: RootConfig) -> Self {
        ConfigRootV1_0_0 {
            generation: config.generation.into(),
            preview: PreviewSettingsDTO {
                content_security_policy: config.preview.content_security_policy,
            },
            export: ExportSettingsDTO {
                directory: config.export.directory,
            },
        }
    }
}

/// Creates and configures a Migrator instance for ConfigRoot.
///
/// ```ignore
/// let migrator = create_config_root_migrator();
/// let config: RootConfig = migrator.load_flat_from("config_root", toml_value)?;
/// ```
pub fn create_config_root_migrator() -> version_migrate::Migrator {
    let mut migrator = version_migrate::Migrator::builder().build();

    let config_path = version_migrate::Migrator::define("config_root")
        .from::<ConfigRootV1_0_0>()
        .into_with_save::<RootConfig>();

    migrator
        .register(config_path)
        .expect("Failed to register config_root migration path");

    migrator
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_gets_defaults() {
        let migrator = create_config_root_migrator();
        let toml_str = r#"
version = "1.0.0"

[generation]
model = "gemini-2.5-pro"

[export]
directory = "/tmp/exports"
"#;
        let toml_value: toml::Value = toml::from_str(toml_str).unwrap();
        let config: RootConfig = migrator.load_flat_from("config_root", toml_value).unwrap();

        assert_eq!(config.generation.model, "gemini-2.5-pro");
        assert_eq!(config.generation.api_key_env, DEFAULT_API_KEY_ENV);
        assert_eq!(config.generation.endpoint, DEFAULT_GENERATION_ENDPOINT);
        assert!(config.preview.content_security_policy.is_none());
        assert_eq!(config.export.directory.as_deref(), Some("/tmp/exports"));
    }
}

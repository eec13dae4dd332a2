//! Error types shared by every sitesmith crate.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The domain error for sitesmith.
#[derive(Error, Debug, Clone, Serialize, Deserialize)]
pub enum SitesmithError {
    /// Entity not found error with type information
    #[error("Entity not found: {entity_type} '{id}'")]
    NotFound {
        entity_type: &'static str,
        id: String,
    },

    /// IO error (file system operations)
    #[error("IO error: {message}")]
    Io { message: String },

    /// Data access error (repository/storage layer)
    #[error("Data access error: {0}")]
    DataAccess(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {format} - {message}")]
    Serialization {
        format: String, // "TOML", "JSON", "zip", ...
        message: String,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Migration error
    #[error("Migration error: {0}")]
    Migration(String),

    /// The generation service failed or returned unusable output
    #[error("Generation error: {0}")]
    Generation(String),

    /// Generated content was rejected by the validation boundary
    #[error("Validation error: {0}")]
    Validation(String),

    /// Internal error (should not happen in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl SitesmithError {
    pub fn not_found(entity_type: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type,
            id: id.into(),
        }
    }

    pub fn io(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    pub fn data_access(message: impl Into<String>) -> Self {
        Self::DataAccess(message.into())
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// `format` names the encoding that failed, e.g. `"TOML"` or `"zip"`.
    pub fn serialization(format: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Serialization {
            format: format.into(),
            message: message.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Service failures and validation rejections; both end up in the chat
    /// as error messages.
    pub fn is_generation_failure(&self) -> bool {
        matches!(self, Self::Generation(_) | Self::Validation(_))
    }
}

// ============================================================================
// From implementations for automatic conversion
// ============================================================================

impl From<std::io::Error> for SitesmithError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: format!("{} (kind: {:?})", err, err.kind()),
        }
    }
}

impl From<serde_json::Error> for SitesmithError {
    fn from(err: serde_json::Error) -> Self {
        Self::serialization("JSON", err.to_string())
    }
}

impl From<toml::de::Error> for SitesmithError {
    fn from(err: toml::de::Error) -> Self {
        Self::serialization("TOML", err.to_string())
    }
}

impl From<toml::ser::Error> for SitesmithError {
    fn from(err: toml::ser::Error) -> Self {
        Self::serialization("TOML", err.to_string())
    }
}

impl From<version_migrate::MigrationError> for SitesmithError {
    fn from(err: version_migrate::MigrationError) -> Self {
        use version_migrate::MigrationError;

        match err {
            MigrationError::EntityNotFound(id) => Self::not_found("entity", id),
            MigrationError::DeserializationError(_) | MigrationError::SerializationError(_) => {
                Self::serialization("migration", err.to_string())
            }
            MigrationError::TomlParseError(_) | MigrationError::TomlSerializeError(_) => {
                Self::serialization("TOML", err.to_string())
            }
            MigrationError::IoError { .. } => Self::Io {
                message: err.to_string(),
            },
            _ => Self::Migration(err.to_string()),
        }
    }
}

impl From<crate::generation::ValidationError> for SitesmithError {
    fn from(err: crate::generation::ValidationError) -> Self {
        Self::Validation(err.to_string())
    }
}

impl From<crate::generation::GenerationError> for SitesmithError {
    fn from(err: crate::generation::GenerationError) -> Self {
        match err {
            crate::generation::GenerationError::Invalid(inner) => inner.into(),
            other => Self::Generation(other.to_string()),
        }
    }
}

/// A type alias for `Result<T, SitesmithError>`.
pub type Result<T> = std::result::Result<T, SitesmithError>;

#[cfg(test)]
mod tests {
    use super::*;

    use crate::generation::{GenerationError, ValidationError};

    #[test]
    fn test_io_error_keeps_kind() {
        let err: SitesmithError =
            std::io::Error::new(std::io::ErrorKind::NotFound, "file not found").into();
        assert_eq!(err.to_string(), "IO error: file not found (kind: NotFound)");
    }

    #[test]
    fn test_generation_errors_convert() {
        let invalid: SitesmithError = GenerationError::Invalid(ValidationError::MissingDoctype).into();
        assert!(matches!(invalid, SitesmithError::Validation(_)));
        assert!(invalid.is_generation_failure());

        let failed: SitesmithError = GenerationError::EmptyResponse.into();
        assert!(matches!(failed, SitesmithError::Generation(_)));
        assert!(!SitesmithError::not_found("project", "p1").is_generation_failure());
    }
}

//! AppState DTOs and migrations

use serde::{Deserialize, Serialize};
use version_migrate::{IntoDomain, Versioned};

use sitesmith_core::state::AppState;

/// Application state V1.0.0.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Versioned)]
#[versioned(version = "1.0.0")]
pub struct AppStateV1_0_0 {
    /// ID of the last active project, used to resume on start-up.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_project_id: Option<String>,
}

impl IntoDomain<AppState> for AppStateV1_0_0 {
    fn into_domain(self) -> AppState {
        AppState {
            last_project_id: self.last_project_id,
        }
    }
}

impl version_migrate::FromDomain<AppState> for AppStateV1_0_0 {
    fn from_domain(state: AppState) -> Self {
        AppStateV1_0_0 {
            last_project_id: state.last_project_id,
        }
    }
}

/// Creates and configures a Migrator instance for AppState.
///
/// ```ignore
/// let migrator = create_app_state_migrator();
/// let state: AppState = migrator.load_flat_from("app_state", toml_value)?;
/// ```
pub fn create_app_state_migrator() -> version_migrate::Migrator {
    let mut migrator = version_migrate::Migrator::builder().build();

    let app_state_path = version_migrate::Migrator::define("app_state")
        .from::<AppStateV1_0_0>()
        .into_with_save::<AppState>();

    migrator
        .register(app_state_path)
        .expect("Failed to register app_state migration path");

    migrator
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_state_migration_to_domain() {
        let migrator = create_app_state_migrator();
        let toml_value: toml::Value =
            toml::from_str("version = \"1.0.0\"\nlast_project_id = \"p-1\"\n").unwrap();

        let state: AppState = migrator.load_flat_from("app_state", toml_value).unwrap();
        assert_eq!(state.last_project_id.as_deref(), Some("p-1"));
    }
}

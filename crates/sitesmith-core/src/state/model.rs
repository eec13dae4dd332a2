//! Application state domain model.

use serde::{Deserialize, Serialize};
use version_migrate::DeriveQueryable as Queryable;

/// Application state that persists across restarts.
///
/// A single slot: the project the user was working on last, used to resume
/// where they left off.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Queryable, Default)]
#[queryable(entity = "app_state")]
pub struct AppState {
    /// ID of the last active project.
    pub last_project_id: Option<String>,
}

impl AppState {
    /// Creates a new AppState with default values.
    pub fn new() -> Self {
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new() {
        assert!(AppState::new().last_project_id.is_none());
    }
}

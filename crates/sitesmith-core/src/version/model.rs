use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::bundle::{CanonicalFile, CodeBundle};

/// An immutable snapshot of a bundle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeVersion {
    pub id: String,
    pub bundle: CodeBundle,
    /// The prompt (or edit description) that produced this snapshot.
    pub origin_prompt: String,
    pub created_at: DateTime<Utc>,
    /// Canonical file names that differ from the previous head.
    #[serde(default)]
    pub changed_file_names: Vec<String>,
    #[serde(default)]
    pub change_summary: Option<String>,
    /// Plan text returned alongside generated code.
    #[serde(default)]
    pub plan: Option<String>,
    /// Set when this version was created by restoring an older one.
    #[serde(default)]
    pub restored_from: Option<String>,
}

impl CodeVersion {
    pub(super) fn new(
        bundle: CodeBundle,
        origin_prompt: impl Into<String>,
        changed: &[CanonicalFile],
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            bundle,
            origin_prompt: origin_prompt.into(),
            created_at: Utc::now(),
            changed_file_names: changed
                .iter()
                .map(|kind| kind.file_name().to_string())
                .collect(),
            change_summary: Some(super::summarize_changes(changed.len())),
            plan: None,
            restored_from: None,
        }
    }

    pub fn is_restore(&self) -> bool {
        self.restored_from.is_some()
    }
}

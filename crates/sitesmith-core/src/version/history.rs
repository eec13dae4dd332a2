use serde::{Deserialize, Serialize};

use super::model::CodeVersion;
use crate::bundle::{CanonicalFile, CodeBundle};

/// Oldest versions beyond this count are dropped.
pub const MAX_VERSIONS: usize = 100;

/// One-line description of how many canonical files changed.
pub fn summarize_changes(changed: usize) -> String {
    match changed {
        0 => "No changes.".to_string(),
        n if n == CanonicalFile::ALL.len() => "Created full project from scratch.".to_string(),
        1 => "Updated 1 file".to_string(),
        n => format!("Updated {n} files"),
    }
}

/// Versions of one project, most recent first.
///
/// History only grows at the front. Restoring an old snapshot appends a copy
/// instead of rewinding, so the full timeline stays auditable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VersionHistory {
    versions: Vec<CodeVersion>,
}

impl VersionHistory {
    /// Wraps stored versions (already most-recent-first), enforcing the cap.
    pub fn from_versions(mut versions: Vec<CodeVersion>) -> Self {
        versions.truncate(MAX_VERSIONS);
        Self { versions }
    }

    pub fn head(&self) -> Option<&CodeVersion> {
        self.versions.first()
    }

    pub fn current_bundle(&self) -> Option<&CodeBundle> {
        self.head().map(|version| &version.bundle)
    }

    pub fn find(&self, version_id: &str) -> Option<&CodeVersion> {
        self.versions.iter().find(|version| version.id == version_id)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, CodeVersion> {
        self.versions.iter()
    }

    pub fn as_slice(&self) -> &[CodeVersion] {
        &self.versions
    }

    pub fn len(&self) -> usize {
        self.versions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.versions.is_empty()
    }

    pub fn into_versions(self) -> Vec<CodeVersion> {
        self.versions
    }

    /// Records `bundle` as the new head, diffed against the current head.
    pub fn create_version(
        &mut self,
        bundle: CodeBundle,
        origin_prompt: impl Into<String>,
    ) -> &CodeVersion {
        self.create_version_with_plan(bundle, origin_prompt, None)
    }

    pub fn create_version_with_plan(
        &mut self,
        bundle: CodeBundle,
        origin_prompt: impl Into<String>,
        plan: Option<String>,
    ) -> &CodeVersion {
        let changed = bundle.changed_files(self.current_bundle());
        let mut version = CodeVersion::new(bundle, origin_prompt, &changed);
        version.plan = plan;
        self.push_front(version)
    }

    /// Re-publishes an older snapshot as a new head.
    ///
    /// Returns `None` and leaves the history untouched if `version_id` is
    /// unknown.
    pub fn restore(&mut self, version_id: &str) -> Option<&CodeVersion> {
        let target = self.find(version_id)?;
        let bundle = target.bundle.clone();
        let plan = target.plan.clone();
        let prompt = format!("Restored from version {version_id}");

        let changed = bundle.changed_files(self.current_bundle());
        let mut version = CodeVersion::new(bundle, prompt, &changed);
        version.plan = plan;
        version.restored_from = Some(version_id.to_string());
        Some(self.push_front(version))
    }

    fn push_front(&mut self, version: CodeVersion) -> &CodeVersion {
        tracing::info!(
            "[VersionHistory] New version {} ({})",
            version.id,
            version.change_summary.as_deref().unwrap_or_default()
        );
        self.versions.insert(0, version);
        self.versions.truncate(MAX_VERSIONS);
        &self.versions[0]
    }
}

impl<'a> IntoIterator for &'a VersionHistory {
    type Item = &'a CodeVersion;
    type IntoIter = std::slice::Iter<'a, CodeVersion>;

    fn into_iter(self) -> Self::IntoIter {
        self.versions.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bundle(style: &str) -> CodeBundle {
        CodeBundle::new("A", style, "C", "{}")
    }

    #[test]
    fn test_first_version_changes_everything() {
        let mut history = VersionHistory::default();
        let v1 = history.create_version(bundle("B"), "make a site");

        assert_eq!(
            v1.changed_file_names,
            vec!["index.html", "styles.css", "script.js", "data.json"]
        );
        assert_eq!(v1.change_summary.as_deref(), Some("Created full project from scratch."));
    }

    #[test]
    fn test_second_version_diffs_against_head() {
        let mut history = VersionHistory::default();
        history.create_version(bundle("B"), "first");
        let v2 = history.create_version(bundle("B2"), "restyle");

        assert_eq!(v2.changed_file_names, vec!["styles.css"]);
        assert_eq!(v2.change_summary.as_deref(), Some("Updated 1 file"));

        let v3 = history.create_version(bundle("B2"), "nothing");
        assert!(v3.changed_file_names.is_empty());
        assert_eq!(v3.change_summary.as_deref(), Some("No changes."));
    }

    #[test]
    fn test_summary_pluralizes() {
        assert_eq!(summarize_changes(2), "Updated 2 files");
        assert_eq!(summarize_changes(3), "Updated 3 files");
    }

    #[test]
    fn test_restore_appends_copy() {
        let mut history = VersionHistory::default();
        let v1 = history.create_version(bundle("B"), "first").clone();
        let v2 = history.create_version(bundle("B2"), "second").clone();

        let v3 = history.restore(&v1.id).unwrap().clone();

        assert_eq!(history.len(), 3);
        assert_eq!(history.as_slice(), &[v3.clone(), v2, v1.clone()]);
        assert_eq!(v3.bundle, v1.bundle);
        assert_ne!(v3.id, v1.id);
        assert_eq!(v3.restored_from.as_deref(), Some(v1.id.as_str()));
        assert_eq!(v3.changed_file_names, vec!["styles.css"]);
    }

    #[test]
    fn test_restore_unknown_is_noop() {
        let mut history = VersionHistory::default();
        history.create_version(bundle("B"), "first");
        let before = history.clone();

        assert!(history.restore("missing").is_none());
        assert_eq!(history, before);
    }

    #[test]
    fn test_history_is_capped() {
        let mut history = VersionHistory::default();
        for i in 0..(MAX_VERSIONS + 5) {
            history.create_version(bundle(&i.to_string()), format!("v{i}"));
        }
        assert_eq!(history.len(), MAX_VERSIONS);
        assert_eq!(history.head().unwrap().origin_prompt, format!("v{}", MAX_VERSIONS + 4));
        assert_eq!(history.as_slice().last().unwrap().origin_prompt, "v5");
    }
}

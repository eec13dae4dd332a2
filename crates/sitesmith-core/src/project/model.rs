//! Project domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::starter;
use crate::bundle::{CodeBundle, to_tree};
use crate::file_tree::FileTree;
use crate::version::{CodeVersion, VersionHistory};

pub const DEFAULT_PROJECT_NAME: &str = "New Project";

/// Name of the project created when the store is empty on start-up.
pub const FIRST_RUN_PROJECT_NAME: &str = "My First App";

/// Author of a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    #[serde(alias = "model")]
    Assistant,
    /// A failed generation, shown inline in the conversation.
    Error,
}

/// One entry of a project's conversation. Never edited after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: String,
    pub role: ChatRole,
    pub content: String,
    pub created_at: DateTime<Utc>,
    /// Version produced by this message, if it updated the code.
    #[serde(default)]
    pub version_id: Option<String>,
    #[serde(default)]
    pub changed_file_names: Vec<String>,
    #[serde(default)]
    pub change_summary: Option<String>,
    #[serde(default)]
    pub is_code_update: bool,
}

impl ChatMessage {
    fn with_role(role: ChatRole, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            role,
            content: content.into(),
            created_at: Utc::now(),
            version_id: None,
            changed_file_names: Vec::new(),
            change_summary: None,
            is_code_update: false,
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::with_role(ChatRole::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::with_role(ChatRole::Assistant, content)
    }

    pub fn error(content: impl Into<String>) -> Self {
        Self::with_role(ChatRole::Error, content)
    }

    /// Assistant reply announcing a new version.
    pub fn code_update(version: &CodeVersion) -> Self {
        let summary = version.change_summary.clone().unwrap_or_default();
        let mut message = Self::assistant(format!(
            "**Website updated!**\n\n{summary}\n\nYour changes are now live in the preview and editor."
        ));
        message.version_id = Some(version.id.clone());
        message.changed_file_names = version.changed_file_names.clone();
        message.change_summary = version.change_summary.clone();
        message.is_code_update = true;
        message
    }
}

/// A website project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub id: String,
    pub name: String,
    /// Chronological conversation.
    pub chat: Vec<ChatMessage>,
    /// Most recent first; the head is the current bundle.
    pub versions: VersionHistory,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Project {
    /// Creates an empty project greeted with the welcome message.
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            chat: vec![ChatMessage::assistant(starter::welcome_message(&name))],
            name,
            versions: VersionHistory::default(),
            created_at: now,
            updated_at: now,
        }
    }

    /// The bundle of the head version, if any version exists.
    pub fn current_bundle(&self) -> Option<&CodeBundle> {
        self.versions.current_bundle()
    }

    /// The bundle to edit and preview: the head, or the starter page.
    pub fn working_bundle(&self) -> CodeBundle {
        self.current_bundle()
            .cloned()
            .unwrap_or_else(|| starter::starter_bundle(&self.name))
    }

    pub fn working_tree(&self) -> FileTree {
        to_tree(&self.working_bundle())
    }

    /// True until the first version is recorded.
    pub fn is_first_interaction(&self) -> bool {
        self.versions.is_empty()
    }

    pub fn push_message(&mut self, message: ChatMessage) {
        self.chat.push(message);
        self.touch();
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_project_has_welcome_only() {
        let project = Project::new("Portfolio");
        assert_eq!(project.chat.len(), 1);
        assert_eq!(project.chat[0].role, ChatRole::Assistant);
        assert!(project.chat[0].content.contains("Portfolio"));
        assert!(project.versions.is_empty());
        assert!(project.is_first_interaction());
    }

    #[test]
    fn test_working_bundle_falls_back_to_starter() {
        let mut project = Project::new("Portfolio");
        assert!(project.current_bundle().is_none());
        assert!(project.working_bundle().markup.contains("<title>Portfolio</title>"));

        let bundle = CodeBundle::new("<!DOCTYPE html>", "b", "c", "{}");
        project.versions.create_version(bundle.clone(), "go");
        assert_eq!(project.working_bundle(), bundle);
    }

    #[test]
    fn test_code_update_message() {
        let mut history = VersionHistory::default();
        let version = history.create_version(CodeBundle::new("a", "b", "c", "{}"), "go");
        let message = ChatMessage::code_update(version);

        assert!(message.is_code_update);
        assert_eq!(message.version_id.as_deref(), Some(version.id.as_str()));
        assert_eq!(
            message.content,
            "**Website updated!**\n\nCreated full project from scratch.\n\nYour changes are now live in the preview and editor."
        );
    }

    #[test]
    fn test_legacy_model_role_reads_as_assistant() {
        let role: ChatRole = serde_json::from_str("\"model\"").unwrap();
        assert_eq!(role, ChatRole::Assistant);
        assert_eq!(serde_json::to_string(&ChatRole::Assistant).unwrap(), "\"assistant\"");
    }
}

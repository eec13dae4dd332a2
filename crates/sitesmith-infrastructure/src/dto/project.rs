//! Project DTOs and migrations
//!
//! - V1.0.0: Legacy layout. The bundle has `html`/`css`/`js` and no data
//!   document; timestamps are Unix milliseconds; chat roles are free strings
//!   where the assistant is called `"model"`.
//! - V1.1.0: Current layout. Adds `data_document`, RFC 3339 timestamps and a
//!   closed set of chat roles.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use version_migrate::{IntoDomain, MigratesTo, Versioned};

use sitesmith_core::bundle::{CodeBundle, DEFAULT_DATA_DOCUMENT};
use sitesmith_core::file_tree::{FileEntry, FileNode, FolderEntry};
use sitesmith_core::project::{ChatMessage, ChatRole, Project};
use sitesmith_core::version::{CodeVersion, VersionHistory};

// ============================================================================
// Shared DTOs
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileKindDTO {
    File,
    Folder,
}

/// File tree node as stored on disk.
///
/// Kept flat (a kind plus optional fields) so it maps onto plain TOML tables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileNodeDTO {
    pub id: String,
    pub name: String,
    pub kind: FileKindDTO,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media_type: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<FileNodeDTO>,
}

impl From<FileNodeDTO> for FileNode {
    fn from(dto: FileNodeDTO) -> Self {
        match dto.kind {
            FileKindDTO::File => FileNode::File(FileEntry {
                id: dto.id,
                name: dto.name,
                content: dto.content.unwrap_or_default(),
                media_type: dto.media_type,
            }),
            FileKindDTO::Folder => FileNode::Folder(FolderEntry {
                id: dto.id,
                name: dto.name,
                children: dto.children.into_iter().map(Into::into).collect(),
            }),
        }
    }
}

impl From<FileNode> for FileNodeDTO {
    fn from(node: FileNode) -> Self {
        match node {
            FileNode::File(file) => FileNodeDTO {
                id: file.id,
                name: file.name,
                kind: FileKindDTO::File,
                content: Some(file.content),
                media_type: file.media_type,
                children: Vec::new(),
            },
            FileNode::Folder(folder) => FileNodeDTO {
                id: folder.id,
                name: folder.name,
                kind: FileKindDTO::Folder,
                content: None,
                media_type: None,
                children: folder.children.into_iter().map(Into::into).collect(),
            },
        }
    }
}

fn millis_to_datetime(millis: i64) -> DateTime<Utc> {
    Utc.timestamp_millis_opt(millis)
        .single()
        .unwrap_or(DateTime::UNIX_EPOCH)
}

// ============================================================================
// V1.0.0 (legacy)
// ============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CodeBundleV1_0_0 {
    #[serde(default)]
    pub html: String,
    #[serde(default)]
    pub css: String,
    #[serde(default)]
    pub js: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extra_files: Vec<FileNodeDTO>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CodeVersionV1_0_0 {
    pub id: String,
    #[serde(default)]
    pub code: CodeBundleV1_0_0,
    #[serde(default)]
    pub prompt: String,
    /// Unix milliseconds.
    #[serde(default)]
    pub timestamp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub changes_summary: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub changed_files: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plan: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessageV1_0_0 {
    pub id: String,
    /// `"user"`, `"model"` or `"error"`.
    pub role: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub timestamp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version_id: Option<String>,
    #[serde(default)]
    pub is_code_update: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub changed_files: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub changes_summary: Option<String>,
}

/// V1.0.0: Project without a data document.
#[derive(Debug, Clone, Serialize, Deserialize, Versioned)]
#[versioned(version = "1.0.0")]
pub struct ProjectV1_0_0 {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub versions: Vec<CodeVersionV1_0_0>,
    #[serde(default)]
    pub chat: Vec<ChatMessageV1_0_0>,
    #[serde(default)]
    pub created_at: i64,
    #[serde(default)]
    pub updated_at: i64,
}

// ============================================================================
// V1.1.0 (current)
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRoleDTO {
    User,
    #[serde(alias = "model")]
    Assistant,
    Error,
}

impl ChatRoleDTO {
    /// Parses a legacy role string. Unknown roles read as assistant text.
    fn from_legacy(role: &str) -> Self {
        match role.to_ascii_lowercase().as_str() {
            "user" => ChatRoleDTO::User,
            "error" => ChatRoleDTO::Error,
            _ => ChatRoleDTO::Assistant,
        }
    }
}

impl From<ChatRoleDTO> for ChatRole {
    fn from(dto: ChatRoleDTO) -> Self {
        match dto {
            ChatRoleDTO::User => ChatRole::User,
            ChatRoleDTO::Assistant => ChatRole::Assistant,
            ChatRoleDTO::Error => ChatRole::Error,
        }
    }
}

impl From<ChatRole> for ChatRoleDTO {
    fn from(role: ChatRole) -> Self {
        match role {
            ChatRole::User => ChatRoleDTO::User,
            ChatRole::Assistant => ChatRoleDTO::Assistant,
            ChatRole::Error => ChatRoleDTO::Error,
        }
    }
}

fn default_data_document() -> String {
    DEFAULT_DATA_DOCUMENT.to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CodeBundleDTO {
    #[serde(default)]
    pub markup: String,
    #[serde(default)]
    pub style: String,
    #[serde(default)]
    pub script: String,
    #[serde(default = "default_data_document")]
    pub data_document: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extra_files: Vec<FileNodeDTO>,
}

impl From<CodeBundleDTO> for CodeBundle {
    fn from(dto: CodeBundleDTO) -> Self {
        CodeBundle {
            markup: dto.markup,
            style: dto.style,
            script: dto.script,
            data_document: dto.data_document,
            extra_files: dto.extra_files.into_iter().map(Into::into).collect(),
        }
    }
}

impl From<CodeBundle> for CodeBundleDTO {
    fn from(bundle: CodeBundle) -> Self {
        CodeBundleDTO {
            markup: bundle.markup,
            style: bundle.style,
            script: bundle.script,
            data_document: bundle.data_document,
            extra_files: bundle.extra_files.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CodeVersionDTO {
    pub id: String,
    pub bundle: CodeBundleDTO,
    #[serde(default)]
    pub origin_prompt: String,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub changed_file_names: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub change_summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plan: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub restored_from: Option<String>,
}

impl From<CodeVersionDTO> for CodeVersion {
    fn from(dto: CodeVersionDTO) -> Self {
        CodeVersion {
            id: dto.id,
            bundle: dto.bundle.into(),
            origin_prompt: dto.origin_prompt,
            created_at: dto.created_at,
            changed_file_names: dto.changed_file_names,
            change_summary: dto.change_summary,
            plan: dto.plan,
            restored_from: dto.restored_from,
        }
    }
}

impl From<CodeVersion> for CodeVersionDTO {
    fn from(version: CodeVersion) -> Self {
        CodeVersionDTO {
            id: version.id,
            bundle: version.bundle.into(),
            origin_prompt: version.origin_prompt,
            created_at: version.created_at,
            changed_file_names: version.changed_file_names,
            change_summary: version.change_summary,
            plan: version.plan,
            restored_from: version.restored_from,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessageDTO {
    pub id: String,
    pub role: ChatRoleDTO,
    #[serde(default)]
    pub content: String,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version_id: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub changed_file_names: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub change_summary: Option<String>,
    #[serde(default)]
    pub is_code_update: bool,
}

impl From<ChatMessageDTO> for ChatMessage {
    fn from(dto: ChatMessageDTO) -> Self {
        ChatMessage {
            id: dto.id,
            role: dto.role.into(),
            content: dto.content,
            created_at: dto.created_at,
            version_id: dto.version_id,
            changed_file_names: dto.changed_file_names,
            change_summary: dto.change_summary,
            is_code_update: dto.is_code_update,
        }
    }
}

impl From<ChatMessage> for ChatMessageDTO {
    fn from(message: ChatMessage) -> Self {
        ChatMessageDTO {
            id: message.id,
            role: message.role.into(),
            content: message.content,
            created_at: message.created_at,
            version_id: message.version_id,
            changed_file_names: message.changed_file_names,
            change_summary: message.change_summary,
            is_code_update: message.is_code_update,
        }
    }
}

/// V1.1.0: Project with a data document in every bundle.
#[derive(Debug, Clone, Serialize, Deserialize, Versioned)]
#[versioned(version = "1.1.0")]
pub struct ProjectV1_1_0 {
    pub id: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Most recent first.
    #[serde(default)]
    pub versions: Vec<CodeVersionDTO>,
    #[serde(default)]
    pub chat: Vec<ChatMessageDTO>,
}

// ============================================================================
// Migration implementations
// ============================================================================

/// Migration from ProjectV1_0_0 to ProjectV1_1_0.
/// Renames bundle fields, backfills the data document with `{}` and converts
/// millisecond timestamps.
impl MigratesTo<ProjectV1_1_0> for ProjectV1_0_0 {
    fn migrate(self) -> ProjectV1_1_0 {
        let versions = self
            .versions
            .into_iter()
            .map(|version| CodeVersionDTO {
                id: version.id,
                bundle: CodeBundleDTO {
                    markup: version.code.html,
                    style: version.code.css,
                    script: version.code.js,
                    data_document: default_data_document(),
                    extra_files: version.code.extra_files,
                },
                origin_prompt: version.prompt,
                created_at: millis_to_datetime(version.timestamp),
                changed_file_names: version.changed_files,
                change_summary: version.changes_summary,
                plan: version.plan,
                restored_from: None,
            })
            .collect();

        let chat = self
            .chat
            .into_iter()
            .map(|message| ChatMessageDTO {
                id: message.id,
                role: ChatRoleDTO::from_legacy(&message.role),
                content: message.content,
                created_at: millis_to_datetime(message.timestamp),
                version_id: message.version_id,
                changed_file_names: message.changed_files,
                change_summary: message.changes_summary,
                is_code_update: message.is_code_update,
            })
            .collect();

        ProjectV1_1_0 {
            id: self.id,
            name: self.name,
            created_at: millis_to_datetime(self.created_at),
            updated_at: millis_to_datetime(self.updated_at),
            versions,
            chat,
        }
    }
}

// ============================================================================
// Domain model conversions
// ============================================================================

impl IntoDomain<Project> for ProjectV1_1_0 {
    fn into_domain(self) -> Project {
        Project {
            id: self.id,
            name: self.name,
            chat: self.chat.into_iter().map(Into::into).collect(),
            versions: VersionHistory::from_versions(
                self.versions.into_iter().map(Into::into).collect(),
            ),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

impl version_migrate::FromDomain<Project> for ProjectV1_1_0 {
    fn from_domain(project: Project) -> Self {
        ProjectV1_1_0 {
            id: project.id,
            name: project.name,
            created_at: project.created_at,
            updated_at: project.updated_at,
            versions: project
                .versions
                .into_versions()
                .into_iter()
                .map(Into::into)
                .collect(),
            chat: project.chat.into_iter().map(Into::into).collect(),
        }
    }
}

// ============================================================================
// Migrator factory
// ============================================================================

/// Creates and configures a Migrator instance for Project entities.
///
/// # Migration Path
///
/// - V1.0.0 → V1.1.0: Adds `data_document`, converts timestamps and roles
/// - V1.1.0 → Project: Converts DTO to domain model
pub fn create_project_migrator() -> version_migrate::Migrator {
    let mut migrator = version_migrate::Migrator::builder().build();

    let project_path = version_migrate::Migrator::define("project")
        .from::<ProjectV1_0_0>()
        .step::<ProjectV1_1_0>()
        .into_with_save::<Project>();

    migrator
        .register(project_path)
        .expect("Failed to register project migration path");

    migrator
}

#[cfg(test)]
mod migrator_tests {
    use super::*;
    use sitesmith_core::bundle::to_tree;

    #[test]
    fn test_project_migration_v1_0_to_domain() {
        let migrator = create_project_migrator();

        let toml_str = r#"
version = "1.0.0"
id = "550e8400-e29b-41d4-a716-446655440000"
name = "Bakery"
created_at = 1700000000000
updated_at = 1700000100000

[[versions]]
id = "v1"
prompt = "a bakery landing page"
timestamp = 1700000050000
changes_summary = "Created full project from scratch."

[versions.code]
html = "<!DOCTYPE html><html><body>Bread</body></html>"
css = "body { color: brown; }"
js = "console.log('hi');"

[[chat]]
id = "m1"
role = "user"
content = "a bakery landing page"
timestamp = 1700000040000

[[chat]]
id = "m2"
role = "model"
content = "Done"
timestamp = 1700000050000
version_id = "v1"
is_code_update = true
"#;
        let toml_value: toml::Value = toml::from_str(toml_str).unwrap();

        let result: Result<Project, _> = migrator.load_flat_from("project", toml_value);
        assert!(result.is_ok(), "Migration failed: {:?}", result.err());
        let project = result.unwrap();

        assert_eq!(project.name, "Bakery");
        assert_eq!(project.created_at.timestamp_millis(), 1700000000000);
        assert_eq!(project.chat[1].role, ChatRole::Assistant);
        assert_eq!(project.chat[1].version_id.as_deref(), Some("v1"));

        let bundle = project.current_bundle().unwrap();
        assert_eq!(bundle.data_document, "{}");
        assert_eq!(bundle.style, "body { color: brown; }");
        assert!(to_tree(bundle).find_file_by_name("data.json").is_some());
    }

    #[test]
    fn test_project_v1_1_missing_data_document_is_backfilled() {
        let migrator = create_project_migrator();

        let toml_str = r#"
version = "1.1.0"
id = "p1"
name = "Blog"
created_at = "2025-01-01T00:00:00Z"
updated_at = "2025-01-01T00:01:00Z"

[[versions]]
id = "v1"
origin_prompt = "a blog"
created_at = "2025-01-01T00:01:00Z"

[versions.bundle]
markup = "<!DOCTYPE html>"
style = "a {}"
script = ""
"#;
        let toml_value: toml::Value = toml::from_str(toml_str).unwrap();
        let project: Project = migrator.load_flat_from("project", toml_value).unwrap();

        assert_eq!(project.current_bundle().unwrap().data_document, "{}");
        assert!(project.chat.is_empty());
    }

    #[test]
    fn test_file_node_dto_preserves_tree_shape() {
        let node = FileNode::folder_with_id(
            "img",
            "img",
            vec![FileNode::File(FileEntry {
                id: "logo".to_string(),
                name: "logo.png".to_string(),
                content: "data:image/png;base64,AAAA".to_string(),
                media_type: Some("image/png".to_string()),
            })],
        );

        let dto = FileNodeDTO::from(node.clone());
        assert_eq!(dto.kind, FileKindDTO::Folder);
        assert!(dto.content.is_none());
        assert_eq!(FileNode::from(dto), node);
    }
}

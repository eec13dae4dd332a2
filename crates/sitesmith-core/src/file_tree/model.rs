use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A node of the project file tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum FileNode {
    File(FileEntry),
    Folder(FolderEntry),
}

/// A file leaf.
///
/// `content` is plain text, except for binary uploads which hold a
/// `data:` URI and carry their `media_type`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileEntry {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media_type: Option<String>,
}

/// A folder; children keep insertion order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FolderEntry {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub children: Vec<FileNode>,
}

impl FileNode {
    /// Creates a text file with a fresh id.
    pub fn file(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self::file_with_id(Uuid::new_v4().to_string(), name, content)
    }

    pub fn file_with_id(
        id: impl Into<String>,
        name: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self::File(FileEntry {
            id: id.into(),
            name: name.into(),
            content: content.into(),
            media_type: None,
        })
    }

    /// Creates an empty folder with a fresh id.
    pub fn folder(name: impl Into<String>) -> Self {
        Self::folder_with_id(Uuid::new_v4().to_string(), name, Vec::new())
    }

    pub fn folder_with_id(
        id: impl Into<String>,
        name: impl Into<String>,
        children: Vec<FileNode>,
    ) -> Self {
        Self::Folder(FolderEntry {
            id: id.into(),
            name: name.into(),
            children,
        })
    }

    pub fn id(&self) -> &str {
        match self {
            Self::File(file) => &file.id,
            Self::Folder(folder) => &folder.id,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::File(file) => &file.name,
            Self::Folder(folder) => &folder.name,
        }
    }

    pub fn is_file(&self) -> bool {
        matches!(self, Self::File(_))
    }

    pub fn is_folder(&self) -> bool {
        matches!(self, Self::Folder(_))
    }

    pub fn as_file(&self) -> Option<&FileEntry> {
        match self {
            Self::File(file) => Some(file),
            Self::Folder(_) => None,
        }
    }

    pub fn as_folder(&self) -> Option<&FolderEntry> {
        match self {
            Self::Folder(folder) => Some(folder),
            Self::File(_) => None,
        }
    }

    /// Children of a folder; empty for files.
    pub fn children(&self) -> &[FileNode] {
        match self {
            Self::Folder(folder) => &folder.children,
            Self::File(_) => &[],
        }
    }

    /// Returns true if `id` is this node or any node below it.
    pub fn contains_id(&self, id: &str) -> bool {
        self.id() == id || self.children().iter().any(|child| child.contains_id(id))
    }
}

impl FileEntry {
    /// Returns true if the content is a `data:` URI rather than text.
    pub fn is_binary(&self) -> bool {
        self.content.starts_with("data:")
    }
}

//! Bundle <-> tree conversion.
//!
//! A tree built from a bundle always has the same shape:
//!
//! ```text
//! my-project/
//!   src/
//!     index.html
//!     styles.css
//!     script.js
//!     data.json
//!     <extra files, in bundle order>
//! ```

use super::model::{CanonicalFile, CodeBundle};
use crate::file_tree::{FileNode, FileTree};

pub const ROOT_FOLDER_ID: &str = "root";
pub const ROOT_FOLDER_NAME: &str = "my-project";
pub const SOURCE_FOLDER_ID: &str = "src";
pub const SOURCE_FOLDER_NAME: &str = "src";

/// Builds the fixed two-level tree for a bundle.
///
/// Blank canonical fields are filled with [`CanonicalFile::default_content`].
/// Extra files keep their ids and order.
pub fn to_tree(bundle: &CodeBundle) -> FileTree {
    let mut children: Vec<FileNode> = CanonicalFile::ALL
        .into_iter()
        .map(|kind| {
            let content = bundle.get(kind);
            let content = if content.trim().is_empty() {
                kind.default_content()
            } else {
                content
            };
            FileNode::file_with_id(kind.node_id(), kind.file_name(), content)
        })
        .collect();
    children.extend(bundle.extra_files.iter().cloned());

    FileTree::new(vec![FileNode::folder_with_id(
        ROOT_FOLDER_ID,
        ROOT_FOLDER_NAME,
        vec![FileNode::folder_with_id(
            SOURCE_FOLDER_ID,
            SOURCE_FOLDER_NAME,
            children,
        )],
    )])
}

/// Collapses a tree back into a bundle.
///
/// The first file (pre-order) with a canonical name fills that field. A
/// canonical file missing from the tree keeps the value from `previous`, or
/// the default content when there is none. Every non-canonical file becomes
/// an extra file, flattened in pre-order; folders are not kept.
pub fn to_bundle(tree: &FileTree, previous: Option<&CodeBundle>) -> CodeBundle {
    let field = |kind: CanonicalFile| -> String {
        match tree.find_file_by_name(kind.file_name()) {
            Some(file) => file.content.clone(),
            None => previous
                .map(|prev| prev.get(kind).to_string())
                .unwrap_or_else(|| kind.default_content().to_string()),
        }
    };

    let extra_files = tree
        .flatten()
        .into_iter()
        .filter(|file| CanonicalFile::from_name(&file.name).is_none())
        .map(|file| FileNode::File(file.clone()))
        .collect();

    CodeBundle {
        markup: field(CanonicalFile::Markup),
        style: field(CanonicalFile::Style),
        script: field(CanonicalFile::Script),
        data_document: field(CanonicalFile::DataDocument),
        extra_files,
    }
}

use std::sync::Arc;

use thiserror::Error;

use super::model::{FileEntry, FileNode, FolderEntry};
use crate::bundle::CanonicalFile;

/// Rejected structural changes.
///
/// Most tree operations treat bad ids as caller-contract violations and
/// quietly return the unchanged tree. Moves that would corrupt the tree fail
/// with one of these instead.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TreeError {
    #[error("cannot move '{node_id}' into its own subtree '{dest_id}'")]
    MoveIntoDescendant { node_id: String, dest_id: String },

    #[error("move destination '{id}' is not a folder")]
    DestinationNotFolder { id: String },
}

/// An immutable-style file tree.
///
/// Cloning is cheap; the root list is shared until a mutation produces a new
/// tree.
#[derive(Debug, Clone, Default)]
pub struct FileTree {
    roots: Arc<Vec<FileNode>>,
}

impl PartialEq for FileTree {
    fn eq(&self, other: &Self) -> bool {
        self.same_as(other) || self.roots == other.roots
    }
}

impl Eq for FileTree {}

impl From<Vec<FileNode>> for FileTree {
    fn from(roots: Vec<FileNode>) -> Self {
        Self::new(roots)
    }
}

impl FileTree {
    pub fn new(roots: Vec<FileNode>) -> Self {
        Self {
            roots: Arc::new(roots),
        }
    }

    pub fn roots(&self) -> &[FileNode] {
        &self.roots
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// Returns the root nodes, cloning only if the storage is shared.
    pub fn into_nodes(self) -> Vec<FileNode> {
        Arc::try_unwrap(self.roots).unwrap_or_else(|shared| (*shared).clone())
    }

    /// Reference identity: true when `other` is this exact tree value.
    pub fn same_as(&self, other: &FileTree) -> bool {
        Arc::ptr_eq(&self.roots, &other.roots)
    }

    /// Pre-order traversal over every node.
    pub fn iter(&self) -> PreOrder<'_> {
        PreOrder {
            stack: vec![self.roots.iter()],
        }
    }

    // ============================================================================
    // Mutations
    // ============================================================================

    /// Inserts `node` as the last root, or as the last child of `parent_id`.
    ///
    /// No-op when the parent is not a folder or the node id already exists.
    pub fn insert(&self, node: FileNode, parent_id: Option<&str>) -> FileTree {
        if self.iter().any(|existing| node.contains_id(existing.id())) {
            tracing::debug!("[FileTree] insert skipped: id '{}' already present", node.id());
            return self.clone();
        }

        let mut roots = (*self.roots).clone();
        match parent_id {
            None => roots.push(node),
            Some(parent_id) => match find_folder_mut(&mut roots, parent_id) {
                Some(folder) => folder.children.push(node),
                None => {
                    tracing::debug!("[FileTree] insert skipped: '{}' is not a folder", parent_id);
                    return self.clone();
                }
            },
        }
        FileTree::new(roots)
    }

    /// Removes the node and its subtree.
    ///
    /// Canonical files (`index.html`, `styles.css`, `script.js`, `data.json`)
    /// are protected by name and cannot be removed directly.
    pub fn remove(&self, node_id: &str) -> FileTree {
        let Some(node) = self.find_by_id(node_id) else {
            tracing::debug!("[FileTree] remove skipped: '{}' not found", node_id);
            return self.clone();
        };
        if Self::is_protected(node) {
            tracing::debug!("[FileTree] remove skipped: '{}' is protected", node.name());
            return self.clone();
        }

        let mut roots = (*self.roots).clone();
        remove_from(&mut roots, node_id);
        FileTree::new(roots)
    }

    /// Detaches the subtree at `node_id` and appends it to `dest_folder_id`.
    ///
    /// Unknown ids and `node_id == dest_folder_id` leave the tree unchanged.
    /// Moving a folder below itself, or into a file, is rejected.
    pub fn move_node(&self, node_id: &str, dest_folder_id: &str) -> Result<FileTree, TreeError> {
        if node_id == dest_folder_id {
            return Ok(self.clone());
        }
        let (Some(node), Some(dest)) = (self.find_by_id(node_id), self.find_by_id(dest_folder_id))
        else {
            tracing::debug!(
                "[FileTree] move skipped: '{}' -> '{}' does not resolve",
                node_id,
                dest_folder_id
            );
            return Ok(self.clone());
        };
        if !dest.is_folder() {
            return Err(TreeError::DestinationNotFolder {
                id: dest_folder_id.to_string(),
            });
        }
        if node.contains_id(dest_folder_id) {
            return Err(TreeError::MoveIntoDescendant {
                node_id: node_id.to_string(),
                dest_id: dest_folder_id.to_string(),
            });
        }

        let mut roots = (*self.roots).clone();
        let detached = remove_from(&mut roots, node_id);
        match (detached, find_folder_mut(&mut roots, dest_folder_id)) {
            (Some(detached), Some(folder)) => {
                folder.children.push(detached);
                Ok(FileTree::new(roots))
            }
            // Both ids resolved above, so this only happens on a corrupt tree.
            _ => Ok(self.clone()),
        }
    }

    /// Replaces the content of a file. No-op for unknown ids and folders.
    pub fn update_file_content(&self, file_id: &str, content: impl Into<String>) -> FileTree {
        let content = content.into();
        match self.find_by_id(file_id).and_then(FileNode::as_file) {
            Some(file) if file.content == content => return self.clone(),
            Some(_) => {}
            None => return self.clone(),
        }

        let mut roots = (*self.roots).clone();
        if let Some(file) = find_file_mut(&mut roots, file_id) {
            file.content = content;
        }
        FileTree::new(roots)
    }

    // ============================================================================
    // Lookups
    // ============================================================================

    pub fn find_by_id(&self, id: &str) -> Option<&FileNode> {
        self.iter().find(|node| node.id() == id)
    }

    /// First file in pre-order.
    pub fn find_first_file(&self) -> Option<&FileEntry> {
        self.iter().find_map(FileNode::as_file)
    }

    /// First file with exactly this name, in pre-order.
    pub fn find_file_by_name(&self, name: &str) -> Option<&FileEntry> {
        self.iter()
            .filter_map(FileNode::as_file)
            .find(|file| file.name == name)
    }

    /// Every file in pre-order; folders are elided.
    pub fn flatten(&self) -> Vec<&FileEntry> {
        self.iter().filter_map(FileNode::as_file).collect()
    }

    pub fn is_protected(node: &FileNode) -> bool {
        node.is_file() && CanonicalFile::from_name(node.name()).is_some()
    }
}

/// Pre-order iterator over a [`FileTree`].
pub struct PreOrder<'a> {
    stack: Vec<std::slice::Iter<'a, FileNode>>,
}

impl<'a> Iterator for PreOrder<'a> {
    type Item = &'a FileNode;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let level = self.stack.last_mut()?;
            match level.next() {
                Some(node) => {
                    if let FileNode::Folder(folder) = node {
                        self.stack.push(folder.children.iter());
                    }
                    return Some(node);
                }
                None => {
                    self.stack.pop();
                }
            }
        }
    }
}

fn find_folder_mut<'a>(nodes: &'a mut [FileNode], id: &str) -> Option<&'a mut FolderEntry> {
    for node in nodes.iter_mut() {
        if let FileNode::Folder(folder) = node {
            if folder.id == id {
                return Some(folder);
            }
            if let Some(found) = find_folder_mut(&mut folder.children, id) {
                return Some(found);
            }
        }
    }
    None
}

fn find_file_mut<'a>(nodes: &'a mut [FileNode], id: &str) -> Option<&'a mut FileEntry> {
    for node in nodes.iter_mut() {
        match node {
            FileNode::File(file) if file.id == id => return Some(file),
            FileNode::File(_) => {}
            FileNode::Folder(folder) => {
                if let Some(found) = find_file_mut(&mut folder.children, id) {
                    return Some(found);
                }
            }
        }
    }
    None
}

fn remove_from(nodes: &mut Vec<FileNode>, id: &str) -> Option<FileNode> {
    if let Some(pos) = nodes.iter().position(|node| node.id() == id) {
        return Some(nodes.remove(pos));
    }
    for node in nodes.iter_mut() {
        if let FileNode::Folder(folder) = node {
            if let Some(removed) = remove_from(&mut folder.children, id) {
                return Some(removed);
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_tree() -> FileTree {
        FileTree::new(vec![FileNode::folder_with_id(
            "root",
            "my-project",
            vec![
                FileNode::folder_with_id(
                    "src",
                    "src",
                    vec![
                        FileNode::file_with_id("index-html", "index.html", "<h1>hi</h1>"),
                        FileNode::file_with_id("notes", "notes.md", "# notes"),
                    ],
                ),
                FileNode::folder_with_id("assets", "assets", vec![]),
            ],
        )])
    }

    fn names(tree: &FileTree) -> Vec<&str> {
        tree.iter().map(FileNode::name).collect()
    }

    #[test]
    fn test_insert_appends_as_last_child() {
        let tree = sample_tree();
        let updated = tree.insert(FileNode::file_with_id("a", "a.txt", "a"), Some("src"));

        let src = updated.find_by_id("src").unwrap();
        let children: Vec<&str> = src.children().iter().map(FileNode::id).collect();
        assert_eq!(children, vec!["index-html", "notes", "a"]);
        // the original value is untouched
        assert!(tree.find_by_id("a").is_none());
    }

    #[test]
    fn test_insert_without_parent_adds_root() {
        let tree = sample_tree().insert(FileNode::file_with_id("r", "readme.txt", ""), None);
        assert_eq!(tree.roots().len(), 2);
        assert_eq!(tree.roots()[1].id(), "r");
    }

    #[test]
    fn test_insert_into_file_or_unknown_parent_is_noop() {
        let tree = sample_tree();
        let into_file = tree.insert(FileNode::file("x.txt", ""), Some("notes"));
        let into_missing = tree.insert(FileNode::file("y.txt", ""), Some("nope"));
        assert!(into_file.same_as(&tree));
        assert!(into_missing.same_as(&tree));
    }

    #[test]
    fn test_insert_duplicate_id_is_noop() {
        let tree = sample_tree();
        let updated = tree.insert(FileNode::file_with_id("notes", "again.md", ""), None);
        assert!(updated.same_as(&tree));
    }

    #[test]
    fn test_remove_deletes_subtree() {
        let tree = sample_tree().insert(FileNode::file_with_id("logo", "logo.png", ""), Some("assets"));
        let updated = tree.remove("assets");
        assert!(updated.find_by_id("assets").is_none());
        assert!(updated.find_by_id("logo").is_none());
        assert!(tree.find_by_id("logo").is_some());
    }

    #[test]
    fn test_remove_protected_name_is_noop() {
        let tree = sample_tree();
        let updated = tree.remove("index-html");
        assert!(updated.same_as(&tree));
        assert_eq!(updated, sample_tree());
    }

    #[test]
    fn test_remove_unknown_is_noop() {
        let tree = sample_tree();
        assert!(tree.remove("ghost").same_as(&tree));
    }

    #[test]
    fn test_move_reparents_subtree() {
        let tree = sample_tree();
        let moved = tree.move_node("notes", "assets").unwrap();
        let assets = moved.find_by_id("assets").unwrap();
        assert_eq!(assets.children()[0].id(), "notes");
        assert_eq!(moved.find_by_id("src").unwrap().children().len(), 1);
    }

    #[test]
    fn test_move_noops() {
        let tree = sample_tree();
        assert!(tree.move_node("src", "src").unwrap().same_as(&tree));
        assert!(tree.move_node("ghost", "src").unwrap().same_as(&tree));
        assert!(tree.move_node("notes", "ghost").unwrap().same_as(&tree));
    }

    #[test]
    fn test_move_into_descendant_is_rejected() {
        let tree = sample_tree();
        let err = tree.move_node("root", "src").unwrap_err();
        assert_eq!(
            err,
            TreeError::MoveIntoDescendant {
                node_id: "root".to_string(),
                dest_id: "src".to_string()
            }
        );
    }

    #[test]
    fn test_move_into_file_is_rejected() {
        let tree = sample_tree();
        assert!(matches!(
            tree.move_node("assets", "notes"),
            Err(TreeError::DestinationNotFolder { .. })
        ));
        // the node was not lost
        assert!(tree.find_by_id("assets").is_some());
    }

    #[test]
    fn test_traversals_are_pre_order() {
        let tree = sample_tree();
        assert_eq!(
            names(&tree),
            vec!["my-project", "src", "index.html", "notes.md", "assets"]
        );
        assert_eq!(tree.find_first_file().unwrap().id, "index-html");
        let flat: Vec<&str> = tree.flatten().iter().map(|f| f.name.as_str()).collect();
        assert_eq!(flat, vec!["index.html", "notes.md"]);
    }

    #[test]
    fn test_update_file_content() {
        let tree = sample_tree();
        let edited = tree.update_file_content("notes", "# changed");
        assert_eq!(edited.find_file_by_name("notes.md").unwrap().content, "# changed");
        assert!(tree.update_file_content("src", "x").same_as(&tree));
        assert!(edited.update_file_content("notes", "# changed").same_as(&edited));
    }

    #[test]
    fn test_empty_tree_lookups() {
        let tree = FileTree::default();
        assert!(tree.find_first_file().is_none());
        assert!(tree.flatten().is_empty());
    }
}

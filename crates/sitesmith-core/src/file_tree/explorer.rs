use std::collections::BTreeSet;

use super::model::{FileEntry, FileNode};
use super::tree::{FileTree, TreeError};

/// Live editing state around a [`FileTree`].
///
/// Tracks the UI side-tables an editor needs: which folders are expanded,
/// which files are open as tabs, and which one is active.
#[derive(Debug, Clone, Default)]
pub struct Explorer {
    tree: FileTree,
    expanded: BTreeSet<String>,
    open_files: Vec<String>,
    active_file: Option<String>,
}

impl Explorer {
    /// Opens a tree with every folder expanded and the first file active.
    pub fn new(tree: FileTree) -> Self {
        let expanded = tree
            .iter()
            .filter(|node| node.is_folder())
            .map(|node| node.id().to_string())
            .collect();
        let active_file = tree.find_first_file().map(|file| file.id.clone());
        Self {
            open_files: active_file.iter().cloned().collect(),
            tree,
            expanded,
            active_file,
        }
    }

    pub fn tree(&self) -> &FileTree {
        &self.tree
    }

    /// Swaps in a new tree (e.g. after a save), keeping whatever UI state
    /// still refers to existing nodes.
    pub fn replace_tree(&mut self, tree: FileTree) {
        self.tree = tree;
        self.prune();
    }

    /// Inserts a node; the parent is expanded and a new file becomes active.
    ///
    /// Returns false if the tree did not change.
    pub fn add_node(&mut self, node: FileNode, parent_id: Option<&str>) -> bool {
        let id = node.id().to_string();
        let is_file = node.is_file();
        let updated = self.tree.insert(node, parent_id);
        if updated.same_as(&self.tree) {
            return false;
        }
        self.tree = updated;
        if let Some(parent_id) = parent_id {
            self.expanded.insert(parent_id.to_string());
        }
        if is_file {
            self.open_file(&id);
        } else {
            self.expanded.insert(id);
        }
        true
    }

    pub fn delete_node(&mut self, node_id: &str) -> bool {
        let updated = self.tree.remove(node_id);
        if updated.same_as(&self.tree) {
            return false;
        }
        self.tree = updated;
        self.prune();
        true
    }

    pub fn move_node(&mut self, node_id: &str, dest_folder_id: &str) -> Result<bool, TreeError> {
        let updated = self.tree.move_node(node_id, dest_folder_id)?;
        if updated.same_as(&self.tree) {
            return Ok(false);
        }
        self.tree = updated;
        self.expanded.insert(dest_folder_id.to_string());
        Ok(true)
    }

    pub fn update_file_content(&mut self, file_id: &str, content: impl Into<String>) -> bool {
        let updated = self.tree.update_file_content(file_id, content);
        if updated.same_as(&self.tree) {
            return false;
        }
        self.tree = updated;
        true
    }

    pub fn toggle_folder(&mut self, folder_id: &str) {
        if !self.expanded.remove(folder_id) {
            self.expanded.insert(folder_id.to_string());
        }
    }

    pub fn is_expanded(&self, folder_id: &str) -> bool {
        self.expanded.contains(folder_id)
    }

    /// Opens a file tab and makes it active. Folders are ignored.
    pub fn open_file(&mut self, file_id: &str) -> bool {
        let Some(file) = self.tree.find_by_id(file_id).and_then(FileNode::as_file) else {
            return false;
        };
        if !self.open_files.iter().any(|id| id == &file.id) {
            self.open_files.push(file.id.clone());
        }
        self.active_file = Some(file.id.clone());
        true
    }

    pub fn close_file(&mut self, file_id: &str) {
        self.open_files.retain(|id| id != file_id);
        if self.active_file.as_deref() == Some(file_id) {
            self.active_file = self.open_files.last().cloned();
            self.ensure_active();
        }
    }

    pub fn active_file(&self) -> Option<&FileEntry> {
        self.active_file
            .as_deref()
            .and_then(|id| self.tree.find_by_id(id))
            .and_then(FileNode::as_file)
    }

    pub fn open_files(&self) -> impl Iterator<Item = &FileEntry> {
        self.open_files
            .iter()
            .filter_map(|id| self.tree.find_by_id(id).and_then(FileNode::as_file))
    }

    fn prune(&mut self) {
        let tree = &self.tree;
        self.expanded.retain(|id| tree.find_by_id(id).is_some());
        self.open_files.retain(|id| tree.find_by_id(id).is_some_and(FileNode::is_file));
        if self.active_file().is_none() {
            self.active_file = self.open_files.last().cloned();
        }
        self.ensure_active();
    }

    /// Falls back to the first file when nothing valid is active.
    fn ensure_active(&mut self) {
        if self.active_file().is_some() {
            return;
        }
        self.active_file = self.tree.find_first_file().map(|file| file.id.clone());
        if let Some(id) = self.active_file.clone() {
            if !self.open_files.contains(&id) {
                self.open_files.push(id);
            }
        }
    }
}

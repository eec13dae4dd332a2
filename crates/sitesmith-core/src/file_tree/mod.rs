//! In-memory file tree of a project.
//!
//! The tree is a disposable projection of the current bundle (see
//! [`crate::bundle`]). Mutations never touch the receiver: every operation
//! returns a new [`FileTree`], and a no-op hands back a tree sharing the same
//! storage so callers can detect "nothing happened" with [`FileTree::same_as`].

mod explorer;
mod model;
mod tree;

pub use explorer::Explorer;
pub use model::{FileEntry, FileNode, FolderEntry};
pub use tree::{FileTree, PreOrder, TreeError};

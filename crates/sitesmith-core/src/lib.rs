//! Domain layer of sitesmith: the file tree, the four-file bundle, version
//! history, the sandboxed preview and the interfaces to storage and the
//! generation service.

pub mod bundle;
pub mod config;
pub mod error;
pub mod file_tree;
pub mod generation;
pub mod preview;
pub mod project;
pub mod state;
pub mod version;

// Re-export common error type
pub use error::{Result, SitesmithError};

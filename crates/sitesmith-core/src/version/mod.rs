//! Append-only version history of a project's bundle.

mod history;
mod model;

pub use history::{MAX_VERSIONS, VersionHistory, summarize_changes};
pub use model::CodeVersion;

//! Data Transfer Objects (DTOs) for persistence.
//!
//! These DTOs are the versioned on-disk schema. They stay private to the
//! infrastructure layer; the domain only ever sees migrated values.
//!
//! ## Schema Versioning
//!
//! - **MAJOR (X.0.0)**: Breaking changes (field removal, type changes)
//! - **MINOR (1.X.0)**: Backward-compatible additions (new optional fields)
//!
//! ### Project Version History
//! - **1.0.0**: Bundle of `html`/`css`/`js`, millisecond timestamps, `model` role
//! - **1.1.0**: Adds the data document; RFC 3339 timestamps
//!
//! ### AppState / ConfigRoot Version History
//! - **1.0.0**: Initial schema

mod app_state;
mod config_root;
mod project;

pub use app_state::{AppStateV1_0_0, create_app_state_migrator};
pub use config_root::{ConfigRootV1_0_0, create_config_root_migrator};
pub use project::{
    ChatMessageDTO, ChatRoleDTO, CodeBundleDTO, CodeVersionDTO, FileKindDTO, FileNodeDTO,
    ProjectV1_0_0, ProjectV1_1_0, create_project_migrator,
};

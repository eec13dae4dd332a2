//! Projects: chat log plus version history.

mod model;
mod repository;
mod starter;

pub use model::{ChatMessage, ChatRole, DEFAULT_PROJECT_NAME, FIRST_RUN_PROJECT_NAME, Project};
pub use repository::ProjectRepository;
pub use starter::{starter_bundle, welcome_message};

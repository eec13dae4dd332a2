//! Session state that survives restarts.

mod model;
mod repository;

pub use model::AppState;
pub use repository::StateRepository;

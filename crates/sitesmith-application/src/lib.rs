//! Application layer for sitesmith.
//!
//! This crate provides use case implementations that coordinate between
//! domain and infrastructure layers to implement application-level business logic.

pub mod project_usecase;

pub use project_usecase::{MANUAL_EDIT_PROMPT, ProjectUseCase, SendOutcome};

pub mod app_state_service;
pub mod async_dir_project_repository;
pub mod config_service;
pub mod dto;
pub mod export;
pub mod paths;
pub mod upload;

pub use crate::app_state_service::AppStateService;
pub use crate::async_dir_project_repository::AsyncDirProjectRepository;
pub use crate::config_service::ConfigService;
pub use crate::export::ZipExporter;
pub use crate::paths::SitesmithPaths;

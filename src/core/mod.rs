//! Core infrastructure: workspace discovery, settings, backups

pub mod backup;
pub mod config;
pub mod workspace;

pub use config::Settings;
pub use workspace::Workspace;

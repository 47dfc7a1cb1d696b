pub mod app_context;
pub mod auth;
pub mod backup;
pub mod config;
pub mod database;
pub mod errors;
pub mod services;

#[cfg(feature = "server")]
pub mod server;

pub use app_context::{AppContext, BackupArchive, ImportSummary};
pub use config::BackupConfig;

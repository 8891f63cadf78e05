//! Core application infrastructure

pub mod cli;
pub mod config;
pub mod constants;
pub mod storage;

pub use crate::app::CoreApp;
pub use cli::{CliConfig, Commands};
pub use config::{ApiConfig, AppConfig, AuthEndpoints, RoutesConfig, StorageBackend};
pub use storage::AppStorage;

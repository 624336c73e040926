//! Shared domain types, configuration, and the resolution log for reelid.

pub mod app_config;
pub mod config;
pub mod log;
pub mod movie;
pub mod username;

use thiserror::Error;

pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env};
pub use log::{LogEntry, LogSink, ResolutionLog};
pub use movie::{MovieRecord, PartialRecord};
pub use username::validate_username;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("{0}")]
    InvalidUsername(&'static str),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}

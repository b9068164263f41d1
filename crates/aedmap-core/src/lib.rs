pub mod app_config;
pub mod config;
pub mod record;

pub use app_config::AppConfig;
pub use config::{load_app_config, load_app_config_from_env};
pub use record::{FilterState, GeoPoint, Record, Status, UserLocation};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid status: {0}")]
    InvalidStatus(String),
}

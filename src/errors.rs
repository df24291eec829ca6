use thiserror::Error;

use momo_config::ConfigError;
use momo_core::CoreError;

/// Failures surfaced while wiring the application together.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error(transparent)]
    Core(#[from] CoreError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("Invalid environment: {0}")]
    Environment(String),
}

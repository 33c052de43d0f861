use std::path::PathBuf;

use conversion_client::ClientError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config {path:?}: {message}")]
    Read { path: PathBuf, message: String },
    #[error("cannot parse config {path:?}: {message}")]
    Parse { path: PathBuf, message: String },
    #[error("invalid base url {url:?}: {message}")]
    BaseUrl { url: String, message: String },
    #[error("invalid form field {0:?}, expected KEY=VALUE")]
    Field(String),
    #[error("unknown output format {0:?}, expected audio or pdf")]
    OutputFormat(String),
    #[error("speed must be a positive number, got {0}")]
    Speed(f32),
    #[error("poll interval must be at least 1 ms")]
    PollInterval,
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("client failed: {0}")]
    Client(#[from] ClientError),
}

use starlight_core::CoreError;
use starlight_http::{ClientError, HttpError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DaemonError {
    #[error("Configuration error: {0}")]
    Config(#[from] ::config::ConfigError),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Http(#[from] HttpError),

    #[error(transparent)]
    Client(#[from] ClientError),

    #[error(transparent)]
    Storage(#[from] CoreError),

    #[error("Platform directories could not be determined")]
    PlatformDirsNotFound,
}

pub type Result<T> = std::result::Result<T, DaemonError>;

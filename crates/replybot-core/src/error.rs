use crate::api::ApiError;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BotError {
    #[error("{operation} still rate-limited after waiting {}s", waited.as_secs())]
    RateLimitExceeded {
        operation: String,
        waited: Duration,
        #[source]
        source: ApiError,
    },

    #[error("{operation} failed: {source}")]
    Api {
        operation: String,
        #[source]
        source: ApiError,
    },

    #[error("missing configuration file: {}", .0.display())]
    ConfigMissing(PathBuf),

    #[error("invalid configuration in {}: {reason}", path.display())]
    InvalidConfig { path: PathBuf, reason: String },

    #[error("cannot read or write {}: {reason}", path.display())]
    Persistence { path: PathBuf, reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, BotError>;

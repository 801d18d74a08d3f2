//! SDK-level errors.

use cache_database::DatabaseError;
use cache_reconciler::{SyncError, SyncErrorKind};
use remote_fetch_gateway::GatewayError;
use sdk_config_and_utils::CoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SdkError {
    #[error("Configuration error: {0}")]
    Core(#[from] CoreError),

    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    #[error("Gateway error: {0}")]
    Gateway(#[from] GatewayError),

    #[error(transparent)]
    Sync(#[from] SyncError),

    /// The worker pool could not be started, or a job on it did not finish.
    #[error("Runtime error: {0}")]
    Runtime(String),
}

impl SdkError {
    /// Classification for sync failures; `None` for setup errors.
    pub fn sync_kind(&self) -> Option<SyncErrorKind> {
        match self {
            Self::Sync(err) => Some(err.kind()),
            _ => None,
        }
    }
}

impl From<std::io::Error> for SdkError {
    fn from(err: std::io::Error) -> Self {
        Self::Runtime(err.to_string())
    }
}

pub type SdkResult<T> = Result<T, SdkError>;

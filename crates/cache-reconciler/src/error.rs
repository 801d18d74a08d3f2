//! Sync error types.

use cache_database::DatabaseError;
use remote_fetch_gateway::{GatewayError, GatewayErrorKind};
use thiserror::Error;

/// What went wrong, as reported to the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SyncErrorKind {
    Network,
    Authentication,
    Server,
    Validation,
    Storage,
}

/// Error of a refresh or reconciliation pass.
///
/// Gateway failures happen before any mutation. Storage failures roll the
/// pass back. Neither is retried here.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error(transparent)]
    Gateway(#[from] GatewayError),

    #[error("Storage error: {0}")]
    Storage(#[from] DatabaseError),

    /// A scope or cascade link names a column its table does not have.
    #[error("Invalid scope: {0}")]
    InvalidScope(String),

    /// A record type's columns disagree with its table.
    #[error("Invalid record mapping: {0}")]
    InvalidRecord(String),

    /// A fetched record does not fit the local record type.
    #[error("Undecodable record: {0}")]
    Decode(String),
}

impl SyncError {
    pub fn kind(&self) -> SyncErrorKind {
        match self {
            Self::Gateway(err) => match err.kind() {
                GatewayErrorKind::Network => SyncErrorKind::Network,
                GatewayErrorKind::Authentication => SyncErrorKind::Authentication,
                GatewayErrorKind::Server => SyncErrorKind::Server,
                GatewayErrorKind::Validation => SyncErrorKind::Validation,
            },
            Self::Storage(_) => SyncErrorKind::Storage,
            Self::InvalidScope(_) | Self::InvalidRecord(_) => SyncErrorKind::Validation,
            Self::Decode(_) => SyncErrorKind::Server,
        }
    }
}

/// Result alias for sync operations.
pub type SyncResult<T> = Result<T, SyncError>;

//! Gateway error types.

use thiserror::Error;

/// Coarse classification of a failed fetch, surfaced to the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GatewayErrorKind {
    Network,
    Authentication,
    Server,
    Validation,
}

/// Error returned by a [`crate::FetchGateway`].
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GatewayError {
    /// Transport failure: connect, TLS, timeout, interrupted body.
    #[error("Network error: {0}")]
    Network(String),

    /// The API rejected the credentials (401/403).
    #[error("Authentication rejected: {status} - {message}")]
    Authentication { status: u16, message: String },

    /// Any other non-success status.
    #[error("Server error: {status} - {message}")]
    Server { status: u16, message: String },

    /// A success status whose body could not be decoded.
    #[error("Invalid response body: {0}")]
    InvalidResponse(String),

    /// The request could not be built.
    #[error("Invalid request: {0}")]
    Validation(String),
}

impl GatewayError {
    /// Classify a non-success HTTP status.
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        match status {
            401 | 403 => Self::Authentication { status, message },
            _ => Self::Server { status, message },
        }
    }

    pub fn kind(&self) -> GatewayErrorKind {
        match self {
            Self::Network(_) => GatewayErrorKind::Network,
            Self::Authentication { .. } => GatewayErrorKind::Authentication,
            Self::Server { .. } | Self::InvalidResponse(_) => GatewayErrorKind::Server,
            Self::Validation(_) => GatewayErrorKind::Validation,
        }
    }

    /// HTTP status, when the server answered.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Authentication { status, .. } | Self::Server { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for GatewayError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::InvalidResponse(err.to_string())
        } else if err.is_builder() {
            Self::Validation(err.to_string())
        } else if let Some(status) = err.status() {
            Self::from_status(status.as_u16(), err.to_string())
        } else {
            Self::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for GatewayError {
    fn from(err: serde_json::Error) -> Self {
        Self::InvalidResponse(err.to_string())
    }
}

impl From<url::ParseError> for GatewayError {
    fn from(err: url::ParseError) -> Self {
        Self::Validation(format!("invalid URL: {}", err))
    }
}

/// Result alias for gateway operations.
pub type GatewayResult<T> = Result<T, GatewayError>;

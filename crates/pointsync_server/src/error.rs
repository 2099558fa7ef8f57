//! Error types for the point server.

use pointsync_storage::StorageError;
use thiserror::Error;

/// Result type for server operations.
pub type ServerResult<T> = Result<T, ServerError>;

/// Errors that can occur in the point server.
#[derive(Error, Debug)]
pub enum ServerError {
    /// Request body was not a JSON array of points.
    #[error("invalid JSON: {0}")]
    InvalidRequest(String),

    /// Request body exceeded the configured limit.
    #[error("request body too large: {size} > {limit} bytes")]
    PayloadTooLarge {
        /// Body size.
        size: usize,
        /// Configured limit.
        limit: usize,
    },

    /// Persistence failure.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// Stored point file could not be parsed.
    #[error("stored points corrupted: {0}")]
    Corrupted(String),

    /// Internal failure (worker task panicked or was cancelled).
    #[error("internal error: {0}")]
    Internal(String),

    /// I/O error (binding, serving).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl ServerError {
    /// Returns true if this is a client error (4xx).
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            ServerError::InvalidRequest(_) | ServerError::PayloadTooLarge { .. }
        )
    }

    /// Returns true if this is a server error (5xx).
    pub fn is_server_error(&self) -> bool {
        !self.is_client_error()
    }

    /// HTTP status code for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            ServerError::InvalidRequest(_) => 400,
            ServerError::PayloadTooLarge { .. } => 413,
            _ => 500,
        }
    }
}

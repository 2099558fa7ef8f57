//! Error types for the sync engine.

use pointsync_protocol::{PointError, PointId, ProtocolError};
use pointsync_storage::StorageError;
use thiserror::Error;

/// Result type for sync operations.
pub type SyncResult<T> = Result<T, SyncError>;

/// Errors that can occur during sync operations.
#[derive(Error, Debug)]
pub enum SyncError {
    /// Network failure, timeout, or non-success HTTP status.
    #[error("transport error: {message}")]
    Transport {
        /// Error message.
        message: String,
        /// HTTP status, if the server answered.
        status: Option<u16>,
    },

    /// Payload could not be parsed as the expected shape.
    #[error("decode error: {0}")]
    Decode(String),

    /// Local persistence failure.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// A sync cycle is already in flight; this trigger was dropped.
    #[error("sync already in progress")]
    AlreadySyncing,

    /// The point id is pending deletion and cannot be re-added.
    #[error("point {0} is pending deletion")]
    Tombstoned(PointId),

    /// The point failed local validation.
    #[error("invalid point: {0}")]
    InvalidPoint(#[from] PointError),
}

/// Coarse classification of a [`SyncError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Network or server reachability.
    Transport,
    /// Malformed payload.
    Decode,
    /// Local persistence.
    Storage,
    /// Rejected locally before any I/O.
    Local,
}

impl SyncError {
    /// Creates a transport error without an HTTP status.
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
            status: None,
        }
    }

    /// Creates a transport error for a non-success HTTP status.
    pub fn http_status(status: u16, message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
            status: Some(status),
        }
    }

    /// Returns the error classification.
    pub fn kind(&self) -> ErrorKind {
        match self {
            SyncError::Transport { .. } => ErrorKind::Transport,
            SyncError::Decode(_) => ErrorKind::Decode,
            SyncError::Storage(_) => ErrorKind::Storage,
            SyncError::AlreadySyncing | SyncError::Tombstoned(_) | SyncError::InvalidPoint(_) => {
                ErrorKind::Local
            }
        }
    }
}

impl From<ProtocolError> for SyncError {
    fn from(err: ProtocolError) -> Self {
        match err {
            ProtocolError::Decode(message) => SyncError::Decode(message),
            ProtocolError::Encode(message) => SyncError::transport(message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_kinds() {
        assert_eq!(SyncError::transport("refused").kind(), ErrorKind::Transport);
        assert_eq!(
            SyncError::http_status(502, "bad gateway").kind(),
            ErrorKind::Transport
        );
        assert_eq!(SyncError::Decode("x".into()).kind(), ErrorKind::Decode);
        assert_eq!(
            SyncError::from(StorageError::Corrupted("x".into())).kind(),
            ErrorKind::Storage
        );
        assert_eq!(SyncError::AlreadySyncing.kind(), ErrorKind::Local);
    }

    #[test]
    fn protocol_errors_map_to_decode() {
        let err: SyncError = ProtocolError::Decode("expected array".into()).into();
        assert!(matches!(err, SyncError::Decode(_)));
    }

    #[test]
    fn error_display() {
        let err = SyncError::Tombstoned(PointId::from("abc"));
        assert_eq!(err.to_string(), "point abc is pending deletion");

        let err = SyncError::http_status(500, "server returned 500");
        assert_eq!(err.to_string(), "transport error: server returned 500");
    }
}

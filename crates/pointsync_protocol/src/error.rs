//! Error types for the protocol crate.

use thiserror::Error;

/// Result type for protocol operations.
pub type ProtocolResult<T> = Result<T, ProtocolError>;

/// Errors raised while encoding or decoding wire payloads.
#[derive(Error, Debug)]
pub enum ProtocolError {
    /// Payload could not be parsed as the expected shape.
    #[error("decode error: {0}")]
    Decode(String),

    /// Value could not be serialized.
    #[error("encode error: {0}")]
    Encode(String),
}

impl ProtocolError {
    pub(crate) fn decode(err: serde_json::Error) -> Self {
        Self::Decode(err.to_string())
    }

    pub(crate) fn encode(err: serde_json::Error) -> Self {
        Self::Encode(err.to_string())
    }
}

/// Errors raised when constructing a point locally.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PointError {
    /// Identifier was empty.
    #[error("point id must not be empty")]
    EmptyId,

    /// Latitude was outside [-90, 90] or not finite.
    #[error("latitude {0} out of range [-90, 90]")]
    InvalidLatitude(f64),

    /// Longitude was outside [-180, 180] or not finite.
    #[error("longitude {0} out of range [-180, 180]")]
    InvalidLongitude(f64),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = PointError::InvalidLatitude(91.5);
        assert!(err.to_string().contains("91.5"));

        let err = ProtocolError::Decode("expected array".into());
        assert_eq!(err.to_string(), "decode error: expected array");
    }
}

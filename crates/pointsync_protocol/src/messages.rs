//! Wire messages exchanged between client and server.
//!
//! The body of `GET /points` and `POST /points` is a JSON array of point
//! objects; a successful push or delete answers with [`PushResponse`].

use crate::error::{ProtocolError, ProtocolResult};
use crate::point::PointId;
use crate::point_set::PointSet;
use serde::{Deserialize, Serialize};

/// Response to `POST /points` and `DELETE /points/{id}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PushResponse {
    /// Whether the server applied the request.
    pub success: bool,
    /// Number of points the server holds afterwards.
    pub count: usize,
}

impl PushResponse {
    /// Creates a successful response.
    pub fn success(count: usize) -> Self {
        Self {
            success: true,
            count,
        }
    }

    /// Encodes to JSON.
    pub fn encode(&self) -> ProtocolResult<Vec<u8>> {
        serde_json::to_vec(self).map_err(ProtocolError::encode)
    }

    /// Decodes from JSON.
    pub fn decode(bytes: &[u8]) -> ProtocolResult<Self> {
        serde_json::from_slice(bytes).map_err(ProtocolError::decode)
    }
}

/// Encodes a point set as a JSON array.
pub fn encode_points(points: &PointSet) -> ProtocolResult<Vec<u8>> {
    serde_json::to_vec(points).map_err(ProtocolError::encode)
}

/// Decodes a JSON array of points.
///
/// Duplicate ids are collapsed, last occurrence wins.
pub fn decode_points(bytes: &[u8]) -> ProtocolResult<PointSet> {
    serde_json::from_slice(bytes).map_err(ProtocolError::decode)
}

/// Encodes a list of ids as a JSON array of strings.
pub fn encode_ids<'a>(ids: impl IntoIterator<Item = &'a PointId>) -> ProtocolResult<Vec<u8>> {
    let ids: Vec<&PointId> = ids.into_iter().collect();
    serde_json::to_vec(&ids).map_err(ProtocolError::encode)
}

/// Decodes a JSON array of id strings.
pub fn decode_ids(bytes: &[u8]) -> ProtocolResult<Vec<PointId>> {
    serde_json::from_slice(bytes).map_err(ProtocolError::decode)
}

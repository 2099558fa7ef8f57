//! # pointsync Protocol
//!
//! Point types and JSON wire messages for pointsync.
//!
//! This crate provides:
//! - `Point` and `PointId`, the replicated record and its stable key
//! - `PointSet`, the id → point mapping every replica holds
//! - Wire messages (`PushResponse`) and the JSON codec shared by
//!   client and server
//!
//! This is a pure protocol crate with no I/O operations.

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod error;
mod messages;
mod point;
mod point_set;

pub use error::{PointError, ProtocolError, ProtocolResult};
pub use messages::{decode_ids, decode_points, encode_ids, encode_points, PushResponse};
pub use point::{Point, PointId, MAX_LATITUDE, MAX_LONGITUDE};
pub use point_set::PointSet;

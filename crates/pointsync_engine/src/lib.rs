//! # pointsync Sync Engine
//!
//! Client-side synchronization of a point set with a pointsync server.
//!
//! This crate provides:
//! - Durable local point store and pending-deletion tombstones
//! - Pull-side merge that never resurrects deleted points
//! - Sync coordinator (idle → syncing → idle, one cycle in flight)
//! - Periodic scheduler on the tokio runtime
//! - HTTP transport abstraction
//!
//! ## Architecture
//!
//! Each cycle follows a **pull-merge-push** model:
//! 1. Fetch the server's entire set
//! 2. Reconcile tombstones, merge unknown remote points, persist
//! 3. Push the full local set; the server unions it by id
//! 4. Remove tombstoned ids the server still holds
//!
//! ## Key Invariants
//!
//! - A point is never both present locally and tombstoned
//! - Remote absence never deletes a local point
//! - A merge never overwrites a local record
//! - Push is idempotent; repeating a cycle converges
//! - A failed step keeps what earlier steps achieved

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod coordinator;
mod error;
mod http;
mod merge;
mod replica;
mod scheduler;
mod store;
mod tombstone;
mod transport;

pub use config::{SyncConfig, DEFAULT_SYNC_INTERVAL, DEFAULT_TIMEOUT};
pub use coordinator::{
    NoopListener, SyncCoordinator, SyncCycleResult, SyncListener, SyncState, SyncStats,
    SyncStatus, SyncTrigger,
};
pub use error::{ErrorKind, SyncError, SyncResult};
pub use http::{endpoint_url, HttpTransport};
pub use merge::merge;
pub use replica::{LocalReplica, PENDING_DELETES_KEY, SERVER_URL_KEY};
pub use scheduler::SyncScheduler;
pub use store::{PointStore, MAP_POINTS_KEY};
pub use tombstone::TombstoneSet;
pub use transport::{MockTransport, PointTransport, TransportCall};

//! # pointsync Testkit
//!
//! Test utilities for pointsync.
//!
//! This crate provides:
//! - Fixtures for backends, points and a live test server
//! - Property-based test generators using proptest
//! - Concurrent push stress helpers
//! - Wire-format test vectors
//!
//! ## Usage
//!
//! ```rust,ignore
//! use pointsync_testkit::prelude::*;
//!
//! #[tokio::test]
//! async fn test_with_server() {
//!     let server = spawn_test_server_with(point_set(&[("A", "Cafe")])).await;
//!     // ... point a client at server.url()
//!     server.shutdown().await.unwrap();
//! }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod fixtures;
pub mod generators;
pub mod stress;
pub mod vectors;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::fixtures::*;
    pub use crate::generators::*;
    pub use crate::stress::*;
    pub use crate::vectors::*;
}

pub use fixtures::*;
pub use generators::*;
pub use stress::*;
pub use vectors::*;

//! # pointsync Storage
//!
//! Key-value persistence backends for pointsync replicas.
//!
//! This crate provides the lowest-level persistence contract. Backends are
//! **opaque byte stores** keyed by short names: they do not interpret the
//! JSON the engine and server write into them.
//!
//! ## Design Principles
//!
//! - A `put` replaces the whole value under a key
//! - A `get` for a key never written returns `None`, not an error
//! - Must be `Send + Sync` so replicas can share a backend across tasks
//!
//! ## Available Backends
//!
//! - [`InMemoryBackend`] - For testing and ephemeral replicas
//! - [`FileBackend`] - One file per key inside a locked directory
//!
//! ## Example
//!
//! ```rust
//! use pointsync_storage::{StorageBackend, InMemoryBackend};
//!
//! let backend = InMemoryBackend::new();
//! backend.put("map_points", b"[]").unwrap();
//! assert_eq!(backend.get("map_points").unwrap().as_deref(), Some(&b"[]"[..]));
//! assert!(backend.get("server_url").unwrap().is_none());
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod backend;
mod error;
mod file;
mod memory;

pub use backend::{validate_key, StorageBackend};
pub use error::{StorageError, StorageResult};
pub use file::FileBackend;
pub use memory::InMemoryBackend;

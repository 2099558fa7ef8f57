//! # pointsync Server
//!
//! Reference HTTP point server for pointsync.
//!
//! This crate provides:
//! - `ServerRepository`, the durable point set with union-by-id push semantics
//! - Request handlers independent of the HTTP framework
//! - An axum router exposing `GET /points`, `POST /points`,
//!   `DELETE /points/{id}` and CORS preflight
//!
//! # Architecture
//!
//! The server holds exactly one point set, persisted as a JSON array under
//! the `points` key of a [`pointsync_storage::StorageBackend`]. With a
//! `FileBackend` that is the flat file `<data-dir>/points.json`.
//!
//! # Push semantics
//!
//! A push never blindly overwrites. The incoming array is unioned with the
//! stored set by id and the incoming record wins on collision, so a stale
//! client cannot erase points another client created. Pushes are serialised
//! by the repository, which makes them commutative for disjoint id sets and
//! idempotent.
//!
//! ```rust,ignore
//! use pointsync_server::{PointServer, ServerConfig, ServerRepository};
//! use pointsync_storage::FileBackend;
//!
//! let backend = FileBackend::open(Path::new("server-data"))?;
//! let repository = ServerRepository::open(Box::new(backend))?;
//! let server = PointServer::spawn(ServerConfig::default(), repository).await?;
//! println!("listening on http://{}/points", server.local_addr());
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
// Production code MUST NOT use panic!/unwrap()/expect()
#![warn(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

mod config;
mod error;
mod handler;
mod repository;
mod server;

pub use config::{ServerConfig, DEFAULT_PORT};
pub use error::{ServerError, ServerResult};
pub use handler::{HandlerContext, RequestHandler};
pub use repository::{ServerRepository, POINTS_KEY};
pub use server::{create_app, PointServer};

//! Test fixtures for stores, backends and servers.
//!
//! Provides convenience functions for setting up storage backends and a
//! live point server bound to an ephemeral local port.

use pointsync_protocol::{Point, PointSet};
use pointsync_server::{PointServer, ServerConfig, ServerRepository};
use pointsync_storage::{FileBackend, InMemoryBackend};
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

/// A file backend in a temporary directory, removed on drop.
pub struct TempFileBackend {
    /// The backend instance.
    pub backend: Arc<FileBackend>,
    /// The temporary directory (kept alive to prevent cleanup).
    _temp_dir: TempDir,
}

impl TempFileBackend {
    /// Creates a new file backend in a fresh temporary directory.
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let backend = FileBackend::open(temp_dir.path()).expect("Failed to open file backend");
        Self {
            backend: Arc::new(backend),
            _temp_dir: temp_dir,
        }
    }

    /// Returns the backing directory.
    pub fn path(&self) -> &Path {
        self._temp_dir.path()
    }
}

impl Default for TempFileBackend {
    fn default() -> Self {
        Self::new()
    }
}

/// Creates a shared in-memory backend.
pub fn memory_backend() -> Arc<InMemoryBackend> {
    Arc::new(InMemoryBackend::new())
}

/// Builds a valid point at fixed coordinates.
///
/// # Panics
///
/// Panics if `id` is empty.
pub fn point(id: &str, name: &str) -> Point {
    Point::with_id(id, name, 52.52, 13.405).expect("Invalid test point")
}

/// Builds a point set from `(id, name)` pairs.
pub fn point_set(entries: &[(&str, &str)]) -> PointSet {
    entries.iter().map(|(id, name)| point(id, name)).collect()
}

/// Address that lets the OS pick a free local port.
pub fn ephemeral_addr() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 0))
}

/// Starts a point server over an in-memory repository on an ephemeral port.
pub async fn spawn_test_server() -> PointServer {
    spawn_test_server_with(PointSet::new()).await
}

/// Starts a point server whose repository already holds `points`.
pub async fn spawn_test_server_with(points: PointSet) -> PointServer {
    let repository = ServerRepository::open(Box::new(InMemoryBackend::new()))
        .expect("Failed to open repository");
    if !points.is_empty() {
        repository
            .replace_all(points)
            .expect("Failed to seed repository");
    }
    PointServer::spawn(ServerConfig::new(ephemeral_addr()), repository)
        .await
        .expect("Failed to start test server")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pointsync_storage::StorageBackend;

    #[test]
    fn temp_file_backend_is_usable() {
        let temp = TempFileBackend::new();
        temp.backend.put("key", b"value").unwrap();
        assert_eq!(temp.backend.get("key").unwrap().unwrap(), b"value");
        assert!(temp.path().join("key.json").exists());
    }

    #[test]
    fn point_set_builder() {
        let set = point_set(&[("A", "x"), ("B", "y")]);
        assert_eq!(set.len(), 2);
        assert_eq!(set.get("B").unwrap().name, "y");
    }

    #[tokio::test]
    async fn seeded_server_serves_points() {
        let server = spawn_test_server_with(point_set(&[("A", "x")])).await;
        assert_eq!(server.repository().len().unwrap(), 1);
        assert_ne!(server.local_addr().port(), 0);
        server.shutdown().await.unwrap();
    }
}

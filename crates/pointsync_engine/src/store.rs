//! Durable local point store.

use parking_lot::RwLock;
use pointsync_protocol::{decode_points, encode_points, PointSet};
use pointsync_storage::{StorageBackend, StorageError, StorageResult};
use std::sync::Arc;
use tracing::warn;

/// Storage key of the local point array.
pub const MAP_POINTS_KEY: &str = "map_points";

/// The client's local point set.
///
/// Holds the in-memory working set used between sync cycles, backed by one
/// JSON array under [`MAP_POINTS_KEY`]. Changes are saved first and only
/// then swapped into memory, so the working set never runs ahead of disk.
pub struct PointStore {
    backend: Arc<dyn StorageBackend>,
    points: RwLock<PointSet>,
}

impl PointStore {
    /// Opens the store and loads the last saved set.
    pub fn open(backend: Arc<dyn StorageBackend>) -> Self {
        let points = load_from(backend.as_ref());
        Self {
            backend,
            points: RwLock::new(points),
        }
    }

    /// Returns the last durably saved set.
    ///
    /// An unreadable or corrupt entry is logged and treated as empty.
    pub fn load(&self) -> PointSet {
        load_from(self.backend.as_ref())
    }

    /// Durably persists `points`, replacing the prior saved set.
    pub fn save(&self, points: &PointSet) -> StorageResult<()> {
        let bytes = encode_points(points).map_err(|e| StorageError::Corrupted(e.to_string()))?;
        self.backend.put(MAP_POINTS_KEY, &bytes)
    }

    /// Returns a snapshot of the in-memory set.
    pub fn current(&self) -> PointSet {
        self.points.read().clone()
    }

    /// Replaces the in-memory set.
    pub(crate) fn replace_all(&self, points: PointSet) {
        *self.points.write() = points;
    }
}

fn load_from(backend: &dyn StorageBackend) -> PointSet {
    let bytes = match backend.get(MAP_POINTS_KEY) {
        Ok(Some(bytes)) => bytes,
        Ok(None) => return PointSet::new(),
        Err(err) => {
            warn!(error = %err, "failed to read saved points, starting empty");
            return PointSet::new();
        }
    };

    decode_points(&bytes).unwrap_or_else(|err| {
        warn!(error = %err, "saved points are corrupt, starting empty");
        PointSet::new()
    })
}

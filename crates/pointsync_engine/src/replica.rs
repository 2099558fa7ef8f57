//! Local replica: the point store plus pending deletions and settings.

use crate::error::{SyncError, SyncResult};
use crate::merge::merge;
use crate::store::PointStore;
use crate::tombstone::TombstoneSet;
use parking_lot::Mutex;
use pointsync_protocol::{decode_ids, encode_ids, Point, PointId, PointSet};
use pointsync_storage::{StorageBackend, StorageError, StorageResult};
use std::sync::Arc;
use tracing::{debug, warn};

/// Storage key of the pending deletion ids.
pub const PENDING_DELETES_KEY: &str = "pending_deletes";

/// Storage key of the configured server URL.
pub const SERVER_URL_KEY: &str = "server_url";

/// Result of applying a remote snapshot to the replica.
#[derive(Debug, Clone)]
pub(crate) struct RemoteApplied {
    /// Whether the merge added points.
    pub changed: bool,
    /// Number of points added by the merge.
    pub added: usize,
    /// Tombstones cleared because the remote no longer holds them.
    pub cleared: Vec<PointId>,
    /// Tombstoned ids the remote still holds.
    pub still_remote: Vec<PointId>,
    /// Local set after the merge.
    pub points: PointSet,
}

/// One client's point set, its pending deletions and its saved settings.
///
/// Every compound update of store and tombstones runs under a single mutex,
/// so a point is never both present in the store and tombstoned. Updates are
/// persisted before they reach memory; a failed write leaves the in-memory
/// state untouched. Deleting a point persists the tombstone before the
/// shrunken point set; on open, any stored point that is also tombstoned is
/// dropped.
pub struct LocalReplica {
    backend: Arc<dyn StorageBackend>,
    store: PointStore,
    tombstones: Mutex<TombstoneSet>,
}

impl LocalReplica {
    /// Opens the replica from `backend`.
    pub fn open(backend: Arc<dyn StorageBackend>) -> Self {
        let store = PointStore::open(Arc::clone(&backend));
        let tombstones = load_tombstones(backend.as_ref());

        let mut points = store.current();
        let before = points.len();
        for id in tombstones.iter() {
            points.remove(id.as_str());
        }
        if points.len() != before {
            debug!(dropped = before - points.len(), "dropped tombstoned points on open");
            store.replace_all(points);
        }

        Self {
            backend,
            store,
            tombstones: Mutex::new(tombstones),
        }
    }

    pub(crate) fn store(&self) -> &PointStore {
        &self.store
    }

    /// Returns a snapshot of the local points.
    pub fn points(&self) -> PointSet {
        self.store.current()
    }

    /// Returns a snapshot of the pending deletions.
    pub fn tombstones(&self) -> TombstoneSet {
        self.tombstones.lock().clone()
    }

    /// Adds or replaces a point and persists the set.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Tombstoned`] if the id is pending deletion, or
    /// [`SyncError::Storage`] if the save fails; the set is then unchanged.
    pub fn add_point(&self, point: Point) -> SyncResult<()> {
        let tombstones = self.tombstones.lock();
        if tombstones.contains(point.id.as_str()) {
            return Err(SyncError::Tombstoned(point.id));
        }
        debug!(id = %point.id, "adding point");
        let mut points = self.store.current();
        points.insert(point);
        self.store.save(&points)?;
        self.store.replace_all(points);
        Ok(())
    }

    /// Deletes a point locally and records a tombstone for it.
    ///
    /// Returns false if no point with this id exists locally. Once the
    /// tombstone is durable the delete is committed: a failure to rewrite the
    /// point set is only logged, since the next open drops the point anyway.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Storage`] if the tombstone cannot be persisted;
    /// the point is then still present.
    pub fn delete_point(&self, id: &str) -> SyncResult<bool> {
        let mut tombstones = self.tombstones.lock();
        let mut points = self.store.current();
        let Some(removed) = points.remove(id) else {
            return Ok(false);
        };
        debug!(id = %removed.id, "deleting point");

        let mut pending = tombstones.clone();
        pending.mark_deleted(removed.id);
        self.save_tombstones(&pending)?;
        *tombstones = pending;

        if let Err(err) = self.store.save(&points) {
            warn!(error = %err, "failed to rewrite points after delete");
        }
        self.store.replace_all(points);
        Ok(true)
    }

    /// Returns the saved server URL, if any.
    pub fn server_url(&self) -> Option<String> {
        match self.backend.get(SERVER_URL_KEY) {
            Ok(Some(bytes)) => serde_json::from_slice(&bytes)
                .map_err(|err| warn!(error = %err, "saved server url is corrupt"))
                .ok(),
            Ok(None) => None,
            Err(err) => {
                warn!(error = %err, "failed to read saved server url");
                None
            }
        }
    }

    /// Persists the server URL.
    pub fn set_server_url(&self, url: &str) -> StorageResult<()> {
        let bytes = serde_json::to_vec(url).map_err(|e| StorageError::Corrupted(e.to_string()))?;
        self.backend.put(SERVER_URL_KEY, &bytes)
    }

    /// Reconciles tombstones against `remote`, merges it in and persists.
    pub(crate) fn apply_remote(&self, remote: &PointSet) -> SyncResult<RemoteApplied> {
        let mut tombstones = self.tombstones.lock();

        let mut pending = tombstones.clone();
        let cleared = pending.reconcile(remote.ids());
        if !cleared.is_empty() {
            debug!(cleared = cleared.len(), "tombstones reconciled");
            self.save_tombstones(&pending)?;
            *tombstones = pending;
        }

        let local = self.store.current();
        let (merged, changed) = merge(&local, remote, &tombstones);
        let added = merged.len() - local.len();
        if changed {
            self.store.save(&merged)?;
            self.store.replace_all(merged.clone());
        }

        Ok(RemoteApplied {
            changed,
            added,
            cleared,
            still_remote: tombstones.iter().cloned().collect(),
            points: merged,
        })
    }

    fn save_tombstones(&self, tombstones: &TombstoneSet) -> StorageResult<()> {
        if tombstones.is_empty() {
            return self.backend.remove(PENDING_DELETES_KEY);
        }
        let bytes =
            encode_ids(tombstones.iter()).map_err(|e| StorageError::Corrupted(e.to_string()))?;
        self.backend.put(PENDING_DELETES_KEY, &bytes)
    }
}

fn load_tombstones(backend: &dyn StorageBackend) -> TombstoneSet {
    match backend.get(PENDING_DELETES_KEY) {
        Ok(Some(bytes)) => match decode_ids(&bytes) {
            Ok(ids) => ids.into_iter().collect(),
            Err(err) => {
                warn!(error = %err, "pending deletes are corrupt, starting empty");
                TombstoneSet::new()
            }
        },
        Ok(None) => TombstoneSet::new(),
        Err(err) => {
            warn!(error = %err, "failed to read pending deletes, starting empty");
            TombstoneSet::new()
        }
    }
}

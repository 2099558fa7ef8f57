//! Pending local deletions.

use pointsync_protocol::PointId;
use std::collections::BTreeSet;

/// Ids deleted locally whose removal has not yet been observed remotely.
///
/// A tombstoned id is never re-inserted by a merge. The tombstone is cleared
/// once a remote snapshot no longer contains the id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TombstoneSet {
    ids: BTreeSet<PointId>,
}

impl TombstoneSet {
    /// Creates an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `id`.
    ///
    /// Only reachable through [`crate::LocalReplica::delete_point`], which
    /// removes the point from the store first.
    pub(crate) fn mark_deleted(&mut self, id: PointId) -> bool {
        self.ids.insert(id)
    }

    /// Returns true if `id` is pending deletion.
    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    /// Drops every tombstone whose id is absent from `remote_ids` and
    /// returns the dropped ids.
    pub fn reconcile<'a, I>(&mut self, remote_ids: I) -> Vec<PointId>
    where
        I: IntoIterator<Item = &'a PointId>,
    {
        let remote: BTreeSet<&PointId> = remote_ids.into_iter().collect();
        let (kept, cleared): (BTreeSet<_>, BTreeSet<_>) = std::mem::take(&mut self.ids)
            .into_iter()
            .partition(|id| remote.contains(id));
        self.ids = kept;
        cleared.into_iter().collect()
    }

    /// Returns the number of pending deletions.
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Returns true if nothing is pending deletion.
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Iterates over the pending ids in order.
    pub fn iter(&self) -> impl Iterator<Item = &PointId> {
        self.ids.iter()
    }
}

impl FromIterator<PointId> for TombstoneSet {
    fn from_iter<I: IntoIterator<Item = PointId>>(iter: I) -> Self {
        Self {
            ids: iter.into_iter().collect(),
        }
    }
}

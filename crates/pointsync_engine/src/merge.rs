//! Pull-side merge of a remote snapshot into the local set.

use crate::tombstone::TombstoneSet;
use pointsync_protocol::PointSet;

/// Merges `remote` into `local` and reports whether anything was added.
///
/// - Remote points whose id is unknown locally and not tombstoned are added.
/// - Local-only points are kept; absence remotely is not a deletion.
/// - Points present on both sides keep the local record.
pub fn merge(local: &PointSet, remote: &PointSet, tombstones: &TombstoneSet) -> (PointSet, bool) {
    let mut merged = local.clone();
    let mut changed = false;

    for point in remote.iter() {
        let id = point.id.as_str();
        if merged.contains(id) || tombstones.contains(id) {
            continue;
        }
        merged.insert(point.clone());
        changed = true;
    }

    (merged, changed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pointsync_protocol::{Point, PointId};
    use proptest::prelude::*;

    fn point(id: &str, name: &str, lat: f64) -> Point {
        Point::with_id(id, name, lat, 0.0).unwrap()
    }

    fn set(points: Vec<Point>) -> PointSet {
        points.into()
    }

    #[test]
    fn empty_remote_changes_nothing() {
        let local = set(vec![point("A", "a", 1.0)]);
        let (merged, changed) = merge(&local, &PointSet::new(), &TombstoneSet::new());
        assert!(!changed);
        assert_eq!(merged, local);
    }

    #[test]
    fn unknown_remote_point_is_added() {
        let remote = set(vec![point("A", "Cafe", 10.0)]);
        let (merged, changed) = merge(&PointSet::new(), &remote, &TombstoneSet::new());
        assert!(changed);
        assert_eq!(merged, remote);
    }

    #[test]
    fn tombstoned_remote_point_is_skipped() {
        let remote = set(vec![point("A", "Cafe", 10.0)]);
        let tombstones: TombstoneSet = [PointId::from("A")].into_iter().collect();

        let (merged, changed) = merge(&PointSet::new(), &remote, &tombstones);
        assert!(!changed);
        assert!(merged.is_empty());
    }

    #[test]
    fn local_record_wins_on_shared_id() {
        let local = set(vec![point("A", "local", 1.0)]);
        let remote = set(vec![point("A", "remote", 2.0), point("B", "b", 3.0)]);

        let (merged, changed) = merge(&local, &remote, &TombstoneSet::new());

        assert!(changed);
        assert_eq!(merged.get("A").unwrap().name, "local");
        assert_eq!(merged.get("B").unwrap().name, "b");
    }

    #[test]
    fn local_only_points_survive() {
        let local = set(vec![point("mine", "x", 1.0)]);
        let remote = set(vec![point("theirs", "y", 2.0)]);

        let (merged, _) = merge(&local, &remote, &TombstoneSet::new());
        assert!(merged.contains("mine"));
        assert!(merged.contains("theirs"));
    }

    fn points_strategy() -> impl Strategy<Value = PointSet> {
        prop::collection::vec(("[a-e]", "[a-z]{0,4}", -90.0..=90.0f64), 0..8).prop_map(|rows| {
            rows.into_iter()
                .map(|(id, name, lat)| point(&id, &name, lat))
                .collect()
        })
    }

    fn tombstones_strategy() -> impl Strategy<Value = TombstoneSet> {
        prop::collection::vec("[a-e]", 0..4)
            .prop_map(|ids| ids.into_iter().map(PointId::from).collect())
    }

    proptest! {
        #[test]
        fn merge_never_resurrects_tombstones(
            local in points_strategy(),
            remote in points_strategy(),
            tombstones in tombstones_strategy(),
        ) {
            let local: PointSet = local
                .into_iter()
                .filter(|p| !tombstones.contains(p.id.as_str()))
                .collect();
            let (merged, _) = merge(&local, &remote, &tombstones);
            for id in tombstones.iter() {
                prop_assert!(!merged.contains(id.as_str()));
            }
        }

        #[test]
        fn merge_is_monotonic(
            local in points_strategy(),
            remote in points_strategy(),
            tombstones in tombstones_strategy(),
        ) {
            let (merged, changed) = merge(&local, &remote, &tombstones);
            for p in local.iter() {
                prop_assert_eq!(merged.get(p.id.as_str()), Some(p));
            }
            prop_assert_eq!(changed, merged.len() > local.len());
        }

        #[test]
        fn merge_is_idempotent(local in points_strategy(), remote in points_strategy()) {
            let tombstones = TombstoneSet::new();
            let (once, _) = merge(&local, &remote, &tombstones);
            let (twice, changed) = merge(&once, &remote, &tombstones);
            prop_assert!(!changed);
            prop_assert_eq!(once, twice);
        }
    }
}

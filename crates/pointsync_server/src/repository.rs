//! Server-side point repository.

use crate::error::{ServerError, ServerResult};
use parking_lot::Mutex;
use pointsync_protocol::PointSet;
use pointsync_storage::StorageBackend;
use tracing::debug;

/// Storage key of the server's point array.
pub const POINTS_KEY: &str = "points";

/// The server's durable point set.
///
/// The repository maintains:
/// - One JSON array of points under [`POINTS_KEY`]
/// - A mutex that serialises every read-modify-write, so concurrent pushes
///   from different clients never interleave their unions
///
/// State is re-read from the backend on every request; nothing is cached, so
/// a storage failure surfaces on the request that hit it.
pub struct ServerRepository {
    backend: Box<dyn StorageBackend>,
    lock: Mutex<()>,
}

impl ServerRepository {
    /// Opens a repository, initialising the stored set to `[]` if absent.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read or written.
    pub fn open(backend: Box<dyn StorageBackend>) -> ServerResult<Self> {
        if backend.get(POINTS_KEY)?.is_none() {
            debug!("initialising empty point store");
            backend.put(POINTS_KEY, b"[]")?;
        }
        Ok(Self {
            backend,
            lock: Mutex::new(()),
        })
    }

    /// Returns the entire stored set.
    pub fn fetch_all(&self) -> ServerResult<PointSet> {
        let _guard = self.lock.lock();
        self.load()
    }

    /// Unions `incoming` into the stored set, incoming records winning on
    /// id collision, persists the result and returns the new point count.
    pub fn replace_all(&self, incoming: PointSet) -> ServerResult<usize> {
        let _guard = self.lock.lock();

        let mut points = self.load()?;
        let before = points.len();
        let pushed = incoming.len();
        points.union_incoming(incoming);
        self.save(&points)?;

        debug!(pushed, before, after = points.len(), "applied push");
        Ok(points.len())
    }

    /// Removes one id from the stored set and returns the new point count.
    ///
    /// Removing an id the server does not hold is a no-op.
    pub fn remove(&self, id: &str) -> ServerResult<usize> {
        let _guard = self.lock.lock();

        let mut points = self.load()?;
        if points.remove(id).is_some() {
            self.save(&points)?;
            debug!(%id, remaining = points.len(), "removed point");
        }
        Ok(points.len())
    }

    /// Returns the number of stored points.
    pub fn len(&self) -> ServerResult<usize> {
        Ok(self.fetch_all()?.len())
    }

    /// Returns true if no points are stored.
    pub fn is_empty(&self) -> ServerResult<bool> {
        Ok(self.len()? == 0)
    }

    fn load(&self) -> ServerResult<PointSet> {
        match self.backend.get(POINTS_KEY)? {
            Some(bytes) => {
                serde_json::from_slice(&bytes).map_err(|e| ServerError::Corrupted(e.to_string()))
            }
            None => Ok(PointSet::new()),
        }
    }

    fn save(&self, points: &PointSet) -> ServerResult<()> {
        let bytes =
            serde_json::to_vec_pretty(points).map_err(|e| ServerError::Corrupted(e.to_string()))?;
        self.backend.put(POINTS_KEY, &bytes)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pointsync_protocol::Point;
    use pointsync_storage::InMemoryBackend;
    use proptest::prelude::*;
    use std::sync::Arc;

    fn point(id: &str, name: &str) -> Point {
        Point::with_id(id, name, 1.0, 2.0).unwrap()
    }

    fn set(points: Vec<Point>) -> PointSet {
        points.into()
    }

    fn empty_repository() -> ServerRepository {
        ServerRepository::open(Box::new(InMemoryBackend::new())).unwrap()
    }

    #[test]
    fn open_initialises_empty_array() {
        let backend = Arc::new(InMemoryBackend::new());
        let repository = ServerRepository::open(Box::new(Arc::clone(&backend))).unwrap();

        assert_eq!(backend.get(POINTS_KEY).unwrap().unwrap(), b"[]");
        assert!(repository.is_empty().unwrap());
    }

    #[test]
    fn open_keeps_existing_points() {
        let backend =
            InMemoryBackend::with_entry(POINTS_KEY, br#"[{"id":"A","name":"X","lat":1,"lng":2}]"#);
        let repository = ServerRepository::open(Box::new(backend)).unwrap();
        assert_eq!(repository.len().unwrap(), 1);
    }

    #[test]
    fn push_incoming_wins_and_adds() {
        let repository = empty_repository();
        repository.replace_all(set(vec![point("A", "v1")])).unwrap();

        let count = repository
            .replace_all(set(vec![point("A", "v2"), point("B", "v3")]))
            .unwrap();

        assert_eq!(count, 2);
        assert_eq!(
            repository.fetch_all().unwrap(),
            set(vec![point("A", "v2"), point("B", "v3")])
        );
    }

    #[test]
    fn push_never_drops_unknown_ids() {
        let repository = empty_repository();
        repository
            .replace_all(set(vec![point("other-client", "x")]))
            .unwrap();
        repository.replace_all(set(vec![point("mine", "y")])).unwrap();

        let stored = repository.fetch_all().unwrap();
        assert!(stored.contains("other-client"));
        assert!(stored.contains("mine"));
    }

    #[test]
    fn remove_point() {
        let repository = empty_repository();
        repository
            .replace_all(set(vec![point("A", "a"), point("B", "b")]))
            .unwrap();

        assert_eq!(repository.remove("A").unwrap(), 1);
        assert_eq!(repository.remove("missing").unwrap(), 1);
        assert!(!repository.fetch_all().unwrap().contains("A"));
    }

    #[test]
    fn corrupted_store_is_server_error() {
        let backend = InMemoryBackend::with_entry(POINTS_KEY, b"{not json");
        let repository = ServerRepository::open(Box::new(backend)).unwrap();
        let err = repository.fetch_all().unwrap_err();
        assert!(matches!(err, ServerError::Corrupted(_)));
        assert!(err.is_server_error());
    }

    #[test]
    fn storage_read_failure_surfaces() {
        let backend = Arc::new(InMemoryBackend::new());
        let repository = ServerRepository::open(Box::new(Arc::clone(&backend))).unwrap();
        backend.set_fail_reads(true);
        assert!(matches!(
            repository.fetch_all(),
            Err(ServerError::Storage(_))
        ));
    }

    #[test]
    fn concurrent_pushes_lose_nothing() {
        let repository = Arc::new(empty_repository());
        let handles: Vec<_> = (0..8)
            .map(|client| {
                let repository = Arc::clone(&repository);
                std::thread::spawn(move || {
                    for i in 0..10 {
                        let id = format!("c{client}-p{i}");
                        repository.replace_all(set(vec![point(&id, "x")])).unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(repository.len().unwrap(), 80);
    }

    fn points_strategy(prefix: &'static str) -> impl Strategy<Value = PointSet> {
        prop::collection::vec(("[a-f0-9]{1,6}", "[A-Za-z ]{0,12}", -90.0..=90.0f64), 0..12)
            .prop_map(move |rows| {
                rows.into_iter()
                    .map(|(id, name, lat)| {
                        Point::with_id(format!("{prefix}{id}"), name, lat, lat / 2.0).unwrap()
                    })
                    .collect()
            })
    }

    proptest! {
        #[test]
        fn push_is_idempotent(base in points_strategy("s"), pushed in points_strategy("c")) {
            let once = empty_repository();
            once.replace_all(base.clone()).unwrap();
            once.replace_all(pushed.clone()).unwrap();

            let twice = empty_repository();
            twice.replace_all(base).unwrap();
            twice.replace_all(pushed.clone()).unwrap();
            twice.replace_all(pushed).unwrap();

            prop_assert_eq!(once.fetch_all().unwrap(), twice.fetch_all().unwrap());
        }

        #[test]
        fn disjoint_pushes_commute(a in points_strategy("a"), b in points_strategy("b")) {
            let ab = empty_repository();
            ab.replace_all(a.clone()).unwrap();
            ab.replace_all(b.clone()).unwrap();

            let ba = empty_repository();
            ba.replace_all(b).unwrap();
            ba.replace_all(a).unwrap();

            prop_assert_eq!(ab.fetch_all().unwrap(), ba.fetch_all().unwrap());
        }

        #[test]
        fn pushed_set_is_contained_afterwards(base in points_strategy("x"), pushed in points_strategy("x")) {
            let repository = empty_repository();
            repository.replace_all(base).unwrap();
            repository.replace_all(pushed.clone()).unwrap();

            let stored = repository.fetch_all().unwrap();
            for p in pushed.iter() {
                prop_assert_eq!(stored.get(p.id.as_str()), Some(p));
            }
        }
    }
}

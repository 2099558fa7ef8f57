//! Transport layer abstraction for sync operations.

use crate::error::{SyncError, SyncResult};
use async_trait::async_trait;
use parking_lot::Mutex;
use pointsync_protocol::{PointId, PointSet};
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

/// A point transport handles network communication with the point server.
///
/// This trait abstracts the network layer, allowing for different
/// implementations (HTTP, in-process, mock for testing).
#[async_trait]
pub trait PointTransport: Send + Sync {
    /// Fetches the server's entire point set.
    async fn fetch_all(&self) -> SyncResult<PointSet>;

    /// Sends the full local set; the server unions it into its own and
    /// returns the resulting count.
    async fn replace_all(&self, points: &PointSet) -> SyncResult<usize>;

    /// Removes one id on the server and returns the resulting count.
    async fn remove(&self, id: &PointId) -> SyncResult<usize>;

    /// Re-points the transport at a new server URL.
    fn set_endpoint(&self, _url: &str) {}
}

#[async_trait]
impl<T: PointTransport + ?Sized> PointTransport for Arc<T> {
    async fn fetch_all(&self) -> SyncResult<PointSet> {
        (**self).fetch_all().await
    }

    async fn replace_all(&self, points: &PointSet) -> SyncResult<usize> {
        (**self).replace_all(points).await
    }

    async fn remove(&self, id: &PointId) -> SyncResult<usize> {
        (**self).remove(id).await
    }

    fn set_endpoint(&self, url: &str) {
        (**self).set_endpoint(url)
    }
}

/// A call recorded by [`MockTransport`].
#[derive(Debug, Clone, PartialEq)]
pub enum TransportCall {
    /// `fetch_all`.
    Fetch,
    /// `replace_all` with the pushed set.
    Push(PointSet),
    /// `remove` with the id.
    Remove(PointId),
}

#[derive(Debug, Default)]
struct MockState {
    remote: PointSet,
    fetch_failures: VecDeque<SyncError>,
    push_failures: VecDeque<SyncError>,
    remove_failures: VecDeque<SyncError>,
    calls: Vec<TransportCall>,
    endpoint: Option<String>,
    delay: Option<Duration>,
}

/// A mock transport for testing.
///
/// Holds a remote set that behaves like the server (union on push, removal on
/// delete). Failures can be queued per call kind; each queued failure is
/// consumed by the next call of that kind.
#[derive(Debug, Default)]
pub struct MockTransport {
    state: Mutex<MockState>,
}

impl MockTransport {
    /// Creates a mock with an empty remote set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a mock whose remote set starts as `remote`.
    pub fn with_remote(remote: PointSet) -> Self {
        let transport = Self::new();
        transport.state.lock().remote = remote;
        transport
    }

    /// Returns the current remote set.
    pub fn remote(&self) -> PointSet {
        self.state.lock().remote.clone()
    }

    /// Replaces the remote set.
    pub fn set_remote(&self, remote: PointSet) {
        self.state.lock().remote = remote;
    }

    /// Queues a failure for the next fetch.
    pub fn fail_next_fetch(&self, error: SyncError) {
        self.state.lock().fetch_failures.push_back(error);
    }

    /// Queues a failure for the next push.
    pub fn fail_next_push(&self, error: SyncError) {
        self.state.lock().push_failures.push_back(error);
    }

    /// Queues a failure for the next remove.
    pub fn fail_next_remove(&self, error: SyncError) {
        self.state.lock().remove_failures.push_back(error);
    }

    /// Delays every call by `delay` before answering.
    pub fn set_delay(&self, delay: Duration) {
        self.state.lock().delay = Some(delay);
    }

    /// Returns the calls made so far.
    pub fn calls(&self) -> Vec<TransportCall> {
        self.state.lock().calls.clone()
    }

    /// Returns the last endpoint set through [`PointTransport::set_endpoint`].
    pub fn endpoint(&self) -> Option<String> {
        self.state.lock().endpoint.clone()
    }

    async fn pause(&self) {
        let delay = self.state.lock().delay;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
    }
}

#[async_trait]
impl PointTransport for MockTransport {
    async fn fetch_all(&self) -> SyncResult<PointSet> {
        self.pause().await;
        let mut state = self.state.lock();
        state.calls.push(TransportCall::Fetch);
        if let Some(err) = state.fetch_failures.pop_front() {
            return Err(err);
        }
        Ok(state.remote.clone())
    }

    async fn replace_all(&self, points: &PointSet) -> SyncResult<usize> {
        self.pause().await;
        let mut state = self.state.lock();
        state.calls.push(TransportCall::Push(points.clone()));
        if let Some(err) = state.push_failures.pop_front() {
            return Err(err);
        }
        state.remote.union_incoming(points.clone());
        Ok(state.remote.len())
    }

    async fn remove(&self, id: &PointId) -> SyncResult<usize> {
        self.pause().await;
        let mut state = self.state.lock();
        state.calls.push(TransportCall::Remove(id.clone()));
        if let Some(err) = state.remove_failures.pop_front() {
            return Err(err);
        }
        state.remote.remove(id.as_str());
        Ok(state.remote.len())
    }

    fn set_endpoint(&self, url: &str) {
        self.state.lock().endpoint = Some(url.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pointsync_protocol::Point;

    fn point(id: &str, name: &str) -> Point {
        Point::with_id(id, name, 0.0, 0.0).unwrap()
    }

    #[tokio::test]
    async fn mock_behaves_like_union_server() {
        let transport = MockTransport::with_remote(vec![point("A", "v1")].into());

        let count = transport
            .replace_all(&vec![point("A", "v2"), point("B", "v3")].into())
            .await
            .unwrap();
        assert_eq!(count, 2);

        let remote = transport.fetch_all().await.unwrap();
        assert_eq!(remote.get("A").unwrap().name, "v2");

        assert_eq!(transport.remove(&PointId::from("A")).await.unwrap(), 1);
        assert_eq!(transport.calls().len(), 3);
    }

    #[tokio::test]
    async fn mock_queued_failures_are_consumed_once() {
        let transport = MockTransport::new();
        transport.fail_next_fetch(SyncError::transport("unreachable"));

        assert!(transport.fetch_all().await.is_err());
        assert!(transport.fetch_all().await.is_ok());
    }

    #[tokio::test]
    async fn shared_transport_delegates() {
        let transport = Arc::new(MockTransport::new());
        let shared: Arc<dyn PointTransport> = Arc::clone(&transport) as Arc<dyn PointTransport>;

        shared.replace_all(&vec![point("A", "x")].into()).await.unwrap();
        shared.set_endpoint("http://elsewhere");

        assert!(transport.remote().contains("A"));
        assert_eq!(transport.endpoint().as_deref(), Some("http://elsewhere"));
    }
}

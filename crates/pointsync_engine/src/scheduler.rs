//! Periodic background sync.

use crate::coordinator::{SyncCoordinator, SyncTrigger};
use crate::transport::PointTransport;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::debug;

/// Runs scheduled syncs on a fixed interval until shut down.
///
/// The first tick fires immediately. Ticks missed while a cycle is running
/// are skipped rather than bunched up.
pub struct SyncScheduler {
    shutdown: oneshot::Sender<()>,
    task: JoinHandle<()>,
}

impl SyncScheduler {
    /// Starts polling `coordinator` every `interval`.
    pub fn spawn<T>(coordinator: Arc<SyncCoordinator<T>>, interval: Duration) -> Self
    where
        T: PointTransport + 'static,
    {
        let (shutdown, mut shutdown_rx) = oneshot::channel::<()>();
        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    _ = &mut shutdown_rx => break,
                    _ = ticker.tick() => {
                        // Failures are reflected in the coordinator's status.
                        let _ = coordinator.sync(SyncTrigger::Scheduled).await;
                    }
                }
            }
            debug!("sync scheduler stopped");
        });

        debug!(?interval, "sync scheduler started");
        Self { shutdown, task }
    }

    /// Starts polling with the coordinator's configured interval.
    pub fn spawn_default<T>(coordinator: Arc<SyncCoordinator<T>>) -> Self
    where
        T: PointTransport + 'static,
    {
        let interval = coordinator.config().sync_interval;
        Self::spawn(coordinator, interval)
    }

    /// Stops polling and waits for an in-flight cycle to finish.
    pub async fn shutdown(self) {
        let _ = self.shutdown.send(());
        let _ = self.task.await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SyncConfig;
    use crate::coordinator::SyncStatus;
    use crate::replica::LocalReplica;
    use crate::transport::MockTransport;
    use pointsync_protocol::Point;
    use pointsync_storage::InMemoryBackend;

    fn coordinator(transport: MockTransport) -> Arc<SyncCoordinator<MockTransport>> {
        let replica = LocalReplica::open(Arc::new(InMemoryBackend::new()));
        Arc::new(SyncCoordinator::new(
            SyncConfig::new("http://test.invalid"),
            transport,
            replica,
        ))
    }

    #[tokio::test]
    async fn first_tick_syncs_immediately() {
        let remote = vec![Point::with_id("A", "X", 1.0, 2.0).unwrap()].into();
        let coordinator = coordinator(MockTransport::with_remote(remote));

        let scheduler = SyncScheduler::spawn(Arc::clone(&coordinator), Duration::from_secs(3600));
        tokio::time::sleep(Duration::from_millis(100)).await;
        scheduler.shutdown().await;

        assert!(coordinator.points().contains("A"));
        assert_eq!(coordinator.stats().cycles_completed, 1);
    }

    #[tokio::test]
    async fn keeps_polling_until_shutdown() {
        let coordinator = coordinator(MockTransport::new());

        let scheduler = SyncScheduler::spawn(Arc::clone(&coordinator), Duration::from_millis(20));
        tokio::time::sleep(Duration::from_millis(150)).await;
        scheduler.shutdown().await;

        let cycles = coordinator.stats().cycles_completed;
        assert!(cycles >= 2, "expected several cycles, got {cycles}");

        tokio::time::sleep(Duration::from_millis(60)).await;
        assert_eq!(coordinator.stats().cycles_completed, cycles);
    }

    #[tokio::test]
    async fn scheduled_failures_only_update_status() {
        let transport = MockTransport::new();
        transport.fail_next_fetch(crate::SyncError::transport("offline"));
        let coordinator = coordinator(transport);

        let scheduler = SyncScheduler::spawn(Arc::clone(&coordinator), Duration::from_secs(3600));
        tokio::time::sleep(Duration::from_millis(100)).await;
        scheduler.shutdown().await;

        assert_eq!(coordinator.status(), SyncStatus::Error);
        assert_eq!(coordinator.stats().cycles_failed, 1);
    }
}

//! Sync coordinator: one pull-merge-push cycle at a time.

use crate::config::SyncConfig;
use crate::error::{SyncError, SyncResult};
use crate::http::HttpTransport;
use crate::replica::LocalReplica;
use crate::transport::PointTransport;
use parking_lot::{Mutex, RwLock};
use pointsync_protocol::{Point, PointSet};
use pointsync_storage::StorageBackend;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// The current state of the coordinator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncState {
    /// No cycle is running.
    Idle,
    /// A cycle is in flight.
    Syncing,
}

/// The user-visible sync indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncStatus {
    /// A cycle is running, or none has run yet.
    Pending,
    /// The last cycle completed.
    Ok,
    /// The last cycle failed.
    Error,
}

/// What started a sync cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncTrigger {
    /// Requested by the user; failures are returned and logged at `warn`.
    Manual,
    /// Started by the poll timer; failures only update the status.
    Scheduled,
}

/// Statistics about sync operations.
#[derive(Debug, Clone, Default)]
pub struct SyncStats {
    /// Total number of sync cycles completed.
    pub cycles_completed: u64,
    /// Total number of sync cycles that failed.
    pub cycles_failed: u64,
    /// Total number of points added from the server.
    pub points_pulled: u64,
    /// Total number of points sent to the server.
    pub points_pushed: u64,
    /// Total number of deletions sent to the server.
    pub deletes_propagated: u64,
    /// Last successful sync time.
    pub last_sync_time: Option<Instant>,
    /// Last error message.
    pub last_error: Option<String>,
}

/// Result of a sync cycle.
#[derive(Debug, Clone)]
pub struct SyncCycleResult {
    /// Number of remote points added locally.
    pub pulled: usize,
    /// Number of points pushed.
    pub pushed: usize,
    /// Point count reported by the server after the push.
    pub remote_count: usize,
    /// Number of tombstones cleared by reconciliation.
    pub tombstones_cleared: usize,
    /// Number of deletions sent to the server.
    pub deletes_sent: usize,
    /// Duration of the sync cycle.
    pub duration: Duration,
}

/// Observer for coordinator events.
///
/// Both callbacks run synchronously on the task driving the sync and must
/// not block.
pub trait SyncListener: Send + Sync {
    /// Called whenever the status indicator changes.
    fn on_status(&self, _status: SyncStatus) {}

    /// Called after the local point set changed.
    fn on_points_changed(&self, _points: &PointSet) {}
}

/// A listener that ignores every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopListener;

impl SyncListener for NoopListener {}

/// Resets the state to `Idle` when the cycle ends, however it ends.
struct SyncingGuard<'a> {
    state: &'a Mutex<SyncState>,
}

impl<'a> SyncingGuard<'a> {
    fn acquire(state: &'a Mutex<SyncState>) -> Option<Self> {
        let mut current = state.lock();
        if *current == SyncState::Syncing {
            return None;
        }
        *current = SyncState::Syncing;
        Some(Self { state })
    }
}

impl Drop for SyncingGuard<'_> {
    fn drop(&mut self) {
        *self.state.lock() = SyncState::Idle;
    }
}

/// The sync coordinator owns a local replica and keeps it in sync with a
/// point server.
///
/// A cycle fetches the server set, reconciles tombstones, merges, persists,
/// pushes the local set and, if enabled, removes tombstoned ids the server
/// still holds. At most one cycle is in flight; a trigger arriving meanwhile
/// is dropped.
pub struct SyncCoordinator<T: PointTransport> {
    config: SyncConfig,
    server_url: RwLock<String>,
    transport: T,
    replica: LocalReplica,
    listener: Arc<dyn SyncListener>,
    state: Mutex<SyncState>,
    status: RwLock<SyncStatus>,
    stats: RwLock<SyncStats>,
}

impl SyncCoordinator<HttpTransport> {
    /// Opens the replica in `backend` and connects over HTTP.
    ///
    /// A server URL saved by an earlier [`SyncCoordinator::set_server_url`]
    /// takes precedence over `config.server_url`.
    pub fn connect(mut config: SyncConfig, backend: Arc<dyn StorageBackend>) -> SyncResult<Self> {
        let replica = LocalReplica::open(backend);
        if let Some(saved) = replica.server_url() {
            config.server_url = saved;
        }
        let transport = HttpTransport::from_config(&config)?;
        info!(endpoint = %transport.endpoint(), "sync client ready");
        Ok(Self::new(config, transport, replica))
    }
}

impl<T: PointTransport> SyncCoordinator<T> {
    /// Creates a new coordinator.
    pub fn new(config: SyncConfig, transport: T, replica: LocalReplica) -> Self {
        Self {
            server_url: RwLock::new(config.server_url.clone()),
            config,
            transport,
            replica,
            listener: Arc::new(NoopListener),
            state: Mutex::new(SyncState::Idle),
            status: RwLock::new(SyncStatus::Pending),
            stats: RwLock::new(SyncStats::default()),
        }
    }

    /// Sets the event listener.
    pub fn with_listener(mut self, listener: Arc<dyn SyncListener>) -> Self {
        self.listener = listener;
        self
    }

    /// Gets the configuration.
    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    /// Gets the transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Gets the local replica.
    pub fn replica(&self) -> &LocalReplica {
        &self.replica
    }

    /// Gets the current state.
    pub fn state(&self) -> SyncState {
        *self.state.lock()
    }

    /// Gets the current status indicator.
    pub fn status(&self) -> SyncStatus {
        *self.status.read()
    }

    /// Gets the current stats.
    pub fn stats(&self) -> SyncStats {
        self.stats.read().clone()
    }

    /// Gets the current server URL.
    pub fn server_url(&self) -> String {
        self.server_url.read().clone()
    }

    /// Returns a snapshot of the local points.
    pub fn points(&self) -> PointSet {
        self.replica.points()
    }

    /// Adds or replaces a point locally.
    pub fn add_point(&self, point: Point) -> SyncResult<()> {
        self.replica.add_point(point)?;
        self.listener.on_points_changed(&self.replica.points());
        Ok(())
    }

    /// Creates a point with a fresh id and adds it locally.
    pub fn create_point(&self, name: impl Into<String>, lat: f64, lng: f64) -> SyncResult<Point> {
        let point = Point::new(name, lat, lng)?;
        self.add_point(point.clone())?;
        Ok(point)
    }

    /// Deletes a point locally; returns false if it did not exist.
    pub fn delete_point(&self, id: &str) -> SyncResult<bool> {
        let deleted = self.replica.delete_point(id)?;
        if deleted {
            self.listener.on_points_changed(&self.replica.points());
        }
        Ok(deleted)
    }

    /// Persists a new server URL, re-points the transport and runs a manual
    /// sync against it.
    pub async fn set_server_url(&self, url: &str) -> SyncResult<SyncCycleResult> {
        self.replica.set_server_url(url)?;
        *self.server_url.write() = url.to_string();
        self.transport.set_endpoint(url);
        info!(%url, "server url changed");
        self.sync(SyncTrigger::Manual).await
    }

    /// Runs one sync cycle.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::AlreadySyncing`] without touching the status if a
    /// cycle is in flight; otherwise returns the cycle's failure after
    /// reporting [`SyncStatus::Error`]. The local merge is kept when a later
    /// step fails.
    pub async fn sync(&self, trigger: SyncTrigger) -> SyncResult<SyncCycleResult> {
        let Some(_guard) = SyncingGuard::acquire(&self.state) else {
            debug!(?trigger, "sync already in progress, dropping trigger");
            return Err(SyncError::AlreadySyncing);
        };

        let start = Instant::now();
        self.set_status(SyncStatus::Pending);

        match self.run_cycle().await {
            Ok(mut result) => {
                result.duration = start.elapsed();
                {
                    let mut stats = self.stats.write();
                    stats.cycles_completed += 1;
                    stats.points_pulled += result.pulled as u64;
                    stats.points_pushed += result.pushed as u64;
                    stats.deletes_propagated += result.deletes_sent as u64;
                    stats.last_sync_time = Some(Instant::now());
                    stats.last_error = None;
                }
                debug!(
                    ?trigger,
                    pulled = result.pulled,
                    pushed = result.pushed,
                    remote = result.remote_count,
                    "sync complete"
                );
                self.set_status(SyncStatus::Ok);
                Ok(result)
            }
            Err(err) => {
                {
                    let mut stats = self.stats.write();
                    stats.cycles_failed += 1;
                    stats.last_error = Some(err.to_string());
                }
                match trigger {
                    SyncTrigger::Manual => warn!(error = %err, "sync failed"),
                    SyncTrigger::Scheduled => debug!(error = %err, "scheduled sync failed"),
                }
                self.set_status(SyncStatus::Error);
                Err(err)
            }
        }
    }

    async fn run_cycle(&self) -> SyncResult<SyncCycleResult> {
        let remote = self.timed(self.transport.fetch_all()).await?;

        let applied = self.replica.apply_remote(&remote)?;
        if applied.changed {
            self.listener.on_points_changed(&applied.points);
        }

        let local = self.replica.points();
        let remote_count = self.timed(self.transport.replace_all(&local)).await?;

        let mut deletes_sent = 0;
        if self.config.propagate_deletes {
            for id in &applied.still_remote {
                self.timed(self.transport.remove(id)).await?;
                deletes_sent += 1;
            }
        }

        Ok(SyncCycleResult {
            pulled: applied.added,
            pushed: local.len(),
            remote_count,
            tombstones_cleared: applied.cleared.len(),
            deletes_sent,
            duration: Duration::ZERO,
        })
    }

    async fn timed<R, F>(&self, call: F) -> SyncResult<R>
    where
        F: Future<Output = SyncResult<R>>,
    {
        let limit = self.config.timeout;
        tokio::time::timeout(limit, call)
            .await
            .map_err(|_| SyncError::transport(format!("request timed out after {limit:?}")))?
    }

    fn set_status(&self, status: SyncStatus) {
        *self.status.write() = status;
        self.listener.on_status(status);
    }
}

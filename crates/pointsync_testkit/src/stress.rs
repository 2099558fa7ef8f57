//! Stress tests for the server repository.
//!
//! These helpers verify that concurrent pushes from many clients never lose
//! points.

use pointsync_protocol::{Point, PointSet};
use pointsync_server::ServerRepository;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

/// Result of a stress test run.
#[derive(Debug, Clone)]
pub struct StressTestResult {
    /// Total operations performed.
    pub total_ops: usize,
    /// Successful operations.
    pub successful_ops: usize,
    /// Failed operations.
    pub failed_ops: usize,
    /// Total duration.
    pub duration: Duration,
    /// Operations per second.
    pub ops_per_second: f64,
}

impl StressTestResult {
    /// Creates a new result.
    pub fn new(successful: usize, failed: usize, duration: Duration) -> Self {
        let total = successful + failed;
        let ops_per_second = if duration.as_secs_f64() > 0.0 {
            total as f64 / duration.as_secs_f64()
        } else {
            0.0
        };

        Self {
            total_ops: total,
            successful_ops: successful,
            failed_ops: failed,
            duration,
            ops_per_second,
        }
    }
}

/// Configuration for stress tests.
#[derive(Debug, Clone)]
pub struct StressConfig {
    /// Number of concurrent clients.
    pub clients: usize,
    /// Pushes performed by each client.
    pub pushes_per_client: usize,
}

impl Default for StressConfig {
    fn default() -> Self {
        Self {
            clients: 8,
            pushes_per_client: 50,
        }
    }
}

/// Has every client push its growing local set, one new point per push.
///
/// Each client owns a disjoint id range, so afterwards the repository must
/// hold exactly `clients * pushes_per_client` points.
pub fn stress_concurrent_pushes(
    repository: &Arc<ServerRepository>,
    config: &StressConfig,
) -> StressTestResult {
    let start = Instant::now();

    let handles: Vec<_> = (0..config.clients)
        .map(|client| {
            let repository = Arc::clone(repository);
            let pushes = config.pushes_per_client;
            thread::spawn(move || {
                let mut local = PointSet::new();
                let mut ok = 0usize;
                let mut failed = 0usize;
                for i in 0..pushes {
                    let id = format!("client{client}-{i}");
                    if let Ok(point) = Point::with_id(id, "stress", 0.0, 0.0) {
                        local.insert(point);
                    }
                    match repository.replace_all(local.clone()) {
                        Ok(_) => ok += 1,
                        Err(_) => failed += 1,
                    }
                }
                (ok, failed)
            })
        })
        .collect();

    let (successful, failed) = handles
        .into_iter()
        .map(|handle| handle.join().unwrap_or((0, 0)))
        .fold((0, 0), |(ok, err), (o, e)| (ok + o, err + e));

    StressTestResult::new(successful, failed, start.elapsed())
}

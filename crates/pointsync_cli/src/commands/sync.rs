//! Sync command implementations.

use super::open_client;
use pointsync_engine::{
    SyncCycleResult, SyncListener, SyncScheduler, SyncStatus, SyncTrigger,
};
use pointsync_protocol::PointSet;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Runs one manual sync cycle.
pub async fn once(state_dir: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let client = open_client(state_dir)?;
    let result = client.sync(SyncTrigger::Manual).await?;
    print_result(&client.server_url(), &result);
    Ok(())
}

/// Changes the server URL and syncs against it.
pub async fn set_url(state_dir: &Path, url: &str) -> Result<(), Box<dyn std::error::Error>> {
    let client = open_client(state_dir)?;
    let result = client.set_server_url(url).await;
    println!("Server URL set to {url}");
    print_result(url, &result?);
    Ok(())
}

/// Logs status changes and point count changes while watching.
struct LogListener;

impl SyncListener for LogListener {
    fn on_status(&self, status: SyncStatus) {
        if status != SyncStatus::Pending {
            info!(?status, "sync status");
        }
    }

    fn on_points_changed(&self, points: &PointSet) {
        info!(count = points.len(), "local points changed");
    }
}

/// Polls the server until Ctrl-C.
pub async fn watch(state_dir: &Path, interval: u64) -> Result<(), Box<dyn std::error::Error>> {
    let client = Arc::new(open_client(state_dir)?.with_listener(Arc::new(LogListener)));
    println!(
        "Watching {} every {interval}s, Ctrl-C to stop",
        client.server_url()
    );

    let scheduler = SyncScheduler::spawn(Arc::clone(&client), Duration::from_secs(interval.max(1)));
    tokio::signal::ctrl_c().await?;
    scheduler.shutdown().await;

    let stats = client.stats();
    println!(
        "Stopped after {} successful and {} failed cycles",
        stats.cycles_completed, stats.cycles_failed
    );
    Ok(())
}

fn print_result(url: &str, result: &SyncCycleResult) {
    println!(
        "Synced with {url}: {} pulled, {} pushed, {} on server, {} deletions sent ({:?})",
        result.pulled, result.pushed, result.remote_count, result.deletes_sent, result.duration
    );
}

//! CLI command implementations.

pub mod points;
pub mod serve;
pub mod status;
pub mod sync;

use pointsync_engine::{HttpTransport, SyncConfig, SyncCoordinator};
use pointsync_storage::FileBackend;
use std::path::Path;
use std::sync::Arc;

/// Opens the client replica in `state_dir` and connects to the saved server
/// URL, or the default one if none was saved.
pub fn open_client(
    state_dir: &Path,
) -> Result<SyncCoordinator<HttpTransport>, Box<dyn std::error::Error>> {
    let backend = FileBackend::open(state_dir)?;
    let coordinator = SyncCoordinator::connect(SyncConfig::default(), Arc::new(backend))?;
    Ok(coordinator)
}

//! Configuration for the sync engine.

use std::time::Duration;

/// Default poll interval between scheduled syncs.
pub const DEFAULT_SYNC_INTERVAL: Duration = Duration::from_secs(10);

/// Default timeout applied to each network call.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Configuration for sync operations.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Server URL, either the base URL or the full points endpoint.
    pub server_url: String,
    /// Interval between scheduled syncs.
    pub sync_interval: Duration,
    /// Timeout for each fetch, push or delete call.
    pub timeout: Duration,
    /// Whether tombstoned ids still held by the server are removed there.
    pub propagate_deletes: bool,
}

impl SyncConfig {
    /// Creates a new sync configuration.
    pub fn new(server_url: impl Into<String>) -> Self {
        Self {
            server_url: server_url.into(),
            sync_interval: DEFAULT_SYNC_INTERVAL,
            timeout: DEFAULT_TIMEOUT,
            propagate_deletes: true,
        }
    }

    /// Sets the interval between scheduled syncs.
    pub fn with_sync_interval(mut self, interval: Duration) -> Self {
        self.sync_interval = interval;
        self
    }

    /// Sets the per-request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Enables or disables delete propagation.
    pub fn with_propagate_deletes(mut self, enabled: bool) -> Self {
        self.propagate_deletes = enabled;
        self
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self::new("http://localhost:3000")
    }
}

//! Status command implementation.

use super::open_client;
use serde::Serialize;
use std::path::Path;

/// Local replica state.
#[derive(Debug, Serialize)]
pub struct StatusReport {
    /// State directory.
    pub state_dir: String,
    /// Configured server URL.
    pub server_url: String,
    /// Number of local points.
    pub points: usize,
    /// Ids deleted locally and not yet gone from the server.
    pub pending_deletes: Vec<String>,
}

/// Runs the status command.
pub fn run(state_dir: &Path, format: &str) -> Result<(), Box<dyn std::error::Error>> {
    let client = open_client(state_dir)?;
    let report = StatusReport {
        state_dir: state_dir.display().to_string(),
        server_url: client.server_url(),
        points: client.points().len(),
        pending_deletes: client
            .replica()
            .tombstones()
            .iter()
            .map(|id| id.to_string())
            .collect(),
    };

    match format {
        "json" => println!("{}", serde_json::to_string_pretty(&report)?),
        _ => {
            println!("State:           {}", report.state_dir);
            println!("Server:          {}", report.server_url);
            println!("Points:          {}", report.points);
            println!("Pending deletes: {}", report.pending_deletes.len());
            for id in &report.pending_deletes {
                println!("  {id}");
            }
        }
    }
    Ok(())
}

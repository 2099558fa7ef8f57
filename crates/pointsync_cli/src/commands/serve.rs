//! Serve command implementation.

use pointsync_server::{PointServer, ServerConfig};
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use tracing::info;

/// Runs the point server until Ctrl-C.
pub async fn run(
    bind: IpAddr,
    port: u16,
    data_dir: PathBuf,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = ServerConfig::new(SocketAddr::new(bind, port)).with_data_dir(data_dir);
    info!(data_dir = %config.data_dir.display(), "opening point store");

    let server = PointServer::open(config).await?;
    println!("Serving points at {}", server.url());

    tokio::signal::ctrl_c().await?;
    info!("shutting down");
    server.shutdown().await?;
    Ok(())
}

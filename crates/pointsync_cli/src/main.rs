//! pointsync CLI
//!
//! Runs the point server and a command-line sync client.
//!
//! # Commands
//!
//! - `serve` - Serve the shared point set over HTTP
//! - `add` / `delete` / `list` - Edit the local point set
//! - `sync` - Run one sync cycle
//! - `watch` - Poll the server until interrupted
//! - `set-url` - Change the server URL and sync against it
//! - `status` - Show local replica state

mod commands;

use clap::{Parser, Subcommand};
use std::net::IpAddr;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Offline-first point-of-interest sync.
#[derive(Parser)]
#[command(name = "pointsync")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Directory holding the local client state
    #[arg(global = true, short, long, default_value = ".pointsync")]
    state_dir: PathBuf,

    /// Enable verbose output
    #[arg(global = true, short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the shared point set over HTTP
    Serve {
        /// Port to listen on
        #[arg(short, long, env = "PORT", default_value_t = pointsync_server::DEFAULT_PORT)]
        port: u16,

        /// Address to bind
        #[arg(short, long, default_value = "127.0.0.1")]
        bind: IpAddr,

        /// Directory holding the server's point file
        #[arg(short, long, default_value = "pointsync-data")]
        data_dir: PathBuf,
    },

    /// Add a point to the local set
    Add {
        /// Display name
        name: String,

        /// Latitude in degrees
        #[arg(allow_negative_numbers = true)]
        lat: f64,

        /// Longitude in degrees
        #[arg(allow_negative_numbers = true)]
        lng: f64,

        /// Use this id instead of a generated one
        #[arg(long)]
        id: Option<String>,
    },

    /// Delete a point from the local set
    Delete {
        /// Point id
        id: String,
    },

    /// List the local points
    List {
        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Run one sync cycle against the server
    Sync,

    /// Sync periodically until interrupted
    Watch {
        /// Seconds between syncs
        #[arg(short, long, default_value_t = 10)]
        interval: u64,
    },

    /// Change the server URL and sync against it
    SetUrl {
        /// Server base URL or points endpoint
        url: String,
    },

    /// Show local replica state
    Status {
        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match cli.command {
        Commands::Serve {
            port,
            bind,
            data_dir,
        } => {
            commands::serve::run(bind, port, data_dir).await?;
        }
        Commands::Add { name, lat, lng, id } => {
            commands::points::add(&cli.state_dir, name, lat, lng, id)?;
        }
        Commands::Delete { id } => {
            commands::points::delete(&cli.state_dir, &id)?;
        }
        Commands::List { format } => {
            commands::points::list(&cli.state_dir, &format)?;
        }
        Commands::Sync => {
            commands::sync::once(&cli.state_dir).await?;
        }
        Commands::Watch { interval } => {
            commands::sync::watch(&cli.state_dir, interval).await?;
        }
        Commands::SetUrl { url } => {
            commands::sync::set_url(&cli.state_dir, &url).await?;
        }
        Commands::Status { format } => {
            commands::status::run(&cli.state_dir, &format)?;
        }
    }

    Ok(())
}

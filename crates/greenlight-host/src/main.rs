//! Greenlight host: entry point.
//!
//! Serves the console list and stream start requests of `greenlight` UIs
//! over WebSocket.
//!
//! # Usage
//!
//! ```text
//! greenlight-host [OPTIONS]
//!
//! Options:
//!   --bind <ADDR>        IP address to listen on [default: 127.0.0.1]
//!   --port <PORT>        WebSocket port [default: 24900]
//!   --inventory <PATH>   TOML file listing the consoles to serve
//! ```
//!
//! # Environment variable overrides
//!
//! | Variable               | Default     |
//! |------------------------|-------------|
//! | `GREENLIGHT_BIND`      | `127.0.0.1` |
//! | `GREENLIGHT_PORT`      | `24900`     |
//! | `GREENLIGHT_INVENTORY` | (none)      |

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use anyhow::Context;
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use greenlight_host::application::HostService;
use greenlight_host::domain::{HostConfig, DEFAULT_PORT};
use greenlight_host::infrastructure::{run_server, InventoryProvider};

/// Greenlight host process.
#[derive(Debug, Parser)]
#[command(
    name = "greenlight-host",
    about = "Serves Greenlight console lists and stream sessions over WebSocket",
    version
)]
struct Cli {
    /// IP address to bind the WebSocket server to.
    #[arg(long, default_value = "127.0.0.1", env = "GREENLIGHT_BIND")]
    bind: String,

    /// TCP port for the WebSocket server.
    #[arg(long, default_value_t = DEFAULT_PORT, env = "GREENLIGHT_PORT")]
    port: u16,

    /// TOML file listing the consoles to serve.
    #[arg(long, env = "GREENLIGHT_INVENTORY")]
    inventory: Option<PathBuf>,
}

impl Cli {
    /// # Errors
    ///
    /// Returns an error if `--bind` is not a valid IP address.
    fn into_host_config(self) -> anyhow::Result<HostConfig> {
        let bind_addr: SocketAddr = format!("{}:{}", self.bind, self.port)
            .parse()
            .with_context(|| format!("invalid bind address: '{}:{}'", self.bind, self.port))?;
        Ok(HostConfig {
            bind_addr,
            inventory_path: self.inventory,
        })
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Cli::parse().into_host_config()?;

    let provider = match &config.inventory_path {
        Some(path) => InventoryProvider::from_file(path)
            .with_context(|| format!("failed to load inventory {}", path.display()))?,
        None => {
            warn!("no --inventory given; serving an empty console list");
            InventoryProvider::default()
        }
    };
    let service = HostService::new(Arc::new(provider));

    let running = Arc::new(AtomicBool::new(true));
    let running_clone = Arc::clone(&running);
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("received Ctrl+C; shutting down");
                running_clone.store(false, Ordering::Relaxed);
            }
            Err(e) => tracing::error!("failed to listen for Ctrl+C signal: {e}"),
        }
    });

    run_server(config.bind_addr, service, running).await?;
    info!("greenlight host stopped");
    Ok(())
}

//! Greenlight console list: entry point.
//!
//! Connects to a `greenlight-host` over WebSocket, mounts one console list
//! scope, prints the list once it settles, and optionally starts a stream
//! session for one console.
//!
//! # Usage
//!
//! ```text
//! greenlight [OPTIONS]
//!
//! Options:
//!   --host-url <URL>     WebSocket URL of the host [default: ws://127.0.0.1:24900]
//!   --timeout <SECS>     Seconds to wait for each answer [default: 10]
//!   --legacy-routing     Accept any non-error payload as the console list
//!   --stream <ID>        Start a stream session for this console id
//! ```
//!
//! | Variable                 | Default                 |
//! |--------------------------|-------------------------|
//! | `GREENLIGHT_HOST_URL`    | `ws://127.0.0.1:24900`  |
//! | `GREENLIGHT_TIMEOUT`     | `10`                    |

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use greenlight_core::{ConsoleId, RoutingPolicy};
use greenlight_ui::application::{ConsoleBus, ConsoleListScope, ErrorPresenter, RouteError};
use greenlight_ui::domain::UiConfig;
use greenlight_ui::infrastructure::transport::WsTransport;
use greenlight_ui::infrastructure::ui_bridge::render_console_list;

/// Greenlight console list client.
#[derive(Debug, Parser)]
#[command(
    name = "greenlight",
    about = "List the consoles a Greenlight host knows about and start streams",
    version
)]
struct Cli {
    /// WebSocket URL of the host process.
    #[arg(long, default_value = "ws://127.0.0.1:24900", env = "GREENLIGHT_HOST_URL")]
    host_url: String,

    /// Seconds to wait for an answer before the request fails.
    #[arg(long, default_value_t = 10, env = "GREENLIGHT_TIMEOUT")]
    timeout: u64,

    /// Accept any non-error payload as the console list, ignoring
    /// correlation ids.  Needed for hosts that predate tagged responses.
    #[arg(long)]
    legacy_routing: bool,

    /// After listing, start a stream session for this console id.
    #[arg(long, value_name = "ID")]
    stream: Option<String>,
}

impl Cli {
    fn into_ui_config(self) -> anyhow::Result<(UiConfig, Option<ConsoleId>)> {
        if self.timeout == 0 {
            anyhow::bail!("--timeout must be at least 1 second");
        }
        let config = UiConfig {
            host_url: self.host_url,
            request_timeout: Duration::from_secs(self.timeout),
            routing: if self.legacy_routing {
                RoutingPolicy::Legacy
            } else {
                RoutingPolicy::Strict
            },
            ..UiConfig::default()
        };
        Ok((config, self.stream.map(ConsoleId::new)))
    }
}

/// Shows failures on stderr, the terminal's "blocking alert".
struct StderrPresenter;

impl ErrorPresenter for StderrPresenter {
    fn present(&self, error: &RouteError) {
        eprintln!("error: {error}");
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let (config, stream_target) = Cli::parse().into_ui_config()?;
    info!(
        "connecting to {} ({:?} routing)",
        config.host_url, config.routing
    );

    let (transport, inbound) = WsTransport::connect(&config.host_url, config.channel_capacity)
        .await
        .with_context(|| format!("failed to reach host at {}", config.host_url))?;
    let (bus, _pump) = ConsoleBus::start(Arc::new(transport), inbound, config.routing);

    let mut scope = ConsoleListScope::mount(&bus, Arc::new(StderrPresenter))
        .await
        .context("failed to request the console list")?;
    // Failures were already shown by the presenter.
    let listed = scope.wait_settled(config.request_timeout).await;
    print!("{}", render_console_list(&scope.consoles()));

    if let (Ok(_), Some(console_id)) = (&listed, stream_target) {
        let route = scope
            .start_stream(&console_id)
            .await
            .with_context(|| format!("cannot start a stream for console {console_id}"))?;
        if scope.wait_settled(config.request_timeout).await.is_ok() {
            if let Some(session) = scope.stream_session() {
                println!("{route} (session {})", session.session_id);
            }
        }
    }

    scope.unmount();
    listed.map(|_| ()).context("console list request failed")
}

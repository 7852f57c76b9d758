//! WebSocket server: accept loop and per-connection task.
//!
//! This module is responsible for:
//!
//! 1. Binding a TCP listener on the configured address.
//! 2. Upgrading each accepted connection to a WebSocket session.
//! 3. Answering every text message (one [`Frame`] each) through the
//!    [`HostService`] on that connection's own Tokio task.
//! 4. Stopping the accept loop when the `running` flag is cleared.
//!
//! Requests on one connection are answered in order; connections do not
//! wait for each other.

use std::net::SocketAddr;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use std::time::Duration;

use anyhow::Context;
use futures_util::{SinkExt, StreamExt};
use greenlight_core::protocol::codec::{frame_from_text, frame_to_text};
use tokio::net::{TcpListener, TcpStream};
use tokio::time::timeout;
use tokio_tungstenite::{accept_async, tungstenite::Message as WsMessage};
use tracing::{debug, error, info, warn};

use crate::application::HostService;

/// How often the accept loop re-checks the `running` flag when idle.
const ACCEPT_POLL: Duration = Duration::from_millis(200);

/// Binds `addr` and runs [`serve`] until `running` is set to `false`.
///
/// # Errors
///
/// Returns an error if the listener cannot be bound.
pub async fn run_server(
    addr: SocketAddr,
    service: HostService,
    running: Arc<AtomicBool>,
) -> anyhow::Result<()> {
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind WebSocket listener on {addr}"))?;
    info!("greenlight host listening on ws://{addr}");
    serve(listener, service, running).await;
    Ok(())
}

/// Accepts connections on an already bound `listener`.
pub async fn serve(listener: TcpListener, service: HostService, running: Arc<AtomicBool>) {
    loop {
        if !running.load(Ordering::Relaxed) {
            info!("shutdown flag set; stopping accept loop");
            break;
        }

        match timeout(ACCEPT_POLL, listener.accept()).await {
            Ok(Ok((stream, peer_addr))) => {
                info!("new UI connection from {peer_addr}");
                let service = service.clone();
                tokio::spawn(async move {
                    match run_session(stream, peer_addr, service).await {
                        Ok(()) => info!("session {peer_addr} closed normally"),
                        Err(e) => warn!("session {peer_addr} closed with error: {e:#}"),
                    }
                });
            }
            Ok(Err(e)) => error!("accept error: {e}"),
            Err(_) => {}
        }
    }
}

async fn run_session(
    raw_stream: TcpStream,
    peer_addr: SocketAddr,
    service: HostService,
) -> anyhow::Result<()> {
    let ws_stream = accept_async(raw_stream)
        .await
        .with_context(|| format!("WebSocket handshake failed with {peer_addr}"))?;
    let (mut ws_tx, mut ws_rx) = ws_stream.split();

    while let Some(message) = ws_rx.next().await {
        let message = message.with_context(|| format!("session {peer_addr}: read failed"))?;
        match message {
            WsMessage::Text(text) => {
                let frame = match frame_from_text(&text) {
                    Ok(frame) => frame,
                    Err(e) => {
                        warn!("session {peer_addr}: {e}");
                        continue;
                    }
                };
                let Some(reply) = service.handle(&frame).await else {
                    continue;
                };
                let text = frame_to_text(&reply)
                    .with_context(|| format!("session {peer_addr}: encode failed"))?;
                ws_tx
                    .send(WsMessage::Text(text))
                    .await
                    .with_context(|| format!("session {peer_addr}: send failed"))?;
            }
            WsMessage::Binary(_) => {
                warn!("session {peer_addr}: unexpected binary frame (ignored)");
            }
            WsMessage::Close(_) => {
                debug!("session {peer_addr}: close frame received");
                break;
            }
            _ => {}
        }
    }
    Ok(())
}

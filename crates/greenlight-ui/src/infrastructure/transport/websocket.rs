//! WebSocket transport to a `greenlight-host` process.
//!
//! One text message per [`Frame`], in the JSON form produced by
//! `frame_to_text`.  After the handshake the socket is split and driven by
//! two tasks:
//!
//! - **writer**: drains an outbound `mpsc` queue into the socket sink.
//! - **reader**: parses text messages into frames and pushes them onto the
//!   inbound queue returned by [`WsTransport::connect`].
//!
//! Either task stopping closes its queue, so a dropped connection shows up
//! as [`TransportError::Closed`] on the next send and as the end of the
//! pump on the receiving side.  There is no reconnect.

use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use greenlight_core::protocol::codec::{frame_from_text, frame_to_text};
use greenlight_core::Frame;
use tokio::sync::mpsc;
use tokio_tungstenite::{connect_async, tungstenite::Message as WsMessage};
use tracing::{debug, info, warn};

use crate::application::transport::{ChannelTransport, TransportError};

/// UI end of a WebSocket connection to the host.
#[derive(Debug, Clone)]
pub struct WsTransport {
    outbound: mpsc::Sender<Frame>,
}

impl WsTransport {
    /// Connects to `url` and spawns the reader and writer tasks.
    ///
    /// Returns the transport and the queue of frames received from the host.
    pub async fn connect(
        url: &str,
        capacity: usize,
    ) -> Result<(Self, mpsc::Receiver<Frame>), TransportError> {
        let (socket, _response) = connect_async(url)
            .await
            .map_err(|e| TransportError::Connect {
                url: url.to_string(),
                reason: e.to_string(),
            })?;
        info!("connected to host at {url}");

        let (mut sink, mut stream) = socket.split();
        let (out_tx, mut out_rx) = mpsc::channel::<Frame>(capacity);
        let (in_tx, in_rx) = mpsc::channel::<Frame>(capacity);

        tokio::spawn(async move {
            while let Some(frame) = out_rx.recv().await {
                let text = match frame_to_text(&frame) {
                    Ok(text) => text,
                    Err(e) => {
                        warn!("dropping outbound frame: {e}");
                        continue;
                    }
                };
                if let Err(e) = sink.send(WsMessage::Text(text)).await {
                    warn!("WebSocket send failed: {e}");
                    break;
                }
            }
            let _ = sink.close().await;
            debug!("WebSocket writer stopped");
        });

        tokio::spawn(async move {
            while let Some(message) = stream.next().await {
                match message {
                    Ok(WsMessage::Text(text)) => match frame_from_text(&text) {
                        Ok(frame) => {
                            if in_tx.send(frame).await.is_err() {
                                break;
                            }
                        }
                        Err(e) => warn!("ignoring unreadable frame from host: {e}"),
                    },
                    Ok(WsMessage::Close(_)) => {
                        debug!("host closed the WebSocket");
                        break;
                    }
                    Ok(_) => {}
                    Err(e) => {
                        warn!("WebSocket read error: {e}");
                        break;
                    }
                }
            }
            debug!("WebSocket reader stopped");
        });

        Ok((Self { outbound: out_tx }, in_rx))
    }
}

#[async_trait]
impl ChannelTransport for WsTransport {
    async fn send(&self, frame: Frame) -> Result<(), TransportError> {
        self.outbound
            .send(frame)
            .await
            .map_err(|_| TransportError::Closed)
    }
}

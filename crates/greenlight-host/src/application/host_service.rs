//! Host Service: answers requests arriving on the `stream` channel.
//!
//! This is the host half of the request/response cycle:
//!
//! ```text
//! Frame ──► decode_request ──► ConsoleProvider ──► InboundEnvelope ──► Frame
//!               │ (fails)                              ▲
//!               └──────── error "unsupported request" ─┘
//! ```
//!
//! Every reply echoes the correlation id of the request it answers.  The id
//! is read from the raw payload, so even a request that fails to decode gets
//! an error the UI can match to it.
//!
//! Each request gets exactly one reply.  Requests are handled one at a time
//! per connection, so replies leave in request order.

use std::sync::Arc;

use greenlight_core::protocol::codec::{correlation_of, encode_response};
use greenlight_core::{
    decode_request, Frame, HostError, InboundEnvelope, InboundMessage, Request, STREAM_CHANNEL,
};
use serde_json::json;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use super::provider::{ConsoleProvider, ProviderError};

/// Message of the `error` reply to a request that could not be decoded.
pub const UNSUPPORTED_REQUEST: &str = "unsupported request";

/// Turns request frames into reply frames using a [`ConsoleProvider`].
#[derive(Clone)]
pub struct HostService {
    provider: Arc<dyn ConsoleProvider>,
}

impl HostService {
    pub fn new(provider: Arc<dyn ConsoleProvider>) -> Self {
        Self { provider }
    }

    /// Answers one frame.
    ///
    /// Returns `None` for frames on other channels, which are not requests.
    pub async fn handle(&self, frame: &Frame) -> Option<Frame> {
        if frame.channel != STREAM_CHANNEL {
            warn!("ignoring frame on unknown channel '{}'", frame.channel);
            return None;
        }

        let correlation_id = correlation_of(&frame.payload);
        let message = match decode_request(&frame.payload) {
            Ok(envelope) => {
                debug!(
                    "handling '{}' (correlation {:?})",
                    envelope.request.kind(),
                    correlation_id
                );
                self.answer(envelope.request).await
            }
            Err(e) => {
                warn!("rejecting request: {e}");
                InboundMessage::Error(HostError::with_data(
                    UNSUPPORTED_REQUEST,
                    json!({ "reason": e.to_string() }),
                ))
            }
        };

        match encode_response(&InboundEnvelope::reply(correlation_id, message)) {
            Ok(reply) => Some(reply),
            Err(e) => {
                error!("failed to encode reply: {e}");
                None
            }
        }
    }

    async fn answer(&self, request: Request) -> InboundMessage {
        match request {
            Request::GetConsoles => match self.provider.list_consoles().await {
                Ok(data) => {
                    info!("listing {} console(s)", data.len());
                    InboundMessage::Consoles { data }
                }
                Err(e) => provider_failure(&e),
            },
            Request::StartStream { console_id } => {
                match self.provider.start_stream(&console_id).await {
                    Ok(session_id) => {
                        info!("stream session {session_id} prepared for console {console_id}");
                        InboundMessage::StreamStarted {
                            console_id,
                            session_id,
                        }
                    }
                    Err(e) => provider_failure(&e),
                }
            }
        }
    }

    /// Answers frames from `inbound` on `outbound` until either side closes.
    pub async fn serve(&self, mut inbound: mpsc::Receiver<Frame>, outbound: mpsc::Sender<Frame>) {
        while let Some(frame) = inbound.recv().await {
            if let Some(reply) = self.handle(&frame).await {
                if outbound.send(reply).await.is_err() {
                    debug!("reply channel closed");
                    break;
                }
            }
        }
        debug!("host service stopped");
    }
}

fn provider_failure(e: &ProviderError) -> InboundMessage {
    warn!("provider error: {e}");
    InboundMessage::Error(HostError::with_data(e.to_string(), json!({ "code": e.code() })))
}

//! JSON codec for stream-channel envelopes.
//!
//! This module turns typed envelopes into [`Frame`]s and back.  Encoding is
//! straightforward serde.  Decoding is where the interesting decisions live:
//! what to do with a payload whose `kind` is missing, unknown, or whose
//! fields do not match the kind.
//!
//! # Classification policies
//!
//! Inbound (host → UI) payloads are classified under a [`RoutingPolicy`]:
//!
//! | Payload                         | `Strict`                 | `Legacy`                         |
//! |---------------------------------|--------------------------|----------------------------------|
//! | `kind: "error"`                 | `InboundMessage::Error`  | `InboundMessage::Error`          |
//! | `kind: "consoles"`, valid data  | `Consoles`               | `Consoles`                       |
//! | `kind` missing or unknown       | `ProtocolError`          | success, `data` parsed as list   |
//! | success with bad/absent `data`  | `ProtocolError`          | success with an empty list       |
//!
//! `Legacy` reproduces how the first UI behaved: anything that is not an
//! error is console data, and a broken payload renders as "no consoles"
//! instead of crashing the list view.
//!
//! Outbound (UI → host) payloads are always decoded strictly.

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;
use tracing::warn;

use super::correlation::CorrelationId;
use super::messages::{Frame, HostError, InboundEnvelope, InboundMessage, OutboundEnvelope};
use crate::domain::console::ConsoleRecord;

/// Name of the discriminant field in every envelope.
pub const KIND_FIELD: &str = "kind";

/// Name of the correlation field in every envelope.
pub const CORRELATION_FIELD: &str = "correlation_id";

/// Every `kind` the host may send.
pub const INBOUND_KINDS: &[&str] = &["consoles", "stream_started", "error"];

/// Every `kind` the UI may send.
pub const OUTBOUND_KINDS: &[&str] = &["get_consoles", "start_stream"];

/// How strictly inbound payloads are classified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RoutingPolicy {
    /// Closed set of kinds; a correlation id, when present, must match the
    /// outstanding request.  Anything else is a protocol error.
    #[default]
    Strict,
    /// Everything that is not `error` is success data; correlation ids are
    /// ignored and the last delivered response wins.
    Legacy,
}

/// Errors produced while encoding or decoding envelopes.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// The payload is a JSON array, string, number, ... instead of an object.
    #[error("envelope is not a JSON object")]
    NotAnObject,

    /// The payload has no string `kind` field.
    #[error("envelope has no 'kind' tag")]
    MissingKind,

    /// The `kind` is not one this side of the channel understands.
    #[error("unknown envelope kind: {0}")]
    UnknownKind(String),

    /// The `kind` is known but the other fields do not match it.
    #[error("malformed '{kind}' envelope: {source}")]
    Malformed {
        kind: String,
        #[source]
        source: serde_json::Error,
    },

    /// The envelope could not be converted to JSON.
    #[error("failed to encode envelope: {0}")]
    Encode(#[source] serde_json::Error),

    /// A transport frame was not valid JSON.
    #[error("invalid frame: {0}")]
    InvalidFrame(#[source] serde_json::Error),
}

// ── Encoding ──────────────────────────────────────────────────────────────────

/// Encodes a UI request as a frame on the stream channel.
pub fn encode_request(envelope: &OutboundEnvelope) -> Result<Frame, ProtocolError> {
    let payload = serde_json::to_value(envelope).map_err(ProtocolError::Encode)?;
    Ok(Frame::stream(payload))
}

/// Encodes a host response as a frame on the stream channel.
pub fn encode_response(envelope: &InboundEnvelope) -> Result<Frame, ProtocolError> {
    let payload = serde_json::to_value(envelope).map_err(ProtocolError::Encode)?;
    Ok(Frame::stream(payload))
}

/// Serializes a frame to the text form used on the WebSocket.
pub fn frame_to_text(frame: &Frame) -> Result<String, ProtocolError> {
    serde_json::to_string(frame).map_err(ProtocolError::Encode)
}

/// Parses the text form of a frame.
pub fn frame_from_text(text: &str) -> Result<Frame, ProtocolError> {
    serde_json::from_str(text).map_err(ProtocolError::InvalidFrame)
}

// ── Decoding ──────────────────────────────────────────────────────────────────

/// Reads the correlation id out of a raw payload, if it has a valid one.
///
/// Used by the host to echo the id even when the rest of the request is
/// malformed, so the UI can still match the resulting error to its request.
pub fn correlation_of(payload: &Value) -> Option<CorrelationId> {
    payload
        .get(CORRELATION_FIELD)
        .and_then(Value::as_str)
        .and_then(|s| s.parse().ok())
}

/// Decodes a UI request.  Always strict.
pub fn decode_request(payload: &Value) -> Result<OutboundEnvelope, ProtocolError> {
    decode_tagged(payload, OUTBOUND_KINDS)
}

/// Decodes a host response under `policy`.
///
/// Under [`RoutingPolicy::Legacy`] this never fails.
pub fn decode_response(
    payload: &Value,
    policy: RoutingPolicy,
) -> Result<InboundEnvelope, ProtocolError> {
    match policy {
        RoutingPolicy::Strict => decode_tagged(payload, INBOUND_KINDS),
        RoutingPolicy::Legacy => Ok(decode_response_lenient(payload)),
    }
}

fn decode_tagged<T: DeserializeOwned>(payload: &Value, known: &[&str]) -> Result<T, ProtocolError> {
    let object = payload.as_object().ok_or(ProtocolError::NotAnObject)?;
    let kind = object
        .get(KIND_FIELD)
        .and_then(Value::as_str)
        .ok_or(ProtocolError::MissingKind)?;
    if !known.contains(&kind) {
        return Err(ProtocolError::UnknownKind(kind.to_string()));
    }
    T::deserialize(payload).map_err(|source| ProtocolError::Malformed {
        kind: kind.to_string(),
        source,
    })
}

fn decode_response_lenient(payload: &Value) -> InboundEnvelope {
    let correlation_id = correlation_of(payload);
    let kind = payload.get(KIND_FIELD).and_then(Value::as_str);

    if kind == Some("error") {
        let message = payload
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        let data = payload.get("data").cloned();
        return InboundEnvelope::reply(correlation_id, InboundMessage::Error(HostError { message, data }));
    }

    // A well-formed stream acknowledgement keeps its meaning.
    if kind == Some("stream_started") {
        if let Ok(envelope) = InboundEnvelope::deserialize(payload) {
            return envelope;
        }
    }

    let data = match payload.get("data") {
        Some(data) => Vec::<ConsoleRecord>::deserialize(data).unwrap_or_else(|e| {
            warn!("inbound {kind:?} payload has malformed console data ({e}); treating as empty");
            Vec::new()
        }),
        None => {
            warn!("inbound {kind:?} payload has no console data; treating as empty");
            Vec::new()
        }
    };
    InboundEnvelope::reply(correlation_id, InboundMessage::Consoles { data })
}

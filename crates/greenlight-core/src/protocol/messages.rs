//! Envelope types for the `stream` channel.
//!
//! Every message crossing the channel, in either direction, is a JSON object
//! with a `"kind"` discriminant plus the fields of that kind.  For example:
//!
//! ```json
//! {"kind":"get_consoles","correlation_id":"550e8400-e29b-41d4-a716-446655440000"}
//! {"kind":"consoles","correlation_id":"550e8400-...","data":[{"id":"A1", ...}]}
//! {"kind":"error","correlation_id":"550e8400-...","message":"unauthorized"}
//! ```
//!
//! # Why separate outbound and inbound types?
//!
//! The UI only ever *sends* requests and the host only ever *sends*
//! responses.  Two distinct enums make it a compile-time error to send a
//! response kind from the UI, and vice versa.
//!
//! Envelopes never travel bare: the transport wraps them in a [`Frame`] that
//! names the channel they belong to.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::correlation::CorrelationId;
use crate::domain::console::{ConsoleId, ConsoleRecord};

/// The single duplex channel that carries all request, response, and error
/// traffic between the UI and the host.
pub const STREAM_CHANNEL: &str = "stream";

// ── UI → host ─────────────────────────────────────────────────────────────────

/// Requests the UI can send to the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Request {
    /// Enumerate all consoles known to the host.  No payload.
    GetConsoles,

    /// Ask the host to prepare a streaming session for a console.
    ///
    /// The session itself is owned by the streaming subsystem; this request
    /// only initiates it.
    StartStream {
        /// Id taken verbatim from a previously delivered [`ConsoleRecord`].
        console_id: ConsoleId,
    },
}

impl Request {
    /// The wire tag of this request.
    pub fn kind(&self) -> &'static str {
        match self {
            Request::GetConsoles => "get_consoles",
            Request::StartStream { .. } => "start_stream",
        }
    }
}

/// A request together with its correlation id.
///
/// `correlation_id` is optional on the wire so that older UIs, which only
/// ever sent `{"kind":"get_consoles"}`, are still understood by the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutboundEnvelope {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correlation_id: Option<CorrelationId>,
    #[serde(flatten)]
    pub request: Request,
}

impl OutboundEnvelope {
    /// Wraps `request` with a freshly generated correlation id.
    pub fn new(request: Request) -> Self {
        Self {
            correlation_id: Some(CorrelationId::new()),
            request,
        }
    }

    /// Wraps `request` without a correlation id (the legacy wire shape).
    pub fn uncorrelated(request: Request) -> Self {
        Self {
            correlation_id: None,
            request,
        }
    }
}

// ── host → UI ─────────────────────────────────────────────────────────────────

/// A failure reported by the host.
///
/// `message` is meant for humans.  `data` carries optional structured detail
/// (an error code, the offending request, ...) and is shown appended to the
/// message as compact JSON.  An explicit `"data": null` counts as provided
/// and renders as `message: null`; only an absent field means no detail.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HostError {
    pub message: String,
    #[serde(
        default,
        deserialize_with = "present_value",
        skip_serializing_if = "Option::is_none"
    )]
    pub data: Option<Value>,
}

/// Keeps an explicit JSON `null` as `Some(Value::Null)`.
fn present_value<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

impl HostError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            data: None,
        }
    }

    pub fn with_data(message: impl Into<String>, data: Value) -> Self {
        Self {
            message: message.into(),
            data: Some(data),
        }
    }
}

impl fmt::Display for HostError {
    /// Renders `message`, or `message: <compact JSON of data>` when structured
    /// detail is present.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.data {
            Some(data) => write!(f, "{}: {}", self.message, data),
            None => f.write_str(&self.message),
        }
    }
}

impl std::error::Error for HostError {}

/// Responses the host can send to the UI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum InboundMessage {
    /// Successful answer to `get_consoles`: the complete console list.
    Consoles { data: Vec<ConsoleRecord> },

    /// Successful answer to `start_stream`.
    StreamStarted {
        console_id: ConsoleId,
        /// Host-assigned session handle for the streaming subsystem.
        session_id: String,
    },

    /// The request failed on the host.
    Error(HostError),
}

impl InboundMessage {
    /// The wire tag of this message.
    pub fn kind(&self) -> &'static str {
        match self {
            InboundMessage::Consoles { .. } => "consoles",
            InboundMessage::StreamStarted { .. } => "stream_started",
            InboundMessage::Error(_) => "error",
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, InboundMessage::Error(_))
    }
}

/// A response together with the correlation id it answers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InboundEnvelope {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correlation_id: Option<CorrelationId>,
    #[serde(flatten)]
    pub message: InboundMessage,
}

impl InboundEnvelope {
    /// Builds the reply to a request carrying `correlation_id`.
    pub fn reply(correlation_id: Option<CorrelationId>, message: InboundMessage) -> Self {
        Self {
            correlation_id,
            message,
        }
    }
}

// ── Transport unit ────────────────────────────────────────────────────────────

/// What the transport actually carries: a channel name and a JSON payload.
///
/// The payload is kept as an untyped [`Value`] so that classification (and
/// the decision of what to do with an unknown kind) stays in the codec.
///
/// ```json
/// {"channel":"stream","payload":{"kind":"get_consoles"}}
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    pub channel: String,
    pub payload: Value,
}

impl Frame {
    pub fn new(channel: impl Into<String>, payload: Value) -> Self {
        Self {
            channel: channel.into(),
            payload,
        }
    }

    /// A frame on the [`STREAM_CHANNEL`].
    pub fn stream(payload: Value) -> Self {
        Self::new(STREAM_CHANNEL, payload)
    }
}

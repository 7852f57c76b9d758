//! # greenlight-core
//!
//! Shared library for Greenlight containing the stream-channel envelope
//! types, the console record model, and the JSON codec.
//!
//! This crate is used by both the UI and the host process.  It has no
//! dependencies on async runtimes, sockets, or UI frameworks.
//!
//! # Architecture overview (for beginners)
//!
//! Greenlight lists the game consoles a user owns and lets them start a
//! streaming session against one.  Two processes cooperate:
//!
//! - The **host** owns the real device connections.  It answers requests.
//! - The **UI** shows the console list.  It sends requests and renders the
//!   answers.
//!
//! They talk over a single duplex channel named `stream`.  Every message on
//! that channel is an *envelope*: a JSON object with a `kind` tag.
//!
//! - **`protocol`** – The envelopes in both directions, the correlation ids
//!   that link a response to its request, and the codec that classifies
//!   incoming JSON.
//!
//! - **`domain`** – The values carried inside envelopes: console records and
//!   the `stream/<id>` navigation route.

pub mod domain;
pub mod protocol;

// Re-export the most-used types at the crate root so callers can write
// `greenlight_core::ConsoleRecord` instead of the full module path.
pub use domain::{check_unique_ids, ConsoleId, ConsoleRecord, DuplicateConsoleId, StreamRoute};
pub use protocol::codec::{decode_request, decode_response, ProtocolError, RoutingPolicy};
pub use protocol::messages::{
    Frame, HostError, InboundEnvelope, InboundMessage, OutboundEnvelope, Request, STREAM_CHANNEL,
};
pub use protocol::CorrelationId;

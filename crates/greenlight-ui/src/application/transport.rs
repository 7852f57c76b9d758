//! The Channel Transport port.
//!
//! The application layer only needs one thing from a transport: put a frame
//! on the wire.  Inbound frames arrive on a `tokio::sync::mpsc::Receiver`
//! handed out by whoever constructs the transport, and are pumped into the
//! dispatch registry by [`crate::application::bus::ConsoleBus`].
//!
//! Implementations live in `infrastructure::transport` (in-process duplex
//! pair, WebSocket).  There is no retry or reconnect logic at this level: a
//! failed send is reported once and the caller decides what to do.

use async_trait::async_trait;
use greenlight_core::Frame;
use thiserror::Error;

/// Errors raised by a channel transport.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The other end of the channel is gone.
    #[error("channel closed")]
    Closed,

    /// The transport could not be opened.
    #[error("failed to connect to {url}: {reason}")]
    Connect { url: String, reason: String },
}

/// One end of the duplex `stream` channel.
#[async_trait]
pub trait ChannelTransport: Send + Sync {
    /// Queues `frame` for delivery to the other end.
    ///
    /// Returns once the frame is handed to the transport; it does not wait
    /// for any reply.
    async fn send(&self, frame: Frame) -> Result<(), TransportError>;
}

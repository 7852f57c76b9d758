//! In-process duplex channel.
//!
//! Two bounded `mpsc` queues, one per direction.  The UI half implements
//! [`ChannelTransport`]; the host half is a plain [`HostEnd`] that a
//! `HostService` (or a test) reads requests from and writes replies to.
//!
//! ```text
//!   MemoryTransport::send ──► HostEnd.inbound
//!   HostEnd.outbound      ──► ui inbound Receiver ──► ConsoleBus pump
//! ```

use async_trait::async_trait;
use greenlight_core::Frame;
use tokio::sync::mpsc;

use crate::application::transport::{ChannelTransport, TransportError};

/// UI half of an in-process channel.
#[derive(Debug, Clone)]
pub struct MemoryTransport {
    outbound: mpsc::Sender<Frame>,
}

/// Host half of an in-process channel.
#[derive(Debug)]
pub struct HostEnd {
    /// Frames the UI sent.
    pub inbound: mpsc::Receiver<Frame>,
    /// Frames for the UI.
    pub outbound: mpsc::Sender<Frame>,
}

/// Opens an in-process channel with `capacity` frames of buffering per
/// direction.
///
/// Returns the UI transport, the UI's inbound queue (to hand to
/// `ConsoleBus::start`), and the host half.
pub fn duplex(capacity: usize) -> (MemoryTransport, mpsc::Receiver<Frame>, HostEnd) {
    let (to_host, host_inbound) = mpsc::channel(capacity);
    let (to_ui, ui_inbound) = mpsc::channel(capacity);
    (
        MemoryTransport { outbound: to_host },
        ui_inbound,
        HostEnd {
            inbound: host_inbound,
            outbound: to_ui,
        },
    )
}

#[async_trait]
impl ChannelTransport for MemoryTransport {
    async fn send(&self, frame: Frame) -> Result<(), TransportError> {
        self.outbound
            .send(frame)
            .await
            .map_err(|_| TransportError::Closed)
    }
}

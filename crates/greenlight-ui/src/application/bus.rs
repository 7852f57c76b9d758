//! The console bus: one transport, one dispatch registry, one pump.
//!
//! [`ConsoleBus`] is the shared handle every scope holds.  It is cheap to
//! clone (all fields are `Arc`s) and owns nothing scope-specific.
//!
//! ```text
//!   transport ──► inbound mpsc ──► pump task ──► decode ──► registry.dispatch
//!                                                              │
//!                                        handlers run here, one at a time
//! ```
//!
//! The pump is the UI event loop: it delivers frames strictly in transport
//! order and runs each handler to completion before reading the next frame.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use greenlight_core::protocol::codec::correlation_of;
use greenlight_core::{decode_response, Frame, RoutingPolicy};
use parking_lot::Mutex;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use super::registry::{Delivery, DispatchRegistry, OwnerId};
use super::transport::ChannelTransport;

/// Shared handle to the transport and the dispatch registry.
#[derive(Clone)]
pub struct ConsoleBus {
    transport: Arc<dyn ChannelTransport>,
    registry: Arc<Mutex<DispatchRegistry>>,
    policy: RoutingPolicy,
    next_owner: Arc<AtomicU64>,
}

impl ConsoleBus {
    /// Builds a bus without starting a pump.  Frames must then be fed in
    /// with [`ConsoleBus::deliver`].
    pub fn new(transport: Arc<dyn ChannelTransport>, policy: RoutingPolicy) -> Self {
        Self {
            transport,
            registry: Arc::new(Mutex::new(DispatchRegistry::new())),
            policy,
            next_owner: Arc::new(AtomicU64::new(1)),
        }
    }

    /// Builds a bus and spawns the pump task draining `inbound`.
    ///
    /// The pump stops when the sending side of `inbound` is dropped.
    pub fn start(
        transport: Arc<dyn ChannelTransport>,
        inbound: mpsc::Receiver<Frame>,
        policy: RoutingPolicy,
    ) -> (Self, JoinHandle<()>) {
        let bus = Self::new(transport, policy);
        let pump = tokio::spawn(bus.clone().run_pump(inbound));
        (bus, pump)
    }

    /// Delivers frames from `inbound` until it closes.
    pub async fn run_pump(self, mut inbound: mpsc::Receiver<Frame>) {
        while let Some(frame) = inbound.recv().await {
            self.deliver(&frame);
        }
        info!("inbound channel closed; pump stopped");
    }

    /// Classifies one frame under the bus's routing policy and dispatches it.
    ///
    /// A payload that fails classification is still dispatched (as an `Err`)
    /// so that the request it answers can fail instead of hanging.
    pub fn deliver(&self, frame: &Frame) -> Delivery {
        let decoded = decode_response(&frame.payload, self.policy);
        let correlation_id = match &decoded {
            Ok(envelope) => envelope.correlation_id,
            Err(e) => {
                warn!("unclassifiable payload on '{}': {e}", frame.channel);
                correlation_of(&frame.payload)
            }
        };
        self.registry
            .lock()
            .dispatch(&frame.channel, correlation_id, &decoded)
    }

    /// Hands out a fresh owner id for a scope.
    pub fn allocate_owner(&self) -> OwnerId {
        OwnerId(self.next_owner.fetch_add(1, Ordering::Relaxed))
    }

    pub fn registry(&self) -> &Arc<Mutex<DispatchRegistry>> {
        &self.registry
    }

    pub fn transport(&self) -> Arc<dyn ChannelTransport> {
        Arc::clone(&self.transport)
    }

    pub fn policy(&self) -> RoutingPolicy {
        self.policy
    }
}

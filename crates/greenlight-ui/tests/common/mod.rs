//! Shared fixtures for the greenlight-ui integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use greenlight_core::protocol::codec::encode_response;
use greenlight_core::{
    decode_request, ConsoleId, ConsoleRecord, CorrelationId, Frame, InboundEnvelope,
    InboundMessage, Request, RoutingPolicy,
};
use greenlight_ui::application::{ConsoleBus, ErrorPresenter, RouteError};
use greenlight_ui::infrastructure::transport::{duplex, HostEnd};
use parking_lot::Mutex;
use serde_json::Value;

/// Remembers every error shown to the user, as displayed text.
#[derive(Default)]
pub struct RecordingPresenter {
    shown: Mutex<Vec<String>>,
}

impl RecordingPresenter {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn shown(&self) -> Vec<String> {
        self.shown.lock().clone()
    }
}

impl ErrorPresenter for RecordingPresenter {
    fn present(&self, error: &RouteError) {
        self.shown.lock().push(error.to_string());
    }
}

pub fn record(id: &str, name: &str) -> ConsoleRecord {
    ConsoleRecord {
        id: ConsoleId::new(id),
        name: name.to_string(),
        power_state: "On".to_string(),
        console_type: "Xbox".to_string(),
        digital_assistant_remote_control_enabled: true,
        remote_management_enabled: false,
        console_streaming_enabled: true,
    }
}

/// A bus whose host end is driven by the test.
pub fn scripted_bus(policy: RoutingPolicy) -> (ConsoleBus, HostEnd) {
    let (transport, inbound, host) = duplex(16);
    let (bus, _pump) = ConsoleBus::start(Arc::new(transport), inbound, policy);
    (bus, host)
}

/// Reads the next request the UI put on the channel.
pub async fn next_request(host: &mut HostEnd) -> (Option<CorrelationId>, Request) {
    let frame = host.inbound.recv().await.expect("UI sent a request");
    let envelope = decode_request(&frame.payload).expect("well-formed request");
    (envelope.correlation_id, envelope.request)
}

/// Sends a typed reply to the UI.
pub async fn reply(host: &HostEnd, correlation_id: Option<CorrelationId>, message: InboundMessage) {
    let frame = encode_response(&InboundEnvelope::reply(correlation_id, message))
        .expect("encodable reply");
    host.outbound.send(frame).await.expect("UI is listening");
}

/// Sends an arbitrary payload to the UI, as an older or misbehaving host might.
pub async fn reply_raw(host: &HostEnd, payload: Value) {
    host.outbound
        .send(Frame::stream(payload))
        .await
        .expect("UI is listening");
}

/// Lets the pump drain everything already queued.
pub async fn settle_pump() {
    for _ in 0..10 {
        tokio::task::yield_now().await;
    }
    tokio::time::sleep(std::time::Duration::from_millis(20)).await;
}

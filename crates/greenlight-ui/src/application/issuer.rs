//! Request Issuer: builds request envelopes and puts them on the channel.
//!
//! Sending is fire-and-forget.  The issuer never waits for an answer; the
//! answer arrives later through the dispatch registry and is matched to its
//! request by correlation id.
//!
//! Building and sending are separate steps so that a scope can arm its
//! response handler for a correlation id *before* the request can possibly
//! be answered.

use std::sync::Arc;

use greenlight_core::protocol::encode_request;
use greenlight_core::{
    ConsoleId, CorrelationId, OutboundEnvelope, ProtocolError, Request, StreamRoute,
};
use thiserror::Error;
use tracing::debug;

use super::transport::{ChannelTransport, TransportError};
use crate::domain::ConsoleListState;

/// A request could not be issued.
#[derive(Debug, Error)]
pub enum IssueError {
    /// `start_stream` for an id that is not in the current console list.
    #[error("console {0} is not in the current console list")]
    UnknownConsole(ConsoleId),

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Encode(#[from] ProtocolError),
}

/// Sends requests over a [`ChannelTransport`].
#[derive(Clone)]
pub struct RequestIssuer {
    transport: Arc<dyn ChannelTransport>,
}

impl RequestIssuer {
    pub fn new(transport: Arc<dyn ChannelTransport>) -> Self {
        Self { transport }
    }

    /// Builds a fresh `get_consoles` request.
    ///
    /// Every call gets a new correlation id: two calls are two independent
    /// requests, even if the first is still unanswered.
    pub fn console_list_request() -> OutboundEnvelope {
        OutboundEnvelope::new(Request::GetConsoles)
    }

    /// Builds a `start_stream` request for a console the user picked from
    /// `known`, together with the route to navigate to.
    ///
    /// The id is copied verbatim from the record into both the envelope and
    /// the route.
    pub fn stream_start_request(
        console_id: &ConsoleId,
        known: &ConsoleListState,
    ) -> Result<(OutboundEnvelope, StreamRoute), IssueError> {
        let record = known
            .get(console_id)
            .ok_or_else(|| IssueError::UnknownConsole(console_id.clone()))?;
        let envelope = OutboundEnvelope::new(Request::StartStream {
            console_id: record.id.clone(),
        });
        Ok((envelope, StreamRoute::new(record.id.clone())))
    }

    /// Encodes `envelope` and hands it to the transport.
    pub async fn send(&self, envelope: &OutboundEnvelope) -> Result<(), IssueError> {
        let frame = encode_request(envelope)?;
        self.transport.send(frame).await?;
        debug!(
            "sent '{}' request (correlation {:?})",
            envelope.request.kind(),
            envelope.correlation_id
        );
        Ok(())
    }

    /// Builds and sends a `get_consoles` request; returns its correlation id.
    pub async fn request_console_list(&self) -> Result<Option<CorrelationId>, IssueError> {
        let envelope = Self::console_list_request();
        self.send(&envelope).await?;
        Ok(envelope.correlation_id)
    }

    /// Builds and sends a `start_stream` request; returns the route to
    /// navigate to.
    pub async fn request_stream_start(
        &self,
        console_id: &ConsoleId,
        known: &ConsoleListState,
    ) -> Result<StreamRoute, IssueError> {
        let (envelope, route) = Self::stream_start_request(console_id, known)?;
        self.send(&envelope).await?;
        Ok(route)
    }
}

//! Response Router: per-request-cycle state machine.
//!
//! Every request a scope issues opens a *cycle*:
//!
//! ```text
//!            begin()                 success envelope
//!   Idle ───────────────► AwaitingResponse ─────────────────► Resolved
//!                               │
//!                               ├── error envelope ─────────► Failed
//!                               ├── protocol violation ─────► Failed
//!                               └── time_out() ─────────────► Failed
//! ```
//!
//! `Resolved` and `Failed` are terminal until the next `begin()`.  The router
//! never touches the console list itself: it returns a [`RouteOutcome`] and
//! the owning scope applies it.
//!
//! # Policies
//!
//! Under [`RoutingPolicy::Strict`] an envelope is only accepted while a
//! request is outstanding and only if its correlation id matches that
//! request.  A tagged answer to an earlier request is ignored, so it can never
//! overwrite a newer list.  An envelope with no correlation id at all (a host
//! that does not echo ids) is taken as the answer to the outstanding request.
//!
//! Under [`RoutingPolicy::Legacy`] every envelope is accepted, in any state.
//! This is how the first UI worked, and it means the *last delivered*
//! response wins, even when it answers an older request.

use std::time::Duration;

use greenlight_core::{
    check_unique_ids, ConsoleId, ConsoleRecord, CorrelationId, DuplicateConsoleId, HostError,
    InboundMessage, OutboundEnvelope, Request, RoutingPolicy,
};
use thiserror::Error;
use tracing::{debug, warn};

use super::registry::Decoded;

/// Where a request cycle currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CycleState {
    /// No request has been issued yet.
    #[default]
    Idle,
    /// A request is outstanding.
    AwaitingResponse,
    /// The outstanding request was answered successfully.
    Resolved,
    /// The outstanding request failed (host error, protocol violation, or timeout).
    Failed,
}

impl CycleState {
    /// `true` unless a request is outstanding.
    pub fn is_settled(self) -> bool {
        self != CycleState::AwaitingResponse
    }
}

/// A streaming session the host agreed to prepare.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamSession {
    pub console_id: ConsoleId,
    pub session_id: String,
}

/// Why an envelope was accepted but had no effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    /// It answers a request other than the outstanding one.
    Stale,
    /// No request is outstanding.
    NoOutstandingRequest,
}

/// What the owning scope should do with a routed envelope.
#[derive(Debug, Clone, PartialEq)]
pub enum RouteOutcome {
    /// Replace the console list with these records.
    Consoles(Vec<ConsoleRecord>),
    /// The host started a stream session.
    StreamStarted(StreamSession),
    /// Nothing to do.
    Ignored(IgnoreReason),
}

/// A request cycle failed.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RouteError {
    /// The host answered with an `error` envelope.
    ///
    /// Displays exactly as the host's message, so it can be shown to the user
    /// verbatim.
    #[error(transparent)]
    Host(HostError),

    /// The response could not be classified.
    #[error("protocol error: {0}")]
    Protocol(String),

    /// A console list repeated an id.
    #[error(transparent)]
    DuplicateConsoleId(#[from] DuplicateConsoleId),

    /// The response kind does not answer the outstanding request.
    #[error("unexpected '{received}' response to a '{expected}' request")]
    UnexpectedResponse {
        expected: &'static str,
        received: &'static str,
    },

    /// No response arrived in time.
    #[error("'{request}' request timed out after {after:?}")]
    TimedOut {
        request: &'static str,
        after: Duration,
    },
}

struct Outstanding {
    request: Request,
    correlation_id: Option<CorrelationId>,
}

/// Classifies inbound envelopes against the outstanding request.
pub struct ResponseRouter {
    policy: RoutingPolicy,
    state: CycleState,
    outstanding: Option<Outstanding>,
}

impl ResponseRouter {
    pub fn new(policy: RoutingPolicy) -> Self {
        Self {
            policy,
            state: CycleState::Idle,
            outstanding: None,
        }
    }

    pub fn state(&self) -> CycleState {
        self.state
    }

    pub fn policy(&self) -> RoutingPolicy {
        self.policy
    }

    /// Correlation id of the outstanding request, if any.
    pub fn outstanding_correlation(&self) -> Option<CorrelationId> {
        self.outstanding.as_ref().and_then(|o| o.correlation_id)
    }

    /// Opens a new cycle for `envelope`.  Any previous cycle is forgotten.
    pub fn begin(&mut self, envelope: &OutboundEnvelope) {
        self.outstanding = Some(Outstanding {
            request: envelope.request.clone(),
            correlation_id: envelope.correlation_id,
        });
        self.state = CycleState::AwaitingResponse;
    }

    /// Abandons the outstanding request without failing the cycle.
    ///
    /// Used when the request never made it onto the wire.
    pub fn abort(&mut self) {
        self.outstanding = None;
        self.state = CycleState::Idle;
    }

    /// Fails the outstanding request because it took longer than `after`.
    ///
    /// Returns `None` if nothing was outstanding (the answer won the race).
    pub fn time_out(&mut self, after: Duration) -> Option<RouteError> {
        if self.state != CycleState::AwaitingResponse {
            return None;
        }
        let request = self
            .outstanding
            .as_ref()
            .map_or("unknown", |o| o.request.kind());
        self.state = CycleState::Failed;
        Some(RouteError::TimedOut { request, after })
    }

    /// Routes one inbound payload.
    pub fn route(
        &mut self,
        correlation_id: Option<CorrelationId>,
        inbound: &Decoded,
    ) -> Result<RouteOutcome, RouteError> {
        match self.policy {
            RoutingPolicy::Strict => self.route_strict(correlation_id, inbound),
            RoutingPolicy::Legacy => self.route_legacy(inbound),
        }
    }

    fn route_strict(
        &mut self,
        correlation_id: Option<CorrelationId>,
        inbound: &Decoded,
    ) -> Result<RouteOutcome, RouteError> {
        let outstanding = match (&self.outstanding, self.state) {
            (Some(o), CycleState::AwaitingResponse) => o,
            _ => {
                debug!("inbound envelope with no outstanding request; ignored");
                return Ok(RouteOutcome::Ignored(IgnoreReason::NoOutstandingRequest));
            }
        };
        if correlation_id.is_some() && outstanding.correlation_id != correlation_id {
            debug!(
                "stale envelope (correlation {correlation_id:?}, awaiting {:?}); ignored",
                outstanding.correlation_id
            );
            return Ok(RouteOutcome::Ignored(IgnoreReason::Stale));
        }
        let expected = outstanding.request.kind();

        let result = match inbound {
            Err(e) => Err(RouteError::Protocol(e.to_string())),
            Ok(envelope) => match (&outstanding.request, &envelope.message) {
                (_, InboundMessage::Error(host)) => Err(RouteError::Host(host.clone())),
                (Request::GetConsoles, InboundMessage::Consoles { data }) => check_unique_ids(data)
                    .map(|()| RouteOutcome::Consoles(data.clone()))
                    .map_err(RouteError::from),
                (
                    Request::StartStream { .. },
                    InboundMessage::StreamStarted {
                        console_id,
                        session_id,
                    },
                ) => Ok(RouteOutcome::StreamStarted(StreamSession {
                    console_id: console_id.clone(),
                    session_id: session_id.clone(),
                })),
                (_, other) => Err(RouteError::UnexpectedResponse {
                    expected,
                    received: other.kind(),
                }),
            },
        };
        self.settle(&result);
        result
    }

    fn route_legacy(&mut self, inbound: &Decoded) -> Result<RouteOutcome, RouteError> {
        let result = match inbound {
            Err(e) => Err(RouteError::Protocol(e.to_string())),
            Ok(envelope) => match &envelope.message {
                InboundMessage::Error(host) => Err(RouteError::Host(host.clone())),
                InboundMessage::Consoles { data } => {
                    if let Err(dup) = check_unique_ids(data) {
                        warn!("{dup}; accepting list as delivered");
                    }
                    Ok(RouteOutcome::Consoles(data.clone()))
                }
                InboundMessage::StreamStarted {
                    console_id,
                    session_id,
                } => Ok(RouteOutcome::StreamStarted(StreamSession {
                    console_id: console_id.clone(),
                    session_id: session_id.clone(),
                })),
            },
        };
        self.settle(&result);
        result
    }

    fn settle(&mut self, result: &Result<RouteOutcome, RouteError>) {
        self.state = match result {
            Ok(RouteOutcome::Ignored(_)) => return,
            Ok(_) => CycleState::Resolved,
            Err(_) => CycleState::Failed,
        };
    }
}

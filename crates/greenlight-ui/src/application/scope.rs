//! Console List Scope: the lifetime of one mounted console list view.
//!
//! A scope owns everything one view needs:
//!
//! - a fresh, empty [`ConsoleListState`] created at mount,
//! - a [`ResponseRouter`] tracking the current request cycle,
//! - the subscriptions it armed in the dispatch registry, all tagged with its
//!   [`OwnerId`],
//! - a `watch` channel that ticks whenever the view should re-render.
//!
//! Mounting always issues a new `get_consoles`, even if an earlier scope
//! already loaded the list.  Unmounting (explicitly or by dropping the scope)
//! removes every subscription the scope armed, so a response arriving later
//! is dropped instead of reaching a dead view.
//!
//! # How responses find the scope
//!
//! | Policy   | Armed at mount                                  | Per request                  |
//! |----------|-------------------------------------------------|------------------------------|
//! | `Strict` | handler for uncorrelated envelopes on `stream`  | one-shot correlation handler |
//! | `Legacy` | exclusive handler on the `stream` channel       | nothing                      |
//!
//! Under `Strict` a request has at most one armed correlation handler; issuing
//! the next request disarms the previous one.
//!
//! # Locking
//!
//! Handlers run under the registry lock and then take the scope's own lock.
//! Scope methods therefore never hold their own lock while touching the
//! registry.

use std::sync::Arc;
use std::time::Duration;

use greenlight_core::{
    ConsoleId, ConsoleRecord, CorrelationId, OutboundEnvelope, RoutingPolicy, StreamRoute,
    STREAM_CHANNEL,
};
use parking_lot::Mutex;
use tokio::sync::watch;
use tracing::{debug, info};

use super::bus::ConsoleBus;
use super::issuer::{IssueError, RequestIssuer};
use super::presenter::ErrorPresenter;
use super::registry::{Decoded, Handler, OwnerId, SubscriptionId};
use super::router::{CycleState, ResponseRouter, RouteError, RouteOutcome, StreamSession};
use crate::domain::ConsoleListState;

/// Snapshot published on every state change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScopeStatus {
    pub cycle: CycleState,
    /// Revision of the console list; bumps on every accepted list.
    pub revision: u64,
}

struct ScopeShared {
    state: ConsoleListState,
    router: ResponseRouter,
    last_error: Option<RouteError>,
    stream_session: Option<StreamSession>,
}

impl ScopeShared {
    fn status(&self) -> ScopeStatus {
        ScopeStatus {
            cycle: self.router.state(),
            revision: self.state.revision(),
        }
    }
}

/// One mounted console list view.
pub struct ConsoleListScope {
    bus: ConsoleBus,
    issuer: RequestIssuer,
    owner: OwnerId,
    shared: Arc<Mutex<ScopeShared>>,
    status_tx: Arc<watch::Sender<ScopeStatus>>,
    status_rx: watch::Receiver<ScopeStatus>,
    presenter: Arc<dyn ErrorPresenter>,
    pending: Option<SubscriptionId>,
    mounted: bool,
}

impl ConsoleListScope {
    /// Mounts a new scope on `bus` and issues its `get_consoles` request.
    ///
    /// On a send failure nothing stays subscribed and the error is returned.
    pub async fn mount(
        bus: &ConsoleBus,
        presenter: Arc<dyn ErrorPresenter>,
    ) -> Result<Self, IssueError> {
        let policy = bus.policy();
        let shared = Arc::new(Mutex::new(ScopeShared {
            state: ConsoleListState::new(),
            router: ResponseRouter::new(policy),
            last_error: None,
            stream_session: None,
        }));
        let (status_tx, status_rx) = watch::channel(ScopeStatus::default());

        let mut scope = Self {
            bus: bus.clone(),
            issuer: RequestIssuer::new(bus.transport()),
            owner: bus.allocate_owner(),
            shared,
            status_tx: Arc::new(status_tx),
            status_rx,
            presenter,
            pending: None,
            mounted: true,
        };

        let handler = scope.handler();
        match policy {
            RoutingPolicy::Strict => {
                scope
                    .bus
                    .registry()
                    .lock()
                    .subscribe_uncorrelated(STREAM_CHANNEL, scope.owner, handler);
            }
            RoutingPolicy::Legacy => {
                let (_, cleared) = scope
                    .bus
                    .registry()
                    .lock()
                    .subscribe_exclusive(STREAM_CHANNEL, scope.owner, handler);
                if cleared > 0 {
                    info!("replaced {cleared} leftover '{STREAM_CHANNEL}' handler(s) at mount");
                }
            }
        }

        if let Err(e) = scope.issue(RequestIssuer::console_list_request()).await {
            scope.detach();
            return Err(e);
        }
        debug!("console list scope {:?} mounted", scope.owner);
        Ok(scope)
    }

    /// The console list as last accepted.
    pub fn consoles(&self) -> Vec<ConsoleRecord> {
        self.shared.lock().state.consoles().to_vec()
    }

    pub fn cycle_state(&self) -> CycleState {
        self.shared.lock().router.state()
    }

    pub fn revision(&self) -> u64 {
        self.shared.lock().state.revision()
    }

    /// The failure of the most recent failed cycle, if any.
    pub fn last_error(&self) -> Option<RouteError> {
        self.shared.lock().last_error.clone()
    }

    /// The session the host started for the last `start_stream`, if any.
    pub fn stream_session(&self) -> Option<StreamSession> {
        self.shared.lock().stream_session.clone()
    }

    /// Correlation id of the request currently awaiting an answer.
    pub fn outstanding_correlation(&self) -> Option<CorrelationId> {
        self.shared.lock().router.outstanding_correlation()
    }

    pub fn owner(&self) -> OwnerId {
        self.owner
    }

    pub fn status(&self) -> ScopeStatus {
        *self.status_rx.borrow()
    }

    /// Waits for the next re-render signal and returns the new status.
    pub async fn changed(&mut self) -> ScopeStatus {
        // The sender lives in `self`, so this cannot observe a closed channel.
        let _ = self.status_rx.changed().await;
        *self.status_rx.borrow_and_update()
    }

    /// Waits until the current cycle settles, failing it after `timeout`.
    ///
    /// Returns the settled state, or the cycle's error if it failed.  A
    /// timeout is presented like any other failure.
    pub async fn wait_settled(&mut self, timeout: Duration) -> Result<CycleState, RouteError> {
        let elapsed = tokio::time::timeout(
            timeout,
            self.status_rx.wait_for(|status| status.cycle.is_settled()),
        )
        .await
        .is_err();

        if elapsed {
            let timed_out = {
                let mut shared = self.shared.lock();
                let error = shared.router.time_out(timeout);
                if let Some(e) = &error {
                    shared.last_error = Some(e.clone());
                }
                error.map(|e| (e, shared.status()))
            };
            if let Some((error, status)) = timed_out {
                self.status_tx.send_replace(status);
                self.disarm_pending();
                self.presenter.present(&error);
                return Err(error);
            }
        }

        let shared = self.shared.lock();
        match shared.router.state() {
            CycleState::Failed => Err(shared
                .last_error
                .clone()
                .unwrap_or_else(|| RouteError::Protocol("request failed".into()))),
            cycle => Ok(cycle),
        }
    }

    /// Asks the host to start streaming `console_id` and returns the route
    /// to navigate to.
    ///
    /// The id must be in the current console list.  The host's answer is
    /// tracked as a new request cycle.
    pub async fn start_stream(&mut self, console_id: &ConsoleId) -> Result<StreamRoute, IssueError> {
        let (envelope, route) = {
            let shared = self.shared.lock();
            RequestIssuer::stream_start_request(console_id, &shared.state)?
        };
        self.issue(envelope).await?;
        info!("navigating to {route}");
        Ok(route)
    }

    /// Removes every subscription this scope armed.
    pub fn unmount(mut self) -> usize {
        self.detach()
    }

    async fn issue(&mut self, envelope: OutboundEnvelope) -> Result<(), IssueError> {
        let status = {
            let mut shared = self.shared.lock();
            shared.router.begin(&envelope);
            shared.status()
        };
        self.status_tx.send_replace(status);
        self.arm(&envelope);

        if let Err(e) = self.issuer.send(&envelope).await {
            self.disarm_pending();
            let status = {
                let mut shared = self.shared.lock();
                shared.router.abort();
                shared.status()
            };
            self.status_tx.send_replace(status);
            return Err(e);
        }
        Ok(())
    }

    /// Arms a one-shot handler for `envelope` under strict routing.
    fn arm(&mut self, envelope: &OutboundEnvelope) {
        if self.bus.policy() != RoutingPolicy::Strict {
            return;
        }
        self.disarm_pending();
        if let Some(cid) = envelope.correlation_id {
            let handler = self.handler();
            let id = self
                .bus
                .registry()
                .lock()
                .await_correlation(cid, self.owner, handler);
            self.pending = Some(id);
        }
    }

    fn disarm_pending(&mut self) {
        if let Some(id) = self.pending.take() {
            self.bus.registry().lock().unsubscribe(id);
        }
    }

    fn detach(&mut self) -> usize {
        if !self.mounted {
            return 0;
        }
        self.mounted = false;
        self.pending = None;
        let removed = self.bus.registry().lock().unsubscribe_owner(self.owner);
        debug!("console list scope {:?} unmounted ({removed} subscription(s) removed)", self.owner);
        removed
    }

    fn handler(&self) -> Handler {
        let shared = Arc::clone(&self.shared);
        let status_tx = Arc::clone(&self.status_tx);
        let presenter = Arc::clone(&self.presenter);
        Box::new(move |correlation_id, inbound: &Decoded| {
            let (status, failure) = {
                let mut guard = shared.lock();
                let shared = &mut *guard;
                let failure = match shared.router.route(correlation_id, inbound) {
                    Ok(RouteOutcome::Consoles(records)) => {
                        debug!("accepted console list with {} record(s)", records.len());
                        shared.state.replace(records);
                        None
                    }
                    Ok(RouteOutcome::StreamStarted(session)) => {
                        info!(
                            "stream session {} started for console {}",
                            session.session_id, session.console_id
                        );
                        shared.stream_session = Some(session);
                        None
                    }
                    Ok(RouteOutcome::Ignored(reason)) => {
                        debug!("inbound envelope ignored: {reason:?}");
                        None
                    }
                    Err(error) => {
                        shared.last_error = Some(error.clone());
                        Some(error)
                    }
                };
                (shared.status(), failure)
            };
            status_tx.send_replace(status);
            if let Some(error) = failure {
                presenter.present(&error);
            }
        })
    }
}

impl Drop for ConsoleListScope {
    fn drop(&mut self) {
        self.detach();
    }
}

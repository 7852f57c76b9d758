//! Dispatch Registry: who gets which inbound envelope.
//!
//! The registry is an explicit table of subscriptions.  Each subscription
//! has an *owner* (the scope that created it, so everything a scope armed can
//! be removed in one call when it unmounts) and an *interest*:
//!
//! - [`Interest::Channel`]: every envelope arriving on a named channel.
//!   This is how the first UI worked: one handler on `stream`, replaced on
//!   each mount.
//! - [`Interest::Correlation`]: exactly one envelope: the response carrying
//!   a given correlation id.  Removed as soon as it fires.
//! - [`Interest::Uncorrelated`]: envelopes on a named channel that carry no
//!   correlation id at all, such as an `error` from a host that does not
//!   echo ids.
//!
//! # Dispatch order
//!
//! ```text
//! envelope has correlation id C and someone awaits C?
//!     yes → deliver to that one handler, remove it        (Delivery::Correlated)
//!     no  → deliver to every channel handler, plus every
//!           uncorrelated handler if there is no id         (Delivery::Broadcast(n))
//!           none?  → drop it                               (Delivery::Dropped)
//! ```
//!
//! Dropped envelopes are never buffered or retried.
//!
//! # Locking
//!
//! The registry itself is a plain struct.  [`crate::application::bus::ConsoleBus`]
//! keeps it behind a `parking_lot::Mutex` and calls [`DispatchRegistry::dispatch`]
//! with the lock held, so once an `unsubscribe*` call has returned, the removed
//! handler can no longer run.  Handlers therefore must not call back into the
//! registry.

use greenlight_core::{CorrelationId, InboundEnvelope, ProtocolError};
use tracing::debug;

/// What a handler receives: a classified envelope, or the reason the payload
/// could not be classified.
pub type Decoded = Result<InboundEnvelope, ProtocolError>;

/// A subscription callback.
///
/// The first argument is the correlation id of the delivered payload, when it
/// has a readable one (even a malformed payload may carry it).
pub type Handler = Box<dyn FnMut(Option<CorrelationId>, &Decoded) + Send>;

/// Handle returned by every subscribe call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Identifies the scope that owns a group of subscriptions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OwnerId(pub u64);

/// What a subscription is interested in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Interest {
    Channel(String),
    Correlation(CorrelationId),
    Uncorrelated(String),
}

impl Interest {
    fn accepts(&self, channel: &str, correlation_id: Option<CorrelationId>) -> bool {
        match self {
            Interest::Channel(c) => c == channel,
            Interest::Uncorrelated(c) => c == channel && correlation_id.is_none(),
            Interest::Correlation(_) => false,
        }
    }
}

/// The result of dispatching one inbound payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// Delivered to the one handler awaiting its correlation id.
    Correlated,
    /// Delivered to this many channel handlers.
    Broadcast(usize),
    /// Nobody was listening.
    Dropped,
}

struct Subscription {
    id: SubscriptionId,
    owner: OwnerId,
    interest: Interest,
    handler: Handler,
}

/// The subscription table.
#[derive(Default)]
pub struct DispatchRegistry {
    subscriptions: Vec<Subscription>,
    next_id: u64,
    dropped: u64,
}

impl DispatchRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn insert(&mut self, owner: OwnerId, interest: Interest, handler: Handler) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.subscriptions.push(Subscription {
            id,
            owner,
            interest,
            handler,
        });
        id
    }

    /// Registers `handler` for every envelope on `channel`.
    pub fn subscribe(&mut self, channel: &str, owner: OwnerId, handler: Handler) -> SubscriptionId {
        self.insert(owner, Interest::Channel(channel.to_string()), handler)
    }

    /// Clears every handler on `channel`, then registers `handler`.
    ///
    /// Guarantees at most one live channel handler, whoever registered the
    /// previous ones.  Returns the new id and how many handlers were cleared.
    pub fn subscribe_exclusive(
        &mut self,
        channel: &str,
        owner: OwnerId,
        handler: Handler,
    ) -> (SubscriptionId, usize) {
        let cleared = self.unsubscribe_all(channel);
        if cleared > 0 {
            debug!("cleared {cleared} stale handler(s) on channel '{channel}'");
        }
        (self.subscribe(channel, owner, handler), cleared)
    }

    /// Registers a one-shot `handler` for the response carrying `correlation_id`.
    pub fn await_correlation(
        &mut self,
        correlation_id: CorrelationId,
        owner: OwnerId,
        handler: Handler,
    ) -> SubscriptionId {
        self.insert(owner, Interest::Correlation(correlation_id), handler)
    }

    /// Registers `handler` for envelopes on `channel` that carry no
    /// correlation id.
    pub fn subscribe_uncorrelated(
        &mut self,
        channel: &str,
        owner: OwnerId,
        handler: Handler,
    ) -> SubscriptionId {
        self.insert(owner, Interest::Uncorrelated(channel.to_string()), handler)
    }

    /// Removes one subscription.  Returns `false` if it was already gone.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscriptions.len();
        self.subscriptions.retain(|s| s.id != id);
        self.subscriptions.len() != before
    }

    /// Removes every channel handler on `channel`.
    pub fn unsubscribe_all(&mut self, channel: &str) -> usize {
        let before = self.subscriptions.len();
        self.subscriptions
            .retain(|s| !matches!(&s.interest, Interest::Channel(c) if c == channel));
        before - self.subscriptions.len()
    }

    /// Removes every subscription `owner` created, of any interest.
    pub fn unsubscribe_owner(&mut self, owner: OwnerId) -> usize {
        let before = self.subscriptions.len();
        self.subscriptions.retain(|s| s.owner != owner);
        before - self.subscriptions.len()
    }

    /// Delivers one inbound payload that arrived on `channel`.
    pub fn dispatch(
        &mut self,
        channel: &str,
        correlation_id: Option<CorrelationId>,
        inbound: &Decoded,
    ) -> Delivery {
        if let Some(cid) = correlation_id {
            let awaiting = self
                .subscriptions
                .iter()
                .position(|s| s.interest == Interest::Correlation(cid));
            if let Some(index) = awaiting {
                let mut sub = self.subscriptions.remove(index);
                (sub.handler)(correlation_id, inbound);
                return Delivery::Correlated;
            }
        }

        let mut delivered = 0;
        for sub in self
            .subscriptions
            .iter_mut()
            .filter(|s| s.interest.accepts(channel, correlation_id))
        {
            (sub.handler)(correlation_id, inbound);
            delivered += 1;
        }

        if delivered == 0 {
            self.dropped += 1;
            debug!("no handler for inbound payload on '{channel}' (correlation {correlation_id:?}); dropped");
            Delivery::Dropped
        } else {
            Delivery::Broadcast(delivered)
        }
    }

    /// Number of channel handlers on `channel`.
    pub fn handler_count(&self, channel: &str) -> usize {
        self.subscriptions
            .iter()
            .filter(|s| matches!(&s.interest, Interest::Channel(c) if c == channel))
            .count()
    }

    /// Number of correlation ids still awaiting a response.
    pub fn pending_correlations(&self) -> usize {
        self.subscriptions
            .iter()
            .filter(|s| matches!(s.interest, Interest::Correlation(_)))
            .count()
    }

    /// Number of subscriptions `owner` still holds.
    pub fn owned_by(&self, owner: OwnerId) -> usize {
        self.subscriptions.iter().filter(|s| s.owner == owner).count()
    }

    pub fn len(&self) -> usize {
        self.subscriptions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscriptions.is_empty()
    }

    /// Total payloads dropped because nobody was listening.
    pub fn dropped(&self) -> u64 {
        self.dropped
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use greenlight_core::{InboundMessage, STREAM_CHANNEL};
    use std::sync::{Arc, Mutex};

    const A: OwnerId = OwnerId(1);
    const B: OwnerId = OwnerId(2);

    fn consoles(correlation_id: Option<CorrelationId>) -> Decoded {
        Ok(InboundEnvelope::reply(
            correlation_id,
            InboundMessage::Consoles { data: vec![] },
        ))
    }

    /// A handler that counts its invocations into a shared cell.
    fn counting(counter: &Arc<Mutex<u32>>) -> Handler {
        let counter = Arc::clone(counter);
        Box::new(move |_, _: &Decoded| *counter.lock().unwrap() += 1)
    }

    #[test]
    fn test_channel_handler_receives_every_envelope() {
        // Arrange
        let mut reg = DispatchRegistry::new();
        let hits = Arc::new(Mutex::new(0));
        reg.subscribe(STREAM_CHANNEL, A, counting(&hits));

        // Act
        reg.dispatch(STREAM_CHANNEL, None, &consoles(None));
        let delivery = reg.dispatch(STREAM_CHANNEL, None, &consoles(None));

        // Assert
        assert_eq!(delivery, Delivery::Broadcast(1));
        assert_eq!(*hits.lock().unwrap(), 2);
    }

    #[test]
    fn test_other_channels_are_not_delivered() {
        let mut reg = DispatchRegistry::new();
        let hits = Arc::new(Mutex::new(0));
        reg.subscribe(STREAM_CHANNEL, A, counting(&hits));

        let delivery = reg.dispatch("telemetry", None, &consoles(None));

        assert_eq!(delivery, Delivery::Dropped);
        assert_eq!(*hits.lock().unwrap(), 0);
    }

    #[test]
    fn test_unsubscribed_handler_is_never_invoked() {
        // Arrange
        let mut reg = DispatchRegistry::new();
        let hits = Arc::new(Mutex::new(0));
        let id = reg.subscribe(STREAM_CHANNEL, A, counting(&hits));

        // Act
        assert!(reg.unsubscribe(id));
        let delivery = reg.dispatch(STREAM_CHANNEL, None, &consoles(None));

        // Assert
        assert_eq!(delivery, Delivery::Dropped);
        assert_eq!(*hits.lock().unwrap(), 0);
        assert_eq!(reg.dropped(), 1);
    }

    #[test]
    fn test_unsubscribe_twice_reports_missing() {
        let mut reg = DispatchRegistry::new();
        let id = reg.subscribe(STREAM_CHANNEL, A, Box::new(|_, _: &Decoded| {}));
        assert!(reg.unsubscribe(id));
        assert!(!reg.unsubscribe(id));
    }

    #[test]
    fn test_unsubscribe_all_clears_only_that_channel() {
        let mut reg = DispatchRegistry::new();
        reg.subscribe(STREAM_CHANNEL, A, Box::new(|_, _: &Decoded| {}));
        reg.subscribe(STREAM_CHANNEL, B, Box::new(|_, _: &Decoded| {}));
        reg.subscribe("telemetry", A, Box::new(|_, _: &Decoded| {}));

        assert_eq!(reg.unsubscribe_all(STREAM_CHANNEL), 2);
        assert_eq!(reg.handler_count(STREAM_CHANNEL), 0);
        assert_eq!(reg.handler_count("telemetry"), 1);
    }

    #[test]
    fn test_subscribe_exclusive_replaces_leaked_handler() {
        // Arrange: a previous mount forgot to clean up
        let mut reg = DispatchRegistry::new();
        let old_hits = Arc::new(Mutex::new(0));
        let new_hits = Arc::new(Mutex::new(0));
        reg.subscribe(STREAM_CHANNEL, A, counting(&old_hits));

        // Act
        let (_, cleared) = reg.subscribe_exclusive(STREAM_CHANNEL, B, counting(&new_hits));
        reg.dispatch(STREAM_CHANNEL, None, &consoles(None));

        // Assert: only the new handler fires
        assert_eq!(cleared, 1);
        assert_eq!(*old_hits.lock().unwrap(), 0);
        assert_eq!(*new_hits.lock().unwrap(), 1);
    }

    #[test]
    fn test_correlated_handler_fires_once_and_is_removed() {
        // Arrange
        let mut reg = DispatchRegistry::new();
        let cid = CorrelationId::new();
        let hits = Arc::new(Mutex::new(0));
        reg.await_correlation(cid, A, counting(&hits));

        // Act
        let first = reg.dispatch(STREAM_CHANNEL, Some(cid), &consoles(Some(cid)));
        let second = reg.dispatch(STREAM_CHANNEL, Some(cid), &consoles(Some(cid)));

        // Assert
        assert_eq!(first, Delivery::Correlated);
        assert_eq!(second, Delivery::Dropped);
        assert_eq!(*hits.lock().unwrap(), 1);
        assert_eq!(reg.pending_correlations(), 0);
    }

    #[test]
    fn test_correlated_handler_takes_precedence_over_channel_handler() {
        let mut reg = DispatchRegistry::new();
        let cid = CorrelationId::new();
        let channel_hits = Arc::new(Mutex::new(0));
        let correlated_hits = Arc::new(Mutex::new(0));
        reg.subscribe(STREAM_CHANNEL, A, counting(&channel_hits));
        reg.await_correlation(cid, B, counting(&correlated_hits));

        reg.dispatch(STREAM_CHANNEL, Some(cid), &consoles(Some(cid)));

        assert_eq!(*correlated_hits.lock().unwrap(), 1);
        assert_eq!(*channel_hits.lock().unwrap(), 0);
    }

    #[test]
    fn test_unknown_correlation_falls_back_to_channel_handlers() {
        let mut reg = DispatchRegistry::new();
        let hits = Arc::new(Mutex::new(0));
        reg.subscribe(STREAM_CHANNEL, A, counting(&hits));
        reg.await_correlation(CorrelationId::new(), B, Box::new(|_, _: &Decoded| {}));

        let other = CorrelationId::new();
        let delivery = reg.dispatch(STREAM_CHANNEL, Some(other), &consoles(Some(other)));

        assert_eq!(delivery, Delivery::Broadcast(1));
        assert_eq!(*hits.lock().unwrap(), 1);
        assert_eq!(reg.pending_correlations(), 1);
    }

    #[test]
    fn test_uncorrelated_handler_hears_only_payloads_without_an_id() {
        // Arrange
        let mut reg = DispatchRegistry::new();
        let hits = Arc::new(Mutex::new(0));
        reg.subscribe_uncorrelated(STREAM_CHANNEL, A, counting(&hits));
        let tagged = CorrelationId::new();

        // Act
        let untagged_delivery = reg.dispatch(STREAM_CHANNEL, None, &consoles(None));
        let tagged_delivery = reg.dispatch(STREAM_CHANNEL, Some(tagged), &consoles(Some(tagged)));
        let elsewhere = reg.dispatch("telemetry", None, &consoles(None));

        // Assert: a tagged payload nobody awaits is still dropped
        assert_eq!(untagged_delivery, Delivery::Broadcast(1));
        assert_eq!(tagged_delivery, Delivery::Dropped);
        assert_eq!(elsewhere, Delivery::Dropped);
        assert_eq!(*hits.lock().unwrap(), 1);
        assert_eq!(reg.handler_count(STREAM_CHANNEL), 0);
    }

    #[test]
    fn test_unsubscribe_all_leaves_uncorrelated_handlers() {
        let mut reg = DispatchRegistry::new();
        reg.subscribe(STREAM_CHANNEL, A, Box::new(|_, _: &Decoded| {}));
        reg.subscribe_uncorrelated(STREAM_CHANNEL, B, Box::new(|_, _: &Decoded| {}));

        assert_eq!(reg.unsubscribe_all(STREAM_CHANNEL), 1);
        assert_eq!(reg.owned_by(B), 1);
    }

    #[test]
    fn test_unsubscribe_owner_removes_all_interests_of_that_owner() {
        // Arrange
        let mut reg = DispatchRegistry::new();
        reg.subscribe(STREAM_CHANNEL, A, Box::new(|_, _: &Decoded| {}));
        reg.await_correlation(CorrelationId::new(), A, Box::new(|_, _: &Decoded| {}));
        reg.subscribe(STREAM_CHANNEL, B, Box::new(|_, _: &Decoded| {}));

        // Act
        let removed = reg.unsubscribe_owner(A);

        // Assert
        assert_eq!(removed, 2);
        assert_eq!(reg.owned_by(A), 0);
        assert_eq!(reg.owned_by(B), 1);
    }

    #[test]
    fn test_handler_sees_protocol_errors_with_correlation() {
        let mut reg = DispatchRegistry::new();
        let cid = CorrelationId::new();
        let seen = Arc::new(Mutex::new(None));
        let seen_in_handler = Arc::clone(&seen);
        reg.await_correlation(
            cid,
            A,
            Box::new(move |c, inbound: &Decoded| {
                *seen_in_handler.lock().unwrap() = Some((c, inbound.is_err()));
            }),
        );

        let malformed: Decoded = Err(ProtocolError::MissingKind);
        reg.dispatch(STREAM_CHANNEL, Some(cid), &malformed);

        assert_eq!(*seen.lock().unwrap(), Some((Some(cid), true)));
    }

    #[test]
    fn test_delivery_before_subscription_is_not_replayed() {
        // Arrange: an envelope arrives while nobody listens
        let mut reg = DispatchRegistry::new();
        reg.dispatch(STREAM_CHANNEL, None, &consoles(None));

        // Act: subscribe afterwards
        let hits = Arc::new(Mutex::new(0));
        reg.subscribe(STREAM_CHANNEL, A, counting(&hits));

        // Assert: the earlier envelope is gone for good
        assert_eq!(*hits.lock().unwrap(), 0);
        assert_eq!(reg.dropped(), 1);
    }
}

//! Real-time fan-out hub (mechanics only).
//!
//! The hub owns the registry of live subscribers. Each subscriber gets a
//! bounded outbound queue; the transport side drains it from a dedicated task.
//!
//! ## Delivery
//!
//! - **At-most-once, best-effort**: a subscriber that disconnects mid-broadcast
//!   simply misses the event.
//! - **No cross-subscriber ordering**.
//! - **Failure isolation**: a closed or full queue evicts that subscriber only;
//!   the publisher never sees the failure.
//!
//! ## Locking
//!
//! `publish` snapshots the registry under a read lock and releases it before
//! sending, so subscribe/unsubscribe never wait on delivery. Sends are
//! non-blocking (`try_send`), so a stalled client cannot hold up anyone else.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc::{self, error::TrySendError};
use uuid::Uuid;

use crate::event::{ChangeEvent, GREETING};

pub const DEFAULT_QUEUE_CAPACITY: usize = 64;

/// A serialized message, shared by every subscriber it is sent to.
pub type Frame = Arc<str>;

/// Handle identifying one live subscriber.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubscriberId(Uuid);

impl SubscriberId {
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for SubscriberId {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Display for SubscriberId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// Receiving side of a registration.
///
/// Dropping it closes the queue; the hub notices on the next publish and
/// evicts the subscriber.
#[derive(Debug)]
pub struct Subscription {
    id: SubscriberId,
    receiver: mpsc::Receiver<Frame>,
}

impl Subscription {
    pub fn id(&self) -> SubscriberId {
        self.id
    }

    /// Wait for the next frame. `None` once the hub has dropped this subscriber.
    pub async fn recv(&mut self) -> Option<Frame> {
        self.receiver.recv().await
    }

    pub fn try_recv(&mut self) -> Result<Frame, mpsc::error::TryRecvError> {
        self.receiver.try_recv()
    }

    pub fn into_parts(self) -> (SubscriberId, mpsc::Receiver<Frame>) {
        (self.id, self.receiver)
    }
}

/// Outcome of one publish, for logging and tests. Never an error.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct PublishReport {
    pub delivered: usize,
    pub evicted: usize,
}

/// Concurrent publish/subscribe registry, shared by handle (`Arc<BroadcastHub>`).
#[derive(Debug)]
pub struct BroadcastHub {
    subscribers: RwLock<HashMap<SubscriberId, mpsc::Sender<Frame>>>,
    queue_capacity: usize,
    greeting: Frame,
}

impl Default for BroadcastHub {
    fn default() -> Self {
        Self::new()
    }
}

impl BroadcastHub {
    pub fn new() -> Self {
        Self::with_queue_capacity(DEFAULT_QUEUE_CAPACITY)
    }

    /// `capacity` bounds each subscriber's outbound queue (minimum 1).
    pub fn with_queue_capacity(capacity: usize) -> Self {
        Self {
            subscribers: RwLock::new(HashMap::new()),
            queue_capacity: capacity.max(1),
            greeting: Frame::from(GREETING),
        }
    }

    /// Register a new subscriber.
    ///
    /// The greeting is queued before the subscriber becomes visible to
    /// `publish`, so it is always the first frame received.
    pub fn subscribe(&self) -> Subscription {
        let id = SubscriberId::new();
        let (tx, receiver) = mpsc::channel(self.queue_capacity);

        // Fresh queue with capacity >= 1: cannot be full or closed here.
        let _ = tx.try_send(self.greeting.clone());

        let live = {
            let mut subs = self.subscribers.write().unwrap_or_else(PoisonError::into_inner);
            subs.insert(id, tx);
            subs.len()
        };
        tracing::info!(subscriber_id = %id, subscribers = live, "subscriber connected");

        Subscription { id, receiver }
    }

    /// Remove a subscriber. Removing an unknown id is a no-op; returns whether it was present.
    pub fn unsubscribe(&self, id: SubscriberId) -> bool {
        let (removed, live) = {
            let mut subs = self.subscribers.write().unwrap_or_else(PoisonError::into_inner);
            (subs.remove(&id).is_some(), subs.len())
        };
        if removed {
            tracing::info!(subscriber_id = %id, subscribers = live, "subscriber disconnected");
        }
        removed
    }

    /// Serialize `event` once and offer it to every live subscriber.
    pub fn publish(&self, event: &ChangeEvent) -> PublishReport {
        let frame: Frame = match serde_json::to_string(event) {
            Ok(s) => s.into(),
            Err(e) => {
                tracing::warn!(event_type = event.event_type(), error = %e, "failed to serialize change event");
                return PublishReport::default();
            }
        };
        self.broadcast_frame(event.event_type(), frame)
    }

    fn broadcast_frame(&self, event_type: &str, frame: Frame) -> PublishReport {
        let snapshot: Vec<(SubscriberId, mpsc::Sender<Frame>)> = {
            let subs = self.subscribers.read().unwrap_or_else(PoisonError::into_inner);
            subs.iter().map(|(id, tx)| (*id, tx.clone())).collect()
        };

        tracing::info!(event_type, subscribers = snapshot.len(), "broadcast");

        let mut report = PublishReport::default();
        let mut failed: Vec<SubscriberId> = Vec::new();

        for (id, tx) in snapshot {
            match tx.try_send(frame.clone()) {
                Ok(()) => report.delivered += 1,
                Err(TrySendError::Closed(_)) => {
                    tracing::warn!(subscriber_id = %id, "send failed: connection closed");
                    failed.push(id);
                }
                Err(TrySendError::Full(_)) => {
                    tracing::warn!(subscriber_id = %id, "send failed: outbound queue full");
                    failed.push(id);
                }
            }
        }

        for id in failed {
            if self.unsubscribe(id) {
                report.evicted += 1;
            }
        }

        report
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_subscribed(&self, id: SubscriberId) -> bool {
        self.subscribers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(&id)
    }
}

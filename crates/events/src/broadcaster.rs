//! Per-request event fan-out.
//!
//! [`ProgressBroadcaster`] keeps one bounded channel per attached subscriber
//! and pushes every published event to all channels for the event's request.
//! Delivery is fire-and-forget: a full channel drops that event for that
//! subscriber only, and publishing to a request with no subscribers is a
//! no-op. The work item store stays the source of truth either way.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{PoisonError, RwLock};

use tokio::sync::mpsc;

use docgen_core::types::RequestId;

use crate::event::StreamEvent;

/// Queue depth of one subscriber channel. Events beyond this are dropped
/// for that subscriber; clients recover by polling the status endpoint.
pub const SUBSCRIBER_QUEUE_DEPTH: usize = 100;

/// Identifies one subscriber channel within a request's registry entry.
pub type SubscriberId = u64;

/// The consumer half handed to a subscription session on attach.
pub struct Subscription {
    pub id: SubscriberId,
    pub receiver: mpsc::Receiver<StreamEvent>,
}

/// Registry of live subscriber channels, keyed by request.
///
/// Thread-safe via an interior sync lock; designed to be wrapped in `Arc`
/// and shared across the application. All critical sections are O(1) map
/// operations and never span an await point, so a sync lock is correct here
/// and keeps [`detach`](Self::detach) callable from `Drop` impls.
pub struct ProgressBroadcaster {
    subscribers: RwLock<HashMap<RequestId, HashMap<SubscriberId, mpsc::Sender<StreamEvent>>>>,
    next_subscriber_id: AtomicU64,
}

impl ProgressBroadcaster {
    /// Create a new, empty broadcaster.
    pub fn new() -> Self {
        Self {
            subscribers: RwLock::new(HashMap::new()),
            next_subscriber_id: AtomicU64::new(1),
        }
    }

    /// Register a new subscriber channel for `request_id`.
    ///
    /// Returns the receiver half for the caller's exclusive consumption.
    pub fn attach(&self, request_id: RequestId) -> Subscription {
        let id = self.next_subscriber_id.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = mpsc::channel(SUBSCRIBER_QUEUE_DEPTH);

        let mut registry = self
            .subscribers
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        registry.entry(request_id).or_default().insert(id, tx);

        Subscription { id, receiver: rx }
    }

    /// Remove a subscriber channel.
    ///
    /// When the last subscriber of a request detaches, the request's
    /// registry entry is removed entirely so finished requests leave
    /// nothing behind.
    pub fn detach(&self, request_id: RequestId, subscriber_id: SubscriberId) {
        let mut registry = self
            .subscribers
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(channels) = registry.get_mut(&request_id) {
            channels.remove(&subscriber_id);
            if channels.is_empty() {
                registry.remove(&request_id);
            }
        }
    }

    /// Deliver `event` to every subscriber of `request_id`.
    ///
    /// Per-subscriber `try_send`: a full queue loses this event for that
    /// subscriber only (logged), other subscribers and the publisher are
    /// unaffected. Closed channels are skipped; their entries are removed
    /// when the session detaches.
    pub fn publish(&self, request_id: RequestId, event: StreamEvent) {
        let registry = self
            .subscribers
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        let Some(channels) = registry.get(&request_id) else {
            return;
        };
        for (subscriber_id, sender) in channels {
            match sender.try_send(event.clone()) {
                Ok(()) => {}
                Err(mpsc::error::TrySendError::Full(_)) => {
                    tracing::warn!(
                        request_id = %request_id,
                        subscriber_id,
                        kind = event.kind(),
                        "Subscriber queue full, dropping event",
                    );
                }
                Err(mpsc::error::TrySendError::Closed(_)) => {}
            }
        }
    }

    /// Whether any subscriber is currently attached to `request_id`.
    pub fn has_subscribers(&self, request_id: RequestId) -> bool {
        self.subscribers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(&request_id)
    }

    /// Number of subscribers currently attached to `request_id`.
    pub fn subscriber_count(&self, request_id: RequestId) -> usize {
        self.subscribers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&request_id)
            .map_or(0, HashMap::len)
    }
}

impl Default for ProgressBroadcaster {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

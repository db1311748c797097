//! Progress event fan-out for the docgen service.
//!
//! [`StreamEvent`] is the wire-level event model, [`ProgressBroadcaster`]
//! the per-request subscriber registry, and [`session::event_stream`] the
//! server side of one client's live subscription (replay, relay, heartbeat,
//! guaranteed detach).

pub mod broadcaster;
pub mod event;
pub mod session;

pub use broadcaster::{ProgressBroadcaster, SubscriberId, Subscription, SUBSCRIBER_QUEUE_DEPTH};
pub use event::StreamEvent;
pub use session::{event_stream, EVENT_WAIT_TIMEOUT};

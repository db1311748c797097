//! The server side of one client's live subscription.
//!
//! [`event_stream`] attaches a channel to the broadcaster, replays the
//! caller-supplied initial events (connection handshake and status
//! snapshot), then relays channel events to the client. Silence longer than
//! [`EVENT_WAIT_TIMEOUT`] produces a synthetic heartbeat; a terminal event
//! is delivered and then ends the stream. The channel is attached before
//! any replay event is yielded, so nothing published in between is missed.
//!
//! Detach is guaranteed on every exit path, including the transport
//! dropping the stream on client disconnect: the channel registration is
//! released by a guard in the stream's state.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use futures::Stream;
use tokio::sync::mpsc;

use docgen_core::types::RequestId;

use crate::broadcaster::{ProgressBroadcaster, SubscriberId};
use crate::event::StreamEvent;

/// How long the session waits for an event before emitting a heartbeat.
pub const EVENT_WAIT_TIMEOUT: Duration = Duration::from_secs(15);

/// Releases the broadcaster registration when the session state is dropped,
/// whether the stream ended normally or the client disconnected mid-stream.
struct DetachGuard {
    broadcaster: Arc<ProgressBroadcaster>,
    request_id: RequestId,
    subscriber_id: SubscriberId,
}

impl Drop for DetachGuard {
    fn drop(&mut self) {
        self.broadcaster.detach(self.request_id, self.subscriber_id);
    }
}

struct SessionState {
    receiver: mpsc::Receiver<StreamEvent>,
    replay: VecDeque<StreamEvent>,
    finished: bool,
    _guard: DetachGuard,
}

/// Open a subscription session for `request_id`.
///
/// `initial` events (typically `connected` plus a `status` snapshot taken
/// from the store at attach time) are yielded first, then events relayed
/// from the broadcaster. The stream ends after delivering a terminal event
/// or when the channel closes; heartbeats alone never end it.
pub fn event_stream(
    broadcaster: Arc<ProgressBroadcaster>,
    request_id: RequestId,
    initial: Vec<StreamEvent>,
) -> impl Stream<Item = StreamEvent> {
    let subscription = broadcaster.attach(request_id);
    let state = SessionState {
        receiver: subscription.receiver,
        replay: initial.into(),
        finished: false,
        _guard: DetachGuard {
            broadcaster,
            request_id,
            subscriber_id: subscription.id,
        },
    };

    futures::stream::unfold(state, |mut state| async move {
        if state.finished {
            return None;
        }

        if let Some(event) = state.replay.pop_front() {
            return Some((event, state));
        }

        match tokio::time::timeout(EVENT_WAIT_TIMEOUT, state.receiver.recv()).await {
            Ok(Some(event)) => {
                if event.is_terminal() {
                    state.finished = true;
                }
                Some((event, state))
            }
            // Channel closed: no more events can ever arrive.
            Ok(None) => None,
            // Silence: keep the connection alive and wait again.
            Err(_) => Some((StreamEvent::heartbeat(), state)),
        }
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;

    fn request_id() -> RequestId {
        uuid::Uuid::new_v4()
    }

    #[tokio::test]
    async fn replays_initial_events_before_relaying() {
        let broadcaster = Arc::new(ProgressBroadcaster::new());
        let id = request_id();
        let mut stream = Box::pin(event_stream(
            Arc::clone(&broadcaster),
            id,
            vec![StreamEvent::connected(id), StreamEvent::progress(2, 10, "snapshot")],
        ));

        broadcaster.publish(id, StreamEvent::progress(3, 10, "live"));

        assert_eq!(stream.next().await.expect("event").kind(), "connected");
        assert_eq!(stream.next().await.expect("event").kind(), "progress");
        match stream.next().await.expect("event") {
            StreamEvent::Progress { step, .. } => assert_eq!(step, 3),
            other => panic!("expected live progress, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn terminal_event_is_delivered_then_stream_ends() {
        let broadcaster = Arc::new(ProgressBroadcaster::new());
        let id = request_id();
        let mut stream = Box::pin(event_stream(Arc::clone(&broadcaster), id, vec![]));

        broadcaster.publish(id, StreamEvent::complete());

        assert_eq!(stream.next().await.expect("event").kind(), "complete");
        assert!(stream.next().await.is_none());
        // The session released its channel on the way out.
        assert!(!broadcaster.has_subscribers(id));
    }

    #[tokio::test(start_paused = true)]
    async fn silence_produces_heartbeats_without_ending_the_session() {
        let broadcaster = Arc::new(ProgressBroadcaster::new());
        let id = request_id();
        let mut stream = Box::pin(event_stream(Arc::clone(&broadcaster), id, vec![]));

        // No events published: the first two items must be heartbeats.
        assert_eq!(stream.next().await.expect("event").kind(), "heartbeat");
        assert_eq!(stream.next().await.expect("event").kind(), "heartbeat");

        // The session is still attached and still relays real events.
        broadcaster.publish(id, StreamEvent::progress(7, 10, "Generating document with AI..."));
        assert_eq!(stream.next().await.expect("event").kind(), "progress");
    }

    #[tokio::test]
    async fn dropping_the_stream_detaches_the_subscriber() {
        let broadcaster = Arc::new(ProgressBroadcaster::new());
        let id = request_id();
        let stream = Box::pin(event_stream(Arc::clone(&broadcaster), id, vec![]));
        assert!(broadcaster.has_subscribers(id));

        // Client disconnect: the transport just drops the stream.
        drop(stream);
        assert!(!broadcaster.has_subscribers(id));
    }

    #[tokio::test]
    async fn error_event_also_ends_the_session() {
        let broadcaster = Arc::new(ProgressBroadcaster::new());
        let id = request_id();
        let mut stream = Box::pin(event_stream(Arc::clone(&broadcaster), id, vec![]));

        broadcaster.publish(id, StreamEvent::error("step 3 exploded"));

        match stream.next().await.expect("event") {
            StreamEvent::Error { error, .. } => assert_eq!(error, "step 3 exploded"),
            other => panic!("expected error event, got {other:?}"),
        }
        assert!(stream.next().await.is_none());
    }

    #[tokio::test]
    async fn two_sessions_consume_independently() {
        let broadcaster = Arc::new(ProgressBroadcaster::new());
        let id = request_id();
        let mut fast = Box::pin(event_stream(Arc::clone(&broadcaster), id, vec![]));
        let slow = Box::pin(event_stream(Arc::clone(&broadcaster), id, vec![]));

        for step in 1..=3 {
            broadcaster.publish(id, StreamEvent::progress(step, 10, "step"));
        }
        broadcaster.publish(id, StreamEvent::complete());

        // The fast consumer drains to completion while the slow one never polls.
        let mut kinds = Vec::new();
        while let Some(event) = fast.next().await {
            kinds.push(event.kind());
        }
        assert_eq!(kinds, ["progress", "progress", "progress", "complete"]);

        // The slow session still holds its registration until dropped.
        assert!(broadcaster.has_subscribers(id));
        drop(slow);
        assert!(!broadcaster.has_subscribers(id));
    }
}

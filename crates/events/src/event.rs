//! Lifecycle events pushed to stream subscribers.
//!
//! Events are transient: they are relayed to whoever is attached at publish
//! time and never persisted. The work item store remains the authoritative
//! state for pollers and late subscribers.

use chrono::Utc;
use serde::Serialize;

use docgen_core::generation::{GenerationStatus, RequestStatus};
use docgen_core::types::{RequestId, Timestamp};

/// One event on a request's progress stream.
///
/// Serialized untagged so each variant becomes exactly its wire payload;
/// the event kind travels out-of-band in the SSE `event:` field.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum StreamEvent {
    /// Handshake, emitted once when a subscriber attaches.
    Connected {
        request_id: RequestId,
        timestamp: Timestamp,
    },
    /// Snapshot of the work item at attach time, so late joiners are not
    /// blind to progress made before they connected.
    Status {
        status: RequestStatus,
        step: u32,
        total: u32,
        message: String,
    },
    /// One processing step has started.
    Progress {
        step: u32,
        total: u32,
        message: String,
        timestamp: Timestamp,
    },
    /// Terminal: the run finished successfully.
    Complete {
        status: RequestStatus,
        timestamp: Timestamp,
    },
    /// Terminal: the run failed.
    Error { error: String, timestamp: Timestamp },
    /// Synthetic keep-alive emitted by the session during silence.
    Heartbeat { timestamp: Timestamp },
}

impl StreamEvent {
    pub fn connected(request_id: RequestId) -> Self {
        Self::Connected {
            request_id,
            timestamp: Utc::now(),
        }
    }

    /// Build the attach-time snapshot event from a work item record.
    pub fn snapshot(status: &GenerationStatus) -> Self {
        Self::Status {
            status: status.status,
            step: status.current_step,
            total: status.total_steps,
            message: status.message.clone(),
        }
    }

    pub fn progress(step: u32, total: u32, message: impl Into<String>) -> Self {
        Self::Progress {
            step,
            total,
            message: message.into(),
            timestamp: Utc::now(),
        }
    }

    pub fn complete() -> Self {
        Self::Complete {
            status: RequestStatus::Completed,
            timestamp: Utc::now(),
        }
    }

    pub fn error(error: impl Into<String>) -> Self {
        Self::Error {
            error: error.into(),
            timestamp: Utc::now(),
        }
    }

    pub fn heartbeat() -> Self {
        Self::Heartbeat {
            timestamp: Utc::now(),
        }
    }

    /// The SSE event name for this variant.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Connected { .. } => "connected",
            Self::Status { .. } => "status",
            Self::Progress { .. } => "progress",
            Self::Complete { .. } => "complete",
            Self::Error { .. } => "error",
            Self::Heartbeat { .. } => "heartbeat",
        }
    }

    /// Terminal events end the subscription session that delivers them.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Complete { .. } | Self::Error { .. })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_match_wire_names() {
        assert_eq!(StreamEvent::connected(uuid::Uuid::new_v4()).kind(), "connected");
        assert_eq!(StreamEvent::progress(1, 10, "msg").kind(), "progress");
        assert_eq!(StreamEvent::complete().kind(), "complete");
        assert_eq!(StreamEvent::error("boom").kind(), "error");
        assert_eq!(StreamEvent::heartbeat().kind(), "heartbeat");
    }

    #[test]
    fn only_complete_and_error_are_terminal() {
        assert!(StreamEvent::complete().is_terminal());
        assert!(StreamEvent::error("boom").is_terminal());
        assert!(!StreamEvent::progress(1, 10, "msg").is_terminal());
        assert!(!StreamEvent::heartbeat().is_terminal());
        assert!(!StreamEvent::connected(uuid::Uuid::new_v4()).is_terminal());
    }

    #[test]
    fn progress_payload_shape() {
        let json = serde_json::to_value(StreamEvent::progress(3, 10, "Parsing Word documents..."))
            .unwrap();
        assert_eq!(json["step"], 3);
        assert_eq!(json["total"], 10);
        assert_eq!(json["message"], "Parsing Word documents...");
        assert!(json["timestamp"].is_string());
        // Untagged: no enum wrapper key.
        assert!(json.get("Progress").is_none());
    }

    #[test]
    fn complete_payload_carries_completed_status() {
        let json = serde_json::to_value(StreamEvent::complete()).unwrap();
        assert_eq!(json["status"], "completed");
        assert!(json["timestamp"].is_string());
    }

    #[test]
    fn snapshot_mirrors_the_work_item() {
        let record = GenerationStatus {
            request_id: uuid::Uuid::new_v4(),
            status: RequestStatus::Processing,
            current_step: 5,
            total_steps: 10,
            message: "Analyzing document structure...".to_string(),
            error: None,
            completed_at: None,
        };
        let json = serde_json::to_value(StreamEvent::snapshot(&record)).unwrap();
        assert_eq!(json["status"], "processing");
        assert_eq!(json["step"], 5);
        assert_eq!(json["total"], 10);
        assert_eq!(json["message"], "Analyzing document structure...");
    }
}

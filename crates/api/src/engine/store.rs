//! In-memory work item store.
//!
//! The authoritative table of request ID to progress record. Entries are
//! created at request acceptance and mutated only by that request's executor
//! run (single writer per item); status polls and stream attaches read
//! concurrently. Items are never deleted within the process lifetime.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use docgen_core::generation::{GenerationStatus, RequestStatus};
use docgen_core::steps::{ACCEPTED_MESSAGE, TOTAL_STEPS};
use docgen_core::types::RequestId;

/// Thread-safe request status table.
///
/// All operations are O(1) map accesses under a sync lock, never held
/// across an await point.
pub struct RequestStore {
    items: RwLock<HashMap<RequestId, GenerationStatus>>,
}

impl RequestStore {
    /// Create a new, empty store.
    pub fn new() -> Self {
        Self {
            items: RwLock::new(HashMap::new()),
        }
    }

    /// Allocate a fresh request ID and insert its initial record
    /// (`processing`, step 0). Memory-only: no failure path.
    pub fn create(&self) -> RequestId {
        let request_id = uuid::Uuid::new_v4();
        let record = GenerationStatus {
            request_id,
            status: RequestStatus::Processing,
            current_step: 0,
            total_steps: TOTAL_STEPS,
            message: ACCEPTED_MESSAGE.to_string(),
            error: None,
            completed_at: None,
        };
        self.items
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(request_id, record);
        request_id
    }

    /// Look up the current record for a request.
    ///
    /// `None` means the ID is unknown; that is a valid outcome, not an
    /// error.
    pub fn get(&self, request_id: &RequestId) -> Option<GenerationStatus> {
        self.items
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(request_id)
            .cloned()
    }

    /// Mutate a record in place.
    ///
    /// Only the executor run for `request_id` calls this; there are no
    /// concurrent writers for the same item.
    pub fn update(&self, request_id: &RequestId, apply: impl FnOnce(&mut GenerationStatus)) {
        let mut items = self.items.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(record) = items.get_mut(request_id) {
            apply(record);
        }
    }
}

impl Default for RequestStore {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

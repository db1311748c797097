/// Generation requests are keyed by opaque v4 UUIDs, never reused.
pub type RequestId = uuid::Uuid;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

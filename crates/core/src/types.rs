/// Fossil and user identifiers are opaque UUIDs issued by the remote store.
pub type FossilId = uuid::Uuid;

/// Identifier of an authenticated user.
pub type UserId = uuid::Uuid;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

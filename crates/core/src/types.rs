/// Datastore-assigned project identifier.
pub type ProjectId = uuid::Uuid;

/// Identity-provider user identifier.
pub type UserId = uuid::Uuid;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Blog entities (posts, pingbacks) are keyed by UUID.
pub type DbId = uuid::Uuid;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

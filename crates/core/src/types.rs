/// All database primary keys are PostgreSQL BIGSERIAL.
pub type DbId = i64;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Project identifiers as they travel through filters and snapshots.
///
/// Stored as BIGSERIAL, but filter payloads address projects by string id.
pub type ProjectId = String;

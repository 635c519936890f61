/// Jobs are keyed by an opaque string id (UUID v4 when minted by the gateway).
pub type JobId = String;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Mint a fresh, process-unique job id.
pub fn new_job_id() -> JobId {
    uuid::Uuid::new_v4().to_string()
}

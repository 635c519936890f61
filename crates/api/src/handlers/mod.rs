pub mod callbacks;
pub mod jobs;

use gateway_core::error::CoreError;
use gateway_core::job::JobRecord;

use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// Fetch a job snapshot or fail with `NotFound`.
pub(crate) async fn find_job(state: &AppState, job_id: &str) -> AppResult<JobRecord> {
    state
        .store
        .get(job_id)
        .await
        .ok_or_else(|| AppError::Core(CoreError::job_not_found(job_id)))
}

//! Route definitions for submission and job queries.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::jobs;
use crate::state::AppState;

/// ```text
/// POST   /submit              -> submit_job
/// GET    /status/{job_id}     -> get_status
/// GET    /results/{job_id}    -> get_results
/// GET    /jobs/{job_id}       -> get_job
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/submit", post(jobs::submit_job))
        .route("/status/{job_id}", get(jobs::get_status))
        .route("/results/{job_id}", get(jobs::get_results))
        .route("/jobs/{job_id}", get(jobs::get_job))
}

pub mod callbacks;
pub mod health;
pub mod jobs;

use axum::Router;

use crate::state::AppState;

/// Build the gateway route tree.
///
/// Routes are mounted at the root because the web client and the AutoML
/// core address them there.
///
/// ```text
/// /health                    service health and job totals
///
/// /submit                    submit a job (multipart, POST)
/// /status/{job_id}           status query
/// /results/{job_id}          results query
/// /jobs/{job_id}             full job record
///
/// /update-status             worker status callback (POST)
/// /complete                  worker results callback (POST)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(jobs::router())
        .merge(callbacks::router())
}

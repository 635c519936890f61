//! Callback endpoints the AutoML core uses to report on jobs.
//!
//! Unknown job ids are rejected with 404 so the worker can tell it is
//! reporting on a job the gateway never issued. No record is created.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;

use gateway_automl::{CompleteJobRequest, UpdateStatusRequest};
use gateway_core::job::JobStatusUpdate;
use gateway_core::submission::validate_progress;

use crate::error::AppResult;
use crate::handlers::find_job;
use crate::state::AppState;

/// Acknowledgement returned to the worker.
#[derive(Debug, Serialize)]
pub struct CallbackAck {
    pub status: &'static str,
}

/// POST /update-status
///
/// Apply a reported status/progress/message triple. An unknown job is a
/// 404 even when the rest of the report is invalid.
pub async fn update_status(
    State(state): State<AppState>,
    body: Result<Json<UpdateStatusRequest>, JsonRejection>,
) -> AppResult<impl IntoResponse> {
    let Json(input) = body?;
    find_job(&state, &input.job_id).await?;

    let progress = validate_progress(input.progress)?;
    let update = JobStatusUpdate::new(input.status, progress, input.message);

    let job = state.store.update_status(&input.job_id, update).await?;

    tracing::info!(
        job_id = %job.id,
        status = %job.status,
        progress = job.progress,
        "Job status reported",
    );

    Ok(Json(CallbackAck { status: "updated" }))
}

/// POST /complete
///
/// Attach final results; the job becomes `completed` at 100%.
pub async fn complete_job(
    State(state): State<AppState>,
    body: Result<Json<CompleteJobRequest>, JsonRejection>,
) -> AppResult<impl IntoResponse> {
    let Json(input) = body?;
    let job = state
        .store
        .set_results(&input.job_id, input.results)
        .await?;

    tracing::info!(job_id = %job.id, "Job completed");

    Ok(Json(CallbackAck { status: "completed" }))
}

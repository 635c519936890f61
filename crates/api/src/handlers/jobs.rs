//! Handlers for job submission and the read-only query surface.

use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;

use gateway_core::error::CoreError;
use gateway_core::submission::{parse_config, DatasetFormat, JobSubmission};
use gateway_core::types::JobId;

use crate::error::{AppError, AppResult};
use crate::handlers::find_job;
use crate::state::AppState;

/// Response body of a successful submission.
#[derive(Debug, Serialize)]
pub struct SubmitResponse {
    pub job_id: JobId,
}

// ---------------------------------------------------------------------------
// Submission form
// ---------------------------------------------------------------------------

/// Raw multipart fields of a submission, before validation.
#[derive(Default)]
struct SubmitForm {
    dataset: Option<Vec<u8>>,
    dataset_format: Option<String>,
    config: Option<String>,
}

impl SubmitForm {
    async fn read(mut multipart: Multipart) -> AppResult<Self> {
        let mut form = SubmitForm::default();
        while let Some(field) = multipart.next_field().await? {
            let name = field.name().unwrap_or_default().to_string();
            match name.as_str() {
                "dataset" => form.dataset = Some(field.bytes().await?.to_vec()),
                "dataset_format" => form.dataset_format = Some(field.text().await?),
                "config" => form.config = Some(field.text().await?),
                other => tracing::debug!(field = other, "Ignoring unknown multipart field"),
            }
        }
        Ok(form)
    }

    fn into_submission(self) -> AppResult<JobSubmission> {
        let dataset = self
            .dataset
            .ok_or_else(|| AppError::BadRequest("Failed to read dataset file".to_string()))?;
        let format: DatasetFormat = self
            .dataset_format
            .ok_or_else(|| CoreError::Validation("dataset_format is required".to_string()))?
            .parse()?;
        let config = parse_config(self.config.as_deref().unwrap_or_default())?;
        Ok(JobSubmission::new(dataset, format, config)?)
    }
}

// ---------------------------------------------------------------------------
// Submit
// ---------------------------------------------------------------------------

/// POST /submit
///
/// Accept a multipart submission (`dataset` file, `dataset_format`,
/// `config` JSON). Returns 202 with the new job id; forwarding to the
/// AutoML core happens in the background.
pub async fn submit_job(
    State(state): State<AppState>,
    multipart: Multipart,
) -> AppResult<impl IntoResponse> {
    let submission = SubmitForm::read(multipart).await?.into_submission()?;

    let job = state.store.create().await;
    tracing::info!(
        job_id = %job.id,
        dataset_format = %submission.format,
        dataset_bytes = submission.dataset.len(),
        "Job submitted",
    );

    state.dispatcher.dispatch(job.id.clone(), submission);

    Ok((StatusCode::ACCEPTED, Json(SubmitResponse { job_id: job.id })))
}

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

/// GET /status/{job_id}
pub async fn get_status(
    State(state): State<AppState>,
    Path(job_id): Path<JobId>,
) -> AppResult<impl IntoResponse> {
    let job = find_job(&state, &job_id).await?;
    Ok(Json(job.status_view()))
}

/// GET /results/{job_id}
///
/// 400 `NOT_READY` until the job has completed; never returns partial data.
pub async fn get_results(
    State(state): State<AppState>,
    Path(job_id): Path<JobId>,
) -> AppResult<impl IntoResponse> {
    let job = find_job(&state, &job_id).await?;
    let results = job.results_view()?;
    Ok(Json(results))
}

/// GET /jobs/{job_id}
///
/// The full record, timestamps and results included.
pub async fn get_job(
    State(state): State<AppState>,
    Path(job_id): Path<JobId>,
) -> AppResult<impl IntoResponse> {
    let job = find_job(&state, &job_id).await?;
    Ok(Json(job))
}

//! JSON bodies exchanged with the AutoML core.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use serde::{Deserialize, Serialize};

use gateway_core::job::{JobResults, JobStatus};
use gateway_core::submission::{DatasetFormat, JobConfig, JobSubmission};
use gateway_core::types::JobId;

/// Body of `POST {worker}/process`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessJobRequest {
    pub job_id: JobId,
    /// Dataset bytes, standard base64.
    pub dataset: String,
    pub dataset_format: DatasetFormat,
    pub config: JobConfig,
}

impl ProcessJobRequest {
    /// Build the forwarding payload for a validated submission.
    pub fn encode(job_id: impl Into<JobId>, submission: &JobSubmission) -> Self {
        Self {
            job_id: job_id.into(),
            dataset: BASE64.encode(&submission.dataset),
            dataset_format: submission.format,
            config: submission.config.clone(),
        }
    }

    /// Decode the dataset back into raw bytes.
    pub fn dataset_bytes(&self) -> Result<Vec<u8>, base64::DecodeError> {
        BASE64.decode(&self.dataset)
    }
}

/// Body of the worker's `POST /update-status` callback.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateStatusRequest {
    pub job_id: JobId,
    pub status: JobStatus,
    /// Validated to `0..=100` by the gateway; kept wide so out-of-range
    /// values surface as a validation error rather than a decode error.
    #[serde(default)]
    pub progress: i64,
    #[serde(default)]
    pub message: String,
}

/// Body of the worker's `POST /complete` callback.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompleteJobRequest {
    pub job_id: JobId,
    pub results: JobResults,
}

//! Job record, lifecycle state machine, and result payloads.
//!
//! A job moves `pending -> running -> {completed | failed}`. The record
//! enforces one invariant regardless of transition policy: `results` is
//! present if and only if the status is `completed`. Every mutator checks
//! its preconditions before touching any field, so a rejected update leaves
//! the record exactly as it was.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::CoreError;
use crate::types::{JobId, Timestamp};

/// Progress reported once a job has results.
pub const PROGRESS_COMPLETE: u8 = 100;

/// Message recorded when the dispatcher starts forwarding a job.
pub const MSG_PROCESSING: &str = "Processing job...";

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

/// Job execution status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Pending,
    Running,
    Completed,
    Failed,
}

impl JobStatus {
    pub const ALL: [JobStatus; 4] = [
        JobStatus::Pending,
        JobStatus::Running,
        JobStatus::Completed,
        JobStatus::Failed,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            JobStatus::Pending => "pending",
            JobStatus::Running => "running",
            JobStatus::Completed => "completed",
            JobStatus::Failed => "failed",
        }
    }

    /// `completed` and `failed` have no outgoing transitions.
    pub fn is_terminal(self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }

    /// Whether the lifecycle defines a move from `self` to `next`.
    ///
    /// Staying in a non-terminal state is allowed (progress updates).
    /// `pending` may jump straight to a terminal state because a fast worker
    /// can report before the dispatcher's `running` write is observed.
    pub fn can_transition_to(self, next: JobStatus) -> bool {
        match self {
            JobStatus::Pending => true,
            JobStatus::Running => next != JobStatus::Pending,
            JobStatus::Completed | JobStatus::Failed => false,
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How strictly the store polices status transitions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TransitionPolicy {
    /// Any reported status is applied in arrival order; last write wins.
    #[default]
    Permissive,
    /// Transitions the lifecycle does not define are rejected with
    /// [`CoreError::Conflict`].
    Strict,
}

impl TransitionPolicy {
    pub fn check(self, from: JobStatus, to: JobStatus) -> Result<(), CoreError> {
        if self == TransitionPolicy::Strict && !from.can_transition_to(to) {
            return Err(CoreError::Conflict(format!(
                "Illegal job transition from '{from}' to '{to}'"
            )));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Results
// ---------------------------------------------------------------------------

// The worker serializes NaN and missing values as `null`. Optional
// collections treat `null` the same as an absent field.

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Features whose importance came back `null` are left out.
fn importance_scores<'de, D>(deserializer: D) -> Result<BTreeMap<String, f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let scores: Option<BTreeMap<String, Option<f64>>> = Option::deserialize(deserializer)?;
    Ok(scores
        .unwrap_or_default()
        .into_iter()
        .filter_map(|(feature, score)| score.map(|score| (feature, score)))
        .collect())
}

/// Winning model descriptor reported by the worker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BestModel {
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub hyperparameters: serde_json::Map<String, serde_json::Value>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub selected_features: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelMetrics {
    pub train_score: f64,
    pub validation_score: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub test_score: Option<f64>,
}

/// One step of the hyperparameter search, in the order it ran.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingHistoryEntry {
    pub iteration: u32,
    pub score: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub config: serde_json::Map<String, serde_json::Value>,
}

/// Final payload of a completed job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobResults {
    pub best_model: BestModel,
    pub metrics: ModelMetrics,
    #[serde(default, deserialize_with = "importance_scores")]
    pub feature_importance: BTreeMap<String, f64>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub training_history: Vec<TrainingHistoryEntry>,
}

// ---------------------------------------------------------------------------
// Record
// ---------------------------------------------------------------------------

/// A status/progress/message triple reported against a job.
#[derive(Debug, Clone, PartialEq)]
pub struct JobStatusUpdate {
    pub status: JobStatus,
    pub progress: u8,
    pub message: String,
}

impl JobStatusUpdate {
    pub fn new(status: JobStatus, progress: u8, message: impl Into<String>) -> Self {
        Self {
            status,
            progress,
            message: message.into(),
        }
    }
}

/// One submitted job and its evolving state.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JobRecord {
    #[serde(rename = "job_id")]
    pub id: JobId,
    pub status: JobStatus,
    pub progress: u8,
    pub message: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub results: Option<JobResults>,
}

impl JobRecord {
    /// A fresh `pending` record with zero progress.
    pub fn new(id: JobId) -> Self {
        let now = chrono::Utc::now();
        Self {
            id,
            status: JobStatus::Pending,
            progress: 0,
            message: String::new(),
            created_at: now,
            updated_at: now,
            results: None,
        }
    }

    /// Apply a reported status triple.
    ///
    /// `completed` cannot be reported this way: a completed record must
    /// carry results, which only [`JobRecord::complete`] supplies. Moving
    /// away from `completed` (permissive policy) drops the stale results.
    pub fn apply_update(
        &mut self,
        update: JobStatusUpdate,
        policy: TransitionPolicy,
    ) -> Result<(), CoreError> {
        if update.status == JobStatus::Completed {
            return Err(CoreError::Validation(
                "Status 'completed' must be reported together with results".to_string(),
            ));
        }
        policy.check(self.status, update.status)?;

        self.status = update.status;
        self.progress = update.progress;
        self.message = update.message;
        self.results = None;
        self.touch();
        Ok(())
    }

    /// Attach final results; forces `completed` at full progress.
    pub fn complete(
        &mut self,
        results: JobResults,
        policy: TransitionPolicy,
    ) -> Result<(), CoreError> {
        policy.check(self.status, JobStatus::Completed)?;

        self.status = JobStatus::Completed;
        self.progress = PROGRESS_COMPLETE;
        self.results = Some(results);
        self.touch();
        Ok(())
    }

    /// Mark the job failed with a reason. Progress is left as it was.
    pub fn fail(
        &mut self,
        message: impl Into<String>,
        policy: TransitionPolicy,
    ) -> Result<(), CoreError> {
        policy.check(self.status, JobStatus::Failed)?;

        self.status = JobStatus::Failed;
        self.message = message.into();
        self.results = None;
        self.touch();
        Ok(())
    }

    /// Whether the results/status invariant holds.
    pub fn is_consistent(&self) -> bool {
        (self.status == JobStatus::Completed) == self.results.is_some()
            && self.updated_at >= self.created_at
    }

    pub fn status_view(&self) -> JobStatusView {
        JobStatusView {
            job_id: self.id.clone(),
            status: self.status,
            progress: self.progress,
            message: self.message.clone(),
        }
    }

    /// Results of a completed job.
    ///
    /// `NotReady` while the job is still in flight or failed; `Internal` if
    /// the record claims completion without results.
    pub fn results_view(&self) -> Result<JobResultsView, CoreError> {
        if self.status != JobStatus::Completed {
            return Err(CoreError::NotReady("Job is not completed yet".to_string()));
        }
        let results = self.results.as_ref().ok_or_else(|| {
            CoreError::Internal(format!("Job {} is completed but has no results", self.id))
        })?;

        Ok(JobResultsView {
            job_id: self.id.clone(),
            status: self.status,
            best_model: results.best_model.clone(),
            metrics: results.metrics.clone(),
            feature_importance: results.feature_importance.clone(),
            training_history: results.training_history.clone(),
        })
    }

    /// `updated_at` never moves backwards past `created_at`, even if the
    /// wall clock does.
    fn touch(&mut self) {
        self.updated_at = chrono::Utc::now().max(self.created_at);
    }
}

/// Response body of the status query.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JobStatusView {
    pub job_id: JobId,
    pub status: JobStatus,
    pub progress: u8,
    pub message: String,
}

/// Response body of the results query.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JobResultsView {
    pub job_id: JobId,
    pub status: JobStatus,
    pub best_model: BestModel,
    pub metrics: ModelMetrics,
    pub feature_importance: BTreeMap<String, f64>,
    pub training_history: Vec<TrainingHistoryEntry>,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

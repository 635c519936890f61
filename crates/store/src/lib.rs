//! In-memory job store.
//!
//! The single source of truth for job state. One reader/writer lock guards
//! the whole map: reads run concurrently with each other, every mutation is
//! exclusive and applies all of its field writes before the lock is
//! released. Readers get cloned snapshots, never references into the map.
//!
//! Records live for the lifetime of the store; there is no eviction.

use std::collections::hash_map::Entry;
use std::collections::HashMap;

use serde::Serialize;
use tokio::sync::RwLock;

use gateway_core::error::CoreError;
use gateway_core::job::{JobRecord, JobResults, JobStatus, JobStatusUpdate, TransitionPolicy};
use gateway_core::types::{new_job_id, JobId};

/// Job totals per status, as reported by the health endpoint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatusCounts {
    pub total: usize,
    pub pending: usize,
    pub running: usize,
    pub completed: usize,
    pub failed: usize,
}

/// Concurrency-safe keyed collection of [`JobRecord`]s.
///
/// Designed to be wrapped in `Arc` and injected into every component that
/// reads or writes job state.
pub struct JobStore {
    jobs: RwLock<HashMap<JobId, JobRecord>>,
    policy: TransitionPolicy,
}

impl JobStore {
    /// Create an empty store with the permissive (last-write-wins) policy.
    pub fn new() -> Self {
        Self::with_policy(TransitionPolicy::default())
    }

    pub fn with_policy(policy: TransitionPolicy) -> Self {
        Self {
            jobs: RwLock::new(HashMap::new()),
            policy,
        }
    }

    /// Insert a new `pending` job under a freshly minted id.
    pub async fn create(&self) -> JobRecord {
        let mut jobs = self.jobs.write().await;
        loop {
            if let Entry::Vacant(slot) = jobs.entry(new_job_id()) {
                let record = JobRecord::new(slot.key().clone());
                slot.insert(record.clone());
                tracing::debug!(job_id = %record.id, "Job created");
                return record;
            }
        }
    }

    /// Insert a new `pending` job under a caller-chosen id.
    ///
    /// An id that is already present is rejected with
    /// [`CoreError::Conflict`]; the existing record is left untouched.
    pub async fn create_with_id(&self, id: impl Into<JobId>) -> Result<JobRecord, CoreError> {
        let id = id.into();
        let mut jobs = self.jobs.write().await;
        match jobs.entry(id) {
            Entry::Occupied(existing) => Err(CoreError::Conflict(format!(
                "Job with id {} already exists",
                existing.key()
            ))),
            Entry::Vacant(slot) => {
                let record = JobRecord::new(slot.key().clone());
                slot.insert(record.clone());
                tracing::debug!(job_id = %record.id, "Job created");
                Ok(record)
            }
        }
    }

    /// Snapshot of a job's current state.
    pub async fn get(&self, id: &str) -> Option<JobRecord> {
        self.jobs.read().await.get(id).cloned()
    }

    /// Apply a reported status/progress/message triple.
    pub async fn update_status(
        &self,
        id: &str,
        update: JobStatusUpdate,
    ) -> Result<JobRecord, CoreError> {
        let policy = self.policy;
        self.mutate(id, |job| job.apply_update(update, policy)).await
    }

    /// Attach final results and mark the job `completed` at 100%.
    pub async fn set_results(&self, id: &str, results: JobResults) -> Result<JobRecord, CoreError> {
        let policy = self.policy;
        self.mutate(id, |job| job.complete(results, policy)).await
    }

    /// Mark the job `failed` with a reason.
    pub async fn set_failed(
        &self,
        id: &str,
        message: impl Into<String>,
    ) -> Result<JobRecord, CoreError> {
        let policy = self.policy;
        let message = message.into();
        self.mutate(id, |job| job.fail(message, policy)).await
    }

    pub async fn len(&self) -> usize {
        self.jobs.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.jobs.read().await.is_empty()
    }

    pub async fn status_counts(&self) -> StatusCounts {
        let jobs = self.jobs.read().await;
        let mut counts = StatusCounts {
            total: jobs.len(),
            ..StatusCounts::default()
        };
        for job in jobs.values() {
            match job.status {
                JobStatus::Pending => counts.pending += 1,
                JobStatus::Running => counts.running += 1,
                JobStatus::Completed => counts.completed += 1,
                JobStatus::Failed => counts.failed += 1,
            }
        }
        counts
    }

    /// Run `apply` against one record under the write lock and return the
    /// resulting snapshot. Mutators validate before writing, so an `Err`
    /// leaves the record unchanged.
    async fn mutate<F>(&self, id: &str, apply: F) -> Result<JobRecord, CoreError>
    where
        F: FnOnce(&mut JobRecord) -> Result<(), CoreError>,
    {
        let mut jobs = self.jobs.write().await;
        let job = jobs
            .get_mut(id)
            .ok_or_else(|| CoreError::job_not_found(id))?;

        apply(job)?;

        tracing::debug!(
            job_id = %job.id,
            status = %job.status,
            progress = job.progress,
            "Job updated",
        );
        Ok(job.clone())
    }
}

impl Default for JobStore {
    fn default() -> Self {
        Self::new()
    }
}

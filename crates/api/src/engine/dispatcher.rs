//! Background job dispatcher.
//!
//! Each submission gets its own task on a [`TaskTracker`], so the submit
//! handler returns as soon as the job is recorded. The task marks the job
//! `running`, forwards it once, and on failure records the error into the
//! job itself. There is no retry and no timeout waiting for the worker's
//! callback: a worker that never calls back leaves the job `running`.

use std::sync::Arc;
use std::time::Duration;

use gateway_automl::{JobForwarder, ProcessJobRequest};
use gateway_core::job::{JobStatus, JobStatusUpdate, MSG_PROCESSING};
use gateway_core::submission::JobSubmission;
use gateway_core::types::JobId;
use gateway_store::JobStore;
use tokio::task::JoinHandle;
use tokio_util::task::TaskTracker;

/// Hands jobs to the AutoML core on detached tasks.
pub struct JobDispatcher {
    store: Arc<JobStore>,
    forwarder: Arc<dyn JobForwarder>,
    tracker: TaskTracker,
}

impl JobDispatcher {
    pub fn new(store: Arc<JobStore>, forwarder: Arc<dyn JobForwarder>) -> Self {
        Self {
            store,
            forwarder,
            tracker: TaskTracker::new(),
        }
    }

    /// Spawn the forwarding task for a job that has just been created.
    ///
    /// Must be called from within a Tokio runtime. The returned handle is
    /// only needed by callers that want to wait for the hand-off.
    pub fn dispatch(&self, job_id: JobId, submission: JobSubmission) -> JoinHandle<()> {
        let store = Arc::clone(&self.store);
        let forwarder = Arc::clone(&self.forwarder);
        self.tracker.spawn(async move {
            forward_job(&store, forwarder.as_ref(), &job_id, submission).await;
        })
    }

    /// Number of forwarding tasks still in flight.
    pub fn in_flight(&self) -> usize {
        self.tracker.len()
    }

    /// Stop accepting work and wait up to `timeout` for in-flight forwards.
    ///
    /// Returns `false` if the timeout elapsed first.
    pub async fn shutdown(&self, timeout: Duration) -> bool {
        self.tracker.close();
        tokio::time::timeout(timeout, self.tracker.wait())
            .await
            .is_ok()
    }
}

async fn forward_job(
    store: &JobStore,
    forwarder: &dyn JobForwarder,
    job_id: &str,
    submission: JobSubmission,
) {
    let running = JobStatusUpdate::new(JobStatus::Running, 0, MSG_PROCESSING);
    if let Err(e) = store.update_status(job_id, running).await {
        tracing::warn!(job_id, error = %e, "Could not mark job running, skipping dispatch");
        return;
    }

    let request = ProcessJobRequest::encode(job_id, &submission);
    tracing::info!(
        job_id,
        dataset_format = %submission.format,
        dataset_bytes = submission.dataset.len(),
        "Dispatching job to AutoML core",
    );

    match forwarder.forward(&request).await {
        Ok(()) => {
            tracing::info!(job_id, "Job accepted by AutoML core");
        }
        Err(e) => {
            tracing::error!(job_id, error = %e, "Failed to dispatch job to AutoML core");
            if let Err(store_err) = store
                .set_failed(job_id, format!("Failed to process job: {e}"))
                .await
            {
                // Strict policy: the worker already reported a terminal state.
                tracing::warn!(
                    job_id,
                    error = %store_err,
                    "Could not record dispatch failure",
                );
            }
        }
    }
}

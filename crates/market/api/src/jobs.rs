//! Job store access for transfer sessions.

use crate::JobStateError;
use orca_primitives::{JobId, JobState};
use parking_lot::Mutex;
use std::{collections::HashMap, sync::Arc, time::Duration};
use tokio::sync::Notify;

/// The part of the job store a transfer session needs.
///
/// Sessions never drive lifecycle transitions. They read the state at chunk
/// boundaries and report accrued cost.
#[async_trait::async_trait]
#[auto_impl::auto_impl(&, Arc)]
pub trait JobTracker: Send + Sync {
    /// Current state of `job`.
    async fn job_state(&self, job: &JobId) -> Result<JobState, JobStateError>;

    /// Add one payment's worth to the job's accrued cost.
    async fn add_cost(&self, job: &JobId, amount: u64) -> Result<(), JobStateError>;

    /// Wait until `job` may have changed state, for at most `max_wait`.
    ///
    /// Implementations that can observe transitions should return as soon as
    /// one happens. The default only sleeps, which turns the caller's wait
    /// into a fixed-interval poll.
    async fn wait_for_change(&self, job: &JobId, max_wait: Duration) {
        let _ = job;
        tokio::time::sleep(max_wait).await;
    }

    /// The session following `job` has ended.
    fn release(&self, job: &JobId) {
        let _ = job;
    }
}

/// Wakes sessions waiting on a job when this process observes a transition.
///
/// Only watched jobs are tracked. A wake-up for a watched job is kept until
/// the next wait, so a transition that lands between a state read and the
/// following wait is not lost. Entries live until the job is forgotten.
#[derive(Debug, Default)]
pub struct JobSignals {
    jobs: Mutex<HashMap<JobId, Arc<Notify>>>,
}

impl JobSignals {
    fn handle(&self, job: &JobId) -> Arc<Notify> {
        self.jobs.lock().entry(job.clone()).or_default().clone()
    }

    /// Start tracking `job` so that transitions are stored for the next wait.
    pub fn watch(&self, job: &JobId) {
        self.jobs.lock().entry(job.clone()).or_default();
    }

    /// Signal that `job` changed state. Unwatched jobs are ignored.
    pub fn notify(&self, job: &JobId) {
        if let Some(notify) = self.jobs.lock().get(job) {
            notify.notify_one();
        }
    }

    /// Wait for a signal on `job`, or until `max_wait` elapses.
    pub async fn wait(&self, job: &JobId, max_wait: Duration) {
        let notify = self.handle(job);
        let _ = tokio::time::timeout(max_wait, notify.notified()).await;
    }

    /// Drop bookkeeping for a job nobody follows any more.
    pub fn forget(&self, job: &JobId) {
        self.jobs.lock().remove(job);
    }

    /// Number of jobs currently tracked.
    pub fn len(&self) -> usize {
        self.jobs.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.lock().is_empty()
    }
}

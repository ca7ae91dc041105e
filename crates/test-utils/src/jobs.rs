use orca_api::{JobSignals, JobStateError, JobTracker};
use orca_primitives::{ContentHash, Job, JobId, JobState};
use parking_lot::Mutex;
use std::{
    collections::HashMap,
    sync::atomic::{AtomicU64, Ordering},
    time::Duration,
};

/// Job store kept in memory.
///
/// Transitions are checked against the job lifecycle and wake sessions
/// waiting on the job, like a controller in the same process would.
#[derive(Debug, Default)]
pub struct MemoryJobStore {
    jobs: Mutex<HashMap<JobId, Job>>,
    next_id: AtomicU64,
    signals: JobSignals,
    paused_reads: AtomicU64,
}

impl MemoryJobStore {
    /// Create a job in `Created` and return its id.
    pub fn create(&self, hash: ContentHash, peer_address: &str) -> JobId {
        let id = JobId::new(format!("job-{}", self.next_id.fetch_add(1, Ordering::Relaxed) + 1));
        self.jobs
            .lock()
            .insert(id.clone(), Job::new(id.clone(), hash, peer_address));
        id
    }

    /// Create a job and move it straight to `Running`.
    pub fn create_running(&self, hash: ContentHash, peer_address: &str) -> JobId {
        let id = self.create(hash, peer_address);
        let mut jobs = self.jobs.lock();
        if let Some(job) = jobs.get_mut(&id) {
            job.state = JobState::Running;
        }
        id
    }

    pub fn transition(&self, id: &JobId, next: JobState) -> Result<(), JobStateError> {
        {
            let mut jobs = self.jobs.lock();
            let job = jobs
                .get_mut(id)
                .ok_or_else(|| JobStateError::UnknownJob(id.clone()))?;
            if !job.state.can_transition_to(next) {
                return Err(JobStateError::InvalidTransition {
                    job: id.clone(),
                    from: job.state,
                    to: next,
                });
            }
            job.state = next;
        }
        self.signals.notify(id);
        Ok(())
    }

    pub fn job(&self, id: &JobId) -> Option<Job> {
        self.jobs.lock().get(id).cloned()
    }

    /// Jobs whose transitions are currently tracked for waiting sessions.
    pub fn watched_jobs(&self) -> usize {
        self.signals.len()
    }

    /// How many state reads have answered `Paused` so far.
    pub fn paused_reads(&self) -> u64 {
        self.paused_reads.load(Ordering::Relaxed)
    }
}

#[async_trait::async_trait]
impl JobTracker for MemoryJobStore {
    async fn job_state(&self, id: &JobId) -> Result<JobState, JobStateError> {
        let state = self
            .jobs
            .lock()
            .get(id)
            .map(|job| job.state)
            .ok_or_else(|| JobStateError::UnknownJob(id.clone()))?;
        if state == JobState::Paused {
            self.paused_reads.fetch_add(1, Ordering::Relaxed);
        }
        if state.is_final() {
            self.signals.forget(id);
        } else {
            self.signals.watch(id);
        }
        Ok(state)
    }

    async fn add_cost(&self, id: &JobId, amount: u64) -> Result<(), JobStateError> {
        let mut jobs = self.jobs.lock();
        let job = jobs
            .get_mut(id)
            .ok_or_else(|| JobStateError::UnknownJob(id.clone()))?;
        job.cost_accrued += amount;
        Ok(())
    }

    async fn wait_for_change(&self, id: &JobId, max_wait: Duration) {
        self.signals.wait(id, max_wait).await;
    }

    fn release(&self, id: &JobId) {
        self.signals.forget(id);
    }
}

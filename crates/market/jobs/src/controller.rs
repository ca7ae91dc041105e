//! HTTP job controller.

use crate::wire::{AddJobRequest, AddJobResponse, JobCostRequest, JobRef, JobStatusResponse};
use orca_api::{JobSignals, JobStateError, JobTracker};
use orca_primitives::{ContentHash, JobId, JobState};
use reqwest::StatusCode;
use std::time::Duration;
use tracing::{debug, info, warn};

fn store_unreachable(e: impl std::fmt::Display) -> JobStateError {
    JobStateError::Unreachable {
        message: e.to_string(),
    }
}

fn malformed(e: impl std::fmt::Display) -> JobStateError {
    JobStateError::Malformed {
        message: e.to_string(),
    }
}

/// Creates and advances jobs in the remote job store.
///
/// Pause, resume and terminate are normally issued by an operator or a
/// scheduler; when they go through this controller, sessions in this process
/// waiting on the job are woken straight away instead of at their next poll.
#[derive(Debug)]
pub struct JobController {
    client: reqwest::Client,
    base_url: String,
    signals: JobSignals,
}

impl JobController {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            signals: JobSignals::default(),
        }
    }

    /// Jobs whose transitions are currently tracked for waiting sessions.
    pub fn watched_jobs(&self) -> usize {
        self.signals.len()
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{path}", self.base_url)
    }

    /// Register a new job for downloading `hash` from `peer_address`.
    pub async fn add_job(
        &self,
        hash: ContentHash,
        peer_address: &str,
    ) -> Result<JobId, JobStateError> {
        let response = self
            .client
            .put(self.url("add-job"))
            .json(&AddJobRequest {
                file_hash: hash,
                peer_id: peer_address.to_string(),
            })
            .send()
            .await
            .map_err(store_unreachable)?
            .error_for_status()
            .map_err(store_unreachable)?;

        let body: AddJobResponse = response.json().await.map_err(malformed)?;
        if body.job_id.as_str().is_empty() {
            return Err(malformed("empty job id"));
        }

        info!(job = %body.job_id, %hash, peer = peer_address, "Added job");
        Ok(body.job_id)
    }

    /// Move jobs into `Running`.
    pub async fn start_jobs(&self, jobs: &[JobId]) -> Result<(), JobStateError> {
        self.transition("start-jobs", jobs).await
    }

    pub async fn pause_jobs(&self, jobs: &[JobId]) -> Result<(), JobStateError> {
        self.transition("pause-jobs", jobs).await
    }

    pub async fn resume_jobs(&self, jobs: &[JobId]) -> Result<(), JobStateError> {
        self.transition("resume-jobs", jobs).await
    }

    pub async fn terminate_jobs(&self, jobs: &[JobId]) -> Result<(), JobStateError> {
        self.transition("terminate-jobs", jobs).await
    }

    async fn transition(&self, route: &str, jobs: &[JobId]) -> Result<(), JobStateError> {
        let body: Vec<JobRef> = jobs
            .iter()
            .map(|job_id| JobRef {
                job_id: job_id.clone(),
            })
            .collect();

        let response = self
            .client
            .put(self.url(route))
            .json(&body)
            .send()
            .await
            .map_err(store_unreachable)?;

        match response.status() {
            status if status.is_success() => {}
            StatusCode::CONFLICT => {
                let message = match response.text().await {
                    Ok(body) => body,
                    Err(e) => {
                        warn!(route, error = %e, "Failed to read rejection body");
                        format!("{route} rejected: {}", StatusCode::CONFLICT)
                    }
                };
                return Err(JobStateError::Rejected { message });
            }
            status => return Err(store_unreachable(format!("{route} returned {status}"))),
        }

        for job in jobs {
            self.signals.notify(job);
        }
        debug!(route, count = jobs.len(), "Job transition requested");
        Ok(())
    }
}

#[async_trait::async_trait]
impl JobTracker for JobController {
    async fn job_state(&self, job: &JobId) -> Result<JobState, JobStateError> {
        let response = self
            .client
            .get(self.url("job-status"))
            .query(&[("jobId", job.as_str())])
            .send()
            .await
            .map_err(store_unreachable)?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(JobStateError::UnknownJob(job.clone()));
        }
        let response = response.error_for_status().map_err(store_unreachable)?;
        let body: JobStatusResponse = response.json().await.map_err(malformed)?;

        if body.status.is_final() {
            self.signals.forget(job);
        } else {
            self.signals.watch(job);
        }
        Ok(body.status)
    }

    async fn add_cost(&self, job: &JobId, amount: u64) -> Result<(), JobStateError> {
        let response = self
            .client
            .put(self.url("update-job-cost"))
            .json(&JobCostRequest {
                job_id: job.clone(),
                cost: amount,
            })
            .send()
            .await
            .map_err(store_unreachable)?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(JobStateError::UnknownJob(job.clone()));
        }
        response.error_for_status().map_err(store_unreachable)?;
        Ok(())
    }

    async fn wait_for_change(&self, job: &JobId, max_wait: Duration) {
        self.signals.wait(job, max_wait).await;
    }

    fn release(&self, job: &JobId) {
        self.signals.forget(job);
    }
}

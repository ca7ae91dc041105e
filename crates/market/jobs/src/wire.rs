//! JSON bodies exchanged with the job store.

use orca_primitives::{ContentHash, JobId, JobState};
use serde::{Deserialize, Serialize};

/// `PUT /add-job` request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddJobRequest {
    pub file_hash: ContentHash,
    pub peer_id: String,
}

/// `PUT /add-job` response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddJobResponse {
    pub job_id: JobId,
}

/// Element of the `PUT /{start,pause,resume,terminate}-jobs` request array.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobRef {
    pub job_id: JobId,
}

/// `GET /job-status` response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobStatusResponse {
    pub job_id: JobId,
    pub status: JobState,
    #[serde(default)]
    pub cost_accrued: u64,
}

/// `PUT /update-job-cost` request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobCostRequest {
    pub job_id: JobId,
    pub cost: u64,
}

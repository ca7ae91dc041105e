//! Fake market server for HTTP client tests.

use crate::{MemoryDirectory, MemoryJobStore};
use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
};
use orca_api::{JobStateError, JobTracker};
use orca_primitives::{ContentHash, Holder, JobId, JobState};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::{
    net::{IpAddr, SocketAddr},
    sync::Arc,
};
use tokio::{net::TcpListener, task::JoinHandle};

/// The only wallet password the fake ledger accepts.
pub const TEST_WALLET_PASSWORD: &str = "hunter2";

#[derive(Default)]
struct MarketState {
    directory: MemoryDirectory,
    jobs: MemoryJobStore,
    payments: Mutex<Vec<(u64, String)>>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CheckHolders {
    file_hash: String,
}

#[derive(Serialize)]
struct HoldersBody {
    holders: Vec<Holder>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RegisterFile {
    file_hash: ContentHash,
    identity_key: String,
    name: String,
    price_per_unit: u64,
    ip: IpAddr,
    port: u16,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AddJob {
    file_hash: ContentHash,
    peer_id: String,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct JobRef {
    job_id: JobId,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JobStatus {
    job_id: JobId,
    status: JobState,
    cost_accrued: u64,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct JobCost {
    job_id: JobId,
    cost: u64,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SendToAddress {
    amount: u64,
    address: String,
    sender_wallet_pass: String,
}

type Shared = State<Arc<MarketState>>;

fn job_error(e: JobStateError) -> Response {
    let status = match e {
        JobStateError::UnknownJob(_) => StatusCode::NOT_FOUND,
        JobStateError::InvalidTransition { .. } => StatusCode::CONFLICT,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, e.to_string()).into_response()
}

async fn check_holders(State(state): Shared, Json(req): Json<CheckHolders>) -> Json<HoldersBody> {
    Json(HoldersBody {
        holders: state.directory.holders(&req.file_hash),
    })
}

async fn register_file(State(state): Shared, Json(req): Json<RegisterFile>) -> Response {
    if req.name.is_empty() {
        return (StatusCode::BAD_REQUEST, "file name must not be empty").into_response();
    }
    state.directory.add_holder(
        req.file_hash,
        Holder {
            identity_key: req.identity_key,
            ip: req.ip,
            port: req.port,
            price_per_unit: req.price_per_unit,
        },
    );
    StatusCode::OK.into_response()
}

async fn add_job(State(state): Shared, Json(req): Json<AddJob>) -> Json<JobRef> {
    Json(JobRef {
        job_id: state.jobs.create(req.file_hash, &req.peer_id),
    })
}

fn transition_all(state: &MarketState, jobs: Vec<JobRef>, next: JobState) -> Response {
    for job in jobs {
        if let Err(e) = state.jobs.transition(&job.job_id, next) {
            return job_error(e);
        }
    }
    StatusCode::OK.into_response()
}

async fn start_jobs(State(state): Shared, Json(jobs): Json<Vec<JobRef>>) -> Response {
    transition_all(&state, jobs, JobState::Running)
}

async fn pause_jobs(State(state): Shared, Json(jobs): Json<Vec<JobRef>>) -> Response {
    transition_all(&state, jobs, JobState::Paused)
}

async fn resume_jobs(State(state): Shared, Json(jobs): Json<Vec<JobRef>>) -> Response {
    transition_all(&state, jobs, JobState::Running)
}

async fn terminate_jobs(State(state): Shared, Json(jobs): Json<Vec<JobRef>>) -> Response {
    transition_all(&state, jobs, JobState::Terminated)
}

async fn job_status(State(state): Shared, Query(query): Query<JobRef>) -> Response {
    match state.jobs.job(&query.job_id) {
        Some(job) => Json(JobStatus {
            job_id: job.job_id,
            status: job.state,
            cost_accrued: job.cost_accrued,
        })
        .into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn update_job_cost(State(state): Shared, Json(req): Json<JobCost>) -> Response {
    match state.jobs.add_cost(&req.job_id, req.cost).await {
        Ok(()) => StatusCode::OK.into_response(),
        Err(e) => job_error(e),
    }
}

async fn send_to_address(State(state): Shared, Json(req): Json<SendToAddress>) -> Response {
    if req.sender_wallet_pass != TEST_WALLET_PASSWORD {
        return (StatusCode::UNAUTHORIZED, "wrong wallet password").into_response();
    }
    state.payments.lock().push((req.amount, req.address));
    StatusCode::OK.into_response()
}

/// Directory, job store and ledger endpoints on a local port.
///
/// The server stops when the value is dropped.
pub struct FakeMarket {
    addr: SocketAddr,
    state: Arc<MarketState>,
    task: JoinHandle<()>,
}

impl FakeMarket {
    /// Bind to an ephemeral localhost port and start serving.
    pub async fn spawn() -> Self {
        let state = Arc::new(MarketState::default());
        let app = Router::new()
            .route("/check-holders", post(check_holders))
            .route("/register-file", post(register_file))
            .route("/add-job", put(add_job))
            .route("/start-jobs", put(start_jobs))
            .route("/pause-jobs", put(pause_jobs))
            .route("/resume-jobs", put(resume_jobs))
            .route("/terminate-jobs", put(terminate_jobs))
            .route("/job-status", get(job_status))
            .route("/update-job-cost", put(update_job_cost))
            .route("/sendToAddress", post(send_to_address))
            .with_state(state.clone());

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind fake market");
        let addr = listener.local_addr().expect("fake market address");
        let task = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                tracing::error!(error = %e, "Fake market stopped");
            }
        });

        Self { addr, state, task }
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Payments accepted so far as `(amount, address)`.
    pub fn payments(&self) -> Vec<(u64, String)> {
        self.state.payments.lock().clone()
    }

    pub fn directory(&self) -> &MemoryDirectory {
        &self.state.directory
    }

    pub fn jobs(&self) -> &MemoryJobStore {
        &self.state.jobs
    }
}

impl Drop for FakeMarket {
    fn drop(&mut self) {
        self.task.abort();
    }
}

//! The chunk-by-chunk download loop.

use crate::{SessionError, metrics::TransferMetrics};
use orca_api::{ChunkSource, JobStateError, JobTracker, Ledger, TransferError};
use orca_primitives::{ContentHash, Holder, JobId, JobState};
use orca_store::LocalFiles;
use std::{path::PathBuf, sync::Arc, time::Duration};
use tokio::{fs::OpenOptions, io::AsyncWriteExt};
use tracing::{debug, info, warn};

/// Upper bound on how long a paused session sleeps before re-reading the job state.
pub const DEFAULT_PAUSE_POLL: Duration = Duration::from_secs(10);

/// What to download, from whom, and at what price.
#[derive(Debug, Clone)]
pub struct TransferRequest {
    pub holder: Holder,
    pub content: ContentHash,
    /// Paid to the holder for every chunk.
    pub price: u64,
    pub wallet_password: String,
    /// Job whose state gates the transfer between chunks.
    pub job: Option<JobId>,
}

/// Outcome of a session that did not fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferReport {
    pub path: PathBuf,
    pub total_chunks: u64,
    pub chunks_written: u64,
    pub bytes_written: u64,
    pub amount_paid: u64,
    /// The job was terminated before the last chunk. The partial file is kept.
    pub stopped_early: bool,
}

impl TransferReport {
    fn new(path: PathBuf) -> Self {
        Self {
            path,
            total_chunks: 0,
            chunks_written: 0,
            bytes_written: 0,
            amount_paid: 0,
            stopped_early: false,
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
enum Gate {
    Proceed,
    Stop,
}

/// Downloads content into `<files>/requested/<hash>`.
///
/// Per chunk the order is fetch, pay, append, record cost, check job state.
/// A chunk is never written before its payment succeeded and never fetched
/// twice. Any failure aborts the session and leaves the file as it is; a
/// payment whose chunk then fails to write is not reconciled.
pub struct TransferSession<S, L> {
    source: S,
    ledger: L,
    jobs: Option<Arc<dyn JobTracker>>,
    files: LocalFiles,
    pause_poll: Duration,
    metrics: TransferMetrics,
}

impl<S: ChunkSource, L: Ledger> TransferSession<S, L> {
    pub fn new(source: S, ledger: L, files: LocalFiles) -> Self {
        Self {
            source,
            ledger,
            jobs: None,
            files,
            pause_poll: DEFAULT_PAUSE_POLL,
            metrics: TransferMetrics::default(),
        }
    }

    /// Consult `jobs` between chunks for requests that carry a job id.
    pub fn with_job_tracker(mut self, jobs: Arc<dyn JobTracker>) -> Self {
        self.jobs = Some(jobs);
        self
    }

    pub fn with_pause_poll(mut self, pause_poll: Duration) -> Self {
        self.pause_poll = pause_poll;
        self
    }

    pub async fn run(&self, request: &TransferRequest) -> Result<TransferReport, SessionError> {
        let job = match (&request.job, &self.jobs) {
            (Some(id), Some(tracker)) => Some((id, tracker.as_ref())),
            (Some(id), None) => return Err(SessionError::NoJobTracker(id.clone())),
            (None, _) => None,
        };

        let result = self.transfer(request, job).await;
        if let Some((id, tracker)) = job {
            tracker.release(id);
        }
        result
    }

    async fn transfer(
        &self,
        request: &TransferRequest,
        job: Option<(&JobId, &dyn JobTracker)>,
    ) -> Result<TransferReport, SessionError> {
        let path = self.files.requested_path(&request.content);
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await
            .map_err(|source| TransferError::Write { index: 0, source })?;

        info!(
            hash = %request.content,
            holder = %request.holder.socket_addr(),
            price = request.price,
            job = ?request.job,
            "Starting transfer"
        );

        let mut report = TransferReport::new(path);
        let mut index = 0u64;
        loop {
            let chunk = self
                .source
                .fetch_chunk(&request.holder, &request.content, index)
                .await?;
            self.metrics.chunks_fetched_total.increment(1);

            if index == 0 {
                report.total_chunks = chunk.total_chunks;
            } else if chunk.total_chunks != report.total_chunks {
                return Err(TransferError::InconsistentChunkCount {
                    hash: request.content,
                    expected: report.total_chunks,
                    got: chunk.total_chunks,
                }
                .into());
            }
            if report.total_chunks == 0 {
                break;
            }

            self.ledger
                .send_to_address(
                    request.price,
                    request.holder.wallet_address(),
                    &request.wallet_password,
                )
                .await?;
            self.metrics.chunk_payments_total.increment(1);
            report.amount_paid += request.price;

            let write_err = |source| TransferError::Write { index, source };
            file.write_all(&chunk.payload).await.map_err(write_err)?;
            file.flush().await.map_err(write_err)?;
            let len = chunk.payload.len() as u64;
            self.metrics.bytes_written_total.increment(len);
            report.chunks_written += 1;
            report.bytes_written += len;

            debug!(
                chunk = index,
                total = report.total_chunks,
                bytes = len,
                "Chunk written"
            );

            if let Some((id, tracker)) = job {
                tracker.add_cost(id, request.price).await?;
            }

            index += 1;
            if index >= report.total_chunks {
                break;
            }

            if let Some((id, tracker)) = job {
                if self.await_runnable(id, tracker).await? == Gate::Stop {
                    self.metrics.early_stops_total.increment(1);
                    info!(
                        job = %id,
                        written = report.chunks_written,
                        total = report.total_chunks,
                        "Job terminated, stopping transfer"
                    );
                    report.stopped_early = true;
                    return Ok(report);
                }
            }
        }

        self.metrics.completed_total.increment(1);
        info!(
            hash = %request.content,
            chunks = report.chunks_written,
            paid = report.amount_paid,
            path = %report.path.display(),
            "Transfer complete"
        );
        Ok(report)
    }

    /// Block while the job is paused. Stops on termination.
    async fn await_runnable(
        &self,
        id: &JobId,
        tracker: &dyn JobTracker,
    ) -> Result<Gate, JobStateError> {
        let mut paused = false;
        loop {
            match tracker.job_state(id).await? {
                JobState::Terminated => return Ok(Gate::Stop),
                JobState::Paused => {
                    if !paused {
                        info!(job = %id, "Job paused, waiting");
                        paused = true;
                    }
                    tracker.wait_for_change(id, self.pause_poll).await;
                }
                state => {
                    if paused {
                        info!(job = %id, %state, "Job resumed");
                    }
                    if state != JobState::Running {
                        warn!(job = %id, %state, "Unexpected job state mid-transfer, continuing");
                    }
                    return Ok(Gate::Proceed);
                }
            }
        }
    }
}

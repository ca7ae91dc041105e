use orca_api::{JobStateError, PaymentError, TransferError};
use orca_primitives::JobId;

/// Why a transfer session aborted. The partial file is left on disk.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error(transparent)]
    Payment(#[from] PaymentError),

    #[error(transparent)]
    Transfer(#[from] TransferError),

    #[error(transparent)]
    Job(#[from] JobStateError),

    /// The request names a job but the session was built without a job tracker.
    #[error("session for job {0} has no job tracker")]
    NoJobTracker(JobId),
}

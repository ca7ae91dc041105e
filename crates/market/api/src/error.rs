//! Error taxonomy shared by the market components.
//!
//! Every failure surfaced to a command falls into one of these categories.
//! None of them are retried inside the core.

use orca_primitives::{ContentHash, JobId, JobState};

/// Holder discovery and registration failures.
#[derive(Debug, thiserror::Error)]
pub enum DirectoryError {
    /// No peer currently holds the requested content.
    #[error("no holder found for {id}")]
    NoHolderFound {
        /// The hash or name that was looked up.
        id: String,
    },

    /// The directory refused to register the file.
    #[error("registration rejected: {reason}")]
    RegistrationRejected {
        /// Reason reported by the directory.
        reason: String,
    },

    /// The directory could not be reached or answered with garbage.
    #[error("directory unavailable: {message}")]
    Unavailable {
        /// Description of the failure.
        message: String,
    },

    /// The file to register could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        /// Path of the file.
        path: String,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// The file to register could not be hashed.
    #[error("failed to hash {path}: {source}")]
    Hash {
        /// Path of the file.
        path: String,
        /// Underlying error.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// The input is neither a content hash nor a name in the local index.
    #[error("unknown name {name}: not a content hash and not in the local index")]
    UnknownName {
        /// The name that was looked up.
        name: String,
    },
}

/// Ledger send failures. Aborts the current transfer session.
#[derive(Debug, thiserror::Error)]
pub enum PaymentError {
    /// The ledger rejected the transaction.
    #[error("payment of {amount} to {address} rejected: {reason}")]
    Rejected {
        /// Amount that was attempted.
        amount: u64,
        /// Destination wallet.
        address: String,
        /// Reason reported by the ledger.
        reason: String,
    },

    /// The ledger could not be reached.
    #[error("ledger unavailable: {message}")]
    Unavailable {
        /// Description of the failure.
        message: String,
    },
}

/// Chunk fetch or write failures. Aborts the current session, partial file retained.
#[derive(Debug, thiserror::Error)]
pub enum TransferError {
    /// Fetching a chunk from the holder failed.
    #[error("failed to fetch chunk {index} of {hash}: {message}")]
    Fetch {
        /// Content being fetched.
        hash: ContentHash,
        /// Chunk index.
        index: u64,
        /// Description of the failure.
        message: String,
    },

    /// The holder changed its answer about how many chunks exist.
    #[error("holder reported {got} chunks for {hash}, expected {expected}")]
    InconsistentChunkCount {
        /// Content being fetched.
        hash: ContentHash,
        /// Count reported by the first response.
        expected: u64,
        /// Count reported now.
        got: u64,
    },

    /// Writing to local storage failed.
    #[error("failed to write chunk {index}: {source}")]
    Write {
        /// Chunk index.
        index: u64,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },
}

/// Job store failures.
#[derive(Debug, thiserror::Error)]
pub enum JobStateError {
    /// The job store could not be reached.
    #[error("job store unreachable: {message}")]
    Unreachable {
        /// Description of the failure.
        message: String,
    },

    /// The job store answered with something we could not interpret.
    #[error("malformed job store response: {message}")]
    Malformed {
        /// Description of the failure.
        message: String,
    },

    /// The job store refused the request.
    #[error("job store rejected request: {message}")]
    Rejected {
        /// Reason reported by the store.
        message: String,
    },

    /// The job store does not know this job.
    #[error("unknown job {0}")]
    UnknownJob(JobId),

    /// The requested transition is not part of the job lifecycle.
    #[error("job {job} cannot move from {from} to {to}")]
    InvalidTransition {
        /// Job being moved.
        job: JobId,
        /// Current state.
        from: JobState,
        /// Requested state.
        to: JobState,
    },
}

/// Host creation, address resolution and relay failures.
#[derive(Debug, thiserror::Error)]
pub enum ConnectivityError {
    /// Building or starting the transport host failed.
    #[error("transport host error: {0}")]
    Host(String),

    /// The address reflection service failed or returned garbage.
    #[error("address reflection failed: {0}")]
    Reflection(String),

    /// A relay is required but none is configured.
    #[error("relay required but no bootstrap relay is configured")]
    NoRelayAvailable,

    /// The host has no usable listen address yet.
    #[error("no listen address available")]
    NoListenAddress,

    /// Fetching a relay's advertisement failed.
    #[error("failed to fetch relay address: {0}")]
    RelayFetch(String),

    /// Dialing a peer failed.
    #[error("failed to connect to {peer}: {message}")]
    Dial {
        /// Peer being dialed.
        peer: String,
        /// Description of the failure.
        message: String,
    },

    /// The host's event loop has stopped.
    #[error("transport host stopped")]
    HostStopped,
}

//! Chunked, pay-per-chunk content transfer.
//!
//! A [`TransferSession`] downloads content from one holder chunk by chunk,
//! paying the holder before each chunk is written and consulting the job store
//! between chunks so a job can be paused or terminated mid-flight.
//!
//! The holder side is [`chunk_routes`], which serves `/get-file` from the
//! node's files root, and [`HttpChunkSource`] is the matching client.

mod error;
mod metrics;
mod server;
mod session;
mod source;

pub use error::SessionError;
pub use server::{ChunkServer, TOTAL_CHUNKS_HEADER, chunk_routes, read_chunk};
pub use session::{DEFAULT_PAUSE_POLL, TransferReport, TransferRequest, TransferSession};
pub use source::HttpChunkSource;

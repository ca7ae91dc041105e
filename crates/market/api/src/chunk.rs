//! Holder chunk endpoint abstraction.

use crate::TransferError;
use bytes::Bytes;
use orca_primitives::{ContentHash, Holder};

/// One chunk of content as returned by a holder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    /// Total number of chunks the content is split into.
    pub total_chunks: u64,
    /// Chunk bytes.
    pub payload: Bytes,
}

/// Fetches chunks of content from a holder.
#[async_trait::async_trait]
#[auto_impl::auto_impl(&, Arc)]
pub trait ChunkSource: Send + Sync {
    /// Fetch chunk `index` of `hash` from `holder`.
    async fn fetch_chunk(
        &self,
        holder: &Holder,
        hash: &ContentHash,
        index: u64,
    ) -> Result<Chunk, TransferError>;
}

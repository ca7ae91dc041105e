//! Core data types for the Orca file market.
//!
//! - [`ContentHash`] - SHA-256 content address, the stable lookup key everywhere
//! - [`FileRecord`] / [`FileRef`] - Shareable content and how users refer to it
//! - [`Holder`] - A peer's offer to serve content at a price
//! - [`Job`] / [`JobState`] - Externally controllable transfer handle

mod file;
mod hash;
mod holder;
mod job;

pub use file::{FileRecord, FileRef};
pub use hash::{ContentHash, ContentHashError, HASH_LEN};
pub use holder::Holder;
pub use job::{Job, JobId, JobState};

/// Size of one transfer chunk in bytes. Prices are quoted per chunk (per MiB).
pub const CHUNK_SIZE: usize = 1024 * 1024;

/// Number of chunks needed to carry `size` bytes. Empty content still takes one chunk.
pub fn chunk_count(size: u64) -> u64 {
    size.div_ceil(CHUNK_SIZE as u64).max(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chunk_count() {
        assert_eq!(chunk_count(0), 1);
        assert_eq!(chunk_count(1), 1);
        assert_eq!(chunk_count(CHUNK_SIZE as u64), 1);
        assert_eq!(chunk_count(CHUNK_SIZE as u64 + 1), 2);
        assert_eq!(chunk_count(3 * CHUNK_SIZE as u64), 3);
    }
}

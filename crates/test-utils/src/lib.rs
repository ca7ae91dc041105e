//! Test doubles for the Orca market abstractions.
//!
//! - [`MemoryDirectory`] - In-memory [`Directory`](orca_api::Directory)
//! - [`RecordingLedger`] - [`Ledger`](orca_api::Ledger) that records every payment
//! - [`MemoryJobStore`] - In-memory job store enforcing lifecycle transitions
//! - [`ScriptedChunkSource`] - [`ChunkSource`](orca_api::ChunkSource) serving fixed payloads
//! - [`FakeMarket`] - HTTP server speaking the directory, job store and ledger wire formats

mod chunks;
mod directory;
mod jobs;
mod ledger;
mod market;

pub use chunks::ScriptedChunkSource;
pub use directory::{MemoryDirectory, holder};
pub use jobs::MemoryJobStore;
pub use ledger::{Payment, RecordingLedger};
pub use market::{FakeMarket, TEST_WALLET_PASSWORD};

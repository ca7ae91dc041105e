//! Orca API - collaborator abstractions for the file market.
//!
//! The core (holder selection, transfer sessions, job control) only talks to
//! the outside world through the traits defined here. Concrete adapters (HTTP
//! clients, libp2p) live in sibling crates; in-memory doubles live in
//! `orca-test-utils`.
//!
//! - [`Directory`] - Holder lookup and registration
//! - [`Ledger`] - Value transfer between wallets
//! - [`JobTracker`] - Read side of the job store, as seen by a transfer session
//! - [`ChunkSource`] - A holder's chunk endpoint
//!
//! Errors follow the market taxonomy: [`DirectoryError`], [`PaymentError`],
//! [`TransferError`], [`JobStateError`] and [`ConnectivityError`].

#![warn(missing_docs)]

mod chunk;
mod directory;
mod error;
mod jobs;
mod ledger;

pub use chunk::{Chunk, ChunkSource};
pub use directory::Directory;
pub use error::*;
pub use jobs::{JobSignals, JobTracker};
pub use ledger::Ledger;

//! Generic node infrastructure library.
//!
//! This crate provides the pieces every Orca command shares:
//! - [`args`] - CLI argument structs for infrastructure configuration
//! - [`dirs`] - Data directory management
//! - [`identity`] - The node keypair on disk
//! - [`logging`] - Logging initialization
//! - [`version`] - Version information
//!
//! Market and network behaviour lives in the `orca-market-*` and `orca-net-*` crates.

pub mod args;
pub mod constants;
pub mod dirs;
mod error;
pub mod identity;
pub mod logging;
pub mod version;

pub use error::ConfigurationError;

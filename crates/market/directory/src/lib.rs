//! Holder discovery for the Orca file market.
//!
//! - [`HttpDirectory`] - [`Directory`](orca_api::Directory) client for the market server
//! - [`HolderSelector`] - Resolves names and picks the cheapest holder

mod http;
mod selector;

pub use http::HttpDirectory;
pub use selector::{HolderSelector, select_cheapest};

//! Local file storage for an Orca node.
//!
//! - [`NameIndex`] - Process-wide file name to content hash mapping
//! - [`LocalFiles`] - The node's files root (imported, stored and requested files)
//! - [`hash_file`] - SHA-256 content hashing

mod error;
mod files;
mod hash;
mod index;

pub use error::StoreError;
pub use files::{LocalFiles, REQUESTED_DIR};
pub use hash::{hash_bytes, hash_file};
pub use index::NameIndex;

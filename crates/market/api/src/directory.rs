//! Distributed directory abstraction.

use crate::DirectoryError;
use orca_primitives::{FileRecord, Holder};
use std::{net::IpAddr, path::Path};

/// Lookup service mapping content hashes to the peers currently holding them.
#[async_trait::async_trait]
#[auto_impl::auto_impl(&, Arc)]
pub trait Directory: Send + Sync {
    /// All holders currently advertising `id`. Order carries no meaning.
    async fn check_holders(&self, id: &str) -> Result<Vec<Holder>, DirectoryError>;

    /// Advertise the file at `path` as held by this node at `price_per_unit`.
    ///
    /// Returns the record the directory now knows the file by.
    async fn register_file(
        &self,
        path: &Path,
        name: &str,
        price_per_unit: u64,
        ip: IpAddr,
        port: u16,
    ) -> Result<FileRecord, DirectoryError>;
}

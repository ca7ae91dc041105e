use orca_api::{Directory, DirectoryError};
use orca_primitives::{ContentHash, FileRecord, Holder};
use orca_store::hash_file;
use parking_lot::RwLock;
use std::{
    collections::HashMap,
    net::{IpAddr, Ipv4Addr},
    path::Path,
};

/// A holder on localhost with the given identity and price.
pub fn holder(identity_key: &str, price_per_unit: u64) -> Holder {
    Holder {
        identity_key: identity_key.to_string(),
        ip: IpAddr::V4(Ipv4Addr::LOCALHOST),
        port: 8080,
        price_per_unit,
    }
}

/// Lookup ids are normalized the way the directory stores them.
fn lookup_key(id: &str) -> String {
    id.parse::<ContentHash>()
        .map(|hash| hash.to_hex())
        .unwrap_or_else(|_| id.to_string())
}

/// Directory kept in a map. Files registered through it are held by `identity_key`.
#[derive(Debug)]
pub struct MemoryDirectory {
    identity_key: String,
    holders: RwLock<HashMap<String, Vec<Holder>>>,
}

impl Default for MemoryDirectory {
    fn default() -> Self {
        Self::new("local-node")
    }
}

impl MemoryDirectory {
    pub fn new(identity_key: impl Into<String>) -> Self {
        Self {
            identity_key: identity_key.into(),
            holders: RwLock::default(),
        }
    }

    pub fn add_holder(&self, hash: ContentHash, holder: Holder) {
        self.add_holder_for(&hash.to_hex(), holder);
    }

    /// Add a holder under a raw lookup id.
    pub fn add_holder_for(&self, id: &str, holder: Holder) {
        self.holders
            .write()
            .entry(lookup_key(id))
            .or_default()
            .push(holder);
    }

    pub fn holders(&self, id: &str) -> Vec<Holder> {
        self.holders
            .read()
            .get(&lookup_key(id))
            .cloned()
            .unwrap_or_default()
    }
}

#[async_trait::async_trait]
impl Directory for MemoryDirectory {
    async fn check_holders(&self, id: &str) -> Result<Vec<Holder>, DirectoryError> {
        Ok(self.holders(id))
    }

    async fn register_file(
        &self,
        path: &Path,
        name: &str,
        price_per_unit: u64,
        ip: IpAddr,
        port: u16,
    ) -> Result<FileRecord, DirectoryError> {
        let io_err = |source| DirectoryError::Io {
            path: path.display().to_string(),
            source,
        };
        let size = std::fs::metadata(path).map_err(io_err)?.len();
        let hash = hash_file(path).map_err(|e| io_err(std::io::Error::other(e.to_string())))?;

        self.add_holder(
            hash,
            Holder {
                identity_key: self.identity_key.clone(),
                ip,
                port,
                price_per_unit,
            },
        );

        Ok(FileRecord {
            name: name.to_string(),
            content_hash: hash,
            size_bytes: Some(size),
        })
    }
}

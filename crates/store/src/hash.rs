//! Content hashing.

use crate::StoreError;
use orca_primitives::ContentHash;
use sha2::{Digest, Sha256};
use std::{
    fs::File,
    io::{BufReader, Read},
    path::Path,
};

/// Hash a byte slice.
pub fn hash_bytes(data: &[u8]) -> ContentHash {
    ContentHash::new(Sha256::digest(data).into())
}

/// Hash a file's content, streaming it from disk.
pub fn hash_file(path: impl AsRef<Path>) -> Result<ContentHash, StoreError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| StoreError::io(path, e))?;
    let mut reader = BufReader::new(file);
    let mut hasher = Sha256::new();
    let mut buf = [0u8; 64 * 1024];

    loop {
        let n = reader.read(&mut buf).map_err(|e| StoreError::io(path, e))?;
        if n == 0 {
            break;
        }
        hasher.update(buf.get(..n).unwrap_or_default());
    }

    Ok(ContentHash::new(hasher.finalize().into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_file_matches_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test.txt");
        std::fs::write(&path, b"test").unwrap();

        let hash = hash_file(&path).unwrap();
        assert_eq!(hash, hash_bytes(b"test"));
        assert_eq!(
            hash.to_string(),
            "9f86d081884c7d659a2feaa0c55ad015a3bf4f1b2b0b822cd15d6c15b0f00a08"
        );
    }

    #[test]
    fn test_hash_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            hash_file(dir.path().join("missing")),
            Err(StoreError::Io { .. })
        ));
    }
}

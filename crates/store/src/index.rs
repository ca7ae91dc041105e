//! JSON file-backed name index with atomic writes.

use crate::StoreError;
use orca_primitives::ContentHash;
use parking_lot::RwLock;
use std::{
    collections::BTreeMap,
    fs::{self, File},
    io::{BufReader, BufWriter},
    path::{Path, PathBuf},
};
use tracing::debug;

/// Maps local file names (or paths) to content hashes.
///
/// Shared by every command in the process. Each mutation updates the map and
/// rewrites the backing file while holding the write lock, so concurrent
/// updates are serialized and none are lost.
#[derive(Debug)]
pub struct NameIndex {
    path: PathBuf,
    names: RwLock<BTreeMap<String, ContentHash>>,
}

impl NameIndex {
    /// Load the index at `path`, or start empty if it does not exist yet.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let names = if path.exists() {
            Self::load_from_file(&path)?
        } else {
            BTreeMap::new()
        };

        debug!(path = %path.display(), entries = names.len(), "Opened name index");

        Ok(Self {
            path,
            names: RwLock::new(names),
        })
    }

    fn load_from_file(path: &Path) -> Result<BTreeMap<String, ContentHash>, StoreError> {
        let file = File::open(path).map_err(|e| StoreError::io(path, e))?;
        serde_json::from_reader(BufReader::new(file))
            .map_err(|e| StoreError::Serialization(e.to_string()))
    }

    fn save_to_file(&self, names: &BTreeMap<String, ContentHash>) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| StoreError::io(parent, e))?;
        }

        // Write to temp file first, then rename (atomic)
        let tmp_path = self.path.with_extension("json.tmp");
        {
            let file = File::create(&tmp_path).map_err(|e| StoreError::io(&tmp_path, e))?;
            serde_json::to_writer_pretty(BufWriter::new(file), names)
                .map_err(|e| StoreError::Serialization(e.to_string()))?;
        }

        fs::rename(&tmp_path, &self.path).map_err(|e| StoreError::io(&self.path, e))
    }

    /// Record that `name` refers to `hash`, replacing any previous mapping.
    pub fn put(&self, name: impl Into<String>, hash: ContentHash) -> Result<(), StoreError> {
        let mut names = self.names.write();
        names.insert(name.into(), hash);
        self.save_to_file(&names)
    }

    pub fn get(&self, name: &str) -> Option<ContentHash> {
        self.names.read().get(name).copied()
    }

    /// Remove `name`, returning the hash it pointed to.
    pub fn remove(&self, name: &str) -> Result<Option<ContentHash>, StoreError> {
        let mut names = self.names.write();
        let removed = names.remove(name);
        if removed.is_some() {
            self.save_to_file(&names)?;
        }
        Ok(removed)
    }

    /// Names that point at `hash`, sorted.
    pub fn names_for(&self, hash: &ContentHash) -> Vec<String> {
        self.names
            .read()
            .iter()
            .filter(|(_, h)| *h == hash)
            .map(|(name, _)| name.clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.names.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.read().is_empty()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hash_bytes;
    use std::{sync::Arc, thread};

    #[test]
    fn test_basic() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("names.json");

        let index = NameIndex::open(&path).unwrap();
        assert!(index.is_empty());
        assert!(!path.exists());

        let hash = hash_bytes(b"report");
        index.put("report.pdf", hash).unwrap();
        assert!(path.exists());
        assert_eq!(index.get("report.pdf"), Some(hash));
        assert_eq!(index.get("other.pdf"), None);

        assert_eq!(index.remove("report.pdf").unwrap(), Some(hash));
        assert!(index.is_empty());
    }

    #[test]
    fn test_names_for_hash() {
        let dir = tempfile::tempdir().unwrap();
        let index = NameIndex::open(dir.path().join("names.json")).unwrap();
        let shared = hash_bytes(b"shared");
        index.put("b.txt", shared).unwrap();
        index.put("a.txt", shared).unwrap();
        index.put("c.txt", hash_bytes(b"other")).unwrap();

        assert_eq!(index.names_for(&shared), vec!["a.txt", "b.txt"]);
        assert!(index.names_for(&hash_bytes(b"missing")).is_empty());
    }

    #[test]
    fn test_persistence() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state").join("names.json");

        {
            let index = NameIndex::open(&path).unwrap();
            for i in 0..5u8 {
                index.put(format!("file-{i}"), hash_bytes(&[i])).unwrap();
            }
        }

        let index = NameIndex::open(&path).unwrap();
        assert_eq!(index.len(), 5);
        assert_eq!(index.get("file-3"), Some(hash_bytes(&[3])));
    }

    #[test]
    fn test_concurrent_puts_are_not_lost() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("names.json");
        let index = Arc::new(NameIndex::open(&path).unwrap());

        let handles: Vec<_> = (0..8u8)
            .map(|t| {
                let index = index.clone();
                thread::spawn(move || {
                    for i in 0..10u8 {
                        index
                            .put(format!("t{t}-{i}"), hash_bytes(&[t, i]))
                            .unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(index.len(), 80);
        let reloaded = NameIndex::open(&path).unwrap();
        assert_eq!(reloaded.len(), 80);
    }
}

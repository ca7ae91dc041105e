//! The node's files root.
//!
//! ```text
//! <root>/
//! ├── <name>                 imported / stored files, served to buyers
//! └── requested/<hash>       files downloaded from holders
//! ```

use crate::{NameIndex, StoreError, hash_file};
use orca_primitives::{ContentHash, FileRecord};
use std::{
    fs,
    path::{Path, PathBuf},
};
use tracing::{debug, info};

/// Subdirectory for downloaded content.
pub const REQUESTED_DIR: &str = "requested";

/// Local file storage rooted at a single directory.
#[derive(Debug, Clone)]
pub struct LocalFiles {
    root: PathBuf,
}

impl LocalFiles {
    /// Open the files root, creating it and the requested directory if needed.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let root = root.into();
        let requested = root.join(REQUESTED_DIR);
        fs::create_dir_all(&requested).map_err(|e| StoreError::io(&requested, e))?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn requested_dir(&self) -> PathBuf {
        self.root.join(REQUESTED_DIR)
    }

    /// Where a download of `hash` is written.
    pub fn requested_path(&self, hash: &ContentHash) -> PathBuf {
        self.requested_dir().join(hash.to_hex())
    }

    /// Path of a stored file by name. Fails if it is missing.
    pub fn stored_path(&self, name: &str) -> Result<PathBuf, StoreError> {
        let path = self.root.join(name);
        if path.is_file() {
            Ok(path)
        } else {
            Err(StoreError::NotFound(name.to_string()))
        }
    }

    /// Copy the file at `src` into the files root and record its hash in `index`.
    pub fn import(&self, src: &Path, index: &NameIndex) -> Result<FileRecord, StoreError> {
        if src.is_dir() {
            return Err(StoreError::NotAFile(src.to_path_buf()));
        }
        let name = src
            .file_name()
            .ok_or_else(|| StoreError::NotAFile(src.to_path_buf()))?
            .to_string_lossy()
            .into_owned();

        let dest = self.root.join(&name);
        let size = fs::copy(src, &dest).map_err(|e| StoreError::io(src, e))?;
        let hash = hash_file(&dest)?;
        index.put(name.clone(), hash)?;

        info!(%name, %hash, size, "Imported file");

        Ok(FileRecord {
            name,
            content_hash: hash,
            size_bytes: Some(size),
        })
    }

    /// Names of the files in the root, sorted.
    pub fn list(&self) -> Result<Vec<String>, StoreError> {
        let entries = fs::read_dir(&self.root).map_err(|e| StoreError::io(&self.root, e))?;
        let mut names = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| StoreError::io(&self.root, e))?;
            if entry.path().is_file() {
                names.push(entry.file_name().to_string_lossy().into_owned());
            }
        }
        names.sort();
        Ok(names)
    }

    /// Find a local file holding `hash` among the names indexed for it.
    ///
    /// Downloads are indexed as `requested/<hash>` only once complete, so a
    /// partial download is never served.
    pub fn resolve(&self, hash: &ContentHash, index: &NameIndex) -> Option<PathBuf> {
        let resolved = index
            .names_for(hash)
            .into_iter()
            .map(|name| self.root.join(name))
            .find(|path| path.is_file());

        debug!(%hash, found = resolved.is_some(), "Resolved content hash");
        resolved
    }
}

//! Directory management for the Orca node.
//!
//! ```text
//! <datadir>/
//! ├── config.toml
//! ├── names.json
//! ├── keystore/identity.key
//! └── files/
//!     └── requested/
//! ```

use crate::{
    ConfigurationError,
    args::DataDirArgs,
    constants::{
        CONFIG_FILE, DEFAULT_DATA_DIR_NAME, FILES_DIR, IDENTITY_KEY_FILE, KEYSTORE_DIR,
        NAME_INDEX_FILE,
    },
};
use directories::ProjectDirs;
use std::{fs, path::PathBuf};

/// Returns the default project directories for Orca.
pub fn default_project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("org", DEFAULT_DATA_DIR_NAME, DEFAULT_DATA_DIR_NAME)
}

/// Returns the default data directory path.
pub fn default_data_dir() -> Option<PathBuf> {
    default_project_dirs().map(|dirs| dirs.data_dir().to_path_buf())
}

/// Paths inside the node's data directory.
#[derive(Debug, Clone)]
pub struct DataDirs {
    pub root: PathBuf,
}

impl DataDirs {
    /// Resolve the data directory from `args` (or the platform default) and create it.
    pub fn new(args: &DataDirArgs) -> Result<Self, ConfigurationError> {
        let root = match &args.datadir {
            Some(dir) => dir.clone(),
            None => default_data_dir().ok_or(ConfigurationError::NoDataDir)?,
        };
        Self::at(root)
    }

    /// Use `root` as the data directory, creating it if needed.
    pub fn at(root: impl Into<PathBuf>) -> Result<Self, ConfigurationError> {
        let root = root.into();
        fs::create_dir_all(&root)
            .map_err(|e| ConfigurationError::io("failed to create directory", &root, e))?;
        Ok(Self { root })
    }

    pub fn config_file(&self) -> PathBuf {
        self.root.join(CONFIG_FILE)
    }

    /// Root of stored files. Downloads go to its `requested/` subdirectory.
    pub fn files_dir(&self) -> PathBuf {
        self.root.join(FILES_DIR)
    }

    pub fn name_index_file(&self) -> PathBuf {
        self.root.join(NAME_INDEX_FILE)
    }

    pub fn keys_dir(&self) -> PathBuf {
        self.root.join(KEYSTORE_DIR)
    }

    pub fn identity_key_file(&self) -> PathBuf {
        self.keys_dir().join(IDENTITY_KEY_FILE)
    }
}

//! State shared by every command: data directories, configuration and local files.

use crate::{cli::Cli, config::OrcaConfig};
use libp2p::identity::Keypair;
use orca_node_core::{ConfigurationError, dirs::DataDirs, identity};
use orca_store::{LocalFiles, NameIndex};
use std::sync::Arc;
use tracing::debug;

/// Everything a command needs from the local node.
pub struct NodeContext {
    pub dirs: DataDirs,
    pub config: OrcaConfig,
    pub files: LocalFiles,
    pub names: Arc<NameIndex>,
}

impl NodeContext {
    /// Resolve the data directory, load configuration and open the local store.
    pub fn from_cli(cli: &Cli) -> eyre::Result<Self> {
        let dirs = DataDirs::new(&cli.datadir)?;
        let mut config = OrcaConfig::load(Some(&dirs.config_file()))?;
        config.apply_args(&cli.node);
        Self::open(dirs, config)
    }

    pub fn open(dirs: DataDirs, config: OrcaConfig) -> eyre::Result<Self> {
        let files = LocalFiles::open(dirs.files_dir())?;
        let names = Arc::new(NameIndex::open(dirs.name_index_file())?);
        debug!(datadir = %dirs.root.display(), indexed = names.len(), "Opened node context");
        Ok(Self {
            dirs,
            config,
            files,
            names,
        })
    }

    /// The node keypair, generated on first use.
    pub fn keypair(&self) -> Result<Keypair, ConfigurationError> {
        identity::load_or_generate(&self.dirs.identity_key_file())
    }
}

use std::path::PathBuf;

/// Fatal problems with the node's local setup.
#[derive(Debug, thiserror::Error)]
pub enum ConfigurationError {
    #[error("no wallet password configured (set `wallet.password` or pass --wallet.password)")]
    MissingWalletPassword,

    #[error("failed to load configuration: {0}")]
    Load(String),

    #[error("invalid value for {field}: {message}")]
    Invalid { field: &'static str, message: String },

    #[error("could not determine a data directory; pass --datadir")]
    NoDataDir,

    #[error("{action} {path}: {source}")]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("identity key at {path} is unreadable: {message}")]
    Identity { path: PathBuf, message: String },
}

impl ConfigurationError {
    pub(crate) fn io(action: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            action,
            path: path.into(),
            source,
        }
    }
}

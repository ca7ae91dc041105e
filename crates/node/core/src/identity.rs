//! Node identity management.
//!
//! The node keypair is stored protobuf-encoded in the keystore and generated
//! on first use. The transport identity (peer id) and the holder identity key
//! used in the directory are both derived from it.

use crate::ConfigurationError;
use libp2p::identity::Keypair;
use std::{fs, path::Path};
use tracing::{debug, info};

/// Load the keypair at `path`, generating and persisting an ed25519 key if absent.
pub fn load_or_generate(path: &Path) -> Result<Keypair, ConfigurationError> {
    if path.exists() {
        let bytes =
            fs::read(path).map_err(|e| ConfigurationError::io("failed to read", path, e))?;
        let keypair = Keypair::from_protobuf_encoding(&bytes).map_err(|e| {
            ConfigurationError::Identity {
                path: path.to_path_buf(),
                message: e.to_string(),
            }
        })?;
        debug!(path = %path.display(), "Loaded node identity");
        return Ok(keypair);
    }

    let keypair = Keypair::generate_ed25519();
    let encoded = keypair
        .to_protobuf_encoding()
        .map_err(|e| ConfigurationError::Identity {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| ConfigurationError::io("failed to create directory", parent, e))?;
    }
    fs::write(path, encoded).map_err(|e| ConfigurationError::io("failed to write", path, e))?;
    restrict_permissions(path)?;

    info!(
        path = %path.display(),
        peer_id = %keypair.public().to_peer_id(),
        "Generated new node identity"
    );
    Ok(keypair)
}

/// Identity key this node registers with the directory. Peers pay to it.
pub fn identity_key(keypair: &Keypair) -> String {
    keypair.public().to_peer_id().to_base58()
}

#[cfg(unix)]
fn restrict_permissions(path: &Path) -> Result<(), ConfigurationError> {
    use crate::constants::SENSITIVE_FILE_MODE;
    use std::os::unix::fs::PermissionsExt;

    fs::set_permissions(path, fs::Permissions::from_mode(SENSITIVE_FILE_MODE))
        .map_err(|e| ConfigurationError::io("failed to set permissions on", path, e))
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) -> Result<(), ConfigurationError> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_generated_identity_is_reloaded() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("keystore").join("identity.key");

        let first = load_or_generate(&path).unwrap();
        assert!(path.exists());
        let second = load_or_generate(&path).unwrap();

        assert_eq!(first.public(), second.public());
        assert_eq!(identity_key(&first), identity_key(&second));
    }

    #[test]
    fn test_garbage_key_file_is_rejected() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("identity.key");
        fs::write(&path, b"not a key").unwrap();

        assert!(matches!(
            load_or_generate(&path),
            Err(ConfigurationError::Identity { .. })
        ));
    }
}

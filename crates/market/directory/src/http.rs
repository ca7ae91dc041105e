//! HTTP client for the market directory.

use orca_api::{Directory, DirectoryError};
use orca_primitives::{ContentHash, FileRecord, Holder};
use orca_store::hash_file;
use serde::{Deserialize, Serialize};
use std::{net::IpAddr, path::Path};
use tracing::{debug, info, warn};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CheckHoldersRequest<'a> {
    file_hash: &'a str,
}

#[derive(Deserialize)]
struct CheckHoldersResponse {
    #[serde(default)]
    holders: Vec<Holder>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RegisterFileRequest<'a> {
    file_hash: ContentHash,
    identity_key: &'a str,
    name: &'a str,
    size_bytes: u64,
    price_per_unit: u64,
    ip: IpAddr,
    port: u16,
}

/// Talks to the market server's directory endpoints.
///
/// Files registered through this client are advertised under `identity_key`,
/// which is also where buyers send their payments.
#[derive(Debug, Clone)]
pub struct HttpDirectory {
    client: reqwest::Client,
    base_url: String,
    identity_key: String,
}

impl HttpDirectory {
    pub fn new(base_url: impl Into<String>, identity_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            identity_key: identity_key.into(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{path}", self.base_url)
    }
}

fn unavailable(e: impl std::fmt::Display) -> DirectoryError {
    DirectoryError::Unavailable {
        message: e.to_string(),
    }
}

/// Size and content hash of the file at `path`. Reads the whole file.
fn file_digest(path: &Path) -> Result<(u64, ContentHash), DirectoryError> {
    let size = std::fs::metadata(path)
        .map_err(|source| DirectoryError::Io {
            path: path.display().to_string(),
            source,
        })?
        .len();
    let hash = hash_file(path).map_err(|e| DirectoryError::Hash {
        path: path.display().to_string(),
        source: Box::new(e),
    })?;
    Ok((size, hash))
}

#[async_trait::async_trait]
impl Directory for HttpDirectory {
    async fn check_holders(&self, id: &str) -> Result<Vec<Holder>, DirectoryError> {
        let response = self
            .client
            .post(self.url("check-holders"))
            .json(&CheckHoldersRequest { file_hash: id })
            .send()
            .await
            .map_err(unavailable)?
            .error_for_status()
            .map_err(unavailable)?;

        let body: CheckHoldersResponse = response.json().await.map_err(unavailable)?;
        debug!(%id, holders = body.holders.len(), "Checked holders");
        Ok(body.holders)
    }

    async fn register_file(
        &self,
        path: &Path,
        name: &str,
        price_per_unit: u64,
        ip: IpAddr,
        port: u16,
    ) -> Result<FileRecord, DirectoryError> {
        let owned = path.to_path_buf();
        let (size_bytes, file_hash) = tokio::task::spawn_blocking(move || file_digest(&owned))
            .await
            .map_err(|e| DirectoryError::Hash {
                path: path.display().to_string(),
                source: Box::new(e),
            })??;

        let response = self
            .client
            .post(self.url("register-file"))
            .json(&RegisterFileRequest {
                file_hash,
                identity_key: &self.identity_key,
                name,
                size_bytes,
                price_per_unit,
                ip,
                port,
            })
            .send()
            .await
            .map_err(unavailable)?;

        let status = response.status();
        if status.is_client_error() {
            let reason = match response.text().await {
                Ok(body) => body,
                Err(e) => {
                    warn!(%name, error = %e, "Failed to read rejection body");
                    status.to_string()
                }
            };
            return Err(DirectoryError::RegistrationRejected { reason });
        }
        if !status.is_success() {
            return Err(unavailable(format!("directory returned {status}")));
        }

        info!(%name, hash = %file_hash, price_per_unit, "Registered file with directory");

        Ok(FileRecord {
            name: name.to_string(),
            content_hash: file_hash,
            size_bytes: Some(size_bytes),
        })
    }
}

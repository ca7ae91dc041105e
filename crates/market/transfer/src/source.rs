//! HTTP client for a holder's chunk endpoint.

use crate::TOTAL_CHUNKS_HEADER;
use orca_api::{Chunk, ChunkSource, TransferError};
use orca_primitives::{ContentHash, Holder};
use std::net::IpAddr;
use tracing::trace;

/// Fetches chunks over `GET /get-file?hash=<hash>&chunk=<index>`.
#[derive(Debug, Clone, Default)]
pub struct HttpChunkSource {
    client: reqwest::Client,
}

impl HttpChunkSource {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

fn holder_url(holder: &Holder) -> String {
    match holder.ip {
        IpAddr::V4(ip) => format!("http://{ip}:{}/get-file", holder.port),
        IpAddr::V6(ip) => format!("http://[{ip}]:{}/get-file", holder.port),
    }
}

#[async_trait::async_trait]
impl ChunkSource for HttpChunkSource {
    async fn fetch_chunk(
        &self,
        holder: &Holder,
        hash: &ContentHash,
        index: u64,
    ) -> Result<Chunk, TransferError> {
        let fetch_err = |message: String| TransferError::Fetch {
            hash: *hash,
            index,
            message,
        };

        let response = self
            .client
            .get(holder_url(holder))
            .query(&[("hash", hash.to_hex()), ("chunk", index.to_string())])
            .send()
            .await
            .map_err(|e| fetch_err(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(fetch_err(format!("holder answered {status}")));
        }

        let total_chunks = response
            .headers()
            .get(TOTAL_CHUNKS_HEADER)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.trim().parse::<u64>().ok())
            .ok_or_else(|| fetch_err(format!("missing or invalid {TOTAL_CHUNKS_HEADER} header")))?;

        let payload = response
            .bytes()
            .await
            .map_err(|e| fetch_err(e.to_string()))?;

        trace!(%hash, index, total_chunks, bytes = payload.len(), "Fetched chunk");
        Ok(Chunk {
            total_chunks,
            payload,
        })
    }
}

//! Holder-side chunk endpoint.

use axum::{
    Router,
    extract::{Query, State},
    http::{HeaderName, StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use bytes::Bytes;
use orca_api::Chunk;
use orca_primitives::{CHUNK_SIZE, ContentHash, chunk_count};
use orca_store::{LocalFiles, NameIndex};
use serde::Deserialize;
use std::{io, io::SeekFrom, path::Path, sync::Arc};
use tokio::{
    fs::File,
    io::{AsyncReadExt, AsyncSeekExt},
};
use tracing::{debug, warn};

/// Response header carrying the number of chunks the content is split into.
pub const TOTAL_CHUNKS_HEADER: &str = "x-total-chunks";

/// Read chunk `index` of the file at `path`.
///
/// Returns `None` when the index is past the end of the file.
pub async fn read_chunk(path: &Path, index: u64) -> io::Result<Option<Chunk>> {
    let mut file = File::open(path).await?;
    let size = file.metadata().await?.len();
    let total_chunks = chunk_count(size);
    if index >= total_chunks {
        return Ok(None);
    }

    file.seek(SeekFrom::Start(index * CHUNK_SIZE as u64)).await?;
    let mut payload = Vec::with_capacity(CHUNK_SIZE.min(size as usize));
    file.take(CHUNK_SIZE as u64).read_to_end(&mut payload).await?;

    Ok(Some(Chunk {
        total_chunks,
        payload: Bytes::from(payload),
    }))
}

/// Files this node serves to buyers.
#[derive(Debug, Clone)]
pub struct ChunkServer {
    files: LocalFiles,
    names: Arc<NameIndex>,
}

impl ChunkServer {
    pub fn new(files: LocalFiles, names: Arc<NameIndex>) -> Self {
        Self { files, names }
    }
}

#[derive(Deserialize)]
struct GetFileQuery {
    hash: String,
    chunk: u64,
}

async fn get_file(
    State(server): State<Arc<ChunkServer>>,
    Query(query): Query<GetFileQuery>,
) -> Response {
    let Ok(hash) = query.hash.parse::<ContentHash>() else {
        return (StatusCode::BAD_REQUEST, "invalid content hash").into_response();
    };
    let Some(path) = server.files.resolve(&hash, &server.names) else {
        return (StatusCode::NOT_FOUND, "content not held here").into_response();
    };

    match read_chunk(&path, query.chunk).await {
        Ok(Some(chunk)) => {
            debug!(%hash, chunk = query.chunk, total = chunk.total_chunks, "Serving chunk");
            metrics::counter!("transfer.chunks_served_total").increment(1);
            (
                [
                    (
                        HeaderName::from_static(TOTAL_CHUNKS_HEADER),
                        chunk.total_chunks.to_string(),
                    ),
                    (header::CONTENT_TYPE, "application/octet-stream".to_string()),
                ],
                chunk.payload,
            )
                .into_response()
        }
        Ok(None) => {
            (StatusCode::RANGE_NOT_SATISFIABLE, "chunk index out of range").into_response()
        }
        Err(e) => {
            warn!(%hash, path = %path.display(), error = %e, "Failed to read chunk");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

/// `GET /get-file?hash=<hash>&chunk=<index>` backed by `server`.
pub fn chunk_routes<S: Clone + Send + Sync + 'static>(server: ChunkServer) -> Router<S> {
    Router::new()
        .route("/get-file", get(get_file))
        .with_state(Arc::new(server))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_read_chunk_boundaries() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("blob");
        let data: Vec<u8> = (0..CHUNK_SIZE * 2 + 10).map(|i| (i % 251) as u8).collect();
        std::fs::write(&path, &data).unwrap();

        let first = read_chunk(&path, 0).await.unwrap().unwrap();
        assert_eq!(first.total_chunks, 3);
        assert_eq!(first.payload.as_ref(), &data[..CHUNK_SIZE]);

        let last = read_chunk(&path, 2).await.unwrap().unwrap();
        assert_eq!(last.payload.as_ref(), &data[CHUNK_SIZE * 2..]);

        assert!(read_chunk(&path, 3).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_read_empty_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty");
        std::fs::write(&path, b"").unwrap();

        let chunk = read_chunk(&path, 0).await.unwrap().unwrap();
        assert_eq!(chunk.total_chunks, 1);
        assert!(chunk.payload.is_empty());
    }
}

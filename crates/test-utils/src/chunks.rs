use bytes::Bytes;
use orca_api::{Chunk, ChunkSource, TransferError};
use orca_primitives::{ContentHash, Holder};
use parking_lot::Mutex;

type FetchHook = Box<dyn Fn(u64) + Send + Sync>;

/// Serves a fixed list of payloads, one per chunk index.
#[derive(Default)]
pub struct ScriptedChunkSource {
    payloads: Vec<Bytes>,
    fail_at: Option<u64>,
    on_fetch: Option<FetchHook>,
    fetched: Mutex<Vec<u64>>,
}

impl ScriptedChunkSource {
    pub fn new<I, P>(payloads: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<Bytes>,
    {
        Self {
            payloads: payloads.into_iter().map(Into::into).collect(),
            ..Default::default()
        }
    }

    /// Fail the fetch of chunk `index`.
    pub fn failing_at(mut self, index: u64) -> Self {
        self.fail_at = Some(index);
        self
    }

    /// Run `hook` with the chunk index before each fetch is answered.
    pub fn on_fetch(mut self, hook: impl Fn(u64) + Send + Sync + 'static) -> Self {
        self.on_fetch = Some(Box::new(hook));
        self
    }

    /// Indices requested so far, in order.
    pub fn fetched(&self) -> Vec<u64> {
        self.fetched.lock().clone()
    }

    /// All payloads concatenated.
    pub fn content(&self) -> Vec<u8> {
        self.payloads.iter().flat_map(|p| p.iter().copied()).collect()
    }
}

#[async_trait::async_trait]
impl ChunkSource for ScriptedChunkSource {
    async fn fetch_chunk(
        &self,
        _holder: &Holder,
        hash: &ContentHash,
        index: u64,
    ) -> Result<Chunk, TransferError> {
        self.fetched.lock().push(index);
        if let Some(hook) = &self.on_fetch {
            hook(index);
        }

        let fetch_error = |message: &str| TransferError::Fetch {
            hash: *hash,
            index,
            message: message.to_string(),
        };
        if self.fail_at == Some(index) {
            return Err(fetch_error("connection reset by peer"));
        }
        let payload = usize::try_from(index)
            .ok()
            .and_then(|i| self.payloads.get(i))
            .ok_or_else(|| fetch_error("chunk index out of range"))?;

        Ok(Chunk {
            total_chunks: self.payloads.len() as u64,
            payload: payload.clone(),
        })
    }
}

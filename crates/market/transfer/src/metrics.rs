//! Transfer session metrics

use metrics::Counter;

#[derive(Clone, Debug)]
pub(crate) struct TransferMetrics {
    /// Chunks received from holders
    pub(crate) chunks_fetched_total: Counter,
    /// Payments made for chunks
    pub(crate) chunk_payments_total: Counter,
    /// Bytes appended to destination files
    pub(crate) bytes_written_total: Counter,
    /// Sessions stopped early because their job was terminated
    pub(crate) early_stops_total: Counter,
    /// Sessions that wrote every chunk
    pub(crate) completed_total: Counter,
}

impl Default for TransferMetrics {
    fn default() -> Self {
        Self {
            chunks_fetched_total: metrics::counter!("transfer.chunks_fetched_total"),
            chunk_payments_total: metrics::counter!("transfer.chunk_payments_total"),
            bytes_written_total: metrics::counter!("transfer.bytes_written_total"),
            early_stops_total: metrics::counter!("transfer.early_stops_total"),
            completed_total: metrics::counter!("transfer.completed_total"),
        }
    }
}

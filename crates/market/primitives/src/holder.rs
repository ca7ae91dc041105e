//! Content holders.

use serde::{Deserialize, Serialize};
use std::net::{IpAddr, SocketAddr};

/// A peer's advertised offer to serve a given content hash.
///
/// Holders of the same hash form an unordered set; `price_per_unit` is the
/// only ranking signal. The identity key is also the wallet address that
/// receives per-chunk payments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Holder {
    pub identity_key: String,
    pub ip: IpAddr,
    pub port: u16,
    pub price_per_unit: u64,
}

impl Holder {
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.ip, self.port)
    }

    /// Wallet address that payments for this holder's chunks are sent to.
    pub fn wallet_address(&self) -> &str {
        &self.identity_key
    }
}

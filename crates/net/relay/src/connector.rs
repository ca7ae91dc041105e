use crate::{PeerAddrInfo, RelayResponse};
use orca_api::ConnectivityError;
use orca_net_connectivity::TransportHost;
use tracing::info;

/// Side-channel of the well-known public relay.
pub const DEFAULT_RELAY_URL: &str = "http://130.245.173.212:45677/relay";

/// Fetches a relay's address info and connects a host to it.
#[derive(Debug, Clone)]
pub struct RelayConnector {
    client: reqwest::Client,
    url: String,
}

impl Default for RelayConnector {
    fn default() -> Self {
        Self::new(DEFAULT_RELAY_URL)
    }
}

impl RelayConnector {
    /// `url` is the relay's full `/relay` endpoint.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: url.into(),
        }
    }

    pub async fn fetch(&self) -> Result<PeerAddrInfo, ConnectivityError> {
        let fetch_err = |e: reqwest::Error| ConnectivityError::RelayFetch(e.to_string());
        let response: RelayResponse = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(fetch_err)?
            .error_for_status()
            .map_err(fetch_err)?
            .json()
            .await
            .map_err(fetch_err)?;
        Ok(response.addr)
    }

    /// Fetch the relay's info and connect `host` to it.
    pub async fn connect<H: TransportHost>(
        &self,
        host: &H,
    ) -> Result<PeerAddrInfo, ConnectivityError> {
        let relay = self.fetch().await?;
        host.connect(relay.id, relay.addrs.clone()).await?;
        info!(relay = %relay.id, "Connected to relay");
        Ok(relay)
    }
}

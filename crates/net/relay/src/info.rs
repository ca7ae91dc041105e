use libp2p::{Multiaddr, PeerId};
use serde::{Deserialize, Serialize};
use serde_with::{DisplayFromStr, serde_as};

/// A peer's identity and the addresses it can be dialed at.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeerAddrInfo {
    #[serde(rename = "ID")]
    #[serde_as(as = "DisplayFromStr")]
    pub id: PeerId,

    #[serde(rename = "Addrs")]
    #[serde_as(as = "Vec<DisplayFromStr>")]
    pub addrs: Vec<Multiaddr>,
}

/// Body of `GET /relay`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelayResponse {
    pub addr: PeerAddrInfo,
}

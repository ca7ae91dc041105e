//! Relay role for Orca nodes.
//!
//! A publicly reachable node can run a [`RelayService`]: a libp2p host with
//! the relay server enabled, plus a tiny HTTP side-channel that hands out the
//! relay's address info. Nodes behind NAT use a [`RelayConnector`] to fetch
//! that info and connect through the relay.

mod connector;
mod info;
mod service;

pub use connector::{DEFAULT_RELAY_URL, RelayConnector};
pub use info::{PeerAddrInfo, RelayResponse};
pub use service::{RelayConfig, RelayService, RelayState};

//! Peer connectivity for Orca nodes.
//!
//! A node derives its transport identity from its keypair, opens a listening
//! host and works out how other peers can reach it:
//!
//! - If the reflected public IP sits inside a private range, the node is
//!   reachable directly at its first non-loopback listen address.
//! - Otherwise it advertises a circuit address through the first bootstrap relay.
//!
//! [`TransportHost`] is the narrow capability the rest of the node uses;
//! [`Libp2pHost`] is the libp2p implementation.

mod address;
mod behaviour;
mod host;
mod manager;
mod nat;

pub use address::{advertisable_addrs, circuit_address, direct_address, is_circuit};
pub use host::{HostConfig, Libp2pHost, TransportHost};
pub use manager::{ConnectivityConfig, ConnectivityManager, Location};
pub use nat::{DEFAULT_REFLECTOR_URL, HttpReflector, Reflector, parse_origin, requires_relay};

pub use libp2p::{Multiaddr, PeerId, identity::Keypair};

/// Transport identity of the holder of `keypair`.
pub fn transport_identity(keypair: &Keypair) -> PeerId {
    keypair.public().to_peer_id()
}

//! Network behaviour shared by every Orca host.

use libp2p::{
    PeerId, identify,
    identity::PublicKey,
    ping, relay,
    swarm::{NetworkBehaviour, behaviour::toggle::Toggle},
};
use std::time::Duration;

const PROTOCOL_VERSION: &str = "/orca/1.0.0";

/// Identify and ping for liveness, the relay client for reaching NATed peers,
/// and the relay server when the node acts as a relay.
#[derive(NetworkBehaviour)]
pub(crate) struct HostBehaviour {
    pub(crate) identify: identify::Behaviour,
    pub(crate) ping: ping::Behaviour,
    pub(crate) relay_client: relay::client::Behaviour,
    pub(crate) relay_server: Toggle<relay::Behaviour>,
}

impl HostBehaviour {
    pub(crate) fn new(
        public_key: PublicKey,
        relay_client: relay::client::Behaviour,
        relay_server: bool,
    ) -> Self {
        let local_peer_id: PeerId = public_key.to_peer_id();
        Self {
            identify: identify::Behaviour::new(identify::Config::new(
                PROTOCOL_VERSION.to_string(),
                public_key,
            )),
            ping: ping::Behaviour::new(ping::Config::new().with_interval(Duration::from_secs(15))),
            relay_client,
            relay_server: relay_server
                .then(|| relay::Behaviour::new(local_peer_id, relay::Config::default()))
                .into(),
        }
    }
}

//! Reachability resolution for a running host.

use crate::{
    DEFAULT_REFLECTOR_URL, HostConfig, HttpReflector, Libp2pHost, Reflector, TransportHost,
    address::{circuit_address, direct_address},
    nat::requires_relay,
};
use libp2p::{Multiaddr, identity::Keypair, multiaddr::Protocol};
use orca_api::ConnectivityError;
use std::net::IpAddr;
use tokio::task::JoinHandle;
use tracing::{info, warn};

/// Connectivity settings, injected at construction.
#[derive(Debug, Clone)]
pub struct ConnectivityConfig {
    pub listen_port: u16,
    /// Bootstrap relays in preference order. Only the first is used for circuits.
    pub relays: Vec<Multiaddr>,
    pub reflector_url: String,
}

impl Default for ConnectivityConfig {
    fn default() -> Self {
        Self {
            listen_port: 4001,
            relays: Vec::new(),
            reflector_url: DEFAULT_REFLECTOR_URL.to_string(),
        }
    }
}

/// Where this node appears from and how peers should dial it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    pub public_ip: IpAddr,
    pub requires_relay: bool,
    pub address: Multiaddr,
}

/// Owns the live host and answers reachability questions about it.
pub struct ConnectivityManager<H = Libp2pHost, R = HttpReflector> {
    host: H,
    reflector: R,
    relays: Vec<Multiaddr>,
    host_task: Option<JoinHandle<()>>,
}

impl ConnectivityManager {
    /// Spawn a libp2p host on `/ip4/0.0.0.0/tcp/<listen_port>`.
    pub fn start(keypair: Keypair, config: ConnectivityConfig) -> Result<Self, ConnectivityError> {
        let (host, task) = Libp2pHost::spawn(keypair, HostConfig::on_port(config.listen_port))?;
        let mut manager = Self::new(host, HttpReflector::new(config.reflector_url), config.relays);
        manager.host_task = Some(task);
        Ok(manager)
    }
}

impl<H: TransportHost, R: Reflector> ConnectivityManager<H, R> {
    pub fn new(host: H, reflector: R, relays: Vec<Multiaddr>) -> Self {
        Self {
            host,
            reflector,
            relays,
            host_task: None,
        }
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn reflector(&self) -> &R {
        &self.reflector
    }

    /// `true` when the node must be reached through a relay.
    pub async fn check_nat(&self) -> Result<bool, ConnectivityError> {
        Ok(requires_relay(self.reflector.public_ip().await?))
    }

    /// The address peers should dial, given the NAT check result.
    pub async fn advertised_address(
        &self,
        relay_required: bool,
    ) -> Result<Multiaddr, ConnectivityError> {
        let local = self.host.peer_id();
        if relay_required {
            let relay = self.relays.first().ok_or(ConnectivityError::NoRelayAvailable)?;
            return Ok(circuit_address(relay, local));
        }
        let listen_addrs = self.host.listen_addrs().await?;
        direct_address(&listen_addrs, local).ok_or(ConnectivityError::NoListenAddress)
    }

    /// Reflect the public IP and resolve the advertised address from it.
    pub async fn locate(&self) -> Result<Location, ConnectivityError> {
        let public_ip = self.reflector.public_ip().await?;
        let relay_required = requires_relay(public_ip);
        let address = self.advertised_address(relay_required).await?;
        info!(%public_ip, relay_required, %address, "Resolved advertised address");
        Ok(Location {
            public_ip,
            requires_relay: relay_required,
            address,
        })
    }

    /// Connect to the first bootstrap relay and listen through it.
    ///
    /// Needs the relay address to carry its `/p2p/<id>` suffix.
    pub async fn reserve_relay(&self) -> Result<Multiaddr, ConnectivityError> {
        let relay = self.relays.first().ok_or(ConnectivityError::NoRelayAvailable)?;
        let Some(Protocol::P2p(relay_peer)) = relay.iter().last() else {
            warn!(%relay, "Relay address has no peer id, cannot reserve a circuit");
            return Err(ConnectivityError::Dial {
                peer: relay.to_string(),
                message: "relay address has no /p2p/<id> suffix".to_string(),
            });
        };
        self.host.connect(relay_peer, vec![relay.clone()]).await?;
        let circuit = relay.clone().with(Protocol::P2pCircuit);
        self.host.listen_on(circuit.clone()).await?;
        info!(%relay, "Listening through relay");
        Ok(circuit)
    }
}

impl<H, R> Drop for ConnectivityManager<H, R> {
    fn drop(&mut self) {
        if let Some(task) = self.host_task.take() {
            task.abort();
        }
    }
}

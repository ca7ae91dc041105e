//! The transport host: a libp2p swarm driven by a background task.
//!
//! [`Libp2pHost`] is a cheap handle. Every call is a command sent to the task
//! that owns the swarm, answered over a oneshot channel once the swarm has
//! produced the matching event.

use crate::{
    address::is_circuit,
    behaviour::{HostBehaviour, HostBehaviourEvent},
};
use futures::StreamExt;
use libp2p::{
    Multiaddr, PeerId, Swarm, SwarmBuilder, identify,
    identity::Keypair,
    multiaddr::Protocol,
    noise, ping, relay,
    swarm::{SwarmEvent, dial_opts::DialOpts},
    tcp, yamux,
};
use orca_api::ConnectivityError;
use std::{collections::HashMap, net::Ipv4Addr, time::Duration};
use tokio::{
    sync::{mpsc, oneshot},
    task::JoinHandle,
};
use tracing::{debug, info, trace, warn};

const COMMAND_BUFFER: usize = 64;

/// The transport capability the node relies on.
#[async_trait::async_trait]
#[auto_impl::auto_impl(&, Arc)]
pub trait TransportHost: Send + Sync {
    /// Transport identity of this host.
    fn peer_id(&self) -> PeerId;

    /// Addresses the host is listening on. Waits for the first one to come up.
    async fn listen_addrs(&self) -> Result<Vec<Multiaddr>, ConnectivityError>;

    /// Start listening on an additional address, such as a relay circuit.
    async fn listen_on(&self, addr: Multiaddr) -> Result<(), ConnectivityError>;

    /// Connect to `peer` at one of `addrs`. Resolves once a connection is up.
    async fn connect(&self, peer: PeerId, addrs: Vec<Multiaddr>) -> Result<(), ConnectivityError>;
}

/// How to build a [`Libp2pHost`].
#[derive(Debug, Clone)]
pub struct HostConfig {
    pub listen_addr: Multiaddr,
    /// Serve relay reservations and circuits for other peers.
    pub relay_server: bool,
    pub idle_timeout: Duration,
}

impl HostConfig {
    /// Listen on all interfaces at `port`.
    pub fn on_port(port: u16) -> Self {
        Self {
            listen_addr: Multiaddr::empty()
                .with(Protocol::Ip4(Ipv4Addr::UNSPECIFIED))
                .with(Protocol::Tcp(port)),
            relay_server: false,
            idle_timeout: Duration::from_secs(60),
        }
    }

    pub fn with_relay_server(mut self) -> Self {
        self.relay_server = true;
        self
    }
}

type Reply<T> = oneshot::Sender<Result<T, ConnectivityError>>;

enum HostCommand {
    ListenAddrs(oneshot::Sender<Vec<Multiaddr>>),
    ListenOn { addr: Multiaddr, reply: Reply<()> },
    Connect { peer: PeerId, addrs: Vec<Multiaddr>, reply: Reply<()> },
}

/// Handle to a libp2p host running on a background task.
///
/// The task stops once every handle is dropped.
#[derive(Debug, Clone)]
pub struct Libp2pHost {
    peer_id: PeerId,
    commands: mpsc::Sender<HostCommand>,
}

impl Libp2pHost {
    /// Build the swarm, start listening and spawn its event loop.
    pub fn spawn(
        keypair: Keypair,
        config: HostConfig,
    ) -> Result<(Self, JoinHandle<()>), ConnectivityError> {
        let host_err = |e: &dyn std::fmt::Display| ConnectivityError::Host(e.to_string());
        let relay_server = config.relay_server;

        let mut swarm = SwarmBuilder::with_existing_identity(keypair)
            .with_tokio()
            .with_tcp(
                tcp::Config::default().nodelay(true),
                noise::Config::new,
                yamux::Config::default,
            )
            .map_err(|e| host_err(&e))?
            .with_dns()
            .map_err(|e| host_err(&e))?
            .with_relay_client(noise::Config::new, yamux::Config::default)
            .map_err(|e| host_err(&e))?
            .with_behaviour(|key, relay_client| {
                Ok(HostBehaviour::new(key.public(), relay_client, relay_server))
            })
            .map_err(|e| host_err(&e))?
            .with_swarm_config(|cfg| cfg.with_idle_connection_timeout(config.idle_timeout))
            .build();

        let peer_id = *swarm.local_peer_id();
        swarm
            .listen_on(config.listen_addr.clone())
            .map_err(|e| host_err(&e))?;
        info!(%peer_id, listen = %config.listen_addr, relay_server, "Transport host started");

        let (commands, rx) = mpsc::channel(COMMAND_BUFFER);
        let driver = HostDriver {
            swarm,
            commands: rx,
            relay_server,
            listen_addrs: Vec::new(),
            addr_waiters: Vec::new(),
            pending_dials: HashMap::new(),
        };
        let task = tokio::spawn(driver.run());

        Ok((Self { peer_id, commands }, task))
    }

    async fn request<T>(
        &self,
        command: impl FnOnce(oneshot::Sender<T>) -> HostCommand,
    ) -> Result<T, ConnectivityError> {
        let (tx, rx) = oneshot::channel();
        self.commands
            .send(command(tx))
            .await
            .map_err(|_| ConnectivityError::HostStopped)?;
        rx.await.map_err(|_| ConnectivityError::HostStopped)
    }
}

#[async_trait::async_trait]
impl TransportHost for Libp2pHost {
    fn peer_id(&self) -> PeerId {
        self.peer_id
    }

    async fn listen_addrs(&self) -> Result<Vec<Multiaddr>, ConnectivityError> {
        self.request(HostCommand::ListenAddrs).await
    }

    async fn listen_on(&self, addr: Multiaddr) -> Result<(), ConnectivityError> {
        self.request(|reply| HostCommand::ListenOn { addr, reply })
            .await?
    }

    async fn connect(&self, peer: PeerId, addrs: Vec<Multiaddr>) -> Result<(), ConnectivityError> {
        self.request(|reply| HostCommand::Connect { peer, addrs, reply })
            .await?
    }
}

struct HostDriver {
    swarm: Swarm<HostBehaviour>,
    commands: mpsc::Receiver<HostCommand>,
    relay_server: bool,
    listen_addrs: Vec<Multiaddr>,
    /// Callers waiting for the first listen address.
    addr_waiters: Vec<oneshot::Sender<Vec<Multiaddr>>>,
    pending_dials: HashMap<PeerId, Vec<Reply<()>>>,
}

impl HostDriver {
    async fn run(mut self) {
        loop {
            tokio::select! {
                command = self.commands.recv() => match command {
                    Some(command) => self.on_command(command),
                    None => break,
                },
                event = self.swarm.select_next_some() => self.on_swarm_event(event),
            }
        }
        debug!(peer_id = %self.swarm.local_peer_id(), "Transport host stopped");
    }

    fn on_command(&mut self, command: HostCommand) {
        match command {
            HostCommand::ListenAddrs(reply) => {
                if self.listen_addrs.is_empty() {
                    self.addr_waiters.push(reply);
                } else {
                    let _ = reply.send(self.listen_addrs.clone());
                }
            }
            HostCommand::ListenOn { addr, reply } => {
                let result = self
                    .swarm
                    .listen_on(addr.clone())
                    .map(|_| ())
                    .map_err(|e| ConnectivityError::Host(format!("listen on {addr}: {e}")));
                let _ = reply.send(result);
            }
            HostCommand::Connect { peer, addrs, reply } => {
                if self.swarm.is_connected(&peer) {
                    let _ = reply.send(Ok(()));
                    return;
                }
                let opts = DialOpts::peer_id(peer).addresses(addrs).build();
                match self.swarm.dial(opts) {
                    Ok(()) => self.pending_dials.entry(peer).or_default().push(reply),
                    Err(e) => {
                        let _ = reply.send(Err(ConnectivityError::Dial {
                            peer: peer.to_string(),
                            message: e.to_string(),
                        }));
                    }
                }
            }
        }
    }

    fn on_swarm_event(&mut self, event: SwarmEvent<HostBehaviourEvent>) {
        match event {
            SwarmEvent::NewListenAddr { address, .. } => {
                info!(%address, "Listening");
                if self.relay_server && !is_circuit(&address) {
                    self.swarm.add_external_address(address.clone());
                }
                self.listen_addrs.push(address);
                let addrs = self.listen_addrs.clone();
                for waiter in self.addr_waiters.drain(..) {
                    let _ = waiter.send(addrs.clone());
                }
            }
            SwarmEvent::ExpiredListenAddr { address, .. } => {
                debug!(%address, "Listen address expired");
                self.listen_addrs.retain(|a| a != &address);
            }
            SwarmEvent::ListenerError { error, .. } => {
                warn!(%error, "Listener error");
            }
            SwarmEvent::ListenerClosed { reason, .. } => {
                debug!(?reason, "Listener closed");
                // Nothing more will come up for callers still waiting.
                if self.listen_addrs.is_empty() {
                    for waiter in self.addr_waiters.drain(..) {
                        let _ = waiter.send(Vec::new());
                    }
                }
            }
            SwarmEvent::ConnectionEstablished {
                peer_id, endpoint, ..
            } => {
                info!(%peer_id, endpoint = %endpoint.get_remote_address(), "Connection established");
                for reply in self.pending_dials.remove(&peer_id).unwrap_or_default() {
                    let _ = reply.send(Ok(()));
                }
            }
            SwarmEvent::ConnectionClosed { peer_id, cause, .. } => {
                debug!(%peer_id, ?cause, "Connection closed");
            }
            SwarmEvent::OutgoingConnectionError { peer_id, error, .. } => {
                warn!(?peer_id, %error, "Outgoing connection error");
                if let Some(peer_id) = peer_id {
                    for reply in self.pending_dials.remove(&peer_id).unwrap_or_default() {
                        let _ = reply.send(Err(ConnectivityError::Dial {
                            peer: peer_id.to_string(),
                            message: error.to_string(),
                        }));
                    }
                }
            }
            SwarmEvent::Behaviour(event) => self.on_behaviour_event(event),
            _ => {}
        }
    }

    fn on_behaviour_event(&mut self, event: HostBehaviourEvent) {
        match event {
            HostBehaviourEvent::Identify(identify::Event::Received { peer_id, info, .. }) => {
                debug!(%peer_id, agent = %info.agent_version, "Identified peer");
            }
            HostBehaviourEvent::Identify(_) => {}
            HostBehaviourEvent::Ping(ping::Event { peer, result, .. }) => match result {
                Ok(rtt) => trace!(%peer, ?rtt, "Ping"),
                Err(e) => debug!(%peer, %e, "Ping failed"),
            },
            HostBehaviourEvent::RelayClient(event) => match event {
                relay::client::Event::ReservationReqAccepted { relay_peer_id, .. } => {
                    info!(relay = %relay_peer_id, "Relay reservation accepted");
                }
                other => debug!(?other, "Relay client event"),
            },
            HostBehaviourEvent::RelayServer(event) => match event {
                relay::Event::ReservationReqAccepted { src_peer_id, .. } => {
                    info!(peer = %src_peer_id, "Accepted relay reservation");
                }
                relay::Event::CircuitReqAccepted {
                    src_peer_id,
                    dst_peer_id,
                    ..
                } => {
                    info!(src = %src_peer_id, dst = %dst_peer_id, "Relaying circuit");
                }
                other => debug!(?other, "Relay server event"),
            },
        }
    }
}

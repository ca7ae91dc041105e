//! The relay service: relay host plus its HTTP side-channel.

use crate::{PeerAddrInfo, RelayResponse};
use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use libp2p::{Multiaddr, identity::Keypair};
use orca_api::ConnectivityError;
use orca_net_connectivity::{HostConfig, Libp2pHost, TransportHost, advertisable_addrs};
use std::{future::Future, net::SocketAddr, time::Duration};
use tokio::{net::TcpListener, sync::watch, task::JoinHandle};
use tower_http::trace::TraceLayer;
use tracing::{debug, info, warn};

/// Lifecycle of a [`RelayService`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayState {
    /// Host up, advertisement built, side-channel bound but not yet answering.
    Starting,
    /// Answering `GET /relay` and relaying circuits.
    Serving,
    /// Shut down.
    Stopped,
}

#[derive(Debug, Clone)]
pub struct RelayConfig {
    /// Where the relay host listens for peers.
    pub p2p_listen: Multiaddr,
    /// Where the side-channel listens.
    pub http_addr: SocketAddr,
}

impl RelayConfig {
    pub fn on_ports(p2p_port: u16, http_port: u16) -> Self {
        Self {
            p2p_listen: HostConfig::on_port(p2p_port).listen_addr,
            http_addr: SocketAddr::from(([0, 0, 0, 0], http_port)),
        }
    }
}

/// A running relay host whose address info is served over HTTP.
///
/// The advertisement is rebuilt from the host's listen addresses on every
/// request, so interfaces that come up after startup are picked up.
pub struct RelayService {
    host: Libp2pHost,
    host_task: JoinHandle<()>,
    listener: TcpListener,
    state: watch::Sender<RelayState>,
}

async fn current_info(host: &Libp2pHost) -> Result<PeerAddrInfo, ConnectivityError> {
    let addrs = advertisable_addrs(&host.listen_addrs().await?);
    if addrs.is_empty() {
        return Err(ConnectivityError::NoListenAddress);
    }
    Ok(PeerAddrInfo {
        id: host.peer_id(),
        addrs,
    })
}

async fn relay_info(State(host): State<Libp2pHost>) -> Response {
    match current_info(&host).await {
        Ok(addr) => Json(RelayResponse { addr }).into_response(),
        Err(e) => {
            warn!(error = %e, "No relay address to advertise");
            StatusCode::SERVICE_UNAVAILABLE.into_response()
        }
    }
}

impl RelayService {
    /// Start the relay host and bind the side-channel.
    pub async fn start(keypair: Keypair, config: RelayConfig) -> Result<Self, ConnectivityError> {
        let host_config = HostConfig {
            listen_addr: config.p2p_listen,
            relay_server: true,
            idle_timeout: Duration::from_secs(300),
        };
        let (host, host_task) = Libp2pHost::spawn(keypair, host_config)?;

        let advertisement = match current_info(&host).await {
            Ok(info) => info,
            Err(e) => {
                host_task.abort();
                return Err(e);
            }
        };
        debug!(peer_id = %advertisement.id, addrs = ?advertisement.addrs, "Relay host listening");

        let listener = TcpListener::bind(config.http_addr)
            .await
            .map_err(|e| ConnectivityError::Host(format!("bind {}: {e}", config.http_addr)))?;

        let (state, _) = watch::channel(RelayState::Starting);
        Ok(Self {
            host,
            host_task,
            listener,
            state,
        })
    }

    /// What `GET /relay` currently answers with.
    pub async fn advertisement(&self) -> Result<PeerAddrInfo, ConnectivityError> {
        current_info(&self.host).await
    }

    pub fn host(&self) -> &Libp2pHost {
        &self.host
    }

    /// Address the side-channel is bound to.
    pub fn http_addr(&self) -> Result<SocketAddr, ConnectivityError> {
        self.listener
            .local_addr()
            .map_err(|e| ConnectivityError::Host(e.to_string()))
    }

    pub fn state(&self) -> watch::Receiver<RelayState> {
        self.state.subscribe()
    }

    /// Serve until `shutdown` resolves, then stop the host.
    pub async fn serve<F>(self, shutdown: F) -> Result<(), ConnectivityError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let Self {
            host,
            host_task,
            listener,
            state,
        } = self;

        info!(
            peer_id = %host.peer_id(),
            http = ?listener.local_addr().ok(),
            "Relay serving"
        );
        let app = Router::new()
            .route("/relay", get(relay_info))
            .with_state(host)
            .layer(TraceLayer::new_for_http());

        state.send_replace(RelayState::Serving);

        let result = axum::serve(listener, app)
            .with_graceful_shutdown(shutdown)
            .await
            .map_err(|e| ConnectivityError::Host(e.to_string()));

        host_task.abort();
        state.send_replace(RelayState::Stopped);
        info!("Relay stopped");
        result
    }
}

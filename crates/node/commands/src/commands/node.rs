//! Node commands: `location`, `network`, `run` and `relay`.

use super::shutdown_signal;
use crate::context::NodeContext;
use axum::Router;
use eyre::{Result, WrapErr};
use libp2p::{Multiaddr, multiaddr::Protocol};
use orca_api::ConnectivityError;
use orca_market_ledger::notice_routes;
use orca_market_transfer::{ChunkServer, chunk_routes};
use orca_net_connectivity::{ConnectivityManager, HttpReflector, Location, TransportHost};
use orca_net_relay::{RelayConfig, RelayConnector, RelayService};
use std::time::Duration;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

/// Resolve and print how peers can reach this node.
pub async fn location(ctx: &NodeContext) -> Result<Location> {
    let manager = ConnectivityManager::start(ctx.keypair()?, ctx.config.connectivity())?;
    let location = manager.locate().await?;

    println!("Peer ID: {}", manager.host().peer_id());
    println!("Public IP: {}", location.public_ip);
    println!("Relay required: {}", location.requires_relay);
    println!("Advertised address: {}", location.address);
    Ok(location)
}

/// Measure latency to the reflection service.
pub async fn network(ctx: &NodeContext) -> Result<Duration> {
    println!("Testing network latency...");
    let latency = HttpReflector::new(ctx.config.network.reflector.clone())
        .round_trip()
        .await?;
    println!("Latency: {:.1}ms", latency.as_secs_f64() * 1000.0);
    Ok(latency)
}

/// HTTP API of a running node: the chunk endpoint and payment notices.
pub fn node_router(ctx: &NodeContext) -> Router {
    chunk_routes(ChunkServer::new(ctx.files.clone(), ctx.names.clone()))
        .merge(notice_routes())
        .layer(TraceLayer::new_for_http())
}

/// Bring up the host, make the node reachable and serve the HTTP API until Ctrl-C.
pub async fn run(ctx: &NodeContext) -> Result<()> {
    let manager = ConnectivityManager::start(ctx.keypair()?, ctx.config.connectivity())?;
    let location = manager.locate().await?;
    if location.requires_relay {
        let circuit = bridge_relay(ctx, &manager).await?;
        info!(%circuit, "Reachable through relay");
    }

    let addr = ctx.config.api_socket_addr();
    let listener = TcpListener::bind(addr)
        .await
        .wrap_err_with(|| format!("failed to bind HTTP API on {addr}"))?;

    println!("Peer ID: {}", manager.host().peer_id());
    println!("Advertised address: {}", location.address);
    println!("Serving files on http://{addr}");

    axum::serve(listener, node_router(ctx))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .wrap_err("HTTP API failed")?;

    info!("Node stopped");
    Ok(())
}

/// Listen through the first bootstrap relay, falling back to the known relay's side-channel.
async fn bridge_relay(
    ctx: &NodeContext,
    manager: &ConnectivityManager,
) -> Result<Multiaddr, ConnectivityError> {
    match manager.reserve_relay().await {
        Ok(circuit) => Ok(circuit),
        Err(e) => {
            warn!(error = %e, known = %ctx.config.relay.known, "Bootstrap relay unusable, trying known relay");
            let relay = RelayConnector::new(ctx.config.relay.known.clone())
                .connect(manager.host())
                .await?;
            let addr = relay
                .addrs
                .first()
                .ok_or(ConnectivityError::NoRelayAvailable)?;
            let circuit = addr
                .clone()
                .with(Protocol::P2p(relay.id))
                .with(Protocol::P2pCircuit);
            manager.host().listen_on(circuit.clone()).await?;
            Ok(circuit)
        }
    }
}

/// Run a relay and its side-channel until Ctrl-C.
pub async fn relay(ctx: &NodeContext) -> Result<()> {
    let config = RelayConfig::on_ports(ctx.config.network.port, ctx.config.relay.port);
    let service = RelayService::start(ctx.keypair()?, config).await?;

    let info = service.advertisement().await?;
    println!("Relay peer ID: {}", info.id);
    for addr in &info.addrs {
        println!("  {addr}/p2p/{}", info.id);
    }
    println!("Relay info on http://{}/relay", service.http_addr()?);

    service.serve(shutdown_signal()).await?;
    Ok(())
}

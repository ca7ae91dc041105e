//! Relay service lifecycle and the connector against it.

use assert_matches::assert_matches;
use orca_api::ConnectivityError;
use libp2p::{Multiaddr, multiaddr::Protocol};
use orca_net_connectivity::{HostConfig, Keypair, Libp2pHost};
use orca_net_relay::{RelayConfig, RelayConnector, RelayService, RelayState};
use std::time::Duration;
use tokio::sync::oneshot;

fn local_config() -> RelayConfig {
    RelayConfig {
        p2p_listen: "/ip4/127.0.0.1/tcp/0".parse().unwrap(),
        http_addr: "127.0.0.1:0".parse().unwrap(),
    }
}

#[tokio::test]
async fn test_relay_serves_then_stops() {
    let relay = RelayService::start(Keypair::generate_ed25519(), local_config())
        .await
        .unwrap();
    let mut state = relay.state();
    assert_eq!(*state.borrow(), RelayState::Starting);

    let advertisement = relay.advertisement().await.unwrap();
    let url = format!("http://{}/relay", relay.http_addr().unwrap());

    let (stop_tx, stop_rx) = oneshot::channel::<()>();
    let serving = tokio::spawn(relay.serve(async {
        let _ = stop_rx.await;
    }));

    tokio::time::timeout(
        Duration::from_secs(5),
        state.wait_for(|s| *s == RelayState::Serving),
    )
    .await
    .unwrap()
    .unwrap();

    let connector = RelayConnector::new(url);
    assert_eq!(connector.fetch().await.unwrap(), advertisement);

    let client_config = HostConfig {
        listen_addr: "/ip4/127.0.0.1/tcp/0".parse().unwrap(),
        ..HostConfig::on_port(0)
    };
    let (client, _task) = Libp2pHost::spawn(Keypair::generate_ed25519(), client_config).unwrap();
    let info = tokio::time::timeout(Duration::from_secs(10), connector.connect(&client))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(info.id, advertisement.id);

    stop_tx.send(()).unwrap();
    tokio::time::timeout(Duration::from_secs(5), serving)
        .await
        .unwrap()
        .unwrap()
        .unwrap();
    assert_eq!(*state.borrow(), RelayState::Stopped);
}

#[tokio::test]
async fn test_connector_without_relay() {
    let connector = RelayConnector::new("http://127.0.0.1:1/relay");
    assert_matches!(connector.fetch().await, Err(ConnectivityError::RelayFetch(_)));
}

fn is_loopback(addr: &Multiaddr) -> bool {
    addr.iter().any(|p| match p {
        Protocol::Ip4(ip) => ip.is_loopback(),
        Protocol::Ip6(ip) => ip.is_loopback(),
        _ => false,
    })
}

#[tokio::test]
async fn test_wildcard_relay_advertises_dialable_addrs() {
    let config = RelayConfig {
        p2p_listen: HostConfig::on_port(0).listen_addr,
        http_addr: "127.0.0.1:0".parse().unwrap(),
    };
    let relay = RelayService::start(Keypair::generate_ed25519(), config)
        .await
        .unwrap();
    let url = format!("http://{}/relay", relay.http_addr().unwrap());
    let _serving = tokio::spawn(relay.serve(std::future::pending()));
    let connector = RelayConnector::new(url);

    // Interfaces are reported one at a time; give the rest a moment to come up.
    let mut info = connector.fetch().await.unwrap();
    for _ in 0..20 {
        if info.addrs.iter().any(|a| !is_loopback(a)) {
            break;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
        info = connector.fetch().await.unwrap();
    }

    assert!(!info.addrs.is_empty());
    assert!(info.addrs.iter().all(|a| !a.to_string().starts_with("/ip4/0.0.0.0")));
    if info.addrs.iter().any(|a| !is_loopback(a)) {
        assert!(info.addrs.iter().all(|a| !is_loopback(a)), "{:?}", info.addrs);
    }
}

//! Advertised address construction.

use libp2p::{Multiaddr, PeerId, multiaddr::Protocol};

/// Whether `addr` routes through a relay.
pub fn is_circuit(addr: &Multiaddr) -> bool {
    addr.iter().any(|p| matches!(p, Protocol::P2pCircuit))
}

fn is_loopback(addr: &Multiaddr) -> bool {
    addr.iter().any(|p| match p {
        Protocol::Ip4(ip) => ip.is_loopback(),
        Protocol::Ip6(ip) => ip.is_loopback(),
        _ => false,
    })
}

fn is_unspecified(addr: &Multiaddr) -> bool {
    addr.iter().any(|p| match p {
        Protocol::Ip4(ip) => ip.is_unspecified(),
        Protocol::Ip6(ip) => ip.is_unspecified(),
        _ => false,
    })
}

fn with_peer(addr: &Multiaddr, peer: PeerId) -> Multiaddr {
    match addr.iter().last() {
        Some(Protocol::P2p(existing)) if existing == peer => addr.clone(),
        _ => addr.clone().with(Protocol::P2p(peer)),
    }
}

/// `<relay>/p2p-circuit/p2p/<local>`.
pub fn circuit_address(relay: &Multiaddr, local: PeerId) -> Multiaddr {
    relay
        .clone()
        .with(Protocol::P2pCircuit)
        .with(Protocol::P2p(local))
}

/// The first non-loopback, non-relayed listen address, suffixed with `/p2p/<local>`.
pub fn direct_address(listen_addrs: &[Multiaddr], local: PeerId) -> Option<Multiaddr> {
    listen_addrs
        .iter()
        .find(|addr| !is_loopback(addr) && !is_circuit(addr))
        .map(|addr| with_peer(addr, local))
}

/// Listen addresses worth handing to remote peers.
///
/// Relayed and unspecified addresses are dropped. Loopback addresses are only
/// kept when the host listens on nothing else.
pub fn advertisable_addrs(listen_addrs: &[Multiaddr]) -> Vec<Multiaddr> {
    let usable: Vec<&Multiaddr> = listen_addrs
        .iter()
        .filter(|addr| !is_circuit(addr) && !is_unspecified(addr))
        .collect();
    let routable: Vec<Multiaddr> = usable
        .iter()
        .filter(|addr| !is_loopback(addr))
        .map(|addr| (*addr).clone())
        .collect();
    if routable.is_empty() {
        usable.into_iter().cloned().collect()
    } else {
        routable
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use libp2p::identity::Keypair;

    fn peer() -> PeerId {
        Keypair::generate_ed25519().public().to_peer_id()
    }

    #[test]
    fn test_circuit_address_through_relay() {
        let local = peer();
        let relay: Multiaddr = "/ip4/130.245.173.212/tcp/4001".parse().unwrap();
        let addr = circuit_address(&relay, local);
        assert_eq!(
            addr.to_string(),
            format!("/ip4/130.245.173.212/tcp/4001/p2p-circuit/p2p/{local}")
        );
        assert!(is_circuit(&addr));
    }

    #[test]
    fn test_direct_address_skips_loopback() {
        let local = peer();
        let addrs: Vec<Multiaddr> = vec![
            "/ip4/127.0.0.1/tcp/4001".parse().unwrap(),
            "/ip4/192.168.1.5/tcp/4001".parse().unwrap(),
            "/ip4/10.0.0.2/tcp/4001".parse().unwrap(),
        ];
        assert_eq!(
            direct_address(&addrs, local).unwrap().to_string(),
            format!("/ip4/192.168.1.5/tcp/4001/p2p/{local}")
        );
    }

    #[test]
    fn test_direct_address_needs_a_routable_listener() {
        let addrs: Vec<Multiaddr> = vec![
            "/ip4/127.0.0.1/tcp/4001".parse().unwrap(),
            "/ip6/::1/tcp/4001".parse().unwrap(),
        ];
        assert!(direct_address(&addrs, peer()).is_none());
        assert!(direct_address(&[], peer()).is_none());
    }

    #[test]
    fn test_direct_address_keeps_existing_peer_suffix() {
        let local = peer();
        let addr: Multiaddr = format!("/ip4/192.168.1.5/tcp/4001/p2p/{local}").parse().unwrap();
        assert_eq!(direct_address(&[addr.clone()], local), Some(addr));
    }

    #[test]
    fn test_advertisable_addrs_prefer_routable() {
        let local = peer();
        let addrs: Vec<Multiaddr> = vec![
            "/ip4/127.0.0.1/tcp/4001".parse().unwrap(),
            "/ip4/0.0.0.0/tcp/4001".parse().unwrap(),
            "/ip4/192.168.1.5/tcp/4001".parse().unwrap(),
            circuit_address(&"/ip4/130.245.173.212/tcp/4001".parse().unwrap(), local),
            "/ip6/::1/tcp/4001".parse().unwrap(),
        ];
        assert_eq!(
            advertisable_addrs(&addrs),
            vec!["/ip4/192.168.1.5/tcp/4001".parse::<Multiaddr>().unwrap()]
        );
    }

    #[test]
    fn test_advertisable_addrs_fall_back_to_loopback() {
        let loopback: Multiaddr = "/ip4/127.0.0.1/tcp/4001".parse().unwrap();
        let addrs = vec![loopback.clone(), "/ip4/0.0.0.0/tcp/4001".parse().unwrap()];
        assert_eq!(advertisable_addrs(&addrs), vec![loopback]);
        assert!(advertisable_addrs(&[]).is_empty());
    }
}

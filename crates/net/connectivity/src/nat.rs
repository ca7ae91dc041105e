//! NAT exposure detection.
//!
//! The node asks an address reflection service which IP it appears from and
//! classifies that IP against the RFC 1918 ranges.

use ipnet::Ipv4Net;
use orca_api::ConnectivityError;
use serde::Deserialize;
use std::{
    net::{IpAddr, Ipv4Addr},
    time::{Duration, Instant},
};
use tracing::debug;

/// Reflection service answering `{"origin": "<ip>"}`.
pub const DEFAULT_REFLECTOR_URL: &str = "http://httpbin.org/ip";

const PRIVATE_RANGES: [Ipv4Net; 3] = [
    Ipv4Net::new_assert(Ipv4Addr::new(10, 0, 0, 0), 8),
    Ipv4Net::new_assert(Ipv4Addr::new(172, 16, 0, 0), 12),
    Ipv4Net::new_assert(Ipv4Addr::new(192, 168, 0, 0), 16),
];

/// Whether a node whose reflected address is `ip` must be reached through a relay.
///
/// Addresses inside 10/8, 172.16/12 or 192.168/16 answer `false` (direct);
/// everything else, IPv6 included, answers `true`.
pub fn requires_relay(ip: IpAddr) -> bool {
    match ip {
        IpAddr::V4(v4) => !PRIVATE_RANGES.iter().any(|range| range.contains(&v4)),
        IpAddr::V6(_) => true,
    }
}

/// Parse the `origin` field of a reflection response.
///
/// Proxies may append their own addresses; only the first entry counts.
pub fn parse_origin(origin: &str) -> Result<IpAddr, ConnectivityError> {
    let first = origin.split(',').next().unwrap_or_default().trim();
    first
        .parse()
        .map_err(|_| ConnectivityError::Reflection(format!("unparseable origin {origin:?}")))
}

/// Source of this node's public IP.
#[async_trait::async_trait]
#[auto_impl::auto_impl(&, Arc)]
pub trait Reflector: Send + Sync {
    async fn public_ip(&self) -> Result<IpAddr, ConnectivityError>;
}

#[derive(Deserialize)]
struct ReflectionResponse {
    origin: String,
}

/// [`Reflector`] backed by an HTTP reflection service.
#[derive(Debug, Clone)]
pub struct HttpReflector {
    client: reqwest::Client,
    url: String,
}

impl Default for HttpReflector {
    fn default() -> Self {
        Self::new(DEFAULT_REFLECTOR_URL)
    }
}

impl HttpReflector {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: url.into(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    async fn reflect(&self) -> Result<ReflectionResponse, ConnectivityError> {
        let reflection_err = |e: reqwest::Error| ConnectivityError::Reflection(e.to_string());
        self.client
            .get(&self.url)
            .send()
            .await
            .map_err(reflection_err)?
            .error_for_status()
            .map_err(reflection_err)?
            .json()
            .await
            .map_err(reflection_err)
    }

    /// Time for one full request to the reflection service.
    pub async fn round_trip(&self) -> Result<Duration, ConnectivityError> {
        let started = Instant::now();
        self.reflect().await?;
        Ok(started.elapsed())
    }
}

#[async_trait::async_trait]
impl Reflector for HttpReflector {
    async fn public_ip(&self) -> Result<IpAddr, ConnectivityError> {
        let response = self.reflect().await?;
        let ip = parse_origin(&response.origin)?;
        debug!(%ip, reflector = %self.url, "Reflected public address");
        Ok(ip)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use axum::{Json, Router, routing::get};

    #[test]
    fn test_private_ranges_are_direct() {
        for ip in ["10.0.0.1", "10.255.255.255", "172.16.0.1", "172.31.255.254", "192.168.1.20"] {
            assert!(!requires_relay(ip.parse().unwrap()), "{ip}");
        }
    }

    #[test]
    fn test_other_addresses_need_relay() {
        for ip in ["8.8.8.8", "172.15.255.255", "172.32.0.1", "192.169.0.1", "127.0.0.1", "::1"] {
            assert!(requires_relay(ip.parse().unwrap()), "{ip}");
        }
    }

    #[test]
    fn test_parse_origin() {
        assert_eq!(parse_origin("1.2.3.4").unwrap(), "1.2.3.4".parse::<IpAddr>().unwrap());
        assert_eq!(
            parse_origin("10.0.0.7, 52.1.1.1").unwrap(),
            "10.0.0.7".parse::<IpAddr>().unwrap()
        );
        assert_matches!(parse_origin("not-an-ip"), Err(ConnectivityError::Reflection(_)));
        assert_matches!(parse_origin(""), Err(ConnectivityError::Reflection(_)));
    }

    #[tokio::test]
    async fn test_http_reflector() {
        let app = Router::new().route(
            "/ip",
            get(|| async { Json(serde_json::json!({ "origin": "192.168.0.9" })) }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });

        let reflector = HttpReflector::new(format!("http://{addr}/ip"));
        let ip = reflector.public_ip().await.unwrap();
        assert_eq!(ip, "192.168.0.9".parse::<IpAddr>().unwrap());
        assert!(!requires_relay(ip));
        assert!(reflector.round_trip().await.is_ok());
    }

    #[tokio::test]
    async fn test_unreachable_reflector() {
        let reflector = HttpReflector::new("http://127.0.0.1:1/ip");
        assert_matches!(reflector.public_ip().await, Err(ConnectivityError::Reflection(_)));
    }
}

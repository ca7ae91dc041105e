//! Figment-based configuration loading.
//!
//! Configuration priority (highest wins):
//! 1. CLI arguments (applied after Figment load)
//! 2. Config file (TOML)
//! 3. Environment variables (`ORCA_` prefix, `_` separates section and key)
//! 4. Defaults

use crate::cli::NodeArgs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use libp2p::Multiaddr;
use orca_net_connectivity::{ConnectivityConfig, DEFAULT_REFLECTOR_URL};
use orca_net_relay::DEFAULT_RELAY_URL;
use orca_node_core::{
    ConfigurationError,
    constants::{
        DEFAULT_API_PORT, DEFAULT_BOOTSTRAP_RELAY, DEFAULT_LEDGER_URL, DEFAULT_LISTEN_ADDR,
        DEFAULT_MARKET_URL, DEFAULT_P2P_PORT, DEFAULT_RELAY_HTTP_PORT,
    },
};
use serde::{Deserialize, Serialize};
use std::{
    net::{IpAddr, Ipv4Addr, SocketAddr},
    path::Path,
};

/// Complete node configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OrcaConfig {
    pub network: NetworkConfig,
    pub market: MarketConfig,
    pub api: ApiConfig,
    pub wallet: WalletConfig,
    pub relay: RelayConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    /// TCP port of the libp2p host.
    pub port: u16,
    /// Bootstrap relays in preference order.
    pub relays: Vec<Multiaddr>,
    /// Address reflection service.
    pub reflector: String,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_P2P_PORT,
            relays: DEFAULT_BOOTSTRAP_RELAY.parse().into_iter().collect(),
            reflector: DEFAULT_REFLECTOR_URL.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MarketConfig {
    /// Base URL of the directory and job store.
    pub url: String,
}

impl Default for MarketConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_MARKET_URL.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub addr: IpAddr,
    pub port: u16,
    /// Registered with the directory instead of the reflected public IP.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub advertise: Option<IpAddr>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            addr: DEFAULT_LISTEN_ADDR
                .parse()
                .unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED)),
            port: DEFAULT_API_PORT,
            advertise: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WalletConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    /// Base URL of the wallet API server.
    pub ledger: String,
}

impl Default for WalletConfig {
    fn default() -> Self {
        Self {
            password: None,
            ledger: DEFAULT_LEDGER_URL.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RelayConfig {
    /// Port of the side-channel when running a relay.
    pub port: u16,
    /// Side-channel endpoint of the relay to fall back to.
    pub known: String,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_RELAY_HTTP_PORT,
            known: DEFAULT_RELAY_URL.to_string(),
        }
    }
}

impl OrcaConfig {
    /// Load configuration from defaults, environment, and config file.
    /// CLI overrides should be applied separately after loading.
    pub fn load(config_path: Option<&Path>) -> Result<Self, ConfigurationError> {
        let mut figment = Figment::new()
            .merge(Serialized::defaults(OrcaConfig::default()))
            .merge(Env::prefixed("ORCA_").split("_"));

        if let Some(path) = config_path {
            if path.exists() {
                figment = figment.merge(Toml::file(path));
            }
        }

        figment
            .extract()
            .map_err(|e| ConfigurationError::Load(e.to_string()))
    }

    /// Override loaded values with whatever was given on the command line.
    pub fn apply_args(&mut self, args: &NodeArgs) {
        if let Some(port) = args.network.port {
            self.network.port = port;
        }
        if !args.network.relays.is_empty() {
            self.network.relays = args.network.relays.clone();
        }
        if let Some(reflector) = &args.network.reflector {
            self.network.reflector = reflector.clone();
        }
        if let Some(url) = &args.market.url {
            self.market.url = url.clone();
        }
        if let Some(addr) = args.api.addr {
            self.api.addr = addr;
        }
        if let Some(port) = args.api.port {
            self.api.port = port;
        }
        if let Some(advertise) = args.api.advertise {
            self.api.advertise = Some(advertise);
        }
        if let Some(password) = &args.wallet.password {
            self.wallet.password = Some(password.clone());
        }
        if let Some(ledger) = &args.wallet.ledger {
            self.wallet.ledger = ledger.clone();
        }
        if let Some(port) = args.relay.port {
            self.relay.port = port;
        }
        if let Some(known) = &args.relay.known {
            self.relay.known = known.clone();
        }
    }

    /// The wallet password, required by every command that pays.
    pub fn wallet_password(&self) -> Result<&str, ConfigurationError> {
        match self.wallet.password.as_deref() {
            Some(password) if !password.is_empty() => Ok(password),
            _ => Err(ConfigurationError::MissingWalletPassword),
        }
    }

    pub fn api_socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.api.addr, self.api.port)
    }

    pub fn connectivity(&self) -> ConnectivityConfig {
        ConnectivityConfig {
            listen_port: self.network.port,
            relays: self.network.relays.clone(),
            reflector_url: self.network.reflector.clone(),
        }
    }
}

//! P2P network CLI arguments.

use clap::Args;
use libp2p::Multiaddr;
use serde::{Deserialize, Serialize};

/// P2P network configuration.
#[derive(Debug, Args, Clone, Default, Serialize, Deserialize)]
#[command(next_help_heading = "Network")]
#[serde(default)]
pub struct NetworkArgs {
    /// TCP port for the libp2p host.
    #[arg(id = "p2p.port", long = "p2p.port", value_name = "PORT")]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,

    /// Bootstrap relay multiaddr. Repeat to give several; replaces the configured list.
    #[arg(long = "relay.bootstrap", value_name = "MULTIADDR")]
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub relays: Vec<Multiaddr>,

    /// Public address reflection service.
    #[arg(long = "reflector.url", value_name = "URL")]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reflector: Option<String>,
}

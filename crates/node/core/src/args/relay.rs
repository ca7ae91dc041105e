//! Relay CLI arguments.

use clap::Args;
use serde::{Deserialize, Serialize};

/// Relay configuration, for both running a relay and reaching a known one.
#[derive(Debug, Args, Clone, Default, Serialize, Deserialize)]
#[command(next_help_heading = "Relay")]
#[serde(default)]
pub struct RelayArgs {
    /// Port of the relay's HTTP side-channel.
    #[arg(id = "relay.port", long = "relay.port", value_name = "PORT")]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,

    /// Side-channel endpoint of a known relay to connect through.
    #[arg(long = "relay.known", value_name = "URL")]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub known: Option<String>,
}

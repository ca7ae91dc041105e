//! HTTP API CLI arguments.

use clap::Args;
use serde::{Deserialize, Serialize};
use std::net::IpAddr;

/// HTTP API configuration.
#[derive(Debug, Args, Clone, Default, Serialize, Deserialize)]
#[command(next_help_heading = "API")]
#[serde(default)]
pub struct ApiArgs {
    /// Listen address of the HTTP API.
    #[arg(long = "api.addr", value_name = "IP")]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub addr: Option<IpAddr>,

    /// Listen port of the HTTP API. Holders are registered with this port.
    #[arg(id = "api.port", long = "api.port", value_name = "PORT")]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,

    /// IP to register with the directory instead of the reflected public IP.
    #[arg(long = "api.advertise", value_name = "IP")]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub advertise: Option<IpAddr>,
}

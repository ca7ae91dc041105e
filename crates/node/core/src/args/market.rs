//! Market server CLI arguments.

use clap::Args;
use serde::{Deserialize, Serialize};

/// Market server configuration.
#[derive(Debug, Args, Clone, Default, Serialize, Deserialize)]
#[command(next_help_heading = "Market")]
#[serde(default)]
pub struct MarketArgs {
    /// Base URL of the market server (directory and job store).
    #[arg(long = "market.url", value_name = "URL")]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

//! Wallet CLI arguments.

use clap::Args;
use serde::{Deserialize, Serialize};

/// Wallet configuration.
#[derive(Debug, Args, Clone, Default, Serialize, Deserialize)]
#[command(next_help_heading = "Wallet")]
#[serde(default)]
pub struct WalletArgs {
    /// Password unlocking the wallet for per-chunk payments.
    #[arg(long = "wallet.password", value_name = "PASSWORD", env = "ORCA_WALLET_PASSWORD", hide_env_values = true)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,

    /// Base URL of the wallet API server.
    #[arg(long = "wallet.ledger", value_name = "URL")]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ledger: Option<String>,
}

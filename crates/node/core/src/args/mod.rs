//! CLI argument structs for node infrastructure configuration.
//!
//! These args serve dual purposes:
//! - CLI parsing via clap (`#[derive(Args)]`)
//! - Configuration serialization via serde (`#[derive(Serialize, Deserialize)]`)
//!
//! Fields that can also come from the config file are `Option`s: `None` means
//! "not given on the command line" and leaves the loaded value alone.

mod api;
mod datadir;
mod log;
mod market;
mod network;
mod relay;
mod wallet;

pub use api::ApiArgs;
pub use datadir::DataDirArgs;
pub use log::LogArgs;
pub use market::MarketArgs;
pub use network::NetworkArgs;
pub use relay::RelayArgs;
pub use wallet::WalletArgs;

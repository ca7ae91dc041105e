//! CLI argument assembly and top-level parser.

use clap::{Args, Parser, Subcommand};
use std::{net::IpAddr, path::PathBuf};

pub use orca_node_core::args::{
    ApiArgs, DataDirArgs, LogArgs, MarketArgs, NetworkArgs, RelayArgs, WalletArgs,
};
use orca_node_core::version;

/// Orca - pay-per-chunk file market peer
#[derive(Debug, Parser)]
#[command(author, version = version::VERSION, long_version = version::LONG_VERSION, about, long_about = None)]
pub struct Cli {
    /// Logging configuration.
    #[command(flatten)]
    pub logs: LogArgs,

    /// Data directory configuration.
    #[command(flatten)]
    pub datadir: DataDirArgs,

    /// Overrides for values from the config file and environment.
    #[command(flatten)]
    pub node: NodeArgs,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Orca node commands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Show this node's public IP, whether it needs a relay, and its advertised address.
    Location,

    /// Download a file by content hash or name from the cheapest holder.
    Get(GetArgs),

    /// Register a file from the files directory with the market at a price per chunk.
    Store(StoreArgs),

    /// Measure round-trip latency to the address reflection service.
    Network,

    /// Copy a file into the files directory and index it.
    Import {
        /// File to import.
        path: PathBuf,
    },

    /// List the files in the files directory.
    List,

    /// Print the SHA-256 content hash of a file.
    Hash {
        /// File to hash.
        path: PathBuf,
    },

    /// Notify a peer that a payment was sent to it.
    Send(SendArgs),

    /// Run the node: serve chunks and payment notices until interrupted.
    Run,

    /// Run a public relay and its HTTP side-channel until interrupted.
    Relay,
}

/// Config overrides shared by all commands.
#[derive(Debug, Args, Clone, Default)]
pub struct NodeArgs {
    #[command(flatten)]
    pub network: NetworkArgs,

    #[command(flatten)]
    pub market: MarketArgs,

    #[command(flatten)]
    pub api: ApiArgs,

    #[command(flatten)]
    pub wallet: WalletArgs,

    #[command(flatten)]
    pub relay: RelayArgs,
}

/// Arguments for the 'get' command.
#[derive(Debug, Args)]
pub struct GetArgs {
    /// Content hash (hex) or local file name.
    pub target: String,

    /// Create and start a job for this download so it can be paused or terminated.
    #[arg(long, conflicts_with = "job")]
    pub track: bool,

    /// Attach the download to an existing job.
    #[arg(long, value_name = "JOB_ID")]
    pub job: Option<String>,
}

/// Arguments for the 'store' command.
#[derive(Debug, Args)]
pub struct StoreArgs {
    /// Name of a file in the files directory.
    pub name: String,

    /// Price charged per chunk (1 MiB).
    pub price: u64,
}

/// Arguments for the 'send' command.
#[derive(Debug, Args)]
pub struct SendArgs {
    /// Amount that was paid.
    pub amount: u64,

    /// Peer IP.
    pub ip: IpAddr,

    /// Peer HTTP API port.
    pub port: u16,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_get_with_overrides() {
        let cli = Cli::try_parse_from([
            "orca",
            "--market.url",
            "http://market:9000",
            "--wallet.password",
            "pw",
            "get",
            "report.pdf",
            "--track",
        ])
        .unwrap();

        assert_eq!(cli.node.market.url.as_deref(), Some("http://market:9000"));
        assert_eq!(cli.node.wallet.password.as_deref(), Some("pw"));
        match cli.command {
            Commands::Get(args) => {
                assert_eq!(args.target, "report.pdf");
                assert!(args.track);
                assert!(args.job.is_none());
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_track_conflicts_with_job() {
        assert!(Cli::try_parse_from(["orca", "get", "x", "--track", "--job", "job-1"]).is_err());
    }

    #[test]
    fn test_parse_send() {
        let cli = Cli::try_parse_from(["orca", "send", "5", "10.0.0.7", "8080"]).unwrap();
        match cli.command {
            Commands::Send(args) => {
                assert_eq!(args.amount, 5);
                assert_eq!(args.ip, "10.0.0.7".parse::<IpAddr>().unwrap());
                assert_eq!(args.port, 8080);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }
}

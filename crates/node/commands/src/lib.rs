//! CLI commands for the Orca node.
//!
//! This crate provides the command-line interface:
//! - [`Cli`] - Top-level CLI parser
//! - [`Commands`] - Available subcommands
//! - [`OrcaConfig`] - Layered node configuration
//!
//! Configuration is loaded using Figment with the following priority
//! (highest wins):
//!
//! 1. CLI arguments
//! 2. Config file (`<datadir>/config.toml`)
//! 3. Environment variables (`ORCA_` prefix)
//! 4. Defaults

mod cli;
pub mod commands;
pub mod config;
mod context;

pub use cli::{Cli, Commands, GetArgs, NodeArgs, SendArgs, StoreArgs};
pub use config::OrcaConfig;
pub use context::NodeContext;

use clap::Parser;
use color_eyre::eyre;
use orca_api::{
    ConnectivityError, DirectoryError, JobStateError, PaymentError, TransferError,
};
use orca_market_transfer::SessionError;
use orca_node_core::{ConfigurationError, logging, version};
use orca_store::StoreError;
use tracing::debug;

/// Run the Orca node with the given CLI arguments.
///
/// This is the main entry point that should be called from the binary.
pub async fn run() -> eyre::Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();

    logging::init_logging(&cli.logs)?;

    debug!("Orca {}", version::VERSION);

    dispatch(&cli).await.map_err(|report| {
        let category = error_category(&report);
        report.wrap_err(category)
    })
}

async fn dispatch(cli: &Cli) -> eyre::Result<()> {
    let ctx = NodeContext::from_cli(cli)?;
    match &cli.command {
        Commands::Location => {
            commands::node::location(&ctx).await?;
        }
        Commands::Get(args) => {
            commands::market::get(&ctx, args).await?;
        }
        Commands::Store(args) => {
            commands::market::store(&ctx, args).await?;
        }
        Commands::Network => {
            commands::node::network(&ctx).await?;
        }
        Commands::Import { path } => {
            commands::files::import(&ctx, path)?;
        }
        Commands::List => {
            commands::files::list(&ctx)?;
        }
        Commands::Hash { path } => {
            commands::files::hash(path)?;
        }
        Commands::Send(args) => {
            commands::market::send(&ctx, args).await?;
        }
        Commands::Run => commands::node::run(&ctx).await?,
        Commands::Relay => commands::node::relay(&ctx).await?,
    }
    Ok(())
}

/// The user-facing category of a failed command.
pub fn error_category(report: &eyre::Report) -> &'static str {
    for cause in report.chain() {
        if let Some(session) = cause.downcast_ref::<SessionError>() {
            return match session {
                SessionError::Payment(_) => "payment error",
                SessionError::Transfer(_) => "transfer error",
                SessionError::Job(_) | SessionError::NoJobTracker(_) => "job state error",
            };
        }
        if cause.is::<ConfigurationError>() {
            return "configuration error";
        }
        if cause.is::<ConnectivityError>() {
            return "connectivity error";
        }
        if cause.is::<DirectoryError>() {
            return "directory error";
        }
        if cause.is::<PaymentError>() {
            return "payment error";
        }
        if cause.is::<TransferError>() {
            return "transfer error";
        }
        if cause.is::<JobStateError>() {
            return "job state error";
        }
        if cause.is::<StoreError>() {
            return "storage error";
        }
    }
    "error"
}

#[cfg(test)]
mod tests {
    use super::*;
    use orca_primitives::JobId;

    #[test]
    fn test_error_categories() {
        let report = eyre::Report::new(ConfigurationError::MissingWalletPassword);
        assert_eq!(error_category(&report), "configuration error");

        let report = eyre::Report::new(DirectoryError::NoHolderFound {
            id: "abc".to_string(),
        });
        assert_eq!(error_category(&report), "directory error");

        let report = eyre::Report::new(SessionError::from(PaymentError::Unavailable {
            message: "down".to_string(),
        }));
        assert_eq!(error_category(&report), "payment error");

        let report = eyre::Report::new(SessionError::NoJobTracker(JobId::new("job-1")))
            .wrap_err("download failed");
        assert_eq!(error_category(&report), "job state error");

        assert_eq!(error_category(&eyre::eyre!("boom")), "error");
    }
}

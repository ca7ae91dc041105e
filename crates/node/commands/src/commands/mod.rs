//! Command implementations.
//!
//! Each command prints its user-facing result to stdout and logs the details.

pub mod files;
pub mod market;
pub mod node;

/// Resolves when the process receives Ctrl-C.
pub(crate) async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "Failed to listen for Ctrl-C, shutting down");
    }
    tracing::info!("Shutdown requested");
}

//! Orca peer node binary.

#[tokio::main]
async fn main() -> eyre::Result<()> {
    orca_node_commands::run().await
}

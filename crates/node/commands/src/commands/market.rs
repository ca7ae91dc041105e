//! Market commands: `get`, `store` and `send`.

use crate::{
    cli::{GetArgs, SendArgs, StoreArgs},
    context::NodeContext,
};
use eyre::Result;
use orca_api::Directory;
use orca_market_directory::{HolderSelector, HttpDirectory};
use orca_market_jobs::JobController;
use orca_market_ledger::{HttpLedger, PaymentNotice, send_payment_notice};
use orca_market_transfer::{HttpChunkSource, TransferReport, TransferRequest, TransferSession};
use orca_net_connectivity::{HttpReflector, Reflector};
use orca_node_core::identity;
use orca_primitives::{FileRecord, JobId};
use orca_store::REQUESTED_DIR;
use std::sync::Arc;
use tracing::info;

fn directory(ctx: &NodeContext) -> Result<HttpDirectory> {
    let keypair = ctx.keypair()?;
    Ok(HttpDirectory::new(
        ctx.config.market.url.clone(),
        identity::identity_key(&keypair),
    ))
}

/// Download `args.target` from its cheapest holder, paying per chunk.
pub async fn get(ctx: &NodeContext, args: &GetArgs) -> Result<TransferReport> {
    let wallet_password = ctx.config.wallet_password()?.to_string();

    let selector = HolderSelector::new(directory(ctx)?).with_name_index(ctx.names.clone());
    let content = selector.resolve_hash(&args.target)?;
    let holder = selector.best_holder(&content.to_hex()).await?;
    println!(
        "{} - {} per chunk",
        holder.socket_addr(),
        holder.price_per_unit
    );

    let mut session = TransferSession::new(
        HttpChunkSource::default(),
        HttpLedger::new(ctx.config.wallet.ledger.clone()),
        ctx.files.clone(),
    );

    let job = if args.track || args.job.is_some() {
        let controller = Arc::new(JobController::new(ctx.config.market.url.clone()));
        let job = match &args.job {
            Some(id) => JobId::new(id.clone()),
            None => {
                let job = controller
                    .add_job(content, &holder.socket_addr().to_string())
                    .await?;
                controller.start_jobs(std::slice::from_ref(&job)).await?;
                println!("Started job {job}");
                job
            }
        };
        session = session.with_job_tracker(controller);
        Some(job)
    } else {
        None
    };

    let request = TransferRequest {
        price: holder.price_per_unit,
        holder,
        content,
        wallet_password,
        job,
    };
    let report = session.run(&request).await?;

    if report.stopped_early {
        println!(
            "Stopped early after {}/{} chunks ({} paid), partial file at {}",
            report.chunks_written,
            report.total_chunks,
            report.amount_paid,
            report.path.display()
        );
    } else {
        ctx.names
            .put(format!("{REQUESTED_DIR}/{}", content.to_hex()), content)?;
        println!(
            "Downloaded {} chunks ({} bytes, {} paid) to {}",
            report.chunks_written,
            report.bytes_written,
            report.amount_paid,
            report.path.display()
        );
    }
    Ok(report)
}

/// Register a file from the files directory with the market.
pub async fn store(ctx: &NodeContext, args: &StoreArgs) -> Result<FileRecord> {
    let path = ctx.files.stored_path(&args.name)?;
    let ip = match ctx.config.api.advertise {
        Some(ip) => ip,
        None => {
            HttpReflector::new(ctx.config.network.reflector.clone())
                .public_ip()
                .await?
        }
    };

    let record = directory(ctx)?
        .register_file(&path, &args.name, args.price, ip, ctx.config.api.port)
        .await?;
    ctx.names.put(record.name.clone(), record.content_hash)?;

    info!(name = %record.name, hash = %record.content_hash, %ip, port = ctx.config.api.port, "Registered file");
    println!(
        "Registered {} ({}) at {} per chunk",
        record.name, record.content_hash, args.price
    );
    Ok(record)
}

/// Tell the peer at `ip:port` that `amount` was sent to it.
pub async fn send(ctx: &NodeContext, args: &SendArgs) -> Result<()> {
    let notice = PaymentNotice {
        amount: args.amount,
        public_key: identity::identity_key(&ctx.keypair()?),
    };
    send_payment_notice(&reqwest::Client::new(), args.ip, args.port, &notice).await?;
    println!("Notified {}:{} of payment of {}", args.ip, args.port, args.amount);
    Ok(())
}

//! A holder serves a file over HTTP and a buyer downloads it through the market.

use orca_api::{Directory, JobTracker};
use orca_market_directory::{HolderSelector, HttpDirectory};
use orca_market_jobs::JobController;
use orca_market_ledger::HttpLedger;
use orca_market_transfer::{
    ChunkServer, HttpChunkSource, TransferRequest, TransferSession, chunk_routes,
};
use orca_primitives::{CHUNK_SIZE, ContentHash, JobState};
use orca_store::{LocalFiles, NameIndex};
use orca_test_utils::{FakeMarket, TEST_WALLET_PASSWORD};
use std::{net::SocketAddr, sync::Arc};
use tempfile::TempDir;
use tokio::net::TcpListener;

struct HolderNode {
    _dir: TempDir,
    addr: SocketAddr,
    hash: ContentHash,
    data: Vec<u8>,
}

/// Import a two-and-a-half chunk `report.pdf`, serve it and register it at price 5.
async fn holder_node(market: &FakeMarket) -> HolderNode {
    let dir = tempfile::tempdir().unwrap();
    let files = LocalFiles::open(dir.path().join("files")).unwrap();
    let names = Arc::new(NameIndex::open(dir.path().join("names.json")).unwrap());

    let data: Vec<u8> = (0..CHUNK_SIZE * 5 / 2).map(|i| (i % 253) as u8).collect();
    let original = dir.path().join("report.pdf");
    std::fs::write(&original, &data).unwrap();
    let record = files.import(&original, &names).unwrap();

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = chunk_routes::<()>(ChunkServer::new(files.clone(), names));
    tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });

    HttpDirectory::new(market.base_url(), "holder-wallet")
        .register_file(
            &files.stored_path("report.pdf").unwrap(),
            "report.pdf",
            5,
            addr.ip(),
            addr.port(),
        )
        .await
        .unwrap();

    HolderNode {
        _dir: dir,
        addr,
        hash: record.content_hash,
        data,
    }
}

#[tokio::test]
async fn test_report_pdf_download() {
    let market = FakeMarket::spawn().await;
    let holder = holder_node(&market).await;

    let buyer_dir = tempfile::tempdir().unwrap();
    let buyer_files = LocalFiles::open(buyer_dir.path().join("files")).unwrap();

    let selector = HolderSelector::new(HttpDirectory::new(market.base_url(), "buyer-wallet"));
    let best = selector.best_holder(&holder.hash.to_hex()).await.unwrap();
    assert_eq!(best.price_per_unit, 5);
    assert_eq!(best.socket_addr(), holder.addr);

    let session = TransferSession::new(
        HttpChunkSource::default(),
        HttpLedger::new(market.base_url()),
        buyer_files,
    );
    let report = session
        .run(&TransferRequest {
            holder: best.clone(),
            content: holder.hash,
            price: best.price_per_unit,
            wallet_password: TEST_WALLET_PASSWORD.to_string(),
            job: None,
        })
        .await
        .unwrap();

    assert_eq!(report.total_chunks, 3);
    assert_eq!(report.chunks_written, 3);
    assert_eq!(report.amount_paid, 15);
    assert_eq!(market.payments(), vec![(5, "holder-wallet".to_string()); 3]);
    assert_eq!(std::fs::read(&report.path).unwrap(), holder.data);
}

#[tokio::test]
async fn test_tracked_download_accrues_cost() {
    let market = FakeMarket::spawn().await;
    let holder = holder_node(&market).await;

    let buyer_dir = tempfile::tempdir().unwrap();
    let buyer_files = LocalFiles::open(buyer_dir.path().join("files")).unwrap();

    let controller = Arc::new(JobController::new(market.base_url()));
    let job = controller
        .add_job(holder.hash, &holder.addr.to_string())
        .await
        .unwrap();
    controller.start_jobs(std::slice::from_ref(&job)).await.unwrap();

    let best = HolderSelector::new(HttpDirectory::new(market.base_url(), "buyer-wallet"))
        .best_holder(&holder.hash.to_hex())
        .await
        .unwrap();

    let report = TransferSession::new(
        HttpChunkSource::default(),
        HttpLedger::new(market.base_url()),
        buyer_files,
    )
    .with_job_tracker(controller.clone())
    .run(&TransferRequest {
        holder: best,
        content: holder.hash,
        price: 5,
        wallet_password: TEST_WALLET_PASSWORD.to_string(),
        job: Some(job.clone()),
    })
    .await
    .unwrap();

    assert!(!report.stopped_early);
    assert_eq!(report.chunks_written, 3);
    assert_eq!(controller.job_state(&job).await.unwrap(), JobState::Running);
    assert_eq!(market.jobs().job(&job).unwrap().cost_accrued, 15);
}

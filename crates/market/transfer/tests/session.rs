//! Transfer loop behaviour against in-memory collaborators.

use assert_matches::assert_matches;
use orca_api::{PaymentError, TransferError};
use orca_market_transfer::{SessionError, TransferRequest, TransferSession};
use orca_primitives::{ContentHash, JobId, JobState};
use orca_store::{LocalFiles, hash_bytes};
use orca_test_utils::{MemoryJobStore, RecordingLedger, ScriptedChunkSource, holder};
use std::{
    sync::{Arc, Mutex},
    time::Duration,
};
use tempfile::TempDir;

fn files() -> (TempDir, LocalFiles) {
    let dir = tempfile::tempdir().unwrap();
    let files = LocalFiles::open(dir.path().join("files")).unwrap();
    (dir, files)
}

fn payloads(count: u8) -> Vec<Vec<u8>> {
    (0..count).map(|i| vec![b'a' + i; 4 + i as usize]).collect()
}

fn request(content: ContentHash, job: Option<JobId>) -> TransferRequest {
    TransferRequest {
        holder: holder("seller-wallet", 5),
        content,
        price: 5,
        wallet_password: "secret".to_string(),
        job,
    }
}

#[tokio::test]
async fn test_pays_once_per_chunk_before_writing() {
    let (_dir, files) = files();
    let hash = hash_bytes(b"three chunks");
    let dest = files.requested_path(&hash);

    let sizes_at_payment = Arc::new(Mutex::new(Vec::new()));
    let ledger = {
        let sizes = sizes_at_payment.clone();
        RecordingLedger::default().on_send(move |_| {
            let size = std::fs::metadata(&dest).map(|m| m.len()).unwrap_or(0);
            sizes.lock().unwrap().push(size);
        })
    };
    let source = ScriptedChunkSource::new(payloads(3));

    let session = TransferSession::new(&source, &ledger, files);
    let report = session.run(&request(hash, None)).await.unwrap();

    assert_eq!(report.total_chunks, 3);
    assert_eq!(report.chunks_written, 3);
    assert_eq!(report.amount_paid, 15);
    assert!(!report.stopped_early);
    assert_eq!(source.fetched(), vec![0, 1, 2]);
    assert_eq!(ledger.count(), 3);
    assert!(ledger.payments().iter().all(|p| p.amount == 5 && p.address == "seller-wallet"));

    // Each payment happened before its chunk reached the file.
    assert_eq!(*sizes_at_payment.lock().unwrap(), vec![0, 4, 9]);
    assert_eq!(std::fs::read(&report.path).unwrap(), source.content());
}

#[tokio::test]
async fn test_appends_to_existing_file() {
    let (_dir, files) = files();
    let hash = hash_bytes(b"partial");
    std::fs::write(files.requested_path(&hash), b"old").unwrap();

    let source = ScriptedChunkSource::new([&b"new"[..]]);
    let ledger = RecordingLedger::default();
    let report = TransferSession::new(&source, &ledger, files)
        .run(&request(hash, None))
        .await
        .unwrap();

    assert_eq!(std::fs::read(&report.path).unwrap(), b"oldnew");
}

#[tokio::test]
async fn test_terminate_after_chunk_keeps_partial_file() {
    let (_dir, files) = files();
    let store = Arc::new(MemoryJobStore::default());
    let hash = hash_bytes(b"terminated");
    let job = store.create_running(hash, "peer");

    // Terminate while chunk 1 is in flight; the session sees it after writing chunk 1.
    let source = {
        let store = store.clone();
        let job = job.clone();
        ScriptedChunkSource::new(payloads(4)).on_fetch(move |index| {
            if index == 1 {
                store.transition(&job, JobState::Terminated).unwrap();
            }
        })
    };
    let ledger = RecordingLedger::default();

    let session = TransferSession::new(&source, &ledger, files).with_job_tracker(store.clone());
    let report = session.run(&request(hash, Some(job.clone()))).await.unwrap();

    assert!(report.stopped_early);
    assert_eq!(report.chunks_written, 2);
    assert_eq!(source.fetched(), vec![0, 1]);
    assert_eq!(ledger.count(), 2);
    assert_eq!(store.job(&job).unwrap().cost_accrued, 10);

    let expected: Vec<u8> = payloads(2).concat();
    assert_eq!(std::fs::read(&report.path).unwrap(), expected);
}

#[tokio::test]
async fn test_terminate_at_last_chunk_completes() {
    let (_dir, files) = files();
    let store = Arc::new(MemoryJobStore::default());
    let hash = hash_bytes(b"last chunk");
    let job = store.create_running(hash, "peer");

    let source = {
        let store = store.clone();
        let job = job.clone();
        ScriptedChunkSource::new(payloads(2)).on_fetch(move |index| {
            if index == 1 {
                store.transition(&job, JobState::Terminated).unwrap();
            }
        })
    };
    let ledger = RecordingLedger::default();

    let report = TransferSession::new(&source, &ledger, files)
        .with_job_tracker(store.clone())
        .run(&request(hash, Some(job)))
        .await
        .unwrap();

    assert!(!report.stopped_early);
    assert_eq!(report.chunks_written, 2);
}

#[tokio::test]
async fn test_pause_blocks_until_resumed() {
    let (_dir, files) = files();
    let store = Arc::new(MemoryJobStore::default());
    let hash = hash_bytes(b"paused");
    let job = store.create_running(hash, "peer");

    let source = {
        let store = store.clone();
        let job = job.clone();
        Arc::new(ScriptedChunkSource::new(payloads(4)).on_fetch(move |index| {
            if index == 1 {
                store.transition(&job, JobState::Paused).unwrap();
            }
        }))
    };
    let ledger = Arc::new(RecordingLedger::default());

    let session =
        TransferSession::new(source.clone(), ledger.clone(), files).with_job_tracker(store.clone());
    let req = request(hash, Some(job.clone()));
    let task = tokio::spawn(async move { session.run(&req).await });

    tokio::time::timeout(Duration::from_secs(5), async {
        while store.paused_reads() == 0 {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .unwrap();

    // Nothing moves while paused.
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(ledger.count(), 2);
    assert_eq!(source.fetched(), vec![0, 1]);

    // Resuming wakes the session well before its 10 s re-check.
    store.transition(&job, JobState::Running).unwrap();
    let report = tokio::time::timeout(Duration::from_secs(5), task)
        .await
        .unwrap()
        .unwrap()
        .unwrap();

    assert!(!report.stopped_early);
    assert_eq!(report.chunks_written, 4);
    assert_eq!(ledger.count(), 4);
    assert_eq!(source.fetched(), vec![0, 1, 2, 3]);
    assert_eq!(store.job(&job).unwrap().cost_accrued, 20);
    assert_eq!(store.watched_jobs(), 0);
}

#[tokio::test]
async fn test_failed_session_stops_watching_its_job() {
    let (_dir, files) = files();
    let store = Arc::new(MemoryJobStore::default());
    let hash = hash_bytes(b"abandoned");
    let job = store.create_running(hash, "peer");
    let source = ScriptedChunkSource::new(payloads(4)).failing_at(2);
    let ledger = RecordingLedger::default();

    let result = TransferSession::new(&source, &ledger, files)
        .with_job_tracker(store.clone())
        .run(&request(hash, Some(job.clone())))
        .await;

    assert_matches!(result, Err(SessionError::Transfer(_)));
    assert_eq!(store.job(&job).unwrap().state, JobState::Running);
    assert_eq!(store.watched_jobs(), 0);
}

#[tokio::test]
async fn test_payment_failure_aborts_before_write() {
    let (_dir, files) = files();
    let hash = hash_bytes(b"broke");
    let source = ScriptedChunkSource::new(payloads(3));
    let ledger = RecordingLedger::default().failing_at(1);

    let dest = files.requested_path(&hash);
    let result = TransferSession::new(&source, &ledger, files)
        .run(&request(hash, None))
        .await;

    assert_matches!(
        result,
        Err(SessionError::Payment(PaymentError::Rejected { amount: 5, .. }))
    );
    assert_eq!(source.fetched(), vec![0, 1]);
    assert_eq!(std::fs::read(dest).unwrap(), payloads(1).concat());
}

#[tokio::test]
async fn test_fetch_failure_keeps_written_chunks() {
    let (_dir, files) = files();
    let hash = hash_bytes(b"flaky");
    let source = ScriptedChunkSource::new(payloads(4)).failing_at(2);
    let ledger = RecordingLedger::default();

    let dest = files.requested_path(&hash);
    let result = TransferSession::new(&source, &ledger, files)
        .run(&request(hash, None))
        .await;

    assert_matches!(
        result,
        Err(SessionError::Transfer(TransferError::Fetch { index: 2, .. }))
    );
    assert_eq!(ledger.count(), 2);
    assert_eq!(std::fs::read(dest).unwrap(), payloads(2).concat());
}

#[tokio::test]
async fn test_job_without_tracker_is_refused() {
    let (_dir, files) = files();
    let source = ScriptedChunkSource::new(payloads(1));
    let ledger = RecordingLedger::default();

    let result = TransferSession::new(&source, &ledger, files)
        .run(&request(hash_bytes(b"x"), Some(JobId::from("job-9"))))
        .await;

    assert_matches!(result, Err(SessionError::NoJobTracker(id)) if id.as_str() == "job-9");
    assert!(source.fetched().is_empty());
}

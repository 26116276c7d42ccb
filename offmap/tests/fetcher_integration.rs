//! Integration tests for batch tile downloads.
//!
//! These tests verify:
//! - Progress reporting order and totals
//! - The single-job rule while a download is running
//! - Cancellation between batches
//! - Failed fetches are counted, not retried

use offmap::coord::{bounding_box_around, tiles_in_bounding_box, TileRequest, TileUrlTemplate};
use offmap::fetcher::{BatchFetcher, DownloadError, FetchConfig};
use offmap::provider::{AsyncHttpClient, FetchError, HttpResponse, Method};
use offmap::store::{CacheStorage, MemoryStorage, Store};
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;

// =============================================================================
// Test Helpers
// =============================================================================

/// Tile server double: answers every URL except the configured failures,
/// optionally holding each request until the gate is opened.
#[derive(Default)]
struct TileServer {
    failing: HashSet<String>,
    gate: Option<Arc<Notify>>,
    calls: AtomicUsize,
}

impl TileServer {
    fn gated(gate: Arc<Notify>) -> Self {
        Self {
            gate: Some(gate),
            ..Default::default()
        }
    }

    fn failing_on(urls: &[&str]) -> Self {
        Self {
            failing: urls.iter().map(|u| u.to_string()).collect(),
            ..Default::default()
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl AsyncHttpClient for TileServer {
    async fn fetch(&self, _method: Method, url: &str) -> Result<HttpResponse, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if let Some(gate) = &self.gate {
            gate.notified().await;
        }

        if self.failing.contains(url) {
            return Err(FetchError::NetworkUnavailable(format!("refused: {}", url)));
        }
        Ok(HttpResponse::ok(url.as_bytes().to_vec(), Some("image/jpeg")))
    }
}

fn requests(count: usize) -> Vec<TileRequest> {
    (0..count)
        .map(|i| TileRequest::from_url(format!("https://tiles.test/tile/16/{}/0", i)))
        .collect()
}

fn fetcher(server: TileServer, concurrency: usize) -> (Arc<TileServer>, Arc<BatchFetcher<TileServer>>) {
    let server = Arc::new(server);
    let config = FetchConfig::default()
        .with_concurrency(concurrency)
        .with_batch_delay(Duration::ZERO);
    let fetcher = Arc::new(BatchFetcher::new(Arc::clone(&server), config));
    (server, fetcher)
}

// =============================================================================
// Progress
// =============================================================================

#[tokio::test]
async fn test_progress_is_reported_in_order_with_fixed_total() {
    let (_server, fetcher) = fetcher(TileServer::default(), 1);
    let store = MemoryStorage::new().open("offmap-tiles-v1").unwrap();
    let tiles = requests(5);

    let mut seen = Vec::new();
    let report = fetcher
        .fetch_all(&tiles, store.as_ref(), |done, total| seen.push((done, total)))
        .await
        .unwrap();

    assert_eq!(seen, vec![(1, 5), (2, 5), (3, 5), (4, 5), (5, 5)]);
    assert!(report.is_complete());
    assert_eq!(report.persisted, 5);
    assert_eq!(store.count().unwrap(), 5);
}

#[tokio::test]
async fn test_downloads_real_area_into_store() {
    let (server, fetcher) = fetcher(TileServer::default(), 6);
    let store = MemoryStorage::new().open("offmap-tiles-v1").unwrap();

    let bbox = bounding_box_around(41.8273, 12.6734, 2.0).unwrap();
    let tiles = tiles_in_bounding_box(&bbox, &[14, 15], &TileUrlTemplate::default()).unwrap();
    assert_eq!(tiles.len(), 9 + 30);

    let report = fetcher.fetch_all(&tiles, store.as_ref(), |_, _| {}).await.unwrap();

    assert_eq!(report.persisted, tiles.len());
    assert_eq!(server.calls(), tiles.len());
    for tile in &tiles {
        let entry = store.get(&tile.url).unwrap().unwrap();
        assert_eq!(entry.body, tile.url.as_bytes());
    }
}

#[tokio::test]
async fn test_failures_are_counted_not_retried() {
    let (server, fetcher) = fetcher(
        TileServer::failing_on(&["https://tiles.test/tile/16/1/0", "https://tiles.test/tile/16/3/0"]),
        2,
    );
    let store = MemoryStorage::new().open("offmap-tiles-v1").unwrap();

    let report = fetcher
        .fetch_all(&requests(4), store.as_ref(), |_, _| {})
        .await
        .unwrap();

    assert_eq!(report.attempted, 4);
    assert_eq!(report.persisted, 2);
    assert_eq!(report.failed, 2);
    assert_eq!(server.calls(), 4);
    assert!(!store.contains("https://tiles.test/tile/16/1/0").unwrap());
}

#[tokio::test]
async fn test_empty_request_list_completes_immediately() {
    let (server, fetcher) = fetcher(TileServer::default(), 4);
    let store = MemoryStorage::new().open("offmap-tiles-v1").unwrap();

    let mut calls = 0;
    let report = fetcher
        .fetch_all(&[], store.as_ref(), |_, _| calls += 1)
        .await
        .unwrap();

    assert_eq!(report.total, 0);
    assert!(report.is_complete());
    assert_eq!(calls, 0);
    assert_eq!(server.calls(), 0);
}

// =============================================================================
// Single active job
// =============================================================================

#[tokio::test]
async fn test_second_job_rejected_while_first_runs() {
    let gate = Arc::new(Notify::new());
    let (server, fetcher) = fetcher(TileServer::gated(Arc::clone(&gate)), 1);
    let store: Arc<dyn Store> = MemoryStorage::new().open("offmap-tiles-v1").unwrap();

    let first = {
        let fetcher = Arc::clone(&fetcher);
        let store = Arc::clone(&store);
        tokio::spawn(async move {
            fetcher
                .fetch_all(&requests(1), store.as_ref(), |_, _| {})
                .await
        })
    };

    while server.calls() == 0 {
        tokio::task::yield_now().await;
    }
    assert!(fetcher.is_busy());

    let second = fetcher.fetch_all(&requests(3), store.as_ref(), |_, _| {}).await;
    assert_eq!(second, Err(DownloadError::AlreadyInProgress));

    gate.notify_one();
    let report = first.await.unwrap().unwrap();
    assert_eq!(report.persisted, 1);

    // The slot is free again once the first job has finished.
    assert!(!fetcher.is_busy());
    assert!(fetcher.start_job(1).is_ok());
}

// =============================================================================
// Cancellation
// =============================================================================

#[tokio::test]
async fn test_cancel_stops_before_next_batch() {
    let (server, fetcher) = fetcher(TileServer::default(), 2);
    let store = MemoryStorage::new().open("offmap-tiles-v1").unwrap();
    let tiles = requests(6);

    let job = fetcher.start_job(tiles.len()).unwrap();
    let report = fetcher
        .run(&job, &tiles, store.as_ref(), |done, _| {
            if done == 2 {
                job.cancel();
            }
        })
        .await;

    assert!(report.cancelled);
    assert_eq!(report.attempted, 2);
    assert_eq!(report.total, 6);
    assert_eq!(server.calls(), 2);
    assert_eq!(store.count().unwrap(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_cancel_during_batch_delay() {
    let server = Arc::new(TileServer::default());
    let config = FetchConfig::default()
        .with_concurrency(1)
        .with_batch_delay(Duration::from_secs(60));
    let fetcher = Arc::new(BatchFetcher::new(Arc::clone(&server), config));
    let store: Arc<dyn Store> = MemoryStorage::new().open("offmap-tiles-v1").unwrap();

    let job = fetcher.start_job(3).unwrap();
    let token = job.cancellation();

    let run = {
        let fetcher = Arc::clone(&fetcher);
        let store = Arc::clone(&store);
        tokio::spawn(async move {
            fetcher
                .run(&job, &requests(3), store.as_ref(), |_, _| {})
                .await
        })
    };

    while server.calls() == 0 {
        tokio::task::yield_now().await;
    }
    token.cancel();

    let report = run.await.unwrap();
    assert!(report.cancelled);
    assert_eq!(report.attempted, 1);
    assert_eq!(server.calls(), 1);
}

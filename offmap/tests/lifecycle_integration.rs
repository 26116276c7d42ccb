//! Integration tests for cache generation lifecycle on disk.
//!
//! These tests verify:
//! - First start installs assets and pre-warms facilities
//! - A later start of the same generation is a warm start with no fetches
//! - Installing a new generation purges the old one's stores
//! - An install interrupted before activation is finished on the next start
//! - Commands: skip waiting, recache and clear all

use offmap::fetcher::FetchConfig;
use offmap::lifecycle::{
    AssetManifest, CommandOutcome, FacilityResult, LifecycleCommand, LifecycleError,
    LifecycleState, PointOfInterest, StartupReport,
};
use offmap::provider::{AsyncHttpClient, FetchError, HttpResponse, Method};
use offmap::router::{ResourceRequest, RouteOutcome};
use offmap::service::{OfflineMapService, ServiceConfig};
use offmap::store::{open_storage, CacheEntry, CacheStorage, StoreGeneration, StoreNames};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;

// =============================================================================
// Test Helpers
// =============================================================================

#[derive(Default)]
struct Upstream {
    calls: AtomicUsize,
    missing: Mutex<Vec<String>>,
}

impl Upstream {
    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn reset_calls(&self) {
        self.calls.store(0, Ordering::SeqCst);
    }

    fn remove(&self, url: &str) {
        self.missing.lock().unwrap().push(url.to_string());
    }
}

impl AsyncHttpClient for Upstream {
    async fn fetch(&self, _method: Method, url: &str) -> Result<HttpResponse, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.missing.lock().unwrap().iter().any(|m| m == url) {
            return Err(FetchError::HttpStatus {
                status: 404,
                url: url.to_string(),
            });
        }
        Ok(HttpResponse::ok(url.as_bytes().to_vec(), Some("text/html")))
    }
}

/// One facility at zoom 14 only: 9 tiles.
fn facility() -> PointOfInterest {
    PointOfInterest::new("Frascati", 41.8273, 12.6734)
        .with_radius_km(2.0)
        .with_zoom_levels(vec![14])
}

fn assets() -> AssetManifest {
    AssetManifest::new(
        "https://app.test",
        vec!["/".to_string(), "/index.html".to_string(), "/app.js".to_string()],
    )
}

fn service(dir: &Path, generation: &str, upstream: &Arc<Upstream>) -> OfflineMapService<Upstream> {
    let config = ServiceConfig::builder()
        .cache_directory(dir.to_path_buf())
        .store_names(StoreNames::new("offmap", StoreGeneration::new(generation).unwrap()))
        .fetch(FetchConfig::default().with_batch_delay(Duration::ZERO))
        .assets(assets())
        .facilities(vec![facility()])
        .build();
    OfflineMapService::with_client(config, Arc::clone(upstream), open_storage(dir))
}

// =============================================================================
// Startup
// =============================================================================

#[tokio::test]
async fn test_first_start_installs_and_activates() {
    let temp = TempDir::new().unwrap();
    let upstream = Arc::new(Upstream::default());
    let service = service(temp.path(), "v1", &upstream);

    let report = service.lifecycle().startup().await.unwrap();

    let StartupReport::Installed { install, purged } = report else {
        panic!("expected install");
    };
    assert_eq!(install.assets_cached, 3);
    assert!(install.assets_failed.is_empty());
    assert_eq!(install.prewarm.tiles_persisted(), 9);
    assert!(purged.is_empty());
    assert_eq!(upstream.calls(), 12);

    assert_eq!(service.lifecycle().state(), LifecycleState::Active);
    let info = service.cache_info().unwrap();
    assert_eq!(info.tiles, 9);
    assert_eq!(info.static_assets, 3);
}

#[tokio::test]
async fn test_restart_is_warm_start_without_fetches() {
    let temp = TempDir::new().unwrap();
    let upstream = Arc::new(Upstream::default());
    service(temp.path(), "v1", &upstream)
        .lifecycle()
        .startup()
        .await
        .unwrap();
    upstream.reset_calls();

    let restarted = service(temp.path(), "v1", &upstream);
    let report = restarted.lifecycle().startup().await.unwrap();

    assert_eq!(report, StartupReport::WarmStart);
    assert_eq!(restarted.lifecycle().state(), LifecycleState::Active);
    assert_eq!(upstream.calls(), 0);

    // Installed shell assets are served cache-first.
    let outcome = restarted
        .route(&ResourceRequest::get("https://app.test/index.html"))
        .await;
    assert!(matches!(outcome, RouteOutcome::FromCache(_)));
    assert_eq!(upstream.calls(), 0);
}

#[tokio::test]
async fn test_new_generation_purges_previous() {
    let temp = TempDir::new().unwrap();
    let upstream = Arc::new(Upstream::default());

    let v1 = service(temp.path(), "v1", &upstream);
    v1.lifecycle().startup().await.unwrap();
    v1.route(&ResourceRequest::get(
        "https://nominatim.openstreetmap.org/search?q=frascati",
    ))
    .await;

    // A store with a foreign prefix must survive the purge.
    let storage = open_storage(temp.path());
    storage
        .open("other-app-cache")
        .unwrap()
        .put("https://other.test/", CacheEntry::new(b"x".to_vec(), None))
        .unwrap();

    let v2 = service(temp.path(), "v2", &upstream);
    let StartupReport::Installed { mut purged, .. } = v2.lifecycle().startup().await.unwrap() else {
        panic!("expected v2 install");
    };
    purged.sort();

    assert_eq!(
        purged,
        vec!["offmap-dynamic-v1", "offmap-static-v1", "offmap-tiles-v1"]
    );

    let mut remaining = open_storage(temp.path()).store_names().unwrap();
    remaining.sort();
    assert_eq!(
        remaining,
        vec![
            "offmap-static-v2",
            "offmap-tiles-v2",
            "other-app-cache",
        ]
    );
}

#[tokio::test]
async fn test_restart_after_interrupted_install_purges_previous() {
    let temp = TempDir::new().unwrap();
    let upstream = Arc::new(Upstream::default());
    service(temp.path(), "v1", &upstream)
        .lifecycle()
        .startup()
        .await
        .unwrap();

    // v2 installs, then the process exits before activating.
    {
        let v2 = service(temp.path(), "v2", &upstream);
        v2.lifecycle().install().await.unwrap();
        assert_eq!(v2.lifecycle().state(), LifecycleState::Waiting);
    }
    upstream.reset_calls();

    let restarted = service(temp.path(), "v2", &upstream);
    let report = restarted.lifecycle().startup().await.unwrap();

    let StartupReport::Activated { mut purged } = report else {
        panic!("expected activation of the installed generation");
    };
    purged.sort();
    assert_eq!(purged, vec!["offmap-static-v1", "offmap-tiles-v1"]);
    assert_eq!(restarted.lifecycle().state(), LifecycleState::Active);
    assert_eq!(upstream.calls(), 0);

    let mut remaining = open_storage(temp.path()).store_names().unwrap();
    remaining.sort();
    assert_eq!(remaining, vec!["offmap-static-v2", "offmap-tiles-v2"]);

    // Markers are not counted as assets.
    assert_eq!(restarted.cache_info().unwrap().static_assets, 3);

    let again = service(temp.path(), "v2", &upstream);
    assert_eq!(again.lifecycle().startup().await.unwrap(), StartupReport::WarmStart);
}

#[tokio::test]
async fn test_failed_assets_do_not_abort_install() {
    let temp = TempDir::new().unwrap();
    let upstream = Arc::new(Upstream::default());
    upstream.remove("https://app.test/app.js");
    let service = service(temp.path(), "v1", &upstream);

    let install = service.lifecycle().install().await.unwrap();

    assert_eq!(install.assets_cached, 2);
    assert_eq!(install.assets_failed, vec!["https://app.test/app.js".to_string()]);
    assert_eq!(service.lifecycle().state(), LifecycleState::Waiting);
    assert!(service.lifecycle().is_installed().unwrap());
}

// =============================================================================
// Commands
// =============================================================================

#[tokio::test]
async fn test_skip_waiting_activates_installed_generation() {
    let temp = TempDir::new().unwrap();
    let upstream = Arc::new(Upstream::default());
    let service = service(temp.path(), "v1", &upstream);

    let early = service.lifecycle().handle(LifecycleCommand::SkipWaiting).await;
    assert!(matches!(
        early,
        Err(LifecycleError::InvalidState {
            state: LifecycleState::Installing,
            ..
        })
    ));

    service.lifecycle().install().await.unwrap();
    let outcome = service
        .lifecycle()
        .handle(LifecycleCommand::SkipWaiting)
        .await
        .unwrap();

    assert_eq!(outcome, CommandOutcome::Activated(Vec::new()));
    assert_eq!(service.lifecycle().state(), LifecycleState::Active);
}

#[tokio::test]
async fn test_recache_refetches_facility_tiles() {
    let temp = TempDir::new().unwrap();
    let upstream = Arc::new(Upstream::default());
    let service = service(temp.path(), "v1", &upstream);
    service.lifecycle().startup().await.unwrap();
    upstream.reset_calls();

    let outcome = service
        .lifecycle()
        .handle(LifecycleCommand::RecachePointsOfInterest)
        .await
        .unwrap();

    let CommandOutcome::Recached(report) = outcome else {
        panic!("expected recache outcome");
    };
    assert_eq!(report.facilities.len(), 1);
    assert!(matches!(
        report.facilities[0].result,
        FacilityResult::Completed(ref job) if job.persisted == 9
    ));
    assert_eq!(upstream.calls(), 9);
    assert_eq!(service.lifecycle().state(), LifecycleState::Active);
}

#[tokio::test]
async fn test_clear_all_removes_every_owned_store() {
    let temp = TempDir::new().unwrap();
    let upstream = Arc::new(Upstream::default());
    let service = service(temp.path(), "v1", &upstream);
    service.lifecycle().startup().await.unwrap();

    let outcome = service
        .lifecycle()
        .handle(LifecycleCommand::ClearAll)
        .await
        .unwrap();

    let CommandOutcome::Cleared(cleared) = outcome else {
        panic!("expected cleared outcome");
    };
    assert_eq!(cleared.len(), 2);
    assert!(!service.lifecycle().is_installed().unwrap());

    let info = service.cache_info().unwrap();
    assert_eq!(info.tiles, 0);
    assert_eq!(info.static_assets, 0);
}

//! Service facade: the command surface used by the application shell.

use super::config::ServiceConfig;
use super::error::ServiceError;
use super::types::{CacheInfo, Viewport};
use crate::coord::{tile_count, tiles_in_bounding_box, zoom_range, BoundingBox, TileRequest};
use crate::fetcher::{BatchFetcher, DownloadError, JobReport};
use crate::lifecycle::{is_marker_key, LifecycleManager};
use crate::provider::{AsyncHttpClient, Connectivity, ReqwestClient};
use crate::router::{CacheRouter, ResourceRequest, RouteOutcome};
use crate::store::{open_storage, CacheStorage, MemoryStorage, StoreRole};
use std::sync::Arc;
use tracing::{info, warn};

/// Offline map caching service.
///
/// Owns the stores, the batch fetcher, the router and the lifecycle
/// manager, all sharing one HTTP client and one connectivity flag.
pub struct OfflineMapService<C: AsyncHttpClient> {
    config: ServiceConfig,
    storage: Arc<dyn CacheStorage>,
    fetcher: Arc<BatchFetcher<C>>,
    router: CacheRouter<C>,
    lifecycle: LifecycleManager<C>,
    connectivity: Connectivity,
}

impl OfflineMapService<ReqwestClient> {
    /// Create a service backed by reqwest.
    ///
    /// Stores are persisted under the configured cache directory; without
    /// one they live in memory. An unusable directory degrades to
    /// network-only operation.
    pub fn start(config: ServiceConfig) -> Result<Self, ServiceError> {
        let client = Arc::new(ReqwestClient::with_timeout(config.request_timeout())?);
        let storage: Arc<dyn CacheStorage> = match config.cache_directory() {
            Some(dir) => open_storage(dir),
            None => Arc::new(MemoryStorage::new()),
        };
        Ok(Self::with_client(config, client, storage))
    }
}

impl<C: AsyncHttpClient> OfflineMapService<C> {
    /// Create a service with an explicit client and storage backend.
    pub fn with_client(config: ServiceConfig, client: Arc<C>, storage: Arc<dyn CacheStorage>) -> Self {
        let connectivity = Connectivity::default();
        let fetcher = Arc::new(BatchFetcher::new(Arc::clone(&client), config.fetch().clone()));

        let router = CacheRouter::new(
            client,
            Arc::clone(&storage),
            config.store_names().clone(),
            config.classifier().clone(),
            connectivity.clone(),
        );

        let lifecycle = LifecycleManager::new(
            Arc::clone(&storage),
            config.store_names().clone(),
            Arc::clone(&fetcher),
            config.tile_template().clone(),
        )
        .with_assets(config.assets().clone())
        .with_facilities(config.facilities().to_vec())
        .with_prewarm(config.prewarm_enabled());

        info!(
            generation = %config.store_names().generation(),
            persistent = storage.is_persistent(),
            concurrency = config.fetch().concurrency,
            "Offline map service created"
        );

        Self {
            config,
            storage,
            fetcher,
            router,
            lifecycle,
            connectivity,
        }
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    pub fn storage(&self) -> &Arc<dyn CacheStorage> {
        &self.storage
    }

    pub fn fetcher(&self) -> &BatchFetcher<C> {
        &self.fetcher
    }

    pub fn lifecycle(&self) -> &LifecycleManager<C> {
        &self.lifecycle
    }

    pub fn connectivity(&self) -> &Connectivity {
        &self.connectivity
    }

    /// Download tiles into the current tile store.
    pub async fn cache_tiles<F>(
        &self,
        requests: &[TileRequest],
        on_progress: F,
    ) -> Result<JobReport, ServiceError>
    where
        F: FnMut(usize, usize) + Send,
    {
        let store = self.storage.open(&self.config.store_names().name(StoreRole::Tiles))?;
        Ok(self.fetcher.fetch_all(requests, store.as_ref(), on_progress).await?)
    }

    /// Download every tile covering `bbox` from `min_zoom` to `max_zoom`.
    ///
    /// The job slot is claimed before any URL is built. Areas larger than
    /// the configured `max_tiles` fail with [`DownloadError::TooManyTiles`].
    pub async fn download_area<F>(
        &self,
        bbox: &BoundingBox,
        min_zoom: u8,
        max_zoom: u8,
        on_progress: F,
    ) -> Result<JobReport, ServiceError>
    where
        F: FnMut(usize, usize) + Send,
    {
        let zooms = zoom_range(min_zoom, max_zoom)?;
        let job = self.fetcher.start_job(0)?;

        let requested = tile_count(bbox, &zooms)?;
        let limit = self.fetcher.config().max_tiles;
        if requested > limit {
            warn!(bbox = %bbox, min_zoom, max_zoom, requested, limit, "Area download too large");
            return Err(DownloadError::TooManyTiles { requested, limit }.into());
        }

        let requests = tiles_in_bounding_box(bbox, &zooms, self.config.tile_template())?;
        info!(bbox = %bbox, min_zoom, max_zoom, tiles = requests.len(), "Downloading area");
        let store = self.storage.open(&self.config.store_names().name(StoreRole::Tiles))?;
        Ok(self.fetcher.run(&job, &requests, store.as_ref(), on_progress).await)
    }

    /// Number of tiles [`download_area`](Self::download_area) would fetch.
    pub fn estimate_tile_count(
        &self,
        bbox: &BoundingBox,
        min_zoom: u8,
        max_zoom: u8,
    ) -> Result<u64, ServiceError> {
        let zooms = zoom_range(min_zoom, max_zoom)?;
        Ok(tile_count(bbox, &zooms)?)
    }

    /// Delete the current tile store. Returns whether it existed.
    pub fn clear_cache(&self) -> Result<bool, ServiceError> {
        let name = self.config.store_names().name(StoreRole::Tiles);
        let deleted = self.storage.delete_store(&name)?;
        info!(store = %name, deleted, "Cleared tile cache");
        Ok(deleted)
    }

    /// Entry counts of the current generation.
    pub fn cache_info(&self) -> Result<CacheInfo, ServiceError> {
        let names = self.config.store_names();
        let count = |role: StoreRole| -> Result<usize, ServiceError> {
            Ok(self.storage.open(&names.name(role))?.count()?)
        };

        let statics = self.storage.open(&names.name(StoreRole::Static))?;
        let static_assets = statics
            .keys()?
            .iter()
            .filter(|key| !is_marker_key(key))
            .count();

        Ok(CacheInfo {
            generation: names.generation().to_string(),
            tiles: count(StoreRole::Tiles)?,
            static_assets,
            dynamic: count(StoreRole::Dynamic)?,
            persistent: self.storage.is_persistent(),
        })
    }

    /// Tile requests for everything visible in `viewport`.
    pub fn visible_tile_urls(&self, viewport: &Viewport) -> Result<Vec<TileRequest>, ServiceError> {
        Ok(tiles_in_bounding_box(
            &viewport.bbox,
            &[viewport.zoom],
            self.config.tile_template(),
        )?)
    }

    /// Router entry point for intercepted requests.
    pub async fn route(&self, request: &ResourceRequest) -> RouteOutcome {
        self.router.handle(request).await
    }
}

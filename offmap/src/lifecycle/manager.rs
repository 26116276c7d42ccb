//! Generation install, activation and commands.

use super::prewarm::PrewarmQueue;
use super::types::{
    AssetManifest, CommandOutcome, InstallReport, LifecycleCommand, LifecycleError,
    LifecycleState, PointOfInterest, PrewarmReport, StartupReport,
};
use crate::coord::TileUrlTemplate;
use crate::fetcher::BatchFetcher;
use crate::provider::AsyncHttpClient;
use crate::store::{CacheEntry, CacheStorage, Store, StoreNames, StoreRole};
use futures::future::join_all;
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Key of the marker written to the static store once a generation is installed.
pub const INSTALLED_MARKER_KEY: &str = "offmap:installed";

/// Key of the marker written to the static store once a generation has
/// purged its predecessors.
pub const ACTIVATED_MARKER_KEY: &str = "offmap:activated";

/// Whether `key` is one of the lifecycle markers rather than a cached asset.
pub fn is_marker_key(key: &str) -> bool {
    key == INSTALLED_MARKER_KEY || key == ACTIVATED_MARKER_KEY
}

/// Drives a store generation through install, activation and commands.
pub struct LifecycleManager<C: AsyncHttpClient> {
    storage: Arc<dyn CacheStorage>,
    names: StoreNames,
    fetcher: Arc<BatchFetcher<C>>,
    template: TileUrlTemplate,
    assets: AssetManifest,
    facilities: Vec<PointOfInterest>,
    prewarm_enabled: bool,
    state: Mutex<LifecycleState>,
}

impl<C: AsyncHttpClient> LifecycleManager<C> {
    pub fn new(
        storage: Arc<dyn CacheStorage>,
        names: StoreNames,
        fetcher: Arc<BatchFetcher<C>>,
        template: TileUrlTemplate,
    ) -> Self {
        Self {
            storage,
            names,
            fetcher,
            template,
            assets: AssetManifest::default(),
            facilities: super::default_facilities(),
            prewarm_enabled: true,
            state: Mutex::new(LifecycleState::Installing),
        }
    }

    pub fn with_assets(mut self, assets: AssetManifest) -> Self {
        self.assets = assets;
        self
    }

    pub fn with_facilities(mut self, facilities: Vec<PointOfInterest>) -> Self {
        self.facilities = facilities;
        self
    }

    pub fn with_prewarm(mut self, enabled: bool) -> Self {
        self.prewarm_enabled = enabled;
        self
    }

    pub fn state(&self) -> LifecycleState {
        *self.state.lock()
    }

    pub fn names(&self) -> &StoreNames {
        &self.names
    }

    pub fn facilities(&self) -> &[PointOfInterest] {
        &self.facilities
    }

    fn set_state(&self, state: LifecycleState) {
        let previous = std::mem::replace(&mut *self.state.lock(), state);
        if previous != state {
            debug!(from = %previous, to = %state, "Lifecycle state change");
        }
    }

    fn open(&self, role: StoreRole) -> Result<Arc<dyn Store>, LifecycleError> {
        Ok(self.storage.open(&self.names.name(role))?)
    }

    /// Whether the current generation has completed an install.
    pub fn is_installed(&self) -> Result<bool, LifecycleError> {
        Ok(self.open(StoreRole::Static)?.contains(INSTALLED_MARKER_KEY)?)
    }

    /// Whether the current generation has completed activation.
    pub fn is_activated(&self) -> Result<bool, LifecycleError> {
        Ok(self.open(StoreRole::Static)?.contains(ACTIVATED_MARKER_KEY)?)
    }

    fn write_marker(&self, key: &str) -> Result<(), LifecycleError> {
        self.open(StoreRole::Static)?.put(
            key,
            CacheEntry::new(
                self.names.generation().as_str().as_bytes().to_vec(),
                Some("text/plain".to_string()),
            ),
        )?;
        Ok(())
    }

    /// Install the current generation.
    ///
    /// Shell assets and the facility pre-warm run concurrently. Individual
    /// failures are reported, not fatal. Leaves the manager `Waiting`.
    pub async fn install(&self) -> Result<InstallReport, LifecycleError> {
        self.set_state(LifecycleState::Installing);
        info!(generation = %self.names.generation(), "Installing cache generation");

        let statics = self.open(StoreRole::Static)?;
        let tiles = self.open(StoreRole::Tiles)?;

        let ((assets_cached, assets_failed), prewarm) = tokio::join!(
            self.install_assets(statics.as_ref()),
            self.prewarm(tiles.as_ref())
        );

        self.write_marker(INSTALLED_MARKER_KEY)?;

        info!(
            assets_cached,
            assets_failed = assets_failed.len(),
            tiles_persisted = prewarm.tiles_persisted(),
            facilities_skipped = prewarm.skipped().count(),
            "Cache generation installed"
        );

        self.set_state(LifecycleState::Waiting);
        Ok(InstallReport {
            assets_cached,
            assets_failed,
            prewarm,
        })
    }

    /// Activate the current generation, deleting every owned store that is
    /// not one of its three. Returns the purged store names.
    ///
    /// The activation marker is written only after the purge, so a process
    /// that stops in between purges again on its next start.
    pub async fn activate(&self) -> Result<Vec<String>, LifecycleError> {
        let mut purged = Vec::new();

        for name in self.storage.store_names()? {
            if self.names.is_stale(&name) && self.storage.delete_store(&name)? {
                info!(store = %name, "Purged stale store");
                purged.push(name);
            }
        }

        self.write_marker(ACTIVATED_MARKER_KEY)?;
        self.set_state(LifecycleState::Active);
        info!(
            generation = %self.names.generation(),
            purged = purged.len(),
            "Cache generation active"
        );
        Ok(purged)
    }

    /// Warm start if the current generation is active. An installed
    /// generation that never activated is activated now. Otherwise install
    /// and activate it.
    pub async fn startup(&self) -> Result<StartupReport, LifecycleError> {
        if self.is_installed()? {
            if self.is_activated()? {
                info!(generation = %self.names.generation(), "Warm start");
                self.set_state(LifecycleState::Active);
                return Ok(StartupReport::WarmStart);
            }
            info!(generation = %self.names.generation(), "Activating installed generation");
            self.set_state(LifecycleState::Waiting);
            let purged = self.activate().await?;
            return Ok(StartupReport::Activated { purged });
        }

        let install = self.install().await?;
        let purged = self.activate().await?;
        Ok(StartupReport::Installed { install, purged })
    }

    pub async fn handle(&self, command: LifecycleCommand) -> Result<CommandOutcome, LifecycleError> {
        debug!(?command, state = %self.state(), "Lifecycle command");
        match command {
            LifecycleCommand::ClearAll => Ok(CommandOutcome::Cleared(self.clear_all()?)),
            LifecycleCommand::RecachePointsOfInterest => {
                Ok(CommandOutcome::Recached(self.recache().await?))
            }
            LifecycleCommand::SkipWaiting => match self.state() {
                LifecycleState::Waiting => Ok(CommandOutcome::Activated(self.activate().await?)),
                LifecycleState::Active => Ok(CommandOutcome::Activated(Vec::new())),
                state => Err(LifecycleError::InvalidState {
                    action: "skip waiting",
                    state,
                }),
            },
        }
    }

    /// Delete every store owned by this prefix, of any role or generation.
    pub fn clear_all(&self) -> Result<Vec<String>, LifecycleError> {
        let mut cleared = Vec::new();
        for name in self.storage.store_names()? {
            if self.names.is_owned(&name) && self.storage.delete_store(&name)? {
                cleared.push(name);
            }
        }
        info!(stores = cleared.len(), "Cleared all caches");
        Ok(cleared)
    }

    /// Re-run the facility pre-warm into the current tile store.
    pub async fn recache(&self) -> Result<PrewarmReport, LifecycleError> {
        let previous = self.state();
        let updating = previous == LifecycleState::Active;
        if updating {
            self.set_state(LifecycleState::Updating);
        }

        let tiles = self.open(StoreRole::Tiles);
        let report = match tiles {
            Ok(tiles) => Ok(self.prewarm(tiles.as_ref()).await),
            Err(e) => Err(e),
        };

        if updating {
            self.set_state(previous);
        }
        report
    }

    async fn install_assets(&self, store: &dyn Store) -> (usize, Vec<String>) {
        let urls = self.assets.urls();
        let client = self.fetcher.client();

        let results = join_all(urls.iter().map(|url| async move { (url, client.get(url).await) })).await;

        let mut cached = 0;
        let mut failed = Vec::new();
        for (url, result) in results {
            let stored = result.map_err(|e| e.to_string()).and_then(|response| {
                let entry = CacheEntry::new(response.body, response.content_type)
                    .with_status(response.status);
                store.put(url, entry).map_err(|e| e.to_string())
            });
            match stored {
                Ok(()) => cached += 1,
                Err(e) => {
                    warn!(url = %url, error = %e, "Failed to install asset");
                    failed.push(url.clone());
                }
            }
        }
        (cached, failed)
    }

    async fn prewarm(&self, store: &dyn Store) -> PrewarmReport {
        if !self.prewarm_enabled {
            debug!("Pre-warm disabled");
            return PrewarmReport::default();
        }
        let mut queue = PrewarmQueue::from_facilities(&self.facilities);
        queue.drain(&self.fetcher, &self.template, store).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetcher::FetchConfig;
    use crate::provider::MockAsyncHttpClient;
    use crate::store::{MemoryStorage, StoreGeneration};
    use std::time::Duration;

    const TILE: &str = "https://tiles.test/tile/14/8763/6092";

    fn entry() -> CacheEntry {
        CacheEntry::new(vec![1], Some("image/jpeg".to_string()))
    }

    fn manager(
        storage: Arc<dyn CacheStorage>,
        generation: &str,
    ) -> LifecycleManager<MockAsyncHttpClient> {
        let fetcher = Arc::new(BatchFetcher::new(
            Arc::new(MockAsyncHttpClient::always(&[1, 2])),
            FetchConfig::new(16, Duration::ZERO),
        ));
        LifecycleManager::new(
            storage,
            StoreNames::new("offmap", StoreGeneration::new(generation).unwrap()),
            fetcher,
            TileUrlTemplate::default(),
        )
        .with_facilities(vec![
            PointOfInterest::new("Frascati", 41.8273, 12.6734).with_zoom_levels(vec![14])
        ])
    }

    #[tokio::test]
    async fn test_install_then_activate() {
        let storage: Arc<dyn CacheStorage> = Arc::new(MemoryStorage::new());
        let manager = manager(Arc::clone(&storage), "v1");
        assert_eq!(manager.state(), LifecycleState::Installing);

        let report = manager.install().await.unwrap();
        assert_eq!(manager.state(), LifecycleState::Waiting);
        assert_eq!(report.assets_cached, 5);
        assert!(report.assets_failed.is_empty());
        assert_eq!(report.prewarm.tiles_persisted(), 9);
        assert!(manager.is_installed().unwrap());

        let purged = manager.activate().await.unwrap();
        assert!(purged.is_empty());
        assert_eq!(manager.state(), LifecycleState::Active);
    }

    #[tokio::test]
    async fn test_activation_purges_only_stale_owned_stores() {
        let storage: Arc<dyn CacheStorage> = Arc::new(MemoryStorage::new());
        for name in ["offmap-tiles-v1", "offmap-static-v1", "other-app-tiles-v1"] {
            storage.open(name).unwrap().put(TILE, entry()).unwrap();
        }

        let manager = manager(Arc::clone(&storage), "v2");
        manager.install().await.unwrap();
        let mut purged = manager.activate().await.unwrap();
        purged.sort();

        assert_eq!(purged, vec!["offmap-static-v1", "offmap-tiles-v1"]);
        let names = storage.store_names().unwrap();
        assert!(names.contains(&"other-app-tiles-v1".to_string()));
        assert!(names.contains(&"offmap-tiles-v2".to_string()));
    }

    #[tokio::test]
    async fn test_restart_after_install_purges_previous_generation() {
        let storage: Arc<dyn CacheStorage> = Arc::new(MemoryStorage::new());
        manager(Arc::clone(&storage), "v1").startup().await.unwrap();

        // v2 installs, then the process stops before activating.
        let interrupted = manager(Arc::clone(&storage), "v2");
        interrupted.install().await.unwrap();
        assert!(interrupted.is_installed().unwrap());
        assert!(!interrupted.is_activated().unwrap());

        let restarted = manager(Arc::clone(&storage), "v2");
        let report = restarted.startup().await.unwrap();
        let StartupReport::Activated { mut purged } = report else {
            panic!("expected activation");
        };
        purged.sort();
        assert_eq!(purged, vec!["offmap-static-v1", "offmap-tiles-v1"]);
        assert_eq!(restarted.state(), LifecycleState::Active);
        assert!(restarted.is_activated().unwrap());

        let again = manager(Arc::clone(&storage), "v2");
        assert_eq!(again.startup().await.unwrap(), StartupReport::WarmStart);
    }

    #[test]
    fn test_marker_keys() {
        assert!(is_marker_key(INSTALLED_MARKER_KEY));
        assert!(is_marker_key(ACTIVATED_MARKER_KEY));
        assert!(!is_marker_key("https://app.test/index.html"));
    }

    #[tokio::test]
    async fn test_skip_waiting_requires_install() {
        let storage: Arc<dyn CacheStorage> = Arc::new(MemoryStorage::new());
        let manager = manager(storage, "v1");

        let err = manager.handle(LifecycleCommand::SkipWaiting).await.unwrap_err();
        assert!(matches!(
            err,
            LifecycleError::InvalidState {
                state: LifecycleState::Installing,
                ..
            }
        ));

        manager.install().await.unwrap();
        let outcome = manager.handle(LifecycleCommand::SkipWaiting).await.unwrap();
        assert_eq!(outcome, CommandOutcome::Activated(Vec::new()));
        assert_eq!(manager.state(), LifecycleState::Active);
    }

    #[tokio::test]
    async fn test_clear_all_deletes_every_generation() {
        let storage: Arc<dyn CacheStorage> = Arc::new(MemoryStorage::new());
        for name in ["offmap-tiles-v0", "other-app-tiles-v1"] {
            storage.open(name).unwrap().put(TILE, entry()).unwrap();
        }
        let manager = manager(Arc::clone(&storage), "v1");
        manager.install().await.unwrap();

        let outcome = manager.handle(LifecycleCommand::ClearAll).await.unwrap();
        let CommandOutcome::Cleared(cleared) = outcome else {
            panic!("expected Cleared");
        };
        assert_eq!(cleared.len(), 3);
        assert_eq!(storage.store_names().unwrap(), vec!["other-app-tiles-v1"]);
        assert!(!manager.is_installed().unwrap());
    }

    #[tokio::test]
    async fn test_recache_restores_active_state() {
        let storage: Arc<dyn CacheStorage> = Arc::new(MemoryStorage::new());
        let manager = manager(Arc::clone(&storage), "v1");
        manager.startup().await.unwrap();
        assert_eq!(manager.state(), LifecycleState::Active);

        let outcome = manager
            .handle(LifecycleCommand::RecachePointsOfInterest)
            .await
            .unwrap();
        let CommandOutcome::Recached(report) = outcome else {
            panic!("expected Recached");
        };
        assert_eq!(report.tiles_persisted(), 9);
        assert_eq!(manager.state(), LifecycleState::Active);
    }

    #[tokio::test]
    async fn test_prewarm_disabled() {
        let storage: Arc<dyn CacheStorage> = Arc::new(MemoryStorage::new());
        let manager = manager(Arc::clone(&storage), "v1").with_prewarm(false);

        let report = manager.install().await.unwrap();
        assert!(report.prewarm.facilities.is_empty());
        assert_eq!(storage.open("offmap-tiles-v1").unwrap().count().unwrap(), 0);
    }
}

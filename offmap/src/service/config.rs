//! Service configuration types.

use crate::coord::TileUrlTemplate;
use crate::fetcher::FetchConfig;
use crate::lifecycle::{default_facilities, AssetManifest, PointOfInterest};
use crate::provider::DEFAULT_TIMEOUT_SECS;
use crate::router::Classifier;
use crate::store::StoreNames;
use std::path::PathBuf;
use std::time::Duration;

/// Configuration for the offline map service.
///
/// # Example
///
/// ```
/// use offmap::fetcher::FetchConfig;
/// use offmap::service::ServiceConfig;
/// use std::time::Duration;
///
/// let config = ServiceConfig::builder()
///     .fetch(FetchConfig::new(4, Duration::from_millis(250)))
///     .prewarm_enabled(false)
///     .build();
///
/// assert_eq!(config.fetch().concurrency, 4);
/// assert!(config.cache_directory().is_none());
/// ```
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Cache root; `None` keeps everything in memory
    cache_directory: Option<PathBuf>,
    /// Store prefix and current generation
    store_names: StoreNames,
    /// Tile URL template
    tile_template: TileUrlTemplate,
    /// Request classification rules
    classifier: Classifier,
    /// Batch download tuning
    fetch: FetchConfig,
    /// Per-request HTTP timeout
    request_timeout: Duration,
    /// Shell assets installed with each generation
    assets: AssetManifest,
    /// Facilities pre-warmed at install
    facilities: Vec<PointOfInterest>,
    prewarm_enabled: bool,
}

impl ServiceConfig {
    /// Create a new configuration builder.
    pub fn builder() -> ServiceConfigBuilder {
        ServiceConfigBuilder::default()
    }

    pub fn cache_directory(&self) -> Option<&PathBuf> {
        self.cache_directory.as_ref()
    }

    pub fn store_names(&self) -> &StoreNames {
        &self.store_names
    }

    pub fn tile_template(&self) -> &TileUrlTemplate {
        &self.tile_template
    }

    pub fn classifier(&self) -> &Classifier {
        &self.classifier
    }

    pub fn fetch(&self) -> &FetchConfig {
        &self.fetch
    }

    pub fn request_timeout(&self) -> Duration {
        self.request_timeout
    }

    pub fn assets(&self) -> &AssetManifest {
        &self.assets
    }

    pub fn facilities(&self) -> &[PointOfInterest] {
        &self.facilities
    }

    pub fn prewarm_enabled(&self) -> bool {
        self.prewarm_enabled
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// Builder for ServiceConfig.
#[derive(Debug, Clone, Default)]
pub struct ServiceConfigBuilder {
    cache_directory: Option<PathBuf>,
    store_names: Option<StoreNames>,
    tile_template: Option<TileUrlTemplate>,
    classifier: Option<Classifier>,
    fetch: Option<FetchConfig>,
    request_timeout: Option<Duration>,
    assets: Option<AssetManifest>,
    facilities: Option<Vec<PointOfInterest>>,
    prewarm_enabled: Option<bool>,
}

impl ServiceConfigBuilder {
    /// Persist stores under this directory.
    pub fn cache_directory(mut self, path: PathBuf) -> Self {
        self.cache_directory = Some(path);
        self
    }

    pub fn store_names(mut self, names: StoreNames) -> Self {
        self.store_names = Some(names);
        self
    }

    pub fn tile_template(mut self, template: TileUrlTemplate) -> Self {
        self.tile_template = Some(template);
        self
    }

    pub fn classifier(mut self, classifier: Classifier) -> Self {
        self.classifier = Some(classifier);
        self
    }

    pub fn fetch(mut self, config: FetchConfig) -> Self {
        self.fetch = Some(config);
        self
    }

    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    pub fn assets(mut self, assets: AssetManifest) -> Self {
        self.assets = Some(assets);
        self
    }

    pub fn facilities(mut self, facilities: Vec<PointOfInterest>) -> Self {
        self.facilities = Some(facilities);
        self
    }

    pub fn prewarm_enabled(mut self, enabled: bool) -> Self {
        self.prewarm_enabled = Some(enabled);
        self
    }

    pub fn build(self) -> ServiceConfig {
        ServiceConfig {
            cache_directory: self.cache_directory,
            store_names: self.store_names.unwrap_or_default(),
            tile_template: self.tile_template.unwrap_or_default(),
            classifier: self.classifier.unwrap_or_default(),
            fetch: self.fetch.unwrap_or_default(),
            request_timeout: self
                .request_timeout
                .unwrap_or(Duration::from_secs(DEFAULT_TIMEOUT_SECS)),
            assets: self.assets.unwrap_or_default(),
            facilities: self.facilities.unwrap_or_else(default_facilities),
            prewarm_enabled: self.prewarm_enabled.unwrap_or(true),
        }
    }
}

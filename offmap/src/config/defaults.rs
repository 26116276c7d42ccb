//! Default values for the configuration file.

use super::file::config_directory;
use super::settings::*;
use crate::coord::DEFAULT_TILE_URL_TEMPLATE;
use crate::fetcher::{DEFAULT_BATCH_DELAY_MS, DEFAULT_CONCURRENCY, DEFAULT_MAX_TILES, MAX_CONCURRENCY};
use crate::lifecycle::{
    DEFAULT_ASSET_BASE_URL, DEFAULT_ASSET_PATHS, DEFAULT_PREWARM_RADIUS_KM,
    DEFAULT_PREWARM_ZOOM_LEVELS,
};
use crate::provider::DEFAULT_TIMEOUT_SECS;
use crate::router::{DEFAULT_API_HOST, DEFAULT_TILE_HOST, DEFAULT_TILE_PATH_MARKER};
use crate::store::{DEFAULT_GENERATION, DEFAULT_STORE_PREFIX};
use std::path::PathBuf;

/// Default log file name inside the config directory.
pub const DEFAULT_LOG_FILE_NAME: &str = "offmap.log";

/// Clamp a configured batch concurrency into the supported range.
pub fn clamp_concurrency(value: usize) -> usize {
    value.clamp(1, MAX_CONCURRENCY)
}

/// Default cache directory (~/.offmap/cache).
pub fn default_cache_directory() -> PathBuf {
    config_directory().join("cache")
}

/// Default log file (~/.offmap/offmap.log).
pub fn default_log_file() -> PathBuf {
    config_directory().join(DEFAULT_LOG_FILE_NAME)
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            tile_url_template: DEFAULT_TILE_URL_TEMPLATE.to_string(),
            tile_hosts: vec![DEFAULT_TILE_HOST.to_string()],
            tile_path_marker: DEFAULT_TILE_PATH_MARKER.to_string(),
            api_hosts: vec![DEFAULT_API_HOST.to_string()],
            timeout: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            directory: default_cache_directory(),
            prefix: DEFAULT_STORE_PREFIX.to_string(),
            generation: DEFAULT_GENERATION.to_string(),
        }
    }
}

impl Default for DownloadSettings {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_CONCURRENCY,
            batch_delay_ms: DEFAULT_BATCH_DELAY_MS,
            max_tiles: DEFAULT_MAX_TILES,
        }
    }
}

impl Default for PrewarmSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            zoom_levels: DEFAULT_PREWARM_ZOOM_LEVELS.to_vec(),
            radius_km: DEFAULT_PREWARM_RADIUS_KM,
        }
    }
}

impl Default for AssetSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_ASSET_BASE_URL.to_string(),
            manifest: DEFAULT_ASSET_PATHS.iter().map(|p| p.to_string()).collect(),
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            file: default_log_file(),
        }
    }
}

//! Settings structs for all configuration sections.
//!
//! Each struct represents one `[section]` of the INI config file.
//! These are pure data types with no parsing or serialization logic.

use std::path::PathBuf;

/// Complete application configuration loaded from config.ini.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigFile {
    /// Tile provider and request classification
    pub provider: ProviderSettings,
    /// Store location and naming
    pub cache: CacheSettings,
    /// Batch download tuning
    pub download: DownloadSettings,
    /// Install-time facility pre-warm
    pub prewarm: PrewarmSettings,
    /// Application shell assets
    pub assets: AssetSettings,
    pub logging: LoggingSettings,
}

/// Provider configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderSettings {
    /// Tile URL template with `{z}`, `{x}` and `{y}` placeholders
    pub tile_url_template: String,
    /// Hosts whose tile-path requests are cached cache-first
    pub tile_hosts: Vec<String>,
    /// Path fragment that marks a tile request
    pub tile_path_marker: String,
    /// Geocoding/API hosts (network-first)
    pub api_hosts: Vec<String>,
    /// HTTP request timeout in seconds
    pub timeout: u64,
}

/// Cache configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheSettings {
    /// Cache directory path
    pub directory: PathBuf,
    /// Store name prefix
    pub prefix: String,
    /// Current generation tag
    pub generation: String,
}

/// Download configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct DownloadSettings {
    /// Concurrent fetches per batch (1-64)
    pub concurrency: usize,
    /// Pause between batches in milliseconds
    pub batch_delay_ms: u64,
    /// Largest area download accepted, in tiles
    pub max_tiles: u64,
}

/// Prewarm configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct PrewarmSettings {
    pub enabled: bool,
    /// Zoom levels fetched around each facility
    pub zoom_levels: Vec<u8>,
    /// Catchment radius around each facility
    pub radius_km: f64,
}

/// Asset configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct AssetSettings {
    pub base_url: String,
    /// Paths relative to `base_url`
    pub manifest: Vec<String>,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct LoggingSettings {
    /// Log file path
    pub file: PathBuf,
}

//! Configuration file handling for ~/.offmap/config.ini.
//!
//! Loads and saves user configuration with sensible defaults.
//! Settings structs live in [`super::settings`], constants in [`super::defaults`],
//! parsing in [`super::parser`], and serialization in [`super::writer`].

use ini::Ini;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use super::settings::ConfigFile;
use crate::coord::TileUrlTemplate;
use crate::fetcher::FetchConfig;
use crate::lifecycle::{default_facilities, AssetManifest};
use crate::router::Classifier;
use crate::service::ServiceConfig;
use crate::store::{StoreGeneration, StoreNames};

/// Configuration file errors.
#[derive(Debug, Error)]
pub enum ConfigFileError {
    /// Failed to read config file
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] ini::Error),

    /// Failed to write config file
    #[error("Failed to write config file: {0}")]
    WriteError(String),

    /// Invalid configuration value
    #[error("Invalid configuration: {section}.{key} = '{value}' - {reason}")]
    InvalidValue {
        section: String,
        key: String,
        value: String,
        reason: String,
    },

    /// Failed to create config directory
    #[error("Failed to create config directory: {0}")]
    DirectoryError(std::io::Error),
}

impl ConfigFile {
    /// Load configuration from the default path (~/.offmap/config.ini).
    pub fn load() -> Result<Self, ConfigFileError> {
        Self::load_from(&config_file_path())
    }

    /// Load configuration from a specific path.
    ///
    /// If the file doesn't exist, returns defaults.
    pub fn load_from(path: &Path) -> Result<Self, ConfigFileError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let ini = Ini::load_from_file(path)?;
        super::parser::parse_ini(&ini)
    }

    /// Save configuration to the default path (~/.offmap/config.ini).
    pub fn save(&self) -> Result<(), ConfigFileError> {
        self.save_to(&config_file_path())
    }

    /// Save configuration to a specific path.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigFileError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(ConfigFileError::DirectoryError)?;
        }

        let content = super::writer::to_config_string(self);
        std::fs::write(path, content).map_err(|e| ConfigFileError::WriteError(e.to_string()))
    }

    /// Create the default config file if it doesn't exist.
    ///
    /// Returns the path to the config file.
    pub fn ensure_exists() -> Result<PathBuf, ConfigFileError> {
        let path = config_file_path();
        if !path.exists() {
            Self::default().save_to(&path)?;
        }
        Ok(path)
    }

    /// Build the service configuration described by this file.
    pub fn service_config(&self) -> Result<ServiceConfig, ConfigFileError> {
        let template = TileUrlTemplate::parse(self.provider.tile_url_template.as_str())
            .map_err(|e| ConfigFileError::InvalidValue {
                section: "provider".to_string(),
                key: "tile_url_template".to_string(),
                value: self.provider.tile_url_template.clone(),
                reason: e.to_string(),
            })?;
        let generation = StoreGeneration::new(self.cache.generation.as_str()).map_err(|e| {
            ConfigFileError::InvalidValue {
                section: "cache".to_string(),
                key: "generation".to_string(),
                value: self.cache.generation.clone(),
                reason: e.to_string(),
            }
        })?;

        let facilities = default_facilities()
            .into_iter()
            .map(|f| {
                f.with_radius_km(self.prewarm.radius_km)
                    .with_zoom_levels(self.prewarm.zoom_levels.clone())
            })
            .collect();

        Ok(ServiceConfig::builder()
            .cache_directory(self.cache.directory.clone())
            .store_names(StoreNames::new(self.cache.prefix.as_str(), generation))
            .tile_template(template)
            .classifier(Classifier::new(
                self.provider.tile_hosts.clone(),
                self.provider.tile_path_marker.as_str(),
                self.provider.api_hosts.clone(),
            ))
            .fetch(
                FetchConfig::new(
                    self.download.concurrency,
                    Duration::from_millis(self.download.batch_delay_ms),
                )
                .with_max_tiles(self.download.max_tiles),
            )
            .request_timeout(Duration::from_secs(self.provider.timeout))
            .assets(AssetManifest::new(
                self.assets.base_url.as_str(),
                self.assets.manifest.clone(),
            ))
            .facilities(facilities)
            .prewarm_enabled(self.prewarm.enabled)
            .build())
    }
}

/// Get the path to the config directory (~/.offmap).
pub fn config_directory() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".offmap")
}

/// Get the path to the config file (~/.offmap/config.ini).
pub fn config_file_path() -> PathBuf {
    config_directory().join("config.ini")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::defaults::DEFAULT_LOG_FILE_NAME;
    use crate::store::StoreRole;

    #[test]
    fn test_default_config() {
        let config = ConfigFile::default();

        assert_eq!(config.cache.prefix, "offmap");
        assert_eq!(config.cache.generation, "v1");
        assert_eq!(config.download.concurrency, 6);
        assert_eq!(config.download.batch_delay_ms, 100);
        assert_eq!(config.prewarm.zoom_levels, vec![14, 15, 16]);
        assert!(config.logging.file.ends_with(DEFAULT_LOG_FILE_NAME));
    }

    #[test]
    fn test_load_nonexistent_returns_defaults() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let config_path = temp_dir.path().join("nonexistent.ini");

        let config = ConfigFile::load_from(&config_path).unwrap();
        assert_eq!(config, ConfigFile::default());
    }

    #[test]
    fn test_service_config_from_file() {
        let mut file = ConfigFile::default();
        file.cache.generation = "v9".to_string();
        file.download.concurrency = 2;
        file.download.max_tiles = 500;
        file.prewarm.radius_km = 1.0;
        file.prewarm.zoom_levels = vec![12];

        let config = file.service_config().unwrap();

        assert_eq!(config.store_names().name(StoreRole::Tiles), "offmap-tiles-v9");
        assert_eq!(config.fetch().concurrency, 2);
        assert_eq!(config.fetch().max_tiles, 500);
        assert_eq!(config.facilities().len(), 3);
        assert!(config
            .facilities()
            .iter()
            .all(|f| f.radius_km == 1.0 && f.zoom_levels == vec![12]));
        assert_eq!(config.cache_directory(), Some(&file.cache.directory));
    }
}

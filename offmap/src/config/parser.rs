//! INI parsing logic for converting `Ini` → `ConfigFile`.
//!
//! This is the single place where INI key names are mapped to struct fields.

use ini::Ini;
use std::path::PathBuf;

use super::defaults::clamp_concurrency;
use super::file::ConfigFileError;
use super::settings::ConfigFile;
use crate::coord::{TileUrlTemplate, MAX_ZOOM};
use crate::store::StoreGeneration;

/// Parse an `Ini` object into a `ConfigFile`.
///
/// Starts from `ConfigFile::default()` and overlays any values found in the INI.
pub(super) fn parse_ini(ini: &Ini) -> Result<ConfigFile, ConfigFileError> {
    let mut config = ConfigFile::default();

    // [provider] section
    if let Some(section) = ini.section(Some("provider")) {
        if let Some(v) = section.get("tile_url_template") {
            let v = v.trim();
            TileUrlTemplate::parse(v)
                .map_err(|e| invalid("provider", "tile_url_template", v, e.to_string()))?;
            config.provider.tile_url_template = v.to_string();
        }
        if let Some(v) = section.get("tile_hosts") {
            config.provider.tile_hosts = parse_list(v);
        }
        if let Some(v) = section.get("tile_path_marker") {
            let v = v.trim();
            if v.is_empty() {
                return Err(invalid("provider", "tile_path_marker", v, "must not be empty"));
            }
            config.provider.tile_path_marker = v.to_string();
        }
        if let Some(v) = section.get("api_hosts") {
            config.provider.api_hosts = parse_list(v);
        }
        if let Some(v) = section.get("timeout") {
            config.provider.timeout = match v.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => secs,
                _ => {
                    return Err(invalid(
                        "provider",
                        "timeout",
                        v,
                        "must be a positive integer (seconds)",
                    ))
                }
            };
        }
    }

    // [cache] section
    if let Some(section) = ini.section(Some("cache")) {
        if let Some(v) = section.get("directory") {
            let v = v.trim();
            if !v.is_empty() {
                config.cache.directory = expand_tilde(v);
            }
        }
        if let Some(v) = section.get("prefix") {
            let v = v.trim();
            let valid = !v.is_empty()
                && v
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
            if !valid {
                return Err(invalid(
                    "cache",
                    "prefix",
                    v,
                    "must be non-empty ASCII letters, digits, '-' or '_'",
                ));
            }
            config.cache.prefix = v.to_string();
        }
        if let Some(v) = section.get("generation") {
            let v = v.trim();
            StoreGeneration::new(v).map_err(|_| {
                invalid(
                    "cache",
                    "generation",
                    v,
                    "must be non-empty ASCII letters, digits, '.' or '_'",
                )
            })?;
            config.cache.generation = v.to_string();
        }
    }

    // [download] section
    if let Some(section) = ini.section(Some("download")) {
        if let Some(v) = section.get("concurrency") {
            let n: usize = v
                .trim()
                .parse()
                .map_err(|_| invalid("download", "concurrency", v, "must be a positive integer"))?;
            config.download.concurrency = clamp_concurrency(n);
        }
        if let Some(v) = section.get("batch_delay_ms") {
            config.download.batch_delay_ms = v.trim().parse().map_err(|_| {
                invalid(
                    "download",
                    "batch_delay_ms",
                    v,
                    "must be a non-negative integer (milliseconds)",
                )
            })?;
        }
        if let Some(v) = section.get("max_tiles") {
            config.download.max_tiles = v
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|n| *n > 0)
                .ok_or_else(|| invalid("download", "max_tiles", v, "must be a positive integer"))?;
        }
    }

    // [prewarm] section
    if let Some(section) = ini.section(Some("prewarm")) {
        if let Some(v) = section.get("enabled") {
            config.prewarm.enabled = parse_bool(v)
                .ok_or_else(|| invalid("prewarm", "enabled", v, "must be true or false"))?;
        }
        if let Some(v) = section.get("zoom_levels") {
            config.prewarm.zoom_levels = parse_zoom_levels(v)
                .ok_or_else(|| {
                    invalid(
                        "prewarm",
                        "zoom_levels",
                        v,
                        format!("must be a comma-separated list of zoom levels 0-{}", MAX_ZOOM),
                    )
                })?;
        }
        if let Some(v) = section.get("radius_km") {
            config.prewarm.radius_km = match v.trim().parse::<f64>() {
                Ok(r) if r.is_finite() && r > 0.0 => r,
                _ => {
                    return Err(invalid(
                        "prewarm",
                        "radius_km",
                        v,
                        "must be a positive number of kilometres",
                    ))
                }
            };
        }
    }

    // [assets] section
    if let Some(section) = ini.section(Some("assets")) {
        if let Some(v) = section.get("base_url") {
            let v = v.trim();
            reqwest::Url::parse(v)
                .map_err(|e| invalid("assets", "base_url", v, e.to_string()))?;
            config.assets.base_url = v.to_string();
        }
        if let Some(v) = section.get("manifest") {
            config.assets.manifest = parse_list(v);
        }
    }

    // [logging] section
    if let Some(section) = ini.section(Some("logging")) {
        if let Some(v) = section.get("file") {
            let v = v.trim();
            if !v.is_empty() {
                config.logging.file = expand_tilde(v);
            }
        }
    }

    Ok(config)
}

fn invalid(section: &str, key: &str, value: &str, reason: impl Into<String>) -> ConfigFileError {
    ConfigFileError::InvalidValue {
        section: section.to_string(),
        key: key.to_string(),
        value: value.to_string(),
        reason: reason.into(),
    }
}

fn parse_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" | "yes" | "1" | "on" => Some(true),
        "false" | "no" | "0" | "off" => Some(false),
        _ => None,
    }
}

fn parse_zoom_levels(value: &str) -> Option<Vec<u8>> {
    let mut zooms = Vec::new();
    for item in parse_list(value) {
        let zoom: u8 = item.parse().ok()?;
        if zoom > MAX_ZOOM {
            return None;
        }
        zooms.push(zoom);
    }
    if zooms.is_empty() {
        return None;
    }
    Some(zooms)
}

/// Expand a leading `~/` to the home directory.
pub(super) fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(stripped);
        }
    }
    PathBuf::from(path)
}

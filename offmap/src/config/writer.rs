//! INI serialization logic for converting `ConfigFile` → INI string.
//!
//! Produces the commented INI representation written to `config.ini`.

use std::fmt;
use std::path::Path;

use super::settings::ConfigFile;

/// Convert a `ConfigFile` to a commented INI string for saving.
pub(super) fn to_config_string(config: &ConfigFile) -> String {
    let zoom_levels = config
        .prewarm
        .zoom_levels
        .iter()
        .map(|z| z.to_string())
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        r#"[provider]
; Tile URL template. Must contain {{z}}, {{x}} and {{y}}.
; The default ArcGIS World Imagery endpoint orders the path z/y/x.
tile_url_template = {}
; Hosts serving map tiles (comma separated). Requests to these hosts whose
; path contains tile_path_marker are served cache-first.
tile_hosts = {}
tile_path_marker = {}
; Geocoding/API hosts (comma separated), served network-first
api_hosts = {}
; HTTP request timeout in seconds
timeout = {}

[cache]
; Directory holding the tile, static and dynamic stores
directory = {}
; Store names are <prefix>-<role>-<generation>
prefix = {}
; Changing the generation installs fresh stores and purges the old ones
generation = {}

[download]
; Concurrent tile fetches per batch (1-64)
concurrency = {}
; Pause between batches in milliseconds
batch_delay_ms = {}
; Refuse area downloads covering more tiles than this
max_tiles = {}

[prewarm]
; Download tiles around the built-in facilities at install time
enabled = {}
zoom_levels = {}
radius_km = {}

[assets]
; Application shell assets installed into the static store
base_url = {}
manifest = {}

[logging]
file = {}
"#,
        config.provider.tile_url_template,
        config.provider.tile_hosts.join(", "),
        config.provider.tile_path_marker,
        config.provider.api_hosts.join(", "),
        config.provider.timeout,
        path_to_string(&config.cache.directory),
        config.cache.prefix,
        config.cache.generation,
        config.download.concurrency,
        config.download.batch_delay_ms,
        config.download.max_tiles,
        config.prewarm.enabled,
        zoom_levels,
        config.prewarm.radius_km,
        config.assets.base_url,
        config.assets.manifest.join(", "),
        path_to_string(&config.logging.file),
    )
}

/// Render a path, abbreviating the home directory to `~`.
fn path_to_string(path: &Path) -> String {
    if let Some(home) = dirs::home_dir() {
        if let Ok(stripped) = path.strip_prefix(&home) {
            return format!("~/{}", stripped.display());
        }
    }
    path.display().to_string()
}

impl fmt::Display for ConfigFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&to_config_string(self))
    }
}

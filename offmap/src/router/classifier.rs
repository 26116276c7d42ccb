//! Request classification by URL pattern.

use std::fmt;

/// Default tile imagery host.
pub const DEFAULT_TILE_HOST: &str = "server.arcgisonline.com";

/// Default path fragment identifying tile requests.
pub const DEFAULT_TILE_PATH_MARKER: &str = "/tile/";

/// Default geocoding API host.
pub const DEFAULT_API_HOST: &str = "nominatim.openstreetmap.org";

/// Resource class of an intercepted request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequestClass {
    /// Map tile: cache-first against the tile store
    Tile,
    /// Geocoding/API response: network-first against the dynamic store
    Api,
    /// Anything else: cache-first against the static store
    Static,
}

impl fmt::Display for RequestClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestClass::Tile => write!(f, "tile"),
            RequestClass::Api => write!(f, "api"),
            RequestClass::Static => write!(f, "static"),
        }
    }
}

/// Classifies URLs by host and path substring, first match wins:
/// tile, then API, then static.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classifier {
    tile_hosts: Vec<String>,
    tile_path_marker: String,
    api_hosts: Vec<String>,
}

impl Classifier {
    pub fn new(
        tile_hosts: Vec<String>,
        tile_path_marker: impl Into<String>,
        api_hosts: Vec<String>,
    ) -> Self {
        Self {
            tile_hosts,
            tile_path_marker: tile_path_marker.into(),
            api_hosts,
        }
    }

    pub fn tile_hosts(&self) -> &[String] {
        &self.tile_hosts
    }

    pub fn api_hosts(&self) -> &[String] {
        &self.api_hosts
    }

    pub fn classify(&self, url: &str) -> RequestClass {
        // Unparseable URLs are matched against the whole string.
        let (host, path) = match reqwest::Url::parse(url) {
            Ok(parsed) => (
                parsed.host_str().unwrap_or_default().to_ascii_lowercase(),
                parsed.path().to_string(),
            ),
            Err(_) => (url.to_ascii_lowercase(), url.to_string()),
        };

        let host_matches = |hosts: &[String]| {
            hosts
                .iter()
                .any(|h| !h.is_empty() && host.contains(&h.to_ascii_lowercase()))
        };

        if host_matches(&self.tile_hosts) && path.contains(&self.tile_path_marker) {
            RequestClass::Tile
        } else if host_matches(&self.api_hosts) {
            RequestClass::Api
        } else {
            RequestClass::Static
        }
    }
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new(
            vec![DEFAULT_TILE_HOST.to_string()],
            DEFAULT_TILE_PATH_MARKER,
            vec![DEFAULT_API_HOST.to_string()],
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_classification() {
        let classifier = Classifier::default();

        assert_eq!(
            classifier.classify(
                "https://server.arcgisonline.com/ArcGIS/rest/services/World_Imagery/MapServer/tile/15/12182/17535"
            ),
            RequestClass::Tile
        );
        assert_eq!(
            classifier.classify("https://nominatim.openstreetmap.org/reverse?lat=41.8&lon=12.6&format=json"),
            RequestClass::Api
        );
        assert_eq!(
            classifier.classify("https://app.example.com/index.html"),
            RequestClass::Static
        );
    }

    #[test]
    fn test_tile_host_without_tile_path_is_static() {
        let classifier = Classifier::default();
        assert_eq!(
            classifier.classify("https://server.arcgisonline.com/ArcGIS/rest/info"),
            RequestClass::Static
        );
    }

    #[test]
    fn test_tile_wins_over_api() {
        let classifier = Classifier::new(
            vec!["maps.test".into()],
            "/tile/",
            vec!["maps.test".into()],
        );
        assert_eq!(classifier.classify("https://maps.test/tile/1/2/3"), RequestClass::Tile);
        assert_eq!(classifier.classify("https://maps.test/search?q=x"), RequestClass::Api);
    }

    #[test]
    fn test_host_match_is_case_insensitive() {
        let classifier = Classifier::default();
        assert_eq!(
            classifier.classify("https://NOMINATIM.openstreetmap.org/search"),
            RequestClass::Api
        );
    }

    #[test]
    fn test_unparseable_url_falls_back_to_substring() {
        let classifier = Classifier::default();
        assert_eq!(
            classifier.classify("server.arcgisonline.com/x/tile/1/1/1"),
            RequestClass::Tile
        );
        assert_eq!(classifier.classify("not a url"), RequestClass::Static);
    }
}

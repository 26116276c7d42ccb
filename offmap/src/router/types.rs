//! Router request and outcome types.

use crate::provider::HttpResponse;
use crate::store::CacheEntry;
use reqwest::Method;

/// An intercepted outbound request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceRequest {
    pub method: Method,
    pub url: String,
}

impl ResourceRequest {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
        }
    }

    pub fn get(url: impl Into<String>) -> Self {
        Self::new(Method::GET, url)
    }
}

/// How the router answered a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteOutcome {
    /// Served from the store without touching the network
    FromCache(CacheEntry),
    /// Served from the network (a copy may have been stored)
    FromNetwork(HttpResponse),
    /// Network failed; served the last stored copy
    StaleFallback(CacheEntry),
    /// Tile neither cached nor reachable
    TileUnavailable,
    /// Static asset neither cached nor reachable
    AssetUnavailable,
    /// API response neither reachable nor cached; carries a JSON error body
    DataUnavailable(Vec<u8>),
}

impl RouteOutcome {
    /// HTTP-equivalent status for the outcome.
    pub fn status(&self) -> u16 {
        match self {
            RouteOutcome::FromCache(entry) | RouteOutcome::StaleFallback(entry) => entry.status,
            RouteOutcome::FromNetwork(response) => response.status,
            RouteOutcome::TileUnavailable | RouteOutcome::AssetUnavailable => 404,
            RouteOutcome::DataUnavailable(_) => 503,
        }
    }

    pub fn body(&self) -> &[u8] {
        match self {
            RouteOutcome::FromCache(entry) | RouteOutcome::StaleFallback(entry) => &entry.body,
            RouteOutcome::FromNetwork(response) => &response.body,
            RouteOutcome::TileUnavailable | RouteOutcome::AssetUnavailable => &[],
            RouteOutcome::DataUnavailable(payload) => payload,
        }
    }

    pub fn content_type(&self) -> Option<&str> {
        match self {
            RouteOutcome::FromCache(entry) | RouteOutcome::StaleFallback(entry) => {
                entry.content_type.as_deref()
            }
            RouteOutcome::FromNetwork(response) => response.content_type.as_deref(),
            RouteOutcome::DataUnavailable(_) => Some("application/json"),
            RouteOutcome::TileUnavailable | RouteOutcome::AssetUnavailable => None,
        }
    }

    /// Whether the outcome carries content.
    pub fn is_success(&self) -> bool {
        matches!(
            self,
            RouteOutcome::FromCache(_) | RouteOutcome::FromNetwork(_) | RouteOutcome::StaleFallback(_)
        )
    }

    /// Short label for logs and CLI output.
    pub fn source(&self) -> &'static str {
        match self {
            RouteOutcome::FromCache(_) => "cache",
            RouteOutcome::FromNetwork(_) => "network",
            RouteOutcome::StaleFallback(_) => "stale cache",
            RouteOutcome::TileUnavailable => "tile unavailable",
            RouteOutcome::AssetUnavailable => "asset unavailable",
            RouteOutcome::DataUnavailable(_) => "data unavailable",
        }
    }
}

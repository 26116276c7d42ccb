//! Cache-first and network-first request handling.

use super::classifier::{Classifier, RequestClass};
use super::types::{ResourceRequest, RouteOutcome};
use crate::provider::{AsyncHttpClient, Connectivity, FetchError, HttpResponse};
use crate::store::{CacheEntry, CacheStorage, Store, StoreNames, StoreRole};
use reqwest::Method;
use std::sync::Arc;
use tracing::{debug, trace, warn};

/// Answers intercepted requests from the stores, the network, or both.
pub struct CacheRouter<C: AsyncHttpClient> {
    client: Arc<C>,
    storage: Arc<dyn CacheStorage>,
    names: StoreNames,
    classifier: Classifier,
    connectivity: Connectivity,
}

impl<C: AsyncHttpClient> CacheRouter<C> {
    pub fn new(
        client: Arc<C>,
        storage: Arc<dyn CacheStorage>,
        names: StoreNames,
        classifier: Classifier,
        connectivity: Connectivity,
    ) -> Self {
        Self {
            client,
            storage,
            names,
            classifier,
            connectivity,
        }
    }

    pub fn classifier(&self) -> &Classifier {
        &self.classifier
    }

    pub fn connectivity(&self) -> &Connectivity {
        &self.connectivity
    }

    /// Route one request.
    ///
    /// Never fails: store errors count as misses and network errors fall
    /// through to the class's unavailable outcome.
    pub async fn handle(&self, request: &ResourceRequest) -> RouteOutcome {
        let class = self.classifier.classify(&request.url);
        trace!(url = %request.url, class = %class, "Routing request");

        match class {
            RequestClass::Tile => {
                self.cache_first(request, StoreRole::Tiles, RouteOutcome::TileUnavailable)
                    .await
            }
            RequestClass::Static => {
                self.cache_first(request, StoreRole::Static, RouteOutcome::AssetUnavailable)
                    .await
            }
            RequestClass::Api => self.network_first(request).await,
        }
    }

    async fn cache_first(
        &self,
        request: &ResourceRequest,
        role: StoreRole,
        unavailable: RouteOutcome,
    ) -> RouteOutcome {
        let store = self.open(role);

        if let Some(entry) = store.as_deref().and_then(|s| self.lookup(s, request)) {
            debug!(url = %request.url, role = %role, "Cache hit");
            return RouteOutcome::FromCache(entry);
        }

        match self.fetch(request).await {
            Ok(response) => {
                if let Some(store) = store.as_deref() {
                    self.store_copy(store, request, &response);
                }
                RouteOutcome::FromNetwork(response)
            }
            Err(e) => {
                debug!(url = %request.url, role = %role, error = %e, "Cache miss and fetch failed");
                unavailable
            }
        }
    }

    async fn network_first(&self, request: &ResourceRequest) -> RouteOutcome {
        let store = self.open(StoreRole::Dynamic);

        match self.fetch(request).await {
            Ok(response) => {
                if let Some(store) = store.as_deref() {
                    self.store_copy(store, request, &response);
                }
                return RouteOutcome::FromNetwork(response);
            }
            Err(e) => {
                debug!(url = %request.url, error = %e, "API fetch failed, trying stored copy");
            }
        }

        match store.as_deref().and_then(|s| self.lookup(s, request)) {
            Some(entry) => RouteOutcome::StaleFallback(entry),
            None => RouteOutcome::DataUnavailable(unavailable_payload(&request.url)),
        }
    }

    async fn fetch(&self, request: &ResourceRequest) -> Result<HttpResponse, FetchError> {
        if !self.connectivity.is_online() {
            return Err(FetchError::NetworkUnavailable("offline".to_string()));
        }
        self.client.fetch(request.method.clone(), &request.url).await
    }

    fn open(&self, role: StoreRole) -> Option<Arc<dyn Store>> {
        let name = self.names.name(role);
        match self.storage.open(&name) {
            Ok(store) => Some(store),
            Err(e) => {
                warn!(store = %name, error = %e, "Failed to open store, bypassing cache");
                None
            }
        }
    }

    /// Stored copies are GET responses, so only a GET can be answered by one.
    fn lookup(&self, store: &dyn Store, request: &ResourceRequest) -> Option<CacheEntry> {
        if request.method != Method::GET {
            return None;
        }
        match store.get(&request.url) {
            Ok(entry) => entry,
            Err(e) => {
                warn!(store = store.name(), url = %request.url, error = %e, "Store read failed, treating as miss");
                None
            }
        }
    }

    fn store_copy(&self, store: &dyn Store, request: &ResourceRequest, response: &HttpResponse) {
        // Only complete GET responses are worth replaying.
        if request.method != Method::GET {
            return;
        }
        let entry = CacheEntry::new(response.body.clone(), response.content_type.clone())
            .with_status(response.status);
        if let Err(e) = store.put(&request.url, entry) {
            warn!(store = store.name(), url = %request.url, error = %e, "Failed to store response copy");
        }
    }
}

fn unavailable_payload(url: &str) -> Vec<u8> {
    serde_json::json!({
        "error": "offline",
        "message": "Data unavailable offline",
        "url": url,
    })
    .to_string()
    .into_bytes()
}

//! HTTP client abstraction for testability

use super::types::{FetchError, HttpResponse};
use reqwest::Method;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, trace, warn};

/// Trait for asynchronous HTTP client operations.
///
/// Allows dependency injection of mock clients in tests.
pub trait AsyncHttpClient: Send + Sync {
    /// Performs an HTTP request and returns the full response.
    ///
    /// Non-success statuses are returned as [`FetchError::HttpStatus`].
    fn fetch(
        &self,
        method: Method,
        url: &str,
    ) -> impl Future<Output = Result<HttpResponse, FetchError>> + Send;

    /// Performs an HTTP GET request.
    fn get(&self, url: &str) -> impl Future<Output = Result<HttpResponse, FetchError>> + Send {
        self.fetch(Method::GET, url)
    }
}

/// Default User-Agent string for HTTP requests.
/// Some tile servers reject requests without one.
const DEFAULT_USER_AGENT: &str = concat!("offmap/", env!("CARGO_PKG_VERSION"));

/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Real HTTP client implementation using reqwest.
#[derive(Clone)]
pub struct ReqwestClient {
    client: reqwest::Client,
}

impl ReqwestClient {
    /// Creates a new ReqwestClient with the default timeout.
    pub fn new() -> Result<Self, FetchError> {
        Self::with_timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    /// Creates a new ReqwestClient with a custom timeout.
    ///
    /// Connections are pooled and kept alive so batch downloads reuse them.
    pub fn with_timeout(timeout: Duration) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(DEFAULT_USER_AGENT)
            .pool_max_idle_per_host(16)
            .pool_idle_timeout(Duration::from_secs(90))
            .tcp_keepalive(Duration::from_secs(30))
            .tcp_nodelay(true)
            .build()
            .map_err(|e| FetchError::ClientBuild(e.to_string()))?;

        Ok(Self { client })
    }
}

impl AsyncHttpClient for ReqwestClient {
    async fn fetch(&self, method: Method, url: &str) -> Result<HttpResponse, FetchError> {
        trace!(url = url, method = %method, "HTTP request starting");

        let response = match self.client.request(method, url).send().await {
            Ok(resp) => {
                debug!(
                    url = url,
                    status = resp.status().as_u16(),
                    "HTTP response received"
                );
                resp
            }
            Err(e) => {
                debug!(
                    url = url,
                    error = %e,
                    is_connect = e.is_connect(),
                    is_timeout = e.is_timeout(),
                    "HTTP request failed"
                );
                if e.is_connect() || e.is_timeout() || e.is_request() {
                    return Err(FetchError::NetworkUnavailable(e.to_string()));
                }
                return Err(FetchError::InvalidResponse(e.to_string()));
            }
        };

        let status = response.status();
        if !status.is_success() {
            debug!(url = url, status = status.as_u16(), "HTTP error status");
            return Err(FetchError::HttpStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        match response.bytes().await {
            Ok(bytes) => {
                trace!(url = url, bytes = bytes.len(), "HTTP response body read");
                Ok(HttpResponse {
                    status: status.as_u16(),
                    content_type,
                    body: bytes.to_vec(),
                })
            }
            Err(e) => {
                warn!(url = url, error = %e, "Failed to read response body");
                Err(FetchError::InvalidResponse(e.to_string()))
            }
        }
    }
}

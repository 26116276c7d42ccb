//! Core types for outbound HTTP.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use thiserror::Error;

/// A successful HTTP response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
}

impl HttpResponse {
    /// A 200 response with the given body.
    pub fn ok(body: Vec<u8>, content_type: Option<&str>) -> Self {
        Self {
            status: 200,
            content_type: content_type.map(str::to_string),
            body,
        }
    }
}

/// Errors from a single HTTP fetch.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FetchError {
    /// The host could not be reached (offline, DNS, connect or timeout)
    #[error("Network unavailable: {0}")]
    NetworkUnavailable(String),

    /// The server answered with a non-success status
    #[error("HTTP {status} from {url}")]
    HttpStatus { status: u16, url: String },

    /// The response could not be read
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// The HTTP client could not be constructed
    #[error("Failed to create HTTP client: {0}")]
    ClientBuild(String),
}

impl FetchError {
    /// Whether this failure means the network itself is unreachable.
    pub fn is_network(&self) -> bool {
        matches!(self, FetchError::NetworkUnavailable(_))
    }
}

/// Shared online/offline flag.
///
/// The shell flips this on connectivity events; clones observe the same flag.
#[derive(Debug, Clone)]
pub struct Connectivity {
    online: Arc<AtomicBool>,
}

impl Connectivity {
    pub fn new(online: bool) -> Self {
        Self {
            online: Arc::new(AtomicBool::new(online)),
        }
    }

    pub fn is_online(&self) -> bool {
        self.online.load(Ordering::Relaxed)
    }

    pub fn set_online(&self, online: bool) {
        self.online.store(online, Ordering::Relaxed);
    }
}

impl Default for Connectivity {
    fn default() -> Self {
        Self::new(true)
    }
}

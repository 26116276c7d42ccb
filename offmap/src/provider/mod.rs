//! Outbound HTTP: the client trait, its reqwest implementation, and the
//! shared connectivity flag.

mod http;
mod types;

pub use http::{AsyncHttpClient, ReqwestClient, DEFAULT_TIMEOUT_SECS};
pub use reqwest::Method;
pub use types::{Connectivity, FetchError, HttpResponse};

#[cfg(test)]
pub use http::tests::MockAsyncHttpClient;

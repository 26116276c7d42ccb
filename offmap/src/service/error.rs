//! Service error types.

use crate::coord::CoordError;
use crate::fetcher::DownloadError;
use crate::lifecycle::LifecycleError;
use crate::provider::FetchError;
use crate::store::StoreError;
use thiserror::Error;

/// Errors that can occur during service operations.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Invalid coordinates, zoom levels or bounding box
    #[error(transparent)]
    Coord(#[from] CoordError),

    /// A download job could not run
    #[error(transparent)]
    Download(#[from] DownloadError),

    /// Store failure outside the degrade-on-error paths
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),

    /// Failed to create the HTTP client
    #[error("HTTP client error: {0}")]
    HttpClient(#[from] FetchError),
}

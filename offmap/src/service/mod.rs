//! Offline map service.
//!
//! [`OfflineMapService`] wires the projector, stores, batch fetcher, router
//! and lifecycle manager together behind the commands the application
//! shell calls.

mod config;
mod error;
mod facade;
mod types;

pub use config::{ServiceConfig, ServiceConfigBuilder};
pub use error::ServiceError;
pub use facade::OfflineMapService;
pub use types::{CacheInfo, Viewport};

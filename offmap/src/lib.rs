//! offmap - offline map tile caching
//!
//! Maps geographic viewports to slippy-map tiles, downloads them in bounded
//! batches, and serves them from generation-tagged local stores whether or
//! not the network is reachable.
//!
//! # High-Level API
//!
//! For most use cases, the [`service`] module provides a simplified facade:
//!
//! ```ignore
//! use offmap::coord::BoundingBox;
//! use offmap::service::{OfflineMapService, ServiceConfig};
//!
//! let service = OfflineMapService::start(ServiceConfig::default())?;
//! service.lifecycle().startup().await?;
//!
//! let bbox = BoundingBox::new(41.85, 41.80, 12.70, 12.64)?;
//! let report = service.download_area(&bbox, 12, 15, |done, total| {
//!     println!("{done}/{total}");
//! }).await?;
//! ```

pub mod config;
pub mod coord;
pub mod fetcher;
pub mod lifecycle;
pub mod logging;
pub mod provider;
pub mod router;
pub mod service;
pub mod store;

/// Version of the offmap library and CLI.
///
/// The version is defined in `Cargo.toml` and injected at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

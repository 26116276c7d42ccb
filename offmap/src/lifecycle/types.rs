//! Lifecycle states, reference data and reports.

use crate::coord::{bounding_box_around, BoundingBox, CoordError};
use crate::fetcher::JobReport;
use crate::store::StoreError;
use std::fmt;
use thiserror::Error;

/// Default radius of a facility's pre-warm catchment.
pub const DEFAULT_PREWARM_RADIUS_KM: f64 = 2.0;

/// Default zoom levels pre-warmed per facility.
pub const DEFAULT_PREWARM_ZOOM_LEVELS: [u8; 3] = [14, 15, 16];

/// Default base URL of the application shell.
pub const DEFAULT_ASSET_BASE_URL: &str = "http://localhost:8080";

/// Default shell assets installed into the static store.
pub const DEFAULT_ASSET_PATHS: [&str; 5] = [
    "/",
    "/index.html",
    "/app.js",
    "/styles.css",
    "/manifest.json",
];

/// Phase of the cache lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LifecycleState {
    /// Populating the current generation's stores
    Installing,
    /// Installed, waiting to replace the previous generation
    Waiting,
    /// Current generation is serving
    Active,
    /// A recache command is running against the active generation
    Updating,
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LifecycleState::Installing => "installing",
            LifecycleState::Waiting => "waiting",
            LifecycleState::Active => "active",
            LifecycleState::Updating => "updating",
        };
        f.write_str(name)
    }
}

/// A facility whose surroundings are pre-warmed at install time.
#[derive(Debug, Clone, PartialEq)]
pub struct PointOfInterest {
    pub name: String,
    pub lat: f64,
    pub lon: f64,
    pub radius_km: f64,
    pub zoom_levels: Vec<u8>,
}

impl PointOfInterest {
    pub fn new(name: impl Into<String>, lat: f64, lon: f64) -> Self {
        Self {
            name: name.into(),
            lat,
            lon,
            radius_km: DEFAULT_PREWARM_RADIUS_KM,
            zoom_levels: DEFAULT_PREWARM_ZOOM_LEVELS.to_vec(),
        }
    }

    pub fn with_radius_km(mut self, radius_km: f64) -> Self {
        self.radius_km = radius_km;
        self
    }

    pub fn with_zoom_levels(mut self, zoom_levels: Vec<u8>) -> Self {
        self.zoom_levels = zoom_levels;
        self
    }

    /// Catchment area around the facility.
    pub fn bounding_box(&self) -> Result<BoundingBox, CoordError> {
        bounding_box_around(self.lat, self.lon, self.radius_km)
    }
}

/// Built-in facilities in the Castelli Romani area.
pub fn default_facilities() -> Vec<PointOfInterest> {
    vec![
        PointOfInterest::new("Frascati", 41.8273, 12.6734),
        PointOfInterest::new("Grottaferrata", 41.7876, 12.6717),
        PointOfInterest::new("Rocca di Papa", 41.7611, 12.7094),
    ]
}

/// Shell assets installed into the static store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetManifest {
    pub base_url: String,
    pub paths: Vec<String>,
}

impl AssetManifest {
    pub fn new(base_url: impl Into<String>, paths: Vec<String>) -> Self {
        Self {
            base_url: base_url.into(),
            paths,
        }
    }

    /// Absolute URL of every asset, in manifest order.
    pub fn urls(&self) -> Vec<String> {
        let base = self.base_url.trim_end_matches('/');
        self.paths
            .iter()
            .map(|path| {
                if path.starts_with('/') {
                    format!("{}{}", base, path)
                } else {
                    format!("{}/{}", base, path)
                }
            })
            .collect()
    }
}

impl Default for AssetManifest {
    fn default() -> Self {
        Self::new(
            DEFAULT_ASSET_BASE_URL,
            DEFAULT_ASSET_PATHS.iter().map(|p| p.to_string()).collect(),
        )
    }
}

/// Result of pre-warming one facility.
#[derive(Debug, Clone, PartialEq)]
pub enum FacilityResult {
    Completed(JobReport),
    Skipped(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct FacilityOutcome {
    pub name: String,
    pub result: FacilityResult,
}

/// Result of draining the pre-warm queue.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PrewarmReport {
    pub facilities: Vec<FacilityOutcome>,
}

impl PrewarmReport {
    pub fn tiles_persisted(&self) -> usize {
        self.completed().map(|r| r.persisted).sum()
    }

    pub fn tiles_failed(&self) -> usize {
        self.completed().map(|r| r.failed).sum()
    }

    pub fn skipped(&self) -> impl Iterator<Item = &FacilityOutcome> {
        self.facilities
            .iter()
            .filter(|f| matches!(f.result, FacilityResult::Skipped(_)))
    }

    fn completed(&self) -> impl Iterator<Item = &JobReport> {
        self.facilities.iter().filter_map(|f| match &f.result {
            FacilityResult::Completed(report) => Some(report),
            FacilityResult::Skipped(_) => None,
        })
    }
}

/// Result of [`LifecycleManager::install`](super::LifecycleManager::install).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InstallReport {
    pub assets_cached: usize,
    pub assets_failed: Vec<String>,
    pub prewarm: PrewarmReport,
}

/// What [`LifecycleManager::startup`](super::LifecycleManager::startup) did.
#[derive(Debug, Clone, PartialEq)]
pub enum StartupReport {
    /// The current generation was already installed
    WarmStart,
    /// Installed and activated the current generation
    Installed {
        install: InstallReport,
        purged: Vec<String>,
    },
    /// Found the current generation installed but never activated, and
    /// activated it
    Activated { purged: Vec<String> },
}

/// Commands accepted by the lifecycle manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleCommand {
    /// Delete every owned store of every role and generation
    ClearAll,
    /// Re-run the facility pre-warm without reinstalling assets
    RecachePointsOfInterest,
    /// Activate a waiting generation immediately
    SkipWaiting,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CommandOutcome {
    Cleared(Vec<String>),
    Recached(PrewarmReport),
    Activated(Vec<String>),
}

#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Cannot {action} while {state}")]
    InvalidState {
        action: &'static str,
        state: LifecycleState,
    },
}

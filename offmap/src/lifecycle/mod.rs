//! Cache lifecycle management.
//!
//! ```text
//! Installing ──install()──► Waiting ──activate()──► Active ◄──► Updating
//!                                                   (recache)
//! ```
//!
//! `install()` fills the static store from the asset manifest while the
//! pre-warm queue fetches tiles around each facility. `activate()` purges
//! every owned store from other generations. `startup()` picks between a
//! warm start and install + activate.

mod manager;
mod prewarm;
mod types;

pub use manager::{is_marker_key, LifecycleManager, ACTIVATED_MARKER_KEY, INSTALLED_MARKER_KEY};
pub use prewarm::{PrewarmQueue, PrewarmTask};
pub use types::{
    default_facilities, AssetManifest, CommandOutcome, FacilityOutcome, FacilityResult,
    InstallReport, LifecycleCommand, LifecycleError, LifecycleState, PointOfInterest,
    PrewarmReport, StartupReport, DEFAULT_ASSET_BASE_URL, DEFAULT_ASSET_PATHS,
    DEFAULT_PREWARM_RADIUS_KM, DEFAULT_PREWARM_ZOOM_LEVELS,
};

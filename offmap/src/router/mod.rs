//! Cache strategy router.
//!
//! Every intercepted request is classified once, first match wins:
//!
//! | Class  | Strategy                          | Store   | Miss without network |
//! |--------|-----------------------------------|---------|----------------------|
//! | Tile   | cache-first                       | tiles   | 404                  |
//! | API    | network-first, stored fallback    | dynamic | 503 + JSON payload   |
//! | Static | cache-first, GET-only copies      | static  | 404                  |

mod classifier;
mod strategy;
mod types;

pub use classifier::{
    Classifier, RequestClass, DEFAULT_API_HOST, DEFAULT_TILE_HOST, DEFAULT_TILE_PATH_MARKER,
};
pub use strategy::CacheRouter;
pub use types::{ResourceRequest, RouteOutcome};

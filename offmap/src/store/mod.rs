//! Generation-tagged response stores.
//!
//! Responses are kept in named stores, one per role (static assets, map
//! tiles, API responses) per generation. Store names follow
//! `<prefix>-<role>-<generation>`; activating a new generation purges every
//! owned store that is not part of it.
//!
//! # Backends
//!
//! - [`DiskStorage`] - durable, survives restarts
//! - [`MemoryStorage`] - process-local, used in tests
//! - [`NoOpStorage`] - used when persistent storage is unavailable

mod disk;
mod memory;
mod r#trait;
mod types;

pub use disk::{open_storage, DiskStorage, DiskStore};
pub use memory::{MemoryStorage, MemoryStore};
pub use r#trait::{CacheStorage, NoOpStorage, NoOpStore, Store};
pub use types::{
    CacheEntry, StoreError, StoreGeneration, StoreNames, StoreRole, DEFAULT_GENERATION,
    DEFAULT_STORE_PREFIX,
};

//! Store traits for dependency injection.

use crate::store::types::{CacheEntry, StoreError};
use std::sync::Arc;

/// A named key/blob store holding one role of one generation.
///
/// Keys are request URLs. Implementations must be safe to share across
/// tasks; concurrent writes to the same key resolve last-write-wins.
///
/// # Example
///
/// ```
/// use offmap::store::{CacheEntry, CacheStorage, MemoryStorage};
///
/// let storage = MemoryStorage::new();
/// let store = storage.open("offmap-tiles-v1").unwrap();
///
/// let url = "https://tiles.example.com/tile/3/2/1";
/// if store.get(url).unwrap().is_none() {
///     store.put(url, CacheEntry::new(vec![1, 2, 3], None)).unwrap();
/// }
/// assert_eq!(store.count().unwrap(), 1);
/// ```
pub trait Store: Send + Sync {
    /// Name of the store, e.g. `offmap-tiles-v1`.
    fn name(&self) -> &str;

    /// Get the entry for a key.
    ///
    /// A miss is `Ok(None)`; errors are reserved for backend failures.
    fn get(&self, key: &str) -> Result<Option<CacheEntry>, StoreError>;

    /// Store an entry, replacing any previous entry for the key.
    fn put(&self, key: &str, entry: CacheEntry) -> Result<(), StoreError>;

    /// All keys currently stored.
    fn keys(&self) -> Result<Vec<String>, StoreError>;

    /// Remove one entry. Returns whether it existed.
    fn delete(&self, key: &str) -> Result<bool, StoreError>;

    /// Check if a key exists in the store.
    fn contains(&self, key: &str) -> Result<bool, StoreError> {
        Ok(self.get(key)?.is_some())
    }

    /// Number of stored entries.
    fn count(&self) -> Result<usize, StoreError> {
        Ok(self.keys()?.len())
    }
}

/// Registry of named stores.
///
/// Backends: [`DiskStorage`](super::DiskStorage) for durable storage,
/// [`MemoryStorage`](super::MemoryStorage) for tests and ephemeral sessions,
/// and [`NoOpStorage`] when no persistent storage is available.
pub trait CacheStorage: Send + Sync {
    /// Open a handle to a store.
    ///
    /// Opening a store that already exists returns the existing store. A store
    /// that was never written reads as empty and only comes into existence
    /// with its first `put`.
    fn open(&self, name: &str) -> Result<Arc<dyn Store>, StoreError>;

    /// Names of every store holding written data.
    fn store_names(&self) -> Result<Vec<String>, StoreError>;

    /// Delete an entire store. Returns whether it existed.
    ///
    /// Handles opened before the delete stay empty and reject further writes.
    fn delete_store(&self, name: &str) -> Result<bool, StoreError>;

    /// Whether this backend persists anything at all.
    fn is_persistent(&self) -> bool {
        true
    }
}

/// Storage used when persistent storage is unavailable.
///
/// Every lookup misses and writes are dropped, so callers fall back to
/// network-only behaviour without special casing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpStorage;

impl NoOpStorage {
    pub fn new() -> Self {
        Self
    }
}

impl CacheStorage for NoOpStorage {
    fn open(&self, name: &str) -> Result<Arc<dyn Store>, StoreError> {
        Ok(Arc::new(NoOpStore {
            name: name.to_string(),
        }))
    }

    fn store_names(&self) -> Result<Vec<String>, StoreError> {
        Ok(Vec::new())
    }

    fn delete_store(&self, _name: &str) -> Result<bool, StoreError> {
        Ok(false)
    }

    fn is_persistent(&self) -> bool {
        false
    }
}

/// Store handed out by [`NoOpStorage`].
#[derive(Debug, Clone)]
pub struct NoOpStore {
    name: String,
}

impl Store for NoOpStore {
    fn name(&self) -> &str {
        &self.name
    }

    fn get(&self, _key: &str) -> Result<Option<CacheEntry>, StoreError> {
        Ok(None) // Always miss
    }

    fn put(&self, _key: &str, _entry: CacheEntry) -> Result<(), StoreError> {
        Ok(()) // Accept but don't store
    }

    fn keys(&self) -> Result<Vec<String>, StoreError> {
        Ok(Vec::new())
    }

    fn delete(&self, _key: &str) -> Result<bool, StoreError> {
        Ok(false)
    }
}

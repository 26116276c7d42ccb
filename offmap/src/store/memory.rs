//! In-memory store backend.

use crate::store::r#trait::{CacheStorage, Store};
use crate::store::types::{CacheEntry, StoreError};
use dashmap::DashMap;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Store registry kept entirely in process memory.
///
/// Nothing survives a restart. Used by tests and by sessions that opt out
/// of disk persistence. Like the disk backend, a store only counts as
/// existing once something has been written to it.
#[derive(Default)]
pub struct MemoryStorage {
    stores: DashMap<String, Arc<MemoryStore>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CacheStorage for MemoryStorage {
    fn open(&self, name: &str) -> Result<Arc<dyn Store>, StoreError> {
        let store = self
            .stores
            .entry(name.to_string())
            .or_insert_with(|| Arc::new(MemoryStore::new(name)))
            .clone();
        Ok(store)
    }

    fn store_names(&self) -> Result<Vec<String>, StoreError> {
        let mut names: Vec<String> = self
            .stores
            .iter()
            .filter(|e| e.value().is_written())
            .map(|e| e.key().clone())
            .collect();
        names.sort();
        Ok(names)
    }

    fn delete_store(&self, name: &str) -> Result<bool, StoreError> {
        match self.stores.remove(name) {
            Some((_, store)) => Ok(store.invalidate()),
            None => Ok(false),
        }
    }
}

/// A single in-memory store.
pub struct MemoryStore {
    name: String,
    entries: RwLock<HashMap<String, CacheEntry>>,
    written: AtomicBool,
    deleted: AtomicBool,
}

impl MemoryStore {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            entries: RwLock::new(HashMap::new()),
            written: AtomicBool::new(false),
            deleted: AtomicBool::new(false),
        }
    }

    fn is_written(&self) -> bool {
        self.written.load(Ordering::SeqCst)
    }

    /// Handles still held elsewhere must neither serve nor accept data once
    /// the store is gone. Returns whether the store had ever been written.
    fn invalidate(&self) -> bool {
        let mut entries = self.entries.write();
        self.deleted.store(true, Ordering::SeqCst);
        entries.clear();
        self.is_written()
    }
}

impl Store for MemoryStore {
    fn name(&self) -> &str {
        &self.name
    }

    fn get(&self, key: &str) -> Result<Option<CacheEntry>, StoreError> {
        Ok(self.entries.read().get(key).cloned())
    }

    fn put(&self, key: &str, entry: CacheEntry) -> Result<(), StoreError> {
        let mut entries = self.entries.write();
        if self.deleted.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable(format!(
                "store {} was deleted",
                self.name
            )));
        }
        entries.insert(key.to_string(), entry);
        self.written.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>, StoreError> {
        Ok(self.entries.read().keys().cloned().collect())
    }

    fn delete(&self, key: &str) -> Result<bool, StoreError> {
        Ok(self.entries.write().remove(key).is_some())
    }

    fn contains(&self, key: &str) -> Result<bool, StoreError> {
        Ok(self.entries.read().contains_key(key))
    }

    fn count(&self) -> Result<usize, StoreError> {
        Ok(self.entries.read().len())
    }
}

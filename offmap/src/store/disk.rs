//! Disk store backend with a scanned in-memory index.

use crate::store::r#trait::{CacheStorage, NoOpStorage, Store};
use crate::store::types::{CacheEntry, EntryMetadata, StoreError};
use dashmap::DashMap;
use parking_lot::Mutex;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, warn};

const BODY_EXTENSION: &str = "body";
const META_EXTENSION: &str = "json";

/// Open durable storage rooted at `root`, degrading to [`NoOpStorage`] if the
/// directory cannot be created.
///
/// A degraded cache behaves as network-only: every lookup misses.
pub fn open_storage(root: &Path) -> Arc<dyn CacheStorage> {
    match DiskStorage::new(root.to_path_buf()) {
        Ok(storage) => Arc::new(storage),
        Err(e) => {
            warn!(
                root = %root.display(),
                error = %e,
                "Persistent storage unavailable, continuing without a cache"
            );
            Arc::new(NoOpStorage::new())
        }
    }
}

/// Durable store registry.
///
/// Layout:
/// ```text
/// <root>/<store name>/<first two hex digits>/<sha256 of key>.body
/// <root>/<store name>/<first two hex digits>/<sha256 of key>.json
/// ```
///
/// The JSON sidecar holds the original key and the content headers.
pub struct DiskStorage {
    root: PathBuf,
    stores: DashMap<String, Arc<DiskStore>>,
}

impl DiskStorage {
    /// Create disk storage, creating the root directory if needed.
    pub fn new(root: PathBuf) -> Result<Self, StoreError> {
        fs::create_dir_all(&root)?;
        Ok(Self {
            root,
            stores: DashMap::new(),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn store_dir(&self, name: &str) -> Result<PathBuf, StoreError> {
        let valid = !name.is_empty()
            && name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
            && !name.starts_with('.');
        if !valid {
            return Err(StoreError::InvalidName(name.to_string()));
        }
        Ok(self.root.join(name))
    }
}

impl CacheStorage for DiskStorage {
    fn open(&self, name: &str) -> Result<Arc<dyn Store>, StoreError> {
        if let Some(store) = self.stores.get(name) {
            return Ok(store.clone());
        }

        let dir = self.store_dir(name)?;
        let store = match self.stores.entry(name.to_string()) {
            dashmap::mapref::entry::Entry::Occupied(entry) => entry.get().clone(),
            dashmap::mapref::entry::Entry::Vacant(entry) => {
                let store = Arc::new(DiskStore::open(name, dir)?);
                entry.insert(Arc::clone(&store));
                store
            }
        };
        Ok(store)
    }

    fn store_names(&self) -> Result<Vec<String>, StoreError> {
        let mut names = Vec::new();
        for entry in fs::read_dir(&self.root)? {
            let entry = entry?;
            if entry.file_type()?.is_dir() {
                if let Some(name) = entry.file_name().to_str() {
                    names.push(name.to_string());
                }
            }
        }
        names.sort();
        Ok(names)
    }

    fn delete_store(&self, name: &str) -> Result<bool, StoreError> {
        let dir = self.store_dir(name)?;

        if let Some((_, store)) = self.stores.remove(name) {
            store.invalidate();
        }

        if !dir.exists() {
            return Ok(false);
        }
        fs::remove_dir_all(&dir)?;
        debug!(store = name, "Deleted store");
        Ok(true)
    }
}

/// One store directory.
///
/// The directory is created by the first `put`, so opening a store that was
/// never written (or was deleted) leaves nothing behind on disk.
pub struct DiskStore {
    name: String,
    dir: PathBuf,
    /// key → file stem (hex digest)
    index: Mutex<HashMap<String, String>>,
    /// Serialises writers so a body and its sidecar are replaced together.
    write_lock: Mutex<()>,
    deleted: AtomicBool,
}

impl DiskStore {
    fn open(name: &str, dir: PathBuf) -> Result<Self, StoreError> {
        let store = Self {
            name: name.to_string(),
            dir,
            index: Mutex::new(HashMap::new()),
            write_lock: Mutex::new(()),
            deleted: AtomicBool::new(false),
        };
        store.scan()?;
        Ok(store)
    }

    /// Rebuild the index from the sidecars on disk.
    fn scan(&self) -> Result<(), StoreError> {
        let mut index = self.index.lock();
        index.clear();
        if !self.dir.is_dir() {
            return Ok(());
        }

        for shard in fs::read_dir(&self.dir)? {
            let shard = shard?;
            if !shard.file_type()?.is_dir() {
                continue;
            }
            for file in fs::read_dir(shard.path())? {
                let path = file?.path();
                if path.extension().and_then(|e| e.to_str()) != Some(META_EXTENSION) {
                    continue;
                }
                match read_metadata(&path) {
                    Ok(meta) => {
                        let stem = digest(&meta.key);
                        if path.with_extension(BODY_EXTENSION).exists() {
                            index.insert(meta.key, stem);
                        }
                    }
                    Err(e) => {
                        warn!(path = %path.display(), error = %e, "Skipping unreadable entry");
                    }
                }
            }
        }

        debug!(store = %self.name, entries = index.len(), "Indexed store");
        Ok(())
    }

    /// Waits for an in-flight `put` so it cannot recreate the directory
    /// after the caller removes it.
    fn invalidate(&self) {
        let _guard = self.write_lock.lock();
        self.deleted.store(true, Ordering::SeqCst);
        self.index.lock().clear();
    }

    fn paths(&self, stem: &str) -> (PathBuf, PathBuf) {
        let shard = self.dir.join(&stem[..2]);
        (
            shard.join(format!("{}.{}", stem, BODY_EXTENSION)),
            shard.join(format!("{}.{}", stem, META_EXTENSION)),
        )
    }

    fn ensure_live(&self) -> Result<(), StoreError> {
        if self.deleted.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable(format!(
                "store {} was deleted",
                self.name
            )));
        }
        Ok(())
    }
}

impl Store for DiskStore {
    fn name(&self) -> &str {
        &self.name
    }

    fn get(&self, key: &str) -> Result<Option<CacheEntry>, StoreError> {
        let stem = match self.index.lock().get(key).cloned() {
            Some(stem) => stem,
            None => return Ok(None),
        };

        let (body_path, meta_path) = self.paths(&stem);
        let read = read_metadata(&meta_path).and_then(|meta| {
            let body = fs::read(&body_path)?;
            if meta.key != key || meta.size != body.len() {
                return Err(StoreError::Corrupt(format!(
                    "entry for {} does not match its metadata",
                    key
                )));
            }
            Ok(meta.into_entry(body))
        });

        match read {
            Ok(entry) => Ok(Some(entry)),
            Err(StoreError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                // Removed behind our back: drop it from the index.
                self.index.lock().remove(key);
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    fn put(&self, key: &str, entry: CacheEntry) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock();
        self.ensure_live()?;

        let stem = digest(key);
        let (body_path, meta_path) = self.paths(&stem);
        if let Some(parent) = body_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let meta = serde_json::to_vec(&EntryMetadata::for_entry(key, &entry))?;
        write_atomic(&body_path, &entry.body)?;
        write_atomic(&meta_path, &meta)?;

        self.index.lock().insert(key.to_string(), stem);
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>, StoreError> {
        Ok(self.index.lock().keys().cloned().collect())
    }

    fn delete(&self, key: &str) -> Result<bool, StoreError> {
        let _guard = self.write_lock.lock();
        let stem = match self.index.lock().remove(key) {
            Some(stem) => stem,
            None => return Ok(false),
        };

        let (body_path, meta_path) = self.paths(&stem);
        for path in [meta_path, body_path] {
            match fs::remove_file(&path) {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => return Err(e.into()),
            }
        }
        Ok(true)
    }

    fn contains(&self, key: &str) -> Result<bool, StoreError> {
        Ok(self.index.lock().contains_key(key))
    }

    fn count(&self) -> Result<usize, StoreError> {
        Ok(self.index.lock().len())
    }
}

fn digest(key: &str) -> String {
    let hash = Sha256::digest(key.as_bytes());
    hash.iter().map(|b| format!("{:02x}", b)).collect()
}

fn read_metadata(path: &Path) -> Result<EntryMetadata, StoreError> {
    let bytes = fs::read(path)?;
    Ok(serde_json::from_slice(&bytes)?)
}

/// Write through a uniquely named temp file in the same shard, then rename
/// it over `path`. Concurrent writers, even from other processes, never share
/// a temp file.
fn write_atomic(path: &Path, data: &[u8]) -> Result<(), StoreError> {
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    tmp.write_all(data)?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

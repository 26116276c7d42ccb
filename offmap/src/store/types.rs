//! Core types for the tile store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Default prefix shared by every store this application owns.
pub const DEFAULT_STORE_PREFIX: &str = "offmap";

/// Default generation tag.
pub const DEFAULT_GENERATION: &str = "v1";

/// A cached response body and its content headers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry {
    /// Response body, opaque to the store
    pub body: Vec<u8>,
    /// `Content-Type` of the original response
    pub content_type: Option<String>,
    /// HTTP status of the original response
    pub status: u16,
    /// When the entry was written
    pub stored_at: DateTime<Utc>,
}

impl CacheEntry {
    /// Create an entry for a successful (200) response stored now.
    pub fn new(body: Vec<u8>, content_type: Option<String>) -> Self {
        Self {
            body,
            content_type,
            status: 200,
            stored_at: Utc::now(),
        }
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = status;
        self
    }

    pub fn len(&self) -> usize {
        self.body.len()
    }

    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }
}

/// Metadata persisted next to each body on disk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct EntryMetadata {
    pub key: String,
    pub content_type: Option<String>,
    pub status: u16,
    pub stored_at: DateTime<Utc>,
    pub size: usize,
}

impl EntryMetadata {
    pub(crate) fn for_entry(key: &str, entry: &CacheEntry) -> Self {
        Self {
            key: key.to_string(),
            content_type: entry.content_type.clone(),
            status: entry.status,
            stored_at: entry.stored_at,
            size: entry.body.len(),
        }
    }

    pub(crate) fn into_entry(self, body: Vec<u8>) -> CacheEntry {
        CacheEntry {
            body,
            content_type: self.content_type,
            status: self.status,
            stored_at: self.stored_at,
        }
    }
}

/// The three logical store roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreRole {
    /// Application shell assets
    Static,
    /// Map tiles
    Tiles,
    /// API (geocoding) responses
    Dynamic,
}

impl StoreRole {
    pub const ALL: [StoreRole; 3] = [StoreRole::Static, StoreRole::Tiles, StoreRole::Dynamic];

    pub fn as_str(&self) -> &'static str {
        match self {
            StoreRole::Static => "static",
            StoreRole::Tiles => "tiles",
            StoreRole::Dynamic => "dynamic",
        }
    }
}

impl fmt::Display for StoreRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StoreRole {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "static" => Ok(StoreRole::Static),
            "tiles" => Ok(StoreRole::Tiles),
            "dynamic" => Ok(StoreRole::Dynamic),
            other => Err(StoreError::InvalidName(other.to_string())),
        }
    }
}

/// A cache generation tag such as `v3`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StoreGeneration(String);

impl StoreGeneration {
    /// Create a generation tag.
    ///
    /// Tags are restricted to ASCII alphanumerics, `.` and `_` so that store
    /// names stay parseable and filesystem-safe.
    pub fn new(tag: impl Into<String>) -> Result<Self, StoreError> {
        let tag = tag.into();
        let valid = !tag.is_empty()
            && tag
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '_');
        if !valid {
            return Err(StoreError::InvalidName(tag));
        }
        Ok(Self(tag))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for StoreGeneration {
    fn default() -> Self {
        Self(DEFAULT_GENERATION.to_string())
    }
}

impl fmt::Display for StoreGeneration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Names of the current generation's stores.
///
/// Store names have the form `<prefix>-<role>-<generation>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreNames {
    prefix: String,
    generation: StoreGeneration,
}

impl StoreNames {
    pub fn new(prefix: impl Into<String>, generation: StoreGeneration) -> Self {
        Self {
            prefix: prefix.into(),
            generation,
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn generation(&self) -> &StoreGeneration {
        &self.generation
    }

    /// Store name for a role in the current generation.
    pub fn name(&self, role: StoreRole) -> String {
        format!("{}-{}-{}", self.prefix, role, self.generation)
    }

    /// All three current names.
    pub fn current(&self) -> [String; 3] {
        StoreRole::ALL.map(|role| self.name(role))
    }

    /// Whether a store name belongs to this application (any generation).
    pub fn is_owned(&self, name: &str) -> bool {
        self.parse(name).is_some()
    }

    /// Whether a store name belongs to this application but not to the
    /// current generation.
    pub fn is_stale(&self, name: &str) -> bool {
        self.is_owned(name) && !self.current().iter().any(|current| current == name)
    }

    /// Split an owned store name into its role and generation tag.
    pub fn parse(&self, name: &str) -> Option<(StoreRole, String)> {
        let rest = name.strip_prefix(&self.prefix)?.strip_prefix('-')?;
        let (role, generation) = rest.split_once('-')?;
        let role = role.parse().ok()?;
        if generation.is_empty() {
            return None;
        }
        Some((role, generation.to_string()))
    }
}

impl Default for StoreNames {
    fn default() -> Self {
        Self::new(DEFAULT_STORE_PREFIX, StoreGeneration::default())
    }
}

/// Store-related errors.
#[derive(Debug, Error)]
pub enum StoreError {
    /// I/O error during store operations
    #[error("Store I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Entry metadata could not be encoded or decoded
    #[error("Store metadata error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// An entry on disk is inconsistent
    #[error("Corrupt store entry: {0}")]
    Corrupt(String),

    /// Persistent storage is absent or disabled on this host
    #[error("Persistent storage unavailable: {0}")]
    Unavailable(String),

    /// Store name or generation tag is malformed
    #[error("Invalid store name: {0}")]
    InvalidName(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(generation: &str) -> StoreNames {
        StoreNames::new("offmap", StoreGeneration::new(generation).unwrap())
    }

    #[test]
    fn test_store_names_format() {
        let names = names("v3");
        assert_eq!(names.name(StoreRole::Static), "offmap-static-v3");
        assert_eq!(names.name(StoreRole::Tiles), "offmap-tiles-v3");
        assert_eq!(names.name(StoreRole::Dynamic), "offmap-dynamic-v3");
    }

    #[test]
    fn test_stale_detection() {
        let names = names("v3");
        assert!(names.is_stale("offmap-tiles-v2"));
        assert!(names.is_stale("offmap-static-v1"));
        assert!(!names.is_stale("offmap-tiles-v3"));
        assert!(!names.is_stale("other-app-tiles-v1"));
        assert!(!names.is_stale("offmap-unknown-v1"));
    }

    #[test]
    fn test_parse_store_name() {
        let names = names("v3");
        assert_eq!(
            names.parse("offmap-dynamic-v2"),
            Some((StoreRole::Dynamic, "v2".to_string()))
        );
        assert_eq!(names.parse("offmap-tiles-"), None);
        assert_eq!(names.parse("offmaptiles-v2"), None);
    }

    #[test]
    fn test_generation_validation() {
        assert!(StoreGeneration::new("v1.2_beta").is_ok());
        assert!(StoreGeneration::new("").is_err());
        assert!(StoreGeneration::new("v1/../x").is_err());
        assert!(StoreGeneration::new("v-1").is_err());
    }

    #[test]
    fn test_cache_entry_defaults() {
        let entry = CacheEntry::new(vec![1, 2, 3], Some("image/jpeg".to_string()));
        assert_eq!(entry.status, 200);
        assert_eq!(entry.len(), 3);
        assert!(!entry.is_empty());
        assert_eq!(entry.with_status(203).status, 203);
    }

    #[test]
    fn test_metadata_round_trip_preserves_fields() {
        let entry = CacheEntry::new(vec![9; 4], Some("application/json".to_string()));
        let meta = EntryMetadata::for_entry("https://api/x", &entry);
        assert_eq!(meta.size, 4);
        let json = serde_json::to_string(&meta).unwrap();
        let back: EntryMetadata = serde_json::from_str(&json).unwrap();
        assert_eq!(back.key, "https://api/x");
        assert_eq!(back.into_entry(vec![9; 4]), entry);
    }
}

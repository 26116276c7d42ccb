//! Service-level value types.

use crate::coord::BoundingBox;
use std::fmt;

/// The part of the map currently on screen.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub bbox: BoundingBox,
    pub zoom: u8,
}

impl Viewport {
    pub fn new(bbox: BoundingBox, zoom: u8) -> Self {
        Self { bbox, zoom }
    }
}

/// Entry counts of the current generation's stores.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheInfo {
    pub generation: String,
    pub tiles: usize,
    pub static_assets: usize,
    pub dynamic: usize,
    /// False when running without persistent storage
    pub persistent: bool,
}

impl fmt::Display for CacheInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "generation {}: {} tiles, {} static assets, {} API responses",
            self.generation, self.tiles, self.static_assets, self.dynamic
        )?;
        if !self.persistent {
            write!(f, " (not persistent)")?;
        }
        Ok(())
    }
}

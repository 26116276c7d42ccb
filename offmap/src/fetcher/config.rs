//! Batch fetcher configuration.

use std::time::Duration;

/// Default number of concurrent fetches per batch.
pub const DEFAULT_CONCURRENCY: usize = 6;

/// Upper bound on concurrent fetches per batch.
pub const MAX_CONCURRENCY: usize = 64;

/// Default pause between batches in milliseconds.
pub const DEFAULT_BATCH_DELAY_MS: u64 = 100;

/// Default cap on the tiles a single area download may request.
pub const DEFAULT_MAX_TILES: u64 = 100_000;

/// Configuration for [`BatchFetcher`](super::BatchFetcher).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchConfig {
    /// Fetches per batch, always within `1..=MAX_CONCURRENCY`
    pub concurrency: usize,
    /// Pause between consecutive batches (not after the last)
    pub batch_delay: Duration,
    /// Largest area download accepted, in tiles
    pub max_tiles: u64,
}

impl FetchConfig {
    /// Create a config, clamping concurrency into `1..=MAX_CONCURRENCY`.
    pub fn new(concurrency: usize, batch_delay: Duration) -> Self {
        Self {
            concurrency: concurrency.clamp(1, MAX_CONCURRENCY),
            batch_delay,
            max_tiles: DEFAULT_MAX_TILES,
        }
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.clamp(1, MAX_CONCURRENCY);
        self
    }

    pub fn with_batch_delay(mut self, batch_delay: Duration) -> Self {
        self.batch_delay = batch_delay;
        self
    }

    pub fn with_max_tiles(mut self, max_tiles: u64) -> Self {
        self.max_tiles = max_tiles;
        self
    }

    /// Number of batches needed for `total` requests.
    pub fn batch_count(&self, total: usize) -> usize {
        total.div_ceil(self.concurrency)
    }
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_CONCURRENCY,
            batch_delay: Duration::from_millis(DEFAULT_BATCH_DELAY_MS),
            max_tiles: DEFAULT_MAX_TILES,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = FetchConfig::default();
        assert_eq!(config.concurrency, 6);
        assert_eq!(config.batch_delay, Duration::from_millis(100));
        assert_eq!(config.max_tiles, DEFAULT_MAX_TILES);
    }

    #[test]
    fn test_builders_keep_other_fields() {
        let config = FetchConfig::default()
            .with_max_tiles(50)
            .with_concurrency(2)
            .with_batch_delay(Duration::ZERO);
        assert_eq!(config.max_tiles, 50);
        assert_eq!(config.concurrency, 2);
    }

    #[test]
    fn test_concurrency_is_clamped() {
        assert_eq!(FetchConfig::new(0, Duration::ZERO).concurrency, 1);
        assert_eq!(FetchConfig::new(500, Duration::ZERO).concurrency, MAX_CONCURRENCY);
        assert_eq!(FetchConfig::default().with_concurrency(3).concurrency, 3);
    }

    #[test]
    fn test_batch_count() {
        let config = FetchConfig::default();
        assert_eq!(config.batch_count(0), 0);
        assert_eq!(config.batch_count(6), 1);
        assert_eq!(config.batch_count(13), 3);
    }
}

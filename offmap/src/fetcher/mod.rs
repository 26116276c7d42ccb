//! Batch fetcher for populating the tile store.
//!
//! # Architecture
//!
//! ```text
//! BatchFetcher::start_job(total) ──► JobHandle (owns the single job slot)
//!     │
//!     └─► run(job, requests, store, on_progress)
//!           ├─ batch 1: `concurrency` fetches polled concurrently
//!           ├─ sleep(batch_delay) / cancellation check
//!           └─ batch 2 ...
//! ```
//!
//! Failures are counted in the [`JobReport`], never retried or propagated.

mod batch;
mod config;
mod job;

pub use batch::BatchFetcher;
pub use config::{
    FetchConfig, DEFAULT_BATCH_DELAY_MS, DEFAULT_CONCURRENCY, DEFAULT_MAX_TILES, MAX_CONCURRENCY,
};
pub use job::{DownloadError, JobHandle, JobProgress, JobReport};

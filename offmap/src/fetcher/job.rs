//! Download job ownership and progress tracking.
//!
//! A [`JobHandle`] is the only way to run a batch job. Holding one means the
//! fetcher's single job slot is taken; dropping it frees the slot again, so a
//! panicking or cancelled job can never leave the fetcher stuck "busy".

use crate::coord::CoordError;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Errors that prevent a download job from running.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DownloadError {
    /// Another job holds the fetcher's slot
    #[error("A download is already in progress")]
    AlreadyInProgress,

    /// The requested area could not be turned into tiles
    #[error("Invalid download area: {0}")]
    InvalidArea(#[from] CoordError),

    /// The requested area covers more tiles than the configured limit
    #[error("Area covers {requested} tiles, more than the limit of {limit}")]
    TooManyTiles { requested: u64, limit: u64 },
}

/// The fetcher's single job slot.
#[derive(Debug, Default)]
pub(crate) struct JobSlot {
    busy: AtomicBool,
    active: Mutex<Option<CancellationToken>>,
}

impl JobSlot {
    /// Claim the slot for a job of `total` requests.
    pub(crate) fn acquire(self: &Arc<Self>, total: usize) -> Result<JobHandle, DownloadError> {
        if self
            .busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            debug!(total, "Rejected download, slot busy");
            return Err(DownloadError::AlreadyInProgress);
        }

        let cancellation = CancellationToken::new();
        *self.active.lock() = Some(cancellation.clone());

        Ok(JobHandle {
            total: AtomicUsize::new(total),
            counters: JobCounters::default(),
            cancellation,
            slot: Arc::clone(self),
        })
    }

    pub(crate) fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    /// Cancel the job currently holding the slot, if any.
    pub(crate) fn cancel_active(&self) -> bool {
        match self.active.lock().as_ref() {
            Some(token) => {
                token.cancel();
                true
            }
            None => false,
        }
    }

    fn release(&self) {
        *self.active.lock() = None;
        self.busy.store(false, Ordering::Release);
    }
}

#[derive(Debug, Default)]
struct JobCounters {
    completed: AtomicUsize,
    persisted: AtomicUsize,
    failed: AtomicUsize,
}

/// Ownership token for a running download job.
#[derive(Debug)]
pub struct JobHandle {
    total: AtomicUsize,
    counters: JobCounters,
    cancellation: CancellationToken,
    slot: Arc<JobSlot>,
}

impl JobHandle {
    pub fn total(&self) -> usize {
        self.total.load(Ordering::Relaxed)
    }

    pub(crate) fn set_total(&self, total: usize) {
        self.total.store(total, Ordering::Relaxed);
    }

    /// Request cancellation. The job stops before its next batch.
    pub fn cancel(&self) {
        info!("Download cancellation requested");
        self.cancellation.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancellation.is_cancelled()
    }

    /// Token that cancels this job, for use from another task.
    pub fn cancellation(&self) -> CancellationToken {
        self.cancellation.clone()
    }

    /// Snapshot of the job's counters.
    pub fn progress(&self) -> JobProgress {
        JobProgress {
            total: self.total(),
            completed: self.counters.completed.load(Ordering::Relaxed),
            persisted: self.counters.persisted.load(Ordering::Relaxed),
            failed: self.counters.failed.load(Ordering::Relaxed),
        }
    }

    /// Record one attempt; returns the new completed count.
    pub(crate) fn record_attempt(&self, persisted: bool) -> usize {
        if persisted {
            self.counters.persisted.fetch_add(1, Ordering::Relaxed);
        } else {
            self.counters.failed.fetch_add(1, Ordering::Relaxed);
        }
        self.counters.completed.fetch_add(1, Ordering::Relaxed) + 1
    }

    pub(crate) fn report(&self, cancelled: bool) -> JobReport {
        let progress = self.progress();
        JobReport {
            total: progress.total,
            attempted: progress.completed,
            persisted: progress.persisted,
            failed: progress.failed,
            cancelled,
        }
    }
}

impl Drop for JobHandle {
    fn drop(&mut self) {
        self.slot.release();
    }
}

/// Point-in-time view of a job's counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct JobProgress {
    pub total: usize,
    pub completed: usize,
    pub persisted: usize,
    pub failed: usize,
}

impl JobProgress {
    pub fn is_complete(&self) -> bool {
        self.completed >= self.total
    }
}

/// Final result of a download job.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct JobReport {
    /// Requests in the job
    pub total: usize,
    /// Requests attempted before the job finished or was cancelled
    pub attempted: usize,
    /// Responses written to the store
    pub persisted: usize,
    /// Failed fetches and failed store writes
    pub failed: usize,
    /// Whether the job stopped early on cancellation
    pub cancelled: bool,
}

impl JobReport {
    /// Every request was fetched and stored.
    pub fn is_complete(&self) -> bool {
        !self.cancelled && self.persisted == self.total
    }
}

//! Bounded-concurrency batch downloads into a store.

use super::config::FetchConfig;
use super::job::{DownloadError, JobHandle, JobReport, JobSlot};
use crate::coord::TileRequest;
use crate::provider::AsyncHttpClient;
use crate::store::{CacheEntry, Store};
use futures::stream::{FuturesUnordered, StreamExt};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Downloads request lists in sequential batches of concurrent fetches.
///
/// At most one job runs per fetcher; see [`BatchFetcher::start_job`].
pub struct BatchFetcher<C: AsyncHttpClient> {
    client: Arc<C>,
    config: FetchConfig,
    slot: Arc<JobSlot>,
}

impl<C: AsyncHttpClient> BatchFetcher<C> {
    pub fn new(client: Arc<C>, config: FetchConfig) -> Self {
        Self {
            client,
            config,
            slot: Arc::new(JobSlot::default()),
        }
    }

    pub fn config(&self) -> &FetchConfig {
        &self.config
    }

    pub fn client(&self) -> &Arc<C> {
        &self.client
    }

    /// Whether a job currently holds the slot.
    pub fn is_busy(&self) -> bool {
        self.slot.is_busy()
    }

    /// Cancel the running job, if any. Returns whether one was running.
    pub fn cancel_active(&self) -> bool {
        self.slot.cancel_active()
    }

    /// Claim the fetcher for a job of `total` requests.
    ///
    /// Fails with [`DownloadError::AlreadyInProgress`] while another handle
    /// is alive. The slot is released when the handle is dropped.
    pub fn start_job(&self, total: usize) -> Result<JobHandle, DownloadError> {
        self.slot.acquire(total)
    }

    /// Start a job and run it to completion.
    pub async fn fetch_all<F>(
        &self,
        requests: &[TileRequest],
        store: &dyn Store,
        on_progress: F,
    ) -> Result<JobReport, DownloadError>
    where
        F: FnMut(usize, usize) + Send,
    {
        let job = self.start_job(requests.len())?;
        Ok(self.run(&job, requests, store, on_progress).await)
    }

    /// Run a job.
    ///
    /// Requests are split into batches of `concurrency`. Batches run one
    /// after another with `batch_delay` between them; the fetches within a
    /// batch run concurrently. Failed fetches and failed writes are counted,
    /// never retried. `on_progress(completed, total)` is called after each
    /// attempt. Cancellation is honoured between batches.
    pub async fn run<F>(
        &self,
        job: &JobHandle,
        requests: &[TileRequest],
        store: &dyn Store,
        mut on_progress: F,
    ) -> JobReport
    where
        F: FnMut(usize, usize) + Send,
    {
        let total = requests.len();
        job.set_total(total);

        info!(
            total,
            concurrency = self.config.concurrency,
            batches = self.config.batch_count(total),
            store = store.name(),
            "Download job started"
        );

        let mut cancelled = false;
        for (index, batch) in requests.chunks(self.config.concurrency).enumerate() {
            if index > 0 && !self.pause(job).await {
                cancelled = true;
                break;
            }
            if job.is_cancelled() {
                cancelled = true;
                break;
            }

            let mut pending: FuturesUnordered<_> = batch
                .iter()
                .map(|request| async move {
                    let result = self.client.get(&request.url).await;
                    (request, result)
                })
                .collect();

            while let Some((request, result)) = pending.next().await {
                let persisted = match result {
                    Ok(response) => {
                        let entry = CacheEntry::new(response.body, response.content_type)
                            .with_status(response.status);
                        match store.put(&request.url, entry) {
                            Ok(()) => true,
                            Err(e) => {
                                warn!(url = %request.url, error = %e, "Failed to store tile");
                                false
                            }
                        }
                    }
                    Err(e) => {
                        debug!(url = %request.url, error = %e, "Tile fetch failed");
                        false
                    }
                };

                let completed = job.record_attempt(persisted);
                on_progress(completed, total);
            }
        }

        let report = job.report(cancelled);
        info!(
            total = report.total,
            attempted = report.attempted,
            persisted = report.persisted,
            failed = report.failed,
            cancelled = report.cancelled,
            "Download job finished"
        );
        report
    }

    /// Sleep for the batch delay. Returns false if cancelled meanwhile.
    async fn pause(&self, job: &JobHandle) -> bool {
        if self.config.batch_delay.is_zero() {
            return !job.is_cancelled();
        }
        let token = job.cancellation();
        tokio::select! {
            _ = token.cancelled() => false,
            _ = tokio::time::sleep(self.config.batch_delay) => true,
        }
    }
}

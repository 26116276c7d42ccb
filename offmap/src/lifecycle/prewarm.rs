//! Facility pre-warm queue.
//!
//! Facilities are drained one at a time so that only one batch job hits the
//! tile provider at once; batching within a facility follows the fetcher's
//! configuration.

use super::types::{FacilityOutcome, FacilityResult, PointOfInterest, PrewarmReport};
use crate::coord::{tiles_in_bounding_box, CoordError, TileRequest, TileUrlTemplate};
use crate::fetcher::BatchFetcher;
use crate::provider::AsyncHttpClient;
use crate::store::Store;
use std::collections::VecDeque;
use tracing::{info, warn};

/// One facility waiting to be pre-warmed.
#[derive(Debug, Clone, PartialEq)]
pub struct PrewarmTask {
    pub facility: PointOfInterest,
}

impl PrewarmTask {
    /// Tile requests covering the facility's catchment.
    pub fn requests(&self, template: &TileUrlTemplate) -> Result<Vec<TileRequest>, CoordError> {
        let bbox = self.facility.bounding_box()?;
        tiles_in_bounding_box(&bbox, &self.facility.zoom_levels, template)
    }
}

/// FIFO of pending pre-warm tasks.
#[derive(Debug, Clone, Default)]
pub struct PrewarmQueue {
    tasks: VecDeque<PrewarmTask>,
}

impl PrewarmQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_facilities(facilities: &[PointOfInterest]) -> Self {
        let mut queue = Self::new();
        for facility in facilities {
            queue.push(facility.clone());
        }
        queue
    }

    pub fn push(&mut self, facility: PointOfInterest) {
        self.tasks.push_back(PrewarmTask { facility });
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Run every task in order into `store`.
    ///
    /// A facility that cannot be expanded to tiles, or whose job cannot
    /// start, is recorded as skipped and the queue moves on.
    pub async fn drain<C: AsyncHttpClient>(
        &mut self,
        fetcher: &BatchFetcher<C>,
        template: &TileUrlTemplate,
        store: &dyn Store,
    ) -> PrewarmReport {
        let mut report = PrewarmReport::default();

        while let Some(task) = self.tasks.pop_front() {
            let name = task.facility.name.clone();

            let result = match task.requests(template) {
                Ok(requests) => {
                    info!(facility = %name, tiles = requests.len(), "Pre-warming facility");
                    match fetcher.fetch_all(&requests, store, |_, _| {}).await {
                        Ok(job) => FacilityResult::Completed(job),
                        Err(e) => {
                            warn!(facility = %name, error = %e, "Pre-warm skipped");
                            FacilityResult::Skipped(e.to_string())
                        }
                    }
                }
                Err(e) => {
                    warn!(facility = %name, error = %e, "Pre-warm skipped, invalid area");
                    FacilityResult::Skipped(e.to_string())
                }
            };

            report.facilities.push(FacilityOutcome { name, result });
        }

        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetcher::FetchConfig;
    use crate::provider::MockAsyncHttpClient;
    use crate::store::{CacheStorage, MemoryStorage};
    use std::sync::Arc;
    use std::time::Duration;

    fn template() -> TileUrlTemplate {
        TileUrlTemplate::parse("https://tiles.test/tile/{z}/{y}/{x}").unwrap()
    }

    #[test]
    fn test_task_requests() {
        let task = PrewarmTask {
            facility: PointOfInterest::new("Frascati", 41.8273, 12.6734).with_zoom_levels(vec![14]),
        };
        assert_eq!(task.requests(&template()).unwrap().len(), 9);
    }

    #[tokio::test]
    async fn test_drain_runs_every_facility_in_order() {
        let storage = MemoryStorage::new();
        let store = storage.open("offmap-tiles-v1").unwrap();
        let fetcher = BatchFetcher::new(
            Arc::new(MockAsyncHttpClient::always(&[1])),
            FetchConfig::new(8, Duration::ZERO),
        );

        let mut queue = PrewarmQueue::from_facilities(&[
            PointOfInterest::new("a", 41.8273, 12.6734).with_zoom_levels(vec![14]),
            PointOfInterest::new("pole", 90.0, 0.0),
            PointOfInterest::new("b", 41.8273, 12.6734).with_zoom_levels(vec![10]),
        ]);
        assert_eq!(queue.len(), 3);

        let report = queue.drain(&fetcher, &template(), store.as_ref()).await;

        assert!(queue.is_empty());
        let names: Vec<&str> = report.facilities.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["a", "pole", "b"]);
        assert_eq!(report.skipped().count(), 1);
        assert_eq!(report.tiles_persisted(), 9 + 2);
    }

    #[tokio::test]
    async fn test_busy_fetcher_skips_facility() {
        let storage = MemoryStorage::new();
        let store = storage.open("offmap-tiles-v1").unwrap();
        let fetcher = BatchFetcher::new(
            Arc::new(MockAsyncHttpClient::always(&[1])),
            FetchConfig::default(),
        );
        let _held = fetcher.start_job(1).unwrap();

        let mut queue =
            PrewarmQueue::from_facilities(&[PointOfInterest::new("a", 41.8273, 12.6734)]);
        let report = queue.drain(&fetcher, &template(), store.as_ref()).await;

        assert!(matches!(
            report.facilities[0].result,
            FacilityResult::Skipped(_)
        ));
        assert_eq!(store.count().unwrap(), 0);
    }
}

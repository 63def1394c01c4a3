//! Sequential page walker for one region's contract listing.

use std::time::Instant;

use tracing::info;

use evescan_core::RegionId;
use evescan_esi::{ContractPage, FetchResult};

use crate::traits::ContractSource;

/// Walks every page of a region's listing, in order, exactly once per cycle.
///
/// The total page count is re-read from each response, so a listing that
/// grows or shrinks mid-walk is tolerated rather than corrected. The walker
/// fuses after yielding an error or finishing the last page; already-yielded
/// pages are never revisited.
pub struct PageWalker<'a, S: ContractSource + ?Sized> {
    source: &'a S,
    region: RegionId,
    next_page: u32,
    total_pages: Option<u32>,
    done: bool,
}

impl<'a, S: ContractSource + ?Sized> PageWalker<'a, S> {
    /// Start a walk at page 1.
    pub fn new(source: &'a S, region: RegionId) -> Self {
        Self {
            source,
            region,
            next_page: 1,
            total_pages: None,
            done: false,
        }
    }

    /// The total page count from the most recent response, if any.
    #[must_use]
    pub fn total_pages(&self) -> Option<u32> {
        self.total_pages
    }

    /// Fetch the next page, or `None` once the walk is complete.
    ///
    /// The first error fuses the walker: the remainder of the listing is
    /// abandoned for this cycle.
    pub async fn next_page(&mut self) -> Option<FetchResult<ContractPage>> {
        if self.done {
            return None;
        }

        let page = self.next_page;
        let started = Instant::now();
        match self.source.fetch_page(self.region, page).await {
            Ok(batch) => {
                self.total_pages = Some(batch.total_pages);
                info!(
                    region = %self.region,
                    page,
                    total_pages = batch.total_pages,
                    records = batch.records.len(),
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "fetched contract page"
                );
                if page >= batch.total_pages {
                    self.done = true;
                } else {
                    self.next_page = page + 1;
                }
                Some(Ok(batch))
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

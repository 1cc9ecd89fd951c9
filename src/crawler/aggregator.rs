//! Aggregation of finished pages
//!
//! Pages finish in whatever order their detail fetches allow. The aggregator
//! is the single consumer of the completion channel and the only owner of
//! the page map; the crawl hands the map on only after every dispatched page
//! has reported.

use crate::crawler::{PageResult, Record};
use crate::{CrawlError, Result};
use serde::Serialize;
use std::collections::BTreeMap;
use tokio::sync::mpsc;

/// Page-indexed records of a finished crawl, covering pages `1..=N`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct AggregateResult {
    pages: BTreeMap<u32, Vec<Option<Record>>>,
}

impl AggregateResult {
    /// Number of pages crawled
    pub fn page_count(&self) -> u32 {
        self.pages.len() as u32
    }

    /// Slots of one page, in listing order
    pub fn page(&self, page: u32) -> Option<&[Option<Record>]> {
        self.pages.get(&page).map(Vec::as_slice)
    }

    /// Pages in ascending page order
    pub fn pages(&self) -> impl Iterator<Item = (u32, &[Option<Record>])> {
        self.pages
            .iter()
            .map(|(page, records)| (*page, records.as_slice()))
    }

    /// Every slot of every page, pages ascending and listing order within a page
    pub fn slots(&self) -> impl Iterator<Item = Option<&Record>> {
        self.pages
            .values()
            .flat_map(|records| records.iter().map(Option::as_ref))
    }

    /// Total number of slots
    pub fn slot_count(&self) -> usize {
        self.pages.values().map(Vec::len).sum()
    }

    /// Number of slots holding a record
    pub fn filled_count(&self) -> usize {
        self.slots().filter(Option::is_some).count()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }
}

/// Collects page results as they complete
#[derive(Debug, Default)]
pub struct Aggregator {
    pages: BTreeMap<u32, Vec<Option<Record>>>,
}

impl Aggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores one page's result; a page may only report once
    pub fn insert(&mut self, result: PageResult) -> Result<()> {
        if self.pages.contains_key(&result.page) {
            return Err(CrawlError::DuplicatePage(result.page));
        }
        self.pages.insert(result.page, result.records);
        Ok(())
    }

    /// Number of distinct pages stored so far
    pub fn received(&self) -> u32 {
        self.pages.len() as u32
    }

    /// Drains the completion channel until every sender is gone
    ///
    /// A page handler that failed fatally ends collection with its error.
    pub async fn collect(mut self, mut results: mpsc::Receiver<Result<PageResult>>) -> Result<Self> {
        while let Some(result) = results.recv().await {
            let result = result?;
            tracing::info!(
                "Page {} is finished ({} listings)",
                result.page,
                result.len()
            );
            self.insert(result)?;
        }
        Ok(self)
    }

    /// Checks that exactly pages `1..=last_page` reported and releases the result
    pub fn finish(self, last_page: u32) -> Result<AggregateResult> {
        let received = self.received();
        let contiguous = self.pages.keys().copied().eq(1..=last_page);

        if received != last_page || !contiguous {
            return Err(CrawlError::IncompleteCrawl {
                expected: last_page,
                received,
            });
        }

        Ok(AggregateResult { pages: self.pages })
    }
}

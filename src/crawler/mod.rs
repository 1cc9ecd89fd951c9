//! Crawler module for listing discovery and detail fetching
//!
//! This module contains the concurrent fetch-and-merge engine:
//! - Document fetching over HTTP
//! - Listing and detail page extraction
//! - The per-page detail fetch pool
//! - Ordered aggregation of finished pages
//! - Overall crawl coordination

mod aggregator;
#[allow(clippy::module_inception)]
mod crawler;
mod extractor;
mod fetcher;
mod pool;

pub use aggregator::{AggregateResult, Aggregator};
pub use crawler::Crawler;
pub use extractor::Extractor;
pub use fetcher::{build_http_client, Document, DocumentFetcher, FetchError, HttpFetcher};
pub use pool::DetailPool;

#[cfg(test)]
pub(crate) use fetcher::fake;

use crate::config::{Config, SiteConfig};
use crate::site::listing_page_url;
use serde::Serialize;

/// One listing page request, identified by its 1-based page number
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListingPageRef {
    pub page: u32,
}

impl ListingPageRef {
    pub fn new(page: u32) -> Self {
        Self { page }
    }

    /// The URL the site serves this page under
    pub fn url(&self, site: &SiteConfig) -> String {
        listing_page_url(&site.root_url, site.region_id, self.page)
    }
}

/// A detail page to fetch, with its position on the listing page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailTask {
    /// Slot the resulting record lands in
    pub index: usize,

    /// Absolute URL of the detail page
    pub url: String,

    /// Price text taken from the listing page, if it showed one
    pub price: Option<String>,
}

/// Extracted fields for one listing
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Record {
    pub addr: String,
    pub price: String,
}

/// All records of one listing page, in listing order
///
/// There is one slot per dispatched detail task. A slot is `None` when its
/// detail page was skipped after a fetch error or contained no address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageResult {
    pub page: u32,
    pub records: Vec<Option<Record>>,
}

impl PageResult {
    pub fn new(page: u32, records: Vec<Option<Record>>) -> Self {
        Self { page, records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Runs a complete crawl over HTTP
///
/// This is the main entry point for starting a crawl. It will:
/// 1. Build the HTTP client and extractor
/// 2. Walk listing pages until one comes back empty
/// 3. Fetch every detail page through the per-page worker pool
/// 4. Return the page-indexed result once every page has reported
///
/// # Arguments
///
/// * `config` - The crawler configuration
///
/// # Returns
///
/// * `Ok(AggregateResult)` - Crawl completed successfully
/// * `Err(CrawlError)` - Crawl failed
pub async fn crawl(config: &Config) -> crate::Result<AggregateResult> {
    Crawler::new(config)?.run().await
}

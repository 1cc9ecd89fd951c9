//! Page crawler - discovery loop and crawl orchestration
//!
//! Listing pages are requested strictly one after another, because only
//! fetching page k tells whether page k exists. Each non-empty page is
//! handed to its own page-handling task right away and discovery moves on.
//! Finished pages flow through a bounded completion channel to the
//! aggregator, which runs alongside discovery. The channel bounds buffered
//! results only, never the number of pages in flight.

use crate::config::{validate, Config, CrawlerConfig, SiteConfig};
use crate::crawler::{
    build_http_client, AggregateResult, Aggregator, DetailPool, DocumentFetcher, Extractor,
    HttpFetcher, ListingPageRef, PageResult,
};
use crate::{CrawlError, Result};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinSet;

/// Main crawler structure
pub struct Crawler {
    site: SiteConfig,
    settings: CrawlerConfig,
    fetcher: Arc<dyn DocumentFetcher>,
    extractor: Arc<Extractor>,
    pool: DetailPool,
}

impl Crawler {
    /// Creates a crawler that fetches over HTTP
    ///
    /// # Arguments
    ///
    /// * `config` - The crawler configuration
    ///
    /// # Returns
    ///
    /// * `Ok(Crawler)` - Successfully created crawler
    /// * `Err(CrawlError)` - Selectors or the site root are invalid
    pub fn new(config: &Config) -> Result<Self> {
        let client = build_http_client(&config.user_agent, &config.crawler)?;
        Self::with_fetcher(config, Arc::new(HttpFetcher::new(client)))
    }

    /// Creates a crawler on top of any document fetcher
    ///
    /// The configuration is validated first, so out-of-range settings come
    /// back as [`CrawlError::Config`].
    pub fn with_fetcher(config: &Config, fetcher: Arc<dyn DocumentFetcher>) -> Result<Self> {
        validate(config)?;
        let extractor = Arc::new(Extractor::from_config(config)?);
        let pool = DetailPool::from_config(
            Arc::clone(&fetcher),
            Arc::clone(&extractor),
            &config.crawler,
        );

        Ok(Self {
            site: config.site.clone(),
            settings: config.crawler.clone(),
            fetcher,
            extractor,
            pool,
        })
    }

    /// Runs the crawl to completion
    ///
    /// Returns once every dispatched page has reported. Any fatal error
    /// aborts the page tasks still in flight and nothing is returned but
    /// the error.
    pub async fn run(&self) -> Result<AggregateResult> {
        tracing::info!(
            "Starting crawl of region {} at {}",
            self.site.region_id,
            self.site.root_url
        );

        let (completions, results) = mpsc::channel(self.settings.completion_capacity);
        let mut handlers = JoinSet::new();

        let discovery = self.discover(completions, &mut handlers);
        let aggregation = Aggregator::new().collect(results);
        let (last_page, aggregator) = tokio::try_join!(discovery, aggregation)?;

        let result = aggregator.finish(last_page)?;
        tracing::info!(
            "Crawl completed: {} pages, {} listings",
            result.page_count(),
            result.slot_count()
        );
        Ok(result)
    }

    /// Walks listing pages until one is empty and returns the last real page
    ///
    /// Every non-empty page gets its own handler task straight away. Only
    /// finished results are bounded: a handler whose result finds the
    /// completion channel full waits there until the aggregator drains it.
    async fn discover(
        &self,
        completions: mpsc::Sender<Result<PageResult>>,
        handlers: &mut JoinSet<()>,
    ) -> Result<u32> {
        let mut page: u32 = 0;

        loop {
            page += 1;

            if self.settings.max_pages != 0 && page > self.settings.max_pages {
                page -= 1;
                tracing::info!("Reached max-pages limit of {}", self.settings.max_pages);
                break;
            }

            let url = ListingPageRef::new(page).url(&self.site);
            tracing::debug!("Fetching listing page {}: {}", page, url);

            let document = self
                .fetcher
                .fetch(&url)
                .await
                .map_err(|source| CrawlError::ListingFetch { page, source })?;
            let tasks = self.extractor.listing_tasks(&document);

            // No more pages to be crawled
            if tasks.is_empty() {
                tracing::info!("Page {} has no listings, discovery finished", page);
                page -= 1;
                break;
            }

            tracing::info!("Start crawling page {} ({} listings)", page, tasks.len());
            let pool = self.pool.clone();
            let completions = completions.clone();
            handlers.spawn(async move {
                let result = pool.handle_page(page, tasks).await;
                // A closed channel means the crawl already failed
                let _ = completions.send(result).await;
            });

            reap_finished(handlers);
        }

        Ok(page)
    }
}

/// Removes handlers that have already exited from the set
///
/// A handler that panicked never reports its page, which `finish` later
/// surfaces as an incomplete crawl.
fn reap_finished(handlers: &mut JoinSet<()>) {
    while let Some(joined) = handlers.try_join_next() {
        if let Err(e) = joined {
            tracing::error!("Page handler died: {}", e);
        }
    }
}

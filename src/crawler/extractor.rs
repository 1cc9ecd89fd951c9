//! Listing and detail page extraction
//!
//! Pure functions over fetched documents: a listing page yields the detail
//! tasks to dispatch, a detail page yields address records. Nothing here
//! touches the network.

use crate::config::{parse_selector, Config, SelectorConfig};
use crate::crawler::{DetailTask, Document, Record};
use crate::site::resolve_detail_url;
use crate::ConfigError;
use scraper::{ElementRef, Selector};
use url::Url;

/// Compiled selectors plus the site root used to resolve detail links
#[derive(Debug, Clone)]
pub struct Extractor {
    listing_item: Selector,
    detail_link: Selector,
    listing_price: Selector,
    detail_address: Selector,
    root_url: Url,
}

impl Extractor {
    /// Compiles the configured selectors
    pub fn new(selectors: &SelectorConfig, root_url: &str) -> Result<Self, ConfigError> {
        let root_url = Url::parse(root_url)
            .map_err(|e| ConfigError::InvalidUrl(format!("Invalid root_url: {}", e)))?;

        Ok(Self {
            listing_item: parse_selector(&selectors.listing_item)?,
            detail_link: parse_selector(&selectors.detail_link)?,
            listing_price: parse_selector(&selectors.listing_price)?,
            detail_address: parse_selector(&selectors.detail_address)?,
            root_url,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        Self::new(&config.selectors, &config.site.root_url)
    }

    /// Extracts the detail tasks of a listing page, in document order
    ///
    /// Every detail link inside a listing item becomes one task carrying that
    /// item's price text. Links that do not resolve to an HTTP(S) URL are
    /// dropped before indices are assigned, so indices stay dense.
    pub fn listing_tasks(&self, document: &Document) -> Vec<DetailTask> {
        let html = document.parse();
        let mut tasks = Vec::new();

        for item in html.select(&self.listing_item) {
            let price = item
                .select(&self.listing_price)
                .next()
                .map(|element| element_text(&element));

            for link in item.select(&self.detail_link) {
                let Some(href) = link.value().attr("href") else {
                    continue;
                };
                let Some(url) = resolve_detail_url(&self.root_url, href) else {
                    tracing::debug!("Skipping unusable detail link '{}'", href);
                    continue;
                };

                tasks.push(DetailTask {
                    index: tasks.len(),
                    url,
                    price: price.clone(),
                });
            }
        }

        tasks
    }

    /// Extracts one record per address element on a detail page
    ///
    /// A page may render its address more than once; callers decide which
    /// record wins.
    pub fn detail_records(&self, document: &Document, price: Option<&str>) -> Vec<Record> {
        let html = document.parse();
        let price = price.unwrap_or_default();

        html.select(&self.detail_address)
            .map(|element| Record {
                addr: element_text(&element),
                price: price.to_string(),
            })
            .collect()
    }
}

fn element_text(element: &ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

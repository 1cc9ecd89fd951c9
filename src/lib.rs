//! Listing-Ripple: a paginated real-estate listing crawler
//!
//! This crate walks the result pages of a listing site until pagination is
//! exhausted, fetches every detail page linked from each result page with a
//! bounded pool of workers, and reassembles the extracted records into a
//! page-indexed result set ready for export.

pub mod config;
pub mod crawler;
pub mod output;
pub mod site;

use thiserror::Error;

/// Main error type for Listing-Ripple operations
#[derive(Debug, Error)]
pub enum CrawlError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Failed to fetch listing page {page}: {source}")]
    ListingFetch {
        page: u32,
        source: crawler::FetchError,
    },

    #[error("Failed to fetch detail {index} of page {page} ({url}): {source}")]
    DetailFetch {
        page: u32,
        index: usize,
        url: String,
        source: crawler::FetchError,
    },

    #[error("Page {0} reported more than once")]
    DuplicatePage(u32),

    #[error("Crawl incomplete: expected {expected} pages, received {received}")]
    IncompleteCrawl { expected: u32, received: u32 },

    #[error("Slot {index} out of range for page {page} with {len} slots")]
    SlotOutOfRange { page: u32, index: usize, len: usize },

    #[error("Detail workers for page {page} stopped before all results arrived")]
    WorkerLost { page: u32 },

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Output error: {0}")]
    Output(#[from] output::OutputError),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Invalid CSS selector '{selector}': {message}")]
    InvalidSelector { selector: String, message: String },
}

/// Result type alias for Listing-Ripple operations
pub type Result<T> = std::result::Result<T, CrawlError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{AggregateResult, Crawler, DetailTask, PageResult, Record};
pub use site::{listing_page_url, resolve_detail_url};

use serde::Deserialize;
use std::path::PathBuf;

/// Main configuration structure for Listing-Ripple
///
/// Every section is optional; a missing section falls back to its defaults so
/// the crawler can run without any configuration file at all.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub site: SiteConfig,
    pub crawler: CrawlerConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    pub selectors: SelectorConfig,
    pub output: OutputConfig,
}

/// The listing site being crawled
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    /// Site root; listing URLs are built from it and detail hrefs resolve against it
    #[serde(rename = "root-url")]
    pub root_url: String,

    /// Region identifier passed to the listing search
    #[serde(rename = "region-id")]
    pub region_id: u32,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            root_url: "https://store.591.com.tw/".to_string(),
            region_id: 8,
        }
    }
}

/// What to do when a detail page cannot be fetched
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DetailErrorPolicy {
    /// Abort the whole crawl
    #[default]
    Fatal,
    /// Leave the record slot empty and carry on
    Skip,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CrawlerConfig {
    /// Number of concurrent detail fetch workers per listing page
    #[serde(rename = "detail-workers")]
    pub detail_workers: usize,

    /// Capacity of the channel carrying finished pages to the aggregator
    #[serde(rename = "completion-capacity")]
    pub completion_capacity: usize,

    #[serde(rename = "detail-error-policy")]
    pub detail_error_policy: DetailErrorPolicy,

    /// Whole-request timeout (seconds)
    #[serde(rename = "request-timeout-secs")]
    pub request_timeout_secs: u64,

    /// Connection timeout (seconds)
    #[serde(rename = "connect-timeout-secs")]
    pub connect_timeout_secs: u64,

    /// Stop discovery after this many pages (0 = until an empty page)
    #[serde(rename = "max-pages")]
    pub max_pages: u32,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            detail_workers: 5,
            completion_capacity: 30,
            detail_error_policy: DetailErrorPolicy::Fatal,
            request_timeout_secs: 30,
            connect_timeout_secs: 10,
            max_pages: 0,
        }
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UserAgentConfig {
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    #[serde(rename = "crawler-version")]
    pub crawler_version: String,
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            crawler_name: "ListingRipple".to_string(),
            crawler_version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// CSS selectors used to pull data out of listing and detail pages
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SelectorConfig {
    /// One element per listing on a result page
    #[serde(rename = "listing-item")]
    pub listing_item: String,

    /// Link to the detail page, relative to a listing item
    #[serde(rename = "detail-link")]
    pub detail_link: String,

    /// Price text, relative to a listing item
    #[serde(rename = "listing-price")]
    pub listing_price: String,

    /// Address element on a detail page
    #[serde(rename = "detail-address")]
    pub detail_address: String,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            listing_item: "#photolist > li".to_string(),
            detail_link: ".address > a".to_string(),
            listing_price: ".prices > .price:nth-child(2) > span".to_string(),
            detail_address: ".addr".to_string(),
        }
    }
}

/// Export file format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OutputFormat {
    /// `addr,price` rows, no header
    #[default]
    Csv,
    /// Flat JSON array of records in page order
    Json,
    /// JSON object keyed by page number
    JsonPages,
}

impl OutputFormat {
    /// File extension used for the default output path
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Json | Self::JsonPages => "json",
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub format: OutputFormat,

    /// Destination file; `result.<ext>` when unset
    pub path: Option<PathBuf>,
}

impl OutputConfig {
    /// Resolves the file the export will be written to
    pub fn resolved_path(&self) -> PathBuf {
        self.path
            .clone()
            .unwrap_or_else(|| PathBuf::from(format!("result.{}", self.format.extension())))
    }
}

//! Listing-Ripple main entry point
//!
//! This is the command-line interface for the Listing-Ripple crawler.

use anyhow::Context;
use chrono::Utc;
use clap::{Parser, ValueEnum};
use listing_ripple::config::{
    load_config_with_hash, validate, Config, DetailErrorPolicy, OutputFormat,
};
use listing_ripple::crawler::crawl;
use listing_ripple::output::{export_to_path, print_statistics, CrawlStatistics};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Listing-Ripple: a paginated listing crawler
///
/// Walks every result page of a region, fetches each listing's detail page
/// and writes the addresses and prices it finds, in listing order.
#[derive(Parser, Debug)]
#[command(name = "listing-ripple")]
#[command(version)]
#[command(about = "A paginated real-estate listing crawler", long_about = None)]
struct Cli {
    /// Path to TOML configuration file (defaults are used when omitted)
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Region id to crawl [default: 8]; see https://store.591.com.tw/index.php
    #[arg(short, long)]
    region: Option<u32>,

    /// Output format [default: csv]
    #[arg(short, long, value_enum)]
    output: Option<FormatArg>,

    /// Output file [default: result.csv or result.json]
    #[arg(long, value_name = "FILE")]
    out: Option<PathBuf>,

    /// Concurrent detail fetches per listing page
    #[arg(short, long)]
    workers: Option<usize>,

    /// Leave a listing empty instead of aborting when its detail page fails
    #[arg(long)]
    skip_detail_errors: bool,

    /// Stop after this many listing pages
    #[arg(long)]
    max_pages: Option<u32>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum FormatArg {
    Csv,
    Json,
    JsonPages,
}

impl From<FormatArg> for OutputFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Csv => OutputFormat::Csv,
            FormatArg::Json => OutputFormat::Json,
            FormatArg::JsonPages => OutputFormat::JsonPages,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let config = resolve_config(&cli)?;
    let output_path = config.output.resolved_path();

    tracing::info!(
        "Region {}, {} detail workers per page, detail errors are {}",
        config.site.region_id,
        config.crawler.detail_workers,
        match config.crawler.detail_error_policy {
            DetailErrorPolicy::Fatal => "fatal",
            DetailErrorPolicy::Skip => "skipped",
        }
    );

    // Run the crawler
    let started_at = Utc::now();
    let result = match crawl(&config).await {
        Ok(result) => result,
        Err(e) => {
            tracing::error!("Crawl failed: {}", e);
            return Err(e).context("crawl aborted");
        }
    };
    let stats = CrawlStatistics::from_result(&result, started_at, Utc::now());

    if !cli.quiet {
        print_statistics(&stats);
    }

    // The crawl itself succeeded; a failed write is reported on its own
    export_to_path(&result, config.output.format, &output_path).with_context(|| {
        format!(
            "crawl finished but writing {} failed",
            output_path.display()
        )
    })?;

    if !cli.quiet {
        println!("\n✓ Results written to: {}", output_path.display());
    }

    Ok(())
}

/// Loads the config file (if any) and applies command-line overrides
fn resolve_config(cli: &Cli) -> anyhow::Result<Config> {
    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("failed to load {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            config
        }
        None => Config::default(),
    };

    if let Some(region) = cli.region {
        config.site.region_id = region;
    }
    if let Some(format) = cli.output {
        config.output.format = format.into();
    }
    if let Some(out) = &cli.out {
        config.output.path = Some(out.clone());
    }
    if let Some(workers) = cli.workers {
        config.crawler.detail_workers = workers;
    }
    if cli.skip_detail_errors {
        config.crawler.detail_error_policy = DetailErrorPolicy::Skip;
    }
    if let Some(max_pages) = cli.max_pages {
        config.crawler.max_pages = max_pages;
    }

    validate(&config).context("invalid configuration")?;
    Ok(config)
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("listing_ripple=info,warn"),
            1 => EnvFilter::new("listing_ripple=debug,info"),
            2 => EnvFilter::new("listing_ripple=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

//! Output module for exporting crawl results
//!
//! This module handles:
//! - Writing the aggregated result as CSV or JSON
//! - Summarizing a finished crawl

mod csv_output;
mod json_output;
pub mod stats;
mod traits;

pub use csv_output::CsvExporter;
pub use json_output::JsonExporter;
pub use stats::{print_statistics, CrawlStatistics};
pub use traits::{Exporter, OutputError, OutputResult};

use crate::config::OutputFormat;
use crate::crawler::AggregateResult;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

/// Returns the exporter for a configured format
pub fn exporter_for(format: OutputFormat) -> Box<dyn Exporter> {
    match format {
        OutputFormat::Csv => Box::new(CsvExporter),
        OutputFormat::Json => Box::new(JsonExporter::flat()),
        OutputFormat::JsonPages => Box::new(JsonExporter::by_page()),
    }
}

/// Writes a crawl result to a file
///
/// # Arguments
///
/// * `result` - The aggregated crawl result
/// * `format` - Which export format to use
/// * `path` - Destination file, created or truncated
///
/// # Returns
///
/// * `Ok(())` - Successfully wrote the file
/// * `Err(OutputError)` - Failed to create or write the file
pub fn export_to_path(
    result: &AggregateResult,
    format: OutputFormat,
    path: &Path,
) -> OutputResult<()> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    exporter_for(format).export(result, &mut writer)?;

    tracing::info!(
        "Wrote {} records to {}",
        result.slot_count(),
        path.display()
    );
    Ok(())
}

//! Exporter trait and output errors
//!
//! This module defines the interface every export format implements.

use crate::crawler::AggregateResult;
use std::io::Write;
use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Failed to write CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("Failed to write JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// Serializes a finished crawl into one file format
///
/// Implementations write pages in ascending page order and records in
/// listing order within a page.
pub trait Exporter {
    /// Writes the whole result to `writer`
    ///
    /// # Arguments
    ///
    /// * `result` - The aggregated crawl result
    /// * `writer` - Destination for the serialized output
    fn export(&self, result: &AggregateResult, writer: &mut dyn Write) -> OutputResult<()>;
}

//! CSV export
//!
//! One `addr,price` row per slot, no header row. An empty slot is written as
//! an empty row so row positions still line up with listing positions.

use crate::crawler::AggregateResult;
use crate::output::traits::{Exporter, OutputResult};
use std::io::Write;

/// Writes records as headerless `addr,price` rows
#[derive(Debug, Clone, Copy, Default)]
pub struct CsvExporter;

impl Exporter for CsvExporter {
    fn export(&self, result: &AggregateResult, writer: &mut dyn Write) -> OutputResult<()> {
        let mut csv_writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(writer);

        for slot in result.slots() {
            match slot {
                Some(record) => {
                    csv_writer.write_record([record.addr.as_str(), record.price.as_str()])?
                }
                None => csv_writer.write_record(["", ""])?,
            }
        }

        csv_writer.flush()?;
        Ok(())
    }
}

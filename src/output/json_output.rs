//! JSON export
//!
//! Two shapes are supported: a flat array of records across all pages, and
//! an object keyed by page number that keeps empty slots as `null`.

use crate::crawler::{AggregateResult, Record};
use crate::output::traits::{Exporter, OutputResult};
use std::io::Write;

/// Writes the crawl as JSON
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonExporter {
    by_page: bool,
}

impl JsonExporter {
    /// Flat array of `{"addr", "price"}` objects; empty slots become empty records
    pub fn flat() -> Self {
        Self { by_page: false }
    }

    /// `{"1": [...], "2": [...]}` with `null` for empty slots
    pub fn by_page() -> Self {
        Self { by_page: true }
    }
}

impl Exporter for JsonExporter {
    fn export(&self, result: &AggregateResult, writer: &mut dyn Write) -> OutputResult<()> {
        if self.by_page {
            serde_json::to_writer(&mut *writer, result)?;
        } else {
            let empty = Record::default();
            let records: Vec<&Record> = result
                .slots()
                .map(|slot| slot.unwrap_or(&empty))
                .collect();
            serde_json::to_writer(&mut *writer, &records)?;
        }
        writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crawler::{Aggregator, PageResult};
    use serde_json::{json, Value};

    fn sample() -> AggregateResult {
        let mut aggregator = Aggregator::new();
        aggregator
            .insert(PageResult::new(
                2,
                vec![Some(Record {
                    addr: "B".to_string(),
                    price: "2".to_string(),
                })],
            ))
            .unwrap();
        aggregator
            .insert(PageResult::new(
                1,
                vec![
                    Some(Record {
                        addr: "A".to_string(),
                        price: "1".to_string(),
                    }),
                    None,
                ],
            ))
            .unwrap();
        aggregator.finish(2).unwrap()
    }

    fn export(exporter: JsonExporter, result: &AggregateResult) -> Value {
        let mut out = Vec::new();
        exporter.export(result, &mut out).unwrap();
        serde_json::from_slice(&out).unwrap()
    }

    #[test]
    fn test_flat_export() {
        let value = export(JsonExporter::flat(), &sample());
        assert_eq!(
            value,
            json!([
                {"addr": "A", "price": "1"},
                {"addr": "", "price": ""},
                {"addr": "B", "price": "2"}
            ])
        );
    }

    #[test]
    fn test_by_page_export() {
        let value = export(JsonExporter::by_page(), &sample());
        assert_eq!(
            value,
            json!({
                "1": [{"addr": "A", "price": "1"}, null],
                "2": [{"addr": "B", "price": "2"}]
            })
        );
    }

    #[test]
    fn test_empty_flat_export() {
        let result = Aggregator::new().finish(0).unwrap();
        assert_eq!(export(JsonExporter::flat(), &result), json!([]));
    }
}

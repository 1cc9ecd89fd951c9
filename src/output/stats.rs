//! Statistics for a finished crawl
//!
//! This module summarizes an aggregated result for display once the crawl
//! is over.

use crate::crawler::AggregateResult;
use chrono::{DateTime, Utc};

/// Crawl statistics summary
#[derive(Debug, Clone)]
pub struct CrawlStatistics {
    /// Number of listing pages crawled
    pub pages: u32,

    /// Number of listings found across all pages
    pub listings: usize,

    /// Listings that produced a record
    pub records: usize,

    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl CrawlStatistics {
    /// Builds statistics from a finished crawl and its time window
    pub fn from_result(
        result: &AggregateResult,
        started_at: DateTime<Utc>,
        finished_at: DateTime<Utc>,
    ) -> Self {
        Self {
            pages: result.page_count(),
            listings: result.slot_count(),
            records: result.filled_count(),
            started_at,
            finished_at,
        }
    }

    /// Listings whose slot stayed empty
    pub fn empty_slots(&self) -> usize {
        self.listings - self.records
    }

    /// Wall-clock duration in seconds
    pub fn duration_seconds(&self) -> f64 {
        (self.finished_at - self.started_at).num_milliseconds() as f64 / 1000.0
    }

    /// Share of listings that produced a record, as a percentage
    pub fn fill_rate(&self) -> f64 {
        if self.listings == 0 {
            return 0.0;
        }
        (self.records as f64 / self.listings as f64) * 100.0
    }
}

/// Prints statistics to stdout in a formatted manner
///
/// # Arguments
///
/// * `stats` - The statistics to display
pub fn print_statistics(stats: &CrawlStatistics) {
    println!("=== Crawl Statistics ===\n");

    println!("Overview:");
    println!("  Started: {}", stats.started_at.to_rfc3339());
    println!("  Finished: {}", stats.finished_at.to_rfc3339());
    println!("  Duration: {:.2}s", stats.duration_seconds());
    println!();

    println!("Listings:");
    println!("  Pages crawled: {}", stats.pages);
    println!("  Listings found: {}", stats.listings);
    println!("  Records extracted: {}", stats.records);
    println!("  Empty slots: {}", stats.empty_slots());
    println!();

    println!(
        "Fill Rate: {:.1}% ({} / {} listings produced a record)",
        stats.fill_rate(),
        stats.records,
        stats.listings
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crawler::{Aggregator, PageResult, Record};
    use chrono::Duration;

    #[test]
    fn test_statistics_from_result() {
        let mut aggregator = Aggregator::new();
        aggregator
            .insert(PageResult::new(
                1,
                vec![Some(Record::default()), None, Some(Record::default())],
            ))
            .unwrap();
        aggregator
            .insert(PageResult::new(2, vec![Some(Record::default())]))
            .unwrap();
        let result = aggregator.finish(2).unwrap();

        let started = Utc::now();
        let finished = started + Duration::milliseconds(2500);
        let stats = CrawlStatistics::from_result(&result, started, finished);

        assert_eq!(stats.pages, 2);
        assert_eq!(stats.listings, 4);
        assert_eq!(stats.records, 3);
        assert_eq!(stats.empty_slots(), 1);
        assert!((stats.fill_rate() - 75.0).abs() < 0.01);
        assert!((stats.duration_seconds() - 2.5).abs() < 0.001);
    }

    #[test]
    fn test_fill_rate_without_listings() {
        let result = Aggregator::new().finish(0).unwrap();
        let now = Utc::now();
        let stats = CrawlStatistics::from_result(&result, now, now);
        assert_eq!(stats.fill_rate(), 0.0);
    }
}

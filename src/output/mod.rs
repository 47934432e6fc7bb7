//! Output module for crawl results
//!
//! This module handles:
//! - Tallying fetch outcomes per resource kind
//! - Producing the final statistics record
//! - Rendering statistics for the terminal or as JSON

pub mod stats;

pub use stats::{print_statistics, CrawlStats, StatsAggregator};

/// Renders statistics as pretty-printed JSON
pub fn stats_to_json(stats: &CrawlStats) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(stats)
}

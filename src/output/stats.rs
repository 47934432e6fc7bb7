//! Crawl statistics
//!
//! The scheduler feeds every fetch outcome into a [`StatsAggregator`]; when
//! the crawl goes quiet the aggregator is finalized into the [`CrawlStats`]
//! record handed back to the caller.

use crate::state::ResourceKind;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::time::Instant;

/// Final statistics of one crawl run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CrawlStats {
    pub js: u64,
    pub css: u64,
    pub image: u64,
    pub html: u64,
    pub other: u64,

    /// Successful fetches; always the sum of the per-kind counters
    pub total: u64,

    /// Fetch, hook or save failures; not part of `total`
    pub failed: u64,

    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub elapsed_secs: f64,
}

/// Running tally of fetch outcomes
#[derive(Debug)]
pub struct StatsAggregator {
    js: u64,
    css: u64,
    image: u64,
    html: u64,
    other: u64,
    failed: u64,
    start_time: DateTime<Utc>,
    started: Instant,
}

impl StatsAggregator {
    pub fn new() -> Self {
        Self {
            js: 0,
            css: 0,
            image: 0,
            html: 0,
            other: 0,
            failed: 0,
            start_time: Utc::now(),
            started: Instant::now(),
        }
    }

    /// Counts a successfully fetched and saved resource
    pub fn record_success(&mut self, kind: ResourceKind) {
        match kind {
            ResourceKind::Page => self.html += 1,
            ResourceKind::Css => self.css += 1,
            ResourceKind::Javascript => self.js += 1,
            ResourceKind::Image => self.image += 1,
            ResourceKind::Other => self.other += 1,
        }
    }

    pub fn record_failure(&mut self) {
        self.failed += 1;
    }

    pub fn total(&self) -> u64 {
        self.js + self.css + self.image + self.html + self.other
    }

    pub fn failed(&self) -> u64 {
        self.failed
    }

    /// Stamps the end time and produces the final record
    pub fn finalize(&self) -> CrawlStats {
        let end_time = Utc::now();
        CrawlStats {
            js: self.js,
            css: self.css,
            image: self.image,
            html: self.html,
            other: self.other,
            total: self.total(),
            failed: self.failed,
            start_time: self.start_time,
            end_time,
            elapsed_secs: self.started.elapsed().as_secs_f64(),
        }
    }
}

impl Default for StatsAggregator {
    fn default() -> Self {
        Self::new()
    }
}

/// Prints statistics to stdout in a formatted manner
pub fn print_statistics(stats: &CrawlStats) {
    println!("=== Mirror Statistics ===\n");

    println!("Resources by Kind:");
    println!("  html:       {}", stats.html);
    println!("  css:        {}", stats.css);
    println!("  javascript: {}", stats.js);
    println!("  image:      {}", stats.image);
    println!("  other:      {}", stats.other);
    println!();

    println!("  Total saved: {}", stats.total);
    println!("  Failed:      {}", stats.failed);
    println!();

    let attempted = stats.total + stats.failed;
    let success_rate = if attempted > 0 {
        (stats.total as f64 / attempted as f64) * 100.0
    } else {
        0.0
    };
    println!(
        "Success Rate: {:.1}% ({} / {} fetches)",
        success_rate, stats.total, attempted
    );
    println!(
        "Elapsed: {:.2}s ({} -> {})",
        stats.elapsed_secs,
        stats.start_time.to_rfc3339(),
        stats.end_time.to_rfc3339()
    );
}

//! Mutable state of one crawl run
//!
//! Owned exclusively by the scheduler. Nothing outside the scheduler reads or
//! writes the queue or the visited set directly.

use crate::output::StatsAggregator;
use crate::state::UrlRecord;
use std::collections::{HashSet, VecDeque};

#[derive(Debug)]
pub struct CrawlState {
    /// URLs waiting to be fetched, in discovery order
    queue: VecDeque<UrlRecord>,

    /// Canonical URL of every record ever dequeued for fetching
    visited: HashSet<String>,

    /// Fetches dispatched whose extraction has not reported back yet
    outstanding_extractions: u32,

    /// Fetches currently on the wire
    open_connections: u32,

    /// Upper bound for `open_connections`
    max_connections: u32,

    /// Number of fetches dispatched so far
    dispatched: u32,

    /// Per-kind outcome tallies and timestamps
    pub stats: StatsAggregator,
}

impl CrawlState {
    pub fn new(max_connections: u32) -> Self {
        Self {
            queue: VecDeque::new(),
            visited: HashSet::new(),
            outstanding_extractions: 0,
            open_connections: 0,
            max_connections: max_connections.max(1),
            dispatched: 0,
            stats: StatsAggregator::new(),
        }
    }

    /// Appends a record to the tail of the queue
    pub fn enqueue(&mut self, record: UrlRecord) {
        self.queue.push_back(record);
    }

    /// Removes the head of the queue
    pub fn dequeue(&mut self) -> Option<UrlRecord> {
        self.queue.pop_front()
    }

    pub fn is_queue_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn queue_len(&self) -> usize {
        self.queue.len()
    }

    /// Drops every queued record and returns how many were dropped
    pub fn clear_queue(&mut self) -> usize {
        let dropped = self.queue.len();
        self.queue.clear();
        dropped
    }

    pub fn is_visited(&self, url: &str) -> bool {
        self.visited.contains(url)
    }

    /// Records `url` as visited; returns false if it already was
    pub fn mark_visited(&mut self, url: &str) -> bool {
        if self.visited.contains(url) {
            return false;
        }
        self.visited.insert(url.to_string())
    }

    pub fn visited_len(&self) -> usize {
        self.visited.len()
    }

    /// Canonical URLs of every visited record, sorted
    pub fn visited_urls(&self) -> Vec<String> {
        let mut urls: Vec<String> = self.visited.iter().cloned().collect();
        urls.sort();
        urls
    }

    pub fn has_connection_capacity(&self) -> bool {
        self.open_connections < self.max_connections
    }

    /// Claims a connection slot and an extraction slot for a dispatched fetch
    pub fn begin_fetch(&mut self) {
        debug_assert!(self.has_connection_capacity());
        self.open_connections += 1;
        self.outstanding_extractions += 1;
        self.dispatched += 1;
    }

    /// Releases the connection slot once the fetch has settled
    pub fn end_fetch(&mut self) {
        self.open_connections = self.open_connections.saturating_sub(1);
    }

    /// Releases the extraction slot once every enqueue of the parse has been applied
    pub fn end_extraction(&mut self) {
        self.outstanding_extractions = self.outstanding_extractions.saturating_sub(1);
    }

    pub fn open_connections(&self) -> u32 {
        self.open_connections
    }

    pub fn max_connections(&self) -> u32 {
        self.max_connections
    }

    pub fn outstanding_extractions(&self) -> u32 {
        self.outstanding_extractions
    }

    pub fn dispatched(&self) -> u32 {
        self.dispatched
    }
}

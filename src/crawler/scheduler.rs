//! Scheduler for the crawl queue
//!
//! This module handles:
//! - FIFO dispatch of queued URLs under the connection cap
//! - At-most-once fetching through the visited set
//! - Applying worker completion events to the crawl state
//! - Idle detection and the final statistics record
//!
//! The scheduler is synchronous. The coordinator drives it from a single task,
//! so crawl state is only ever mutated between events, never concurrently.

use crate::config::CrawlerConfig;
use crate::crawler::events::CrawlEvent;
use crate::crawler::quiescence::QuiescenceDetector;
use crate::output::CrawlStats;
use crate::state::{CrawlState, UrlRecord};

/// Lifecycle of a crawl
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerPhase {
    /// Seed dispatched; nothing else goes out until its fetch settles
    Init,
    /// Queue has work
    Running,
    /// Queue is empty; work may be in flight or the idle streak is counting
    Draining,
    /// Quiescence confirmed; statistics are final
    Done,
}

/// Scheduler owns the crawl state and decides what to fetch next
pub struct Scheduler {
    state: CrawlState,
    quiescence: QuiescenceDetector,
    phase: SchedulerPhase,
    seed_url: String,
    max_pages: Option<u32>,
    max_depth: Option<u32>,
    final_stats: Option<CrawlStats>,
}

impl Scheduler {
    /// Creates a scheduler with `seed` as the only queued URL
    pub fn new(config: &CrawlerConfig, seed: UrlRecord) -> Self {
        let mut state = CrawlState::new(config.max_connections);
        let seed_url = seed.url.clone();
        state.enqueue(seed);

        Self {
            state,
            quiescence: QuiescenceDetector::new(config.idle_ticks),
            phase: SchedulerPhase::Init,
            seed_url,
            max_pages: config.max_pages,
            max_depth: config.max_depth,
            final_stats: None,
        }
    }

    pub fn phase(&self) -> SchedulerPhase {
        self.phase
    }

    pub fn is_done(&self) -> bool {
        self.phase == SchedulerPhase::Done
    }

    /// Read-only view of the crawl state
    pub fn state(&self) -> &CrawlState {
        &self.state
    }

    /// Takes the next URL to fetch, if one may be dispatched now
    ///
    /// Returns `None` while the connection cap is reached, while the seed is
    /// still being fetched, or when the queue holds nothing fetchable.
    /// Already-visited entries are discarded silently. The returned record has
    /// been marked visited and holds a connection and an extraction slot.
    pub fn next_dispatch(&mut self) -> Option<UrlRecord> {
        if self.phase == SchedulerPhase::Done || !self.state.has_connection_capacity() {
            return None;
        }

        if self.phase == SchedulerPhase::Init && self.state.dispatched() > 0 {
            return None;
        }

        let dispatched = loop {
            let Some(mut record) = self.state.dequeue() else {
                break None;
            };

            if self.state.is_visited(&record.url) {
                tracing::trace!("Skipping already visited {}", record.url);
                continue;
            }

            if let Some(max_depth) = self.max_depth {
                if record.depth > max_depth {
                    tracing::debug!(
                        "Dropping {} at depth {} (max depth {})",
                        record.url,
                        record.depth,
                        max_depth
                    );
                    continue;
                }
            }

            if let Some(max_pages) = self.max_pages {
                if self.state.dispatched() >= max_pages {
                    let dropped = self.state.clear_queue() + 1;
                    tracing::debug!(
                        "Page limit {} reached, dropping {} queued URLs",
                        max_pages,
                        dropped
                    );
                    break None;
                }
            }

            self.state.mark_visited(&record.url);
            record.attempts += 1;
            self.state.begin_fetch();
            break Some(record);
        };

        self.refresh_phase();
        dispatched
    }

    /// Applies a completion event reported by a worker
    pub fn apply(&mut self, event: CrawlEvent) {
        if self.phase == SchedulerPhase::Done {
            tracing::trace!("Ignoring event after completion: {:?}", event);
            return;
        }

        match event {
            CrawlEvent::Discovered(record) => {
                self.state.enqueue(record);
                self.quiescence.reset();
            }

            CrawlEvent::Fetched { url, kind } => {
                self.state.end_fetch();
                self.state.stats.record_success(kind);
                tracing::debug!("Saved {} as {}", url, kind);
                self.settle_seed(&url);

                let total = self.state.stats.total();
                if total % 10 == 0 {
                    tracing::info!(
                        "Progress: {} saved, {} failed, {} queued, {} in flight",
                        total,
                        self.state.stats.failed(),
                        self.state.queue_len(),
                        self.state.open_connections()
                    );
                }
            }

            CrawlEvent::Failed { url, reason } => {
                self.state.end_fetch();
                self.state.end_extraction();
                self.state.stats.record_failure();
                tracing::warn!("Failed to download {}: {}", url, reason);
                self.settle_seed(&url);
            }

            CrawlEvent::ExtractionDone { url, discovered } => {
                self.state.end_extraction();
                tracing::trace!("Extraction of {} enqueued {} references", url, discovered);
            }
        }

        self.refresh_phase();
    }

    /// Observes one idle-detection tick; returns true once the crawl is finished
    pub fn on_tick(&mut self) -> bool {
        match self.phase {
            SchedulerPhase::Done => return true,
            SchedulerPhase::Init => return false,
            SchedulerPhase::Running | SchedulerPhase::Draining => {}
        }

        let quiet = self.quiescence.observe(
            self.state.is_queue_empty(),
            self.state.outstanding_extractions(),
        );

        if quiet {
            let stats = self.state.stats.finalize();
            tracing::info!(
                "Crawl quiescent after {} idle ticks: {} saved, {} failed in {:.2}s",
                self.quiescence.idle_ticks(),
                stats.total,
                stats.failed,
                stats.elapsed_secs
            );
            self.final_stats = Some(stats);
            self.phase = SchedulerPhase::Done;
        }

        quiet
    }

    /// The statistics record; final once the scheduler is done
    pub fn stats(&self) -> CrawlStats {
        match &self.final_stats {
            Some(stats) => stats.clone(),
            None => self.state.stats.finalize(),
        }
    }

    fn settle_seed(&mut self, url: &str) {
        if self.phase == SchedulerPhase::Init && url == self.seed_url {
            self.phase = SchedulerPhase::Running;
        }
    }

    fn refresh_phase(&mut self) {
        match self.phase {
            SchedulerPhase::Init | SchedulerPhase::Done => {}
            SchedulerPhase::Running | SchedulerPhase::Draining => {
                self.phase = if self.state.is_queue_empty() {
                    SchedulerPhase::Draining
                } else {
                    SchedulerPhase::Running
                };
            }
        }
    }
}

//! Quiescence detection
//!
//! The queue can look empty while a parse is still about to enqueue more
//! work. The detector only declares the crawl finished after the queue has
//! been empty, with nothing in flight, for a number of consecutive ticks.

/// Counts consecutive idle ticks up to a threshold
#[derive(Debug, Clone)]
pub struct QuiescenceDetector {
    threshold: u32,
    idle_ticks: u32,
}

impl QuiescenceDetector {
    pub fn new(threshold: u32) -> Self {
        Self {
            threshold: threshold.max(1),
            idle_ticks: 0,
        }
    }

    /// Observes one tick; returns true once the idle streak reaches the threshold
    pub fn observe(&mut self, queue_empty: bool, outstanding: u32) -> bool {
        if queue_empty && outstanding == 0 {
            self.idle_ticks += 1;
        } else {
            self.idle_ticks = 0;
        }
        self.idle_ticks >= self.threshold
    }

    /// Breaks the idle streak
    pub fn reset(&mut self) {
        self.idle_ticks = 0;
    }

    pub fn idle_ticks(&self) -> u32 {
        self.idle_ticks
    }

    pub fn threshold(&self) -> u32 {
        self.threshold
    }
}

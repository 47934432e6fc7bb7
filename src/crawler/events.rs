//! Completion events flowing from worker tasks back to the scheduler
//!
//! Workers never touch crawl state. Everything they learn travels over one
//! unbounded channel, in order, and is applied by the coordinator between
//! dispatches.

use crate::state::{ResourceKind, UrlRecord};
use tokio::sync::mpsc::UnboundedSender;

/// Something a worker task has to report
#[derive(Debug, Clone, PartialEq)]
pub enum CrawlEvent {
    /// An extractor accepted a reference
    Discovered(UrlRecord),

    /// The fetch succeeded and the body was saved; `kind` is the routed kind
    Fetched { url: String, kind: ResourceKind },

    /// Fetch, pre-process or save failed; the URL is dropped
    Failed { url: String, reason: String },

    /// Every `Discovered` event of this URL's parse has been sent
    ExtractionDone { url: String, discovered: usize },
}

/// The one capability extractors get: hand a URL to the scheduler
pub trait Enqueue {
    fn enqueue(&self, url: String, kind: ResourceKind);
}

/// [`Enqueue`] over the event channel
///
/// Records are tagged one hop deeper than the page they were found on.
#[derive(Debug, Clone)]
pub struct Enqueuer {
    tx: UnboundedSender<CrawlEvent>,
    depth: u32,
}

impl Enqueuer {
    pub fn new(tx: UnboundedSender<CrawlEvent>, parent_depth: u32) -> Self {
        Self {
            tx,
            depth: parent_depth.saturating_add(1),
        }
    }
}

impl Enqueue for Enqueuer {
    fn enqueue(&self, url: String, kind: ResourceKind) {
        let record = UrlRecord::new(url, kind, self.depth);
        if self.tx.send(CrawlEvent::Discovered(record)).is_err() {
            tracing::trace!("Scheduler gone, dropping discovered reference");
        }
    }
}

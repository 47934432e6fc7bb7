//! Crawler coordinator - main crawl orchestration logic
//!
//! This module contains the crawl loop that ties everything together:
//! - Dispatching queued URLs to worker tasks under the connection cap
//! - Applying worker events to the scheduler as they arrive
//! - Driving the idle tick until the crawl goes quiet
//!
//! One task owns the [`Scheduler`]. Workers fetch, save and parse, and report
//! back over an unbounded channel; they never see the crawl state.

use crate::config::{Config, DownloadConfig};
use crate::crawler::events::{CrawlEvent, Enqueuer};
use crate::crawler::fetcher::{HttpTransport, Transport};
use crate::crawler::hooks::{NoopHooks, Resource, ResourceHooks};
use crate::crawler::router::{classify, route};
use crate::crawler::scheduler::Scheduler;
use crate::output::CrawlStats;
use crate::state::{ResourceKind, UrlRecord};
use crate::storage::{FsStore, Store};
use crate::url::{local_path, AdmissionFilter};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::{self, UnboundedSender};
use tokio::time::MissedTickBehavior;

/// Main crawler coordinator structure
pub struct Coordinator {
    config: Arc<Config>,
    scheduler: Scheduler,
    transport: Arc<dyn Transport>,
    store: Arc<dyn Store>,
    hooks: Arc<dyn ResourceHooks>,
    filter: AdmissionFilter,
}

impl Coordinator {
    /// Creates a coordinator that fetches over HTTP and saves below the output root
    ///
    /// # Arguments
    ///
    /// * `config` - A validated configuration
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Ready to run
    /// * `Err(MirrorError)` - The HTTP client could not be built
    pub fn new(config: Config) -> crate::Result<Self> {
        let transport = HttpTransport::from_config(&config.user_agent)?;
        let store = FsStore::new(&config.output.root);
        Ok(Self::with_collaborators(
            config,
            Arc::new(transport),
            Arc::new(store),
        ))
    }

    /// Creates a coordinator over caller-supplied transport and store
    pub fn with_collaborators(
        config: Config,
        transport: Arc<dyn Transport>,
        store: Arc<dyn Store>,
    ) -> Self {
        let base_url = config.base_url();
        let filter = AdmissionFilter::new(config.site.host.clone(), base_url.clone());
        let scheduler = Scheduler::new(&config.crawler, UrlRecord::seed(base_url));

        Self {
            config: Arc::new(config),
            scheduler,
            transport,
            store,
            hooks: Arc::new(NoopHooks),
            filter,
        }
    }

    /// Replaces the processing hooks
    pub fn with_hooks(mut self, hooks: Arc<dyn ResourceHooks>) -> Self {
        self.hooks = hooks;
        self
    }

    /// Every URL dispatched so far, sorted
    pub fn visited_urls(&self) -> Vec<String> {
        self.scheduler.state().visited_urls()
    }

    /// Runs the crawl until it goes quiet and returns the final statistics
    ///
    /// Per-URL failures are counted, never returned. Running a finished
    /// coordinator again returns the same statistics.
    pub async fn run(&mut self) -> CrawlStats {
        tracing::info!(
            "Mirroring {} into {} ({} connections)",
            self.filter.base_url(),
            self.config.output.root,
            self.config.crawler.max_connections
        );

        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut ticker =
            tokio::time::interval(Duration::from_millis(self.config.crawler.tick_interval_ms));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            self.dispatch_ready(&tx);

            tokio::select! {
                Some(event) = rx.recv() => self.scheduler.apply(event),
                _ = ticker.tick() => {
                    if self.scheduler.on_tick() {
                        break;
                    }
                }
            }
        }

        self.scheduler.stats()
    }

    /// Hands every dispatchable URL to its own worker task
    fn dispatch_ready(&mut self, tx: &UnboundedSender<CrawlEvent>) {
        while let Some(record) = self.scheduler.next_dispatch() {
            tracing::debug!(
                "Fetching {} ({}, depth {}, {} open)",
                record.url,
                record.kind,
                record.depth,
                self.scheduler.state().open_connections()
            );

            let job = FetchJob {
                record,
                base_url: self.filter.base_url().to_string(),
                download: self.config.download.clone(),
                filter: self.filter.clone(),
                transport: Arc::clone(&self.transport),
                store: Arc::clone(&self.store),
                hooks: Arc::clone(&self.hooks),
            };
            let completion = Completion::new(tx.clone(), job.record.url.clone());
            tokio::spawn(job.run(completion));
        }
    }
}

/// Everything one worker needs to process one URL
struct FetchJob {
    record: UrlRecord,
    base_url: String,
    download: DownloadConfig,
    filter: AdmissionFilter,
    transport: Arc<dyn Transport>,
    store: Arc<dyn Store>,
    hooks: Arc<dyn ResourceHooks>,
}

impl FetchJob {
    /// Fetch, classify, pre-process, save, post-process, extract
    async fn run(self, mut completion: Completion) {
        let url = self.record.url.clone();

        let response = match self.transport.fetch(&url).await {
            Ok(response) => response,
            Err(e) => return completion.failed(e.to_string()),
        };

        let kind = classify(self.record.kind, response.content_type.as_deref());
        let resource = Resource {
            path: local_path(&url, &self.base_url, kind == ResourceKind::Page),
            url,
            final_url: response.final_url,
            kind,
            status_code: response.status_code,
            content_type: response.content_type,
            body: response.body,
        };

        if let Err(e) = self.hooks.pre_process(&resource) {
            return completion.failed(e.to_string());
        }

        if let Err(e) = self.store.save(&resource.path, &resource.body).await {
            return completion.failed(e.to_string());
        }

        completion.fetched(kind);
        self.hooks.post_process(&resource);

        if !kind.is_extractable() {
            return completion.extraction_done(0);
        }

        let enqueuer = Enqueuer::new(completion.sender(), self.record.depth);
        let download = self.download;
        let filter = self.filter;
        let body = resource.body;
        let parsed = tokio::task::spawn_blocking(move || {
            route(kind, &body, &download, &filter, &enqueuer)
        })
        .await;

        match parsed {
            Ok(discovered) => completion.extraction_done(discovered),
            Err(e) => {
                tracing::warn!("Extraction of {} aborted: {}", resource.url, e);
                completion.extraction_done(0);
            }
        }
    }
}

/// Guarantees a worker reports exactly one outcome
///
/// If the worker ends without reporting, for instance because a hook panicked,
/// dropping the guard reports on its behalf so the scheduler's counters still
/// balance.
struct Completion {
    tx: UnboundedSender<CrawlEvent>,
    url: String,
    fetched: bool,
    settled: bool,
}

impl Completion {
    fn new(tx: UnboundedSender<CrawlEvent>, url: String) -> Self {
        Self {
            tx,
            url,
            fetched: false,
            settled: false,
        }
    }

    fn sender(&self) -> UnboundedSender<CrawlEvent> {
        self.tx.clone()
    }

    fn fetched(&mut self, kind: ResourceKind) {
        self.fetched = true;
        self.send(CrawlEvent::Fetched {
            url: self.url.clone(),
            kind,
        });
    }

    fn failed(mut self, reason: String) {
        self.settled = true;
        self.send(CrawlEvent::Failed {
            url: self.url.clone(),
            reason,
        });
    }

    fn extraction_done(mut self, discovered: usize) {
        self.settled = true;
        self.send(CrawlEvent::ExtractionDone {
            url: self.url.clone(),
            discovered,
        });
    }

    fn send(&self, event: CrawlEvent) {
        if self.tx.send(event).is_err() {
            tracing::trace!("Coordinator gone, dropping event for {}", self.url);
        }
    }
}

impl Drop for Completion {
    fn drop(&mut self) {
        if self.settled {
            return;
        }

        let event = if self.fetched {
            CrawlEvent::ExtractionDone {
                url: self.url.clone(),
                discovered: 0,
            }
        } else {
            CrawlEvent::Failed {
                url: self.url.clone(),
                reason: "worker ended without reporting".to_string(),
            }
        };
        self.send(event);
    }
}

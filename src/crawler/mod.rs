//! Crawler module for fetching and mirroring a site
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching, one attempt per URL
//! - HTML and CSS reference extraction
//! - Content-type routing
//! - Scheduling under a connection cap, with idle detection
//! - Overall crawl coordination

mod coordinator;
mod css;
pub mod events;
mod fetcher;
pub mod hooks;
mod parser;
mod quiescence;
mod router;
mod scheduler;

pub use coordinator::Coordinator;
pub use css::{collect_css_references, extract_css};
pub use events::{CrawlEvent, Enqueue, Enqueuer};
pub use fetcher::{
    build_http_client, fetch_url, FetchError, FetchedResponse, HttpTransport, Transport,
};
pub use hooks::{HookError, NoopHooks, Resource, ResourceHooks};
pub use parser::{collect_page_references, extract_page};
pub use quiescence::QuiescenceDetector;
pub use router::{classify, kind_from_content_type, route};
pub use scheduler::{Scheduler, SchedulerPhase};

use crate::config::{validate, Config};
use crate::output::CrawlStats;

/// Mirrors the configured site
///
/// This is the main entry point for a crawl. It will:
/// 1. Validate the configuration
/// 2. Build the HTTP client and the output store
/// 3. Fetch the seed page
/// 4. Follow every admitted reference exactly once
/// 5. Return the statistics once the crawl has gone quiet
///
/// # Arguments
///
/// * `config` - The crawl configuration
///
/// # Returns
///
/// * `Ok(CrawlStats)` - The crawl finished; failed URLs are counted in the stats
/// * `Err(MirrorError)` - The configuration is invalid or the client could not be built
pub async fn mirror(config: Config) -> crate::Result<CrawlStats> {
    validate(&config)?;
    let mut coordinator = Coordinator::new(config)?;
    Ok(coordinator.run().await)
}

//! State module for tracking crawl progress
//!
//! # Components
//!
//! - `ResourceKind`: What a URL is (page, css, javascript, image, other)
//! - `UrlRecord`: A queued URL with its kind, attempt counter and depth
//! - `CrawlState`: Queue, visited set, in-flight counters and stats of one run

mod crawl_state;
mod resource;

// Re-export main types
pub use crawl_state::CrawlState;
pub use resource::{ResourceKind, UrlRecord};

//! Site-Mirror: a single-host website mirroring crawler
//!
//! This crate starts from a seed page, discovers same-host pages, stylesheets,
//! scripts and images, downloads each of them exactly once into a local
//! directory tree, and stops once no work remains.

pub mod config;
pub mod crawler;
pub mod output;
pub mod state;
pub mod storage;
pub mod url;

use thiserror::Error;

/// Main error type for Site-Mirror operations
///
/// Per-URL failures never surface here; they are counted in the crawl
/// statistics instead. This type covers what can stop a crawl from starting.
#[derive(Debug, Error)]
pub enum MirrorError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid host in config: {0}")]
    InvalidHost(String),
}

/// Result type alias for Site-Mirror operations
pub type Result<T> = std::result::Result<T, MirrorError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{mirror, Coordinator};
pub use output::CrawlStats;
pub use state::{ResourceKind, UrlRecord};
pub use crate::url::{admit, Admission, AdmissionFilter};

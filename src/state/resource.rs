//! Resource kind definitions
//!
//! A kind decides where a resource is saved and which extractor, if any,
//! reads its body.

use serde::Serialize;
use std::fmt;

/// Classification of a mirrored resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    /// HTML document; saved as `index.html`, links extracted
    Page,

    /// Stylesheet; `url()` references extracted
    Css,

    /// Script; saved as-is
    Javascript,

    /// Image; saved as-is
    Image,

    /// Anything else, including anchors whose real kind is not known yet
    Other,
}

impl ResourceKind {
    /// Returns true if the caller-supplied kind may be overridden by the response content type
    pub fn is_ambiguous(&self) -> bool {
        matches!(self, Self::Page | Self::Other)
    }

    /// Returns true if bodies of this kind are parsed for further references
    pub fn is_extractable(&self) -> bool {
        matches!(self, Self::Page | Self::Css)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Page => "page",
            Self::Css => "css",
            Self::Javascript => "javascript",
            Self::Image => "image",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A URL waiting in, or taken from, the crawl queue
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlRecord {
    /// Canonical absolute URL
    pub url: String,

    /// Kind the URL was discovered as
    pub kind: ResourceKind,

    /// Number of fetch attempts made; never drives a retry
    pub attempts: u32,

    /// Hops from the seed page
    pub depth: u32,
}

impl UrlRecord {
    pub fn new(url: impl Into<String>, kind: ResourceKind, depth: u32) -> Self {
        Self {
            url: url.into(),
            kind,
            attempts: 0,
            depth,
        }
    }

    /// The record for the seed page
    pub fn seed(base_url: impl Into<String>) -> Self {
        Self::new(base_url, ResourceKind::Page, 0)
    }
}

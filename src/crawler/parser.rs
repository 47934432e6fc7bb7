//! HTML extractor
//!
//! Collects the references a page makes to other resources of the site:
//! - `<a href>` targets, always tagged `other` (the real kind is decided by
//!   the content type at fetch time)
//! - `<link href>` stylesheets, tagged `css`, when stylesheet downloading is on
//! - `<script src>` sources, tagged `javascript`, when script downloading is on
//! - `<img src>` sources, tagged `image`, when image downloading is on

use crate::config::DownloadConfig;
use crate::crawler::events::Enqueue;
use crate::state::ResourceKind;
use crate::url::AdmissionFilter;
use scraper::{Html, Selector};

/// Selector, attribute and tag for each reference family, in extraction order
const REFERENCE_SOURCES: &[(&str, &str, ResourceKind)] = &[
    ("a", "href", ResourceKind::Other),
    ("link", "href", ResourceKind::Css),
    ("script", "src", ResourceKind::Javascript),
    ("img", "src", ResourceKind::Image),
];

/// Extracts raw references from an HTML document
///
/// Empty attribute values are skipped. Order is all anchors, then stylesheets,
/// then scripts, then images, each in document order.
///
/// # Example
///
/// ```
/// use site_mirror::config::DownloadConfig;
/// use site_mirror::crawler::collect_page_references;
/// use site_mirror::ResourceKind;
///
/// let html = r#"<a href="/about">About</a><img src="logo.png">"#;
/// let refs = collect_page_references(html, &DownloadConfig::default());
/// assert_eq!(refs[0], ("/about".to_string(), ResourceKind::Other));
/// assert_eq!(refs[1], ("logo.png".to_string(), ResourceKind::Image));
/// ```
pub fn collect_page_references(
    html: &str,
    download: &DownloadConfig,
) -> Vec<(String, ResourceKind)> {
    let document = Html::parse_document(html);
    let mut references = Vec::new();

    for (selector, attribute, kind) in REFERENCE_SOURCES {
        if !is_enabled(*kind, download) {
            continue;
        }

        let Ok(selector) = Selector::parse(selector) else {
            continue;
        };

        for element in document.select(&selector) {
            if let Some(value) = element.value().attr(attribute) {
                if !value.is_empty() {
                    references.push((value.to_string(), *kind));
                }
            }
        }
    }

    references
}

fn is_enabled(kind: ResourceKind, download: &DownloadConfig) -> bool {
    match kind {
        ResourceKind::Css => download.css,
        ResourceKind::Javascript => download.javascript,
        ResourceKind::Image => download.images,
        ResourceKind::Page | ResourceKind::Other => true,
    }
}

/// Parses a page, admits its references and enqueues the accepted ones
///
/// Returns the number of references enqueued.
pub fn extract_page(
    html: &str,
    download: &DownloadConfig,
    filter: &AdmissionFilter,
    sink: &dyn Enqueue,
) -> usize {
    let mut enqueued = 0;
    for (reference, kind) in collect_page_references(html, download) {
        if let Some(canonical) = filter.accepted(&reference) {
            tracing::trace!("Discovered {} ({}) from {}", canonical, kind, reference);
            sink.enqueue(canonical, kind);
            enqueued += 1;
        }
    }
    enqueued
}

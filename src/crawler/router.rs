//! Content router
//!
//! Decides what a fetched resource really is and hands its body to the
//! matching extractor.

use crate::config::DownloadConfig;
use crate::crawler::css::extract_css;
use crate::crawler::events::Enqueue;
use crate::crawler::parser::extract_page;
use crate::state::ResourceKind;
use crate::url::AdmissionFilter;

/// Maps a declared content type onto a resource kind
///
/// Only the mime essence is compared (`text/html; charset=utf-8` is
/// `text/html`). Returns `None` for anything not recognized.
pub fn kind_from_content_type(content_type: &str) -> Option<ResourceKind> {
    let essence = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();

    match essence.as_str() {
        "text/html" => Some(ResourceKind::Page),
        "text/css" => Some(ResourceKind::Css),
        "text/javascript" | "application/javascript" | "application/x-javascript" => {
            Some(ResourceKind::Javascript)
        }
        e if e.starts_with("image/") => Some(ResourceKind::Image),
        _ => None,
    }
}

/// Chooses the kind a fetched resource is counted, saved and routed as
///
/// The requested kind wins unless it is ambiguous (`page` or `other`), in
/// which case a recognized content type overrides it.
///
/// # Examples
///
/// ```
/// use site_mirror::crawler::classify;
/// use site_mirror::ResourceKind;
///
/// assert_eq!(classify(ResourceKind::Other, Some("text/html")), ResourceKind::Page);
/// assert_eq!(classify(ResourceKind::Javascript, Some("text/html")), ResourceKind::Javascript);
/// assert_eq!(classify(ResourceKind::Other, None), ResourceKind::Other);
/// ```
pub fn classify(requested: ResourceKind, content_type: Option<&str>) -> ResourceKind {
    if !requested.is_ambiguous() {
        return requested;
    }

    content_type
        .and_then(kind_from_content_type)
        .unwrap_or(requested)
}

/// Routes a body to the extractor for `kind`
///
/// Returns the number of references enqueued; kinds without an extractor
/// enqueue nothing.
pub fn route(
    kind: ResourceKind,
    body: &[u8],
    download: &DownloadConfig,
    filter: &AdmissionFilter,
    sink: &dyn Enqueue,
) -> usize {
    match kind {
        ResourceKind::Page => extract_page(&String::from_utf8_lossy(body), download, filter, sink),
        ResourceKind::Css => extract_css(&String::from_utf8_lossy(body), filter, sink),
        ResourceKind::Javascript | ResourceKind::Image | ResourceKind::Other => 0,
    }
}

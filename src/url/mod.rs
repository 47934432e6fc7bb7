//! URL handling module for Site-Mirror
//!
//! This module decides which discovered references belong to the mirrored
//! site and rewrites them into canonical absolute URLs.

mod admission;
mod host;

// Re-export main functions
pub use admission::{admit, canonicalize, judge, Admission, AdmissionFilter, Verdict};
pub use host::is_standalone_host;

use std::path::PathBuf;

/// Maps a canonical URL onto a path relative to the output root
///
/// The base URL prefix is removed and the remaining path is split into
/// segments; query strings and fragments never reach the filesystem. Pages are
/// stored as `<path>/index.html`; other resources whose path names a directory
/// are stored as `<path>/index`.
///
/// Segments equal to `..` or `.` are dropped so a mirror can never write
/// outside its root.
///
/// # Examples
///
/// ```
/// use site_mirror::url::local_path;
/// use std::path::PathBuf;
///
/// let base = "http://example.com/";
/// assert_eq!(
///     local_path("http://example.com/", base, true),
///     PathBuf::from("index.html")
/// );
/// assert_eq!(
///     local_path("http://example.com/css/site.css", base, false),
///     PathBuf::from("css/site.css")
/// );
/// ```
pub fn local_path(canonical_url: &str, base_url: &str, is_page: bool) -> PathBuf {
    let rest = canonical_url.strip_prefix(base_url).unwrap_or(canonical_url);
    let rest = rest.split(['?', '#']).next().unwrap_or_default();

    let mut path = PathBuf::new();
    for segment in rest.split('/') {
        if segment.is_empty() || segment == "." || segment == ".." {
            continue;
        }
        path.push(segment);
    }

    if is_page {
        path.push("index.html");
    } else if path.as_os_str().is_empty() || rest.ends_with('/') {
        path.push("index");
    }

    path
}

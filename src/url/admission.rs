//! Admission filter for discovered references
//!
//! Every reference an extractor finds is run through [`admit`] before it can
//! enter the crawl queue. The scope test is a substring heuristic rather than
//! a URL parser:
//!
//! - it over-admits when the crawl host is a substring of a foreign URL
//!   (`https://example.com.evil.org/`, `https://other.com/?ref=example.com`)
//!   and for protocol-relative references (`//cdn.other.com/x`);
//! - it under-admits when a relative path starts with something that reads as
//!   a host (`docs.io/guide`).
//!
//! Both are kept on purpose so mirrors stay comparable with earlier runs of
//! the same policy.

use crate::url::host::is_standalone_host;

/// Schemes that can never be fetched
const UNFETCHABLE_SCHEMES: &[&str] = &["mailto:", "tel:"];

/// Outcome of an admission decision
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Admission {
    /// Whether the reference is in scope
    pub accept: bool,

    /// Canonical absolute URL under the crawl's base URL
    pub canonical_url: String,
}

/// Why a reference was rejected, or which rule admitted it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    UnfetchableScheme,
    ForeignAbsolute,
    SameHostAbsolute,
    BareForeignHost,
    Subdomain,
    DotRelative,
    HostRelative,
}

impl Verdict {
    pub fn is_accepted(&self) -> bool {
        matches!(
            self,
            Self::SameHostAbsolute | Self::DotRelative | Self::HostRelative
        )
    }
}

/// Decides whether `raw` is in scope for a crawl of `crawl_host` rooted at `base_url`
///
/// Rules are applied in order, first match wins:
///
/// 1. contains `mailto:` or `tel:` → reject
/// 2. contains `http://` or `https://` → accept only if `crawl_host` occurs anywhere in it
/// 3. first path segment reads as a standalone host → reject
/// 4. `crawl_host` occurs, but not at position 0 → reject
/// 5. starts with `./` → drop the leading dot, accept
/// 6. otherwise accept as a host-relative path
///
/// The canonical URL is computed for rejected references too, which keeps
/// logging uniform.
///
/// # Examples
///
/// ```
/// use site_mirror::url::admit;
///
/// let a = admit("./sub/page", "example.com", "http://example.com/");
/// assert!(a.accept);
/// assert_eq!(a.canonical_url, "http://example.com/sub/page");
///
/// assert!(!admit("https://other.com/a", "example.com", "http://example.com/").accept);
/// ```
pub fn admit(raw: &str, crawl_host: &str, base_url: &str) -> Admission {
    let (verdict, reference) = judge(raw, crawl_host);
    Admission {
        accept: verdict.is_accepted(),
        canonical_url: canonicalize(reference, crawl_host, base_url),
    }
}

/// Applies the ordered rules and returns the verdict plus the reference to canonicalize
pub fn judge<'a>(raw: &'a str, crawl_host: &str) -> (Verdict, &'a str) {
    if UNFETCHABLE_SCHEMES.iter().any(|s| raw.contains(s)) {
        return (Verdict::UnfetchableScheme, raw);
    }

    if raw.contains("http://") || raw.contains("https://") {
        let verdict = if raw.contains(crawl_host) {
            Verdict::SameHostAbsolute
        } else {
            Verdict::ForeignAbsolute
        };
        return (verdict, raw);
    }

    let first_segment = raw.split('/').next().unwrap_or_default();
    if is_standalone_host(first_segment) {
        return (Verdict::BareForeignHost, raw);
    }

    if let Some(pos) = raw.find(crawl_host) {
        if pos != 0 {
            return (Verdict::Subdomain, raw);
        }
    }

    if raw.len() > 2 {
        if let Some(rest) = raw.strip_prefix('.').filter(|r| r.starts_with('/')) {
            return (Verdict::DotRelative, rest);
        }
    }

    (Verdict::HostRelative, raw)
}

/// Rewrites a reference into an absolute URL under `base_url`
///
/// Strips an existing base-URL prefix, any `http://`/`https://` prefix, a
/// leading crawl-host prefix and one leading `/`, then prepends `base_url`.
pub fn canonicalize(reference: &str, crawl_host: &str, base_url: &str) -> String {
    let mut path = reference.strip_prefix(base_url).unwrap_or(reference);
    path = path
        .strip_prefix("http://")
        .or_else(|| path.strip_prefix("https://"))
        .unwrap_or(path);
    path = path.strip_prefix(crawl_host).unwrap_or(path);
    path = path.strip_prefix('/').unwrap_or(path);

    format!("{}{}", base_url, path)
}

/// Admission filter bound to one crawl
///
/// Cheap to clone; extractors running on worker tasks each hold a copy.
#[derive(Debug, Clone)]
pub struct AdmissionFilter {
    host: String,
    base_url: String,
}

impl AdmissionFilter {
    pub fn new(host: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            base_url: base_url.into(),
        }
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Runs [`admit`] for this crawl
    pub fn admit(&self, raw: &str) -> Admission {
        admit(raw, &self.host, &self.base_url)
    }

    /// Canonical URL of an accepted reference, `None` when rejected
    pub fn accepted(&self, raw: &str) -> Option<String> {
        let admission = self.admit(raw);
        if admission.accept {
            Some(admission.canonical_url)
        } else {
            tracing::trace!("Rejected reference {}", raw);
            None
        }
    }
}

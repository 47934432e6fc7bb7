use url::{Host, Url};

/// Checks whether `segment` reads as a standalone host once `http://` is put in front of it
///
/// Accepts IP addresses and domains with at least two well-formed labels whose
/// public suffix is listed in the Public Suffix List. A port suffix is
/// allowed. File names such as `style.css` or `data.csv` fail the suffix
/// lookup and stay relative references.
///
/// # Examples
///
/// ```
/// use site_mirror::url::is_standalone_host;
///
/// assert!(is_standalone_host("other.com"));
/// assert!(is_standalone_host("cdn.other.com:8080"));
/// assert!(is_standalone_host("10.0.0.1"));
///
/// assert!(!is_standalone_host(""));
/// assert!(!is_standalone_host("about"));
/// assert!(!is_standalone_host("style.css"));
/// assert!(!is_standalone_host("data.csv"));
/// assert!(!is_standalone_host("."));
/// ```
pub fn is_standalone_host(segment: &str) -> bool {
    if segment.is_empty() {
        return false;
    }

    let parsed = match Url::parse(&format!("http://{}", segment)) {
        Ok(url) => url,
        Err(_) => return false,
    };

    match parsed.host() {
        Some(Host::Ipv4(_)) | Some(Host::Ipv6(_)) => true,
        Some(Host::Domain(domain)) => is_registered_domain(domain),
        None => false,
    }
}

fn is_registered_domain(domain: &str) -> bool {
    let labels: Vec<&str> = domain.split('.').collect();
    if labels.len() < 2 {
        return false;
    }

    let labels_ok = labels.iter().all(|label| {
        !label.is_empty()
            && !label.starts_with('-')
            && !label.ends_with('-')
            && label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
    });
    if !labels_ok {
        return false;
    }

    psl::domain(domain.as_bytes()).map_or(false, |registrable| registrable.suffix().is_known())
}

//! Domain-name normalization (the competitor deduplication key).

use url::Url;

/// Normalize a URL (or bare host) into a deduplication key.
///
/// Lower-cases the host, strips `www.`, user info, port, path, query and
/// fragment. Internationalized hosts come back in their ASCII (punycode) form.
/// Returns `None` when no plausible host remains.
pub fn normalize_domain(url: &str) -> Option<String> {
    let trimmed = url.trim();
    let parsed = if trimmed.contains("://") {
        Url::parse(trimmed)
    } else {
        Url::parse(&format!("http://{trimmed}"))
    }
    .ok()?;

    let host = parsed.host_str()?.trim_end_matches('.');
    let host = host.strip_prefix("www.").unwrap_or(host);
    (host.contains('.') && !host.starts_with('.')).then(|| host.to_string())
}

/// `true` for absolute `http`/`https` URLs with a usable host.
pub fn is_http_url(url: &str) -> bool {
    Url::parse(url.trim())
        .is_ok_and(|u| matches!(u.scheme(), "http" | "https"))
        && normalize_domain(url).is_some()
}

//! URL utility functions.
//!
//! Resolution of relative `href`/`src` values against the page URL, plus
//! discovery of the page URL from markers left in saved pages.

use std::sync::LazyLock;

use regex::Regex;
use url::Url;

/// Schemes that never get resolved against a base URL.
const OPAQUE_SCHEMES: &[&str] = &["data:", "javascript:", "mailto:", "tel:"];

/// Browsers prefix saved pages with `<!-- saved from url=(0076)https://... -->`.
#[allow(clippy::expect_used)]
static SAVED_FROM_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)<!--\s*saved from url=\(\d+\)(https?://[^\s>]+?)\s*-->").expect("SAVED_FROM_URL regex")
});

/// Check if a string is an absolute http(s) URL with a host.
#[must_use]
pub fn is_absolute_url(s: &str) -> bool {
    let s = s.trim();
    if !s.starts_with("http://") && !s.starts_with("https://") {
        return false;
    }
    Url::parse(s).is_ok_and(|url| url.host().is_some())
}

/// Returns true for `#anchor` style references into the same page.
#[must_use]
pub fn is_fragment_only(href: &str) -> bool {
    href.trim_start().starts_with('#')
}

/// Returns true for `data:`, `javascript:`, `mailto:` and `tel:` URLs.
#[must_use]
pub fn is_opaque(href: &str) -> bool {
    let lower = href.trim_start().to_ascii_lowercase();
    OPAQUE_SCHEMES.iter().any(|scheme| lower.starts_with(scheme))
}

/// Parse a base URL, accepting only absolute http(s) URLs.
#[must_use]
pub fn parse_base(base: &str) -> Option<Url> {
    let base = base.trim();
    if !is_absolute_url(base) {
        return None;
    }
    Url::parse(base).ok()
}

/// Resolve an `href`/`src` value against `base`.
///
/// Absolute, fragment-only and opaque URLs are returned unchanged (trimmed).
/// Without a base, relative URLs are returned unchanged too.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use webpage_to_llm::url_utils::resolve;
///
/// let base = Url::parse("https://e.com/blog/post").ok();
/// assert_eq!(resolve("/a.png", base.as_ref()), "https://e.com/a.png");
/// assert_eq!(resolve("img/b.png", base.as_ref()), "https://e.com/blog/img/b.png");
/// assert_eq!(resolve("#top", base.as_ref()), "#top");
/// ```
#[must_use]
pub fn resolve(value: &str, base: Option<&Url>) -> String {
    let value = value.trim();

    if value.is_empty() || is_fragment_only(value) || is_opaque(value) {
        return value.to_string();
    }

    // Any parseable URL with its own scheme is already absolute
    if Url::parse(value).is_ok() {
        return value.to_string();
    }

    match base.map(|b| b.join(value)) {
        Some(Ok(resolved)) => resolved.to_string(),
        _ => value.to_string(),
    }
}

/// Find the original URL recorded in a saved page's marker comment.
#[must_use]
pub fn saved_from_url(html: &str) -> Option<Url> {
    SAVED_FROM_URL
        .captures(html)
        .and_then(|c| c.get(1))
        .and_then(|m| parse_base(m.as_str()))
}

/// Extract hostname from URL for metadata.
#[must_use]
pub fn extract_hostname(url_str: &str) -> Option<String> {
    parse_base(url_str).and_then(|url| url.host_str().map(str::to_string))
}

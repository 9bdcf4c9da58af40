//! HTML normalization.
//!
//! Turns raw markup into a `dom_query` document whose links and image
//! sources are absolute. Parsing itself never fails: html5ever repairs
//! broken markup, and the repairs we can detect cheaply are reported as
//! [`ParseWarning`]s.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, trace};
use url::Url;

use crate::dom::{self, Document, Selection};
use crate::encoding;
use crate::error::{ParseWarning, Result};
use crate::url_utils;

/// Elements that never have a closing tag.
const VOID_TAGS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param",
    "source", "track", "wbr",
];

/// Elements whose closing tag the HTML grammar lets authors omit.
const OPTIONAL_CLOSE_TAGS: &[&str] = &[
    "html", "head", "body", "p", "li", "dt", "dd", "tr", "td", "th", "thead", "tbody",
    "tfoot", "option", "optgroup", "colgroup", "caption", "rb", "rt", "rp",
];

/// Attributes that carry a URL we rewrite.
const URL_ATTRIBUTES: &[&str] = &["href", "src"];

/// Attributes lazy-loading scripts use to hold the real image URL.
const LAZY_SRC_ATTRIBUTES: &[&str] = &["data-src", "data-original", "data-lazy-src"];

/// Comments, scripts and styles hide `<` characters that are not tags.
#[allow(clippy::expect_used)]
static OPAQUE_SPANS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<!--.*?-->|<script\b.*?</script\s*>|<style\b.*?</style\s*>|<!\[CDATA\[.*?\]\]>")
        .expect("OPAQUE_SPANS regex")
});

#[allow(clippy::expect_used)]
static TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"<(/?)([A-Za-z][A-Za-z0-9-]*)[^>]*?(/?)>").expect("TAG regex")
});

/// A parsed document ready for noise filtering.
pub struct NormalizedDocument {
    /// The parsed tree with URLs resolved.
    pub document: Document,
    /// The base URL links were resolved against, if one was known.
    pub base_url: Option<Url>,
    /// Malformed-markup diagnostics.
    pub warnings: Vec<ParseWarning>,
}

/// Parse HTML text and resolve its URLs against `base_url`.
///
/// An empty `base_url` means "unknown": the document's `<base href>` or a
/// saved-page marker comment is used when present.
///
/// # Errors
///
/// Returns [`crate::Error::EmptyInput`] for empty, whitespace-only or binary input.
pub fn normalize(raw_html: &str, base_url: &str) -> Result<NormalizedDocument> {
    encoding::ensure_text(raw_html)?;

    let mut warnings = scan_markup(raw_html);
    let document = dom::parse(raw_html);

    let base = if base_url.trim().is_empty() {
        discover_base(&document, raw_html)
    } else {
        let parsed = url_utils::parse_base(base_url);
        if parsed.is_none() {
            warnings.push(ParseWarning::new(format!(
                "base URL `{}` is not an absolute http(s) URL; relative links were left as-is",
                base_url.trim()
            )));
        }
        parsed
    };

    promote_lazy_images(&document);
    let rewritten = resolve_urls(&document, base.as_ref());
    debug!(
        base = base.as_ref().map(Url::as_str),
        rewritten,
        warnings = warnings.len(),
        "normalized document"
    );

    Ok(NormalizedDocument {
        document,
        base_url: base,
        warnings,
    })
}

/// Decode raw bytes (sniffing the charset) and normalize them.
///
/// # Errors
///
/// Returns [`crate::Error::EmptyInput`] for empty, whitespace-only or binary input.
pub fn normalize_bytes(raw_html: &[u8], base_url: &str) -> Result<NormalizedDocument> {
    let text = encoding::decode(raw_html)?;
    normalize(&text, base_url)
}

/// Base URL from `<base href>`, falling back to a saved-page marker.
fn discover_base(document: &Document, raw_html: &str) -> Option<Url> {
    document
        .select("base[href]")
        .attr("href")
        .and_then(|href| url_utils::parse_base(&href))
        .or_else(|| url_utils::saved_from_url(raw_html))
}

/// Copy lazy-loading attributes into `src` when `src` is missing or a placeholder.
fn promote_lazy_images(document: &Document) {
    for img in document.select("img").iter() {
        let src = dom::non_empty_attribute(&img, "src");
        if src.as_deref().is_some_and(|s| !s.starts_with("data:")) {
            continue;
        }
        if let Some(lazy) = LAZY_SRC_ATTRIBUTES
            .iter()
            .find_map(|name| dom::non_empty_attribute(&img, name))
        {
            img.set_attr("src", &lazy);
        }
    }
}

/// Rewrite relative `href`/`src` values. Returns how many were changed.
fn resolve_urls(document: &Document, base: Option<&Url>) -> usize {
    let Some(base) = base else {
        return 0;
    };

    let mut rewritten = 0;
    for node in document.select("[href], [src]").nodes() {
        let sel = Selection::from(*node);
        for name in URL_ATTRIBUTES {
            let Some(value) = sel.attr(name) else {
                continue;
            };
            let resolved = url_utils::resolve(&value, Some(base));
            if resolved != &*value {
                trace!(from = %value, to = %resolved, "resolved URL");
                sel.set_attr(name, &resolved);
                rewritten += 1;
            }
        }
    }
    rewritten
}

/// Count opening and closing tags and report elements that do not balance.
///
/// Void elements and elements with optional end tags are ignored; html5ever
/// handles those by design and they are not authoring mistakes.
#[must_use]
pub fn scan_markup(raw_html: &str) -> Vec<ParseWarning> {
    let visible = OPAQUE_SPANS.replace_all(raw_html, " ");

    // tag -> (opened, closed); BTreeMap keeps the report order stable
    let mut counts: BTreeMap<String, (usize, usize)> = BTreeMap::new();
    for caps in TAG.captures_iter(&visible) {
        let closing = !caps[1].is_empty();
        let self_closing = !caps[3].is_empty();
        let tag = caps[2].to_ascii_lowercase();
        if self_closing || VOID_TAGS.contains(&tag.as_str()) || OPTIONAL_CLOSE_TAGS.contains(&tag.as_str()) {
            continue;
        }
        let entry = counts.entry(tag).or_default();
        if closing {
            entry.1 += 1;
        } else {
            entry.0 += 1;
        }
    }

    counts
        .into_iter()
        .filter(|(_, (opened, closed))| opened != closed)
        .map(|(tag, (opened, closed))| {
            ParseWarning::new(format!(
                "unbalanced <{tag}>: {opened} opened, {closed} closed"
            ))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    #[test]
    fn rejects_empty_input() {
        assert!(matches!(normalize("", "https://e.com"), Err(Error::EmptyInput)));
        assert!(matches!(normalize(" \n ", "https://e.com"), Err(Error::EmptyInput)));
        assert!(matches!(normalize_bytes(b"", ""), Err(Error::EmptyInput)));
    }

    #[test]
    fn resolves_relative_urls() {
        let html = r##"<body><a href="/about">About</a><a href="#top">Top</a><img src="/a.png"><a href="https://x.org/">X</a></body>"##;
        let normalized = normalize(html, "https://e.com/blog/").ok();
        let Some(normalized) = normalized else {
            panic!("normalize failed");
        };
        let doc = &normalized.document;
        let hrefs: Vec<String> = doc.select("a").iter().filter_map(|a| dom::get_attribute(&a, "href")).collect();
        assert_eq!(hrefs, vec!["https://e.com/about", "#top", "https://x.org/"]);
        assert_eq!(dom::get_attribute(&doc.select("img"), "src"), Some("https://e.com/a.png".to_string()));
    }

    #[test]
    fn uses_base_element_when_no_base_given() {
        let html = r#"<html><head><base href="https://docs.e.com/v2/"></head><body><a href="intro">i</a></body></html>"#;
        let normalized = normalize(html, "").ok();
        let href = normalized.as_ref().and_then(|n| dom::get_attribute(&n.document.select("a"), "href"));
        assert_eq!(href, Some("https://docs.e.com/v2/intro".to_string()));
    }

    #[test]
    fn uses_saved_from_marker_when_no_base_given() {
        let html = "<!-- saved from url=(0022)https://e.com/post/1 -->\n<html><body><img src=\"pic.jpg\"></body></html>";
        let normalized = normalize(html, "").ok();
        let src = normalized.as_ref().and_then(|n| dom::get_attribute(&n.document.select("img"), "src"));
        assert_eq!(src, Some("https://e.com/post/pic.jpg".to_string()));
    }

    #[test]
    fn invalid_base_url_is_a_warning() {
        let normalized = normalize("<p><a href=\"/x\">x</a></p>", "not a url").ok();
        let Some(normalized) = normalized else {
            panic!("normalize failed");
        };
        assert!(normalized.base_url.is_none());
        assert!(normalized.warnings.iter().any(|w| w.message.contains("base URL")));
        assert_eq!(dom::get_attribute(&normalized.document.select("a"), "href"), Some("/x".to_string()));
    }

    #[test]
    fn promotes_lazy_image_sources() {
        let html = r#"<img src="data:image/gif;base64,R0lGOD" data-src="/real.jpg"><img data-original="/other.jpg">"#;
        let normalized = normalize(html, "https://e.com").ok();
        let srcs: Vec<String> = normalized
            .map(|n| n.document.select("img").iter().filter_map(|i| dom::get_attribute(&i, "src")).collect())
            .unwrap_or_default();
        assert_eq!(srcs, vec!["https://e.com/real.jpg", "https://e.com/other.jpg"]);
    }

    #[test]
    fn malformed_markup_parses_with_warnings() {
        let normalized = normalize("<div><span>open<div>nested</body>", "https://e.com").ok();
        let Some(normalized) = normalized else {
            panic!("malformed HTML must not fail");
        };
        assert!(normalized.document.select("span").exists());
        let messages: Vec<&str> = normalized.warnings.iter().map(|w| w.message.as_str()).collect();
        assert!(messages.iter().any(|m| m.contains("<div>")), "got {messages:?}");
        assert!(messages.iter().any(|m| m.contains("<span>")), "got {messages:?}");
    }

    #[test]
    fn scan_ignores_void_optional_and_script_content() {
        let html = "<p>one<p>two<br><img src=x><script>if (a < b) { x = '<div>'; }</script><!-- <section> -->";
        assert!(scan_markup(html).is_empty());
    }

    #[test]
    fn scan_reports_stray_closing_tags() {
        let warnings = scan_markup("<div>a</div></div>");
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].message, "unbalanced <div>: 1 opened, 2 closed");
    }
}

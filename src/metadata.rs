//! Page metadata.
//!
//! Reads the document `<title>` and the common meta tags (plain, Open Graph,
//! Twitter, Dublin Core) so the post-processor can print a source header.
//! Runs on the normalized document, before noise filtering.

use serde::Serialize;
use url::Url;

use crate::dom::{self, Document, Selection};
use crate::url_utils;

/// Metadata extracted from an HTML document.
///
/// All fields are optional as metadata may not be present in all documents.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PageMetadata {
    /// Text of the `<title>` element, falling back to `og:title`.
    pub title: Option<String>,

    /// Page description (meta description).
    pub description: Option<String>,

    /// Site name (e.g., "The Rust Blog").
    pub site_name: Option<String>,

    /// Canonical URL of the page, falling back to the base URL.
    pub url: Option<String>,

    /// Hostname extracted from `url`.
    pub hostname: Option<String>,

    /// Primary language subtag, lowercase (ISO 639-1 when the page uses it).
    pub language: Option<String>,
}

/// Extract metadata from a document.
#[must_use]
pub fn extract(doc: &Document, base_url: Option<&Url>) -> PageMetadata {
    let mut result = PageMetadata {
        title: document_title(doc),
        ..PageMetadata::default()
    };

    for node in doc.select("meta").nodes() {
        let meta = Selection::from(*node);

        let name = dom::get_attribute(&meta, "name")
            .or_else(|| dom::get_attribute(&meta, "property"))
            .or_else(|| dom::get_attribute(&meta, "itemprop"))
            .unwrap_or_default()
            .to_lowercase();
        let Some(content) = dom::non_empty_attribute(&meta, "content") else {
            continue;
        };

        let slot = match name.as_str() {
            "og:title" | "twitter:title" | "dc.title" => &mut result.title,
            "description" | "og:description" | "twitter:description" | "dc.description" => {
                &mut result.description
            }
            "og:site_name" | "application-name" | "twitter:site" | "dc.publisher" => {
                &mut result.site_name
            }
            "og:url" | "twitter:url" => &mut result.url,
            "og:locale" | "language" | "dc.language" | "content-language" => &mut result.language,
            _ => continue,
        };
        if slot.is_none() {
            *slot = Some(dom::collapse_whitespace(&content).trim().to_string());
        }
    }

    if let Some(canonical) = dom::non_empty_attribute(&doc.select(r#"link[rel="canonical"]"#), "href") {
        if url_utils::is_absolute_url(&canonical) {
            result.url = Some(canonical);
        }
    }
    if result.url.is_none() {
        result.url = base_url.map(ToString::to_string);
    }
    result.hostname = result.url.as_deref().and_then(url_utils::extract_hostname);

    if result.language.is_none() {
        result.language = dom::non_empty_attribute(&doc.select("html"), "lang");
    }
    result.language = result.language.as_deref().and_then(primary_language);

    result
}

/// Text of the document's `<title>`, whitespace-collapsed.
#[must_use]
pub fn document_title(doc: &Document) -> Option<String> {
    let title = doc.select("title");
    let text = dom::normalized_text(&title.first());
    (!text.is_empty()).then_some(text)
}

/// `en-US` / `en_US` -> `en`
fn primary_language(tag: &str) -> Option<String> {
    tag.split(['-', '_'])
        .next()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_lowercase)
}

//! Result types for conversion output.
//!
//! This module defines the structured output of [`crate::convert`]: the
//! final Markdown plus what was learned about the page along the way.

use serde::Serialize;

use crate::error::ParseWarning;
use crate::metadata::PageMetadata;

/// Result of converting an HTML document.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Conversion {
    /// Final Markdown, post-processed (title heading, optional header,
    /// truncation).
    pub markdown: String,

    /// Title chosen for the document; empty when none was found.
    pub title: String,

    /// Name of the strategy whose fragment was rendered
    /// (`"precision"` or `"structural"`).
    pub strategy: &'static str,

    /// Visible text length of the selected fragment.
    pub fragment_text_len: usize,

    /// Whether `markdown` was cut to honor `max_length`.
    pub truncated: bool,

    /// Page metadata (description, canonical URL, language...).
    pub metadata: PageMetadata,

    /// Malformed-markup diagnostics.
    ///
    /// Non-fatal issues that occurred while parsing, such as unbalanced
    /// tags or an unusable base URL.
    pub warnings: Vec<ParseWarning>,
}

impl Conversion {
    /// Serialize to pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns the serializer error; with these field types it does not
    /// occur in practice.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

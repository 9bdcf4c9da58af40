//! Configuration options for conversion.
//!
//! The `Options` struct controls the whole pipeline: which extraction method
//! runs, how URLs are resolved, what the renderer emits and how the output is
//! post-processed. Component thresholds live in their own config structs and
//! are handed to each component when it is constructed.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::filter::FilterConfig;
use crate::strategy::precision::PrecisionConfig;
use crate::strategy::structural::StructuralConfig;

/// Which extraction strategy (or chain of strategies) to run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Method {
    /// Precision first, structural as fallback.
    #[default]
    Auto,
    /// Content-density scoring only.
    Precision,
    /// Container-pattern walk only.
    Structural,
}

impl Method {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Auto => "auto",
            Self::Precision => "precision",
            Self::Structural => "structural",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a method name is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown extraction method `{0}` (expected auto, precision or structural)")]
pub struct UnknownMethod(pub String);

impl FromStr for Method {
    type Err = UnknownMethod;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            // "trafilatura" and "beautifulsoup" are the backend names older
            // scripts used for the same two strategies.
            "precision" | "trafilatura" => Ok(Self::Precision),
            "structural" | "beautifulsoup" => Ok(Self::Structural),
            _ => Err(UnknownMethod(s.to_string())),
        }
    }
}

/// Configuration options for conversion.
///
/// All fields are public for easy configuration. Use `Default::default()`
/// for standard settings.
///
/// # Example
///
/// ```rust
/// use webpage_to_llm::{Method, Options};
///
/// let options = Options {
///     method: Method::Structural,
///     max_length: Some(4_000),
///     ..Options::default()
/// };
/// assert!(options.include_links);
/// ```
#[derive(Debug, Clone)]
#[allow(clippy::struct_excessive_bools)]
pub struct Options {
    /// Extraction method.
    ///
    /// Default: `Method::Auto`
    pub method: Method,

    /// URL the page was loaded from, used to absolutize relative links.
    ///
    /// When `None`, the document's `<base href>` or a saved-page marker
    /// comment is used if present.
    ///
    /// Default: `None`
    pub base_url: Option<String>,

    /// Maximum output length in characters (excluding the truncation marker).
    ///
    /// Default: `None`
    pub max_length: Option<usize>,

    /// Prepend the page title as an `h1` heading.
    ///
    /// Default: `true`
    pub include_title: bool,

    /// Add `Source:` / `Description:` lines under the title.
    ///
    /// Default: `false`
    pub include_metadata_header: bool,

    /// Render `<a>` elements as markdown links (otherwise bare text).
    ///
    /// Default: `true`
    pub include_links: bool,

    /// Render `<img>` elements.
    ///
    /// Default: `true`
    pub include_images: bool,

    /// Render tables as pipe tables (otherwise they are dropped).
    ///
    /// Default: `true`
    pub include_tables: bool,

    /// Drop paragraphs whose text already appeared earlier in the output.
    ///
    /// Default: `false`
    pub deduplicate: bool,

    /// Minimum fragment text length for a non-final strategy in
    /// `Method::Auto` to be accepted.
    ///
    /// Default: `100`
    pub min_accept_len: usize,

    /// Maximum element nesting the renderer walks structurally; deeper
    /// subtrees are rendered as plain text.
    ///
    /// Default: `512`
    pub max_tree_depth: usize,

    /// Noise filter denylists.
    pub filter: FilterConfig,

    /// Content-density strategy thresholds.
    pub precision: PrecisionConfig,

    /// Container-pattern strategy thresholds.
    pub structural: StructuralConfig,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            method: Method::Auto,
            base_url: None,
            max_length: None,
            include_title: true,
            include_metadata_header: false,
            include_links: true,
            include_images: true,
            include_tables: true,
            deduplicate: false,
            min_accept_len: 100,
            max_tree_depth: 512,
            filter: FilterConfig::default(),
            precision: PrecisionConfig::default(),
            structural: StructuralConfig::default(),
        }
    }
}

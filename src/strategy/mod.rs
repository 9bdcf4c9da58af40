//! Extraction strategies
//!
//! A strategy looks at a filtered document and picks the subtree that holds
//! the page's main content. Strategies never fail loudly: finding nothing is
//! reported as `success == false`, which tells the selector to move on.

use std::fmt;

use dom_query::{Document, Selection};

use crate::dom;
use crate::metadata;

pub mod precision;
pub mod structural;

pub use precision::{PrecisionConfig, PrecisionStrategy};
pub use structural::{StructuralConfig, StructuralStrategy};

/// The subtree chosen as main content.
#[derive(Clone)]
pub struct ContentFragment<'a> {
    /// Root element of the fragment; a view into the document.
    pub root: Selection<'a>,
    /// Strategy-specific confidence, only meaningful for comparisons within
    /// one strategy.
    pub score: f64,
    /// Visible text length (characters, whitespace excluded).
    pub text_len: usize,
}

impl<'a> ContentFragment<'a> {
    #[must_use]
    pub fn new(root: Selection<'a>, score: f64) -> Self {
        let text_len = dom::text_len(&root);
        Self { root, score, text_len }
    }

    /// Lowercase tag name of the fragment root.
    #[must_use]
    pub fn tag(&self) -> String {
        dom::tag_name(&self.root).unwrap_or_default()
    }
}

impl fmt::Debug for ContentFragment<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContentFragment")
            .field("tag", &self.tag())
            .field("id_class", &dom::id_and_class(&self.root))
            .field("score", &self.score)
            .field("text_len", &self.text_len)
            .finish()
    }
}

/// Outcome of one strategy invocation.
#[derive(Debug, Clone)]
pub struct ExtractionResult<'a> {
    pub fragment: Option<ContentFragment<'a>>,
    pub title: String,
    pub strategy_name: &'static str,
    pub success: bool,
}

impl<'a> ExtractionResult<'a> {
    /// A successful result; the title is derived from the fragment.
    #[must_use]
    pub fn found(strategy_name: &'static str, doc: &'a Document, fragment: ContentFragment<'a>) -> Self {
        let title = extract_title(doc, Some(&fragment.root));
        Self {
            fragment: Some(fragment),
            title,
            strategy_name,
            success: true,
        }
    }

    /// An unsuccessful result; the title still falls back to `<title>`.
    #[must_use]
    pub fn not_found(strategy_name: &'static str, doc: &'a Document) -> Self {
        Self {
            fragment: None,
            title: extract_title(doc, None),
            strategy_name,
            success: false,
        }
    }

    /// Text length of the fragment, zero when there is none.
    #[must_use]
    pub fn text_len(&self) -> usize {
        self.fragment.as_ref().map_or(0, |f| f.text_len)
    }
}

/// An algorithm for locating the main content of a document.
pub trait Strategy {
    /// Stable name used in logs and results.
    fn name(&self) -> &'static str;

    /// Smallest text length this strategy will report success for.
    fn min_text_len(&self) -> usize;

    /// Locate the main content. Must be deterministic.
    fn extract<'a>(&self, doc: &'a Document) -> ExtractionResult<'a>;
}

/// First `<h1>` inside the fragment, else the document `<title>`, else "".
#[must_use]
pub fn extract_title(doc: &Document, fragment: Option<&Selection>) -> String {
    let from_heading = fragment
        .map(|root| {
            let heading = if dom::tag_name(root).as_deref() == Some("h1") {
                root.clone()
            } else {
                root.select("h1").first()
            };
            dom::normalized_text(&heading)
        })
        .filter(|text| !text.is_empty());

    from_heading
        .or_else(|| metadata::document_title(doc))
        .unwrap_or_default()
}

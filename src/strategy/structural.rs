//! Structural strategy: find the content container by markup conventions.
//!
//! Tiers are tried in order and the first tier with an acceptable match
//! wins: semantic landmarks, well-known content classes, then the largest
//! block of text.

use dom_query::{Document, Selection};
use tracing::debug;

use super::{ContentFragment, ExtractionResult, Strategy};
use crate::dom;

/// Landmark elements that mark main content.
pub const SEMANTIC_SELECTORS: &[&str] = &["article", "main", r#"[role="main"]"#, r#"[role="article"]"#];

/// Class and id conventions used by CMSs, doc generators and blog engines.
pub const DEFAULT_CONTENT_SELECTORS: &[&str] = &[
    ".main-content",
    "#main-content",
    ".content",
    "#content",
    ".post-content",
    ".entry-content",
    ".article-body",
    ".article-content",
    ".docs-content",
    ".documentation-content",
    ".doc-content",
    ".page-content",
    ".markdown-body",
    r#"[class*="MarkdownContent"]"#,
    r#"[class*="TechDocsContent"]"#,
];

/// Text that, near the start of a block, marks a consent or login prompt.
pub const DEFAULT_SKIP_PREFIXES: &[&str] = &["Cookie", "Accept", "Login", "Sign in"];

/// How many leading characters are checked for skip prefixes.
const SKIP_WINDOW: usize = 100;

/// Tuning for [`StructuralStrategy`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructuralConfig {
    /// Minimum text length for content-class and largest-block matches.
    ///
    /// Default: `50`
    pub min_text_len: usize,

    /// Minimum text length for semantic landmarks. Landmarks are trusted, so
    /// any visible text is enough.
    ///
    /// Default: `1`
    pub min_semantic_text_len: usize,

    /// CSS selectors for the content-class tier.
    pub content_selectors: Vec<String>,

    /// Blocks mentioning one of these near their start are skipped by the
    /// largest-block tier. Case-sensitive.
    pub skip_prefixes: Vec<String>,
}

impl Default for StructuralConfig {
    fn default() -> Self {
        Self {
            min_text_len: 50,
            min_semantic_text_len: 1,
            content_selectors: DEFAULT_CONTENT_SELECTORS.iter().map(|s| (*s).to_string()).collect(),
            skip_prefixes: DEFAULT_SKIP_PREFIXES.iter().map(|s| (*s).to_string()).collect(),
        }
    }
}

/// Container-convention extraction.
#[derive(Debug, Clone, Default)]
pub struct StructuralStrategy {
    config: StructuralConfig,
}

impl StructuralStrategy {
    pub const NAME: &'static str = "structural";

    #[must_use]
    pub fn new(config: StructuralConfig) -> Self {
        Self { config }
    }

    fn semantic<'a>(&self, doc: &'a Document) -> Option<Selection<'a>> {
        longest(doc.select(&SEMANTIC_SELECTORS.join(", ")), self.config.min_semantic_text_len, |_| true)
    }

    fn content_class<'a>(&self, doc: &'a Document) -> Option<Selection<'a>> {
        if self.config.content_selectors.is_empty() {
            return None;
        }
        longest(doc.select(&self.config.content_selectors.join(", ")), self.config.min_text_len, |_| true)
    }

    fn largest_block<'a>(&self, doc: &'a Document) -> Option<Selection<'a>> {
        longest(doc.select("div, section"), self.config.min_text_len, |sel| {
            !self.opens_with_prompt(sel)
        })
    }

    fn opens_with_prompt(&self, sel: &Selection) -> bool {
        let head: String = dom::normalized_text(sel).chars().take(SKIP_WINDOW).collect();
        self.config
            .skip_prefixes
            .iter()
            .any(|prefix| !prefix.is_empty() && head.contains(prefix.as_str()))
    }
}

impl Strategy for StructuralStrategy {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn min_text_len(&self) -> usize {
        self.config.min_text_len.min(self.config.min_semantic_text_len).max(1)
    }

    fn extract<'a>(&self, doc: &'a Document) -> ExtractionResult<'a> {
        let found = self
            .semantic(doc)
            .map(|root| ("semantic", root))
            .or_else(|| self.content_class(doc).map(|root| ("content-class", root)))
            .or_else(|| self.largest_block(doc).map(|root| ("largest-block", root)));

        if let Some((tier, root)) = found {
            let fragment = ContentFragment::new(root, 1.0);
            debug!(tier, ?fragment, "structural container found");
            return ExtractionResult::found(Self::NAME, doc, fragment);
        }
        debug!("no structural container found");
        ExtractionResult::not_found(Self::NAME, doc)
    }
}

/// The element with the most text among `matches`, at least `min_len`.
/// Earlier elements win ties.
fn longest<'a>(matches: Selection<'a>, min_len: usize, accept: impl Fn(&Selection) -> bool) -> Option<Selection<'a>> {
    let mut best: Option<(Selection<'a>, usize)> = None;
    for sel in matches.iter() {
        let len = dom::text_len(&sel);
        if len < min_len.max(1) || !accept(&sel) {
            continue;
        }
        if best.as_ref().is_none_or(|(_, best_len)| len > *best_len) {
            best = Some((sel, len));
        }
    }
    best.map(|(sel, _)| sel)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn picked(html: &str) -> Option<String> {
        let doc = dom::parse(html);
        let result = StructuralStrategy::default().extract(&doc);
        assert_eq!(result.success, result.fragment.is_some());
        result.fragment.map(|f| format!("{} {}", f.tag(), dom::id_and_class(&f.root)).trim().to_string())
    }

    #[test]
    fn trusts_short_articles() {
        let doc = dom::parse("<html><head><title>T</title></head><body><article><h1>Hi</h1><p>World</p></article></body></html>");
        let result = StructuralStrategy::default().extract(&doc);
        assert!(result.success);
        assert_eq!(result.title, "Hi");
        assert_eq!(result.text_len(), 7);
    }

    #[test]
    fn semantic_tier_beats_content_classes() {
        let long = "words ".repeat(40);
        let html = format!(r#"<body><div class="content">{long}</div><main><p>Short but semantic</p></main></body>"#);
        assert_eq!(picked(&html).as_deref(), Some("main"));
    }

    #[test]
    fn longest_landmark_wins() {
        let html = "<body><article id=\"a\"><p>one</p></article><article id=\"b\"><p>three two one</p></article></body>";
        assert_eq!(picked(html).as_deref(), Some("article b"));
    }

    #[test]
    fn empty_landmarks_fall_through() {
        let body = "Documentation paragraph with enough words to pass the threshold easily.";
        let html = format!(r#"<body><main>   </main><div class="markdown-body"><p>{body}</p></div></body>"#);
        assert_eq!(picked(&html).as_deref(), Some("div markdown-body"));
    }

    #[test]
    fn content_class_needs_minimum_text() {
        let html = r#"<body><div id="content">tiny</div></body>"#;
        assert_eq!(picked(html), None);
    }

    #[test]
    fn largest_block_skips_cookie_prompts() {
        let prompt = format!("Cookie settings: we use cookies. {}", "consent ".repeat(30));
        let text = "A plain block of prose that carries the page and is long enough to qualify.";
        let html = format!(r#"<body><div id="consent">{prompt}</div><section id="prose"><p>{text}</p></section></body>"#);
        assert_eq!(picked(&html).as_deref(), Some("section prose"));
    }

    #[test]
    fn nothing_found_is_not_an_error() {
        let doc = dom::parse("<html><head><title>Only title</title></head><body><p>x</p></body></html>");
        let result = StructuralStrategy::default().extract(&doc);
        assert!(!result.success);
        assert_eq!(result.title, "Only title");
        assert_eq!(result.strategy_name, "structural");
    }
}

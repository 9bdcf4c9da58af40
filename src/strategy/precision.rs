//! Precision strategy: content-density scoring.
//!
//! Paragraph-like nodes vote for their ancestors; each candidate's score is
//! then discounted by its link density and by how much markup surrounds its
//! text. The best-scoring candidate with enough text wins.

use std::collections::HashMap;
use std::sync::LazyLock;

use dom_query::{Document, NodeId, NodeRef, Selection};
use regex::Regex;
use tracing::{debug, trace};

use super::{ContentFragment, ExtractionResult, Strategy};
use crate::dom;

/// Class/id names that suggest main content.
#[allow(clippy::expect_used)]
static POSITIVE_CLASS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(article|body|content|entry|main|page|post|text|blog|story)")
        .expect("POSITIVE_CLASS regex")
});

/// Class/id names that suggest boilerplate.
#[allow(clippy::expect_used)]
static NEGATIVE_CLASS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)(comment|footer|footnote|masthead|meta|outbrain|promo|related|scroll|share|shoutbox|sidebar|skyscraper|sponsor|shopping|tags|tool|widget|\bad\b|ad-|nav|menu)",
    )
    .expect("NEGATIVE_CLASS regex")
});

/// Tags whose text counts as a paragraph for scoring.
const PARAGRAPH_TAGS: &[&str] = &["p", "pre", "td", "blockquote"];

/// Semantic containers that are always considered.
const SEMANTIC_TAGS: &[&str] = &["article", "main"];

/// Ancestor weights: parent, grandparent, great-grandparent.
const ANCESTOR_WEIGHTS: [f64; 3] = [1.0, 0.5, 1.0 / 6.0];

/// Tuning for [`PrecisionStrategy`].
#[derive(Debug, Clone, PartialEq)]
pub struct PrecisionConfig {
    /// Minimum fragment text length for success.
    ///
    /// Default: `200`
    pub min_text_len: usize,

    /// Paragraphs shorter than this do not vote.
    ///
    /// Default: `25`
    pub min_paragraph_len: usize,

    /// Added to `article`, `main` and ARIA main/article landmarks.
    ///
    /// Default: `25.0`
    pub semantic_bonus: f64,

    /// Added (or subtracted) for content-like (boilerplate-like) class names.
    ///
    /// Default: `25.0`
    pub class_weight: f64,

    /// Text-equivalent cost of one descendant element in the density ratio.
    ///
    /// Default: `10.0`
    pub markup_weight: f64,

    /// Candidates with more of their text inside links are skipped.
    ///
    /// Default: `0.5`
    pub max_link_density: f64,
}

impl Default for PrecisionConfig {
    fn default() -> Self {
        Self {
            min_text_len: 200,
            min_paragraph_len: 25,
            semantic_bonus: 25.0,
            class_weight: 25.0,
            markup_weight: 10.0,
            max_link_density: 0.5,
        }
    }
}

/// Content-density extraction.
#[derive(Debug, Clone, Default)]
pub struct PrecisionStrategy {
    config: PrecisionConfig,
}

impl PrecisionStrategy {
    pub const NAME: &'static str = "precision";

    #[must_use]
    pub fn new(config: PrecisionConfig) -> Self {
        Self { config }
    }

    /// Raw scores keyed by node, before density adjustments.
    fn raw_scores(&self, body: &Selection) -> HashMap<NodeId, f64> {
        let mut scores: HashMap<NodeId, f64> = HashMap::new();
        let Some(body_node) = body.nodes().first().copied() else {
            return scores;
        };

        for node in body.select("*").nodes() {
            let Some(tag) = dom::node_tag(node) else {
                continue;
            };
            let sel = Selection::from(*node);

            if is_semantic(&sel, &tag) {
                scores
                    .entry(node.id)
                    .or_insert_with(|| self.initial_score(&sel, &tag));
            }

            if !is_paragraph(node, &tag) {
                continue;
            }
            let text = sel.text();
            let len = dom::text_len(&sel);
            if len < self.config.min_paragraph_len {
                continue;
            }
            let vote = paragraph_vote(&text, len);

            let mut ancestor = node.parent();
            for weight in ANCESTOR_WEIGHTS {
                let Some(current) = ancestor else {
                    break;
                };
                let Some(ancestor_tag) = dom::node_tag(&current) else {
                    break;
                };
                let entry = scores.entry(current.id).or_insert_with(|| {
                    self.initial_score(&Selection::from(current), &ancestor_tag)
                });
                *entry += vote * weight;
                if current.id == body_node.id {
                    break;
                }
                ancestor = current.parent();
            }
        }
        scores
    }

    fn initial_score(&self, sel: &Selection, tag: &str) -> f64 {
        let mut score = tag_base_score(tag) + class_weight(sel, self.config.class_weight);
        if is_semantic(sel, tag) {
            score += self.config.semantic_bonus;
        }
        score
    }

    /// Final score after link-density and markup discounts, or `None` when
    /// the candidate is disqualified.
    #[allow(clippy::cast_precision_loss)]
    fn final_score(&self, sel: &Selection, raw: f64) -> Option<(f64, usize)> {
        let text_len = dom::text_len(sel);
        if text_len == 0 {
            return None;
        }
        let link_density = dom::link_density(sel);
        if link_density > self.config.max_link_density {
            trace!(id_class = %dom::id_and_class(sel), link_density, "skipping link-heavy candidate");
            return None;
        }
        let text = text_len as f64;
        let markup = self.config.markup_weight * dom::element_count(sel) as f64;
        let score = raw * (1.0 - link_density) * (text / (text + markup));
        Some((score, text_len))
    }
}

impl Strategy for PrecisionStrategy {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn min_text_len(&self) -> usize {
        self.config.min_text_len
    }

    fn extract<'a>(&self, doc: &'a Document) -> ExtractionResult<'a> {
        let Some(body) = dom::body(doc) else {
            return ExtractionResult::not_found(Self::NAME, doc);
        };
        let scores = self.raw_scores(&body);

        // Document order: body first, then its descendants. Strict `>` keeps
        // the earliest candidate on ties.
        let mut best: Option<(NodeRef<'a>, f64)> = None;
        let ordered = body.nodes().iter().chain(body.select("*").nodes().iter()).copied().collect::<Vec<_>>();
        for node in ordered {
            let Some(raw) = scores.get(&node.id).copied() else {
                continue;
            };
            let sel = Selection::from(node);
            let Some((score, text_len)) = self.final_score(&sel, raw) else {
                continue;
            };
            if text_len < self.config.min_text_len {
                continue;
            }
            if best.as_ref().is_none_or(|(_, best_score)| score > *best_score) {
                best = Some((node, score));
            }
        }

        match best {
            Some((node, score)) => {
                let fragment = ContentFragment::new(Selection::from(node), score);
                debug!(?fragment, candidates = scores.len(), "precision candidate chosen");
                ExtractionResult::found(Self::NAME, doc, fragment)
            }
            None => {
                debug!(candidates = scores.len(), "no precision candidate met the threshold");
                ExtractionResult::not_found(Self::NAME, doc)
            }
        }
    }
}

fn is_semantic(sel: &Selection, tag: &str) -> bool {
    SEMANTIC_TAGS.contains(&tag)
        || sel.attr("role").is_some_and(|role| {
            let role = role.trim();
            role.eq_ignore_ascii_case("main") || role.eq_ignore_ascii_case("article")
        })
}

fn is_paragraph(node: &NodeRef, tag: &str) -> bool {
    PARAGRAPH_TAGS.contains(&tag) || (tag == "div" && !dom::has_block_children(node))
}

/// `1 + commas + min(len / 100, 3)`
#[allow(clippy::cast_precision_loss)]
fn paragraph_vote(text: &str, len: usize) -> f64 {
    let commas = text.chars().filter(|c| matches!(c, ',' | '，' | '、')).count();
    1.0 + commas as f64 + (len / 100).min(3) as f64
}

fn tag_base_score(tag: &str) -> f64 {
    match tag {
        "div" | "article" | "main" | "section" => 5.0,
        "pre" | "td" | "blockquote" => 3.0,
        "address" | "ol" | "ul" | "dl" | "dd" | "dt" | "li" | "form" => -3.0,
        "h1" | "h2" | "h3" | "h4" | "h5" | "h6" | "th" => -5.0,
        _ => 0.0,
    }
}

fn class_weight(sel: &Selection, weight: f64) -> f64 {
    let id_class = dom::id_and_class(sel);
    if id_class.is_empty() {
        return 0.0;
    }
    let mut score = 0.0;
    if POSITIVE_CLASS.is_match(&id_class) {
        score += weight;
    }
    if NEGATIVE_CLASS.is_match(&id_class) {
        score -= weight;
    }
    score
}

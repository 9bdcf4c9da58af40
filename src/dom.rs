//! DOM helpers
//!
//! Thin, allocation-light helpers over `dom_query` shared by the filter,
//! the strategies and the renderer.

pub use dom_query::{Document, NodeRef, Selection};

/// Elements that start a new block in rendered output.
pub const BLOCK_TAGS: &[&str] = &[
    "address", "article", "aside", "blockquote", "dd", "details", "div", "dl", "dt",
    "fieldset", "figcaption", "figure", "footer", "h1", "h2", "h3", "h4", "h5", "h6",
    "header", "hr", "li", "main", "nav", "ol", "p", "pre", "section", "summary", "table",
    "ul",
];

/// Parse an HTML string into a document.
#[inline]
#[must_use]
pub fn parse(html: &str) -> Document {
    Document::from(html)
}

/// Get the lowercase tag name of a node, or `None` for non-elements.
#[must_use]
pub fn node_tag(node: &NodeRef) -> Option<String> {
    if !node.is_element() {
        return None;
    }
    node.node_name().map(|t| t.to_ascii_lowercase())
}

/// Get the lowercase tag name of the first node in a selection.
#[must_use]
pub fn tag_name(sel: &Selection) -> Option<String> {
    sel.nodes().first().and_then(node_tag)
}

/// Get any attribute value
#[inline]
#[must_use]
pub fn get_attribute(sel: &Selection, name: &str) -> Option<String> {
    sel.attr(name).map(|s| s.to_string())
}

/// Get a trimmed, non-empty attribute value.
#[must_use]
pub fn non_empty_attribute(sel: &Selection, name: &str) -> Option<String> {
    sel.attr(name)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// The lowercased `id` and `class` attributes joined by a space.
#[must_use]
pub fn id_and_class(sel: &Selection) -> String {
    let id = sel.attr("id").map(|s| s.to_string()).unwrap_or_default();
    let class = sel.attr("class").map(|s| s.to_string()).unwrap_or_default();
    format!("{id} {class}").trim().to_lowercase()
}

/// Collapse every run of whitespace into a single space.
///
/// Leading and trailing whitespace becomes a single space as well, so
/// adjacent inline pieces keep their separation. Use `trim()` for edges.
#[must_use]
pub fn collapse_whitespace(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut pending_space = false;
    for ch in text.chars() {
        if ch.is_whitespace() {
            pending_space = true;
        } else {
            if pending_space {
                out.push(' ');
                pending_space = false;
            }
            out.push(ch);
        }
    }
    if pending_space {
        out.push(' ');
    }
    out
}

/// Visible text of a selection with whitespace collapsed and trimmed.
#[must_use]
pub fn normalized_text(sel: &Selection) -> String {
    collapse_whitespace(&sel.text()).trim().to_string()
}

/// Text of a subtree with block boundaries and `<br>` turned into spaces,
/// whitespace collapsed. Walks with an explicit stack, so any nesting depth
/// is fine.
#[must_use]
pub fn block_spaced_text(node: &NodeRef) -> String {
    let mut out = String::new();
    // `None` marks the end of a block element.
    let mut stack: Vec<Option<NodeRef>> = vec![Some(*node)];
    while let Some(entry) = stack.pop() {
        let Some(current) = entry else {
            out.push(' ');
            continue;
        };
        if current.is_text() {
            out.push_str(&current.text());
            continue;
        }
        if node_tag(&current).is_some_and(|t| t == "br" || BLOCK_TAGS.contains(&t.as_str())) {
            out.push(' ');
            stack.push(None);
        }
        stack.extend(current.children().into_iter().rev().map(Some));
    }
    collapse_whitespace(&out).trim().to_string()
}

/// Character count of the visible text of a selection.
#[must_use]
pub fn text_len(sel: &Selection) -> usize {
    sel.text().split_whitespace().map(|w| w.chars().count()).sum()
}

/// Character count of the text inside `<a>` descendants.
#[must_use]
pub fn link_text_len(sel: &Selection) -> usize {
    sel.select("a").iter().map(|a| text_len(&a)).sum()
}

/// Fraction of the visible text that sits inside links.
#[must_use]
pub fn link_density(sel: &Selection) -> f64 {
    let total = text_len(sel);
    if total == 0 {
        return 0.0;
    }
    (link_text_len(sel) as f64 / total as f64).min(1.0)
}

/// Number of element descendants.
#[must_use]
pub fn element_count(sel: &Selection) -> usize {
    sel.select("*").length()
}

/// Returns true when any direct element child is a block-level element.
#[must_use]
pub fn has_block_children(node: &NodeRef) -> bool {
    node.children()
        .iter()
        .filter_map(node_tag)
        .any(|tag| BLOCK_TAGS.contains(&tag.as_str()))
}

/// Walk up from `node` and report whether an ancestor has one of `tags`.
#[must_use]
pub fn has_ancestor(node: &NodeRef, tags: &[&str]) -> bool {
    let mut current = node.parent();
    while let Some(parent) = current {
        if node_tag(&parent).is_some_and(|t| tags.contains(&t.as_str())) {
            return true;
        }
        current = parent.parent();
    }
    false
}

/// The `<body>` element, if the parser produced one.
#[must_use]
pub fn body(doc: &Document) -> Option<Selection<'_>> {
    let body = doc.select("body");
    body.exists().then_some(body)
}

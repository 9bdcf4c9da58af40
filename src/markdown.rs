//! Markdown rendering.
//!
//! Walks a content fragment and emits CommonMark, with GFM pipe tables.
//! Block elements become blank-line separated blocks; inline elements are
//! rendered into the paragraph that contains them.

use std::collections::HashSet;
use std::sync::LazyLock;

use dom_query::{NodeRef, Selection};
use regex::Regex;
use tracing::{debug, trace};

use crate::dom;
use crate::error::Result;
use crate::options::Options;
use crate::strategy::ContentFragment;
use crate::url_utils;

/// Characters that have special meaning in Markdown and need escaping.
const MARKDOWN_SPECIAL_CHARS: &[char] = &['\\', '*', '_', '[', ']', '`'];

/// Indentation of a list nested in a list item.
const NESTED_LIST_INDENT: usize = 2;

/// Elements with no visible output.
const SKIPPED_TAGS: &[&str] = &[
    "script", "style", "noscript", "template", "head", "title", "meta", "link", "base", "svg",
    "canvas", "iframe", "object", "embed", "input", "select", "textarea", "button",
];

#[allow(clippy::expect_used)]
static CODE_LANGUAGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:^|\s)(?:language|lang)-([A-Za-z0-9_+#.-]+)").expect("CODE_LANGUAGE regex")
});

#[allow(clippy::expect_used)]
static INLINE_LINK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"!?\[((?:\\.|[^\]\\])*)\]\((?:\\.|[^)\\])*\)").expect("INLINE_LINK regex")
});

/// Line openings that would turn a paragraph line into another block.
#[allow(clippy::expect_used)]
static BLOCK_START: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:#{1,6}(?:\s|$)|[-+](?:\s|$)|>|[-=]{3,}\s*$)").expect("BLOCK_START regex")
});

#[allow(clippy::expect_used)]
static ORDERED_START: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d{1,9})([.)])(?:\s|$)").expect("ORDERED_START regex")
});

/// List item openings as the renderer writes them.
#[allow(clippy::expect_used)]
static LIST_ITEM: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:- |\d+\. )").expect("LIST_ITEM regex")
});

/// Escape Markdown special characters in text content.
///
/// ```
/// use webpage_to_llm::markdown::escape_markdown;
///
/// assert_eq!(escape_markdown("*not italic*"), r"\*not italic\*");
/// assert_eq!(escape_markdown("my_variable_name"), r"my\_variable\_name");
/// ```
#[must_use]
pub fn escape_markdown(text: &str) -> String {
    let mut result = String::with_capacity(text.len() + text.len() / 4);
    for ch in text.chars() {
        if MARKDOWN_SPECIAL_CHARS.contains(&ch) {
            result.push('\\');
        }
        result.push(ch);
    }
    result
}

/// Undo [`escape_markdown`].
#[must_use]
pub fn unescape_markdown(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(ch) = chars.next() {
        if ch == '\\' {
            if let Some(&next) = chars.peek() {
                if MARKDOWN_SPECIAL_CHARS.contains(&next) {
                    result.push(next);
                    chars.next();
                    continue;
                }
            }
        }
        result.push(ch);
    }
    result
}

/// Plain text of rendered inline Markdown: link and image labels are kept,
/// emphasis and code markers dropped, escapes undone.
///
/// ```
/// use webpage_to_llm::markdown::plain_text;
///
/// assert_eq!(plain_text("[Hi](https://e.com/post) *there*"), "Hi there");
/// assert_eq!(plain_text(r"snake\_case `x`"), "snake_case x");
/// ```
#[must_use]
pub fn plain_text(markdown: &str) -> String {
    let labels = INLINE_LINK.replace_all(markdown, "$1");
    let mut result = String::with_capacity(labels.len());
    let mut chars = labels.chars().peekable();
    while let Some(ch) = chars.next() {
        match ch {
            '\\' => match chars.peek() {
                Some(&next) if MARKDOWN_SPECIAL_CHARS.contains(&next) => {
                    result.push(next);
                    chars.next();
                }
                _ => result.push(ch),
            },
            '*' | '`' => {}
            _ => result.push(ch),
        }
    }
    result
}

/// Escape a marker at the start of a paragraph line that would otherwise
/// open a heading, list, quote or thematic break.
fn escape_line_start(line: &str) -> String {
    if BLOCK_START.is_match(line) {
        return format!("\\{line}");
    }
    if let Some(caps) = ORDERED_START.captures(line) {
        let digits = caps[1].len();
        return format!("{}\\{}", &line[..digits], &line[digits..]);
    }
    line.to_string()
}

/// Backtick fence opening `line`, if it opens one.
pub(crate) fn fence_marker(line: &str) -> Option<&str> {
    let trimmed = line.trim_start();
    let ticks = trimmed.len() - trimmed.trim_start_matches('`').len();
    (ticks >= 3).then(|| &trimmed[..ticks])
}

/// Whether `line` closes a fence opened with `open`.
pub(crate) fn closes_fence(line: &str, open: &str) -> bool {
    let trimmed = line.trim();
    trimmed.len() >= open.len() && trimmed.chars().all(|c| c == '`')
}

/// Converts content fragments to Markdown.
#[derive(Debug, Clone)]
pub struct Renderer {
    include_links: bool,
    include_images: bool,
    include_tables: bool,
    deduplicate: bool,
    max_tree_depth: usize,
}

impl Renderer {
    #[must_use]
    pub fn new(options: &Options) -> Self {
        Self {
            include_links: options.include_links,
            include_images: options.include_images,
            include_tables: options.include_tables,
            deduplicate: options.deduplicate,
            max_tree_depth: options.max_tree_depth,
        }
    }

    /// Render a fragment. The output is trimmed and may be empty.
    ///
    /// Subtrees nested deeper than `max_tree_depth` are rendered as their
    /// plain text.
    ///
    /// # Errors
    ///
    /// Reserved for [`crate::Error::Render`] on internal invariant
    /// violations; valid documents always render.
    pub fn render(&self, fragment: &ContentFragment) -> Result<String> {
        let Some(root) = fragment.root.nodes().first().copied() else {
            return Ok(String::new());
        };
        let mut walker = Walker {
            renderer: self,
            seen: HashSet::new(),
        };
        let blocks = walker.block(&root, 0)?;
        let markdown = tidy_output(&blocks.join("\n\n"));
        debug!(blocks = blocks.len(), chars = markdown.chars().count(), "rendered markdown");
        Ok(markdown)
    }
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new(&Options::default())
    }
}

/// Per-render state.
struct Walker<'r> {
    renderer: &'r Renderer,
    /// Paragraphs already emitted, for deduplication.
    seen: HashSet<String>,
}

impl Walker<'_> {
    fn too_deep(&self, depth: usize) -> bool {
        depth > self.renderer.max_tree_depth
    }

    /// Text of a subtree below the depth limit, as one paragraph.
    fn flattened(&mut self, node: &NodeRef) -> Vec<String> {
        trace!(limit = self.renderer.max_tree_depth, "flattening deeply nested subtree");
        let mut text = escape_markdown(&dom::block_spaced_text(node));
        let mut blocks = Vec::new();
        self.flush_paragraph(&mut text, &mut blocks);
        blocks
    }

    /// Render an element in block context.
    fn block(&mut self, node: &NodeRef, depth: usize) -> Result<Vec<String>> {
        let depth = depth + 1;
        if self.too_deep(depth) {
            return Ok(self.flattened(node));
        }
        let Some(tag) = dom::node_tag(node) else {
            return Ok(Vec::new());
        };
        if SKIPPED_TAGS.contains(&tag.as_str()) {
            return Ok(Vec::new());
        }

        let single = match tag.as_str() {
            "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => self.heading(node, &tag, depth)?,
            "ul" | "ol" => self.list(node, tag == "ol", depth)?,
            "blockquote" => self.blockquote(node, depth)?,
            "pre" => code_block(node),
            "code" if is_multiline(node) => code_block(node),
            "table" => return self.table(node, depth),
            "hr" => Some("---".to_string()),
            _ => return self.container(node, depth),
        };
        Ok(single.into_iter().collect())
    }

    /// Render children, grouping runs of inline content into paragraphs.
    fn container(&mut self, node: &NodeRef, depth: usize) -> Result<Vec<String>> {
        let mut blocks = Vec::new();
        let mut inline = String::new();
        for child in node.children() {
            if child.is_text() {
                inline.push_str(&escape_markdown(&dom::collapse_whitespace(&child.text())));
                continue;
            }
            let Some(tag) = dom::node_tag(&child) else {
                continue;
            };
            if is_block(&tag, &child) {
                self.flush_paragraph(&mut inline, &mut blocks);
                blocks.extend(self.block(&child, depth)?);
            } else {
                inline.push_str(&self.inline(&child, depth)?);
            }
        }
        self.flush_paragraph(&mut inline, &mut blocks);
        Ok(blocks)
    }

    fn flush_paragraph(&mut self, inline: &mut String, blocks: &mut Vec<String>) {
        let paragraph = tidy_paragraph(&std::mem::take(inline))
            .lines()
            .map(escape_line_start)
            .collect::<Vec<_>>()
            .join("\n");
        if paragraph.is_empty() {
            return;
        }
        if self.renderer.deduplicate && !self.seen.insert(paragraph.clone()) {
            debug!(paragraph = %paragraph, "dropping duplicate paragraph");
            return;
        }
        blocks.push(paragraph);
    }

    fn heading(&mut self, node: &NodeRef, tag: &str, depth: usize) -> Result<Option<String>> {
        let level = tag[1..].parse::<usize>().unwrap_or(1);
        let text = one_line(&self.inline_children(node, depth)?);
        if text.is_empty() {
            return Ok(None);
        }
        Ok(Some(format!("{} {text}", "#".repeat(level))))
    }

    fn list(&mut self, node: &NodeRef, ordered: bool, depth: usize) -> Result<Option<String>> {
        if self.too_deep(depth) {
            return Ok(self.flattened(node).pop());
        }
        let mut number = if ordered {
            Selection::from(*node)
                .attr("start")
                .and_then(|s| s.trim().parse::<u64>().ok())
                .unwrap_or(1)
        } else {
            0
        };

        let mut items: Vec<String> = Vec::new();
        for child in node.children() {
            let Some(tag) = dom::node_tag(&child) else {
                continue;
            };
            // A list nested directly in a list belongs to the previous item.
            if tag == "ul" || tag == "ol" {
                if let Some(nested) = self.list(&child, tag == "ol", depth + 1)? {
                    match items.last_mut() {
                        Some(last) => {
                            last.push('\n');
                            last.push_str(&indent_all(&nested, NESTED_LIST_INDENT));
                        }
                        None => items.push(nested),
                    }
                }
                continue;
            }
            if tag != "li" {
                continue;
            }

            let blocks = self.block(&child, depth)?;
            if blocks.is_empty() {
                continue;
            }
            let marker = if ordered {
                let marker = format!("{number}. ");
                number += 1;
                marker
            } else {
                "- ".to_string()
            };
            items.push(list_item(&marker, &blocks));
        }

        Ok((!items.is_empty()).then(|| items.join("\n")))
    }

    fn blockquote(&mut self, node: &NodeRef, depth: usize) -> Result<Option<String>> {
        let blocks = self.container(node, depth)?;
        if blocks.is_empty() {
            return Ok(None);
        }
        let quoted = blocks
            .join("\n\n")
            .lines()
            .map(|line| if line.is_empty() { ">".to_string() } else { format!("> {line}") })
            .collect::<Vec<_>>()
            .join("\n");
        Ok(Some(quoted))
    }

    fn table(&mut self, node: &NodeRef, depth: usize) -> Result<Vec<String>> {
        if !self.renderer.include_tables {
            return Ok(Vec::new());
        }

        let mut rows: Vec<Vec<String>> = Vec::new();
        let mut alignments: Vec<Alignment> = Vec::new();
        for tr in table_rows(node) {
            let mut row = Vec::new();
            for cell in tr.children() {
                if !matches!(dom::node_tag(&cell).as_deref(), Some("td" | "th")) {
                    continue;
                }
                let text = escape_pipes(&one_line(&self.inline_children(&cell, depth + 2)?));
                let col = row.len();
                let align = cell_alignment(&Selection::from(cell));
                match alignments.get_mut(col) {
                    Some(existing) if *existing == Alignment::None => *existing = align,
                    Some(_) => {}
                    None => alignments.push(align),
                }
                row.push(text);

                let span = Selection::from(cell)
                    .attr("colspan")
                    .and_then(|s| s.trim().parse::<usize>().ok())
                    .unwrap_or(1)
                    .clamp(1, 64);
                row.extend(std::iter::repeat_n(String::new(), span - 1));
            }
            if !row.is_empty() {
                rows.push(row);
            }
        }

        if rows.iter().all(|row| row.iter().all(String::is_empty)) {
            return Ok(Vec::new());
        }

        let mut blocks = Vec::new();
        if let Some(caption) = node
            .children()
            .into_iter()
            .find(|c| dom::node_tag(c).as_deref() == Some("caption"))
        {
            let caption = one_line(&self.inline_children(&caption, depth)?);
            if !caption.is_empty() {
                blocks.push(caption);
            }
        }
        blocks.push(format_table(&rows, &alignments));
        Ok(blocks)
    }

    /// Render an element in inline context.
    fn inline(&mut self, node: &NodeRef, depth: usize) -> Result<String> {
        let depth = depth + 1;
        if node.is_text() {
            return Ok(escape_markdown(&dom::collapse_whitespace(&node.text())));
        }
        if self.too_deep(depth) {
            return Ok(format!(" {} ", escape_markdown(&dom::block_spaced_text(node))));
        }
        let Some(tag) = dom::node_tag(node) else {
            return Ok(String::new());
        };
        if SKIPPED_TAGS.contains(&tag.as_str()) {
            return Ok(String::new());
        }

        let rendered = match tag.as_str() {
            "br" => "\n".to_string(),
            "img" => self.image(node),
            "a" => self.link(node, depth)?,
            "strong" | "b" => wrap_emphasis(&self.inline_children(node, depth)?, "**"),
            "em" | "i" => wrap_emphasis(&self.inline_children(node, depth)?, "*"),
            "code" | "kbd" | "samp" | "tt" => inline_code(&node.text()),
            _ => self.inline_children(node, depth)?,
        };

        // Block elements flattened into a line keep their words apart.
        if dom::BLOCK_TAGS.contains(&tag.as_str()) {
            return Ok(format!(" {rendered} "));
        }
        Ok(rendered)
    }

    fn inline_children(&mut self, node: &NodeRef, depth: usize) -> Result<String> {
        let mut out = String::new();
        for child in node.children() {
            out.push_str(&self.inline(&child, depth)?);
        }
        Ok(out)
    }

    fn link(&mut self, node: &NodeRef, depth: usize) -> Result<String> {
        let inner = self.inline_children(node, depth)?;
        let label = one_line(&inner);
        if label.is_empty() {
            return Ok(String::new());
        }
        let href = dom::non_empty_attribute(&Selection::from(*node), "href")
            .filter(|href| self.renderer.include_links && is_linkable(href));
        let core = match href {
            Some(href) => format!("[{label}]({})", link_destination(&href)),
            None => label,
        };
        Ok(keep_edge_space(&inner, core))
    }

    fn image(&self, node: &NodeRef) -> String {
        if !self.renderer.include_images {
            return String::new();
        }
        let sel = Selection::from(*node);
        let Some(src) = dom::non_empty_attribute(&sel, "src").filter(|src| !src.starts_with("data:")) else {
            return String::new();
        };
        let alt = dom::non_empty_attribute(&sel, "alt")
            .map(|alt| escape_markdown(&one_line(&alt)))
            .unwrap_or_default();
        format!("![{alt}]({})", link_destination(&src))
    }
}

fn is_block(tag: &str, node: &NodeRef) -> bool {
    dom::BLOCK_TAGS.contains(&tag) || (tag == "code" && is_multiline(node))
}

fn is_multiline(node: &NodeRef) -> bool {
    node.text().trim().contains('\n')
}

/// Fragment-only and script links carry no destination worth keeping.
fn is_linkable(href: &str) -> bool {
    !url_utils::is_fragment_only(href) && !href.trim_start().to_ascii_lowercase().starts_with("javascript:")
}

/// Percent-encode the characters that would end a Markdown link target.
fn link_destination(url: &str) -> String {
    let mut out = String::with_capacity(url.len());
    for ch in url.chars() {
        match ch {
            ' ' => out.push_str("%20"),
            '(' => out.push_str("%28"),
            ')' => out.push_str("%29"),
            '<' => out.push_str("%3C"),
            '>' => out.push_str("%3E"),
            _ => out.push(ch),
        }
    }
    out
}

/// Wrap `inner` in emphasis markers, moving edge whitespace outside them.
fn wrap_emphasis(inner: &str, marker: &str) -> String {
    let trimmed = inner.trim();
    if trimmed.is_empty() {
        return inner.to_string();
    }
    keep_edge_space(inner, format!("{marker}{trimmed}{marker}"))
}

/// Surround `core` with a space wherever `original` had edge whitespace.
fn keep_edge_space(original: &str, core: String) -> String {
    let lead = original.starts_with(char::is_whitespace);
    let trail = original.ends_with(char::is_whitespace);
    match (lead, trail) {
        (false, false) => core,
        (true, false) => format!(" {core}"),
        (false, true) => format!("{core} "),
        (true, true) => format!(" {core} "),
    }
}

fn longest_backtick_run(text: &str) -> usize {
    text.split(|c| c != '`').map(str::len).max().unwrap_or(0)
}

fn inline_code(raw: &str) -> String {
    let code = dom::collapse_whitespace(raw);
    let code = code.trim();
    if code.is_empty() {
        return String::new();
    }
    let fence = "`".repeat(longest_backtick_run(code) + 1);
    if code.starts_with('`') || code.ends_with('`') {
        format!("{fence} {code} {fence}")
    } else {
        format!("{fence}{code}{fence}")
    }
}

fn code_block(node: &NodeRef) -> Option<String> {
    let sel = Selection::from(*node);
    let raw = sel.text().replace("\r\n", "\n");
    let code = raw.trim_start_matches('\n').trim_end();
    if code.trim().is_empty() {
        return None;
    }
    let language = code_language(&sel).unwrap_or_default();
    let fence = "`".repeat(longest_backtick_run(code).max(2) + 1);
    Some(format!("{fence}{language}\n{code}\n{fence}"))
}

/// Language from `language-X` / `lang-X` on the element or its `<code>`.
fn code_language(sel: &Selection) -> Option<String> {
    let own = sel.attr("class").map(|c| c.to_string());
    let inner = sel.select("code").first().attr("class").map(|c| c.to_string());
    [own, inner]
        .into_iter()
        .flatten()
        .find_map(|class| CODE_LANGUAGE.captures(&class).map(|caps| caps[1].to_lowercase()))
}

/// Squash spaces in each line and drop empty lines.
fn tidy_paragraph(text: &str) -> String {
    text.split('\n')
        .map(|line| line.split(' ').filter(|w| !w.is_empty()).collect::<Vec<_>>().join(" "))
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Collapse a rendered inline run to a single trimmed line.
fn one_line(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// One list item: nested lists sit two spaces in and directly below the
/// item text; other blocks are separated by a blank line and aligned with
/// the text after the marker.
fn list_item(marker: &str, blocks: &[String]) -> String {
    let mut item = String::from(marker);
    for (i, block) in blocks.iter().enumerate() {
        if i == 0 {
            item.push_str(indent(block, marker.len()).trim_start());
        } else if LIST_ITEM.is_match(block) {
            item.push('\n');
            item.push_str(&indent_all(block, NESTED_LIST_INDENT));
        } else {
            item.push_str("\n\n");
            item.push_str(&indent_all(block, marker.len()));
        }
    }
    item
}

/// Indent every non-empty line by `width` spaces.
fn indent_all(text: &str, width: usize) -> String {
    let pad = " ".repeat(width);
    text.lines()
        .map(|line| if line.is_empty() { String::new() } else { format!("{pad}{line}") })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Indent every non-empty line after the first by `width` spaces.
fn indent(text: &str, width: usize) -> String {
    let pad = " ".repeat(width);
    text.lines()
        .enumerate()
        .map(|(i, line)| {
            if i == 0 || line.is_empty() {
                line.to_string()
            } else {
                format!("{pad}{line}")
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Trim line ends and collapse blank-line runs outside code fences.
fn tidy_output(markdown: &str) -> String {
    let mut lines: Vec<&str> = Vec::new();
    let mut open_fence: Option<&str> = None;
    let mut previous_blank = false;

    for line in markdown.lines() {
        if let Some(open) = open_fence {
            lines.push(line);
            if closes_fence(line, open) {
                open_fence = None;
            }
            continue;
        }
        let line = line.trim_end();
        if line.is_empty() {
            if previous_blank {
                continue;
            }
            previous_blank = true;
        } else {
            previous_blank = false;
        }
        open_fence = fence_marker(line);
        lines.push(line);
    }

    lines.join("\n").trim().to_string()
}

// --- tables -----------------------------------------------------------------

/// `tr` elements of a table in document order, skipping nested tables.
fn table_rows<'a>(table: &NodeRef<'a>) -> Vec<NodeRef<'a>> {
    let mut rows = Vec::new();
    for child in table.children() {
        match dom::node_tag(&child).as_deref() {
            Some("tr") => rows.push(child),
            Some("thead" | "tbody" | "tfoot") => rows.extend(
                child
                    .children()
                    .into_iter()
                    .filter(|row| dom::node_tag(row).as_deref() == Some("tr")),
            ),
            _ => {}
        }
    }
    rows
}

fn escape_pipes(text: &str) -> String {
    text.replace('|', "\\|")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Alignment {
    None,
    Left,
    Center,
    Right,
}

impl Alignment {
    fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "left" | "start" => Self::Left,
            "center" => Self::Center,
            "right" | "end" => Self::Right,
            _ => Self::None,
        }
    }
}

/// Alignment from the `align` attribute or an inline `text-align`.
fn cell_alignment(cell: &Selection) -> Alignment {
    if let Some(align) = cell.attr("align") {
        return Alignment::parse(&align);
    }
    cell.attr("style")
        .and_then(|style| {
            style.split(';').find_map(|decl| {
                let (prop, value) = decl.split_once(':')?;
                prop.trim().eq_ignore_ascii_case("text-align").then(|| Alignment::parse(value))
            })
        })
        .unwrap_or(Alignment::None)
}

fn format_separator(width: usize, align: Alignment) -> String {
    let dashes = width.max(3);
    match align {
        Alignment::None => "-".repeat(dashes),
        Alignment::Left => format!(":{}", "-".repeat(dashes - 1)),
        Alignment::Center => format!(":{}:", "-".repeat(dashes - 2)),
        Alignment::Right => format!("{}:", "-".repeat(dashes - 1)),
    }
}

fn pad_cell(text: &str, width: usize, align: Alignment) -> String {
    let text_len = text.chars().count();
    if text_len >= width {
        return text.to_string();
    }

    let padding = width - text_len;
    match align {
        Alignment::Right => format!("{}{}", " ".repeat(padding), text),
        Alignment::Center => {
            let left = padding / 2;
            let right = padding - left;
            format!("{}{}{}", " ".repeat(left), text, " ".repeat(right))
        }
        _ => format!("{}{}", text, " ".repeat(padding)),
    }
}

/// Lay out rows as a pipe table. The first row is the header; short rows
/// are padded with empty cells.
fn format_table(rows: &[Vec<String>], alignments: &[Alignment]) -> String {
    let col_count = rows.iter().map(Vec::len).max().unwrap_or(0);
    let mut widths = vec![3; col_count];
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            widths[i] = widths[i].max(cell.chars().count());
        }
    }
    let align = |col: usize| alignments.get(col).copied().unwrap_or(Alignment::None);

    let format_row = |row: &[String]| {
        let cells: Vec<String> = (0..col_count)
            .map(|col| pad_cell(row.get(col).map_or("", String::as_str), widths[col], align(col)))
            .collect();
        format!("| {} |", cells.join(" | "))
    };

    let mut lines = Vec::with_capacity(rows.len() + 1);
    for (i, row) in rows.iter().enumerate() {
        lines.push(format_row(row.as_slice()));
        if i == 0 {
            let separator: Vec<String> = (0..col_count).map(|col| format_separator(widths[col], align(col))).collect();
            lines.push(format!("| {} |", separator.join(" | ")));
        }
    }
    lines.join("\n")
}

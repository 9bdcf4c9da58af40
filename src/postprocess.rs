//! Final formatting of rendered Markdown: title heading, optional source
//! header, and length limiting.

use tracing::debug;

use crate::markdown::{closes_fence, escape_markdown, fence_marker, plain_text};

/// Appended to truncated output.
pub const TRUNCATION_MARKER: &str = "\n\n...[truncated]";

/// Assembles the final document.
///
/// ```
/// use webpage_to_llm::postprocess::PostProcessor;
///
/// let out = PostProcessor::new()
///     .title("Hello")
///     .source("https://e.com/hello")
///     .process("Body text.");
/// assert_eq!(out, "# Hello\n\nSource: https://e.com/hello\n\n---\n\nBody text.");
/// ```
#[derive(Debug, Clone, Default)]
pub struct PostProcessor {
    title: Option<String>,
    source: Option<String>,
    description: Option<String>,
    max_length: Option<usize>,
}

impl PostProcessor {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Heading prepended unless the body already opens with it.
    #[must_use]
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = non_empty(title.into());
        self
    }

    /// Adds a `Source: {url}` header line.
    #[must_use]
    pub fn source(mut self, url: impl Into<String>) -> Self {
        self.source = non_empty(url.into());
        self
    }

    /// Adds a `Description: {text}` header line.
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = non_empty(description.into());
        self
    }

    /// Limit the output to this many characters plus the truncation marker.
    #[must_use]
    pub fn max_length(mut self, max_length: Option<usize>) -> Self {
        self.max_length = max_length;
        self
    }

    /// Assemble and truncate.
    #[must_use]
    pub fn process(&self, markdown: &str) -> String {
        let document = self.assemble(markdown);
        match self.max_length {
            Some(max) => truncate(&document, max),
            None => document,
        }
    }

    /// Title heading, header and body, without truncation.
    #[must_use]
    pub fn assemble(&self, markdown: &str) -> String {
        let body = markdown.trim();
        let mut parts: Vec<String> = Vec::with_capacity(3);

        let body = match self.title.as_deref() {
            Some(title) => match split_matching_heading(body, title) {
                Some((heading, rest)) => {
                    parts.push(heading.to_string());
                    rest
                }
                None => {
                    parts.push(format!("# {}", escape_markdown(&one_line(title))));
                    body
                }
            },
            None => body,
        };

        if let Some(header) = self.header() {
            parts.push(header);
        }
        if !body.is_empty() {
            parts.push(body.to_string());
        }

        parts.join("\n\n")
    }

    fn header(&self) -> Option<String> {
        let mut lines = Vec::new();
        if let Some(source) = &self.source {
            lines.push(format!("Source: {source}"));
        }
        if let Some(description) = &self.description {
            lines.push(format!("Description: {}", one_line(description)));
        }
        if lines.is_empty() {
            return None;
        }
        lines.push(String::new());
        lines.push("---".to_string());
        Some(lines.join("\n"))
    }
}

/// Prepend `title` as a heading and apply `max_length`.
#[must_use]
pub fn postprocess(markdown: &str, title: &str, max_length: Option<usize>) -> String {
    PostProcessor::new()
        .title(title)
        .max_length(max_length)
        .process(markdown)
}

/// Cut `markdown` to at most `max_length` characters on a whitespace
/// boundary, never leaving a code fence, link, inline code span or
/// emphasis run open, and append [`TRUNCATION_MARKER`].
#[must_use]
pub fn truncate(markdown: &str, max_length: usize) -> String {
    if markdown.chars().count() <= max_length {
        return markdown.to_string();
    }

    let mut head = cut_at_whitespace(markdown, max_length);
    loop {
        let repaired = repair(head);
        if repaired.len() == head.len() {
            break;
        }
        head = repaired;
    }

    debug!(kept = head.chars().count(), max_length, "truncated output");
    if head.is_empty() {
        TRUNCATION_MARKER.trim_start().to_string()
    } else {
        format!("{head}{TRUNCATION_MARKER}")
    }
}

/// Longest prefix of at most `max_chars` characters ending on a whitespace
/// boundary, trailing whitespace removed.
fn cut_at_whitespace(text: &str, max_chars: usize) -> &str {
    let limit = text.char_indices().nth(max_chars).map_or(text.len(), |(i, _)| i);
    let next_is_space = text[limit..].chars().next().is_none_or(char::is_whitespace);
    let head = if next_is_space {
        &text[..limit]
    } else {
        let prefix = &text[..limit];
        prefix
            .rfind(char::is_whitespace)
            .map_or("", |i| &prefix[..i])
    };
    head.trim_end()
}

/// One repair step: drop whatever is left open or dangling at the end.
fn repair(head: &str) -> &str {
    if let Some(start) = open_fence_start(head) {
        return head[..start].trim_end();
    }
    if let Some(start) = open_inline_start(head) {
        return head[..start].trim_end();
    }
    drop_dangling_line(head)
}

/// Byte offset of the line opening an unclosed code fence.
fn open_fence_start(text: &str) -> Option<usize> {
    let mut open: Option<(&str, usize)> = None;
    let mut offset = 0;
    for line in text.split('\n') {
        match open {
            Some((marker, _)) if closes_fence(line, marker) => open = None,
            Some(_) => {}
            None => open = fence_marker(line).map(|marker| (marker, offset)),
        }
        offset += line.len() + 1;
    }
    open.map(|(_, start)| start)
}

/// Byte offset of the earliest unclosed inline construct (link, image,
/// inline code or emphasis) outside code fences.
fn open_inline_start(text: &str) -> Option<usize> {
    let mut scan = InlineScan::default();
    let mut fence: Option<&str> = None;
    let mut offset = 0;

    for line in text.split('\n') {
        if let Some(marker) = fence {
            if closes_fence(line, marker) {
                fence = None;
            }
        } else if let Some(marker) = fence_marker(line) {
            fence = Some(marker);
        } else if line.trim().is_empty() {
            // inline constructs never span paragraphs
            scan = InlineScan::default();
        } else {
            scan.line(line, offset);
        }
        offset += line.len() + 1;
    }
    scan.earliest_open()
}

#[derive(Default)]
struct InlineScan {
    /// Open `[` (or `![`) positions.
    brackets: Vec<usize>,
    /// Start of a link whose `](` destination is still being read.
    destination: Option<usize>,
    /// Open code span: (backtick count, start).
    code: Option<(usize, usize)>,
    /// Open emphasis runs: (marker count, start).
    emphasis: Vec<(usize, usize)>,
}

impl InlineScan {
    fn line(&mut self, line: &str, offset: usize) {
        let bytes = line.as_bytes();
        let mut i = 0;
        while i < bytes.len() {
            let at = offset + i;
            let b = bytes[i];

            if let Some((ticks, _)) = self.code {
                if b == b'`' {
                    let run = run_len(bytes, i, b'`');
                    if run == ticks {
                        self.code = None;
                    }
                    i += run;
                } else {
                    i += 1;
                }
                continue;
            }

            if self.destination.is_some() {
                if b == b')' {
                    self.destination = None;
                }
                i += 1;
                continue;
            }

            match b {
                b'\\' => i += 2,
                b'`' => {
                    let run = run_len(bytes, i, b'`');
                    self.code = Some((run, at));
                    i += run;
                }
                b'!' if bytes.get(i + 1) == Some(&b'[') => {
                    self.brackets.push(at);
                    i += 2;
                }
                b'[' => {
                    self.brackets.push(at);
                    i += 1;
                }
                b']' => {
                    match bytes.get(i + 1) {
                        Some(b'(') => {
                            let start = self.brackets.pop().unwrap_or(at);
                            self.destination = Some(start);
                            i += 2;
                            continue;
                        }
                        // `[label]` with its `(` cut off stays open
                        None => {}
                        Some(_) => {
                            self.brackets.pop();
                        }
                    }
                    i += 1;
                }
                b'*' => {
                    let run = run_len(bytes, i, b'*');
                    if self.emphasis.last().is_some_and(|(n, _)| *n == run) {
                        self.emphasis.pop();
                    } else {
                        self.emphasis.push((run, at));
                    }
                    i += run;
                }
                _ => i += 1,
            }
        }
    }

    fn earliest_open(&self) -> Option<usize> {
        self.brackets
            .iter()
            .copied()
            .chain(self.destination)
            .chain(self.code.map(|(_, start)| start))
            .chain(self.emphasis.iter().map(|(_, start)| *start))
            .min()
    }
}

fn run_len(bytes: &[u8], start: usize, byte: u8) -> usize {
    bytes[start..].iter().take_while(|b| **b == byte).count()
}

/// Remove a last line that is only a block marker or a cut table row.
fn drop_dangling_line(head: &str) -> &str {
    let (rest, last) = match head.rfind('\n') {
        Some(i) => (&head[..i], &head[i + 1..]),
        None => ("", head),
    };
    let trimmed = last.trim();
    let marker_only = trimmed.is_empty()
        || trimmed == "---"
        || trimmed.chars().all(|c| c == '#')
        || matches!(trimmed, "-" | "*" | "+" | ">")
        || trimmed
            .strip_suffix('.')
            .is_some_and(|n| !n.is_empty() && n.chars().all(|c| c.is_ascii_digit()));
    let cut_row = trimmed.starts_with('|') && (!trimmed.ends_with('|') || trimmed.ends_with("\\|"));
    if marker_only || cut_row {
        rest.trim_end()
    } else {
        head
    }
}

fn split_matching_heading<'a>(body: &'a str, title: &str) -> Option<(&'a str, &'a str)> {
    let (first, rest) = body.split_once('\n').unwrap_or((body, ""));
    let text = first.strip_prefix("# ")?;
    (one_line(&plain_text(text)) == one_line(title)).then(|| (first, rest.trim_start()))
}

fn one_line(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn non_empty(value: String) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

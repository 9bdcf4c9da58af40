//! Input decoding.
//!
//! Pages saved to disk or piped in from other tools arrive as raw bytes in
//! whatever charset the site used. This module sniffs the charset and
//! converts to UTF-8, and rejects input that is empty or clearly binary.

use std::sync::LazyLock;

use encoding_rs::{Encoding, UTF_8};
use regex::Regex;

use crate::error::{Error, Result};

/// Number of leading bytes inspected for charset declarations and binary content.
const SNIFF_LEN: usize = 1024;

/// Match `<meta charset="...">` tag
#[allow(clippy::expect_used)]
static CHARSET_META_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)<meta[^>]+charset\s*=\s*["']?([^"'\s/>;]+)"#).expect("valid regex")
});

/// Match `<meta http-equiv="Content-Type" content="...; charset=...">` tag
#[allow(clippy::expect_used)]
static CONTENT_TYPE_CHARSET_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)<meta[^>]+http-equiv\s*=\s*["']?content-type["']?[^>]+content\s*=\s*["']?[^"'>]*;\s*charset\s*=\s*([^"'\s>]+)"#).expect("valid regex")
});

/// Detect the character encoding of HTML bytes.
///
/// Order: byte-order mark, `<meta charset>`, `<meta http-equiv="Content-Type">`,
/// then UTF-8.
#[must_use]
pub fn detect_encoding(html: &[u8]) -> &'static Encoding {
    if let Some((encoding, _)) = Encoding::for_bom(html) {
        return encoding;
    }

    let head = String::from_utf8_lossy(&html[..html.len().min(SNIFF_LEN)]);

    let declared = CHARSET_META_RE
        .captures(&head)
        .or_else(|| CONTENT_TYPE_CHARSET_RE.captures(&head))
        .and_then(|c| c.get(1))
        .and_then(|m| Encoding::for_label(m.as_str().as_bytes()));

    declared.unwrap_or(UTF_8)
}

/// Returns true when the input cannot be treated as HTML text.
fn is_binary(html: &[u8]) -> bool {
    // UTF-16 text is full of NUL bytes but announces itself with a BOM
    Encoding::for_bom(html).is_none() && html[..html.len().min(SNIFF_LEN)].contains(&0)
}

/// Decode raw HTML bytes to a UTF-8 string.
///
/// Invalid sequences are replaced with U+FFFD rather than failing.
///
/// # Errors
///
/// Returns [`Error::EmptyInput`] when the input is empty, whitespace only,
/// or contains NUL bytes near the start (binary data).
///
/// # Examples
///
/// ```
/// use webpage_to_llm::encoding::decode;
///
/// let html = b"<html><head><meta charset=\"ISO-8859-1\"></head><body>Caf\xE9</body></html>";
/// assert!(decode(html)?.contains("Café"));
/// # Ok::<(), webpage_to_llm::Error>(())
/// ```
pub fn decode(html: &[u8]) -> Result<String> {
    if html.iter().all(u8::is_ascii_whitespace) || is_binary(html) {
        return Err(Error::EmptyInput);
    }

    let encoding = detect_encoding(html);
    // decode() strips a matching BOM and replaces malformed sequences
    let (decoded, _encoding_used, _had_errors) = encoding.decode(html);
    Ok(decoded.into_owned())
}

/// Check already-decoded text the same way [`decode`] checks bytes.
pub(crate) fn ensure_text(html: &str) -> Result<()> {
    if html.trim().is_empty() || is_binary(html.as_bytes()) {
        return Err(Error::EmptyInput);
    }
    Ok(())
}

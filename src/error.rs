//! Error types for webpage-to-llm.
//!
//! This module defines the errors returned by the conversion pipeline and
//! the non-fatal [`ParseWarning`] diagnostic.

use std::fmt;

use serde::Serialize;

use crate::options::Method;

/// Error type for conversion operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// The input was empty, whitespace only, or not text at all.
    #[error("input is empty or not text")]
    EmptyInput,

    /// No strategy produced acceptable content.
    ///
    /// `method` is the method the caller asked for; `reason` describes what
    /// each attempted strategy found.
    #[error("no usable content found (method: {method}): {reason}")]
    ExtractionFailed { method: Method, reason: String },

    /// The selected fragment could not be rendered.
    ///
    /// Only raised on internal invariant violations; valid documents,
    /// however deeply nested, always render.
    #[error("cannot render content: {0}")]
    Render(String),
}

impl Error {
    /// Shorthand for an [`Error::ExtractionFailed`].
    pub(crate) fn extraction_failed(method: Method, reason: impl Into<String>) -> Self {
        Self::ExtractionFailed {
            method,
            reason: reason.into(),
        }
    }
}

/// Result type alias for conversion operations.
pub type Result<T> = std::result::Result<T, Error>;

/// A malformed-markup diagnostic.
///
/// Parsing never fails on broken HTML; the problems it tolerated are
/// reported as warnings instead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParseWarning {
    pub message: String,
}

impl ParseWarning {
    pub(crate) fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for ParseWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extraction_failed_names_the_method() {
        let err = Error::extraction_failed(Method::Structural, "nothing above 50 characters");
        let msg = err.to_string();
        assert!(msg.contains("structural"), "got: {msg}");
        assert!(msg.contains("nothing above 50 characters"), "got: {msg}");
    }

    #[test]
    fn parse_warning_displays_its_message() {
        let warning = ParseWarning::new("unbalanced <div>");
        assert_eq!(warning.to_string(), "unbalanced <div>");
    }
}

//! # webpage-to-llm
//!
//! Converts raw HTML into compact Markdown suitable for a language model's
//! context window.
//!
//! The pipeline parses and normalizes the page, strips navigation, ads and
//! other boilerplate, locates the main content with one of two extraction
//! strategies, renders it as Markdown and finally adds a title heading and
//! applies an optional length limit.
//!
//! ## Quick Start
//!
//! ```rust
//! use webpage_to_llm::{convert, Options};
//!
//! let html = r#"<html><body><nav>Home</nav>
//! <article><h1>Hi</h1><p>World</p></article></body></html>"#;
//!
//! let options = Options {
//!     base_url: Some("https://e.com".to_string()),
//!     ..Options::default()
//! };
//! let result = convert(html, &options)?;
//! assert_eq!(result.markdown, "# Hi\n\nWorld");
//! assert_eq!(result.strategy, "structural");
//! # Ok::<(), webpage_to_llm::Error>(())
//! ```
//!
//! ## Strategies
//!
//! - **Precision**: content-density scoring; picks the subtree with the most
//!   prose relative to its links and markup.
//! - **Structural**: semantic landmarks, common content classes, then the
//!   largest text block.
//!
//! `Method::Auto` tries precision first and falls back to structural.

mod error;
mod options;
mod result;

/// DOM helpers over `dom_query`.
pub mod dom;

/// Character encoding detection and decoding.
pub mod encoding;

/// URL utilities for validation and resolution.
pub mod url_utils;

/// Parsing and URL normalization.
pub mod normalize;

/// Page metadata (title, description, canonical URL).
pub mod metadata;

/// Boilerplate removal.
pub mod filter;

/// Content extraction strategies.
pub mod strategy;

/// Strategy selection and fallback.
pub mod selector;

/// Markdown rendering.
pub mod markdown;

/// Title heading, source header and truncation.
pub mod postprocess;

use tracing::debug;

// Public API - re-exports
pub use error::{Error, ParseWarning, Result};
pub use filter::{FilterConfig, NoiseFilter};
pub use markdown::Renderer;
pub use metadata::PageMetadata;
pub use normalize::NormalizedDocument;
pub use options::{Method, Options, UnknownMethod};
pub use postprocess::{postprocess, PostProcessor, TRUNCATION_MARKER};
pub use result::Conversion;
pub use selector::StrategySelector;
pub use strategy::{
    ContentFragment, ExtractionResult, PrecisionConfig, PrecisionStrategy, Strategy,
    StructuralConfig, StructuralStrategy,
};

/// Converts an HTML document to Markdown.
///
/// # Errors
///
/// - [`Error::EmptyInput`] for empty, whitespace-only or binary input.
/// - [`Error::ExtractionFailed`] when no strategy finds acceptable content
///   or the chosen content renders to nothing.
/// - [`Error::Render`] only on internal invariant violations in the
///   renderer.
pub fn convert(html: &str, options: &Options) -> Result<Conversion> {
    let base_url = options.base_url.as_deref().unwrap_or_default();
    let normalized = normalize::normalize(html, base_url)?;
    convert_normalized(normalized, options)
}

/// Converts HTML bytes, detecting the character encoding first.
///
/// The encoding is taken from a byte-order mark, `<meta charset>` or an
/// `http-equiv` content type, defaulting to UTF-8.
///
/// # Example
///
/// ```rust
/// use webpage_to_llm::{convert_bytes, Options};
///
/// let html = b"<html><head><meta charset=\"ISO-8859-1\"></head><body><main><p>Caf\xE9</p></main></body></html>";
/// let result = convert_bytes(html, &Options::default())?;
/// assert!(result.markdown.contains("Café"));
/// # Ok::<(), webpage_to_llm::Error>(())
/// ```
///
/// # Errors
///
/// Same as [`convert`].
pub fn convert_bytes(html: &[u8], options: &Options) -> Result<Conversion> {
    let base_url = options.base_url.as_deref().unwrap_or_default();
    let normalized = normalize::normalize_bytes(html, base_url)?;
    convert_normalized(normalized, options)
}

fn convert_normalized(normalized: NormalizedDocument, options: &Options) -> Result<Conversion> {
    let NormalizedDocument {
        document,
        base_url,
        warnings,
    } = normalized;

    let metadata = metadata::extract(&document, base_url.as_ref());

    NoiseFilter::new(options.filter.clone()).filter_in_place(&document);

    let extraction = StrategySelector::new(options).select(&document, options.method)?;
    let Some(fragment) = extraction.fragment.as_ref() else {
        return Err(Error::extraction_failed(
            options.method,
            format!("{} reported success without a fragment", extraction.strategy_name),
        ));
    };

    let body = Renderer::new(options).render(fragment)?;
    if body.is_empty() {
        return Err(Error::extraction_failed(
            options.method,
            format!("{} content rendered to empty markdown", extraction.strategy_name),
        ));
    }

    let title = if extraction.title.is_empty() {
        metadata.title.clone().unwrap_or_default()
    } else {
        extraction.title.clone()
    };

    let mut post = PostProcessor::new();
    if options.include_title {
        post = post.title(title.as_str());
    }
    if options.include_metadata_header {
        if let Some(url) = &metadata.url {
            post = post.source(url.as_str());
        }
        if let Some(description) = &metadata.description {
            post = post.description(description.as_str());
        }
    }

    let assembled = post.assemble(&body);
    let (markdown, truncated) = match options.max_length {
        Some(max) if assembled.chars().count() > max => (postprocess::truncate(&assembled, max), true),
        _ => (assembled, false),
    };

    debug!(
        strategy = extraction.strategy_name,
        fragment_text_len = fragment.text_len,
        chars = markdown.chars().count(),
        truncated,
        "conversion finished"
    );

    Ok(Conversion {
        markdown,
        title,
        strategy: extraction.strategy_name,
        fragment_text_len: fragment.text_len,
        truncated,
        metadata,
        warnings,
    })
}

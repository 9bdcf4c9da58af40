//! End-to-end conversion tests.
//!
//! Each test feeds a complete page through `convert` and checks the final
//! markdown, the chosen strategy or the returned error.

#![allow(clippy::expect_used)] // expect() is appropriate in tests for clear panic messages

use webpage_to_llm::{convert, convert_bytes, Error, Method, Options, TRUNCATION_MARKER};

fn options(method: Method) -> Options {
    Options {
        method,
        base_url: Some("https://e.com".to_string()),
        ..Options::default()
    }
}

#[test]
fn short_article_excludes_navigation() {
    let html = "<html><body><nav>Home</nav><article><h1>Hi</h1><p>World</p></article></body></html>";
    let result = convert(html, &options(Method::Auto)).expect("article should convert");

    assert_eq!(result.markdown, "# Hi\n\nWorld");
    assert_eq!(result.title, "Hi");
    assert_eq!(result.strategy, "structural");
    assert!(!result.truncated);
}

#[test]
fn ad_only_page_fails_for_every_method() {
    let html = r#"<html><body><div class="ad-banner">Buy now</div></body></html>"#;
    for method in [Method::Auto, Method::Precision, Method::Structural] {
        match convert(html, &options(method)) {
            Err(Error::ExtractionFailed { method: attempted, reason }) => {
                assert_eq!(attempted, method);
                assert!(!reason.is_empty());
            }
            other => panic!("{method}: expected ExtractionFailed, got {other:?}"),
        }
    }
}

#[test]
fn relative_images_are_resolved_against_the_base_url() {
    let html = r#"<html><body><article><p>Logo <img src="/a.png" alt="logo"></p></article></body></html>"#;
    let result = convert(html, &options(Method::Auto)).expect("image page should convert");
    assert!(
        result.markdown.contains("![logo](https://e.com/a.png)"),
        "got {}",
        result.markdown
    );
}

#[test]
fn long_paragraph_is_truncated_on_a_word_boundary() {
    let words: Vec<String> = (0..60).map(|i| format!("word{i}")).collect();
    let paragraph = words.join(" ");
    assert!(paragraph.len() >= 300);
    let html = format!("<html><body><article><p>{paragraph}</p></article></body></html>");

    let result = convert(
        &html,
        &Options {
            max_length: Some(100),
            ..options(Method::Auto)
        },
    )
    .expect("long paragraph should convert");

    assert!(result.truncated);
    assert!(result.markdown.chars().count() <= 100 + TRUNCATION_MARKER.chars().count());
    let head = result
        .markdown
        .strip_suffix(TRUNCATION_MARKER)
        .expect("output should end with the truncation marker");
    assert!(!head.is_empty());
    assert!(paragraph.starts_with(head), "head {head:?} is not a prefix");
    assert!(paragraph[head.len()..].starts_with(' '), "cut mid-word: {head:?}");
}

#[test]
fn header_row_becomes_a_pipe_table() {
    let html = "<html><body><article><table><tr><th>A</th><th>B</th></tr><tr><td>1</td><td>2</td></tr></table></article></body></html>";
    let result = convert(html, &options(Method::Structural)).expect("table should convert");

    let lines: Vec<&str> = result.markdown.lines().collect();
    assert_eq!(lines.len(), 3, "got {}", result.markdown);
    assert!(lines[0].starts_with("| A") && lines[0].contains("| B"));
    assert!(lines[1].starts_with("| -") && lines[1].chars().all(|c| matches!(c, '|' | '-' | ' ')));
    assert!(lines[2].starts_with("| 1") && lines[2].contains("| 2"));
}

#[test]
fn empty_and_whitespace_input_is_rejected() {
    for html in ["", "   \n\t  "] {
        assert!(matches!(convert(html, &Options::default()), Err(Error::EmptyInput)));
    }
    assert!(matches!(convert_bytes(&[], &Options::default()), Err(Error::EmptyInput)));
}

#[test]
fn long_article_is_taken_by_precision() {
    let sentence = "Readers come for the argument, and the argument needs room to breathe, so this paragraph keeps going.";
    let paragraphs: String = (0..6).map(|_| format!("<p>{sentence}</p>")).collect();
    let html = format!(
        r#"<html><body><div class="sidebar"><a href="/x">x</a></div><div class="story"><h1>Essay</h1>{paragraphs}</div></body></html>"#
    );
    let result = convert(&html, &options(Method::Auto)).expect("essay should convert");

    assert_eq!(result.strategy, "precision");
    assert!(result.markdown.starts_with("# Essay\n\n"));
    assert!(result.fragment_text_len >= 200);
    assert!(!result.markdown.contains("[x]"));
}

#[test]
fn document_title_is_used_when_the_content_has_no_heading() {
    let html = "<html><head><title>Release notes</title></head><body><main><p>Bug fixes.</p></main></body></html>";
    let result = convert(html, &Options::default()).expect("page should convert");
    assert_eq!(result.markdown, "# Release notes\n\nBug fixes.");
}

#[test]
fn title_heading_can_be_disabled() {
    let html = "<html><head><title>Release notes</title></head><body><main><p>Bug fixes.</p></main></body></html>";
    let result = convert(
        html,
        &Options {
            include_title: false,
            ..Options::default()
        },
    )
    .expect("page should convert");
    assert_eq!(result.markdown, "Bug fixes.");
}

#[test]
fn metadata_header_follows_the_title() {
    let html = r#"<html><head><title>Page</title>
        <meta name="description" content="About things">
        <link rel="canonical" href="https://e.com/post"></head>
        <body><article><h1>Page</h1><p>Text</p></article></body></html>"#;
    let result = convert(
        html,
        &Options {
            include_metadata_header: true,
            ..options(Method::Auto)
        },
    )
    .expect("page should convert");

    assert_eq!(
        result.markdown,
        "# Page\n\nSource: https://e.com/post\nDescription: About things\n\n---\n\nText"
    );
    assert_eq!(result.metadata.hostname.as_deref(), Some("e.com"));
}

#[test]
fn links_are_absolute_or_plain_text() {
    let html = r##"<html><body><main><p>See <a href="/docs">the docs</a>, <a href="#top">top</a> and <a href="">nothing</a>.</p></main></body></html>"##;

    let linked = convert(html, &options(Method::Structural)).expect("page should convert");
    assert!(linked.markdown.contains("[the docs](https://e.com/docs)"), "got {}", linked.markdown);
    assert!(!linked.markdown.contains("](#top)"));

    let plain = convert(
        html,
        &Options {
            include_links: false,
            ..options(Method::Structural)
        },
    )
    .expect("page should convert");
    assert!(plain.markdown.contains("See the docs, top and nothing."), "got {}", plain.markdown);
}

#[test]
fn code_blocks_keep_their_language() {
    let html = r#"<html><body><article><h1>Snippet</h1><pre><code class="language-rust">fn main() {
    println!("*hi*");
}</code></pre></article></body></html>"#;
    let result = convert(html, &Options::default()).expect("page should convert");
    assert_eq!(
        result.markdown,
        "# Snippet\n\n```rust\nfn main() {\n    println!(\"*hi*\");\n}\n```"
    );
}

#[test]
fn scripts_styles_and_cookie_banners_never_reach_the_output() {
    let html = r#"<html><head><style>body { color: red }</style></head><body>
        <div class="cookie-banner">We use cookies</div>
        <script>var tracking = true;</script>
        <main><p>Actual content.</p></main>
        <footer>Copyright</footer></body></html>"#;
    let result = convert(html, &Options::default()).expect("page should convert");

    assert_eq!(result.markdown, "Actual content.");
    for noise in ["cookies", "tracking", "color", "Copyright"] {
        assert!(!result.markdown.contains(noise), "{noise} leaked");
    }
}

#[test]
fn nested_lists_are_indented() {
    let html = "<html><body><main><ul><li>one<ul><li>inner</li></ul></li><li>two</li><li></li></ul><ol><li>a</li><li>b</li></ol></main></body></html>";
    let result = convert(html, &Options::default()).expect("page should convert");
    assert_eq!(result.markdown, "- one\n  - inner\n- two\n\n1. a\n2. b");
}

#[test]
fn bytes_are_decoded_with_the_declared_charset() {
    let html = b"<html><head><meta charset=\"windows-1252\"></head><body><main><p>Na\xefve caf\xe9</p></main></body></html>";
    let result = convert_bytes(html, &Options::default()).expect("bytes should convert");
    assert_eq!(result.markdown, "Na\u{ef}ve caf\u{e9}");
}

#[test]
fn deeply_nested_markup_still_converts() {
    let html = format!(
        "<html><body><main>{}<p>deep text</p>{}</main></body></html>",
        "<div>".repeat(600),
        "</div>".repeat(600)
    );
    let result = convert(&html, &Options::default()).expect("deep page should convert");
    assert_eq!(result.markdown, "deep text");

    let shallow_limit = convert(
        &html,
        &Options {
            max_tree_depth: 16,
            ..Options::default()
        },
    )
    .expect("deep page should convert under a small limit");
    assert_eq!(shallow_limit.markdown, "deep text");
}

#[test]
fn text_resembling_markdown_blocks_is_escaped() {
    let html = "<html><body><main><p># not a heading</p><p>- not a list</p><p>1. not a list</p><p>&gt; not quote</p></main></body></html>";
    let result = convert(html, &Options::default()).expect("page should convert");
    assert_eq!(
        result.markdown,
        "\\# not a heading\n\n\\- not a list\n\n1\\. not a list\n\n\\> not quote"
    );
}

#[test]
fn list_items_nest_two_spaces_and_keep_paragraphs() {
    let html = "<html><body><main><ol><li>a<ul><li>b</li></ul></li><li><p>first para</p><p>second para</p></li></ol></main></body></html>";
    let result = convert(html, &Options::default()).expect("page should convert");
    assert_eq!(result.markdown, "1. a\n  - b\n2. first para\n\n   second para");
}

#[test]
fn conversion_serializes_to_json() {
    let html = "<html><body><nav>Home</nav><article><h1>Hi</h1><p>World</p></article></body></html>";
    let result = convert(html, &options(Method::Auto)).expect("article should convert");
    let json: serde_json::Value =
        serde_json::from_str(&result.to_json().expect("serializable")).expect("valid JSON");

    assert_eq!(json["markdown"], "# Hi\n\nWorld");
    assert_eq!(json["strategy"], "structural");
    assert_eq!(json["metadata"]["url"], "https://e.com/");
}

//! Noise filter
//!
//! Removes scripts, chrome (navigation, sidebars, footers), ads and other
//! boilerplate before the extraction strategies look at the document.
//!
//! Matching is node-local (tag, attributes) plus one piece of ancestor
//! context (inside `article`/`main`), so a second pass over a filtered
//! document finds nothing new.

use tracing::debug;

use crate::dom::{self, Document, NodeRef, Selection};

/// Tags removed with their subtree.
pub const DEFAULT_REMOVED_TAGS: &[&str] = &[
    "script", "style", "noscript", "iframe", "svg", "form", "button", "input", "nav", "aside",
    "template", "object", "embed", "canvas",
];

/// Tags removed only when they sit outside the main content containers.
pub const DEFAULT_CHROME_TAGS: &[&str] = &["header", "footer"];

/// Case-insensitive substrings of `id`/`class` that mark boilerplate.
pub const DEFAULT_DENYLIST: &[&str] = &[
    "nav", "navigation", "sidebar", "footer", "header", "menu", "advert", "ad-", "banner",
    "cookie", "popup", "modal", "social", "share", "comment", "related", "breadcrumb",
];

/// Containers inside which chrome tags are kept (an article's own header
/// usually holds its title).
const CONTENT_CONTAINERS: &[&str] = &["article", "main"];

/// Structural elements never removed, whatever their class says.
const SKELETON_TAGS: &[&str] = &["html", "head", "body", "title", "meta", "base", "link"];

/// Denylists for the noise filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterConfig {
    /// Tags removed everywhere.
    pub removed_tags: Vec<String>,

    /// Tags removed outside `article`/`main`.
    pub chrome_tags: Vec<String>,

    /// `id`/`class` substrings marking boilerplate.
    pub denylist: Vec<String>,

    /// Keep `<svg role="img">` carrying an `aria-label` or `<title>`.
    ///
    /// Default: `true`
    pub keep_meaningful_svg: bool,

    /// Remove elements hidden with `hidden`, `aria-hidden` or inline styles.
    ///
    /// Default: `true`
    pub remove_hidden: bool,
}

impl Default for FilterConfig {
    fn default() -> Self {
        let owned = |list: &[&str]| -> Vec<String> { list.iter().map(|s| (*s).to_string()).collect() };
        Self {
            removed_tags: owned(DEFAULT_REMOVED_TAGS),
            chrome_tags: owned(DEFAULT_CHROME_TAGS),
            denylist: owned(DEFAULT_DENYLIST),
            keep_meaningful_svg: true,
            remove_hidden: true,
        }
    }
}

/// Removes boilerplate elements from a document.
#[derive(Debug, Clone)]
pub struct NoiseFilter {
    config: FilterConfig,
}

impl NoiseFilter {
    /// Build a filter; denylist entries are matched case-insensitively.
    #[must_use]
    pub fn new(mut config: FilterConfig) -> Self {
        for list in [&mut config.removed_tags, &mut config.chrome_tags, &mut config.denylist] {
            for entry in list.iter_mut() {
                *entry = entry.trim().to_lowercase();
            }
            list.retain(|entry| !entry.is_empty());
        }
        Self { config }
    }

    /// Filter a document, consuming it.
    #[must_use]
    pub fn filter(&self, doc: Document) -> Document {
        self.filter_in_place(&doc);
        doc
    }

    /// Remove noise from `doc` and return how many subtrees were dropped.
    pub fn filter_in_place(&self, doc: &Document) -> usize {
        let Some(root) = doc.select("html").nodes().first().copied() else {
            return 0;
        };

        // Depth-first walk that does not descend into doomed subtrees, so
        // every recorded node is the top of a removed subtree.
        let mut doomed: Vec<NodeRef> = Vec::new();
        let mut stack: Vec<(NodeRef, bool)> = vec![(root, false)];
        while let Some((node, in_content)) = stack.pop() {
            let Some(tag) = dom::node_tag(&node) else {
                continue;
            };
            let sel = Selection::from(node);
            if self.is_noise(&sel, &tag, in_content) {
                doomed.push(node);
                continue;
            }
            let in_content = in_content || CONTENT_CONTAINERS.contains(&tag.as_str());
            for child in node.children().into_iter().rev() {
                if child.is_element() {
                    stack.push((child, in_content));
                }
            }
        }

        for node in &doomed {
            Selection::from(*node).remove();
        }
        debug!(removed = doomed.len(), "noise filter pass");
        doomed.len()
    }

    /// Decide whether one element is noise.
    fn is_noise(&self, sel: &Selection, tag: &str, in_content: bool) -> bool {
        if SKELETON_TAGS.contains(&tag) {
            return false;
        }

        if self.config.removed_tags.iter().any(|t| t == tag) {
            return !(tag == "svg" && self.config.keep_meaningful_svg && is_meaningful_svg(sel));
        }

        if !in_content && self.config.chrome_tags.iter().any(|t| t == tag) {
            return true;
        }

        if self.config.remove_hidden && is_hidden(sel) {
            return true;
        }

        let id_class = dom::id_and_class(sel);
        !id_class.is_empty()
            && self
                .config
                .denylist
                .iter()
                .any(|needle| id_class.contains(needle.as_str()))
    }
}

impl Default for NoiseFilter {
    fn default() -> Self {
        Self::new(FilterConfig::default())
    }
}

/// Inline SVG that stands for an image: labelled and announced as one.
fn is_meaningful_svg(sel: &Selection) -> bool {
    let role_img = sel
        .attr("role")
        .is_some_and(|r| r.trim().eq_ignore_ascii_case("img"));
    role_img && (dom::non_empty_attribute(sel, "aria-label").is_some() || sel.select("title").exists())
}

fn is_hidden(sel: &Selection) -> bool {
    if sel.has_attr("hidden") {
        return true;
    }
    if sel
        .attr("aria-hidden")
        .is_some_and(|v| v.trim().eq_ignore_ascii_case("true"))
    {
        return true;
    }
    sel.attr("style").is_some_and(|style| {
        let compact: String = style
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect::<String>()
            .to_lowercase();
        compact.contains("display:none") || compact.contains("visibility:hidden")
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filtered(html: &str) -> Document {
        NoiseFilter::default().filter(dom::parse(html))
    }

    #[test]
    fn removes_denied_tags() {
        let doc = filtered(
            "<body><script>x()</script><style>p{}</style><form><input></form><button>b</button><p>keep</p></body>",
        );
        for tag in ["script", "style", "form", "input", "button"] {
            assert!(doc.select(tag).is_empty(), "{tag} should be removed");
        }
        assert_eq!(dom::normalized_text(&doc.select("body")), "keep");
    }

    #[test]
    fn removes_by_id_and_class_substring() {
        let doc = filtered(
            r#"<body>
                <div class="ad-banner">Buy now</div>
                <div id="SiteMenu">menu</div>
                <section class="post-comments">c</section>
                <ul class="Breadcrumbs"><li>a</li></ul>
                <div class="article-body"><p>keep</p></div>
            </body>"#,
        );
        assert_eq!(dom::normalized_text(&doc.select("body")), "keep");
    }

    #[test]
    fn removes_whole_subtree() {
        let doc = filtered(r#"<body><div class="sidebar"><article><p>inner</p></article></div><p>x</p></body>"#);
        assert!(doc.select("article").is_empty());
    }

    #[test]
    fn keeps_header_inside_article() {
        let doc = filtered(
            "<body><header>Site</header><article><header><h1>Title</h1></header><p>Body</p></article><footer>f</footer></body>",
        );
        assert_eq!(doc.select("header").length(), 1);
        assert!(doc.select("article h1").exists());
        assert!(doc.select("footer").is_empty());
    }

    #[test]
    fn removes_nav_and_aside_everywhere() {
        let doc = filtered("<body><nav>Home</nav><article><aside>tip</aside><p>World</p></article></body>");
        assert!(doc.select("nav").is_empty());
        assert!(doc.select("aside").is_empty());
        assert!(doc.select("article p").exists());
    }

    #[test]
    fn removes_hidden_elements() {
        let doc = filtered(
            r#"<body><p hidden>a</p><p aria-hidden="true">b</p><p style="display: none">c</p><p style="color:red">d</p></body>"#,
        );
        assert_eq!(dom::normalized_text(&doc.select("body")), "d");
    }

    #[test]
    fn keeps_meaningful_svg_only() {
        let doc = filtered(
            r#"<body><svg id="deco"><path d="M0"/></svg><svg id="chart" role="img" aria-label="Sales chart"><path d="M1"/></svg></body>"#,
        );
        assert!(doc.select("#deco").is_empty());
        assert!(doc.select("#chart").exists());
    }

    #[test]
    fn never_removes_document_skeleton() {
        let doc = filtered(r#"<html class="has-navigation"><body class="sidebar-open"><p>text</p></body></html>"#);
        assert!(doc.select("body").exists());
        assert!(doc.select("p").exists());
    }

    #[test]
    fn preserves_content_elements() {
        let html = r#"<body><h2>T</h2><p>p</p><ul><li>i</li></ul><table><tr><td>c</td></tr></table>
            <pre><code>x</code></pre><blockquote>q</blockquote><img src="a.png" alt="A"><a href="/x">link</a></body>"#;
        let doc = filtered(html);
        for tag in ["h2", "p", "ul", "li", "table", "pre", "code", "blockquote", "img", "a"] {
            assert!(doc.select(tag).exists(), "{tag} should survive");
        }
    }

    #[test]
    fn keeps_empty_elements() {
        let doc = filtered("<body><p></p><div><span></span></div></body>");
        assert!(doc.select("p").exists());
        assert!(doc.select("span").exists());
    }

    #[test]
    fn filter_is_idempotent() {
        let html = r#"<body><nav>n</nav><div class="menu">m</div><article><header>h</header><p>body</p>
            <div class="share-links">s</div></article><footer>f</footer></body>"#;
        let filter = NoiseFilter::default();
        let once = filter.filter(dom::parse(html));
        let once_html = once.html().to_string();
        let removed = filter.filter_in_place(&once);
        assert_eq!(removed, 0);
        assert_eq!(once.html().to_string(), once_html);
    }

    #[test]
    fn custom_denylist_is_case_insensitive() {
        let filter = NoiseFilter::new(FilterConfig {
            denylist: vec!["PROMO".to_string()],
            ..FilterConfig::default()
        });
        let doc = filter.filter(dom::parse(r#"<body><div class="promo-box">x</div><div class="menu">kept</div></body>"#));
        assert!(doc.select(".promo-box").is_empty());
        assert!(doc.select(".menu").exists());
    }
}

//! Conversion benchmarks.
//!
//! Run with: `cargo bench`
//!
//! - A small synthetic article (~1KB) through each method
//! - A generated long page to measure scaling with document size
//! - Saved pages from `benches/pages/` when present

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use std::fs;
use webpage_to_llm::{convert, Method, Options};

const SAMPLE_HTML: &str = r#"
<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <title>Sample Article</title>
    <meta name="description" content="A sample article for benchmarking.">
</head>
<body>
    <nav>
        <a href="/">Home</a>
        <a href="/about">About</a>
    </nav>
    <article>
        <h1>Sample Article Title</h1>
        <p>This is the first paragraph of the article. It contains some meaningful
        content, with <a href="/link">a link</a>, that should survive conversion.</p>
        <p>Here is a second paragraph with more content. Conversion should
        preserve the text while removing navigation and other boilerplate.</p>
        <pre><code class="language-rust">fn main() { println!("hi"); }</code></pre>
        <table><tr><th>Name</th><th>Value</th></tr><tr><td>a</td><td>1</td></tr></table>
    </article>
    <aside>
        <h3>Related Articles</h3>
        <ul><li>Related article 1</li><li>Related article 2</li></ul>
    </aside>
    <footer><p>Copyright 2024</p></footer>
</body>
</html>
"#;

fn long_page(sections: usize) -> String {
    let mut body = String::from("<html><body><nav><a href=\"/\">Home</a></nav><article><h1>Long</h1>");
    for i in 0..sections {
        body.push_str(&format!(
            "<h2>Section {i}</h2><p>Paragraph {i} talks about parsing, rendering, and \
             truncating documents so a model can read them.</p><ul><li>one</li><li>two</li></ul>"
        ));
    }
    body.push_str("</article><footer>Footer</footer></body></html>");
    body
}

fn bench_methods(c: &mut Criterion) {
    let mut group = c.benchmark_group("sample");
    for method in [Method::Auto, Method::Precision, Method::Structural] {
        let options = Options {
            method,
            ..Options::default()
        };
        group.bench_with_input(BenchmarkId::new("convert", method), &options, |b, options| {
            b.iter(|| convert(black_box(SAMPLE_HTML), black_box(options)));
        });
    }
    group.finish();
}

fn bench_scaling(c: &mut Criterion) {
    let options = Options::default();
    let mut group = c.benchmark_group("scaling");
    for sections in [10, 100, 1_000] {
        let html = long_page(sections);
        group.throughput(Throughput::Bytes(html.len() as u64));
        group.bench_with_input(BenchmarkId::new("sections", sections), &html, |b, html| {
            b.iter(|| convert(black_box(html), black_box(&options)));
        });
    }
    group.finish();
}

/// Saved real-world pages, skipped when the directory is missing.
fn bench_saved_pages(c: &mut Criterion) {
    let Ok(entries) = fs::read_dir("benches/pages") else {
        return;
    };
    let options = Options {
        max_length: Some(8_000),
        ..Options::default()
    };

    let mut group = c.benchmark_group("saved_pages");
    for entry in entries.flatten() {
        let path = entry.path();
        if let Ok(html) = fs::read_to_string(&path) {
            let name = path.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default();
            let size_kb = html.len() / 1024;
            group.throughput(Throughput::Bytes(html.len() as u64));
            group.bench_with_input(
                BenchmarkId::new("convert", format!("{name} ({size_kb}KB)")),
                &html,
                |b, html| {
                    b.iter(|| convert(black_box(html), black_box(&options)));
                },
            );
        }
    }
    group.finish();
}

criterion_group!(benches, bench_methods, bench_scaling, bench_saved_pages);
criterion_main!(benches);

//! Convert saved HTML pages to Markdown for pasting into an LLM chat.
//!
//! Usage:
//!   webpage-to-llm page.html
//!   curl -s https://example.com | webpage-to-llm -u https://example.com
//!   webpage-to-llm a.html b.html --json -o pages.json

use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::thread;

use anyhow::{anyhow, bail, Context, Result};
use clap::Parser;
use serde::Serialize;
use tracing::{debug, warn};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use webpage_to_llm::{convert_bytes, Conversion, Error, Method, Options};

#[derive(Parser, Debug)]
#[command(
    name = "webpage-to-llm",
    version,
    about = "Convert web pages into clean markdown for LLM chats"
)]
struct Cli {
    /// HTML files to convert; `-` or no input reads stdin
    inputs: Vec<PathBuf>,

    /// Base URL for resolving relative links and images
    #[arg(short = 'u', long)]
    base_url: Option<String>,

    /// Extraction method: auto, precision or structural
    #[arg(short, long, default_value_t = Method::Auto)]
    method: Method,

    /// Write output to FILE instead of stdout
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Truncate the markdown to at most N characters
    #[arg(long, value_name = "N")]
    max_length: Option<usize>,

    /// Add a Source/Description header below the title
    #[arg(long)]
    metadata: bool,

    /// Render links as plain text
    #[arg(long)]
    no_links: bool,

    /// Drop images
    #[arg(long)]
    no_images: bool,

    /// Drop tables
    #[arg(long)]
    no_tables: bool,

    /// Skip blocks whose text already appeared
    #[arg(long)]
    dedup: bool,

    /// Print the full conversion result as JSON
    #[arg(long)]
    json: bool,

    /// Log pipeline decisions to stderr
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn options(&self) -> Options {
        Options {
            method: self.method,
            base_url: self.base_url.clone(),
            max_length: self.max_length,
            include_metadata_header: self.metadata,
            include_links: !self.no_links,
            include_images: !self.no_images,
            include_tables: !self.no_tables,
            deduplicate: self.dedup,
            ..Options::default()
        }
    }

    fn sources(&self) -> Result<Vec<Source>> {
        if self.inputs.is_empty() {
            return Ok(vec![Source::Stdin]);
        }
        let sources: Vec<Source> = self
            .inputs
            .iter()
            .map(|path| {
                if path.as_os_str() == "-" {
                    Source::Stdin
                } else {
                    Source::File(path.clone())
                }
            })
            .collect();
        if sources.iter().filter(|s| matches!(s, Source::Stdin)).count() > 1 {
            bail!("stdin (`-`) can only be given once");
        }
        Ok(sources)
    }
}

#[derive(Debug)]
enum Source {
    Stdin,
    File(PathBuf),
}

impl Source {
    fn name(&self) -> String {
        match self {
            Self::Stdin => "<stdin>".to_string(),
            Self::File(path) => path.display().to_string(),
        }
    }

    fn read(&self) -> Result<Vec<u8>> {
        match self {
            Self::Stdin => {
                let mut buf = Vec::new();
                io::stdin().read_to_end(&mut buf).context("failed to read stdin")?;
                Ok(buf)
            }
            Self::File(path) => {
                fs::read(path).with_context(|| format!("failed to read {}", path.display()))
            }
        }
    }
}

#[derive(Serialize)]
struct JsonEntry<'a> {
    input: String,
    #[serde(flatten)]
    conversion: &'a Conversion,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            if let Some(hint) = err.chain().find_map(|e| e.downcast_ref::<Error>()).and_then(hint) {
                eprintln!("hint: {hint}");
            }
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let fmt_layer = fmt::layer().with_target(false).with_writer(io::stderr);

    // A second init (tests, embedding) is harmless.
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer.compact())
        .try_init();
}

fn hint(err: &Error) -> Option<&'static str> {
    match err {
        Error::ExtractionFailed { method, .. } => Some(match method {
            Method::Auto => "the page may be rendered by JavaScript; save it from a browser and retry",
            Method::Precision => "try --method structural",
            Method::Structural => "try --method precision or --method auto",
        }),
        _ => None,
    }
}

fn run(cli: &Cli) -> Result<()> {
    let options = cli.options();
    let sources = cli.sources()?;
    debug!(inputs = sources.len(), method = %options.method, "starting");

    let results = convert_all(&sources, &options);

    // Nothing is written unless every input converted.
    let mut conversions = Vec::with_capacity(results.len());
    for (source, result) in sources.iter().zip(results) {
        let conversion = result?;
        for warning in &conversion.warnings {
            warn!(input = %source.name(), "{warning}");
        }
        conversions.push((source, conversion));
    }

    let rendered = if cli.json {
        render_json(&conversions)?
    } else {
        conversions
            .iter()
            .map(|(_, c)| c.markdown.as_str())
            .collect::<Vec<_>>()
            .join("\n\n")
    };

    write_output(cli.output.as_deref(), &rendered)
}

/// Converts every source, in parallel when there is more than one.
/// Results keep input order.
fn convert_all(sources: &[Source], options: &Options) -> Vec<Result<Conversion>> {
    if let [source] = sources {
        return vec![convert_source(source, options)];
    }
    thread::scope(|scope| {
        let handles: Vec<_> = sources
            .iter()
            .map(|source| scope.spawn(move || convert_source(source, options)))
            .collect();
        handles
            .into_iter()
            .map(|handle| {
                handle
                    .join()
                    .unwrap_or_else(|_| Err(anyhow!("conversion thread panicked")))
            })
            .collect()
    })
}

fn convert_source(source: &Source, options: &Options) -> Result<Conversion> {
    let bytes = source.read()?;
    convert_bytes(&bytes, options).with_context(|| format!("failed to convert {}", source.name()))
}

fn render_json(conversions: &[(&Source, Conversion)]) -> Result<String> {
    let rendered = if let [(_, conversion)] = conversions {
        conversion.to_json()?
    } else {
        let entries: Vec<JsonEntry<'_>> = conversions
            .iter()
            .map(|(source, conversion)| JsonEntry {
                input: source.name(),
                conversion,
            })
            .collect();
        serde_json::to_string_pretty(&entries)?
    };
    Ok(rendered)
}

fn write_output(path: Option<&Path>, rendered: &str) -> Result<()> {
    match path {
        Some(path) => {
            let mut text = rendered.to_string();
            text.push('\n');
            fs::write(path, text).with_context(|| format!("failed to write {}", path.display()))
        }
        None => {
            let mut stdout = io::stdout().lock();
            writeln!(stdout, "{rendered}").context("failed to write stdout")
        }
    }
}

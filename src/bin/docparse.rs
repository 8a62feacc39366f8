//! Command-line front end: parse a PDF and emit the chunk JSON.

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use docparse::{parse_document, ChunkMode, ParseConfig};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ModeArg {
    /// One chunk per page with a model-generated summary.
    Page,
    /// One chunk per block, no extra model calls.
    Block,
}

impl From<ModeArg> for ChunkMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Page => ChunkMode::Page,
            ModeArg::Block => ChunkMode::Block,
        }
    }
}

/// Parse a PDF into embedding-ready chunks using a vision model.
#[derive(Debug, Parser)]
#[command(name = "docparse", version, about)]
struct Cli {
    /// Input PDF file.
    input: PathBuf,

    /// Output JSON file (stdout when omitted).
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Chunking mode.
    #[arg(long, value_enum, default_value = "page")]
    mode: ModeArg,

    /// Model identifier for analysis and summary calls.
    #[arg(long, default_value = "gpt-4.1-mini")]
    model: String,

    /// Maximum simultaneous in-flight model calls.
    #[arg(long, default_value_t = 10)]
    concurrency: usize,

    /// Pretty-print the output JSON.
    #[arg(long)]
    pretty: bool,

    /// Verbose logging (-v for debug, -vv for trace).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress all log output.
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

fn init_logging(cli: &Cli) {
    let level = if cli.quiet {
        "off"
    } else {
        match cli.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(format!("docparse={level}")));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli);

    let bytes = std::fs::read(&cli.input)
        .with_context(|| format!("failed to read {}", cli.input.display()))?;

    let config = ParseConfig::builder()
        .chunk_mode(cli.mode.into())
        .model(&cli.model)
        .concurrency(cli.concurrency)
        .build()?;

    let document = parse_document(&bytes, &config).await?;

    let json = if cli.pretty {
        serde_json::to_string_pretty(&document)?
    } else {
        serde_json::to_string(&document)?
    };

    match &cli.output {
        Some(path) => std::fs::write(path, json)
            .with_context(|| format!("failed to write {}", path.display()))?,
        None => println!("{json}"),
    }

    Ok(())
}

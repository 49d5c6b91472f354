/// Command-line entry point
///
/// Validates the input path up front, bulk-reads (and gunzips if needed) the
/// feed, runs the pipeline and writes the VWAP report as JSON.

use anyhow::{bail, Context, Result};
use clap::Parser;
use flate2::read::GzDecoder;
use itch_vwap::output::{default_output_path, write_report_file};
use itch_vwap::stats::timed;
use itch_vwap::{Pipeline, PipelineConfig, UnknownTagPolicy};
use std::fs::File;
use std::io::{Cursor, Read};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

#[derive(Parser, Debug)]
#[command(name = "itch-vwap", about = "Hourly cumulative VWAP per symbol from an ITCH feed")]
struct Cli {
    /// Feed file, raw or gzip-compressed
    input: PathBuf,

    /// Output path; defaults to <input file name>.json in the current directory
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Fail on tag bytes missing from the length table instead of skipping them
    #[arg(long)]
    strict_tags: bool,

    /// Frames between progress log lines (0 disables)
    #[arg(long, default_value_t = 1_000_000)]
    progress_interval: u64,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    if !cli.input.is_file() {
        bail!("input file not found: {}", cli.input.display());
    }

    timed("itch-vwap", || run(&cli))
}

fn run(cli: &Cli) -> Result<()> {
    let data = load(&cli.input)?;
    tracing::info!(path = %cli.input.display(), bytes = data.len(), "feed loaded");

    let policy = if cli.strict_tags {
        UnknownTagPolicy::Fail
    } else {
        UnknownTagPolicy::SkipByte
    };
    let config = PipelineConfig::new()
        .with_unknown_tags(policy)
        .with_progress_interval(cli.progress_interval);

    let mut pipeline = Pipeline::new(config);
    let reason = timed("decode", || pipeline.run(Cursor::new(data)))
        .context("decode aborted")?;
    tracing::info!(?reason, fills = pipeline.ledger().len(), "decode finished");

    let report = pipeline.report();
    for err in report.unmapped() {
        tracing::error!("{}", err);
    }
    pipeline.stats().log_summary();

    let output = cli
        .output
        .clone()
        .unwrap_or_else(|| default_output_path(&cli.input));
    write_report_file(&output, &report)?;
    tracing::info!(path = %output.display(), symbols = report.symbol_count(), "report written");
    Ok(())
}

/// Read the whole file, decompressing when it starts with the gzip magic
fn load(path: &Path) -> Result<Vec<u8>> {
    let mut raw = Vec::new();
    File::open(path)
        .and_then(|mut f| f.read_to_end(&mut raw))
        .with_context(|| format!("unable to read {}", path.display()))?;

    if !raw.starts_with(&GZIP_MAGIC) {
        return Ok(raw);
    }

    let mut data = Vec::new();
    GzDecoder::new(raw.as_slice())
        .read_to_end(&mut data)
        .with_context(|| format!("unable to decompress {}", path.display()))?;
    Ok(data)
}

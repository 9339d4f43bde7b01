// Chunk: docs/chunks/format_merge - Formatter output merge engine

//! `fmtmerge` command: merge formatter output into a file in place.
//!
//! ```text
//! rustfmt --emit stdout src/lib.rs | fmtmerge src/lib.rs --formatted -
//! ```

use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use fmtmerge::{DiffStats, MergeConfig, Merger, RaceCheck, TextSnapshot};
use fmtmerge_buffer::TextBuffer;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "fmtmerge", version, about = "Merge formatter output into a file with minimal edits")]
struct Cli {
    /// File to update
    file: PathBuf,

    /// Formatter output (`-` for stdin)
    #[arg(long, value_name = "PATH")]
    formatted: String,

    /// Config file (defaults to the platform config dir)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Report whether the file would change without writing it
    #[arg(long)]
    check: bool,

    /// Override the configured race check
    #[arg(long, value_enum)]
    race_check: Option<RaceCheckArg>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum RaceCheckArg {
    Length,
    ContentHash,
}

impl From<RaceCheckArg> for RaceCheck {
    fn from(arg: RaceCheckArg) -> Self {
        match arg {
            RaceCheckArg::Length => RaceCheck::Length,
            RaceCheckArg::ContentHash => RaceCheck::ContentHash,
        }
    }
}

fn main() -> ExitCode {
    init_logging();
    match run(Cli::parse()) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::from(2)
        }
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<ExitCode> {
    let mut config = match &cli.config {
        Some(path) => MergeConfig::load(path)?,
        None => MergeConfig::load_default()?,
    };
    if let Some(race_check) = cli.race_check {
        config.race_check = race_check.into();
    }

    let original = fs::read_to_string(&cli.file)
        .with_context(|| format!("failed to read {}", cli.file.display()))?;
    let mut buffer = TextBuffer::from_str(&original);
    if buffer.is_empty() {
        eprintln!("{}: empty document, skipped", cli.file.display());
        return Ok(ExitCode::SUCCESS);
    }

    let snapshot = TextSnapshot::capture(&buffer);
    let formatted = read_formatted(&cli.formatted)?;
    let merger = Merger::new(config);

    if cli.check {
        let stats = DiffStats::of(&merger.plan(&snapshot, &formatted));
        if stats.changes() == 0 {
            return Ok(ExitCode::SUCCESS);
        }
        println!(
            "{}: would change ({} edits, +{} -{} chars)",
            cli.file.display(),
            stats.changes(),
            stats.chars_inserted,
            stats.chars_removed
        );
        return Ok(ExitCode::from(1));
    }

    let outcome = merger.merge(&snapshot, &formatted, &mut buffer);
    if let Some(reason) = outcome.reason {
        return Err(reason).context("merge aborted");
    }
    if outcome.applied {
        write_back(&cli.file, &buffer.content())?;
        let stats = outcome.stats();
        println!("{}: {} edits applied", cli.file.display(), stats.changes());
    }
    Ok(ExitCode::SUCCESS)
}

fn read_formatted(source: &str) -> Result<String> {
    if source == "-" {
        let mut text = String::new();
        io::stdin()
            .read_to_string(&mut text)
            .context("failed to read formatter output from stdin")?;
        Ok(text)
    } else {
        fs::read_to_string(source).with_context(|| format!("failed to read {source}"))
    }
}

/// Writes through a sibling temp file, then renames it over `path`.
fn write_back(path: &Path, content: &str) -> Result<()> {
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".fmtmerge.tmp");
    let tmp = PathBuf::from(tmp);

    fs::write(&tmp, content).with_context(|| format!("failed to write {}", tmp.display()))?;
    fs::rename(&tmp, path).with_context(|| format!("failed to replace {}", path.display()))?;
    Ok(())
}

//! CLI binary for pagescribe.
//!
//! A thin shim over the library crate that maps CLI flags to `RunConfig`
//! and prints per-document results.

use anyhow::{Context, Result};
use clap::Parser;
use pagescribe::{assemble, run, PagescribeError, RunConfig};
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}

const AFTER_HELP: &str = r#"FILENAME CONVENTION:
  Pages group into documents by name: a title, a separator (space, 'X',
  '-' or '_'), and a page number.

    AlgebraX1.png  AlgebraX2.png        → document "Algebra"
    Quick Notes 1.jpg  Quick Notes 2.jpg → document "Quick Notes"

  PDFs in the folder are expanded first: Report.pdf becomes
  Report_1.png, Report_2.png, ... and groups as document "Report".

CACHING:
  Results are written through to processed_log.json inside the source
  folder after every page. Re-running only transcribes pages that are new
  or have changed on disk. Delete a page's entry from the log to force a
  retranscription.

ENVIRONMENT VARIABLES:
  GEMINI_API_KEY    Gemini API key (GOOGLE_API_KEY also accepted)

SETUP:
  1. Set API key:   export GEMINI_API_KEY=...
  2. Run:           pagescribe ~/scans/linear-algebra
"#;

/// Transcribe a folder of scanned handwritten pages into LaTeX and Markdown.
#[derive(Parser, Debug)]
#[command(
    name = "pagescribe",
    version,
    about = "Transcribe scanned handwritten pages into LaTeX and Markdown",
    long_about = "Transcribe a folder of scanned or photographed handwritten pages into \
per-document LaTeX and Markdown files using a vision model. Pages are grouped into \
documents by filename convention; PDFs are expanded into page images first.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Source directory containing the scanned pages (and the ledger).
    source_dir: PathBuf,

    /// Write .tex/.md files here instead of the source directory.
    #[arg(short, long, env = "PAGESCRIBE_OUTPUT_DIR")]
    output_dir: Option<PathBuf>,

    /// Vision model ID.
    #[arg(long, env = "PAGESCRIBE_MODEL", default_value = pagescribe::DEFAULT_MODEL)]
    model: String,

    /// Transcription API key (falls back to GEMINI_API_KEY / GOOGLE_API_KEY).
    #[arg(long, env = "PAGESCRIBE_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Pause after every live transcription call, in milliseconds.
    #[arg(long, env = "PAGESCRIBE_DELAY_MS", default_value_t = 1000)]
    delay_ms: u64,

    /// Per-transcription-call timeout in seconds.
    #[arg(long, env = "PAGESCRIBE_API_TIMEOUT", default_value_t = 120)]
    api_timeout: u64,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "PAGESCRIBE_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "PAGESCRIBE_QUIET")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    let filter = if cli.quiet {
        "error"
    } else if cli.verbose {
        "debug"
    } else {
        "info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── Build config ─────────────────────────────────────────────────────
    let mut builder = RunConfig::builder()
        .model(&cli.model)
        .inter_page_delay_ms(cli.delay_ms)
        .api_timeout_secs(cli.api_timeout);
    if let Some(ref key) = cli.api_key {
        builder = builder.api_key(key);
    }
    if let Some(ref dir) = cli.output_dir {
        builder = builder.output_dir(dir);
    }
    let config = builder.build().context("Invalid configuration")?;

    // ── Run ──────────────────────────────────────────────────────────────
    let summary = match run(&cli.source_dir, &config).await {
        Ok(summary) => summary,
        Err(e @ PagescribeError::TranscriberNotConfigured { .. }) => {
            eprintln!("{} Configuration Error: {e}", red("✘"));
            return Ok(ExitCode::FAILURE);
        }
        Err(e) => {
            eprintln!("{} {e}", red("✘"));
            return Ok(ExitCode::FAILURE);
        }
    };

    // ── Report ───────────────────────────────────────────────────────────
    if !cli.quiet {
        for doc in &summary.documents {
            let written = [doc.tex_path.as_ref(), doc.md_path.as_ref()]
                .into_iter()
                .flatten()
                .map(|p| p.display().to_string())
                .collect::<Vec<_>>()
                .join(", ");
            eprintln!(
                "{} {}  {}  →  {}",
                green("✔"),
                bold(&doc.title),
                dim(&format!("{} pages", doc.page_count)),
                written
            );
        }
        let s = &summary.stats;
        eprintln!(
            "{} pages  ({} cached, {} transcribed, {} failed)  {}ms",
            s.total_pages, s.cached_pages, s.transcribed_pages, s.failed_pages, s.duration_ms
        );

        if s.transcribed_pages > 0 {
            eprintln!("\nAdd the following packages to your main LaTeX document:");
            eprintln!("{}", assemble::LATEX_PACKAGES_BLOCK);
        }
    }

    let any_unwritten = summary
        .documents
        .iter()
        .any(|d| d.tex_path.is_none() || d.md_path.is_none());
    Ok(if any_unwritten {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}

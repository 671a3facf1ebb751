//! The pipeline orchestrator.
//!
//! Composes the stages into one run over a source directory: expand PDFs,
//! group pages, and for each page consult the ledger, enhance and
//! transcribe on a miss, write the result through, and finally assemble
//! per-document LaTeX and Markdown files.
//!
//! ## Per-page state machine
//!
//! ```text
//! UNSEEN ──(cache hit)──────────────────────────────▶ DONE
//! UNSEEN ──▶ ENHANCING ──▶ TRANSCRIBING ──▶ LEDGER_UPDATE ──▶ DONE
//! ```
//!
//! There is no retry state. A transcription failure still reaches DONE
//! with error-marker content recorded in the ledger, so a permanently
//! failing page is not retried forever; an operator forces a retry by
//! deleting the page's ledger entry.
//!
//! ## Why strictly sequential?
//!
//! The ledger is written through after every page, and that ordering is
//! the crash-safety story: interrupting a run loses at most the in-flight
//! page. Processing pages one at a time keeps the ledger's
//! read-modify-write free of any locking discipline. Parallelising this
//! loop would require per-entry or whole-document locking around
//! [`Ledger::mark_processed`] to preserve the write-through guarantee.

use crate::assemble;
use crate::config::{RunConfig, LEDGER_FILE_NAME};
use crate::error::PagescribeError;
use crate::ledger::Ledger;
use crate::output::{DocumentReport, RunStats, RunSummary};
use crate::pipeline::enhance::enhance_page;
use crate::pipeline::expand::expand_pdf;
use crate::pipeline::group::scan_groups;
use crate::pipeline::transcribe::{GeminiTranscriber, Transcriber};
use crate::content::PageContent;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tokio::time::{sleep, Duration};
use tracing::{info, warn};

/// Run the full pipeline over one source directory.
///
/// # Errors
/// Returns `Err(PagescribeError)` only for setup failures — a missing
/// source directory or an unconfigured transcription service. Every
/// later failure (PDF expansion, enhancement, transcription, output
/// writes) degrades per component contract and the run continues.
pub async fn run(
    source_dir: impl AsRef<Path>,
    config: &RunConfig,
) -> Result<RunSummary, PagescribeError> {
    let started = Instant::now();
    let source_dir = source_dir.as_ref();

    // ── Step 1: Validate setup — the only fatal category ─────────────────
    if !source_dir.exists() {
        return Err(PagescribeError::SourceDirNotFound {
            path: source_dir.to_path_buf(),
        });
    }
    if !source_dir.is_dir() {
        return Err(PagescribeError::NotADirectory {
            path: source_dir.to_path_buf(),
        });
    }
    let transcriber = resolve_transcriber(config)?;
    let output_dir = config.output_dir.as_deref().unwrap_or(source_dir);
    info!("Processing directory: {}", source_dir.display());

    // ── Step 2: Load the ledger ──────────────────────────────────────────
    let mut ledger = Ledger::load(source_dir.join(LEDGER_FILE_NAME));

    // ── Step 3: Expand PDFs into the working directory ───────────────────
    for pdf in detect_pdfs(source_dir).map_err(io_internal)? {
        info!("Found PDF: {}. Converting to images...", pdf.display());
        match expand_pdf(&pdf, source_dir).await {
            Ok(pages) => info!("Expanded {} pages from '{}'", pages.len(), pdf.display()),
            Err(e) => warn!("{e}"),
        }
    }

    // ── Step 4: Group pages by filename convention ───────────────────────
    let groups = scan_groups(source_dir).map_err(io_internal)?;
    if groups.is_empty() {
        warn!("No images found matching the grouping pattern in '{}'", source_dir.display());
    }

    // ── Step 5: Per-group, per-page processing ───────────────────────────
    let mut stats = RunStats::default();
    let mut documents = Vec::with_capacity(groups.len());

    for (title, pages) in &groups {
        info!("--- Processing Group: {title} ({} pages) ---", pages.len());
        let mut latex_pages = Vec::with_capacity(pages.len());
        let mut md_pages = Vec::with_capacity(pages.len());

        for page in pages {
            stats.total_pages += 1;
            let file_name = page
                .path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();

            let content = if ledger.is_processed(&page.path) {
                info!("Loading cached: {file_name}");
                stats.cached_pages += 1;
                ledger
                    .cached_content(&page.path)
                    .cloned()
                    // is_processed == true implies an entry exists.
                    .unwrap_or_else(|| PageContent::Legacy(String::new()))
            } else {
                info!("Processing: {file_name}");
                let content =
                    process_live_page(transcriber.as_ref(), &page.path, &file_name, &mut stats)
                        .await?;

                if let Err(e) = ledger.mark_processed(&page.path, content.clone()) {
                    warn!("{e}");
                }

                // Bound the request rate; cache hits never pause.
                sleep(Duration::from_millis(config.inter_page_delay_ms)).await;
                content
            };

            latex_pages.push(content.latex().to_string());
            md_pages.push(content.markdown());
        }

        // ── Step 6: Assemble this group's documents ──────────────────────
        let tex_path = assemble::write_tex(title, &latex_pages, output_dir);
        if let Some(ref p) = tex_path {
            info!("Generated LaTeX: {}", p.display());
        }
        let md_path = assemble::write_md(title, &md_pages, output_dir);
        if let Some(ref p) = md_path {
            info!("Generated Markdown: {}", p.display());
        }

        documents.push(DocumentReport {
            title: title.clone(),
            page_count: pages.len(),
            tex_path,
            md_path,
        });
    }

    stats.duration_ms = started.elapsed().as_millis() as u64;
    info!(
        "Run complete: {} pages ({} cached, {} transcribed, {} failed) in {}ms",
        stats.total_pages,
        stats.cached_pages,
        stats.transcribed_pages,
        stats.failed_pages,
        stats.duration_ms
    );

    Ok(RunSummary { documents, stats })
}

/// Synchronous wrapper around [`run`].
///
/// Creates a temporary tokio runtime internally.
pub fn run_sync(
    source_dir: impl AsRef<Path>,
    config: &RunConfig,
) -> Result<RunSummary, PagescribeError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| PagescribeError::Internal(format!("Failed to create tokio runtime: {e}")))?
        .block_on(run(source_dir, config))
}

// ── Internal helpers ─────────────────────────────────────────────────────

/// ENHANCING → TRANSCRIBING for one cache-missed page.
///
/// The enhanced derivative lives exactly as long as the transcription
/// call: the [`crate::pipeline::enhance::EnhancedPage`] guard is dropped
/// on every path out of this function, success or failure.
async fn process_live_page(
    transcriber: &dyn Transcriber,
    page_path: &Path,
    file_name: &str,
    stats: &mut RunStats,
) -> Result<PageContent, PagescribeError> {
    let input = page_path.to_path_buf();
    let enhanced = tokio::task::spawn_blocking(move || enhance_page(&input))
        .await
        .map_err(|e| PagescribeError::Internal(format!("Enhance task panicked: {e}")))?;

    stats.transcribed_pages += 1;
    let content = match transcriber.transcribe(enhanced.path()).await {
        Ok(content) => content,
        Err(e) => {
            warn!("Transcription failed for {file_name}: {e}");
            stats.failed_pages += 1;
            PageContent::error_marker(file_name, &e.to_string())
        }
    };
    drop(enhanced);
    Ok(content)
}

/// Resolve the transcriber, from most-specific to least-specific.
///
/// 1. **Pre-built transcriber** (`config.transcriber`) — the caller
///    constructed it entirely; used as-is. This is the test seam.
/// 2. **Explicit key** (`config.api_key`).
/// 3. **Environment** — `GEMINI_API_KEY`, then the older `GOOGLE_API_KEY`.
///
/// Failing here is fatal and happens before any file I/O, so a
/// misconfigured credential never half-processes a folder.
fn resolve_transcriber(config: &RunConfig) -> Result<Arc<dyn Transcriber>, PagescribeError> {
    if let Some(ref transcriber) = config.transcriber {
        return Ok(Arc::clone(transcriber));
    }

    let key = config
        .api_key
        .clone()
        .or_else(|| env_key("GEMINI_API_KEY"))
        .or_else(|| env_key("GOOGLE_API_KEY"))
        .ok_or_else(|| PagescribeError::TranscriberNotConfigured {
            hint: "Set GEMINI_API_KEY (or GOOGLE_API_KEY), pass --api-key, or provide a \
                   pre-built transcriber in the config."
                .into(),
        })?;

    let gemini = GeminiTranscriber::new(key, &config.model, config.api_timeout_secs)
        .map_err(|e| PagescribeError::Internal(format!("HTTP client build failed: {e}")))?;
    Ok(Arc::new(gemini))
}

fn env_key(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|k| !k.trim().is_empty())
}

/// Non-hidden regular files with a `.pdf` extension, directly inside `dir`.
fn detect_pdfs(dir: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut pdfs = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let name = entry.file_name();
        let name = name.to_string_lossy();
        if name.starts_with('.') {
            continue;
        }
        if name.to_lowercase().ends_with(".pdf") {
            pdfs.push(entry.path());
        }
    }
    pdfs.sort();
    Ok(pdfs)
}

fn io_internal(e: std::io::Error) -> PagescribeError {
    PagescribeError::Internal(format!("directory scan failed: {e}"))
}

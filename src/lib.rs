//! # pagescribe
//!
//! Transcribe folders of scanned handwritten pages into LaTeX and Markdown
//! using a vision model.
//!
//! ## Why this crate?
//!
//! Handwritten lecture notes and worked problem sets defeat traditional OCR —
//! math notation, diagrams, and cursive text come out garbled. Instead this
//! crate cleans up each scanned page and lets a vision model read it as a
//! human would, producing a LaTeX body and a Markdown rendition per page,
//! assembled into one document per logical group of pages.
//!
//! ## Pipeline Overview
//!
//! ```text
//! source folder
//!  │
//!  ├─ 1. Expand   rasterise every PDF into per-page images (pdfium)
//!  ├─ 2. Group    partition pages into documents by filename convention
//!  │              (`NotesX1.png`, `Quick Notes 2.jpg`, `lecture-10.webp`)
//!  ├─ 3. Ledger   skip pages already transcribed (mtime-checked cache)
//!  ├─ 4. Enhance  grayscale → denoise → adaptive binarisation
//!  ├─ 5. VLM      one sequential call per page, rate-limited
//!  └─ 6. Output   one `.tex` + one `.md` per document group
//! ```
//!
//! Pages are processed strictly sequentially, and every completed page is
//! written through to a per-folder ledger (`processed_log.json`) before the
//! next one starts — re-running over the same folder only pays for pages
//! that are new or have changed on disk.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pagescribe::{run, RunConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Credential auto-detected from GEMINI_API_KEY / GOOGLE_API_KEY
//!     let config = RunConfig::default();
//!     let summary = run("scans/linear-algebra", &config).await?;
//!     for doc in &summary.documents {
//!         println!("{}: {} pages", doc.title, doc.page_count);
//!     }
//!     eprintln!(
//!         "{} transcribed / {} cached",
//!         summary.stats.transcribed_pages, summary.stats.cached_pages
//!     );
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `pagescribe` binary (clap + anyhow + tracing-subscriber) |
//!
//! Disable `cli` when using only the library to avoid pulling in CLI-only deps:
//! ```toml
//! pagescribe = { version = "0.3", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod assemble;
pub mod config;
pub mod content;
pub mod error;
pub mod ledger;
pub mod output;
pub mod pipeline;
pub mod prompts;
pub mod run;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{RunConfig, RunConfigBuilder, DEFAULT_MODEL, LEDGER_FILE_NAME};
pub use content::PageContent;
pub use error::{PagescribeError, TranscribeError};
pub use ledger::{Ledger, LedgerEntry};
pub use output::{DocumentReport, RunStats, RunSummary};
pub use pipeline::transcribe::{GeminiTranscriber, Transcriber};
pub use run::{run, run_sync};

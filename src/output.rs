//! Result types returned by [`crate::run::run`].

use serde::Serialize;
use std::path::PathBuf;

/// Outcome of one run over a source directory.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    /// One report per document group, in group order.
    pub documents: Vec<DocumentReport>,
    /// Aggregate page counters.
    pub stats: RunStats,
}

/// What happened to one document group.
#[derive(Debug, Clone, Serialize)]
pub struct DocumentReport {
    /// The group's title, from the filename convention.
    pub title: String,
    /// Pages in the group.
    pub page_count: usize,
    /// Written LaTeX file, when the write succeeded.
    pub tex_path: Option<PathBuf>,
    /// Written Markdown file, when the write succeeded.
    pub md_path: Option<PathBuf>,
}

/// Aggregate counters for a run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunStats {
    /// Pages across all groups.
    pub total_pages: usize,
    /// Pages answered from the ledger without a service call.
    pub cached_pages: usize,
    /// Pages sent to the transcription service this run.
    pub transcribed_pages: usize,
    /// Subset of `transcribed_pages` whose call failed and was recorded
    /// as error-marker content.
    pub failed_pages: usize,
    /// Wall-clock duration of the whole run.
    pub duration_ms: u64,
}

//! The processing ledger: a durable idempotency record over runs.
//!
//! One JSON document per processed directory maps each page's identity to
//! the modification time and transcription result last seen for it. A page
//! is only re-transcribed when its file is newer than the recorded mtime,
//! which makes repeated runs over the same folder effectively free.
//!
//! ## Identity is the base name
//!
//! Pages are keyed by file base name, not full path and not content hash.
//! This keeps the ledger human-readable and survives the folder being
//! moved, at the price of requiring unique page names within a folder —
//! an invariant the filename grouping convention already enforces.
//!
//! ## Durability
//!
//! [`Ledger::mark_processed`] rewrites the whole document after every
//! page (write-through, not batched) using a temp-file-plus-rename, so a
//! crash mid-run loses at most the in-flight page and never corrupts the
//! file. A missing or corrupt ledger on load degrades to an empty one —
//! losing cache benefit is acceptable, losing the run is not.

use crate::content::PageContent;
use crate::error::PagescribeError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;
use tracing::{debug, warn};

/// One ledger record, keyed externally by the page's base name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerEntry {
    /// Source path at the time of processing. Informational only; identity
    /// and staleness checks never consult it.
    pub file_path: String,
    /// Modification time observed when the page was processed, in seconds
    /// since the epoch at the host filesystem's granularity.
    pub mtime: f64,
    /// The transcription result, in either schema (see [`PageContent`]).
    pub content: PageContent,
}

/// The persistent page-identity → last-processed-state mapping.
#[derive(Debug)]
pub struct Ledger {
    path: PathBuf,
    state: BTreeMap<String, LedgerEntry>,
}

impl Ledger {
    /// Load the ledger from `path`, or start empty.
    ///
    /// A missing file is the normal first-run case; an unreadable or
    /// corrupt file is logged as a warning and likewise yields an empty
    /// ledger. Neither is fatal.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let state = match std::fs::read_to_string(&path) {
            Ok(raw) => match serde_json::from_str(&raw) {
                Ok(state) => state,
                Err(e) => {
                    warn!("Corrupt ledger '{}' ({e}); starting fresh", path.display());
                    BTreeMap::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => {
                warn!("Cannot read ledger '{}' ({e}); starting fresh", path.display());
                BTreeMap::new()
            }
        };
        debug!("Ledger loaded: {} entries", state.len());
        Self { path, state }
    }

    /// Number of entries currently held.
    pub fn len(&self) -> usize {
        self.state.len()
    }

    /// True when the ledger holds no entries.
    pub fn is_empty(&self) -> bool {
        self.state.is_empty()
    }

    /// Has this page already been processed, and is the cached result
    /// still trustworthy?
    ///
    /// True iff an entry exists for the page's identity AND the file's
    /// current modification time is ≤ the recorded one. A newer file is
    /// treated as unprocessed: the stale entry stays in place until the
    /// next [`Self::mark_processed`] overwrites it.
    pub fn is_processed(&self, page: &Path) -> bool {
        let Some(entry) = self.state.get(&file_id(page)) else {
            return false;
        };
        match file_mtime(page) {
            Some(current) => current <= entry.mtime,
            None => false,
        }
    }

    /// The stored result for this page, verbatim, if any.
    ///
    /// Interpretation of the two content schemas is the caller's job; see
    /// [`PageContent`].
    pub fn cached_content(&self, page: &Path) -> Option<&PageContent> {
        self.state.get(&file_id(page)).map(|e| &e.content)
    }

    /// Upsert the entry for this page and immediately persist the whole
    /// ledger.
    ///
    /// The rewrite goes through a sibling temp file and an atomic rename,
    /// so with respect to crashes the page's entry is either fully old or
    /// fully new.
    pub fn mark_processed(
        &mut self,
        page: &Path,
        content: PageContent,
    ) -> Result<(), PagescribeError> {
        let mtime = file_mtime(page).unwrap_or_else(|| {
            // Recording 0 keeps the entry permanently stale, which errs on
            // the side of reprocessing.
            warn!("Cannot stat '{}'; recording epoch mtime", page.display());
            0.0
        });
        self.state.insert(
            file_id(page),
            LedgerEntry {
                file_path: page.display().to_string(),
                mtime,
                content,
            },
        );
        self.persist()
    }

    fn persist(&self) -> Result<(), PagescribeError> {
        let json = serde_json::to_string_pretty(&self.state).map_err(|e| {
            PagescribeError::Internal(format!("ledger serialisation failed: {e}"))
        })?;

        let tmp_path = self.path.with_extension("json.tmp");
        std::fs::write(&tmp_path, &json).map_err(|e| PagescribeError::LedgerWriteFailed {
            path: self.path.clone(),
            source: e,
        })?;
        std::fs::rename(&tmp_path, &self.path).map_err(|e| {
            PagescribeError::LedgerWriteFailed {
                path: self.path.clone(),
                source: e,
            }
        })
    }
}

/// Page identity: the file's base name.
///
/// Assumes unique page names within a processed folder.
fn file_id(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Current modification time in seconds since the epoch, or `None` when
/// the file cannot be stat'ed.
fn file_mtime(path: &Path) -> Option<f64> {
    let modified = std::fs::metadata(path).ok()?.modified().ok()?;
    modified
        .duration_since(UNIX_EPOCH)
        .ok()
        .map(|d| d.as_secs_f64())
}

//! Error types for the pagescribe library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`PagescribeError`] — **Fatal**: the run cannot proceed at all
//!   (missing source directory, no transcription credential). Returned as
//!   `Err(PagescribeError)` from [`crate::run::run`].
//!
//! * [`TranscribeError`] — **Non-fatal**: a single page's transcription
//!   call failed. The orchestrator converts it into error-marker content
//!   (see [`crate::content::PageContent::error_marker`]) and the run
//!   continues, so one bad page never loses the rest of the document.
//!
//! Everything in between — a PDF that will not rasterise, an image that
//! will not decode, a ledger or output file that will not write — is
//! logged at the point of failure and degrades per component contract
//! rather than surfacing as an error type at all.

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the pagescribe library.
///
/// Per-page transcription failures use [`TranscribeError`] and are folded
/// into page content rather than propagated here.
#[derive(Debug, Error)]
pub enum PagescribeError {
    // ── Setup errors (the only fatal category) ────────────────────────────
    /// Source directory was not found at the given path.
    #[error("Source directory not found: '{path}'\nCheck the path exists and is readable.")]
    SourceDirNotFound { path: PathBuf },

    /// The source path exists but is not a directory.
    #[error("'{path}' is not a directory")]
    NotADirectory { path: PathBuf },

    /// No transcription service credential could be resolved.
    #[error("Transcription service is not configured.\n{hint}")]
    TranscriberNotConfigured { hint: String },

    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Non-fatal-to-the-run errors surfaced to callers of the leaf APIs ──
    /// A PDF could not be opened or rasterised.
    ///
    /// The orchestrator logs this and continues with the next PDF; only
    /// direct callers of [`crate::pipeline::expand::expand_pdf`] see it.
    #[error("Failed to expand PDF '{path}': {detail}")]
    PdfExpandFailed { path: PathBuf, detail: String },

    /// The ledger document could not be persisted.
    #[error("Failed to write ledger '{path}': {source}")]
    LedgerWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// A failure at the transcription service boundary.
///
/// Never propagated past the orchestrator: [`crate::run::run`] converts
/// any variant into error-marker page content tagged with the offending
/// file name, so downstream document assembly always has something to
/// write.
#[derive(Debug, Error)]
pub enum TranscribeError {
    /// The page image could not be read from disk.
    #[error("failed to read image '{path}': {source}")]
    ImageRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The HTTP request itself failed (connection, timeout, TLS).
    #[error("transcription request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The service answered with a non-success status.
    #[error("transcription API returned HTTP {status}: {body}")]
    Api { status: u16, body: String },

    /// The service answered 200 but the body did not carry usable content.
    #[error("unparsable transcription response: {detail}")]
    UnparsableResponse { detail: String },
}

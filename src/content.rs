//! Page content: the transcription result for a single page.
//!
//! ## Why an untagged enum?
//!
//! The ledger file has lived through two schemas. Early versions stored the
//! transcription as a bare string of LaTeX; the current schema stores an
//! object with separate `latex` and `markdown` fields. Ledgers written by
//! either version must keep loading, so [`PageContent`] is a
//! `#[serde(untagged)]` variant: an object deserialises as
//! [`PageContent::Structured`], a plain string as [`PageContent::Legacy`].
//! Writers only ever emit the structured form.

use serde::{Deserialize, Serialize};

/// The transcription result for one page, in both schemas the ledger
/// accepts on read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PageContent {
    /// Current schema: one transcript per output flavour.
    Structured {
        /// LaTeX body code for the page (no preamble).
        latex: String,
        /// Markdown rendition of the same page.
        markdown: String,
    },
    /// Legacy schema: a single LaTeX string from an older ledger.
    Legacy(String),
}

impl PageContent {
    /// Build error-marker content for a page whose transcription failed.
    ///
    /// The marker is stored in the ledger in place of a real result, so a
    /// permanently failing page is not retried on every run. Both streams
    /// carry the same comment-formatted text; `%` keeps it inert in the
    /// assembled LaTeX.
    pub fn error_marker(file_name: &str, detail: &str) -> Self {
        let msg = format!("% Error processing image: {file_name}\n% Error details: {detail}");
        PageContent::Structured {
            latex: msg.clone(),
            markdown: msg,
        }
    }

    /// The LaTeX stream for this page.
    pub fn latex(&self) -> &str {
        match self {
            PageContent::Structured { latex, .. } => latex,
            PageContent::Legacy(s) => s,
        }
    }

    /// The Markdown stream for this page.
    ///
    /// Legacy entries never had a Markdown rendition; they are wrapped in a
    /// fenced `latex` block with a note, so the assembled Markdown document
    /// still has one section per page.
    pub fn markdown(&self) -> String {
        match self {
            PageContent::Structured { markdown, .. } => markdown.clone(),
            PageContent::Legacy(s) => {
                format!("*(Markdown not generated for this cached page)*\n\n```latex\n{s}\n```")
            }
        }
    }
}

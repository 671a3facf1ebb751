//! Document assembly: write per-document `.tex` and `.md` files.
//!
//! Pure formatting over an ordered list of per-page strings — no state,
//! no decisions. A write failure is reported back as "no file produced"
//! (`None`) and logged; it never aborts the run, so a read-only output
//! directory costs the operator one document, not the whole batch.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use tracing::warn;

/// The `\usepackage` lines a document built from our LaTeX output needs.
///
/// Printed (commented) at the end of a CLI run so the operator can paste
/// them into their main document's preamble.
pub const LATEX_PACKAGES_BLOCK: &str = r"
% Required Packages for Compilation:
% \usepackage{amsmath}
% \usepackage{amssymb}
% \usepackage{amsthm}
% \usepackage{graphicx}
% \usepackage{hyperref}
% \usepackage[utf8]{inputenc}
% \usepackage[T1]{fontenc}
% \usepackage{geometry}
% \usepackage{float}
";

/// Write `{title}.tex` into `output_dir` from page-ordered LaTeX bodies.
///
/// Returns the written path, or `None` on a write failure (logged).
pub fn write_tex(title: &str, pages: &[String], output_dir: &Path) -> Option<PathBuf> {
    let mut doc = String::new();
    let _ = writeln!(doc, "% Auto-generated LaTeX for {title}");
    let _ = writeln!(doc, "\\section*{{{title}}}");
    let _ = writeln!(doc);
    for (i, page) in pages.iter().enumerate() {
        let _ = writeln!(doc, "% --- Page {} ---", i + 1);
        doc.push_str(page);
        doc.push_str("\n\n");
    }

    write_document(output_dir.join(format!("{title}.tex")), &doc)
}

/// Write `{title}.md` into `output_dir` from page-ordered Markdown bodies.
///
/// Pages are separated by horizontal rules with a page-marker comment
/// before each. Returns the written path, or `None` on failure (logged).
pub fn write_md(title: &str, pages: &[String], output_dir: &Path) -> Option<PathBuf> {
    let mut doc = String::new();
    let _ = writeln!(doc, "# Auto-generated Markdown for {title}");
    let _ = writeln!(doc);
    for (i, page) in pages.iter().enumerate() {
        let _ = writeln!(doc, "<!-- --- Page {} --- -->", i + 1);
        doc.push_str(page);
        doc.push_str("\n\n---\n\n");
    }

    write_document(output_dir.join(format!("{title}.md")), &doc)
}

fn write_document(path: PathBuf, contents: &str) -> Option<PathBuf> {
    match std::fs::write(&path, contents) {
        Ok(()) => Some(path),
        Err(e) => {
            warn!("Could not write '{}': {e}", path.display());
            None
        }
    }
}

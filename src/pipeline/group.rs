//! Filename parsing and document grouping.
//!
//! Scanned pages arrive as loose files named by a simple convention: a
//! document title, a separator run, and a page number — `NotesX1.png`,
//! `Quick Notes 2.jpg`, `lecture-10.webp`. This module turns a directory
//! listing into an ordered partition of pages by title.
//!
//! ## Canonical grammar
//!
//! One flexible pattern covers every accepted spelling:
//!
//! ```text
//! ^(title)(separators)(ordinal).(extension)
//!    │         │           │         └ png | jpg | jpeg | pdf | webp  (case-insensitive)
//!    │         │           └ decimal page number, compared numerically
//!    │         └ one or more of: whitespace, 'x'/'X', '-', '_'
//!    └ non-greedy prefix, trimmed of surrounding whitespace
//! ```
//!
//! Earlier versions of the tool carried a strict `TitleXImageN` pattern
//! next to this loose one with no defined precedence; the loose grammar is
//! now the only one. Note that a title whose own text ends in a separator
//! character (e.g. `BoxX1.png`) loses that character to the separator run —
//! the non-greedy prefix keeps titles as short as the grammar allows.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, trace};

/// The grouping pattern. See the module docs for the grammar.
static PAGE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^(.+?)[\sx_-]+(\d+)\.(png|jpe?g|pdf|webp)$").unwrap());

/// One page file, with the title and ordinal derived from its name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageFile {
    /// Absolute (or directory-joined) path to the image on disk.
    pub path: PathBuf,
    /// The logical document this page belongs to.
    pub title: String,
    /// Position within the document, from the filename. Ordinals need not
    /// be contiguous; ordering is numeric, never lexical.
    pub ordinal: u64,
}

/// Parse a bare file name against the grouping grammar.
///
/// Returns `(title, ordinal)` on a match, `None` otherwise. Non-matching
/// names are not an error anywhere in the pipeline — they are simply
/// excluded from all groups.
pub fn parse_page_name(name: &str) -> Option<(String, u64)> {
    let caps = PAGE_PATTERN.captures(name)?;
    let title = caps[1].trim().to_string();
    let ordinal: u64 = caps[2].parse().ok()?;
    Some((title, ordinal))
}

/// Scan a directory and partition its pages into ordered document groups.
///
/// Looks only at regular files directly inside `dir` (no recursion),
/// skips hidden files, and silently ignores anything that does not match
/// the grouping grammar. Within a group, pages are sorted by ordinal
/// ascending. An empty map is a legitimate result, not an error.
pub fn scan_groups(dir: &Path) -> std::io::Result<BTreeMap<String, Vec<PageFile>>> {
    let mut groups: BTreeMap<String, Vec<PageFile>> = BTreeMap::new();

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

        match parse_page_name(&name) {
            Some((title, ordinal)) => {
                groups.entry(title.clone()).or_default().push(PageFile {
                    path: entry.path(),
                    title,
                    ordinal,
                });
            }
            None => trace!("'{name}' does not match the grouping pattern; skipped"),
        }
    }

    for pages in groups.values_mut() {
        pages.sort_by_key(|p| p.ordinal);
    }

    debug!(
        "Grouped {} pages into {} documents",
        groups.values().map(Vec::len).sum::<usize>(),
        groups.len()
    );
    Ok(groups)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn parses_every_separator_spelling() {
        assert_eq!(parse_page_name("NotesX1.png"), Some(("Notes".into(), 1)));
        assert_eq!(
            parse_page_name("Quick Notes 2.jpg"),
            Some(("Quick Notes".into(), 2))
        );
        assert_eq!(parse_page_name("lecture-10.webp"), Some(("lecture".into(), 10)));
        assert_eq!(parse_page_name("algebra_3.jpeg"), Some(("algebra".into(), 3)));
        assert_eq!(parse_page_name("Report_1.pdf"), Some(("Report".into(), 1)));
    }

    #[test]
    fn extension_is_case_insensitive() {
        assert_eq!(parse_page_name("NotesX1.PNG"), Some(("Notes".into(), 1)));
        assert_eq!(parse_page_name("NotesX1.Jpg"), Some(("Notes".into(), 1)));
    }

    #[test]
    fn rejects_names_outside_the_grammar() {
        assert_eq!(parse_page_name("Notes1.png"), None); // no separator
        assert_eq!(parse_page_name("NotesX1.tiff"), None); // unknown extension
        assert_eq!(parse_page_name("NotesXa.png"), None); // non-numeric ordinal
        assert_eq!(parse_page_name("X1.png"), None); // empty title
        assert_eq!(parse_page_name("readme.txt"), None);
    }

    #[test]
    fn title_surrounding_whitespace_is_trimmed() {
        assert_eq!(
            parse_page_name("Quick Notes  7.png"),
            Some(("Quick Notes".into(), 7))
        );
    }

    #[test]
    fn ordering_is_numeric_not_lexical() {
        let dir = TempDir::new().unwrap();
        for name in ["NotesX10.png", "NotesX1.png", "NotesX2.png"] {
            std::fs::write(dir.path().join(name), b"x").unwrap();
        }

        let groups = scan_groups(dir.path()).unwrap();
        let ordinals: Vec<u64> = groups["Notes"].iter().map(|p| p.ordinal).collect();
        assert_eq!(ordinals, vec![1, 2, 10]);
    }

    #[test]
    fn hidden_and_non_matching_files_are_excluded() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(".NotesX1.png"), b"x").unwrap();
        std::fs::write(dir.path().join("processed_log.json"), b"{}").unwrap();
        std::fs::write(dir.path().join("NotesX1.png"), b"x").unwrap();
        std::fs::create_dir(dir.path().join("SubdirX1.png")).unwrap();

        let groups = scan_groups(dir.path()).unwrap();
        assert_eq!(groups.len(), 1);
        assert_eq!(groups["Notes"].len(), 1);
    }

    #[test]
    fn empty_directory_yields_empty_mapping() {
        let dir = TempDir::new().unwrap();
        assert!(scan_groups(dir.path()).unwrap().is_empty());
    }

    #[test]
    fn distinct_titles_form_distinct_groups() {
        let dir = TempDir::new().unwrap();
        for name in ["AlgebraX1.png", "AlgebraX2.png", "Geometry 1.jpg"] {
            std::fs::write(dir.path().join(name), b"x").unwrap();
        }
        let groups = scan_groups(dir.path()).unwrap();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups["Algebra"].len(), 2);
        assert_eq!(groups["Geometry"].len(), 1);
    }
}

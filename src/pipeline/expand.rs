//! PDF expansion: rasterise every page of a PDF into individual images.
//!
//! Multi-page PDFs dropped into the source folder are flattened into one
//! image per page so the rest of the pipeline only ever deals with single
//! pages. Output names follow the grouping convention — `{stem}_{n}.png`
//! with a 1-based page index — so [`super::group::scan_groups`] picks the
//! pages straight back up as one document titled after the PDF.
//!
//! ## Why spawn_blocking?
//!
//! `pdfium-render` wraps the pdfium C++ library, which uses thread-local
//! state internally and is not safe to call from async contexts.
//! `tokio::task::spawn_blocking` moves the work onto the blocking thread
//! pool so rasterisation never stalls the async workers.

use crate::error::PagescribeError;
use image::ImageFormat;
use pdfium_render::prelude::*;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Rasterisation resolution. 150 DPI keeps handwriting crisp for the
/// vision model without ballooning file sizes.
const RENDER_DPI: f32 = 150.0;

/// Rasterise every page of `pdf_path` into `output_dir`.
///
/// The output directory is created if absent. Returns the produced image
/// paths in physical page order. Any failure — unreadable PDF, render
/// error, write error — is reported as a single `Err`; the orchestrator
/// logs it and moves on to the next PDF, so one corrupt file never halts
/// expansion of the others.
pub async fn expand_pdf(
    pdf_path: &Path,
    output_dir: &Path,
) -> Result<Vec<PathBuf>, PagescribeError> {
    let pdf = pdf_path.to_path_buf();
    let out = output_dir.to_path_buf();

    tokio::task::spawn_blocking(move || expand_pdf_blocking(&pdf, &out))
        .await
        .map_err(|e| PagescribeError::Internal(format!("Expand task panicked: {e}")))?
}

/// Blocking implementation of PDF expansion.
fn expand_pdf_blocking(
    pdf_path: &Path,
    output_dir: &Path,
) -> Result<Vec<PathBuf>, PagescribeError> {
    let fail = |detail: String| PagescribeError::PdfExpandFailed {
        path: pdf_path.to_path_buf(),
        detail,
    };

    std::fs::create_dir_all(output_dir)
        .map_err(|e| fail(format!("cannot create output directory: {e}")))?;

    let pdfium = Pdfium::new(
        Pdfium::bind_to_system_library().map_err(|e| fail(format!("pdfium bind failed: {e}")))?,
    );

    let document = pdfium
        .load_pdf_from_file(pdf_path, None)
        .map_err(|e| fail(format!("pdfium open failed: {e:?}")))?;

    let stem = pdf_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "document".to_string());

    let pages = document.pages();
    let page_count = pages.len();
    info!("Expanding '{}': {} pages", pdf_path.display(), page_count);

    let mut saved = Vec::with_capacity(page_count as usize);

    for index in 0..page_count {
        let page = pages
            .get(index)
            .map_err(|e| fail(format!("page {index} access failed: {e:?}")))?;

        let width = (page.width().value * RENDER_DPI / 72.0) as i32;
        let height = (page.height().value * RENDER_DPI / 72.0) as i32;

        let bitmap = page
            .render_with_config(
                &PdfRenderConfig::new()
                    .set_target_width(width)
                    .set_target_height(height),
            )
            .map_err(|e| fail(format!("render page {index} failed: {e:?}")))?;

        // 1-based index so the grouper recovers ordinals 1..N.
        let image_path = output_dir.join(format!("{stem}_{}.png", index + 1));
        bitmap
            .as_image()
            .save_with_format(&image_path, ImageFormat::Png)
            .map_err(|e| fail(format!("PNG save for page {index} failed: {e}")))?;

        debug!("Saved PDF page to: {}", image_path.display());
        saved.push(image_path);
    }

    Ok(saved)
}

#[cfg(test)]
mod tests {
    use super::*;

    // Rasterisation itself needs a system pdfium library and is covered by
    // the gated integration tests. The naming convention is checked here
    // because the grouper round-trip must hold for any stem.
    #[test]
    fn page_names_reparse_under_the_grouping_grammar() {
        use crate::pipeline::group::parse_page_name;

        for (stem, n) in [("Report", 1), ("My Notes 2023", 4), ("scan-batch", 12)] {
            let name = format!("{stem}_{n}.png");
            assert_eq!(
                parse_page_name(&name),
                Some((stem.to_string(), n)),
                "'{name}' must re-parse with the PDF stem as title"
            );
        }
    }
}

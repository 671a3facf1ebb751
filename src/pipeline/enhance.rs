//! Page enhancement: deterministic legibility cleanup before transcription.
//!
//! Handwritten scans arrive with uneven lighting, sensor noise, and faint
//! pencil strokes. A fixed three-step transform — grayscale, denoise,
//! adaptive binarisation — gives the vision model a high-contrast
//! two-level page regardless of capture conditions. There are no knobs:
//! the same input always yields the same derived image.
//!
//! The derived image is a transient resource. [`enhance_page`] returns an
//! [`EnhancedPage`] guard that removes the derived file on drop, so every
//! exit path of the caller — success, transcription failure, panic —
//! releases it. Enhancement failure is never an error: the guard then
//! wraps the original path and the page is transcribed un-enhanced.

use image::{GrayImage, ImageBuffer, Luma};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Suffix inserted before the extension of the derived image.
const ENHANCED_SUFFIX: &str = "_enhanced";

/// Denoise strength (gaussian sigma).
const DENOISE_SIGMA: f32 = 1.0;

/// Side length of the local-threshold neighbourhood, in pixels. Odd, so
/// the window centres on the pixel.
const THRESHOLD_WINDOW: u32 = 11;

/// Subtracted from the local mean before comparison. Biases faint strokes
/// towards ink rather than background.
const THRESHOLD_OFFSET: i32 = 2;

/// A page image ready for transcription, with scoped cleanup.
///
/// When enhancement succeeded the guard owns the derived file and deletes
/// it on drop (best-effort; a failed delete is logged, never escalated).
/// When enhancement degraded, the guard wraps the original path and drop
/// touches nothing.
#[derive(Debug)]
pub struct EnhancedPage {
    path: PathBuf,
    derived: bool,
}

impl EnhancedPage {
    /// Path to hand to the transcription call.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether a derived file was produced (false = degraded to original).
    pub fn is_derived(&self) -> bool {
        self.derived
    }
}

impl Drop for EnhancedPage {
    fn drop(&mut self) {
        if !self.derived {
            return;
        }
        if let Err(e) = std::fs::remove_file(&self.path) {
            warn!("Could not remove enhanced image '{}': {e}", self.path.display());
        }
    }
}

/// Enhance one page image for transcription.
///
/// Pipeline, in fixed order: decode → single-channel intensity → gaussian
/// denoise → adaptive mean binarisation. The result is written next to
/// the input with [`ENHANCED_SUFFIX`] before the extension; the original
/// is never modified. On any failure the original path is returned
/// unchanged and the error is logged.
pub fn enhance_page(input: &Path) -> EnhancedPage {
    match try_enhance(input) {
        Ok(derived_path) => {
            debug!("Enhanced '{}' → '{}'", input.display(), derived_path.display());
            EnhancedPage {
                path: derived_path,
                derived: true,
            }
        }
        Err(e) => {
            warn!(
                "Enhancement failed for '{}' ({e}); transcribing the original",
                input.display()
            );
            EnhancedPage {
                path: input.to_path_buf(),
                derived: false,
            }
        }
    }
}

fn try_enhance(input: &Path) -> Result<PathBuf, image::ImageError> {
    let gray = image::open(input)?.to_luma8();
    let denoised = image::imageops::blur(&gray, DENOISE_SIGMA);
    let binary = adaptive_threshold(&denoised, THRESHOLD_WINDOW, THRESHOLD_OFFSET);

    let out_path = derived_path(input);
    binary.save(&out_path)?;
    Ok(out_path)
}

/// `dir/name.ext` → `dir/name_enhanced.ext`.
fn derived_path(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = match input.extension() {
        Some(ext) => format!("{stem}{ENHANCED_SUFFIX}.{}", ext.to_string_lossy()),
        None => format!("{stem}{ENHANCED_SUFFIX}"),
    };
    input.with_file_name(name)
}

/// Binarise against a locally-computed mean threshold.
///
/// For each pixel, the mean intensity over a `window × window`
/// neighbourhood (clamped at the borders) is computed from an integral
/// image; the pixel becomes white when its intensity exceeds
/// `mean - offset`, black otherwise. Output is strictly two-level.
fn adaptive_threshold(img: &GrayImage, window: u32, offset: i32) -> GrayImage {
    let (w, h) = img.dimensions();
    let radius = (window / 2) as i64;

    // Integral image with a zero row/column of padding: sum over any
    // rectangle costs four lookups.
    let iw = (w + 1) as usize;
    let mut integral = vec![0u64; iw * (h + 1) as usize];
    for y in 0..h as usize {
        let mut row_sum = 0u64;
        for x in 0..w as usize {
            row_sum += img.get_pixel(x as u32, y as u32).0[0] as u64;
            integral[(y + 1) * iw + (x + 1)] = integral[y * iw + (x + 1)] + row_sum;
        }
    }

    ImageBuffer::from_fn(w, h, |x, y| {
        let x0 = (x as i64 - radius).max(0) as usize;
        let y0 = (y as i64 - radius).max(0) as usize;
        let x1 = ((x as i64 + radius).min(w as i64 - 1) + 1) as usize;
        let y1 = ((y as i64 + radius).min(h as i64 - 1) + 1) as usize;

        let sum = integral[y1 * iw + x1] + integral[y0 * iw + x0]
            - integral[y0 * iw + x1]
            - integral[y1 * iw + x0];
        let count = ((x1 - x0) * (y1 - y0)) as u64;
        let mean = (sum / count) as i32;

        let value = img.get_pixel(x, y).0[0] as i32;
        if value > mean - offset {
            Luma([255u8])
        } else {
            Luma([0u8])
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn checkerboard(side: u32) -> GrayImage {
        ImageBuffer::from_fn(side, side, |x, y| {
            if (x + y) % 2 == 0 {
                Luma([200u8])
            } else {
                Luma([40u8])
            }
        })
    }

    #[test]
    fn derived_path_inserts_suffix_before_extension() {
        assert_eq!(
            derived_path(Path::new("/scans/NotesX1.png")),
            PathBuf::from("/scans/NotesX1_enhanced.png")
        );
        assert_eq!(
            derived_path(Path::new("/scans/Quick Notes 2.jpg")),
            PathBuf::from("/scans/Quick Notes 2_enhanced.jpg")
        );
    }

    #[test]
    fn output_is_strictly_two_level() {
        let out = adaptive_threshold(&checkerboard(32), 11, 2);
        assert!(out.pixels().all(|p| p.0[0] == 0 || p.0[0] == 255));
        // A checkerboard must produce both levels.
        assert!(out.pixels().any(|p| p.0[0] == 0));
        assert!(out.pixels().any(|p| p.0[0] == 255));
    }

    #[test]
    fn threshold_is_deterministic() {
        let a = adaptive_threshold(&checkerboard(16), 11, 2);
        let b = adaptive_threshold(&checkerboard(16), 11, 2);
        assert_eq!(a.as_raw(), b.as_raw());
    }

    #[test]
    fn enhancing_a_real_file_creates_and_drops_the_derivative() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("NotesX1.png");
        checkerboard(16).save(&input).unwrap();

        let derived_p;
        {
            let enhanced = enhance_page(&input);
            assert!(enhanced.is_derived());
            derived_p = enhanced.path().to_path_buf();
            assert!(derived_p.exists());
            assert_ne!(derived_p, input);
        }
        // Guard dropped: derivative gone, original untouched.
        assert!(!derived_p.exists());
        assert!(input.exists());
    }

    #[test]
    fn unreadable_input_degrades_to_the_original_path() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("NotesX1.png");
        std::fs::write(&input, b"this is not a png").unwrap();

        let enhanced = enhance_page(&input);
        assert!(!enhanced.is_derived());
        assert_eq!(enhanced.path(), input);
        drop(enhanced);
        // Degraded guard must never delete the original.
        assert!(input.exists());
    }
}

//! Pipeline stages for scanned-page transcription.
//!
//! Each submodule implements exactly one transformation step.
//! Keeping stages separate makes each independently testable and lets us
//! swap implementations (e.g. a different transcription backend) without
//! touching other stages.
//!
//! ## Data Flow
//!
//! ```text
//! expand ──▶ group ──▶ enhance ──▶ transcribe
//! (pdfium)   (regex)   (image)     (vision model)
//! ```
//!
//! 1. [`expand`]     — rasterise every PDF in the folder into page images
//!    whose names follow the grouping convention; runs in `spawn_blocking`
//!    because pdfium is not async-safe
//! 2. [`group`]      — partition the folder's files into ordered document
//!    groups by filename convention
//! 3. [`enhance`]    — deterministic legibility cleanup of one page
//!    (grayscale, denoise, binarise); produces a transient derived file
//! 4. [`transcribe`] — the external service boundary; the only stage with
//!    network I/O

pub mod enhance;
pub mod expand;
pub mod group;
pub mod transcribe;

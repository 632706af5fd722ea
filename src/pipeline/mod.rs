//! Pipeline stages for PDF-to-image conversion.
//!
//! Each submodule implements exactly one step; the fallback chain in
//! [`crate::convert`] composes them. Keeping stages separate makes each
//! independently testable and lets us swap implementations (e.g. a different
//! external rasterizer) without touching other stages.
//!
//! ## Data Flow
//!
//! ```text
//! locate ──▶ plan ──▶ invoke ──▶ harvest        (external rasterizer tier)
//!              │
//!              └────▶ library                   (pdfium fallback tier)
//!
//! placeholder                                   (terminal tier, whole document)
//! ```
//!
//! 1. [`locate`]  — find the external rasterizer across install conventions
//! 2. [`plan`]    — resolve page options into one contiguous render span
//! 3. [`invoke`]  — run the subprocess under a hard deadline
//! 4. [`harvest`] — order and filter the generated files
//! 5. [`library`] — in-process pdfium rendering when the subprocess path dies
//! 6. [`placeholder`] — synthetic per-page images when nothing can render

use image::codecs::jpeg::JpegEncoder;
use image::RgbImage;
use std::io::Cursor;

pub mod harvest;
pub mod invoke;
pub mod library;
pub mod locate;
pub mod placeholder;
pub mod plan;

/// JPEG quality shared by every tier, so tiers are indistinguishable by
/// output encoding.
pub(crate) const JPEG_QUALITY: u8 = 85;

/// Encode an RGB image as JPEG at the pipeline's fixed quality.
pub(crate) fn encode_jpeg(image: &RgbImage) -> Result<Vec<u8>, image::ImageError> {
    let mut buf = Vec::new();
    let mut cursor = Cursor::new(&mut buf);
    let encoder = JpegEncoder::new_with_quality(&mut cursor, JPEG_QUALITY);
    image.write_with_encoder(encoder)?;
    Ok(buf)
}

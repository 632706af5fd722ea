//! In-process rendering fallback via pdfium.
//!
//! Runs when the external rasterizer is missing or failed. The whole
//! sequence — binding the library, opening the document, rendering each
//! page, encoding, writing — maps any error to
//! [`TierError::LibraryRenderError`] so the chain controller can escalate to
//! the placeholder tier without caring where exactly things broke.
//!
//! Rendering honours the same plan and filter semantics as the external
//! tier: the planned span clipped to the actual page count, one JPEG per
//! requested page. Pixel dimensions come from the page's point size scaled
//! by the same DPI the external tier would have used, so output resolution
//! does not depend on which tier produced it.
//!
//! pdfium is not async-safe; callers wrap this in `spawn_blocking`.

use crate::error::TierError;
use crate::pipeline::encode_jpeg;
use crate::pipeline::plan::RenderPlan;
use image::RgbImage;
use pdfium_render::prelude::*;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Render the planned pages of `source` into `scratch` as zero-padded
/// `page-NNN.jpg` files, returning the paths in page order.
pub fn render_with_pdfium(
    source: &Path,
    scratch: &Path,
    plan: &RenderPlan,
    dpi: u32,
    library_path: Option<&Path>,
) -> Result<Vec<PathBuf>, TierError> {
    let bindings = match library_path {
        Some(path) => Pdfium::bind_to_library(path.display().to_string()),
        None => Pdfium::bind_to_system_library(),
    }
    .map_err(|e| TierError::LibraryRenderError(format!("pdfium binding failed: {e}")))?;
    let pdfium = Pdfium::new(bindings);

    let document = pdfium.load_pdf_from_file(source, None).map_err(|e| {
        TierError::LibraryRenderError(format!("failed to open {}: {e}", source.display()))
    })?;

    let pages = document.pages();
    let total = pages.len() as u32;
    if plan.first > total {
        return Err(TierError::EmptyResultSet);
    }
    let last = plan.last.min(total);
    info!("pdfium fallback rendering pages {}..={} of {total}", plan.first, last);

    let mut images = Vec::new();
    for page_num in plan.first..=last {
        if let Some(filter) = &plan.filter {
            if !filter.contains(&page_num) {
                continue;
            }
        }

        let page = pages.get((page_num - 1) as u16).map_err(|e| {
            TierError::LibraryRenderError(format!("failed to access page {page_num}: {e}"))
        })?;

        // Page sizes are in PDF points (1 pt = 1/72 in).
        let width = ((page.width().value * dpi as f32) / 72.0).round().max(1.0) as i32;
        let height = ((page.height().value * dpi as f32) / 72.0).round().max(1.0) as i32;

        let render_config = PdfRenderConfig::new()
            .set_target_width(width)
            .set_maximum_height(height);

        let bitmap = page.render_with_config(&render_config).map_err(|e| {
            TierError::LibraryRenderError(format!("failed to render page {page_num}: {e}"))
        })?;
        let image = bitmap.as_image().into_rgb8();
        debug!("rendered page {page_num} at {}x{} px", image.width(), image.height());

        let path = scratch.join(format!("page-{page_num:03}.jpg"));
        write_jpeg(&image, &path).map_err(|e| {
            TierError::LibraryRenderError(format!("failed to write page {page_num}: {e}"))
        })?;
        images.push(path);
    }

    if images.is_empty() {
        return Err(TierError::EmptyResultSet);
    }
    Ok(images)
}

/// Encode an RGB image at the pipeline's fixed JPEG quality and write it.
fn write_jpeg(image: &RgbImage, path: &Path) -> Result<(), String> {
    let buf = encode_jpeg(image).map_err(|e| format!("jpeg encoding: {e}"))?;
    std::fs::write(path, &buf).map_err(|e| format!("write: {e}"))
}

//! Terminal fallback: synthesise one labelled stand-in image per page.
//!
//! When neither the external rasterizer nor pdfium can produce anything,
//! the pipeline still owes the caller one image per page. This tier reads
//! only the page *geometry* from the document's object model (no content
//! rendering at all) and fabricates a fixed template: white background, a
//! grey border inset from the edge, a large `PAGE N` label and a
//! `PREVIEW ONLY` caption.
//!
//! The canvas is sized at twice the page's point dimensions, so a Letter
//! page yields a 1224x1584 image with roughly the aspect ratio the real
//! render would have had.
//!
//! Rendering a single page is a pure function of (geometry, page number):
//! two runs over the same document produce byte-identical files.
//!
//! ## Labels without a font file
//!
//! The labels only ever contain digits and two fixed words, so the glyphs
//! ship as a small built-in 5x7 pixel table instead of a bundled TTF and a
//! font-rasterisation dependency. Each set bit becomes a `cell`-sized square
//! drawn with `imageproc`.

use crate::error::ConvertError;
use crate::pipeline::encode_jpeg;
use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_filled_rect_mut, draw_hollow_rect_mut};
use imageproc::rect::Rect;
use lopdf::{Dictionary, Document, Object, ObjectId};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Canvas scale relative to the page's point dimensions.
const SCALE: f32 = 2.0;
/// Canvas dimension bounds; MediaBox values outside this range are clamped.
const MIN_DIM: u32 = 64;
const MAX_DIM: u32 = 16384;
/// Border inset from the canvas edge, in pixels.
const BORDER_MARGIN: u32 = 18;
const BORDER_THICKNESS: u32 = 3;

const BACKGROUND: Rgb<u8> = Rgb([255, 255, 255]);
const BORDER: Rgb<u8> = Rgb([148, 148, 148]);
const INK: Rgb<u8> = Rgb([64, 64, 64]);

const CAPTION: &str = "PREVIEW ONLY";

/// US Letter in points, used when a page carries no usable MediaBox.
const DEFAULT_PAGE_PTS: (f32, f32) = (612.0, 792.0);

/// Generate one placeholder image per document page, ignoring any page-range
/// options: this tier always covers the whole document.
///
/// This is the only tier whose failure reaches the caller. If the document
/// cannot be opened there is nothing left to fall back to.
pub fn render_document(source: &Path, scratch: &Path) -> Result<Vec<PathBuf>, ConvertError> {
    let document = Document::load(source).map_err(|e| ConvertError::PdfUnreadable {
        path: source.to_path_buf(),
        detail: e.to_string(),
    })?;

    let pages = document.get_pages();
    if pages.is_empty() {
        return Err(ConvertError::PdfUnreadable {
            path: source.to_path_buf(),
            detail: "document has no pages".into(),
        });
    }
    info!("generating {} placeholder image(s)", pages.len());

    let mut images = Vec::with_capacity(pages.len());
    for (page_number, page_id) in pages {
        let (width_pts, height_pts) = page_dimensions(&document, page_id);
        let canvas = render_page(width_pts, height_pts, page_number);
        let bytes = encode_jpeg(&canvas).map_err(|e| {
            ConvertError::Internal(format!("placeholder encoding failed for page {page_number}: {e}"))
        })?;

        let path = scratch.join(format!("page-{page_number:03}.jpg"));
        std::fs::write(&path, &bytes).map_err(|e| ConvertError::ImageWriteFailed {
            path: path.clone(),
            source: e,
        })?;
        debug!("placeholder page {page_number}: {}x{} px", canvas.width(), canvas.height());
        images.push(path);
    }

    Ok(images)
}

/// Render the placeholder template for one page.
///
/// Pure: the output depends only on the arguments.
pub fn render_page(width_pts: f32, height_pts: f32, page_number: u32) -> RgbImage {
    let width = ((width_pts * SCALE).round() as u32).clamp(MIN_DIM, MAX_DIM);
    let height = ((height_pts * SCALE).round() as u32).clamp(MIN_DIM, MAX_DIM);

    let mut canvas = RgbImage::from_pixel(width, height, BACKGROUND);
    draw_border(&mut canvas);

    let label = format!("PAGE {page_number}");
    let label_cell = (width / 100).clamp(3, 24);
    let caption_cell = (label_cell * 3 / 5).max(2);
    let gap = 4 * caption_cell;

    let block_height = 7 * label_cell + gap + 7 * caption_cell;
    let top = height.saturating_sub(block_height) / 2;

    draw_text(
        &mut canvas,
        &label,
        centered_x(width, &label, label_cell),
        top,
        label_cell,
        INK,
    );
    draw_text(
        &mut canvas,
        CAPTION,
        centered_x(width, CAPTION, caption_cell),
        top + 7 * label_cell + gap,
        caption_cell,
        INK,
    );

    canvas
}

fn draw_border(canvas: &mut RgbImage) {
    let (width, height) = canvas.dimensions();
    for t in 0..BORDER_THICKNESS {
        let inset = BORDER_MARGIN + t;
        if width <= 2 * inset + 1 || height <= 2 * inset + 1 {
            break;
        }
        let rect =
            Rect::at(inset as i32, inset as i32).of_size(width - 2 * inset, height - 2 * inset);
        draw_hollow_rect_mut(canvas, rect, BORDER);
    }
}

fn centered_x(width: u32, text: &str, cell: u32) -> u32 {
    width.saturating_sub(text_width(text, cell)) / 2
}

fn text_width(text: &str, cell: u32) -> u32 {
    let chars = text.chars().count() as u32;
    if chars == 0 {
        return 0;
    }
    (chars * 6 - 1) * cell
}

/// Draw `text` with the built-in glyph table; each glyph cell becomes a
/// `cell`-sized square. Characters outside the table render as blanks.
fn draw_text(canvas: &mut RgbImage, text: &str, x: u32, y: u32, cell: u32, color: Rgb<u8>) {
    let mut cursor = x;
    for ch in text.chars() {
        if let Some(rows) = glyph(ch) {
            for (row_index, row) in rows.iter().enumerate() {
                for col in 0u32..5 {
                    if row & (0b1_0000 >> col) != 0 {
                        let rect = Rect::at(
                            (cursor + col * cell) as i32,
                            (y + row_index as u32 * cell) as i32,
                        )
                        .of_size(cell, cell);
                        draw_filled_rect_mut(canvas, rect, color);
                    }
                }
            }
        }
        cursor += 6 * cell;
    }
}

/// 5x7 glyphs for the characters the labels can contain. One `u8` per row,
/// bit 4 = leftmost column.
fn glyph(ch: char) -> Option<[u8; 7]> {
    let rows = match ch {
        '0' => [0b01110, 0b10001, 0b10011, 0b10101, 0b11001, 0b10001, 0b01110],
        '1' => [0b00100, 0b01100, 0b00100, 0b00100, 0b00100, 0b00100, 0b01110],
        '2' => [0b01110, 0b10001, 0b00001, 0b00010, 0b00100, 0b01000, 0b11111],
        '3' => [0b11111, 0b00010, 0b00100, 0b00010, 0b00001, 0b10001, 0b01110],
        '4' => [0b00010, 0b00110, 0b01010, 0b10010, 0b11111, 0b00010, 0b00010],
        '5' => [0b11111, 0b10000, 0b11110, 0b00001, 0b00001, 0b10001, 0b01110],
        '6' => [0b00110, 0b01000, 0b10000, 0b11110, 0b10001, 0b10001, 0b01110],
        '7' => [0b11111, 0b00001, 0b00010, 0b00100, 0b01000, 0b01000, 0b01000],
        '8' => [0b01110, 0b10001, 0b10001, 0b01110, 0b10001, 0b10001, 0b01110],
        '9' => [0b01110, 0b10001, 0b10001, 0b01111, 0b00001, 0b00010, 0b01100],
        'A' => [0b01110, 0b10001, 0b10001, 0b11111, 0b10001, 0b10001, 0b10001],
        'E' => [0b11111, 0b10000, 0b10000, 0b11110, 0b10000, 0b10000, 0b11111],
        'G' => [0b01110, 0b10001, 0b10000, 0b10111, 0b10001, 0b10001, 0b01111],
        'I' => [0b01110, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100, 0b01110],
        'L' => [0b10000, 0b10000, 0b10000, 0b10000, 0b10000, 0b10000, 0b11111],
        'N' => [0b10001, 0b11001, 0b10101, 0b10011, 0b10001, 0b10001, 0b10001],
        'O' => [0b01110, 0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b01110],
        'P' => [0b11110, 0b10001, 0b10001, 0b11110, 0b10000, 0b10000, 0b10000],
        'R' => [0b11110, 0b10001, 0b10001, 0b11110, 0b10100, 0b10010, 0b10001],
        'V' => [0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b01010, 0b00100],
        'W' => [0b10001, 0b10001, 0b10001, 0b10101, 0b10101, 0b10101, 0b01010],
        'Y' => [0b10001, 0b10001, 0b01010, 0b00100, 0b00100, 0b00100, 0b00100],
        _ => return None,
    };
    Some(rows)
}

/// Page width/height in points, following the inheritable `MediaBox` up the
/// page tree. Falls back to US Letter when the box is missing or degenerate.
fn page_dimensions(document: &Document, page_id: ObjectId) -> (f32, f32) {
    let mut current = Some(page_id);
    // Parent chains in real documents are a handful of levels; the cap only
    // guards against cyclic trees.
    for _ in 0..32 {
        let Some(id) = current else { break };
        let Some(dict) = dictionary_at(document, id) else { break };

        if let Ok(obj) = dict.get(b"MediaBox") {
            if let Some(dims) = rect_dimensions(document, obj) {
                return dims;
            }
        }
        current = dict.get(b"Parent").ok().and_then(|o| o.as_reference().ok());
    }
    DEFAULT_PAGE_PTS
}

fn dictionary_at(document: &Document, id: ObjectId) -> Option<&Dictionary> {
    document.get_object(id).ok()?.as_dict().ok()
}

/// `[x0 y0 x1 y1]` → (width, height), tolerating references and mixed
/// integer/real entries.
fn rect_dimensions(document: &Document, obj: &Object) -> Option<(f32, f32)> {
    let resolved = match obj {
        Object::Reference(id) => document.get_object(*id).ok()?,
        other => other,
    };
    let array = resolved.as_array().ok()?;
    if array.len() != 4 {
        return None;
    }
    let mut values = [0f32; 4];
    for (slot, entry) in values.iter_mut().zip(array.iter()) {
        *slot = number(entry)?;
    }
    let width = (values[2] - values[0]).abs();
    let height = (values[3] - values[1]).abs();
    if width > 0.0 && height > 0.0 {
        Some((width, height))
    } else {
        None
    }
}

fn number(obj: &Object) -> Option<f32> {
    match obj {
        Object::Integer(i) => Some(*i as f32),
        Object::Real(r) => Some(*r),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canvas_is_twice_the_page_points() {
        let img = render_page(612.0, 792.0, 1);
        assert_eq!(img.dimensions(), (1224, 1584));
    }

    #[test]
    fn rendering_is_deterministic() {
        let a = render_page(595.0, 842.0, 3);
        let b = render_page(595.0, 842.0, 3);
        assert_eq!(a.as_raw(), b.as_raw());
    }

    #[test]
    fn page_numbers_produce_distinct_images() {
        let a = render_page(612.0, 792.0, 1);
        let b = render_page(612.0, 792.0, 2);
        assert_ne!(a.as_raw(), b.as_raw());
    }

    #[test]
    fn background_is_white_and_border_is_drawn() {
        let img = render_page(612.0, 792.0, 1);
        // Corner lies outside the border inset.
        assert_eq!(img.get_pixel(2, 2), &BACKGROUND);
        assert_eq!(img.get_pixel(BORDER_MARGIN, BORDER_MARGIN), &BORDER);
    }

    #[test]
    fn degenerate_geometry_is_clamped() {
        let img = render_page(0.0, -5.0, 1);
        assert_eq!(img.dimensions(), (MIN_DIM, MIN_DIM));
    }

    #[test]
    fn glyph_table_covers_label_and_caption_characters() {
        for ch in "0123456789PAGE ".chars().chain(CAPTION.chars()) {
            if ch == ' ' {
                continue; // spaces render as blank advances
            }
            assert!(glyph(ch).is_some(), "missing glyph for {ch:?}");
        }
    }
}

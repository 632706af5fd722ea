//! Output harvesting: collect, order, and filter the rasterizer's files.
//!
//! ## Why not sort filenames lexicographically?
//!
//! `pdftoppm` names output `<prefix>-<page>.jpg` and, depending on build and
//! page count, may or may not zero-pad `<page>`. Raw lexicographic order
//! breaks at digit-width boundaries: `page-10.jpg` sorts before `page-9.jpg`.
//! The harvester parses the numeric suffix and sorts on that, which is
//! stable across every naming width, and also gives us the absolute page
//! number for free when a filter set needs applying.

use crate::error::TierError;
use crate::pipeline::plan::RenderPlan;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Extensions the rasterizer is expected to emit.
const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg"];

/// Collect the generated images from `scratch`, ordered by page number and
/// trimmed to the plan's filter set.
///
/// An empty result after filtering is a tier failure
/// ([`TierError::EmptyResultSet`]), never silently tolerated: it means the
/// rasterizer claimed success but produced nothing usable.
pub fn harvest(scratch: &Path, plan: &RenderPlan) -> Result<Vec<PathBuf>, TierError> {
    let mut files: Vec<PathBuf> = Vec::new();
    for entry in std::fs::read_dir(scratch).map_err(TierError::Io)? {
        let entry = entry.map_err(TierError::Io)?;
        let path = entry.path();
        let is_image = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| IMAGE_EXTENSIONS.iter().any(|x| e.eq_ignore_ascii_case(x)))
            .unwrap_or(false);
        if path.is_file() && is_image {
            files.push(path);
        }
    }

    files.sort_by_key(|path| (page_suffix(path).unwrap_or(u32::MAX), path.clone()));

    let mut images = Vec::with_capacity(files.len());
    for (index, path) in files.into_iter().enumerate() {
        let page = page_suffix(&path).unwrap_or_else(|| plan.first + index as u32);
        if let Some(filter) = &plan.filter {
            if !filter.contains(&page) {
                continue;
            }
        }
        images.push(path);
    }

    if images.is_empty() {
        return Err(TierError::EmptyResultSet);
    }

    debug!("harvested {} image(s) from {}", images.len(), scratch.display());
    Ok(images)
}

/// Parse the trailing page number out of a rasterizer output filename,
/// e.g. `page-07.jpg` → 7.
fn page_suffix(path: &Path) -> Option<u32> {
    let stem = path.file_stem()?.to_str()?;
    let digits: String = stem
        .chars()
        .rev()
        .take_while(char::is_ascii_digit)
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect();
    if digits.is_empty() {
        None
    } else {
        digits.parse().ok()
    }
}

//! Result types returned by the conversion entry points.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// The outcome of one successful conversion.
///
/// `images` is ordered by page number. The files live inside `scratch_dir`,
/// which the pipeline never deletes; copy what you need and leave the rest
/// to [`crate::scratch::sweep_scratch_root`].
///
/// Which tier produced the images is deliberately not part of this type.
/// The fallback chain records it in the logs only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversionOutput {
    /// Absolute paths of the generated images, in page order.
    pub images: Vec<PathBuf>,
    /// The scratch directory owning the files.
    pub scratch_dir: PathBuf,
    /// Timing and count statistics.
    pub stats: ConversionStats,
}

/// Statistics for one conversion run.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ConversionStats {
    /// Number of image files in the result.
    pub images_produced: usize,
    /// Total wall-clock time, including all fallback attempts.
    pub total_duration_ms: u64,
}

/// Document metadata extracted without rendering anything.
///
/// Returned by [`crate::convert::inspect`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentMetadata {
    pub title: Option<String>,
    pub author: Option<String>,
    pub subject: Option<String>,
    pub creator: Option<String>,
    pub producer: Option<String>,
    /// Number of pages in the document.
    pub page_count: usize,
    /// Size of the source file in bytes.
    pub file_size: u64,
}

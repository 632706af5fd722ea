//! Configuration types for PDF-to-image conversion.
//!
//! All conversion behaviour is controlled through [`ConversionConfig`], built
//! via its [`ConversionConfigBuilder`]. Keeping every knob in one struct makes
//! it trivial to share configs across threads and to diff two runs to
//! understand why their outputs differ.
//!
//! # Design choice: builder over constructor
//! The page-selection fields interact (an explicit page set overrides the
//! first/last bounds, `max_pages` caps an open-ended range) and most callers
//! only ever set one or two of them. The builder lets callers set exactly
//! what they care about and validates the combination once, in `build()`.

use crate::error::ConvertError;
use crate::pipeline::locate::ExecutorLocator;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

/// Configuration for one PDF-to-image conversion.
///
/// Built via [`ConversionConfig::builder()`] or using
/// [`ConversionConfig::default()`].
///
/// # Example
/// ```rust
/// use pdf2img::{ConversionConfig, Quality};
///
/// let config = ConversionConfig::builder()
///     .quality(Quality::High)
///     .selected_pages([2, 4])
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct ConversionConfig {
    /// Rendering quality preset. Default: [`Quality::Normal`].
    ///
    /// Maps to the rasterizer resolution: draft renders at 120 DPI, normal at
    /// 150 DPI, high at 200 DPI. The pdfium fallback tier derives its pixel
    /// dimensions from the same table, so escalating tiers does not change
    /// the output scale.
    pub quality: Quality,

    /// Requested output format. Default: [`OutputFormat::Jpeg`].
    ///
    /// The pipeline currently always emits JPEG, on every tier, so that the
    /// caller cannot tell tiers apart by file extension. The field records
    /// the caller's preference and is reserved for a future PNG path.
    pub format: OutputFormat,

    /// First page to render, 1-based. Default: none (start at page 1).
    pub first_page: Option<u32>,

    /// Last page to render, 1-based, inclusive. Default: none.
    ///
    /// When both `last_page` and `max_pages` could apply, the tighter bound
    /// wins.
    pub last_page: Option<u32>,

    /// Upper bound on the number of pages rendered when no explicit end was
    /// given. Default: 50.
    ///
    /// Documents shorter than the resulting range simply yield fewer images;
    /// that is not an error. The placeholder tier ignores every page bound
    /// and always covers the whole document.
    pub max_pages: u32,

    /// Explicit set of 1-based pages to return. Default: none.
    ///
    /// Takes precedence over `first_page`/`last_page`/`max_pages` for the
    /// final result. The rasterizer is still asked for the single contiguous
    /// span `[min, max]` of the set (one invocation, not N), and the extra
    /// pages are filtered out afterwards.
    pub selected_pages: Option<BTreeSet<u32>>,

    /// Hard wall-clock limit for the external rasterizer process, in
    /// seconds. Default: 30.
    ///
    /// A process still running at the deadline is killed and the attempt is
    /// recorded as a failure, never as a success with partial output.
    pub exec_timeout_secs: u64,

    /// Root directory under which per-call scratch directories are created.
    /// Default: `<system temp dir>/pdf2img`.
    pub scratch_root: Option<PathBuf>,

    /// Explicit path to a pdfium shared library for the fallback tier.
    ///
    /// When unset, the fallback tier binds to the system-installed pdfium if
    /// one exists. Mirrors the `PDFIUM_LIB_PATH` convention.
    pub pdfium_library_path: Option<PathBuf>,

    /// Pre-constructed executor locator. Takes precedence over the built-in
    /// install-path probing. Intended for tests and embedders that already
    /// know where their rasterizer lives.
    pub locator: Option<Arc<dyn ExecutorLocator>>,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            quality: Quality::default(),
            format: OutputFormat::default(),
            first_page: None,
            last_page: None,
            max_pages: 50,
            selected_pages: None,
            exec_timeout_secs: 30,
            scratch_root: None,
            pdfium_library_path: None,
            locator: None,
        }
    }
}

impl fmt::Debug for ConversionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConversionConfig")
            .field("quality", &self.quality)
            .field("format", &self.format)
            .field("first_page", &self.first_page)
            .field("last_page", &self.last_page)
            .field("max_pages", &self.max_pages)
            .field("selected_pages", &self.selected_pages)
            .field("exec_timeout_secs", &self.exec_timeout_secs)
            .field("scratch_root", &self.scratch_root)
            .field("pdfium_library_path", &self.pdfium_library_path)
            .field("locator", &self.locator.as_ref().map(|_| "<dyn ExecutorLocator>"))
            .finish()
    }
}

impl ConversionConfig {
    /// Create a new builder for `ConversionConfig`.
    pub fn builder() -> ConversionConfigBuilder {
        ConversionConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`ConversionConfig`].
#[derive(Debug)]
pub struct ConversionConfigBuilder {
    config: ConversionConfig,
}

impl ConversionConfigBuilder {
    pub fn quality(mut self, quality: Quality) -> Self {
        self.config.quality = quality;
        self
    }

    pub fn format(mut self, format: OutputFormat) -> Self {
        self.config.format = format;
        self
    }

    pub fn first_page(mut self, page: u32) -> Self {
        self.config.first_page = Some(page);
        self
    }

    pub fn last_page(mut self, page: u32) -> Self {
        self.config.last_page = Some(page);
        self
    }

    pub fn max_pages(mut self, n: u32) -> Self {
        self.config.max_pages = n.max(1);
        self
    }

    pub fn selected_pages(mut self, pages: impl IntoIterator<Item = u32>) -> Self {
        self.config.selected_pages = Some(pages.into_iter().collect());
        self
    }

    pub fn exec_timeout_secs(mut self, secs: u64) -> Self {
        self.config.exec_timeout_secs = secs.max(1);
        self
    }

    pub fn scratch_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.config.scratch_root = Some(root.into());
        self
    }

    pub fn pdfium_library_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.pdfium_library_path = Some(path.into());
        self
    }

    pub fn locator(mut self, locator: Arc<dyn ExecutorLocator>) -> Self {
        self.config.locator = Some(locator);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ConversionConfig, ConvertError> {
        let c = &self.config;
        if c.max_pages == 0 {
            return Err(ConvertError::InvalidConfig("max_pages must be ≥ 1".into()));
        }
        if let Some(first) = c.first_page {
            if first == 0 {
                return Err(ConvertError::InvalidConfig(
                    "page numbers are 1-based; first_page must be ≥ 1".into(),
                ));
            }
            if let Some(last) = c.last_page {
                if last < first {
                    return Err(ConvertError::InvalidConfig(format!(
                        "last_page ({last}) must be ≥ first_page ({first})"
                    )));
                }
            }
        }
        if c.last_page == Some(0) {
            return Err(ConvertError::InvalidConfig(
                "page numbers are 1-based; last_page must be ≥ 1".into(),
            ));
        }
        if let Some(pages) = &c.selected_pages {
            if pages.contains(&0) {
                return Err(ConvertError::InvalidConfig(
                    "page numbers are 1-based; selected_pages must not contain 0".into(),
                ));
            }
        }
        Ok(self.config)
    }
}

// ── Enums ────────────────────────────────────────────────────────────────

/// Rendering quality preset, mapped to a rasterization resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Quality {
    /// 120 DPI. Fast previews.
    Draft,
    /// 150 DPI. (default)
    #[default]
    Normal,
    /// 200 DPI. Print-oriented output.
    High,
}

impl Quality {
    /// The `-r` resolution passed to the rasterizer.
    pub fn dpi(self) -> u32 {
        match self {
            Quality::Draft => 120,
            Quality::Normal => 150,
            Quality::High => 200,
        }
    }
}

/// Requested raster output format.
///
/// Advisory for now: every tier emits JPEG regardless, see
/// [`ConversionConfig::format`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// JPEG output. (default)
    #[default]
    Jpeg,
    /// PNG output (reserved).
    Png,
}

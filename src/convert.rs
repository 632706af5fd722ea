//! Conversion entry points and the fallback chain.
//!
//! ## The chain
//!
//! Three tiers run in strict order, each a function with the same shape
//! (`source + scratch + plan → images or a tier failure`):
//!
//! 1. **External rasterizer** — locate `pdftoppm`, invoke it once over the
//!    planned span, harvest the output directory.
//! 2. **pdfium fallback** — render the same plan in-process.
//! 3. **Placeholder** — one synthetic image per document page; cannot fail
//!    unless the PDF itself is unopenable.
//!
//! Escalation is one-directional and wholesale: any failure at any step of a
//! tier abandons that tier completely. Outputs from two tiers are never
//! mixed, and the caller is never told which tier won — that lives in the
//! logs only.
//!
//! All tiers share one scratch directory per call, allocated up front; a
//! failed tier's partial files are invisible to later tiers because the
//! placeholder tier writes its own zero-padded names and the result list is
//! always built from the winning tier's own files.

use crate::config::ConversionConfig;
use crate::error::{ConvertError, TierError};
use crate::output::{ConversionOutput, ConversionStats, DocumentMetadata};
use crate::pipeline::locate::SystemLocator;
use crate::pipeline::plan::RenderPlan;
use crate::pipeline::{harvest, invoke, library, placeholder};
use crate::scratch;
use lopdf::{Dictionary, Document, Object};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Convert a PDF file to one image per requested page.
///
/// This is the primary entry point for the library.
///
/// # Errors
/// Fails only when the source file is missing/unreadable
/// ([`ConvertError::SourceUnreadable`]) or when even the placeholder tier
/// cannot open the document ([`ConvertError::PdfUnreadable`]). Every other
/// failure mode is absorbed by the fallback chain.
pub async fn convert(
    source: impl AsRef<Path>,
    config: &ConversionConfig,
) -> Result<ConversionOutput, ConvertError> {
    let started = Instant::now();
    let source = source.as_ref().to_path_buf();

    // ── Preconditions ────────────────────────────────────────────────────
    check_source(&source)?;
    if config.format != crate::config::OutputFormat::Jpeg {
        debug!("requested format {:?} recorded; output is always JPEG", config.format);
    }

    // ── Scratch + plan ───────────────────────────────────────────────────
    let root = config
        .scratch_root
        .clone()
        .unwrap_or_else(scratch::default_scratch_root);
    let scratch_dir = scratch::allocate(&root, "pdf-to-images")?;
    let plan = RenderPlan::resolve(config);
    let dpi = config.quality.dpi();
    info!(
        "converting {} (pages {}..={}, {} dpi)",
        source.display(),
        plan.first,
        plan.last,
        dpi
    );

    // ── Tier 1: external rasterizer ──────────────────────────────────────
    match external_tier(&source, &scratch_dir, &plan, dpi, config).await {
        Ok(images) => return Ok(finish(images, scratch_dir, started)),
        Err(err) => warn!("external rasterizer attempt failed, falling back: {err}"),
    }

    // ── Tier 2: pdfium fallback ──────────────────────────────────────────
    match library_tier(&source, &scratch_dir, &plan, dpi, config).await {
        Ok(images) => return Ok(finish(images, scratch_dir, started)),
        Err(err) => warn!("pdfium fallback failed, generating placeholders: {err}"),
    }

    // ── Tier 3: placeholder (terminal) ───────────────────────────────────
    let images = placeholder_tier(&source, &scratch_dir).await?;
    Ok(finish(images, scratch_dir, started))
}

/// Synchronous wrapper around [`convert`].
///
/// Creates a temporary tokio runtime internally.
pub fn convert_sync(
    source: impl AsRef<Path>,
    config: &ConversionConfig,
) -> Result<ConversionOutput, ConvertError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| ConvertError::Internal(format!("failed to create tokio runtime: {e}")))?
        .block_on(convert(source, config))
}

/// Extract document metadata without rendering anything.
pub async fn inspect(source: impl AsRef<Path>) -> Result<DocumentMetadata, ConvertError> {
    let source = source.as_ref().to_path_buf();
    check_source(&source)?;
    tokio::task::spawn_blocking(move || inspect_blocking(&source))
        .await
        .map_err(|e| ConvertError::Internal(format!("inspect task panicked: {e}")))?
}

// ── Tiers ────────────────────────────────────────────────────────────────

/// Tier 1: locate → invoke → harvest. No partial retry; the first failure
/// abandons the whole tier.
async fn external_tier(
    source: &Path,
    scratch_dir: &Path,
    plan: &RenderPlan,
    dpi: u32,
    config: &ConversionConfig,
) -> Result<Vec<PathBuf>, TierError> {
    // Discovery runs fresh on every call, never cached across calls.
    let locator = config
        .locator
        .clone()
        .unwrap_or_else(|| Arc::new(SystemLocator::new()));
    let handle = tokio::task::spawn_blocking(move || locator.locate())
        .await
        .map_err(|e| TierError::Io(std::io::Error::other(format!("locator task panicked: {e}"))))?
        .ok_or(TierError::ExecutorNotFound)?;

    invoke::invoke(
        &handle,
        source,
        scratch_dir,
        plan,
        dpi,
        config.exec_timeout_secs,
    )
    .await?;

    harvest::harvest(scratch_dir, plan)
}

/// Tier 2: in-process pdfium rendering of the same plan.
async fn library_tier(
    source: &Path,
    scratch_dir: &Path,
    plan: &RenderPlan,
    dpi: u32,
    config: &ConversionConfig,
) -> Result<Vec<PathBuf>, TierError> {
    let source = source.to_path_buf();
    let scratch_dir = scratch_dir.to_path_buf();
    let plan = plan.clone();
    let library_path = config.pdfium_library_path.clone();

    tokio::task::spawn_blocking(move || {
        library::render_with_pdfium(&source, &scratch_dir, &plan, dpi, library_path.as_deref())
    })
    .await
    .map_err(|e| TierError::LibraryRenderError(format!("render task panicked: {e}")))?
}

/// Tier 3: placeholders for every document page. Its errors are fatal.
async fn placeholder_tier(
    source: &Path,
    scratch_dir: &Path,
) -> Result<Vec<PathBuf>, ConvertError> {
    let source = source.to_path_buf();
    let scratch_dir = scratch_dir.to_path_buf();

    tokio::task::spawn_blocking(move || placeholder::render_document(&source, &scratch_dir))
        .await
        .map_err(|e| ConvertError::Internal(format!("placeholder task panicked: {e}")))?
}

// ── Helpers ──────────────────────────────────────────────────────────────

fn check_source(path: &Path) -> Result<(), ConvertError> {
    let unreadable = || ConvertError::SourceUnreadable {
        path: path.to_path_buf(),
    };
    if !path.is_file() {
        return Err(unreadable());
    }
    std::fs::File::open(path).map_err(|_| unreadable())?;
    Ok(())
}

fn finish(images: Vec<PathBuf>, scratch_dir: PathBuf, started: Instant) -> ConversionOutput {
    let stats = ConversionStats {
        images_produced: images.len(),
        total_duration_ms: started.elapsed().as_millis() as u64,
    };
    info!(
        "conversion complete: {} image(s) in {}ms",
        stats.images_produced, stats.total_duration_ms
    );
    ConversionOutput {
        images,
        scratch_dir,
        stats,
    }
}

fn inspect_blocking(source: &Path) -> Result<DocumentMetadata, ConvertError> {
    let document = Document::load(source).map_err(|e| ConvertError::PdfUnreadable {
        path: source.to_path_buf(),
        detail: e.to_string(),
    })?;

    let page_count = document.get_pages().len();
    let file_size = std::fs::metadata(source).map(|m| m.len()).unwrap_or(0);
    let info = info_dictionary(&document);

    Ok(DocumentMetadata {
        title: text_field(info, b"Title"),
        author: text_field(info, b"Author"),
        subject: text_field(info, b"Subject"),
        creator: text_field(info, b"Creator"),
        producer: text_field(info, b"Producer"),
        page_count,
        file_size,
    })
}

fn info_dictionary(document: &Document) -> Option<&Dictionary> {
    let obj = document.trailer.get(b"Info").ok()?;
    let resolved = match obj {
        Object::Reference(id) => document.get_object(*id).ok()?,
        other => other,
    };
    resolved.as_dict().ok()
}

fn text_field(dict: Option<&Dictionary>, key: &[u8]) -> Option<String> {
    match dict?.get(key).ok()? {
        Object::String(bytes, _) => {
            let text = String::from_utf8_lossy(bytes).trim().to_string();
            if text.is_empty() {
                None
            } else {
                Some(text)
            }
        }
        _ => None,
    }
}

//! Error types for the pdf2img library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`ConvertError`] — **Fatal**: the conversion cannot proceed at all
//!   (missing source file, invalid configuration, or a document so broken
//!   that even the placeholder generator has nothing to work with). Returned
//!   as `Err(ConvertError)` from the top-level `convert*` functions.
//!
//! * [`TierError`] — **Tier-local**: one rendering tier failed. The fallback
//!   chain catches these, logs the diagnostic context, and escalates to the
//!   next tier. A `TierError` never reaches the caller while a later tier
//!   exists, so callers cannot (and must not) branch on which tier ran.

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the pdf2img library.
///
/// Tier-local failures use [`TierError`] and are consumed by the fallback
/// chain rather than propagated here.
#[derive(Debug, Error)]
pub enum ConvertError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Source file is missing or cannot be opened for reading.
    #[error("source file not found or unreadable: '{path}'\nCheck the path exists and is readable.")]
    SourceUnreadable { path: PathBuf },

    /// The document could not be opened by the placeholder tier, which has
    /// no further tier to fall back to.
    #[error("failed to open PDF '{path}': {detail}")]
    PdfUnreadable { path: PathBuf, detail: String },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    // ── I/O errors ────────────────────────────────────────────────────────
    /// The per-call scratch directory could not be created.
    #[error("failed to allocate scratch directory under '{root}': {source}")]
    ScratchUnavailable {
        root: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Could not write a generated image file.
    #[error("failed to write image '{path}': {source}")]
    ImageWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("internal error: {0}")]
    Internal(String),
}

/// A failure local to one rendering tier.
///
/// Produced by the external-rasterizer tier (locate, invoke, harvest) and by
/// the pdfium fallback tier. The chain controller in [`crate::convert`] logs
/// the variant and moves on; only the diagnostic text survives, in the logs.
#[derive(Debug, Error)]
pub enum TierError {
    /// No rasterizer executable was found in any candidate location or on
    /// the search path.
    #[error("no PDF rasterizer executable found on this system")]
    ExecutorNotFound,

    /// The rasterizer process exited with a non-zero status.
    #[error("rasterizer exited with status {code}: {stderr}")]
    ProcessExitFailure { code: i32, stderr: String },

    /// The rasterizer was still running at the wall-clock deadline and was
    /// killed. Never retried within the tier.
    #[error("rasterizer timed out after {secs}s and was killed")]
    ProcessTimeout { secs: u64 },

    /// The output directory held no matching images after filtering.
    #[error("rasterizer produced no output images")]
    EmptyResultSet,

    /// Any failure inside the pdfium fallback tier: binding, document load,
    /// per-page render, or encode.
    #[error("library rendering failed: {0}")]
    LibraryRenderError(String),

    /// I/O failure while driving a tier (spawn, directory listing, file write).
    #[error("i/o error during conversion attempt: {0}")]
    Io(#[from] std::io::Error),
}

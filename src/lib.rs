//! # pdf2img
//!
//! Batch-convert PDF pages to raster images, reliably, on hosts you do not
//! control.
//!
//! ## Why this crate?
//!
//! Rasterising a PDF sounds like a one-liner until the code leaves your
//! machine: poppler may be installed under `/opt/homebrew/bin`,
//! `/usr/local/bin`, `/usr/bin`, or not at all; a pdfium shared library may
//! or may not be present; a damaged document can hang an external renderer
//! forever. This crate wraps all of that in a fallback chain that gives the
//! caller bounded-time, predictable results: you always get at least one
//! image per page, even on a machine with no rendering capability installed.
//!
//! ## Pipeline Overview
//!
//! ```text
//! PDF
//!  │
//!  ├─ 1. Plan        resolve page options into one contiguous span
//!  ├─ 2. Tier 1      pdftoppm subprocess (located per-call, hard 30s deadline)
//!  ├─ 3. Tier 2      pdfium in-process rendering, same plan
//!  ├─ 4. Tier 3      synthetic placeholder per page (cannot fail)
//!  └─ 5. Output      ordered image paths in a per-call scratch directory
//! ```
//!
//! Escalation is strictly one-directional and all-or-nothing; outputs from
//! two tiers are never mixed, and which tier succeeded is visible only in
//! the logs.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pdf2img::{convert, ConversionConfig, Quality};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ConversionConfig::builder()
//!         .quality(Quality::High)
//!         .selected_pages([2, 4])
//!         .build()?;
//!     let output = convert("document.pdf", &config).await?;
//!     for image in &output.images {
//!         println!("{}", image.display());
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Scratch directories
//!
//! Generated images live in a uniquely named directory per call. The
//! pipeline never deletes it — copy what you need, then have the host sweep
//! old directories with [`sweep_scratch_root`] on its own schedule.
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `pdf2img` binary (clap + anyhow + tracing-subscriber + indicatif) |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod convert;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod scratch;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{ConversionConfig, ConversionConfigBuilder, OutputFormat, Quality};
pub use convert::{convert, convert_sync, inspect};
pub use error::{ConvertError, TierError};
pub use output::{ConversionOutput, ConversionStats, DocumentMetadata};
pub use pipeline::locate::{ExecutorHandle, ExecutorLocator, SystemLocator};
pub use scratch::{default_scratch_root, sweep_scratch_root};

//! Rasterizer executable discovery.
//!
//! The primary tier shells out to poppler's `pdftoppm`. Where that binary
//! lives varies by host: Homebrew on Apple-silicon Macs installs under
//! `/opt/homebrew/bin`, Intel Homebrew and manual installs under
//! `/usr/local/bin`, Debian/Ubuntu packages under `/usr/bin`. The locator
//! probes those fixed locations in order and finally asks the OS search path
//! via a `which` probe, returning the first hit.
//!
//! Discovery is read-only and runs fresh on every conversion call. Caching
//! the result would go stale the moment the user installs or removes
//! poppler mid-session, and the probe itself is a handful of `stat` calls.

use std::fmt;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tracing::debug;

/// Command name of the external rasterizer.
pub const RASTERIZER_BIN: &str = "pdftoppm";

/// Fixed install locations probed before falling back to the search path.
const CANDIDATE_PATHS: &[&str] = &[
    "/opt/homebrew/bin/pdftoppm",
    "/usr/local/bin/pdftoppm",
    "/usr/bin/pdftoppm",
];

/// A resolved rasterizer executable.
///
/// Valid for a single conversion attempt; callers re-run discovery rather
/// than holding on to a handle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutorHandle(PathBuf);

impl ExecutorHandle {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self(path.into())
    }

    pub fn as_path(&self) -> &Path {
        &self.0
    }
}

impl fmt::Display for ExecutorHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.display())
    }
}

/// Strategy interface for finding the external rasterizer.
///
/// The default implementation is [`SystemLocator`]. Tests and embedders can
/// plug their own via [`crate::ConversionConfig::locator`] — an
/// always-missing locator forces the fallback tiers without touching the
/// real filesystem.
pub trait ExecutorLocator: Send + Sync {
    /// Return the first working candidate, or `None` when every candidate is
    /// exhausted. Absence of an individual candidate is not an error.
    fn locate(&self) -> Option<ExecutorHandle>;
}

/// Probes fixed install paths, then the OS search path.
pub struct SystemLocator {
    candidates: Vec<PathBuf>,
}

impl SystemLocator {
    pub fn new() -> Self {
        Self {
            candidates: CANDIDATE_PATHS.iter().map(PathBuf::from).collect(),
        }
    }

    /// Replace the fixed candidate list. The search-path probe still runs
    /// after the list is exhausted.
    pub fn with_candidates(candidates: Vec<PathBuf>) -> Self {
        Self { candidates }
    }
}

impl Default for SystemLocator {
    fn default() -> Self {
        Self::new()
    }
}

impl ExecutorLocator for SystemLocator {
    fn locate(&self) -> Option<ExecutorHandle> {
        for candidate in &self.candidates {
            if candidate.is_file() {
                debug!("found rasterizer at {}", candidate.display());
                return Some(ExecutorHandle::new(candidate));
            }
        }
        probe_search_path()
    }
}

/// Ask the OS whether the bare command name resolves on the search path.
fn probe_search_path() -> Option<ExecutorHandle> {
    let probe = if cfg!(windows) { "where" } else { "which" };
    let output = std::process::Command::new(probe)
        .arg(RASTERIZER_BIN)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .output()
        .ok()?;
    if !output.status.success() {
        return None;
    }
    let stdout = String::from_utf8_lossy(&output.stdout);
    let resolved = stdout.lines().next()?.trim();
    if resolved.is_empty() {
        return None;
    }
    debug!("rasterizer resolved on search path: {resolved}");
    Some(ExecutorHandle::new(resolved))
}

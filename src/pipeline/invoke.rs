//! External rasterizer invocation.
//!
//! Builds the `pdftoppm` argument list, launches the process with stderr
//! piped, and enforces a hard wall-clock deadline.
//!
//! ## Why `kill_on_drop`?
//!
//! The timeout path must never leave an orphaned rasterizer chewing on a
//! pathological document. `kill_on_drop(true)` ties the child's lifetime to
//! the `Child` handle: when `tokio::time::timeout` expires, the pending
//! `wait_with_output` future (which owns the handle) is dropped and the
//! process is killed. The same mechanism covers a caller that drops the
//! whole conversion future early.
//!
//! Exit status is the only success signal. `pdftoppm` writes warnings about
//! damaged xref tables and unembedded fonts to stderr on perfectly usable
//! documents, so stderr content is captured for diagnostics but never
//! interpreted.

use crate::error::TierError;
use crate::pipeline::locate::ExecutorHandle;
use crate::pipeline::plan::RenderPlan;
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::debug;

/// Filename prefix for rasterizer output; `pdftoppm` appends `-<page>.jpg`.
pub const OUTPUT_PREFIX: &str = "page";

/// Longest stderr excerpt carried in an error.
const STDERR_EXCERPT_LEN: usize = 500;

/// Run the rasterizer over the planned page span, writing JPEGs into
/// `scratch`.
///
/// Returns `Ok(())` on a zero exit status; the caller harvests the output
/// directory afterwards. Every failure mode maps to a [`TierError`]:
/// spawn failure, non-zero exit, or the deadline expiring.
pub async fn invoke(
    executor: &ExecutorHandle,
    source: &Path,
    scratch: &Path,
    plan: &RenderPlan,
    dpi: u32,
    timeout_secs: u64,
) -> Result<(), TierError> {
    let prefix = scratch.join(OUTPUT_PREFIX);

    let mut cmd = Command::new(executor.as_path());
    cmd.arg("-jpeg")
        .args(["-r", &dpi.to_string()])
        .arg("-cropbox")
        .args(["-f", &plan.first.to_string()])
        .args(["-l", &plan.last.to_string()])
        .arg(source)
        .arg(&prefix)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    debug!(
        "invoking {} -jpeg -r {} -cropbox -f {} -l {} {} {}",
        executor,
        dpi,
        plan.first,
        plan.last,
        source.display(),
        prefix.display()
    );

    let child = cmd.spawn().map_err(TierError::Io)?;

    let output = match timeout(Duration::from_secs(timeout_secs), child.wait_with_output()).await {
        Ok(result) => result.map_err(TierError::Io)?,
        // Dropping the wait future killed the child; see module docs.
        Err(_elapsed) => return Err(TierError::ProcessTimeout { secs: timeout_secs }),
    };

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(TierError::ProcessExitFailure {
            code: output.status.code().unwrap_or(-1),
            stderr: excerpt(&stderr),
        });
    }

    debug!("rasterizer completed pages {}..={}", plan.first, plan.last);
    Ok(())
}

fn excerpt(text: &str) -> String {
    let trimmed = text.trim();
    if trimmed.len() <= STDERR_EXCERPT_LEN {
        return trimmed.to_string();
    }
    let mut end = STDERR_EXCERPT_LEN;
    while !trimmed.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}\u{2026}", &trimmed[..end])
}

//! Scratch-directory management.
//!
//! ## Why the pipeline never deletes its own output
//!
//! The conversion result is a list of paths *into* the scratch directory.
//! Deleting the directory when `convert` returns would invalidate the result
//! before the caller could copy or display the files. Instead every call
//! gets a fresh uniquely-named directory, and the host application runs
//! [`sweep_scratch_root`] on whatever cadence suits it (the typical desktop
//! host sweeps every half hour).
//!
//! ## Naming
//!
//! Directory names combine a caller-supplied prefix, a UNIX-seconds
//! timestamp, and `tempfile`'s random suffix. Two conversions started in the
//! same instant on the same root cannot collide.

use crate::error::ConvertError;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tracing::{debug, warn};

/// Default scratch root: `<system temp dir>/pdf2img`.
pub fn default_scratch_root() -> PathBuf {
    std::env::temp_dir().join("pdf2img")
}

/// Create a fresh, uniquely named scratch directory under `root`.
///
/// The directory is *not* registered for automatic deletion; ownership of
/// its lifetime passes to the caller and ultimately to [`sweep_scratch_root`].
pub fn allocate(root: &Path, prefix: &str) -> Result<PathBuf, ConvertError> {
    std::fs::create_dir_all(root).map_err(|e| ConvertError::ScratchUnavailable {
        root: root.to_path_buf(),
        source: e,
    })?;

    let stamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);

    let dir = tempfile::Builder::new()
        .prefix(&format!("{prefix}-{stamp}-"))
        .tempdir_in(root)
        .map_err(|e| ConvertError::ScratchUnavailable {
            root: root.to_path_buf(),
            source: e,
        })?;

    // Detach from tempfile's drop-time cleanup; see module docs.
    let path = dir.keep();
    debug!("allocated scratch directory {}", path.display());
    Ok(path)
}

/// Delete entries under `root` whose modification time is older than
/// `max_age`. Returns the number of entries removed.
///
/// Failures on individual entries are logged and skipped; a missing or
/// unreadable root is treated as nothing to do.
pub fn sweep_scratch_root(root: &Path, max_age: Duration) -> usize {
    let entries = match std::fs::read_dir(root) {
        Ok(entries) => entries,
        Err(_) => return 0,
    };

    let now = SystemTime::now();
    let mut removed = 0;

    for entry in entries.flatten() {
        let path = entry.path();
        let stale = entry
            .metadata()
            .and_then(|m| m.modified())
            .ok()
            .and_then(|mtime| now.duration_since(mtime).ok())
            .map(|age| age >= max_age)
            .unwrap_or(false);
        if !stale {
            continue;
        }

        let result = if path.is_dir() {
            std::fs::remove_dir_all(&path)
        } else {
            std::fs::remove_file(&path)
        };
        match result {
            Ok(()) => {
                debug!("swept stale scratch entry {}", path.display());
                removed += 1;
            }
            Err(e) => warn!("failed to sweep {}: {e}", path.display()),
        }
    }

    removed
}

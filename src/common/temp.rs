//! Work directory lifecycle helpers.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Remove `dir` if it exists and create it again, empty.
pub fn recreate_dir(dir: &Path) -> Result<PathBuf> {
    if dir.exists() {
        fs::remove_dir_all(dir)
            .with_context(|| format!("Failed to remove {}", dir.display()))?;
    }
    fs::create_dir_all(dir).with_context(|| format!("Failed to create {}", dir.display()))?;
    Ok(dir.to_path_buf())
}

/// Create a fresh, uniquely named directory under the system temp dir.
///
/// The directory is NOT removed on drop; pair with [`cleanup_work_dir`].
pub fn create_work_dir(prefix: &str) -> Result<PathBuf> {
    let dir = tempfile::Builder::new()
        .prefix(prefix)
        .disable_cleanup(true)
        .tempdir()
        .with_context(|| format!("Failed to create temporary directory '{}*'", prefix))?;
    Ok(dir.path().to_path_buf())
}

/// Remove a work directory, logging instead of failing.
pub fn cleanup_work_dir(path: &Path) {
    if let Err(e) = fs::remove_dir_all(path) {
        if path.exists() {
            tracing::warn!(path = %path.display(), error = %e, "Could not remove work directory");
        }
    }
}

//! Filesystem helpers shared across the pipeline.

use crate::core::GhrabError;
use anyhow::Result;
use std::path::Path;

/// Create a directory and any missing parents.
///
/// Succeeds silently when the directory already exists; destination
/// directories are merged into, never replaced.
pub fn ensure_dir(path: &Path) -> Result<()> {
    if path.exists() {
        if path.is_dir() {
            return Ok(());
        }
        return Err(GhrabError::FileSystem {
            operation: "create directory (a file is in the way)".to_string(),
            path: path.display().to_string(),
        }
        .into());
    }

    std::fs::create_dir_all(path).map_err(|e| GhrabError::FileSystem {
        operation: format!("create directory ({e})"),
        path: path.display().to_string(),
    })?;
    Ok(())
}

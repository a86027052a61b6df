//! Rewriting version pins in the deployment repository's working tree.

use crate::matcher::PendingChange;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

/// Errors that can occur while editing pinned files.
#[derive(Debug, Error)]
pub enum ApplyError {
    /// Failed to read or write a file.
    #[error("Failed to access '{path}': {source}")]
    IoError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The pin to replace is not in the file.
    #[error("Pattern '{pattern}' not found in '{path}'")]
    PatternNotFound { path: String, pattern: String },
}

/// Replaces the old pin of `change` with the target pin.
///
/// Exact substring replacement in the dependency's designated file. When the
/// old pin is absent nothing is written and [`ApplyError::PatternNotFound`] is
/// returned, so no empty commit can follow.
///
/// # Returns
///
/// Paths of modified files, relative to `workdir`.
pub fn apply_change(workdir: &Path, change: &PendingChange) -> Result<Vec<PathBuf>, ApplyError> {
    let id = change.dependency.id;
    let relative = PathBuf::from(id.pinned_file());
    let path = workdir.join(&relative);

    let old_pin = id.pin(change.old_version());
    let new_pin = id.pin(&change.target_version);
    debug!(file = %relative.display(), old = %old_pin, new = %new_pin, "Rewriting pin");

    let content = std::fs::read_to_string(&path).map_err(|e| ApplyError::IoError {
        path: path.display().to_string(),
        source: e,
    })?;

    if !content.contains(&old_pin) {
        return Err(ApplyError::PatternNotFound {
            path: relative.display().to_string(),
            pattern: old_pin,
        });
    }

    let updated = content.replace(&old_pin, &new_pin);
    std::fs::write(&path, updated).map_err(|e| ApplyError::IoError {
        path: path.display().to_string(),
        source: e,
    })?;

    info!(dependency = %id, file = %relative.display(), "Updated pin");
    Ok(vec![relative])
}

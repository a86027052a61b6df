//! Version control error types.

use super::BranchState;
use thiserror::Error;

/// Errors that can occur during version control operations.
#[derive(Debug, Error)]
pub enum GitError {
    /// The git executable could not be started.
    #[error("Failed to execute git {command}: {source}")]
    SpawnFailed {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// A git command exited unsuccessfully.
    #[error("git {command} failed: {stderr}")]
    CommandFailed { command: String, stderr: String },

    /// A branch step was attempted out of order.
    #[error("Cannot move branch from {from:?} to {to:?}")]
    InvalidTransition { from: BranchState, to: BranchState },
}

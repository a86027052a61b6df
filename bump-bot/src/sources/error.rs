//! Version source error types.

use thiserror::Error;

/// Errors that can occur while reading live or latest versions.
#[derive(Debug, Error)]
pub enum SourceError {
    /// A remote version document could not be fetched or lacks the expected field.
    #[error("{what} unavailable: {reason}")]
    Unavailable { what: String, reason: String },
}

impl SourceError {
    pub(crate) fn unavailable(what: impl Into<String>, reason: impl ToString) -> Self {
        Self::Unavailable {
            what: what.into(),
            reason: reason.to_string(),
        }
    }
}

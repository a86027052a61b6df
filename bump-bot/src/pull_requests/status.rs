//! Pull request status types.

use serde::Serialize;

/// Outcome of publishing a bump PR.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PrStatus {
    /// A new PR was opened.
    Created {
        /// GitHub PR number.
        number: u64,
        /// GitHub PR URL.
        url: String,
    },

    /// An existing PR was moved to the new version.
    Updated {
        /// GitHub PR number.
        number: u64,
        /// GitHub PR URL.
        url: String,
    },
}

impl PrStatus {
    /// Returns the status as a string.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Created { .. } => "created",
            Self::Updated { .. } => "updated",
        }
    }

    #[must_use]
    pub fn number(&self) -> u64 {
        match self {
            Self::Created { number, .. } | Self::Updated { number, .. } => *number,
        }
    }

    #[must_use]
    pub fn url(&self) -> &str {
        match self {
            Self::Created { url, .. } | Self::Updated { url, .. } => url,
        }
    }
}

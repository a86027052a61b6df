//! Processing result types.

use crate::dependency::DependencyId;
use crate::matcher::ChangeAction;
use crate::pull_requests::PrStatus;
use serde::Serialize;

/// Result of processing a single dependency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum ProcessingResult {
    /// Live already equals latest.
    UpToDate {
        dependency: DependencyId,
        version: String,
    },

    /// An open bot PR already proposes the latest version.
    AlreadyProposed {
        dependency: DependencyId,
        latest: String,
    },

    /// A bump PR was created or updated.
    Published {
        dependency: DependencyId,
        pr: PrStatus,
    },

    /// Dry run: the action that would have been taken.
    Planned {
        dependency: DependencyId,
        action: ChangeAction,
    },
}

impl ProcessingResult {
    #[must_use]
    pub fn dependency(&self) -> DependencyId {
        match self {
            Self::UpToDate { dependency, .. }
            | Self::AlreadyProposed { dependency, .. }
            | Self::Published { dependency, .. }
            | Self::Planned { dependency, .. } => *dependency,
        }
    }
}

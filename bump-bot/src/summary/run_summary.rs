//! Run summary types.

use super::result::ProcessingResult;
use crate::pull_requests::PrStatus;

/// Summary of a complete run.
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    /// Number of dependencies whose versions were compared.
    pub dependencies_checked: usize,

    /// Dependencies already at their latest version.
    pub up_to_date: usize,

    /// Dependencies whose open PR already proposes the latest version.
    pub already_proposed: usize,

    /// Number of PRs opened.
    pub prs_created: usize,

    /// Number of existing PRs moved to a newer version.
    pub prs_updated: usize,

    /// Whether the orphaned fork was deleted.
    pub fork_removed: bool,

    /// Whether this was a dry run.
    pub dry_run: bool,

    /// Per-dependency outcomes in processing order.
    pub results: Vec<ProcessingResult>,
}

impl RunSummary {
    /// Creates a new empty summary.
    #[must_use]
    pub fn new(dry_run: bool) -> Self {
        Self {
            dry_run,
            ..Default::default()
        }
    }

    /// Updates the summary with a processing result.
    pub fn record_result(&mut self, result: ProcessingResult) {
        match &result {
            ProcessingResult::UpToDate { .. } => self.up_to_date += 1,
            ProcessingResult::AlreadyProposed { .. } => self.already_proposed += 1,
            ProcessingResult::Published { pr, .. } => match pr {
                PrStatus::Created { .. } => self.prs_created += 1,
                PrStatus::Updated { .. } => self.prs_updated += 1,
            },
            ProcessingResult::Planned { .. } => {}
        }
        self.results.push(result);
    }

    /// Returns true if the run changed anything on the hosting platform.
    #[must_use]
    pub fn made_changes(&self) -> bool {
        self.fork_removed || self.prs_created > 0 || self.prs_updated > 0
    }
}

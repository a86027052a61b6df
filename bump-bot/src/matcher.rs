//! Matching drifting dependencies against already open bot pull requests.
//!
//! PR titles carry the proposed transition as `<id>: <from>...<to>`. Reading
//! the `<to>` part back on every run is what makes the bot re-runnable
//! without opening duplicates.

use crate::dependency::Dependency;
use crate::github::OpenPullRequest;
use serde::Serialize;

/// What to do about a drifting dependency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ChangeAction {
    /// An open PR already proposes the current latest version.
    Skip,

    /// No PR exists; open a fresh one.
    Create,

    /// An open PR proposes an older target; move it to the current latest.
    Amend {
        /// Number of the PR to update.
        number: u64,
        /// Version the PR currently pins, which is what the file now contains.
        previous_version: String,
    },
}

/// A bump to carry out for one dependency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PendingChange {
    pub dependency: Dependency,
    /// Version the pin should end up at.
    pub target_version: String,
    /// Version the open PR currently proposes, when amending.
    pub previous_version_in_pr: Option<String>,
    /// PR to update instead of opening a new one.
    pub amend_number: Option<u64>,
}

impl PendingChange {
    /// Builds the change for `action`, or `None` when it is [`ChangeAction::Skip`].
    #[must_use]
    pub fn from_action(dependency: &Dependency, action: ChangeAction) -> Option<Self> {
        let (previous_version_in_pr, amend_number) = match action {
            ChangeAction::Skip => return None,
            ChangeAction::Create => (None, None),
            ChangeAction::Amend {
                number,
                previous_version,
            } => (Some(previous_version), Some(number)),
        };

        Some(Self {
            dependency: dependency.clone(),
            target_version: dependency.latest.clone(),
            previous_version_in_pr,
            amend_number,
        })
    }

    /// Version currently in the working tree: the PR's proposal when
    /// amending, otherwise the live version.
    #[must_use]
    pub fn old_version(&self) -> &str {
        self.previous_version_in_pr
            .as_deref()
            .unwrap_or(&self.dependency.live)
    }

    #[must_use]
    pub fn is_amend(&self) -> bool {
        self.amend_number.is_some()
    }
}

/// Keeps only the PRs authored by the bot.
#[must_use]
pub fn automated_pull_requests(
    pull_requests: Vec<OpenPullRequest>,
    bot_login: &str,
) -> Vec<OpenPullRequest> {
    pull_requests
        .into_iter()
        .filter(|pr| pr.author == bot_login)
        .collect()
}

/// Decides how to handle `dependency` given the bot's open PRs.
///
/// The first PR whose title mentions the dependency id (case-insensitive)
/// is considered the dependency's PR.
#[must_use]
pub fn match_existing(automated: &[OpenPullRequest], dependency: &Dependency) -> ChangeAction {
    let id = dependency.id.as_str();

    let Some(pr) = automated
        .iter()
        .find(|pr| pr.title.to_lowercase().contains(id))
    else {
        return ChangeAction::Create;
    };

    let proposed = encoded_target(&pr.title);
    if proposed == dependency.latest {
        ChangeAction::Skip
    } else {
        ChangeAction::Amend {
            number: pr.number,
            previous_version: proposed.to_string(),
        }
    }
}

/// The `<to>` part of a `<from>...<to>` title.
fn encoded_target(title: &str) -> &str {
    title.rsplit("...").next().unwrap_or(title).trim()
}

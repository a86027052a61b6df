//! Branch preparation, commit and push in a clone of the bot's fork.
//!
//! Each dependency gets one branch. [`BranchPublisher`] walks it through
//! `NoBranch → BranchCreated → Committed → Pushed`, refusing steps out of
//! order. The [`Vcs`] trait is the seam to the version control tool.

mod cli;
mod error;

pub use cli::{CommitIdentity, GitCli};
pub use error::GitError;

use crate::fork::ForkState;
use crate::matcher::PendingChange;
use async_trait::async_trait;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Version control operations on a local working tree.
#[async_trait]
pub trait Vcs: Send + Sync {
    /// Clones `url` into the existing, empty directory `dest`.
    async fn clone_repo(&self, url: &str, dest: &Path) -> Result<(), GitError>;

    /// Creates and checks out `branch` from the current HEAD.
    async fn checkout_new(&self, workdir: &Path, branch: &str) -> Result<(), GitError>;

    /// Checks out `branch`, which exists on `origin`.
    async fn checkout_existing(&self, workdir: &Path, branch: &str) -> Result<(), GitError>;

    /// Deletes `branch` from `origin` and, if present, locally.
    async fn delete_branch(&self, workdir: &Path, branch: &str) -> Result<(), GitError>;

    /// Pulls `branch` of `url` into the current branch.
    async fn pull(&self, workdir: &Path, url: &str, branch: &str) -> Result<(), GitError>;

    /// Stages `files` and commits them with `message`.
    async fn commit(&self, workdir: &Path, files: &[PathBuf], message: &str)
        -> Result<(), GitError>;

    /// Pushes `branch` to `url`.
    async fn push(&self, workdir: &Path, url: &str, branch: &str) -> Result<(), GitError>;
}

/// Progress of a dependency's branch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BranchState {
    NoBranch,
    BranchCreated,
    Committed,
    Pushed,
}

/// How the branch for a change is obtained.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BranchPlan {
    /// Amending an open PR: its branch is already on the fork.
    Reuse,

    /// Fresh branch in a fork that predates this run.
    Recreate {
        /// The fork still has a same-named branch from an earlier PR.
        delete_stale: bool,
        /// Deployment repository to synchronize from.
        upstream_url: String,
        /// Its default branch.
        base_branch: String,
    },

    /// Fresh branch in a fork created this run.
    Create,
}

impl BranchPlan {
    /// Chooses the plan for `change`.
    ///
    /// `stale_on_fork` is only consulted for a new PR in a preexisting fork.
    #[must_use]
    pub fn decide(
        change: &PendingChange,
        fork: &ForkState,
        stale_on_fork: bool,
        upstream_url: &str,
        base_branch: &str,
    ) -> Self {
        if change.is_amend() {
            Self::Reuse
        } else if fork.preexisting() {
            Self::Recreate {
                delete_stale: stale_on_fork,
                upstream_url: upstream_url.to_string(),
                base_branch: base_branch.to_string(),
            }
        } else {
            Self::Create
        }
    }
}

/// Drives one branch through creation, commit and push.
pub struct BranchPublisher<'a, V: Vcs + ?Sized> {
    vcs: &'a V,
    workdir: &'a Path,
    branch: String,
    state: BranchState,
}

impl<'a, V: Vcs + ?Sized> BranchPublisher<'a, V> {
    pub fn new(vcs: &'a V, workdir: &'a Path, branch: impl Into<String>) -> Self {
        Self {
            vcs,
            workdir,
            branch: branch.into(),
            state: BranchState::NoBranch,
        }
    }

    #[must_use]
    pub fn state(&self) -> BranchState {
        self.state
    }

    fn advance(&mut self, from: BranchState, to: BranchState) -> Result<(), GitError> {
        if self.state != from {
            return Err(GitError::InvalidTransition {
                from: self.state,
                to,
            });
        }
        self.state = to;
        Ok(())
    }

    /// Checks out the branch according to `plan`.
    ///
    /// # Errors
    ///
    /// Returns [`GitError`] if a git command fails or the branch is not in
    /// [`BranchState::NoBranch`].
    pub async fn prepare(&mut self, plan: &BranchPlan) -> Result<(), GitError> {
        if self.state != BranchState::NoBranch {
            return Err(GitError::InvalidTransition {
                from: self.state,
                to: BranchState::BranchCreated,
            });
        }

        match plan {
            BranchPlan::Reuse => {
                debug!(branch = %self.branch, "Checking out existing branch");
                self.vcs.checkout_existing(self.workdir, &self.branch).await?;
            }
            BranchPlan::Recreate {
                delete_stale,
                upstream_url,
                base_branch,
            } => {
                if *delete_stale {
                    info!(branch = %self.branch, "Deleting stale branch");
                    self.vcs.delete_branch(self.workdir, &self.branch).await?;
                }
                debug!(upstream = %upstream_url, "Synchronizing with upstream");
                self.vcs
                    .pull(self.workdir, upstream_url, base_branch)
                    .await?;
                self.vcs.checkout_new(self.workdir, &self.branch).await?;
            }
            BranchPlan::Create => {
                self.vcs.checkout_new(self.workdir, &self.branch).await?;
            }
        }

        self.advance(BranchState::NoBranch, BranchState::BranchCreated)
    }

    /// Commits `files` with `message`.
    ///
    /// # Errors
    ///
    /// Returns [`GitError`] if the commit fails or no branch is prepared.
    pub async fn commit(&mut self, files: &[PathBuf], message: &str) -> Result<(), GitError> {
        if self.state != BranchState::BranchCreated {
            return Err(GitError::InvalidTransition {
                from: self.state,
                to: BranchState::Committed,
            });
        }
        self.vcs.commit(self.workdir, files, message).await?;
        self.advance(BranchState::BranchCreated, BranchState::Committed)
    }

    /// Pushes the committed branch to `url`.
    ///
    /// # Errors
    ///
    /// Returns [`GitError`] if the push fails or nothing is committed.
    pub async fn push(&mut self, url: &str) -> Result<(), GitError> {
        if self.state != BranchState::Committed {
            return Err(GitError::InvalidTransition {
                from: self.state,
                to: BranchState::Pushed,
            });
        }
        self.vcs.push(self.workdir, url, &self.branch).await?;
        info!(branch = %self.branch, "Pushed branch");
        self.advance(BranchState::Committed, BranchState::Pushed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dependency::{Dependency, DependencyId};
    use crate::matcher::ChangeAction;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingVcs {
        calls: Mutex<Vec<String>>,
    }

    impl RecordingVcs {
        fn record(&self, call: String) -> Result<(), GitError> {
            self.calls.lock().unwrap().push(call);
            Ok(())
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Vcs for RecordingVcs {
        async fn clone_repo(&self, url: &str, _dest: &Path) -> Result<(), GitError> {
            self.record(format!("clone {url}"))
        }
        async fn checkout_new(&self, _workdir: &Path, branch: &str) -> Result<(), GitError> {
            self.record(format!("checkout -b {branch}"))
        }
        async fn checkout_existing(&self, _workdir: &Path, branch: &str) -> Result<(), GitError> {
            self.record(format!("checkout {branch}"))
        }
        async fn delete_branch(&self, _workdir: &Path, branch: &str) -> Result<(), GitError> {
            self.record(format!("delete {branch}"))
        }
        async fn pull(&self, _workdir: &Path, url: &str, branch: &str) -> Result<(), GitError> {
            self.record(format!("pull {url} {branch}"))
        }
        async fn commit(
            &self,
            _workdir: &Path,
            files: &[PathBuf],
            message: &str,
        ) -> Result<(), GitError> {
            self.record(format!("commit {} {message}", files.len()))
        }
        async fn push(&self, _workdir: &Path, url: &str, branch: &str) -> Result<(), GitError> {
            self.record(format!("push {url} {branch}"))
        }
    }

    fn change(action: ChangeAction) -> PendingChange {
        let dependency = Dependency::new(DependencyId::Binderhub, "0.2.0", "0.3.0");
        PendingChange::from_action(&dependency, action).unwrap()
    }

    const OLD_FORK: ForkState = ForkState {
        exists: true,
        created_this_run: false,
    };
    const NEW_FORK: ForkState = ForkState {
        exists: true,
        created_this_run: true,
    };

    #[test]
    fn plan_reuses_branch_when_amending() {
        let amend = change(ChangeAction::Amend {
            number: 4,
            previous_version: "0.2.5".to_string(),
        });
        assert_eq!(
            BranchPlan::decide(&amend, &OLD_FORK, true, "up", "master"),
            BranchPlan::Reuse
        );
    }

    #[test]
    fn plan_recreates_in_old_fork_and_creates_in_new_one() {
        let create = change(ChangeAction::Create);
        assert_eq!(
            BranchPlan::decide(&create, &OLD_FORK, true, "up", "master"),
            BranchPlan::Recreate {
                delete_stale: true,
                upstream_url: "up".to_string(),
                base_branch: "master".to_string(),
            }
        );
        assert_eq!(
            BranchPlan::decide(&create, &NEW_FORK, true, "up", "master"),
            BranchPlan::Create
        );
    }

    #[tokio::test]
    async fn recreate_deletes_stale_then_syncs() {
        let vcs = RecordingVcs::default();
        let workdir = Path::new("/nonexistent");
        let mut publisher = BranchPublisher::new(&vcs, workdir, "binderhub_bump");

        let plan = BranchPlan::Recreate {
            delete_stale: true,
            upstream_url: "https://github.com/jupyterhub/mybinder.org-deploy.git".to_string(),
            base_branch: "master".to_string(),
        };
        publisher.prepare(&plan).await.unwrap();
        publisher
            .commit(&[PathBuf::from("mybinder/requirements.yaml")], "binderhub: bump")
            .await
            .unwrap();
        publisher.push("https://github.com/henchbot/mybinder.org-deploy").await.unwrap();

        assert_eq!(publisher.state(), BranchState::Pushed);
        assert_eq!(
            vcs.calls(),
            vec![
                "delete binderhub_bump",
                "pull https://github.com/jupyterhub/mybinder.org-deploy.git master",
                "checkout -b binderhub_bump",
                "commit 1 binderhub: bump",
                "push https://github.com/henchbot/mybinder.org-deploy binderhub_bump",
            ]
        );
    }

    #[tokio::test]
    async fn recreate_without_stale_branch_skips_delete() {
        let vcs = RecordingVcs::default();
        let mut publisher = BranchPublisher::new(&vcs, Path::new("."), "binderhub_bump");

        let plan = BranchPlan::Recreate {
            delete_stale: false,
            upstream_url: "up".to_string(),
            base_branch: "master".to_string(),
        };
        publisher.prepare(&plan).await.unwrap();

        assert_eq!(
            vcs.calls(),
            vec!["pull up master", "checkout -b binderhub_bump"]
        );
    }

    #[tokio::test]
    async fn steps_out_of_order_are_rejected() {
        let vcs = RecordingVcs::default();
        let mut publisher = BranchPublisher::new(&vcs, Path::new("."), "repo2docker_bump");

        let result = publisher.push("url").await;
        assert!(matches!(
            result,
            Err(GitError::InvalidTransition {
                from: BranchState::NoBranch,
                to: BranchState::Pushed
            })
        ));

        publisher.prepare(&BranchPlan::Reuse).await.unwrap();
        assert!(publisher.prepare(&BranchPlan::Reuse).await.is_err());
        assert_eq!(vcs.calls(), vec!["checkout repo2docker_bump"]);
    }
}

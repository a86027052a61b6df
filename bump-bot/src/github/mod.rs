//! Hosting platform access.
//!
//! [`GitHost`] is everything reconciliation needs from the platform hosting
//! the deployment repository. [`GitHubHost`] implements it with octocrab.

mod client;
mod error;
mod rate_limit;

pub use client::GitHubHost;
pub use error::GitHostError;
pub use rate_limit::{check_quota, ensure_quota, Quota, RateLimitInfo};

use async_trait::async_trait;
use serde::Serialize;
use std::fmt;

/// An open pull request against the deployment repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OpenPullRequest {
    pub number: u64,
    pub title: String,
    /// Login of the PR author.
    pub author: String,
}

/// A repository on the hosting platform.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct RepoRef {
    pub owner: String,
    pub name: String,
}

impl RepoRef {
    #[must_use]
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
        }
    }

    /// Parses `owner/name`.
    #[must_use]
    pub fn parse(full_name: &str) -> Option<Self> {
        let (owner, name) = full_name.split_once('/')?;
        if owner.is_empty() || name.is_empty() || name.contains('/') {
            return None;
        }
        Some(Self::new(owner, name))
    }

    /// Reads the repository from an API URL ending in `/repos/{owner}/{name}`.
    #[must_use]
    pub fn from_api_url(url: &url::Url) -> Option<Self> {
        let mut segments = url.path_segments()?.rev().filter(|s| !s.is_empty());
        let name = segments.next()?;
        let owner = segments.next()?;
        Some(Self::new(owner, name))
    }
}

impl fmt::Display for RepoRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// An issue or pull request returned by the global issue search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchHit {
    pub number: u64,
    pub title: String,
    pub html_url: String,
    /// Repository the hit belongs to.
    pub repository: RepoRef,
    /// False for plain issues.
    pub is_pull_request: bool,
}

/// Title, body and refs of a pull request to create or update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PullRequestDraft {
    pub title: String,
    pub body: String,
    /// Fork-qualified head, e.g. `henchbot:binderhub_bump`.
    pub head: String,
    /// Base branch of the deployment repository.
    pub base: String,
}

/// A pull request after creation or update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PublishedPullRequest {
    pub number: u64,
    pub url: String,
}

/// Operations on the hosting platform used by reconciliation.
///
/// The deployment repository and the bot's fork of it are fixed when the
/// implementation is built.
#[async_trait]
pub trait GitHost: Send + Sync {
    /// Lists every open pull request against the deployment repository.
    async fn open_pull_requests(&self) -> Result<Vec<OpenPullRequest>, GitHostError>;

    /// Returns whether the bot's fork of the deployment repository exists.
    async fn fork_exists(&self) -> Result<bool, GitHostError>;

    /// Forks the deployment repository into the bot account.
    async fn create_fork(&self) -> Result<(), GitHostError>;

    /// Deletes the bot's fork.
    async fn delete_fork(&self) -> Result<(), GitHostError>;

    /// Returns whether the bot's fork has a branch named `branch`.
    async fn fork_has_branch(&self, branch: &str) -> Result<bool, GitHostError>;

    /// SHAs of the commits between `base` and `head` in `repo`, oldest first.
    async fn compare_commits(
        &self,
        repo: &RepoRef,
        base: &str,
        head: &str,
    ) -> Result<Vec<String>, GitHostError>;

    /// Searches all issues and pull requests referencing commit `sha`.
    async fn search_commit(&self, sha: &str) -> Result<Vec<SearchHit>, GitHostError>;

    /// Returns whether pull request `number` of `repo` has been merged.
    async fn is_merged(&self, repo: &RepoRef, number: u64) -> Result<bool, GitHostError>;

    /// Opens a pull request against the deployment repository.
    async fn create_pull_request(
        &self,
        draft: &PullRequestDraft,
    ) -> Result<PublishedPullRequest, GitHostError>;

    /// Replaces title, body and base of an existing pull request.
    async fn update_pull_request(
        &self,
        number: u64,
        draft: &PullRequestDraft,
    ) -> Result<PublishedPullRequest, GitHostError>;
}

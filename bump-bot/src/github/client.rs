//! Octocrab implementation of [`GitHost`].

use super::rate_limit::{ensure_quota, Quota};
use super::{
    GitHost, GitHostError, OpenPullRequest, PublishedPullRequest, PullRequestDraft, RepoRef,
    SearchHit,
};
use async_trait::async_trait;
use octocrab::{params, Octocrab};
use serde::Deserialize;
use tracing::{debug, warn};

/// Results per page for list endpoints.
const RESULTS_PER_PAGE: u8 = 100;

/// Response of the commit comparison endpoint; only the commit list is needed.
#[derive(Deserialize)]
struct Comparison {
    commits: Vec<ComparedCommit>,
}

#[derive(Deserialize)]
struct ComparedCommit {
    sha: String,
}

/// GitHub access for one deployment repository and one bot account.
#[derive(Clone)]
pub struct GitHubHost {
    octocrab: Octocrab,
    deploy: RepoRef,
    bot_login: String,
    web_base: String,
}

impl GitHubHost {
    /// Builds an authenticated client.
    ///
    /// # Errors
    ///
    /// Returns [`GitHostError`] if the octocrab client cannot be built.
    pub fn new(
        token: String,
        deploy: RepoRef,
        bot_login: impl Into<String>,
        web_base: impl Into<String>,
    ) -> Result<Self, GitHostError> {
        let octocrab = Octocrab::builder().personal_token(token).build()?;
        Ok(Self::with_client(octocrab, deploy, bot_login, web_base))
    }

    /// Wraps an already configured client.
    #[must_use]
    pub fn with_client(
        octocrab: Octocrab,
        deploy: RepoRef,
        bot_login: impl Into<String>,
        web_base: impl Into<String>,
    ) -> Self {
        Self {
            octocrab,
            deploy,
            bot_login: bot_login.into(),
            web_base: web_base.into(),
        }
    }

    fn published(&self, number: u64, html_url: Option<&url::Url>) -> PublishedPullRequest {
        let url = html_url.map(ToString::to_string).unwrap_or_else(|| {
            format!(
                "{}/{}/pull/{}",
                self.web_base.trim_end_matches('/'),
                self.deploy,
                number
            )
        });
        PublishedPullRequest { number, url }
    }
}

/// True when the API answered 404.
fn is_not_found(error: &octocrab::Error) -> bool {
    matches!(error, octocrab::Error::GitHub { source, .. } if source.status_code.as_u16() == 404)
}

#[async_trait]
impl GitHost for GitHubHost {
    async fn open_pull_requests(&self) -> Result<Vec<OpenPullRequest>, GitHostError> {
        debug!(repo = %self.deploy, "Listing open pull requests");

        let page = self
            .octocrab
            .pulls(&self.deploy.owner, &self.deploy.name)
            .list()
            .state(params::State::Open)
            .per_page(RESULTS_PER_PAGE)
            .send()
            .await?;
        let pulls = self.octocrab.all_pages(page).await?;

        Ok(pulls
            .into_iter()
            .map(|pr| OpenPullRequest {
                number: pr.number,
                title: pr.title.unwrap_or_default(),
                author: pr.user.map(|user| user.login).unwrap_or_default(),
            })
            .collect())
    }

    async fn fork_exists(&self) -> Result<bool, GitHostError> {
        match self
            .octocrab
            .repos(&self.bot_login, &self.deploy.name)
            .get()
            .await
        {
            Ok(repo) => {
                if repo.fork != Some(true) {
                    warn!(
                        repo = %format!("{}/{}", self.bot_login, self.deploy.name),
                        "Repository exists but is not a fork"
                    );
                }
                Ok(true)
            }
            Err(e) if is_not_found(&e) => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    async fn create_fork(&self) -> Result<(), GitHostError> {
        self.octocrab
            .repos(&self.deploy.owner, &self.deploy.name)
            .create_fork()
            .send()
            .await?;
        Ok(())
    }

    async fn delete_fork(&self) -> Result<(), GitHostError> {
        self.octocrab
            .repos(&self.bot_login, &self.deploy.name)
            .delete()
            .await?;
        Ok(())
    }

    async fn fork_has_branch(&self, branch: &str) -> Result<bool, GitHostError> {
        let page = self
            .octocrab
            .repos(&self.bot_login, &self.deploy.name)
            .list_branches()
            .per_page(RESULTS_PER_PAGE)
            .send()
            .await?;
        let branches = self.octocrab.all_pages(page).await?;

        Ok(branches.iter().any(|b| b.name == branch))
    }

    async fn compare_commits(
        &self,
        repo: &RepoRef,
        base: &str,
        head: &str,
    ) -> Result<Vec<String>, GitHostError> {
        let route = format!("/repos/{}/{}/compare/{base}...{head}", repo.owner, repo.name);
        let comparison: Comparison = self.octocrab.get(route, None::<&()>).await?;

        Ok(comparison.commits.into_iter().map(|c| c.sha).collect())
    }

    async fn search_commit(&self, sha: &str) -> Result<Vec<SearchHit>, GitHostError> {
        ensure_quota(&self.octocrab, Quota::Search).await?;

        let results = self
            .octocrab
            .search()
            .issues_and_pull_requests(&format!("sha:{sha}"))
            .send()
            .await?;

        Ok(results
            .items
            .into_iter()
            .filter_map(|issue| {
                let repository = RepoRef::from_api_url(&issue.repository_url)?;
                Some(SearchHit {
                    number: issue.number,
                    title: issue.title,
                    html_url: issue.html_url.to_string(),
                    repository,
                    is_pull_request: issue.pull_request.is_some(),
                })
            })
            .collect())
    }

    async fn is_merged(&self, repo: &RepoRef, number: u64) -> Result<bool, GitHostError> {
        let pr = self.octocrab.pulls(&repo.owner, &repo.name).get(number).await?;
        Ok(pr.merged_at.is_some())
    }

    async fn create_pull_request(
        &self,
        draft: &PullRequestDraft,
    ) -> Result<PublishedPullRequest, GitHostError> {
        ensure_quota(&self.octocrab, Quota::Core).await?;

        let pr = self
            .octocrab
            .pulls(&self.deploy.owner, &self.deploy.name)
            .create(&draft.title, &draft.head, &draft.base)
            .body(&draft.body)
            .send()
            .await?;

        Ok(self.published(pr.number, pr.html_url.as_ref()))
    }

    async fn update_pull_request(
        &self,
        number: u64,
        draft: &PullRequestDraft,
    ) -> Result<PublishedPullRequest, GitHostError> {
        ensure_quota(&self.octocrab, Quota::Core).await?;

        let pr = self
            .octocrab
            .pulls(&self.deploy.owner, &self.deploy.name)
            .update(number)
            .title(&draft.title)
            .body(&draft.body)
            .base(&draft.base)
            .send()
            .await?;

        Ok(self.published(pr.number, pr.html_url.as_ref()))
    }
}

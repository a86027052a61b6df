//! Orchestrates a reconciliation cycle.
//!
//! One cycle fetches live and latest versions, reads the bot's open PRs,
//! garbage-collects the fork when nothing is open, then brings each drifting
//! dependency's PR up to date. Dependencies are processed one after the
//! other; the first failure aborts the run.

mod config;
mod error;

pub use config::RunnerConfig;
pub use error::RunnerError;

use crate::apply::apply_change;
use crate::drift::{drifting, needs_action};
use crate::fork::{ForkReconciler, ForkState};
use crate::git::{BranchPlan, BranchPublisher, CommitIdentity, GitCli, Vcs};
use crate::github::{GitHost, GitHubHost, RepoRef};
use crate::matcher::{automated_pull_requests, match_existing, PendingChange};
use crate::pull_requests::{publish_pull_request, ChangelogOptions, PrStatus, PublishOptions};
use crate::sources::{fetch_dependencies, HttpVersionSource, VersionSource};
use crate::summary::{ProcessingResult, RunSummary};
use crate::templates::{generate_branch_name, TemplateRenderer};
use tracing::{info, info_span, Instrument};

/// Runs reconciliation cycles against a hosting platform, version source and VCS.
pub struct Runner<H, S, V> {
    config: RunnerConfig,
    host: H,
    source: S,
    vcs: V,
    renderer: TemplateRenderer,
}

impl Runner<GitHubHost, HttpVersionSource, GitCli> {
    /// Builds a runner talking to GitHub, the published documents and the
    /// local `git` executable.
    ///
    /// # Errors
    ///
    /// Returns [`RunnerError`] if the token is missing or a client cannot be built.
    pub fn from_config(config: RunnerConfig) -> Result<Self, RunnerError> {
        let bot = config.bot();
        let token = bot.token()?;

        let host = GitHubHost::new(
            token.clone(),
            RepoRef::new(&bot.deploy_owner, &bot.deploy_repo),
            &bot.bot_login,
            bot.web_base(),
        )?;
        let source = HttpVersionSource::new(bot)?;
        let vcs = GitCli::new(CommitIdentity {
            name: bot.bot_login.clone(),
            email: bot.bot_email.clone(),
        })
        .with_token(token);

        Ok(Self::new(config, host, source, vcs))
    }
}

impl<H, S, V> Runner<H, S, V>
where
    H: GitHost,
    S: VersionSource,
    V: Vcs,
{
    pub fn new(config: RunnerConfig, host: H, source: S, vcs: V) -> Self {
        Self {
            config,
            host,
            source,
            vcs,
            renderer: TemplateRenderer::new(),
        }
    }

    /// Executes one reconciliation cycle.
    ///
    /// # Errors
    ///
    /// Returns the first [`RunnerError`] encountered; dependencies after the
    /// failing one are not attempted.
    pub async fn run(&self) -> Result<RunSummary, RunnerError> {
        let bot = self.config.bot();
        let mut summary = RunSummary::new(self.config.dry_run());

        info!("Fetching live and latest versions");
        let dependencies = fetch_dependencies(&self.source).await?;
        summary.dependencies_checked = dependencies.len();

        let open = self.host.open_pull_requests().await?;
        let automated = automated_pull_requests(open, &bot.bot_login);
        info!(count = automated.len(), "Found open automated pull requests");

        let drifted = drifting(&dependencies);
        for dependency in &dependencies {
            if !needs_action(dependency) {
                info!(dependency = %dependency.id, version = %dependency.live, "Up to date");
                summary.record_result(ProcessingResult::UpToDate {
                    dependency: dependency.id,
                    version: dependency.live.clone(),
                });
            }
        }

        if self.config.dry_run() {
            for dependency in drifted {
                let action = match_existing(&automated, dependency);
                info!(dependency = %dependency.id, ?action, "Dry run: would act");
                summary.record_result(ProcessingResult::Planned {
                    dependency: dependency.id,
                    action,
                });
            }
            return Ok(summary);
        }

        if drifted.is_empty() && !automated.is_empty() {
            return Ok(summary);
        }

        let forks = ForkReconciler::new(&self.host, bot.fork_deletion_delay());
        let mut fork = forks.observe().await?;
        summary.fork_removed = forks.remove_if_orphaned(&mut fork, automated.len()).await?;

        for dependency in drifted {
            let action = match_existing(&automated, dependency);
            let Some(change) = PendingChange::from_action(dependency, action) else {
                info!(
                    dependency = %dependency.id,
                    latest = %dependency.latest,
                    "Open pull request already proposes latest version"
                );
                summary.record_result(ProcessingResult::AlreadyProposed {
                    dependency: dependency.id,
                    latest: dependency.latest.clone(),
                });
                continue;
            };

            let pr = self.reconcile(&change, &forks, &mut fork).await?;
            summary.record_result(ProcessingResult::Published {
                dependency: dependency.id,
                pr,
            });
        }

        Ok(summary)
    }

    /// Pushes the bump for `change` to the fork and publishes its PR.
    async fn reconcile(
        &self,
        change: &PendingChange,
        forks: &ForkReconciler<'_, H>,
        fork: &mut ForkState,
    ) -> Result<PrStatus, RunnerError> {
        let bot = self.config.bot();
        let span = info_span!(
            "reconcile",
            dependency = %change.dependency.id,
            from = %change.old_version(),
            to = %change.target_version
        );

        async {
            forks.ensure_exists(fork).await?;

            let branch = generate_branch_name(change.dependency.id);
            let stale_on_fork = !change.is_amend()
                && fork.preexisting()
                && self.host.fork_has_branch(&branch).await?;
            let plan = BranchPlan::decide(
                change,
                fork,
                stale_on_fork,
                &bot.deploy_url(),
                &bot.deploy_default_branch,
            );

            let workdir = tempfile::tempdir().map_err(RunnerError::Workspace)?;
            let fork_url = bot.fork_url();
            self.vcs.clone_repo(&fork_url, workdir.path()).await?;

            let mut publisher = BranchPublisher::new(&self.vcs, workdir.path(), branch);
            publisher.prepare(&plan).await?;

            let files = apply_change(workdir.path(), change)?;
            let compare_url = change.dependency.compare_url(bot.web_base());
            let message = self
                .renderer
                .render_commit_message(&change.dependency, &compare_url)?;
            publisher.commit(&files, &message).await?;
            publisher.push(&fork_url).await?;
            drop(workdir);

            let options = self.publish_options();
            let status =
                publish_pull_request(&self.host, &self.renderer, change, &options).await?;
            Ok::<_, RunnerError>(status)
        }
        .instrument(span)
        .await
    }

    fn publish_options(&self) -> PublishOptions {
        let bot = self.config.bot();
        PublishOptions {
            bot_login: bot.bot_login.clone(),
            base_branch: bot.deploy_default_branch.clone(),
            web_base: bot.web_base().to_string(),
            changelog: ChangelogOptions {
                owner_prefix: bot.changelog_owner_prefix.clone(),
                search_delay: bot.search_delay(),
            },
        }
    }
}

#![doc = include_str!(concat!("../", env!("CARGO_PKG_README")))]

pub mod apply;
pub mod config;
pub mod dependency;
pub mod drift;
pub mod fork;
pub mod git;
pub mod github;
pub mod matcher;
pub mod pull_requests;
pub mod runner;
pub mod sources;
pub mod summary;
pub mod templates;

pub use apply::{apply_change, ApplyError};
pub use config::{BotConfig, ConfigError};
pub use dependency::{Dependency, DependencyId, VersionTokenExtractor};
pub use drift::{drifting, needs_action};
pub use fork::{ForkReconciler, ForkState};
pub use git::{BranchPlan, BranchPublisher, BranchState, CommitIdentity, GitCli, GitError, Vcs};
pub use github::{
    GitHost, GitHostError, GitHubHost, OpenPullRequest, PublishedPullRequest, PullRequestDraft,
    RepoRef, SearchHit,
};
pub use matcher::{automated_pull_requests, match_existing, ChangeAction, PendingChange};
pub use pull_requests::{
    build_changelog, publish_pull_request, ChangelogOptions, PrError, PrStatus, PublishOptions,
};
pub use runner::{Runner, RunnerConfig, RunnerError};
pub use sources::{fetch_dependencies, HttpVersionSource, SourceError, VersionSource};
pub use summary::{ProcessingResult, RunSummary};
pub use templates::{
    generate_branch_name, generate_pr_head, generate_pr_title, TemplateError, TemplateRenderer,
};

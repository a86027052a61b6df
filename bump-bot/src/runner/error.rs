//! Runner error types.

/// Errors that abort a run.
#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    /// Missing token or invalid configuration.
    #[error(transparent)]
    Config(#[from] crate::config::ConfigError),

    /// A version document could not be fetched or parsed.
    #[error(transparent)]
    Source(#[from] crate::sources::SourceError),

    /// Hosting platform request failed.
    #[error(transparent)]
    Host(#[from] crate::github::GitHostError),

    /// A git command failed.
    #[error(transparent)]
    Git(#[from] crate::git::GitError),

    /// The pinned version could not be rewritten.
    #[error(transparent)]
    Apply(#[from] crate::apply::ApplyError),

    /// Commit message rendering failed.
    #[error(transparent)]
    Template(#[from] crate::templates::TemplateError),

    /// Pull request could not be published.
    #[error(transparent)]
    PullRequest(#[from] crate::pull_requests::PrError),

    /// The temporary working tree could not be created.
    #[error("Failed to create working directory: {0}")]
    Workspace(#[source] std::io::Error),
}

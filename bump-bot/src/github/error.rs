//! Hosting platform error types.

use thiserror::Error;

/// Errors that can occur while talking to the hosting platform.
#[derive(Debug, Error)]
pub enum GitHostError {
    /// GitHub API error.
    #[error("GitHub API error: {0}")]
    GitHubError(#[from] octocrab::Error),

    /// The platform answered with something the bot cannot use.
    #[error("Request failed: {message}")]
    RequestFailed { message: String },
}

//! Commit message and pull request text.
//!
//! Titles and branch names are plain formats because they are parsed back on
//! later runs. Commit messages and PR bodies are rendered with Handlebars.

mod error;
mod renderer;

pub use error::TemplateError;
pub use renderer::{
    create_handlebars_registry, TemplateRenderer, COMMIT_MESSAGE_TEMPLATE, PR_BODY_TEMPLATE,
};

use crate::dependency::{Dependency, DependencyId};

/// Generates the PR title for a bump.
///
/// Format: "{id}: {live}...{latest}"
#[must_use]
pub fn generate_pr_title(dependency: &Dependency) -> String {
    format!(
        "{}: {}...{}",
        dependency.id, dependency.live, dependency.latest
    )
}

/// Generates the branch name used for a dependency's bumps.
///
/// Format: "{id}_bump"
#[must_use]
pub fn generate_branch_name(id: DependencyId) -> String {
    format!("{id}_bump")
}

/// Generates the fork-qualified PR head.
///
/// Format: "{bot_login}:{id}_bump"
#[must_use]
pub fn generate_pr_head(bot_login: &str, id: DependencyId) -> String {
    format!("{bot_login}:{}", generate_branch_name(id))
}

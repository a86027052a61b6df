//! Publishing bump pull requests.
//!
//! This module renders the PR body, including a changelog of upstream pull
//! requests, and opens a new PR or updates the one being amended.

mod changelog;
mod error;
mod status;

pub use changelog::{build_changelog, format_entry, ChangelogOptions};
pub use error::PrError;
pub use status::PrStatus;

use crate::github::{GitHost, PullRequestDraft};
use crate::matcher::PendingChange;
use crate::templates::{generate_pr_head, generate_pr_title, TemplateRenderer};
use tracing::{info, info_span, Instrument};

/// Where bump PRs point and how their changelog is built.
#[derive(Debug, Clone)]
pub struct PublishOptions {
    /// Login owning the fork the head branch lives in.
    pub bot_login: String,
    /// Base branch of the deployment repository.
    pub base_branch: String,
    /// Web base used for compare links.
    pub web_base: String,
    pub changelog: ChangelogOptions,
}

/// Builds the PR title, body and refs for `change`.
///
/// # Errors
///
/// Returns [`PrError`] if the body cannot be rendered.
pub async fn build_draft<H>(
    host: &H,
    renderer: &TemplateRenderer,
    change: &PendingChange,
    options: &PublishOptions,
) -> Result<PullRequestDraft, PrError>
where
    H: GitHost + ?Sized,
{
    let dependency = &change.dependency;
    let compare_url = dependency.compare_url(&options.web_base);
    let changelog = build_changelog(host, dependency, &options.changelog).await?;
    let body = renderer.render_pr_body(dependency, &compare_url, &changelog)?;

    Ok(PullRequestDraft {
        title: generate_pr_title(dependency),
        body,
        head: generate_pr_head(&options.bot_login, dependency.id),
        base: options.base_branch.clone(),
    })
}

/// Opens or updates the bump PR for `change`.
///
/// Amending changes update the PR they were matched to; all others create a
/// new one.
///
/// # Errors
///
/// Returns [`PrError`] if rendering or the platform call fails.
pub async fn publish_pull_request<H>(
    host: &H,
    renderer: &TemplateRenderer,
    change: &PendingChange,
    options: &PublishOptions,
) -> Result<PrStatus, PrError>
where
    H: GitHost + ?Sized,
{
    let span = info_span!(
        "publish_pr",
        dependency = %change.dependency.id,
        amend = ?change.amend_number
    );

    async {
        let draft = build_draft(host, renderer, change, options).await?;

        let status = match change.amend_number {
            Some(number) => {
                let pr = host.update_pull_request(number, &draft).await?;
                PrStatus::Updated {
                    number: pr.number,
                    url: pr.url,
                }
            }
            None => {
                let pr = host.create_pull_request(&draft).await?;
                PrStatus::Created {
                    number: pr.number,
                    url: pr.url,
                }
            }
        };

        info!(
            pr_number = status.number(),
            url = %status.url(),
            status = status.as_str(),
            "Pull request published"
        );
        Ok::<_, PrError>(status)
    }
    .instrument(span)
    .await
}

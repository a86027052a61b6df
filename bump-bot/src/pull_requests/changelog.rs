//! Changelog of upstream pull requests included in a bump.

use crate::dependency::Dependency;
use crate::github::{GitHost, GitHostError, RepoRef, SearchHit};
use std::time::Duration;
use tracing::{debug, warn};

/// Filters and pacing for changelog construction.
#[derive(Debug, Clone)]
pub struct ChangelogOptions {
    /// Only PRs in repositories whose owner starts with this are listed.
    pub owner_prefix: String,
    /// Pause after each commit search, for the search API's rate limit.
    pub search_delay: Duration,
}

/// Formats a changelog line for a search hit.
///
/// Format: "- {title} [#{number}]({url})"
#[must_use]
pub fn format_entry(hit: &SearchHit) -> String {
    format!("- {} [#{}]({})", hit.title, hit.number, hit.html_url)
}

/// Lists the merged pull requests behind the commits of a bump.
///
/// Commits of the upstream compare range are visited oldest first. Each one
/// is searched for associated pull requests; a hit is kept when it is a pull
/// request from an allowed owner, not yet listed, and confirmed merged.
/// Searches or merge lookups that fail only drop the affected entries.
///
/// # Errors
///
/// Returns [`GitHostError`] only when the dependency's upstream repository
/// name is malformed.
pub async fn build_changelog<H>(
    host: &H,
    dependency: &Dependency,
    options: &ChangelogOptions,
) -> Result<Vec<String>, GitHostError>
where
    H: GitHost + ?Sized,
{
    let upstream =
        RepoRef::parse(dependency.id.upstream_repo()).ok_or_else(|| GitHostError::RequestFailed {
            message: format!("invalid upstream repository '{}'", dependency.id.upstream_repo()),
        })?;

    let extractor = dependency.id.token_extractor();
    let base = extractor.extract(&dependency.live);
    let head = extractor.extract(&dependency.latest);

    let shas = match host.compare_commits(&upstream, base, head).await {
        Ok(shas) => shas,
        Err(e) => {
            warn!(
                repo = %upstream,
                range = %format!("{base}...{head}"),
                error = %e,
                "Failed to list commits, omitting changelog"
            );
            return Ok(Vec::new());
        }
    };
    debug!(commits = shas.len(), "Collecting associated pull requests");

    let mut entries: Vec<String> = Vec::new();
    for sha in &shas {
        match host.search_commit(sha).await {
            Ok(hits) => {
                for hit in hits {
                    if let Some(entry) = accept_hit(host, &hit, &entries, options).await {
                        entries.push(entry);
                    }
                }
            }
            Err(e) => warn!(sha = %sha, error = %e, "Commit search failed, skipping"),
        }
        tokio::time::sleep(options.search_delay).await;
    }

    Ok(entries)
}

async fn accept_hit<H>(
    host: &H,
    hit: &SearchHit,
    collected: &[String],
    options: &ChangelogOptions,
) -> Option<String>
where
    H: GitHost + ?Sized,
{
    if !hit.is_pull_request || !hit.repository.owner.starts_with(&options.owner_prefix) {
        return None;
    }

    let entry = format_entry(hit);
    if collected.contains(&entry) {
        return None;
    }

    match host.is_merged(&hit.repository, hit.number).await {
        Ok(true) => Some(entry),
        Ok(false) => None,
        Err(e) => {
            debug!(
                repo = %hit.repository,
                number = hit.number,
                error = %e,
                "Merge lookup failed, dropping entry"
            );
            None
        }
    }
}

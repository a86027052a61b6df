//! GitHub API quota checks.
//!
//! Before a call against a scarce quota the remaining budget is read; when it
//! runs low the caller sleeps until the window resets. Nothing is retried.

use octocrab::Octocrab;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tracing::{info, warn};

/// Longest sleep before giving the call a chance anyway.
const MAX_WAIT: Duration = Duration::from_secs(3600);

/// Budget left at which waiting starts.
const LOW_WATERMARK: usize = 5;

/// Which API quota a call draws from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quota {
    /// Repositories, pull requests, branches.
    Core,
    /// Issue and commit search, with a much smaller budget.
    Search,
}

/// Snapshot of one quota.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitInfo {
    pub remaining: usize,
    pub limit: usize,
    /// Unix timestamp of the window reset.
    pub reset: u64,
}

impl RateLimitInfo {
    /// How long to sleep at `now` (Unix seconds), if at all.
    #[must_use]
    pub fn wait_at(&self, now: u64) -> Option<Duration> {
        if self.remaining >= LOW_WATERMARK || self.reset <= now {
            return None;
        }

        let wait = Duration::from_secs(self.reset - now);
        if wait > MAX_WAIT {
            warn!(
                wait_secs = wait.as_secs(),
                "Quota reset too far in the future, capping wait"
            );
        }
        Some(wait.min(MAX_WAIT))
    }
}

/// Reads the current state of `quota`.
///
/// # Errors
///
/// Returns an error if the rate limit endpoint fails.
pub async fn check_quota(octocrab: &Octocrab, quota: Quota) -> Result<RateLimitInfo, octocrab::Error> {
    let limits = octocrab.ratelimit().get().await?;
    let rate = match quota {
        Quota::Core => &limits.resources.core,
        Quota::Search => &limits.resources.search,
    };

    Ok(RateLimitInfo {
        remaining: rate.remaining,
        limit: rate.limit,
        reset: rate.reset,
    })
}

/// Sleeps until `quota` resets if it is nearly exhausted.
///
/// # Errors
///
/// Returns an error if the rate limit endpoint fails.
pub async fn ensure_quota(octocrab: &Octocrab, quota: Quota) -> Result<(), octocrab::Error> {
    let info = check_quota(octocrab, quota).await?;
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs();

    if let Some(wait) = info.wait_at(now) {
        info!(
            ?quota,
            remaining = info.remaining,
            limit = info.limit,
            wait_secs = wait.as_secs(),
            "Quota low, waiting for reset"
        );
        tokio::time::sleep(wait).await;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn info(remaining: usize, reset: u64) -> RateLimitInfo {
        RateLimitInfo {
            remaining,
            limit: 30,
            reset,
        }
    }

    #[test]
    fn enough_budget_never_waits() {
        assert_eq!(info(LOW_WATERMARK, 2_000).wait_at(1_000), None);
    }

    #[test]
    fn elapsed_reset_never_waits() {
        assert_eq!(info(0, 1_000).wait_at(1_000), None);
    }

    #[test]
    fn low_budget_waits_until_reset() {
        assert_eq!(
            info(1, 1_030).wait_at(1_000),
            Some(Duration::from_secs(30))
        );
    }

    #[test]
    fn wait_is_capped() {
        assert_eq!(info(0, u64::MAX).wait_at(0), Some(MAX_WAIT));
    }
}

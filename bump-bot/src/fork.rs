//! Lifecycle of the bot's personal fork of the deployment repository.
//!
//! The fork is a staging area: it must exist before branches are pushed and
//! is reclaimed once no bot PR is open. Its state is observed from the host at
//! the start of every cycle and carried in a [`ForkState`] value; it is never
//! remembered between runs.

use crate::github::{GitHost, GitHostError};
use std::time::Duration;
use tracing::info;

/// Fork existence as observed during the current cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ForkState {
    /// Whether the fork exists.
    pub exists: bool,
    /// Whether this cycle created it; such a fork cannot hold stale branches.
    pub created_this_run: bool,
}

impl ForkState {
    /// True when the fork existed before this cycle and may hold old branches.
    #[must_use]
    pub fn preexisting(&self) -> bool {
        self.exists && !self.created_this_run
    }
}

/// Creates and garbage-collects the fork.
pub struct ForkReconciler<'a, H: GitHost + ?Sized> {
    host: &'a H,
    deletion_delay: Duration,
}

impl<'a, H: GitHost + ?Sized> ForkReconciler<'a, H> {
    /// `deletion_delay` is how long the platform needs before a deleted fork
    /// can safely be recreated or cloned.
    pub fn new(host: &'a H, deletion_delay: Duration) -> Self {
        Self {
            host,
            deletion_delay,
        }
    }

    /// Queries the host for the current fork state.
    ///
    /// # Errors
    ///
    /// Returns [`GitHostError`] if the lookup fails.
    pub async fn observe(&self) -> Result<ForkState, GitHostError> {
        let exists = self.host.fork_exists().await?;
        info!(exists, "Observed fork state");
        Ok(ForkState {
            exists,
            created_this_run: false,
        })
    }

    /// Creates the fork unless it already exists.
    ///
    /// # Errors
    ///
    /// Returns [`GitHostError`] if the fork cannot be created.
    pub async fn ensure_exists(&self, state: &mut ForkState) -> Result<(), GitHostError> {
        if state.exists {
            return Ok(());
        }

        info!("Creating fork");
        self.host.create_fork().await?;
        state.exists = true;
        state.created_this_run = true;
        Ok(())
    }

    /// Deletes the fork when no automated PR is open, then waits out the
    /// platform's propagation delay.
    ///
    /// Returns whether the fork was deleted.
    ///
    /// # Errors
    ///
    /// Returns [`GitHostError`] if the deletion fails.
    pub async fn remove_if_orphaned(
        &self,
        state: &mut ForkState,
        open_automated: usize,
    ) -> Result<bool, GitHostError> {
        if open_automated != 0 || !state.exists {
            return Ok(false);
        }

        info!("No automated pull requests open, deleting fork");
        self.host.delete_fork().await?;
        *state = ForkState::default();

        info!(
            delay_secs = self.deletion_delay.as_secs(),
            "Waiting for fork deletion to propagate"
        );
        tokio::time::sleep(self.deletion_delay).await;
        Ok(true)
    }
}

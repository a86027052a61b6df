//! Runner configuration.

use crate::config::BotConfig;

/// Configuration for one reconciliation run.
#[derive(Debug, Clone)]
pub struct RunnerConfig {
    /// Deployment, bot and source settings.
    bot: BotConfig,
    /// Whether to report decisions without touching the fork, git or PRs.
    dry_run: bool,
}

impl RunnerConfig {
    /// Creates a new configuration for a run.
    pub fn new(bot: BotConfig, dry_run: bool) -> Self {
        Self { bot, dry_run }
    }

    /// Returns the bot settings.
    pub fn bot(&self) -> &BotConfig {
        &self.bot
    }

    /// Returns whether dry-run mode is enabled.
    pub fn dry_run(&self) -> bool {
        self.dry_run
    }
}

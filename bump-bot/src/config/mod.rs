//! Bot configuration.
//!
//! Every setting has a default matching the mybinder.org deployment, so a
//! configuration file is only needed to point the bot somewhere else. Keys in
//! the TOML file are kebab-case and any subset may be given.

mod error;

pub use error::ConfigError;

use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info};
use url::Url;

/// Settings for a reconciliation run.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct BotConfig {
    /// Owner of the deployment repository.
    pub deploy_owner: String,

    /// Name of the deployment repository (and of the bot's fork).
    pub deploy_repo: String,

    /// Default branch of the deployment repository.
    pub deploy_default_branch: String,

    /// Login of the bot account; PRs authored by it are "ours".
    pub bot_login: String,

    /// Email used for commit authorship.
    pub bot_email: String,

    /// Environment variable holding the access token.
    pub token_env: String,

    /// Base web URL of the hosting platform.
    pub web_base_url: String,

    /// Raw URL of the deployment's `values.yaml`.
    pub values_url: String,

    /// Raw URL of the deployment's `requirements.yaml`.
    pub requirements_url: String,

    /// Registry tag listing for the repo2docker image.
    pub registry_tags_url: String,

    /// Helm chart index publishing BinderHub.
    pub chart_index_url: String,

    /// Changelog entries must come from repositories whose owner starts with this.
    pub changelog_owner_prefix: String,

    /// Pause after deleting the fork before anything may clone it.
    pub fork_deletion_delay_secs: u64,

    /// Pause after each changelog commit search.
    pub search_delay_secs: u64,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            deploy_owner: "jupyterhub".to_string(),
            deploy_repo: "mybinder.org-deploy".to_string(),
            deploy_default_branch: "master".to_string(),
            bot_login: "henchbot".to_string(),
            bot_email: "henchbot.github@gmail.com".to_string(),
            token_env: "HENCHBOT_TOKEN".to_string(),
            web_base_url: "https://github.com".to_string(),
            values_url: "https://raw.githubusercontent.com/jupyterhub/mybinder.org-deploy/master/mybinder/values.yaml".to_string(),
            requirements_url: "https://raw.githubusercontent.com/jupyterhub/mybinder.org-deploy/master/mybinder/requirements.yaml".to_string(),
            registry_tags_url: "https://hub.docker.com/v2/repositories/jupyter/repo2docker/tags/".to_string(),
            chart_index_url: "https://jupyterhub.github.io/helm-chart/index.yaml".to_string(),
            changelog_owner_prefix: "jupyter".to_string(),
            fork_deletion_delay_secs: 5,
            search_delay_secs: 3,
        }
    }
}

impl BotConfig {
    /// Loads a configuration file, filling unspecified keys with defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file cannot be read, is not valid TOML,
    /// or fails validation.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        info!(path = %path.display(), "Loading configuration");

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::IoError {
            path: path.display().to_string(),
            source: e,
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::TomlError {
            path: path.display().to_string(),
            source: e,
        })?;

        config.validate(path)?;
        debug!(?config, "Configuration loaded");
        Ok(config)
    }

    /// Checks that required values are present and URLs parse.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ValidationError`] naming the first bad key.
    pub fn validate(&self, path: &Path) -> Result<(), ConfigError> {
        let invalid = |message: String| ConfigError::ValidationError {
            path: path.display().to_string(),
            message,
        };

        let required = [
            ("deploy-owner", &self.deploy_owner),
            ("deploy-repo", &self.deploy_repo),
            ("deploy-default-branch", &self.deploy_default_branch),
            ("bot-login", &self.bot_login),
            ("bot-email", &self.bot_email),
            ("token-env", &self.token_env),
            ("changelog-owner-prefix", &self.changelog_owner_prefix),
        ];
        for (key, value) in required {
            if value.trim().is_empty() {
                return Err(invalid(format!("{key} must not be empty")));
            }
        }

        let urls = [
            ("web-base-url", &self.web_base_url),
            ("values-url", &self.values_url),
            ("requirements-url", &self.requirements_url),
            ("registry-tags-url", &self.registry_tags_url),
            ("chart-index-url", &self.chart_index_url),
        ];
        for (key, value) in urls {
            if Url::parse(value).is_err() {
                return Err(invalid(format!("{key} is not a valid URL: {value}")));
            }
        }

        Ok(())
    }

    /// Reads the access token from the configured environment variable.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingToken`] if the variable is unset or blank.
    pub fn token(&self) -> Result<String, ConfigError> {
        match std::env::var(&self.token_env) {
            Ok(token) if !token.trim().is_empty() => Ok(token),
            _ => Err(ConfigError::MissingToken {
                var: self.token_env.clone(),
            }),
        }
    }

    /// Full name of the deployment repository, e.g. `jupyterhub/mybinder.org-deploy`.
    #[must_use]
    pub fn deploy_full_name(&self) -> String {
        format!("{}/{}", self.deploy_owner, self.deploy_repo)
    }

    /// Clone URL of the deployment repository.
    #[must_use]
    pub fn deploy_url(&self) -> String {
        format!("{}/{}.git", self.web_base(), self.deploy_full_name())
    }

    /// Clone and push URL of the bot's fork.
    #[must_use]
    pub fn fork_url(&self) -> String {
        format!("{}/{}/{}", self.web_base(), self.bot_login, self.deploy_repo)
    }

    /// Web base URL without a trailing slash.
    #[must_use]
    pub fn web_base(&self) -> &str {
        self.web_base_url.trim_end_matches('/')
    }

    #[must_use]
    pub fn fork_deletion_delay(&self) -> Duration {
        Duration::from_secs(self.fork_deletion_delay_secs)
    }

    #[must_use]
    pub fn search_delay(&self) -> Duration {
        Duration::from_secs(self.search_delay_secs)
    }
}

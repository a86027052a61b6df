//! The fixed set of dependencies pinned by the deployment repository.

mod version_token;

pub use version_token::VersionTokenExtractor;

use serde::Serialize;
use std::fmt;

/// One of the upstream dependencies the bot keeps current.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DependencyId {
    /// The repo2docker container build image.
    Repo2docker,
    /// The BinderHub helm chart.
    Binderhub,
}

impl DependencyId {
    /// Every dependency, in processing order.
    pub const ALL: [DependencyId; 2] = [DependencyId::Repo2docker, DependencyId::Binderhub];

    /// Identifier used in PR titles, branch names and commit messages.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Repo2docker => "repo2docker",
            Self::Binderhub => "binderhub",
        }
    }

    /// Path of the file pinning this dependency, relative to the repository root.
    #[must_use]
    pub fn pinned_file(self) -> &'static str {
        match self {
            Self::Repo2docker => "mybinder/values.yaml",
            Self::Binderhub => "mybinder/requirements.yaml",
        }
    }

    /// Text immediately preceding the version in the pinned file.
    #[must_use]
    pub fn pin_prefix(self) -> &'static str {
        match self {
            Self::Repo2docker => "jupyter/repo2docker:",
            Self::Binderhub => "version: ",
        }
    }

    /// The pin as it appears in the pinned file for `version`.
    #[must_use]
    pub fn pin(self, version: &str) -> String {
        format!("{}{version}", self.pin_prefix())
    }

    /// Upstream repository publishing this dependency, as `owner/name`.
    #[must_use]
    pub fn upstream_repo(self) -> &'static str {
        match self {
            Self::Repo2docker => "jupyterhub/repo2docker",
            Self::Binderhub => "jupyterhub/binderhub",
        }
    }

    /// How comparable commit tokens are read out of this dependency's versions.
    #[must_use]
    pub fn token_extractor(self) -> VersionTokenExtractor {
        match self {
            Self::Repo2docker => VersionTokenExtractor::GitDescribe,
            Self::Binderhub => VersionTokenExtractor::ChartBuildHash,
        }
    }
}

impl fmt::Display for DependencyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Live and latest versions of a dependency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Dependency {
    pub id: DependencyId,

    /// Version currently pinned in the deployment repository.
    pub live: String,

    /// Newest version published upstream.
    pub latest: String,
}

impl Dependency {
    #[must_use]
    pub fn new(id: DependencyId, live: impl Into<String>, latest: impl Into<String>) -> Self {
        Self {
            id,
            live: live.into(),
            latest: latest.into(),
        }
    }

    /// Link to the upstream diff between two versions of this dependency.
    ///
    /// Format: "{web_base}/{upstream}/compare/{token(from)}...{token(to)}"
    #[must_use]
    pub fn compare_url(&self, web_base: &str) -> String {
        let extractor = self.id.token_extractor();
        format!(
            "{}/{}/compare/{}...{}",
            web_base.trim_end_matches('/'),
            self.id.upstream_repo(),
            extractor.extract(&self.live),
            extractor.extract(&self.latest)
        )
    }
}

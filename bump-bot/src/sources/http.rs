//! HTTP-backed version source.

use super::{documents, SourceError, VersionSource};
use crate::config::BotConfig;
use crate::dependency::DependencyId;
use async_trait::async_trait;
use tracing::debug;

/// Chart name of BinderHub in both the requirements file and the chart index.
const BINDERHUB_CHART: &str = "binderhub";

/// Reads versions from the documents configured in [`BotConfig`].
#[derive(Debug, Clone)]
pub struct HttpVersionSource {
    client: reqwest::Client,
    values_url: String,
    requirements_url: String,
    registry_tags_url: String,
    chart_index_url: String,
}

impl HttpVersionSource {
    /// Creates a source reading from the URLs in `config`.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] if the HTTP client cannot be built.
    pub fn new(config: &BotConfig) -> Result<Self, SourceError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("bump-bot/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| SourceError::unavailable("HTTP client", e))?;

        Ok(Self {
            client,
            values_url: config.values_url.clone(),
            requirements_url: config.requirements_url.clone(),
            registry_tags_url: config.registry_tags_url.clone(),
            chart_index_url: config.chart_index_url.clone(),
        })
    }

    async fn fetch_text(&self, url: &str) -> Result<String, SourceError> {
        debug!(url, "Fetching version document");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|e| SourceError::unavailable(url, e))?;

        response
            .text()
            .await
            .map_err(|e| SourceError::unavailable(url, e))
    }
}

#[async_trait]
impl VersionSource for HttpVersionSource {
    async fn fetch_live(&self, id: DependencyId) -> Result<String, SourceError> {
        match id {
            DependencyId::Repo2docker => {
                let values = self.fetch_text(&self.values_url).await?;
                documents::build_image_tag(&values)
            }
            DependencyId::Binderhub => {
                let requirements = self.fetch_text(&self.requirements_url).await?;
                documents::chart_dependency_version(&requirements, BINDERHUB_CHART)
            }
        }
    }

    async fn fetch_latest(&self, id: DependencyId) -> Result<String, SourceError> {
        match id {
            DependencyId::Repo2docker => {
                let tags = self.fetch_text(&self.registry_tags_url).await?;
                documents::latest_registry_tag(&tags)
            }
            DependencyId::Binderhub => {
                let index = self.fetch_text(&self.chart_index_url).await?;
                documents::latest_chart_version(&index, BINDERHUB_CHART)
            }
        }
    }
}

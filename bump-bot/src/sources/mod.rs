//! Live and latest version lookup.
//!
//! Live versions are read from the deployment repository's configuration
//! files; latest versions from each dependency's release channel. All lookups
//! finish before anything is mutated, so a missing document aborts the run
//! with nothing changed.

mod documents;
mod error;
mod http;

pub use documents::{
    build_image_tag, chart_dependency_version, latest_chart_version, latest_registry_tag,
};
pub use error::SourceError;
pub use http::HttpVersionSource;

use crate::dependency::{Dependency, DependencyId};
use async_trait::async_trait;
use tracing::{info, info_span, Instrument};

/// Where live and latest versions of a dependency come from.
#[async_trait]
pub trait VersionSource: Send + Sync {
    /// Version currently pinned in the deployment repository.
    async fn fetch_live(&self, id: DependencyId) -> Result<String, SourceError>;

    /// Newest version published upstream.
    async fn fetch_latest(&self, id: DependencyId) -> Result<String, SourceError>;
}

/// Fetches live and latest versions for every dependency.
///
/// # Errors
///
/// Returns the first [`SourceError`] encountered; no partial result is kept.
pub async fn fetch_dependencies<S>(source: &S) -> Result<Vec<Dependency>, SourceError>
where
    S: VersionSource + ?Sized,
{
    let mut dependencies = Vec::with_capacity(DependencyId::ALL.len());

    for id in DependencyId::ALL {
        let span = info_span!("fetch_versions", dependency = %id);
        let dependency = async {
            let live = source.fetch_live(id).await?;
            let latest = source.fetch_latest(id).await?;
            info!(live = %live, latest = %latest, "Fetched versions");
            Ok::<_, SourceError>(Dependency::new(id, live, latest))
        }
        .instrument(span)
        .await?;
        dependencies.push(dependency);
    }

    Ok(dependencies)
}

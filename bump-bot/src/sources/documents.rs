//! Parsers for the documents versions are read from.

use super::SourceError;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::collections::HashMap;

#[derive(Deserialize)]
struct Values {
    binderhub: BinderhubValues,
}

#[derive(Deserialize)]
struct BinderhubValues {
    config: BinderhubConfig,
}

#[derive(Deserialize)]
struct BinderhubConfig {
    #[serde(rename = "BinderHub")]
    binder_hub: BinderHubSettings,
}

#[derive(Deserialize)]
struct BinderHubSettings {
    build_image: String,
}

#[derive(Deserialize)]
struct Requirements {
    dependencies: Vec<ChartDependency>,
}

#[derive(Deserialize)]
struct ChartDependency {
    name: String,
    version: serde_yaml::Value,
}

#[derive(Deserialize)]
struct TagList {
    results: Vec<Tag>,
}

#[derive(Deserialize)]
struct Tag {
    name: String,
}

/// Only the requested chart's entries are decoded; other charts may use
/// fields or formats this parser does not know.
#[derive(Deserialize)]
struct ChartIndex {
    entries: HashMap<String, serde_yaml::Value>,
}

#[derive(Deserialize)]
struct ChartEntry {
    version: serde_yaml::Value,
    created: DateTime<Utc>,
}

/// Reads the repo2docker image tag from the deployment's `values.yaml`.
///
/// The tag is whatever follows the last `:` of `binderhub.config.BinderHub.build_image`.
pub fn build_image_tag(values_yaml: &str) -> Result<String, SourceError> {
    const WHAT: &str = "values.yaml build_image";

    let values: Values =
        serde_yaml::from_str(values_yaml).map_err(|e| SourceError::unavailable(WHAT, e))?;
    let image = values.binderhub.config.binder_hub.build_image;
    let tag = image.rsplit(':').next().unwrap_or_default().trim();

    if tag.is_empty() {
        return Err(SourceError::unavailable(WHAT, format!("no tag in '{image}'")));
    }
    Ok(tag.to_string())
}

/// Reads the pinned version of chart dependency `name` from `requirements.yaml`.
pub fn chart_dependency_version(requirements_yaml: &str, name: &str) -> Result<String, SourceError> {
    let what = format!("requirements.yaml {name} version");

    let requirements: Requirements = serde_yaml::from_str(requirements_yaml)
        .map_err(|e| SourceError::unavailable(what.as_str(), e))?;

    let dependency = requirements
        .dependencies
        .into_iter()
        .find(|dependency| dependency.name == name)
        .ok_or_else(|| SourceError::unavailable(what.as_str(), "dependency not listed"))?;

    let version = match &dependency.version {
        serde_yaml::Value::Number(_) => written_version(requirements_yaml, name)
            .or_else(|| scalar_to_string(&dependency.version)),
        version => scalar_to_string(version),
    };
    version.ok_or_else(|| SourceError::unavailable(what.as_str(), "version is not a scalar"))
}

/// Returns the first, most recently pushed, tag of a registry tag listing.
pub fn latest_registry_tag(tags_json: &str) -> Result<String, SourceError> {
    const WHAT: &str = "registry tag listing";

    let tags: TagList =
        serde_json::from_str(tags_json).map_err(|e| SourceError::unavailable(WHAT, e))?;
    tags.results
        .into_iter()
        .next()
        .map(|tag| tag.name)
        .ok_or_else(|| SourceError::unavailable(WHAT, "no tags published"))
}

/// Returns the version of the most recently created `name` entry in a chart index.
pub fn latest_chart_version(index_yaml: &str, name: &str) -> Result<String, SourceError> {
    let what = format!("chart index {name} entries");

    let index: ChartIndex =
        serde_yaml::from_str(index_yaml).map_err(|e| SourceError::unavailable(what.as_str(), e))?;

    let entries = index
        .entries
        .get(name)
        .ok_or_else(|| SourceError::unavailable(what.as_str(), "chart not published"))?;
    let entries: Vec<ChartEntry> = serde_yaml::from_value(entries.clone())
        .map_err(|e| SourceError::unavailable(what.as_str(), e))?;

    entries
        .iter()
        .max_by_key(|entry| entry.created)
        .and_then(|entry| scalar_to_string(&entry.version))
        .ok_or_else(|| SourceError::unavailable(what.as_str(), "chart not published"))
}

/// The `version:` of dependency `name` exactly as written in the document.
///
/// Unquoted versions such as `0.10` load as YAML floats and would print as
/// `0.1`, which no longer matches the pin in the file. Only entries listing
/// `name:` before `version:` are recognized.
fn written_version(yaml: &str, name: &str) -> Option<String> {
    let mut in_entry = false;
    for line in yaml.lines() {
        let field = line.trim().trim_start_matches("- ").trim_start();
        if let Some(value) = field.strip_prefix("name:") {
            in_entry = scalar_text(value) == name;
        } else if let Some(value) = field.strip_prefix("version:") {
            if in_entry {
                return Some(scalar_text(value).to_string());
            }
        }
    }
    None
}

/// Plain scalar text without a trailing comment or quotes.
fn scalar_text(value: &str) -> &str {
    let value = value.split(" #").next().unwrap_or(value).trim();
    value.trim_matches(|c| c == '"' || c == '\'')
}

/// Versions such as `0.2` load as YAML numbers; keep their textual form.
fn scalar_to_string(value: &serde_yaml::Value) -> Option<String> {
    match value {
        serde_yaml::Value::String(s) => Some(s.clone()),
        serde_yaml::Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

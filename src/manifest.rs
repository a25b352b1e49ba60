//! Source manifests on disk
//!
//! Loads GitRepository and HelmChart objects from YAML files (multi-document
//! files included), dispatching on the `kind` field, and writes them back.

use crate::models::{
    Artifact, GitRepository, HelmChart, Source, SourceKind, SourceStatus, StatusTransitions,
};
use kube::ResourceExt;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Manifest loading errors
#[derive(Debug, thiserror::Error)]
pub enum ManifestError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("document {index} has no kind")]
    MissingKind { index: usize },

    #[error("document {index} has unsupported kind {kind:?}")]
    UnsupportedKind { index: usize, kind: String },
}

/// Result type for manifest operations
pub type ManifestResult<T> = Result<T, ManifestError>;

/// A typed source object
#[derive(Debug, Clone, PartialEq)]
pub enum SourceManifest {
    GitRepository(GitRepository),
    HelmChart(HelmChart),
}

impl SourceManifest {
    pub fn kind(&self) -> SourceKind {
        match self {
            SourceManifest::GitRepository(_) => SourceKind::GitRepository,
            SourceManifest::HelmChart(_) => SourceKind::HelmChart,
        }
    }

    pub fn name(&self) -> String {
        match self {
            SourceManifest::GitRepository(repo) => repo.name_any(),
            SourceManifest::HelmChart(chart) => chart.name_any(),
        }
    }

    pub fn namespace(&self) -> Option<String> {
        match self {
            SourceManifest::GitRepository(repo) => repo.namespace(),
            SourceManifest::HelmChart(chart) => chart.namespace(),
        }
    }

    pub fn status(&self) -> Option<&SourceStatus> {
        match self {
            SourceManifest::GitRepository(repo) => repo.observed_status(),
            SourceManifest::HelmChart(chart) => chart.observed_status(),
        }
    }

    /// Where the source is fetched from, for display
    pub fn origin(&self) -> String {
        match self {
            SourceManifest::GitRepository(repo) => repo.spec.url.clone(),
            SourceManifest::HelmChart(chart) => format!(
                "{}/{}:{}",
                chart.spec.source_ref.kind,
                chart.spec.source_ref.name,
                chart.spec.chart
            ),
        }
    }

    pub fn to_yaml(&self) -> ManifestResult<String> {
        let yaml = match self {
            SourceManifest::GitRepository(repo) => serde_yaml::to_string(repo)?,
            SourceManifest::HelmChart(chart) => serde_yaml::to_string(chart)?,
        };
        Ok(yaml)
    }

    pub fn to_json(&self) -> serde_json::Result<serde_json::Value> {
        match self {
            SourceManifest::GitRepository(repo) => serde_json::to_value(repo),
            SourceManifest::HelmChart(chart) => serde_json::to_value(chart),
        }
    }
}

impl Source for SourceManifest {
    fn artifact(&self) -> Option<&Artifact> {
        match self {
            SourceManifest::GitRepository(repo) => repo.artifact(),
            SourceManifest::HelmChart(chart) => chart.artifact(),
        }
    }

    fn interval(&self) -> Duration {
        match self {
            SourceManifest::GitRepository(repo) => repo.interval(),
            SourceManifest::HelmChart(chart) => chart.interval(),
        }
    }
}

impl StatusTransitions for SourceManifest {
    fn mark_progressing(self) -> Self {
        match self {
            SourceManifest::GitRepository(repo) => {
                SourceManifest::GitRepository(repo.mark_progressing())
            }
            SourceManifest::HelmChart(chart) => SourceManifest::HelmChart(chart.mark_progressing()),
        }
    }

    fn mark_ready(self, artifact: Artifact, url: &str, reason: &str, message: &str) -> Self {
        match self {
            SourceManifest::GitRepository(repo) => {
                SourceManifest::GitRepository(repo.mark_ready(artifact, url, reason, message))
            }
            SourceManifest::HelmChart(chart) => {
                SourceManifest::HelmChart(chart.mark_ready(artifact, url, reason, message))
            }
        }
    }

    fn mark_not_ready(self, reason: &str, message: &str) -> Self {
        match self {
            SourceManifest::GitRepository(repo) => {
                SourceManifest::GitRepository(repo.mark_not_ready(reason, message))
            }
            SourceManifest::HelmChart(chart) => {
                SourceManifest::HelmChart(chart.mark_not_ready(reason, message))
            }
        }
    }

    fn observed_status(&self) -> Option<&SourceStatus> {
        self.status()
    }
}

/// Parse every document of a YAML string into typed manifests
pub fn parse_manifests(contents: &str) -> ManifestResult<Vec<SourceManifest>> {
    let mut manifests = Vec::new();
    for (index, document) in serde_yaml::Deserializer::from_str(contents).enumerate() {
        let value = serde_yaml::Value::deserialize(document)?;
        // Empty documents (e.g. a trailing `---`) are skipped
        if value.is_null() {
            continue;
        }
        manifests.push(parse_document(index, value)?);
    }
    Ok(manifests)
}

fn parse_document(index: usize, value: serde_yaml::Value) -> ManifestResult<SourceManifest> {
    let kind = value
        .get("kind")
        .and_then(|k| k.as_str())
        .ok_or(ManifestError::MissingKind { index })?
        .to_string();

    match SourceKind::parse_optional(&kind) {
        Some(SourceKind::GitRepository) => {
            Ok(SourceManifest::GitRepository(serde_yaml::from_value(value)?))
        }
        Some(SourceKind::HelmChart) => Ok(SourceManifest::HelmChart(serde_yaml::from_value(value)?)),
        None => Err(ManifestError::UnsupportedKind { index, kind }),
    }
}

/// Load all source manifests from a file
pub fn load_file(path: &Path) -> ManifestResult<Vec<SourceManifest>> {
    let contents = std::fs::read_to_string(path).map_err(|source| ManifestError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::debug!("Loaded manifest file {}", path.display());
    parse_manifests(&contents)
}

/// Write manifests to a file as a multi-document YAML stream
pub fn write_file(path: &Path, manifests: &[SourceManifest]) -> ManifestResult<()> {
    let contents = to_yaml_stream(manifests)?;
    std::fs::write(path, contents).map_err(|source| ManifestError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Render manifests as a multi-document YAML stream
pub fn to_yaml_stream(manifests: &[SourceManifest]) -> ManifestResult<String> {
    let documents = manifests
        .iter()
        .map(SourceManifest::to_yaml)
        .collect::<ManifestResult<Vec<_>>>()?;
    Ok(documents.join("---\n"))
}

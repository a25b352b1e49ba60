//! HelmChart source
//!
//! Chart versions default to "latest", so each reconciliation may resolve
//! to a different artifact. Starting a new attempt therefore invalidates
//! the advertised artifact and URL. Terminal transitions patch the Ready
//! condition in place and keep any other condition types.

use super::artifact::Artifact;
use super::condition::{
    ConditionStatus, PROGRESSING_MESSAGE, PROGRESSING_REASON, READY_CONDITION,
};
use super::duration::KubeDuration;
use super::source::{Source, StatusTransitions};
use super::status::SourceStatus;
use kube::{CustomResource, ResourceExt};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

pub const HELM_CHART_KIND: &str = "HelmChart";

/// The pull of the Helm chart failed
pub const CHART_PULL_FAILED_REASON: &str = "ChartPullFailed";

/// The pull of the Helm chart succeeded
pub const CHART_PULL_SUCCEEDED_REASON: &str = "ChartPullSucceeded";

/// The package of the Helm chart failed
pub const CHART_PACKAGE_FAILED_REASON: &str = "ChartPackageFailed";

/// The package of the Helm chart succeeded
pub const CHART_PACKAGE_SUCCEEDED_REASON: &str = "ChartPackageSucceeded";

/// Desired state of a Helm chart
#[derive(CustomResource, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[kube(
    group = "source.fluxcd.io",
    version = "v1alpha1",
    kind = "HelmChart",
    plural = "helmcharts",
    namespaced,
    status = "SourceStatus",
    derive = "PartialEq",
    schema = "disabled",
    printcolumn = r#"{"name":"Chart","type":"string","jsonPath":".spec.chart"}"#,
    printcolumn = r#"{"name":"Version","type":"string","jsonPath":".spec.version"}"#,
    printcolumn = r#"{"name":"Source Kind","type":"string","jsonPath":".spec.sourceRef.kind"}"#,
    printcolumn = r#"{"name":"Source Name","type":"string","jsonPath":".spec.sourceRef.name"}"#,
    printcolumn = r#"{"name":"Ready","type":"string","jsonPath":".status.conditions[?(@.type==\"Ready\")].status"}"#,
    printcolumn = r#"{"name":"Status","type":"string","jsonPath":".status.conditions[?(@.type==\"Ready\")].message"}"#,
    printcolumn = r#"{"name":"Age","type":"date","jsonPath":".metadata.creationTimestamp"}"#
)]
#[serde(rename_all = "camelCase")]
pub struct HelmChartSpec {
    /// The name or path the Helm chart is available at in the source
    pub chart: String,

    /// Chart version semver expression, latest when omitted
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub version: String,

    /// The reference to the source the chart is available at
    pub source_ref: LocalHelmChartSourceReference,

    /// The interval at which to check the source for updates
    pub interval: KubeDuration,
}

impl HelmChartSpec {
    /// Version constraint, `None` meaning the latest version
    pub fn version_constraint(&self) -> Option<&str> {
        if self.version.is_empty() {
            None
        } else {
            Some(&self.version)
        }
    }
}

/// Kinds a chart can be sourced from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HelmChartSourceKind {
    HelmRepository,
    GitRepository,
}

impl fmt::Display for HelmChartSourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HelmChartSourceKind::HelmRepository => f.write_str("HelmRepository"),
            HelmChartSourceKind::GitRepository => f.write_str("GitRepository"),
        }
    }
}

/// Reference to the source object in the chart's namespace
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocalHelmChartSourceReference {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub api_version: String,

    pub kind: HelmChartSourceKind,

    pub name: String,
}

impl HelmChart {
    fn take_status(&mut self) -> SourceStatus {
        self.status.take().unwrap_or_default()
    }
}

impl StatusTransitions for HelmChart {
    fn mark_progressing(mut self) -> Self {
        tracing::debug!(
            "HelmChart {} progressing, invalidating artifact",
            self.name_any()
        );
        let status = SourceStatus::default().set_condition(
            READY_CONDITION,
            ConditionStatus::Unknown,
            PROGRESSING_REASON,
            PROGRESSING_MESSAGE,
        );
        self.status = Some(status);
        self
    }

    fn mark_ready(mut self, artifact: Artifact, url: &str, reason: &str, message: &str) -> Self {
        tracing::debug!(
            "HelmChart {} ready: reason={}, artifact={}",
            self.name_any(),
            reason,
            artifact.path
        );
        let mut status = self.take_status().set_artifact_if_changed(artifact);
        status.url = url.to_string();
        self.status = Some(status.set_condition(
            READY_CONDITION,
            ConditionStatus::True,
            reason,
            message,
        ));
        self
    }

    fn mark_not_ready(mut self, reason: &str, message: &str) -> Self {
        tracing::debug!(
            "HelmChart {} not ready: reason={}, message={}",
            self.name_any(),
            reason,
            message
        );
        let status = self.take_status().set_condition(
            READY_CONDITION,
            ConditionStatus::False,
            reason,
            message,
        );
        self.status = Some(status);
        self
    }

    fn observed_status(&self) -> Option<&SourceStatus> {
        self.status.as_ref()
    }
}

impl Source for HelmChart {
    fn artifact(&self) -> Option<&Artifact> {
        self.status.as_ref().and_then(|s| s.artifact.as_ref())
    }

    fn interval(&self) -> Duration {
        self.spec.interval.into()
    }
}

//! GitRepository source
//!
//! A GitRepository mirrors a git ref into an artifact. Its transitions
//! always collapse the condition list to a single Ready entry, and a
//! failed or restarted attempt never clears the last good artifact: the
//! ref is pinned, so the previous artifact stays valid until a newer one
//! is produced.

use super::artifact::Artifact;
use super::condition::{ConditionStatus, PROGRESSING_MESSAGE, PROGRESSING_REASON};
use super::duration::KubeDuration;
use super::source::{Source, StatusTransitions};
use super::status::SourceStatus;
use kube::{CustomResource, ResourceExt};
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const GIT_REPOSITORY_KIND: &str = "GitRepository";

/// Timeout for remote git operations when `spec.timeout` is unset
pub const GIT_REPOSITORY_TIMEOUT: Duration = Duration::from_secs(20);

/// Branch checked out when `spec.ref` is unset
pub const DEFAULT_BRANCH: &str = "master";

/// The git clone, pull and checkout operations succeeded
pub const GIT_OPERATION_SUCCEED_REASON: &str = "GitOperationSucceed";

/// The git clone, pull or checkout operations failed
pub const GIT_OPERATION_FAILED_REASON: &str = "GitOperationFailed";

/// Desired state of a Git repository
#[derive(CustomResource, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[kube(
    group = "source.fluxcd.io",
    version = "v1alpha1",
    kind = "GitRepository",
    plural = "gitrepositories",
    namespaced,
    status = "SourceStatus",
    derive = "PartialEq",
    schema = "disabled",
    printcolumn = r#"{"name":"URL","type":"string","jsonPath":".spec.url"}"#,
    printcolumn = r#"{"name":"Ready","type":"string","jsonPath":".status.conditions[?(@.type==\"Ready\")].status"}"#,
    printcolumn = r#"{"name":"Status","type":"string","jsonPath":".status.conditions[?(@.type==\"Ready\")].message"}"#,
    printcolumn = r#"{"name":"Age","type":"date","jsonPath":".metadata.creationTimestamp"}"#
)]
#[serde(rename_all = "camelCase")]
pub struct GitRepositorySpec {
    /// The repository URL, can be a HTTP or SSH address
    pub url: String,

    /// The secret name containing the Git credentials
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret_ref: Option<LocalObjectReference>,

    /// The interval at which to check for repository updates
    pub interval: KubeDuration,

    /// The timeout for remote git operations like cloning
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<KubeDuration>,

    /// The git reference to checkout and monitor for changes
    #[serde(default, rename = "ref", skip_serializing_if = "Option::is_none")]
    pub reference: Option<GitRepositoryRef>,

    /// Verify OpenPGP signature for the commit that HEAD points to
    #[serde(default, rename = "verify", skip_serializing_if = "Option::is_none")]
    pub verification: Option<GitRepositoryVerification>,

    /// Excluded patterns in .sourceignore format
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ignore: Option<String>,
}

/// Reference to a secret in the resource's namespace
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LocalObjectReference {
    pub name: String,
}

/// Git ref used for pull and checkout operations
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GitRepositoryRef {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub branch: String,

    /// Takes precedence over branch
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub tag: String,

    /// Tag semver expression, takes precedence over tag
    #[serde(default, rename = "semver", skip_serializing_if = "String::is_empty")]
    pub semver: String,

    /// Commit SHA, when set tag filters are ignored
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub commit: String,
}

/// Checkout strategy resolved from a [`GitRepositoryRef`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GitCheckout {
    /// Exact commit, cloned from the given branch
    Commit { commit: String, branch: String },
    /// Highest tag matching a semver range
    SemVer(String),
    Tag(String),
    Branch(String),
}

impl GitRepositoryRef {
    /// Resolve the effective checkout: commit > semver > tag > branch
    pub fn checkout(&self) -> GitCheckout {
        let branch = if self.branch.is_empty() {
            DEFAULT_BRANCH.to_string()
        } else {
            self.branch.clone()
        };

        if !self.commit.is_empty() {
            GitCheckout::Commit {
                commit: self.commit.clone(),
                branch,
            }
        } else if !self.semver.is_empty() {
            GitCheckout::SemVer(self.semver.clone())
        } else if !self.tag.is_empty() {
            GitCheckout::Tag(self.tag.clone())
        } else {
            GitCheckout::Branch(branch)
        }
    }
}

/// Git object to verify
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerificationMode {
    #[default]
    Head,
}

/// OpenPGP signature verification policy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GitRepositoryVerification {
    pub mode: VerificationMode,

    /// Secret containing the public keys of all trusted git authors
    #[serde(default)]
    pub secret_ref: LocalObjectReference,
}

impl GitRepository {
    /// Configured timeout, or the 20s default
    pub fn timeout(&self) -> Duration {
        self.spec
            .timeout
            .map(Duration::from)
            .unwrap_or(GIT_REPOSITORY_TIMEOUT)
    }

    /// Checkout strategy, defaulting to the master branch
    pub fn checkout(&self) -> GitCheckout {
        self.spec
            .reference
            .as_ref()
            .map(GitRepositoryRef::checkout)
            .unwrap_or_else(|| GitCheckout::Branch(DEFAULT_BRANCH.to_string()))
    }

    fn take_status(&mut self) -> SourceStatus {
        self.status.take().unwrap_or_default()
    }
}

impl StatusTransitions for GitRepository {
    fn mark_progressing(mut self) -> Self {
        tracing::debug!("GitRepository {} progressing", self.name_any());
        let status = self.take_status().reset_ready(
            ConditionStatus::Unknown,
            PROGRESSING_REASON,
            PROGRESSING_MESSAGE,
        );
        self.status = Some(status);
        self
    }

    fn mark_ready(mut self, artifact: Artifact, url: &str, reason: &str, message: &str) -> Self {
        tracing::debug!(
            "GitRepository {} ready: reason={}, artifact={}",
            self.name_any(),
            reason,
            artifact.path
        );
        let mut status = self
            .take_status()
            .reset_ready(ConditionStatus::True, reason, message);
        status.url = url.to_string();
        self.status = Some(status.set_artifact_if_changed(artifact));
        self
    }

    fn mark_not_ready(mut self, reason: &str, message: &str) -> Self {
        tracing::debug!(
            "GitRepository {} not ready: reason={}, message={}",
            self.name_any(),
            reason,
            message
        );
        let status = self
            .take_status()
            .reset_ready(ConditionStatus::False, reason, message);
        self.status = Some(status);
        self
    }

    fn observed_status(&self) -> Option<&SourceStatus> {
        self.status.as_ref()
    }
}

impl Source for GitRepository {
    fn artifact(&self) -> Option<&Artifact> {
        self.status.as_ref().and_then(|s| s.artifact.as_ref())
    }

    fn interval(&self) -> Duration {
        self.spec.interval.into()
    }
}

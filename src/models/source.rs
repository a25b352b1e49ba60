//! Source capability and status transitions
//!
//! Every source kind exposes its latest artifact and refresh interval
//! through [`Source`], and the three reconciliation transitions through
//! [`StatusTransitions`]. Both traits are implemented separately by each
//! resource type; there is no shared base type.
//!
//! A reconciliation driver calls `mark_progressing` when an attempt starts
//! and exactly one of `mark_ready` / `mark_not_ready` when it ends, then
//! writes the returned resource back. Transitions take the resource by
//! value and return the updated value without I/O.

use super::artifact::Artifact;
use super::status::SourceStatus;
use kube::ResourceExt;
use std::time::Duration;

/// Annotation used for triggering a reconciliation outside of the
/// defined schedule
pub const RECONCILE_AT_ANNOTATION: &str = "fluxcd.io/reconcileAt";

/// Capability shared by all source kinds
pub trait Source {
    /// Latest artifact from the status sub-resource, if any
    fn artifact(&self) -> Option<&Artifact>;

    /// Interval at which the source is updated
    fn interval(&self) -> Duration;
}

/// Result reported by the fetch subsystem for one reconciliation attempt
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    Succeeded {
        artifact: Artifact,
        url: String,
        reason: String,
        message: String,
    },
    Failed {
        reason: String,
        message: String,
    },
}

impl FetchOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, FetchOutcome::Succeeded { .. })
    }
}

/// Ready condition lifecycle of a source resource
pub trait StatusTransitions: Sized {
    /// Record that a new reconciliation attempt has started
    fn mark_progressing(self) -> Self;

    /// Record a successful attempt and advertise its artifact
    fn mark_ready(self, artifact: Artifact, url: &str, reason: &str, message: &str) -> Self;

    /// Record a failed attempt
    fn mark_not_ready(self, reason: &str, message: &str) -> Self;

    /// Observed status, `None` until the first transition
    fn observed_status(&self) -> Option<&SourceStatus>;

    /// Message of the Ready condition with status True, or an empty string
    fn ready_message(&self) -> String {
        self.observed_status()
            .map(SourceStatus::ready_message)
            .unwrap_or_default()
    }

    /// Apply the terminal transition matching a fetch outcome
    fn apply_outcome(self, outcome: FetchOutcome) -> Self {
        match outcome {
            FetchOutcome::Succeeded {
                artifact,
                url,
                reason,
                message,
            } => self.mark_ready(artifact, &url, &reason, &message),
            FetchOutcome::Failed { reason, message } => self.mark_not_ready(&reason, &message),
        }
    }
}

/// Value of the reconcile-at annotation, when an out-of-band sync was requested
pub fn reconcile_requested_at<K: ResourceExt>(resource: &K) -> Option<&str> {
    resource
        .annotations()
        .get(RECONCILE_AT_ANNOTATION)
        .map(String::as_str)
}

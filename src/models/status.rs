//! Observed state shared by GitRepository and HelmChart
//!
//! The primitives here never fail and never touch anything but the value
//! they are called on. Which primitive a transition uses is decided per
//! resource kind (see `git_repository` and `helm_chart`).

use super::artifact::Artifact;
use super::condition::{self, ConditionStatus, READY_CONDITION, SourceCondition};
use serde::{Deserialize, Serialize};

/// Status sub-resource of a Flux source
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceStatus {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conditions: Vec<SourceCondition>,

    /// Download link for the artifact output of the last sync
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub url: String,

    /// Output of the last successful sync
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artifact: Option<Artifact>,
}

impl SourceStatus {
    /// Drop every condition and keep a single Ready entry
    pub fn reset_ready(mut self, status: ConditionStatus, reason: &str, message: &str) -> Self {
        self.conditions = vec![SourceCondition::new(
            READY_CONDITION,
            status,
            reason,
            message,
        )];
        self
    }

    /// Replace the condition of the given type, keeping all other types
    pub fn set_condition(
        mut self,
        condition_type: &str,
        status: ConditionStatus,
        reason: &str,
        message: &str,
    ) -> Self {
        self.conditions = condition::set_condition(
            std::mem::take(&mut self.conditions),
            condition_type,
            status,
            reason,
            message,
        );
        self
    }

    /// Store the artifact unless the current one already has the same path
    pub fn set_artifact_if_changed(mut self, artifact: Artifact) -> Self {
        match &self.artifact {
            Some(current) if current.same_path(&artifact) => {}
            _ => self.artifact = Some(artifact),
        }
        self
    }

    pub fn ready_condition(&self) -> Option<&SourceCondition> {
        condition::find_condition(&self.conditions, READY_CONDITION)
    }

    /// Status of the Ready condition, if any has been recorded
    pub fn ready_status(&self) -> Option<ConditionStatus> {
        self.ready_condition().map(|c| c.status)
    }

    pub fn ready_message(&self) -> String {
        condition::ready_message(&self.conditions)
    }
}

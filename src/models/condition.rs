//! Source conditions
//!
//! A condition list holds at most one entry per condition type. Writers go
//! through [`set_condition`], which replaces by type, so a second `Ready`
//! entry can never be appended next to an existing one.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Condition type reporting overall reconciliation health
pub const READY_CONDITION: &str = "Ready";

/// Reason used while a reconciliation is in flight
pub const PROGRESSING_REASON: &str = "Progressing";

/// Message used while a reconciliation is in flight
pub const PROGRESSING_MESSAGE: &str = "reconciliation in progress";

/// Tri-state condition status, serialized as `True`, `False` or `Unknown`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConditionStatus {
    True,
    False,
    Unknown,
}

impl ConditionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConditionStatus::True => "True",
            ConditionStatus::False => "False",
            ConditionStatus::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for ConditionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Observed state entry on a source's status
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceCondition {
    /// Type of condition, e.g. `Ready`
    pub r#type: String,

    /// Status of the condition (True, False, Unknown)
    pub status: ConditionStatus,

    /// Last time the condition was written
    pub last_transition_time: DateTime<Utc>,

    /// Machine readable reason for the last transition
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub reason: String,

    /// Human readable message for the last transition
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub message: String,
}

impl SourceCondition {
    /// Build a condition stamped with the current time
    pub fn new(condition_type: &str, status: ConditionStatus, reason: &str, message: &str) -> Self {
        Self {
            r#type: condition_type.to_string(),
            status,
            last_transition_time: Utc::now(),
            reason: reason.to_string(),
            message: message.to_string(),
        }
    }

    pub fn is_ready_true(&self) -> bool {
        self.r#type == READY_CONDITION && self.status == ConditionStatus::True
    }
}

/// Replace any condition of the same type and append the new one last
pub fn set_condition(
    conditions: Vec<SourceCondition>,
    condition_type: &str,
    status: ConditionStatus,
    reason: &str,
    message: &str,
) -> Vec<SourceCondition> {
    let mut conditions: Vec<SourceCondition> = conditions
        .into_iter()
        .filter(|c| c.r#type != condition_type)
        .collect();
    conditions.push(SourceCondition::new(condition_type, status, reason, message));
    conditions
}

/// First condition with the given type
pub fn find_condition<'a>(
    conditions: &'a [SourceCondition],
    condition_type: &str,
) -> Option<&'a SourceCondition> {
    conditions.iter().find(|c| c.r#type == condition_type)
}

/// Message of the Ready condition with status True, or an empty string
pub fn ready_message(conditions: &[SourceCondition]) -> String {
    conditions
        .iter()
        .find(|c| c.is_ready_true())
        .map(|c| c.message.clone())
        .unwrap_or_default()
}

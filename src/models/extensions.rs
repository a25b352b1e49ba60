//! Readiness helpers for source resources
//!
//! Implemented once for every type with [`StatusTransitions`], reading the
//! Ready condition of its observed status.

use super::condition::ConditionStatus;
use super::source::StatusTransitions;

/// Trait for checking resource readiness status
pub trait ResourceStatus {
    /// Returns true if the last reconciliation succeeded
    fn is_ready(&self) -> bool;

    /// Returns true if a reconciliation is in progress
    fn is_reconciling(&self) -> bool;

    /// Returns true if the last reconciliation failed
    fn is_failed(&self) -> bool;

    /// Returns a status icon for display
    fn status_icon(&self) -> &'static str;
}

impl<T: StatusTransitions> ResourceStatus for T {
    fn is_ready(&self) -> bool {
        ready_status(self) == Some(ConditionStatus::True)
    }

    fn is_reconciling(&self) -> bool {
        ready_status(self) == Some(ConditionStatus::Unknown)
    }

    fn is_failed(&self) -> bool {
        ready_status(self) == Some(ConditionStatus::False)
    }

    fn status_icon(&self) -> &'static str {
        match ready_status(self) {
            Some(ConditionStatus::True) => "✓",
            Some(ConditionStatus::False) => "✗",
            Some(ConditionStatus::Unknown) => "⟳",
            None => "-",
        }
    }
}

fn ready_status<T: StatusTransitions>(resource: &T) -> Option<ConditionStatus> {
    resource.observed_status().and_then(|s| s.ready_status())
}

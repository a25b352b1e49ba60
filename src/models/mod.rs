//! Source model layer
//!
//! Rust types for the Flux source API and the status state machine that
//! drives their Ready condition.
//!
//! Structure:
//! - `condition.rs` / `artifact.rs` / `status.rs` - shared status building blocks
//! - `git_repository.rs` / `helm_chart.rs` - resource kinds and their transitions
//! - `source.rs` - capability traits implemented by every kind
//! - `extensions.rs` - readiness helpers for display

pub mod artifact;
pub mod condition;
pub mod duration;
pub mod extensions;
pub mod git_repository;
pub mod helm_chart;
pub mod kind;
pub mod source;
pub mod status;

pub use artifact::Artifact;
pub use condition::{
    ConditionStatus, PROGRESSING_MESSAGE, PROGRESSING_REASON, READY_CONDITION, SourceCondition,
};
pub use duration::{DurationParseError, KubeDuration};
pub use extensions::ResourceStatus;
pub use git_repository::{
    GitCheckout, GitRepository, GitRepositoryRef, GitRepositorySpec, GitRepositoryVerification,
    LocalObjectReference, VerificationMode,
};
pub use helm_chart::{HelmChart, HelmChartSourceKind, HelmChartSpec, LocalHelmChartSourceReference};
pub use kind::SourceKind;
pub use source::{
    FetchOutcome, RECONCILE_AT_ANNOTATION, Source, StatusTransitions, reconcile_requested_at,
};
pub use status::SourceStatus;

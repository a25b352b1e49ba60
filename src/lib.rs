//! Flux source status library
//!
//! Typed GitRepository and HelmChart sources, the status state machine that
//! drives their Ready condition, and read-only tooling around them. It can
//! be used both as a binary and as a library for testing.

pub mod cli;
pub mod config;
pub mod kube;
pub mod manifest;
pub mod models;
pub mod watcher;

// Re-export commonly used types for convenience
pub use manifest::{ManifestError, SourceManifest};
pub use models::{
    Artifact, ConditionStatus, FetchOutcome, GitRepository, HelmChart, Source, SourceCondition,
    SourceKind, SourceStatus, StatusTransitions,
};
pub use watcher::{ResourceState, SourceInfo, SourceWatcher, WatchEvent, resource_key};

//! Source state management
//!
//! Tracks the latest observed row for every watched source.

use crate::manifest::SourceManifest;
use crate::models::{ConditionStatus, Source, SourceKind, reconcile_requested_at};
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

/// Source metadata for display
#[derive(Debug, Clone, PartialEq)]
pub struct SourceInfo {
    pub name: String,
    pub namespace: String,
    pub kind: SourceKind,
    /// Git URL, or `Kind/name:chart` for charts
    pub origin: String,
    pub interval: Duration,
    /// Status of the Ready condition, `None` before the first reconciliation
    pub ready: Option<ConditionStatus>,
    pub reason: String,
    pub message: String,
    /// Advertised artifact download URL
    pub url: String,
    pub revision: Option<String>,
    pub reconcile_requested_at: Option<String>,
}

impl SourceInfo {
    /// Build a display row from a typed source
    pub fn from_manifest(manifest: &SourceManifest) -> Self {
        let status = manifest.status();
        let ready = status.and_then(|s| s.ready_condition());
        let requested_at = match manifest {
            SourceManifest::GitRepository(repo) => reconcile_requested_at(repo),
            SourceManifest::HelmChart(chart) => reconcile_requested_at(chart),
        }
        .map(str::to_string);

        Self {
            name: manifest.name(),
            namespace: manifest.namespace().unwrap_or_default(),
            kind: manifest.kind(),
            origin: manifest.origin(),
            interval: manifest.interval(),
            ready: ready.map(|c| c.status),
            reason: ready.map(|c| c.reason.clone()).unwrap_or_default(),
            message: ready.map(|c| c.message.clone()).unwrap_or_default(),
            url: status.map(|s| s.url.clone()).unwrap_or_default(),
            revision: manifest
                .artifact()
                .map(|a| a.revision.clone())
                .filter(|r| !r.is_empty()),
            reconcile_requested_at: requested_at,
        }
    }
}

/// Thread-safe source state store
#[derive(Clone, Default)]
pub struct ResourceState {
    inner: Arc<RwLock<HashMap<String, SourceInfo>>>,
}

impl ResourceState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or update a source
    pub fn upsert(&self, key: String, info: SourceInfo) {
        let mut state = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        state.insert(key, info);
    }

    /// Remove a source
    pub fn remove(&self, key: &str) {
        let mut state = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        state.remove(key);
    }

    /// Get all sources, sorted by kind, namespace and name
    pub fn all(&self) -> Vec<SourceInfo> {
        let state = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        let mut rows: Vec<SourceInfo> = state.values().cloned().collect();
        rows.sort_by(|a, b| {
            (a.kind.as_str(), &a.namespace, &a.name).cmp(&(b.kind.as_str(), &b.namespace, &b.name))
        });
        rows
    }

    /// Get sources of one kind
    pub fn by_kind(&self, kind: SourceKind) -> Vec<SourceInfo> {
        self.all().into_iter().filter(|info| info.kind == kind).collect()
    }

    /// Get a specific source
    pub fn get(&self, key: &str) -> Option<SourceInfo> {
        let state = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        state.get(key).cloned()
    }

    /// Count sources by kind
    pub fn count_by_kind(&self) -> HashMap<SourceKind, usize> {
        let state = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        let mut counts = HashMap::new();
        for info in state.values() {
            *counts.entry(info.kind).or_insert(0) += 1;
        }
        counts
    }

    /// Clear all sources (used when switching namespaces)
    pub fn clear(&self) {
        let mut state = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        state.clear();
    }
}

/// Generate a unique key for a source
pub fn resource_key(namespace: &str, name: &str, kind: SourceKind) -> String {
    format!("{}:{}:{}", kind, namespace, name)
}

//! Artifact descriptor
//!
//! Produced by the fetch subsystem after a successful sync and stored on the
//! source's status. Artifacts are compared by `path` only.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Output of the last successful source sync
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Artifact {
    /// Relative path of the artifact in the storage
    pub path: String,

    /// HTTP address of the artifact as exposed by the controller
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub url: String,

    /// Human readable identifier traceable in the origin source system
    /// (commit SHA, chart version, etc.)
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub revision: String,

    /// Timestamp of when the artifact was last updated
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_update_time: Option<DateTime<Utc>>,
}

impl Artifact {
    pub fn new(path: impl Into<String>, url: impl Into<String>, revision: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            url: url.into(),
            revision: revision.into(),
            last_update_time: Some(Utc::now()),
        }
    }

    /// Whether both descriptors point at the same stored artifact
    pub fn same_path(&self, other: &Artifact) -> bool {
        self.path == other.path
    }
}

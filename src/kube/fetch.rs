//! Resource fetching utilities
//!
//! Provides functions for fetching source objects from the Kubernetes API.

use crate::manifest::SourceManifest;
use crate::models::{GitRepository, HelmChart, SourceKind};
use anyhow::Context;
use kube::Api;

/// Fetch a single source object by kind and name
pub async fn fetch_source(
    client: &kube::Client,
    kind: SourceKind,
    namespace: &str,
    name: &str,
) -> anyhow::Result<SourceManifest> {
    macro_rules! fetch_resource {
        ($type:ty) => {{
            let api: Api<$type> = Api::namespaced(client.clone(), namespace);
            api.get(name)
                .await
                .with_context(|| format!("Failed to fetch {} {}/{}", kind, namespace, name))?
        }};
    }

    tracing::debug!("Fetching {} {}/{}", kind, namespace, name);
    let manifest = match kind {
        SourceKind::GitRepository => SourceManifest::GitRepository(fetch_resource!(GitRepository)),
        SourceKind::HelmChart => SourceManifest::HelmChart(fetch_resource!(HelmChart)),
    };
    Ok(manifest)
}

//! Kubernetes client module
//!
//! Handles connection to the Kubernetes API server for the read-only
//! cluster views (`get`, `watch`). Status write-back belongs to the
//! reconciliation driver and is not done here.

mod fetch;

pub use fetch::fetch_source;

use anyhow::{Context, Result};
use kube::config::Kubeconfig;
use kube::{Client, Config};

/// Initialize and return a Kubernetes client
///
/// Uses the default kubeconfig loading strategy:
/// 1. In-cluster config (if running in a pod)
/// 2. KUBECONFIG environment variable
/// 3. ~/.kube/config
pub async fn create_client() -> Result<Client> {
    let config = Config::infer()
        .await
        .context("Failed to infer Kubernetes configuration")?;
    tracing::debug!("Connecting to cluster at {}", config.cluster_url);
    let client = Client::try_from(config).context("Failed to create Kubernetes client")?;
    Ok(client)
}

/// Name of the current kubeconfig context, if one is set
pub fn current_context() -> Option<String> {
    match Kubeconfig::read() {
        Ok(kubeconfig) => kubeconfig.current_context,
        Err(e) => {
            tracing::debug!("No kubeconfig available: {}", e);
            None
        }
    }
}

/// Resolve the namespace to query
///
/// An explicit flag wins over the `NAMESPACE` environment variable, which
/// wins over the configured default. `all`, `-A` and the empty string mean
/// every namespace.
pub fn resolve_namespace(flag: Option<&str>, configured: &str) -> Option<String> {
    let env = std::env::var("NAMESPACE").ok();
    namespace_from(flag, env.as_deref(), configured)
}

fn namespace_from(flag: Option<&str>, env: Option<&str>, configured: &str) -> Option<String> {
    let chosen = flag.or(env).unwrap_or(configured);
    if chosen.is_empty() || chosen == "all" || chosen == "-A" {
        None
    } else {
        Some(chosen.to_string())
    }
}

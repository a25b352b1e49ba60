//! Watcher module
//!
//! Streams source objects from the cluster and turns them into display
//! rows. Read-only: nothing here mutates a resource's status.

mod resource;
mod state;

pub use state::*;

use crate::manifest::SourceManifest;
use crate::models::SourceKind;
use anyhow::Result;
use futures::StreamExt;
use kube::runtime::watcher;
use kube::{Api, Client, ResourceExt};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

const MAX_CONSECUTIVE_ERRORS: u32 = 5;

/// What a watcher task does with a stream error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorAction {
    /// Report the error to the consumer and retry
    Forward,
    /// Retry without reporting
    Suppress,
    /// Give up on this kind
    Stop,
}

/// Counts consecutive watch errors for one kind
///
/// Only delivered objects and a completed initial list count as success.
/// The `Init` marker that opens every relist does not.
#[derive(Debug, Default)]
pub struct ErrorTracker {
    consecutive: u32,
}

impl ErrorTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn consecutive(&self) -> u32 {
        self.consecutive
    }

    pub fn record_success(&mut self) {
        self.consecutive = 0;
    }

    pub fn record_error(&mut self) -> ErrorAction {
        self.consecutive += 1;
        if self.consecutive >= MAX_CONSECUTIVE_ERRORS {
            ErrorAction::Stop
        } else if self.consecutive == 1 {
            ErrorAction::Forward
        } else {
            ErrorAction::Suppress
        }
    }
}

/// Event emitted by source watchers
#[derive(Debug, Clone)]
pub enum WatchEvent {
    /// Source was added or updated
    Applied(SourceInfo),
    /// Source was deleted
    Deleted {
        kind: SourceKind,
        namespace: String,
        name: String,
    },
    /// Watch error occurred
    Error(String),
}

/// Trait for watchable source kinds
pub trait WatchableResource:
    kube::Resource<Scope = kube::core::NamespaceResourceScope>
    + Clone
    + Send
    + std::fmt::Debug
    + 'static
where
    <Self as kube::Resource>::DynamicType: Default,
    Self: for<'de> serde::Deserialize<'de>,
{
    /// Get the API group for this resource
    fn api_group() -> &'static str;

    /// Get the API version for this resource
    fn api_version() -> &'static str;

    /// Get the plural name for this resource
    fn plural() -> &'static str;

    /// Get the source kind for this resource
    fn source_kind() -> SourceKind;

    /// Wrap a copy of this object as a typed manifest
    fn to_manifest(&self) -> SourceManifest;
}

/// Manages one watcher task per source kind
///
/// Watchers are namespace-aware and are restarted when the namespace
/// filter changes. Only the watcher tasks hold the sending side of the
/// channel, so the receiver sees `None` once every task has finished.
pub struct SourceWatcher {
    client: Client,
    current_namespace: Option<String>,
    event_tx: mpsc::WeakUnboundedSender<WatchEvent>,
    pending_tx: Option<mpsc::UnboundedSender<WatchEvent>>,
    handles: Vec<JoinHandle<()>>,
}

impl SourceWatcher {
    /// Create a new SourceWatcher
    ///
    /// Nothing is watched until `watch_all()` is called.
    pub fn new(
        client: Client,
        namespace: Option<String>,
    ) -> (Self, mpsc::UnboundedReceiver<WatchEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (
            Self {
                client,
                current_namespace: namespace,
                event_tx: tx.downgrade(),
                pending_tx: Some(tx),
                handles: Vec::new(),
            },
            rx,
        )
    }

    /// Namespace currently watched, `None` for all namespaces
    pub fn namespace(&self) -> Option<&str> {
        self.current_namespace.as_deref()
    }

    /// Change the namespace filter and restart all watchers
    pub fn set_namespace(&mut self, namespace: Option<String>) -> Result<()> {
        if self.current_namespace == namespace {
            return Ok(());
        }

        // Keep the channel open while the old tasks are torn down
        let tx = self.sender()?;
        self.stop();
        self.current_namespace = namespace;
        self.pending_tx = Some(tx);
        self.watch_all()
    }

    fn sender(&self) -> Result<mpsc::UnboundedSender<WatchEvent>> {
        match &self.pending_tx {
            Some(tx) => Ok(tx.clone()),
            None => self
                .event_tx
                .upgrade()
                .ok_or_else(|| anyhow::anyhow!("watch event channel is closed")),
        }
    }

    /// Start watching a specific source kind
    ///
    /// Uses Api::namespaced if a namespace is set, Api::all otherwise.
    fn watch<R>(&mut self) -> Result<()>
    where
        R: WatchableResource,
        R::DynamicType: Default,
    {
        let client = self.client.clone();
        let namespace = self.current_namespace.clone();
        let event_tx = self.sender()?;
        let kind = R::source_kind();

        let handle = tokio::spawn(async move {
            let api: Api<R> = match namespace {
                Some(ns) => Api::namespaced(client, &ns),
                None => Api::all(client),
            };

            let mut w = Box::pin(watcher(api, watcher::Config::default()));
            let mut errors = ErrorTracker::new();

            while let Some(event) = w.next().await {
                match event {
                    Ok(watcher::Event::InitApply(obj)) | Ok(watcher::Event::Apply(obj)) => {
                        errors.record_success();
                        let info = SourceInfo::from_manifest(&obj.to_manifest());
                        let _ = event_tx.send(WatchEvent::Applied(info));
                    }
                    Ok(watcher::Event::Delete(obj)) => {
                        errors.record_success();
                        let _ = event_tx.send(WatchEvent::Deleted {
                            kind,
                            namespace: obj.namespace().unwrap_or_default(),
                            name: obj.name_any(),
                        });
                    }
                    Ok(watcher::Event::InitDone) => errors.record_success(),
                    Ok(watcher::Event::Init) => {}
                    Err(e) => match errors.record_error() {
                        ErrorAction::Forward => {
                            let _ = event_tx.send(WatchEvent::Error(format!(
                                "{} watcher error ({}): {}",
                                kind,
                                errors.consecutive(),
                                e
                            )));
                            tokio::time::sleep(tokio::time::Duration::from_secs(1)).await;
                        }
                        ErrorAction::Suppress => {
                            tracing::debug!(
                                "{} watcher error ({}): {}",
                                kind,
                                errors.consecutive(),
                                e
                            );
                            tokio::time::sleep(tokio::time::Duration::from_secs(1)).await;
                        }
                        // Likely the CRD is not installed
                        ErrorAction::Stop => {
                            let _ = event_tx.send(WatchEvent::Error(format!(
                                "{} watcher stopped after {} consecutive errors: {}",
                                kind,
                                errors.consecutive(),
                                e
                            )));
                            break;
                        }
                    },
                }
            }
        });

        self.handles.push(handle);
        Ok(())
    }

    /// Start watching every supported source kind
    ///
    /// After this returns the event channel closes once every watcher task
    /// has stopped.
    pub fn watch_all(&mut self) -> Result<()> {
        self.watch::<crate::models::GitRepository>()?;
        self.watch::<crate::models::HelmChart>()?;
        self.pending_tx = None;
        Ok(())
    }

    /// Abort all watcher tasks
    pub fn stop(&mut self) {
        for handle in &self.handles {
            handle.abort();
        }
        self.handles.clear();
    }
}

impl Drop for SourceWatcher {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Apply a watch event to the state store
pub fn apply_event(state: &ResourceState, event: &WatchEvent) {
    match event {
        WatchEvent::Applied(info) => {
            state.upsert(resource_key(&info.namespace, &info.name, info.kind), info.clone());
        }
        WatchEvent::Deleted {
            kind,
            namespace,
            name,
        } => state.remove(&resource_key(namespace, name, *kind)),
        WatchEvent::Error(_) => {}
    }
}

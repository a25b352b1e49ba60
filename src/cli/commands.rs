//! CLI command handlers
//!
//! `status` and `transition` work on manifests on disk. `get` and `watch`
//! are read-only views of a cluster.

use anyhow::{Context, Result, bail};
use clap::ValueEnum;
use std::path::PathBuf;

use super::render::{render_manifests, render_table};
use crate::config::{Config, OutputFormat};
use crate::manifest::{self, SourceManifest};
use crate::models::git_repository::{GIT_OPERATION_FAILED_REASON, GIT_OPERATION_SUCCEED_REASON};
use crate::models::helm_chart::{CHART_PULL_FAILED_REASON, CHART_PULL_SUCCEEDED_REASON};
use crate::models::{Artifact, FetchOutcome, SourceKind, StatusTransitions};
use crate::watcher::{ResourceState, SourceWatcher, WatchEvent, apply_event};

/// Effective output settings for a command
#[derive(Debug, Clone, Copy)]
pub struct OutputOptions {
    pub format: OutputFormat,
    pub no_headers: bool,
}

impl OutputOptions {
    /// Combine the `-o` flag with the configured defaults
    pub fn resolve(flag: Option<OutputFormat>, config: &Config) -> Self {
        Self {
            format: flag.unwrap_or(config.output.format),
            no_headers: config.output.no_headers,
        }
    }
}

/// Status transition to apply
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionTarget {
    Progressing,
    Ready,
    NotReady,
}

/// Arguments of the `transition` command
#[derive(clap::Args, Debug, Clone)]
pub struct TransitionArgs {
    /// Manifest file holding one or more sources
    pub file: PathBuf,

    /// Transition to apply
    #[arg(long, value_enum)]
    pub to: TransitionTarget,

    /// Only transition the source with this name
    #[arg(long)]
    pub name: Option<String>,

    /// Artifact path (required for `ready`)
    #[arg(long)]
    pub artifact_path: Option<String>,

    /// Artifact download URL
    #[arg(long)]
    pub artifact_url: Option<String>,

    /// Artifact revision
    #[arg(long)]
    pub revision: Option<String>,

    /// Advertised status URL (defaults to the artifact URL)
    #[arg(long)]
    pub url: Option<String>,

    /// Condition reason (defaults to the kind's success or failure reason)
    #[arg(long)]
    pub reason: Option<String>,

    /// Condition message
    #[arg(long)]
    pub message: Option<String>,

    /// Write the result back to the file instead of printing it
    #[arg(long)]
    pub write: bool,
}

/// Show the status of sources in manifest files
pub fn handle_status(files: &[PathBuf], output: OutputOptions) -> Result<()> {
    let mut manifests = Vec::new();
    for file in files {
        let loaded = manifest::load_file(file)
            .with_context(|| format!("Failed to load sources from {}", file.display()))?;
        manifests.extend(loaded);
    }

    print!(
        "{}",
        render_manifests(&manifests, output.format, output.no_headers)?
    );
    Ok(())
}

/// Apply one status transition to the sources in a manifest file
pub fn handle_transition(args: TransitionArgs, output: OutputOptions) -> Result<()> {
    let manifests = manifest::load_file(&args.file)
        .with_context(|| format!("Failed to load sources from {}", args.file.display()))?;

    let mut matched = 0usize;
    let mut updated = Vec::with_capacity(manifests.len());
    for source in manifests {
        let selected = args.name.as_deref().is_none_or(|name| source.name() == name);
        if selected {
            matched += 1;
            updated.push(transition(source, &args)?);
        } else {
            updated.push(source);
        }
    }

    if matched == 0 {
        match &args.name {
            Some(name) => bail!("No source named '{}' in {}", name, args.file.display()),
            None => bail!("No sources found in {}", args.file.display()),
        }
    }

    if args.write {
        manifest::write_file(&args.file, &updated)
            .with_context(|| format!("Failed to write {}", args.file.display()))?;
        println!("{}: {} source(s) updated", args.file.display(), matched);
        return Ok(());
    }

    // A table would hide the fields that just changed
    let format = match output.format {
        OutputFormat::Json => OutputFormat::Json,
        _ => OutputFormat::Yaml,
    };
    print!("{}", render_manifests(&updated, format, output.no_headers)?);
    Ok(())
}

/// Run the requested transition on a single source
pub fn transition(source: SourceManifest, args: &TransitionArgs) -> Result<SourceManifest> {
    let kind = source.kind();
    let message = args.message.clone().unwrap_or_default();

    tracing::debug!(
        "Transitioning {} {} to {:?}",
        kind,
        source.name(),
        args.to
    );

    let source = match args.to {
        TransitionTarget::Progressing => source.mark_progressing(),
        TransitionTarget::Ready => {
            let Some(path) = args.artifact_path.as_deref() else {
                bail!("--artifact-path is required for the ready transition");
            };
            let artifact_url = args.artifact_url.clone().unwrap_or_default();
            let url = args.url.clone().unwrap_or_else(|| artifact_url.clone());
            let artifact = Artifact::new(
                path,
                artifact_url,
                args.revision.clone().unwrap_or_default(),
            );
            source.apply_outcome(FetchOutcome::Succeeded {
                artifact,
                url,
                reason: args
                    .reason
                    .clone()
                    .unwrap_or_else(|| success_reason(kind).to_string()),
                message,
            })
        }
        TransitionTarget::NotReady => source.apply_outcome(FetchOutcome::Failed {
            reason: args
                .reason
                .clone()
                .unwrap_or_else(|| failure_reason(kind).to_string()),
            message,
        }),
    };

    Ok(source)
}

fn success_reason(kind: SourceKind) -> &'static str {
    match kind {
        SourceKind::GitRepository => GIT_OPERATION_SUCCEED_REASON,
        SourceKind::HelmChart => CHART_PULL_SUCCEEDED_REASON,
    }
}

fn failure_reason(kind: SourceKind) -> &'static str {
    match kind {
        SourceKind::GitRepository => GIT_OPERATION_FAILED_REASON,
        SourceKind::HelmChart => CHART_PULL_FAILED_REASON,
    }
}

/// Fetch a single source from the cluster
pub async fn handle_get(
    kind: SourceKind,
    name: &str,
    namespace: Option<&str>,
    config: &Config,
    output: OutputOptions,
) -> Result<()> {
    let Some(namespace) = crate::kube::resolve_namespace(namespace, &config.default_namespace)
    else {
        bail!("get needs a single namespace, pass -n <namespace>");
    };

    if let Some(context) = crate::kube::current_context() {
        tracing::debug!("Using kubeconfig context {}", context);
    }

    let client = crate::kube::create_client().await?;
    let source = crate::kube::fetch_source(&client, kind, &namespace, name).await?;

    print!(
        "{}",
        render_manifests(&[source], output.format, output.no_headers)?
    );
    Ok(())
}

/// Stream source status changes until interrupted or every watcher stops
pub async fn handle_watch(
    namespace: Option<&str>,
    config: &Config,
    output: OutputOptions,
) -> Result<()> {
    let namespace = crate::kube::resolve_namespace(namespace, &config.default_namespace);
    match &namespace {
        Some(ns) => tracing::debug!("Watching sources in namespace {}", ns),
        None => tracing::debug!("Watching sources in all namespaces"),
    }

    let client = crate::kube::create_client().await?;
    let state = ResourceState::new();
    let (mut watcher, mut event_rx) = SourceWatcher::new(client, namespace);
    watcher.watch_all()?;

    if !output.no_headers {
        print!("{}", render_table(&[], false));
    }

    loop {
        tokio::select! {
            event = event_rx.recv() => {
                let Some(event) = event else {
                    tracing::debug!("All watchers stopped");
                    break;
                };
                apply_event(&state, &event);
                match &event {
                    WatchEvent::Applied(info) => {
                        print!("{}", render_table(std::slice::from_ref(info), true));
                    }
                    WatchEvent::Deleted { kind, namespace, name } => {
                        println!("{}/{}/{} deleted", kind, namespace, name);
                    }
                    WatchEvent::Error(message) => tracing::warn!("{}", message),
                }
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::debug!("Interrupted, stopping watchers");
                break;
            }
        }
    }

    watcher.stop();
    for (kind, count) in state.count_by_kind() {
        tracing::debug!("Observed {} {} source(s)", count, kind);
    }
    Ok(())
}

//! Manifest file tests
//!
//! Load sources from disk, run transitions offline and write them back.

use flux_source::cli::{OutputOptions, TransitionArgs, TransitionTarget, render_manifests, transition};
use flux_source::config::OutputFormat;
use flux_source::manifest::{self, ManifestError};
use flux_source::models::{ConditionStatus, Source, SourceKind, StatusTransitions};
use flux_source::{ResourceState, SourceInfo, resource_key};
use std::path::PathBuf;

const SOURCES: &str = r#"
apiVersion: source.fluxcd.io/v1alpha1
kind: GitRepository
metadata:
  name: podinfo
  namespace: flux-system
spec:
  url: https://github.com/stefanprodan/podinfo
  interval: 1m
  ref:
    tag: 4.0.0
---
apiVersion: source.fluxcd.io/v1alpha1
kind: HelmChart
metadata:
  name: redis
  namespace: flux-system
spec:
  chart: redis
  version: 10.5.7
  sourceRef:
    kind: HelmRepository
    name: stable
  interval: 10m
---
"#;

fn write_sources(dir: &tempfile::TempDir) -> PathBuf {
    let path = dir.path().join("sources.yaml");
    std::fs::write(&path, SOURCES).unwrap();
    path
}

fn transition_args(file: PathBuf, to: TransitionTarget) -> TransitionArgs {
    TransitionArgs {
        file,
        to,
        name: None,
        artifact_path: None,
        artifact_url: None,
        revision: None,
        url: None,
        reason: None,
        message: None,
        write: false,
    }
}

#[test]
fn test_load_multi_document_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_sources(&dir);

    let sources = manifest::load_file(&path).unwrap();
    assert_eq!(sources.len(), 2);
    assert_eq!(sources[0].kind(), SourceKind::GitRepository);
    assert_eq!(sources[1].kind(), SourceKind::HelmChart);
    assert_eq!(sources[1].origin(), "HelmRepository/stable:redis");
}

#[test]
fn test_missing_file_reports_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent.yaml");

    match manifest::load_file(&path).unwrap_err() {
        ManifestError::Io { path: reported, .. } => assert_eq!(reported, path),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_invalid_document_index_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bad.yaml");
    std::fs::write(&path, format!("{SOURCES}kind: Bucket\nmetadata:\n  name: x\n")).unwrap();

    match manifest::load_file(&path).unwrap_err() {
        ManifestError::UnsupportedKind { index, kind } => {
            assert_eq!(index, 2);
            assert_eq!(kind, "Bucket");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_transition_write_back_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_sources(&dir);

    let mut args = transition_args(path.clone(), TransitionTarget::Ready);
    args.artifact_path = Some("/art/v1".to_string());
    args.artifact_url = Some("http://x/v1".to_string());
    args.revision = Some("4.0.0/363a6a8".to_string());
    args.message = Some("fetched".to_string());

    let updated = manifest::load_file(&path)
        .unwrap()
        .into_iter()
        .map(|source| transition(source, &args).unwrap())
        .collect::<Vec<_>>();
    manifest::write_file(&path, &updated).unwrap();

    let reloaded = manifest::load_file(&path).unwrap();
    assert_eq!(reloaded, updated);

    for source in &reloaded {
        let status = source.status().unwrap();
        assert_eq!(status.ready_status(), Some(ConditionStatus::True));
        assert_eq!(status.url, "http://x/v1");
        assert_eq!(source.artifact().unwrap().path, "/art/v1");
        assert_eq!(source.ready_message(), "fetched");
    }
}

#[test]
fn test_progressing_after_write_back_follows_kind_rules() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_sources(&dir);

    let mut ready = transition_args(path.clone(), TransitionTarget::Ready);
    ready.artifact_path = Some("/art/v1".to_string());
    ready.url = Some("http://x/v1".to_string());
    let progressing = transition_args(path.clone(), TransitionTarget::Progressing);

    let sources: Vec<_> = manifest::load_file(&path)
        .unwrap()
        .into_iter()
        .map(|s| transition(s, &ready).unwrap())
        .map(|s| transition(s, &progressing).unwrap())
        .collect();

    let repo = &sources[0];
    assert_eq!(repo.artifact().unwrap().path, "/art/v1");
    assert_eq!(repo.status().unwrap().url, "http://x/v1");

    let chart = &sources[1];
    assert!(chart.artifact().is_none());
    assert!(chart.status().unwrap().url.is_empty());
}

#[test]
fn test_status_rows_from_manifests() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_sources(&dir);

    let mut not_ready = transition_args(path.clone(), TransitionTarget::NotReady);
    not_ready.message = Some("auth failed".to_string());

    let sources = manifest::load_file(&path).unwrap();
    let repo = transition(sources[0].clone(), &not_ready).unwrap();

    let info = SourceInfo::from_manifest(&repo);
    assert_eq!(info.ready, Some(ConditionStatus::False));
    assert_eq!(info.reason, "GitOperationFailed");
    assert_eq!(info.message, "auth failed");
    assert_eq!(info.origin, "https://github.com/stefanprodan/podinfo");

    let untouched = SourceInfo::from_manifest(&sources[1]);
    assert_eq!(untouched.ready, None);

    let state = ResourceState::new();
    for info in [info, untouched] {
        state.upsert(resource_key(&info.namespace, &info.name, info.kind), info);
    }
    assert_eq!(state.by_kind(SourceKind::HelmChart).len(), 1);
    assert!(state.get("GitRepository:flux-system:podinfo").is_some());
}

#[test]
fn test_render_formats() {
    let sources = manifest::parse_manifests(SOURCES).unwrap();
    let output = OutputOptions {
        format: OutputFormat::Table,
        no_headers: false,
    };

    let table = render_manifests(&sources, output.format, output.no_headers).unwrap();
    assert_eq!(table.lines().count(), 3);
    assert!(table.lines().next().unwrap().starts_with("NAME"));

    let json = render_manifests(&sources, OutputFormat::Json, false).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value.as_array().unwrap().len(), 2);
    assert_eq!(value[1]["spec"]["version"], "10.5.7");

    let yaml = render_manifests(&sources, OutputFormat::Yaml, false).unwrap();
    assert_eq!(manifest::parse_manifests(&yaml).unwrap(), sources);
}

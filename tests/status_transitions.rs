//! Status transition tests
//!
//! Exercise the Progressing / Ready / NotReady lifecycle of both source
//! kinds, including the places where they deliberately differ.

use flux_source::models::{
    Artifact, ConditionStatus, FetchOutcome, GitRepository, HelmChart, READY_CONDITION,
    ResourceStatus, Source, SourceStatus, StatusTransitions,
};
use serde_json::json;

fn git_repository() -> GitRepository {
    serde_json::from_value(json!({
        "apiVersion": "source.fluxcd.io/v1alpha1",
        "kind": "GitRepository",
        "metadata": { "name": "podinfo", "namespace": "flux-system" },
        "spec": {
            "url": "https://github.com/stefanprodan/podinfo",
            "interval": "1m",
            "ref": { "branch": "master" }
        }
    }))
    .unwrap()
}

fn helm_chart() -> HelmChart {
    serde_json::from_value(json!({
        "apiVersion": "source.fluxcd.io/v1alpha1",
        "kind": "HelmChart",
        "metadata": { "name": "podinfo", "namespace": "flux-system" },
        "spec": {
            "chart": "podinfo",
            "sourceRef": { "kind": "HelmRepository", "name": "podinfo" },
            "interval": "10m"
        }
    }))
    .unwrap()
}

fn ready_count(status: &SourceStatus) -> usize {
    status
        .conditions
        .iter()
        .filter(|c| c.r#type == READY_CONDITION)
        .count()
}

fn status_of<T: StatusTransitions>(resource: &T) -> &SourceStatus {
    resource.observed_status().expect("status should be set")
}

#[test]
fn test_git_repository_lifecycle() {
    let repo = git_repository();
    assert!(repo.status.is_none());
    assert!(repo.artifact().is_none());

    let repo = repo.mark_progressing();
    let status = status_of(&repo);
    assert_eq!(status.conditions.len(), 1);
    assert_eq!(status.conditions[0].r#type, READY_CONDITION);
    assert_eq!(status.conditions[0].status, ConditionStatus::Unknown);
    assert_eq!(status.conditions[0].reason, "Progressing");
    assert_eq!(status.conditions[0].message, "reconciliation in progress");
    assert!(repo.is_reconciling());

    let repo = repo.mark_ready(
        Artifact::new("/art/v1", "http://x/v1", "master/abc"),
        "http://x/v1",
        "FetchSucceeded",
        "fetched",
    );
    let status = status_of(&repo);
    assert_eq!(status.conditions.len(), 1);
    assert_eq!(status.conditions[0].status, ConditionStatus::True);
    assert_eq!(status.conditions[0].reason, "FetchSucceeded");
    assert_eq!(status.conditions[0].message, "fetched");
    assert_eq!(status.url, "http://x/v1");
    assert_eq!(repo.artifact().unwrap().path, "/art/v1");
    assert!(repo.is_ready());

    let repo = repo.mark_not_ready("FetchFailed", "network error");
    let status = status_of(&repo);
    assert_eq!(status.conditions.len(), 1);
    assert_eq!(status.conditions[0].status, ConditionStatus::False);
    assert_eq!(status.conditions[0].reason, "FetchFailed");
    assert_eq!(status.conditions[0].message, "network error");
    assert_eq!(status.url, "http://x/v1");
    assert_eq!(repo.artifact().unwrap().path, "/art/v1");
    assert!(repo.is_failed());
}

#[test]
fn test_git_repository_progressing_keeps_artifact_and_url() {
    let repo = git_repository()
        .mark_ready(
            Artifact::new("/art/v1", "http://x/v1", "master/abc"),
            "http://x/v1",
            "FetchSucceeded",
            "fetched",
        )
        .mark_progressing();

    let status = status_of(&repo);
    assert_eq!(status.url, "http://x/v1");
    assert_eq!(repo.artifact().unwrap().path, "/art/v1");
    assert_eq!(status.conditions.len(), 1);
    assert_eq!(status.conditions[0].status, ConditionStatus::Unknown);
}

#[test]
fn test_git_repository_collapses_foreign_conditions() {
    let mut repo = git_repository();
    repo.status = Some(
        SourceStatus::default()
            .set_condition("Stalled", ConditionStatus::True, "Blocked", "manual hold")
            .set_condition(READY_CONDITION, ConditionStatus::True, "Old", "old"),
    );

    for repo in [
        repo.clone().mark_progressing(),
        repo.clone().mark_not_ready("FetchFailed", "boom"),
        repo.clone()
            .mark_ready(Artifact::new("/a", "", ""), "", "Ok", "ok"),
    ] {
        let status = status_of(&repo);
        assert_eq!(status.conditions.len(), 1);
        assert_eq!(status.conditions[0].r#type, READY_CONDITION);
    }
}

#[test]
fn test_helm_chart_progressing_clears_artifact_and_url() {
    let chart = helm_chart()
        .mark_ready(
            Artifact::new("/charts/podinfo-6.0.0.tgz", "http://x/podinfo-6.0.0.tgz", "6.0.0"),
            "http://x/podinfo-6.0.0.tgz",
            "ChartPullSucceeded",
            "pulled",
        )
        .mark_progressing();

    let status = status_of(&chart);
    assert!(status.artifact.is_none());
    assert!(status.url.is_empty());
    assert!(chart.artifact().is_none());
    assert_eq!(status.conditions.len(), 1);
    assert_eq!(status.conditions[0].status, ConditionStatus::Unknown);
}

#[test]
fn test_helm_chart_patches_conditions_in_place() {
    let mut chart = helm_chart();
    chart.status = Some(SourceStatus::default().set_condition(
        "ArtifactOutdated",
        ConditionStatus::True,
        "NewChart",
        "a newer chart exists",
    ));

    let chart = chart.mark_not_ready("ChartPullFailed", "index unreachable");
    let status = status_of(&chart);
    assert_eq!(status.conditions.len(), 2);
    assert_eq!(status.conditions[0].r#type, "ArtifactOutdated");
    assert_eq!(status.conditions[1].r#type, READY_CONDITION);
    assert_eq!(status.conditions[1].status, ConditionStatus::False);

    let chart = chart.mark_ready(
        Artifact::new("/charts/podinfo-6.0.1.tgz", "http://x/6.0.1", "6.0.1"),
        "http://x/6.0.1",
        "ChartPullSucceeded",
        "pulled",
    );
    let status = status_of(&chart);
    assert_eq!(status.conditions.len(), 2);
    assert_eq!(ready_count(status), 1);
    assert_eq!(status.conditions[1].status, ConditionStatus::True);
    assert_eq!(status.url, "http://x/6.0.1");
}

#[test]
fn test_helm_chart_not_ready_keeps_artifact() {
    let chart = helm_chart()
        .mark_ready(
            Artifact::new("/charts/podinfo-6.0.0.tgz", "http://x/6.0.0", "6.0.0"),
            "http://x/6.0.0",
            "ChartPullSucceeded",
            "pulled",
        )
        .mark_not_ready("ChartPackageFailed", "bad chart");

    assert_eq!(chart.artifact().unwrap().path, "/charts/podinfo-6.0.0.tgz");
    assert_eq!(status_of(&chart).url, "http://x/6.0.0");
}

#[test]
fn test_single_ready_condition_after_any_sequence() {
    let artifact = Artifact::new("/art/v1", "http://x/v1", "v1");

    let repo = git_repository()
        .mark_progressing()
        .mark_ready(artifact.clone(), "http://x/v1", "Ok", "ok")
        .mark_progressing()
        .mark_not_ready("Failed", "failed")
        .mark_ready(artifact.clone(), "http://x/v1", "Ok", "ok");
    assert_eq!(ready_count(status_of(&repo)), 1);

    let chart = helm_chart()
        .mark_not_ready("Failed", "failed")
        .mark_not_ready("Failed", "again")
        .mark_progressing()
        .mark_ready(artifact, "http://x/v1", "Ok", "ok")
        .mark_not_ready("Failed", "failed");
    assert_eq!(ready_count(status_of(&chart)), 1);
}

#[test]
fn test_mark_ready_same_path_keeps_artifact() {
    let first = Artifact::new("/art/v1", "http://x/v1", "rev-1");
    let repo = git_repository().mark_ready(first.clone(), "http://x/v1", "Ok", "first");
    let first_condition = status_of(&repo).conditions[0].clone();

    // Same path, different metadata: stored artifact is not replaced
    let second = Artifact::new("/art/v1", "http://y/v1", "rev-2");
    let repo = repo.mark_ready(second, "http://x/v1", "StillOk", "second");

    let stored = repo.artifact().unwrap();
    assert_eq!(stored, &first);
    assert_eq!(stored.revision, "rev-1");

    let condition = &status_of(&repo).conditions[0];
    assert_eq!(condition.reason, "StillOk");
    assert_eq!(condition.message, "second");
    assert!(condition.last_transition_time >= first_condition.last_transition_time);

    // A new path replaces it
    let repo = repo.mark_ready(Artifact::new("/art/v2", "", "rev-3"), "http://x/v2", "Ok", "");
    assert_eq!(repo.artifact().unwrap().path, "/art/v2");
    assert_eq!(status_of(&repo).url, "http://x/v2");
}

#[test]
fn test_ready_message() {
    let repo = git_repository();
    assert_eq!(repo.ready_message(), "");

    let repo = repo.mark_progressing();
    assert_eq!(repo.ready_message(), "");

    let repo = repo.mark_ready(Artifact::new("/a", "", ""), "", "Ok", "Fetched revision: master/abc");
    assert_eq!(repo.ready_message(), "Fetched revision: master/abc");

    let repo = repo.mark_not_ready("Failed", "broken");
    assert_eq!(repo.ready_message(), "");

    let chart = helm_chart().mark_ready(Artifact::new("/c", "", ""), "", "Ok", "pulled");
    assert_eq!(chart.ready_message(), "pulled");
}

#[test]
fn test_apply_outcome() {
    let outcome = FetchOutcome::Succeeded {
        artifact: Artifact::new("/art/v1", "http://x/v1", "v1"),
        url: "http://x/v1".to_string(),
        reason: "FetchSucceeded".to_string(),
        message: "fetched".to_string(),
    };
    assert!(outcome.is_success());

    let repo = git_repository().mark_progressing().apply_outcome(outcome);
    assert!(repo.is_ready());
    assert_eq!(repo.artifact().unwrap().path, "/art/v1");

    let failed = FetchOutcome::Failed {
        reason: "FetchFailed".to_string(),
        message: "network error".to_string(),
    };
    assert!(!failed.is_success());

    let repo = repo.mark_progressing().apply_outcome(failed);
    assert!(repo.is_failed());
    assert_eq!(repo.artifact().unwrap().path, "/art/v1");
    assert_eq!(repo.status_icon(), "✗");
}

#[test]
fn test_transitions_do_not_touch_spec_or_metadata() {
    let repo = git_repository();
    let spec = repo.spec.clone();
    let metadata = repo.metadata.clone();

    let repo = repo
        .mark_progressing()
        .mark_ready(Artifact::new("/a", "", ""), "", "Ok", "ok");
    assert_eq!(repo.spec, spec);
    assert_eq!(repo.metadata, metadata);
}

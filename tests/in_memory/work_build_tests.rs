//! End-to-end tests for building work.

use super::helpers::{ALPHA_BRANCH, WorkHarness, harness, project};
use liq_work::work::{
    config::BuildFailurePolicy,
    services::{BuildStatus, BuildWorkRequest, StartWorkRequest, WorkError, WorkErrorKind},
};
use rstest::rstest;

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn all_builds_every_project_in_work_order(harness: WorkHarness) {
    harness.start_alpha_and_beta().await;

    let report = harness
        .orchestrator
        .build_work(BuildWorkRequest::new().with_work_key(ALPHA_BRANCH).with_all(true))
        .await
        .expect("build succeeds");

    assert!(report.is_success());
    assert_eq!(report.work_key.as_str(), ALPHA_BRANCH);
    assert_eq!(
        harness.builder.builds().expect("builds readable"),
        vec![project("org/alpha"), project("org/beta")]
    );
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn explicit_projects_build_only_those(harness: WorkHarness) {
    harness.start_alpha_and_beta().await;

    harness
        .orchestrator
        .build_work(
            BuildWorkRequest::new()
                .with_work_key(ALPHA_BRANCH)
                .with_projects(["org/beta"]),
        )
        .await
        .expect("build succeeds");

    assert_eq!(
        harness.builder.builds().expect("builds readable"),
        vec![project("org/beta")]
    );
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn working_directory_implies_work_key_and_project(harness: WorkHarness) {
    harness.start_alpha_and_beta().await;

    let report = harness
        .orchestrator
        .build_work(BuildWorkRequest::new().with_current_dir("/playground/org/alpha"))
        .await
        .expect("build succeeds");

    assert_eq!(report.work_key.as_str(), ALPHA_BRANCH);
    assert_eq!(
        harness.builder.builds().expect("builds readable"),
        vec![project("org/alpha")]
    );
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn collect_all_reports_each_failure_and_keeps_going(harness: WorkHarness) {
    harness.start_alpha_and_beta().await;
    harness
        .builder
        .fail_project(project("org/alpha"), "error TS2322")
        .expect("failure injected");

    let report = harness
        .orchestrator
        .build_work(BuildWorkRequest::new().with_work_key(ALPHA_BRANCH).with_all(true))
        .await
        .expect("collect-all returns a report");

    assert!(!report.is_success());
    assert_eq!(report.failed_projects(), vec![&project("org/alpha")]);
    let statuses: Vec<&BuildStatus> = report
        .outcomes
        .iter()
        .map(|outcome| &outcome.status)
        .collect();
    assert!(matches!(
        statuses.as_slice(),
        [BuildStatus::Failed(message), BuildStatus::Built] if message.contains("error TS2322")
    ));
    assert_eq!(harness.builder.builds().expect("builds readable").len(), 2);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn fail_fast_stops_at_the_first_failure() {
    let harness = WorkHarness::with_policy(BuildFailurePolicy::FailFast);
    harness.start_alpha_and_beta().await;
    harness
        .builder
        .fail_project(project("org/alpha"), "error TS2322")
        .expect("failure injected");

    let err = harness
        .orchestrator
        .build_work(BuildWorkRequest::new().with_work_key(ALPHA_BRANCH).with_all(true))
        .await
        .expect_err("fail-fast returns the failure");

    assert_eq!(err.kind(), WorkErrorKind::Fatal);
    assert!(
        matches!(&err, WorkError::Build { project: failed, .. } if failed == &project("org/alpha")),
        "unexpected error: {err:?}"
    );
    assert_eq!(
        harness.builder.builds().expect("builds readable"),
        vec![project("org/alpha")]
    );
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn unknown_work_is_not_found(harness: WorkHarness) {
    let err = harness
        .orchestrator
        .build_work(BuildWorkRequest::new().with_work_key("work/org/alpha-404").with_all(true))
        .await
        .expect_err("unknown work");

    assert_eq!(err.kind(), WorkErrorKind::NotFound);
    assert!(matches!(err, WorkError::WorkNotFound(_)));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn project_outside_work_is_not_found(harness: WorkHarness) {
    harness
        .orchestrator
        .start_work(StartWorkRequest::new(["42"]).with_projects(["org/alpha"]))
        .await
        .expect("work starts");

    let err = harness
        .orchestrator
        .build_work(
            BuildWorkRequest::new()
                .with_work_key(ALPHA_BRANCH)
                .with_projects(["org/beta"]),
        )
        .await
        .expect_err("beta is not part of the work");

    assert_eq!(err.kind(), WorkErrorKind::NotFound);
    assert!(harness.builder.builds().expect("builds readable").is_empty());
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn missing_work_key_and_directory_is_an_invalid_request(harness: WorkHarness) {
    let err = harness
        .orchestrator
        .build_work(BuildWorkRequest::new().with_all(true))
        .await
        .expect_err("no work key");

    assert_eq!(err.kind(), WorkErrorKind::InvalidRequest);
}

//! End-to-end tests for adding issues to existing work.

use super::helpers::{ALPHA_BRANCH, CALLER, WorkHarness, caller, harness, issue};
use liq_work::work::{
    domain::WorkKey,
    services::{AddIssuesRequest, WorkError, WorkErrorKind},
};
use rstest::rstest;

fn work_key() -> WorkKey {
    WorkKey::new(ALPHA_BRANCH).expect("valid key")
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn new_issue_is_claimed_on_the_work_branch_and_persisted(harness: WorkHarness) {
    harness.start_alpha_and_beta().await;

    let report = harness
        .orchestrator
        .add_issues(AddIssuesRequest::new(["43"]).with_work_key(ALPHA_BRANCH))
        .await
        .expect("issue added");

    assert_eq!(report.added, vec![issue("org/alpha/43")]);
    assert_eq!(
        report.work.issues(),
        [issue("org/alpha/42"), issue("org/beta/7"), issue("org/alpha/43")]
    );
    let stored = harness
        .orchestrator
        .registry()
        .require_data(&work_key())
        .await
        .expect("work stored");
    assert_eq!(stored, report.work);

    let claims = harness.tracker.claims().expect("claims readable");
    let last = claims.last().expect("claim recorded");
    assert_eq!(last.issues, vec![issue("org/alpha/43")]);
    assert_eq!(last.assignee, Some(caller(CALLER)));
    assert!(last.comment.contains(ALPHA_BRANCH));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn issues_already_in_work_are_not_claimed_again(harness: WorkHarness) {
    harness.start_alpha_and_beta().await;
    let claims_before = harness.tracker.claims().expect("claims readable").len();

    let report = harness
        .orchestrator
        .add_issues(AddIssuesRequest::new(["42", "org/beta/7"]).with_work_key(ALPHA_BRANCH))
        .await
        .expect("nothing to add");

    assert!(report.added.is_empty());
    assert_eq!(
        harness.tracker.claims().expect("claims readable").len(),
        claims_before
    );
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn issue_from_an_unbound_project_is_rejected(harness: WorkHarness) {
    harness.start_alpha_and_beta().await;

    let err = harness
        .orchestrator
        .add_issues(AddIssuesRequest::new(["org/gamma/1"]).with_work_key(ALPHA_BRANCH))
        .await
        .expect_err("gamma is not bound");

    assert_eq!(err.kind(), WorkErrorKind::InvalidRequest);
    assert!(matches!(err, WorkError::Domain(_)));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn unavailable_issue_leaves_work_unchanged(harness: WorkHarness) {
    let started = harness.start_alpha_and_beta().await;

    let err = harness
        .orchestrator
        .add_issues(AddIssuesRequest::new(["50"]).with_work_key(ALPHA_BRANCH))
        .await
        .expect_err("issue assigned elsewhere");

    assert_eq!(err.kind(), WorkErrorKind::Conflict);
    let stored = harness
        .orchestrator
        .registry()
        .require_data(&work_key())
        .await
        .expect("work stored");
    assert_eq!(stored, started.work);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn working_directory_implies_the_work_key(harness: WorkHarness) {
    harness.start_alpha_and_beta().await;

    let report = harness
        .orchestrator
        .add_issues(AddIssuesRequest::new(["43"]).with_current_dir("/playground/org/beta"))
        .await
        .expect("issue added");

    assert_eq!(report.work.key(), &work_key());
    assert_eq!(report.added, vec![issue("org/alpha/43")]);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn unknown_work_is_not_found(harness: WorkHarness) {
    let err = harness
        .orchestrator
        .add_issues(AddIssuesRequest::new(["43"]).with_work_key(ALPHA_BRANCH))
        .await
        .expect_err("work was never started");

    assert_eq!(err.kind(), WorkErrorKind::NotFound);
}

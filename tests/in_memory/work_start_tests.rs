//! End-to-end tests for starting work.

use super::helpers::{
    ALPHA_BRANCH, CALLER, PLAYGROUND, WorkHarness, branch, caller, checkout_path, harness, issue,
    project,
};
use liq_work::work::{
    adapters::memory::{ForkRequest, LocalCheckout, VcsOperation, VcsOperationKind},
    config::{ConfigError, WorkConfig},
    domain::{BranchAction, ForkState, RemoteName, RepoKind, RepoVisibility, WorkKey},
    services::{StartWorkRequest, WorkError, WorkErrorKind},
};
use rstest::rstest;

fn alpha_request() -> StartWorkRequest {
    StartWorkRequest::new(["42"]).with_projects(["org/alpha"])
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn public_repository_is_forked_remoted_and_branched(harness: WorkHarness) {
    let report = harness
        .orchestrator
        .start_work(alpha_request())
        .await
        .expect("work starts");

    assert_eq!(report.work.key().as_str(), ALPHA_BRANCH);
    assert_eq!(report.work.issues(), [issue("org/alpha/42")]);
    assert_eq!(report.work.description(), "Work on org/alpha/42 in org/alpha");

    let [repository] = report.repositories.as_slice() else {
        panic!("expected one repository report, got {:?}", report.repositories);
    };
    assert_eq!(
        repository.kind,
        RepoKind::Public {
            fork: ForkState::Created
        }
    );
    assert!(repository.fork_created);
    assert!(repository.remote_added);
    assert_eq!(repository.remote, RemoteName::workspace());
    assert_eq!(repository.action, BranchAction::CreateAndPush);

    assert_eq!(
        harness.hosting.fork_requests().expect("forks readable"),
        vec![ForkRequest {
            org: "org".to_owned(),
            repo: "alpha".to_owned(),
            target: caller(CALLER),
        }]
    );
    let path = checkout_path(&project("org/alpha"));
    assert_eq!(
        harness.vcs.operations().expect("operations readable"),
        vec![
            VcsOperation::AddRemote {
                path: path.clone(),
                remote: RemoteName::workspace(),
                url: "git@github.com:me/alpha.git".to_owned(),
            },
            VcsOperation::CreateAndPush {
                path,
                remote: RemoteName::workspace(),
                branch: branch(ALPHA_BRANCH),
            },
        ]
    );

    let stored = harness
        .orchestrator
        .registry()
        .require_data(&WorkKey::new(ALPHA_BRANCH).expect("valid key"))
        .await
        .expect("work persisted");
    assert_eq!(stored, report.work);

    let status = harness
        .tracker
        .status(&issue("org/alpha/42"))
        .expect("status readable")
        .expect("issue known");
    assert_eq!(status.assignees(), [caller(CALLER)]);
    let claims = harness.tracker.claims().expect("claims readable");
    assert_eq!(
        claims.first().map(|claim| claim.comment.as_str()),
        Some("Work for this issue has begun on branch work/org/alpha-42.")
    );
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn existing_fork_remote_and_branch_only_pull(harness: WorkHarness) {
    harness
        .hosting
        .add_repository("me", "alpha", RepoVisibility::Public)
        .expect("fork registered");
    harness
        .hosting
        .add_branch("me", "alpha", branch(ALPHA_BRANCH))
        .expect("remote branch registered");
    let path = checkout_path(&project("org/alpha"));
    harness
        .vcs
        .add_checkout(
            path.clone(),
            LocalCheckout::new("git@github.com:org/alpha.git")
                .with_remote(RemoteName::WORKSPACE, "git@github.com:me/alpha.git"),
        )
        .expect("checkout registered");

    let report = harness
        .orchestrator
        .start_work(alpha_request())
        .await
        .expect("work starts");

    let actions: Vec<BranchAction> = report
        .repositories
        .iter()
        .map(|repository| repository.action)
        .collect();
    assert_eq!(actions, vec![BranchAction::Pull]);
    assert!(harness.hosting.fork_requests().expect("forks readable").is_empty());
    assert_eq!(
        harness.vcs.operations().expect("operations readable"),
        vec![VcsOperation::Pull {
            path,
            remote: RemoteName::workspace(),
            branch: branch(ALPHA_BRANCH),
        }]
    );
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn projects_are_processed_in_order(harness: WorkHarness) {
    let report = harness.start_alpha_and_beta().await;

    let processed: Vec<String> = report
        .repositories
        .iter()
        .map(|repository| repository.project.to_string())
        .collect();
    assert_eq!(processed, vec!["org/alpha", "org/beta"]);
    assert_eq!(
        report.work.description(),
        "Work on org/alpha/42 in org/alpha, org/beta"
    );

    let beta = report
        .repositories
        .iter()
        .find(|repository| repository.project == project("org/beta"))
        .expect("beta reported");
    assert_eq!(beta.kind, RepoKind::Private);
    assert_eq!(beta.remote, RemoteName::origin());
    assert!(!beta.fork_created);
    assert!(!beta.remote_added);
    assert!(
        harness
            .vcs
            .operations()
            .expect("operations readable")
            .contains(&VcsOperation::CreateAndPush {
                path: checkout_path(&project("org/beta")),
                remote: RemoteName::origin(),
                branch: branch(ALPHA_BRANCH),
            })
    );
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn starting_the_same_work_twice_conflicts_before_mutation(harness: WorkHarness) {
    harness
        .orchestrator
        .start_work(alpha_request())
        .await
        .expect("first start");
    let operations_before = harness.vcs.operations().expect("operations readable").len();
    let claims_before = harness.tracker.claims().expect("claims readable").len();

    let err = harness
        .orchestrator
        .start_work(alpha_request())
        .await
        .expect_err("duplicate work");

    assert_eq!(err.kind(), WorkErrorKind::Conflict);
    assert!(matches!(err, WorkError::DuplicateWork(_)));
    assert_eq!(
        harness.vcs.operations().expect("operations readable").len(),
        operations_before
    );
    assert_eq!(
        harness.tracker.claims().expect("claims readable").len(),
        claims_before
    );
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn unavailable_issue_aborts_without_side_effects(harness: WorkHarness) {
    let err = harness
        .orchestrator
        .start_work(StartWorkRequest::new(["42", "50"]).with_projects(["org/alpha"]))
        .await
        .expect_err("issue assigned elsewhere");

    assert_eq!(err.kind(), WorkErrorKind::Conflict);
    assert!(harness.tracker.claims().expect("claims readable").is_empty());
    assert!(harness.hosting.fork_requests().expect("forks readable").is_empty());
    assert!(harness.vcs.operations().expect("operations readable").is_empty());
    assert!(harness.store.is_empty().expect("store readable"));
}

#[rstest]
#[case(true, true)]
#[case(false, false)]
#[tokio::test(flavor = "multi_thread")]
async fn closed_issues_follow_the_request(
    harness: WorkHarness,
    #[case] not_closed: bool,
    #[case] rejected: bool,
) {
    let request = StartWorkRequest::new(["44"])
        .with_projects(["org/alpha"])
        .with_not_closed(not_closed);

    let result = harness.orchestrator.start_work(request).await;

    assert_eq!(result.is_err(), rejected, "unexpected result: {result:?}");
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn mismatched_workspace_remote_conflicts_without_fork_or_store(harness: WorkHarness) {
    harness
        .vcs
        .add_checkout(
            checkout_path(&project("org/alpha")),
            LocalCheckout::new("git@github.com:org/alpha.git")
                .with_remote(RemoteName::WORKSPACE, "git@github.com:someone/other.git"),
        )
        .expect("checkout registered");

    let err = harness
        .orchestrator
        .start_work(alpha_request())
        .await
        .expect_err("remote mismatch");

    assert_eq!(err.kind(), WorkErrorKind::Conflict);
    assert!(matches!(err, WorkError::RemoteMismatch { .. }));
    assert!(harness.hosting.fork_requests().expect("forks readable").is_empty());
    assert!(harness.vcs.operations().expect("operations readable").is_empty());
    assert!(harness.store.is_empty().expect("store readable"));
}

#[rstest]
#[case("git@github.com:{{ owner }/{{ repo }}.git")]
#[case("git@github.com:{{ owner }}/{{ repo }}.git/")]
#[tokio::test(flavor = "multi_thread")]
async fn unusable_fork_url_template_is_rejected_before_any_claim(#[case] template: &str) {
    let harness = WorkHarness::with_config(WorkConfig {
        fork_url_template: template.to_owned(),
        ..WorkConfig::new(PLAYGROUND)
    });

    let err = harness
        .orchestrator
        .start_work(alpha_request())
        .await
        .expect_err("configuration rejected");

    assert_eq!(err.kind(), WorkErrorKind::InvalidRequest);
    assert!(
        matches!(
            err,
            WorkError::Config(ConfigError::Template { .. } | ConfigError::ForkUrlMismatch { .. })
        ),
        "unexpected error: {err:?}"
    );
    assert!(harness.tracker.claims().expect("claims readable").is_empty());
    assert!(harness.hosting.fork_requests().expect("forks readable").is_empty());
    assert!(harness.vcs.operations().expect("operations readable").is_empty());
    assert!(harness.store.is_empty().expect("store readable"));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn failure_in_a_later_repository_keeps_earlier_effects_and_persists_nothing(
    harness: WorkHarness,
) {
    harness
        .vcs
        .add_checkout(
            checkout_path(&project("org/beta")),
            LocalCheckout::new("git@github.com:org/beta.git").with_branch(ALPHA_BRANCH),
        )
        .expect("checkout registered");
    harness
        .vcs
        .fail_operation(VcsOperationKind::Push)
        .expect("failure injected");

    let err = harness
        .orchestrator
        .start_work(
            StartWorkRequest::new(["42", "org/beta/7"]).with_projects(["org/alpha", "org/beta"]),
        )
        .await
        .expect_err("beta push fails");

    assert_eq!(err.kind(), WorkErrorKind::Fatal);
    assert!(
        matches!(&err, WorkError::Vcs { subject, .. } if subject == "org/beta"),
        "unexpected error: {err:?}"
    );
    let operations = harness.vcs.operations().expect("operations readable");
    assert_eq!(operations.len(), 2, "alpha keeps its remote and branch");
    assert!(harness.store.is_empty().expect("store readable"));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn unknown_local_project_is_an_invalid_request(harness: WorkHarness) {
    let err = harness
        .orchestrator
        .start_work(StartWorkRequest::new(["1"]).with_projects(["org/gamma"]))
        .await
        .expect_err("gamma is not checked out");

    assert_eq!(err.kind(), WorkErrorKind::InvalidRequest);
    assert!(harness.tracker.claims().expect("claims readable").is_empty());
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn project_is_implied_by_the_working_directory(harness: WorkHarness) {
    let report = harness
        .orchestrator
        .start_work(StartWorkRequest::new(["7"]).with_current_dir("/playground/org/beta/src"))
        .await
        .expect("work starts");

    assert_eq!(report.work.key().as_str(), "work/org/beta-7");
    assert_eq!(report.work.project_names(), vec![project("org/beta")]);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn missing_projects_and_directory_is_an_invalid_request(harness: WorkHarness) {
    let err = harness
        .orchestrator
        .start_work(StartWorkRequest::new(["42"]))
        .await
        .expect_err("no project context");

    assert_eq!(err.kind(), WorkErrorKind::InvalidRequest);
    assert!(matches!(err, WorkError::MissingWorkingContext { .. }));
}

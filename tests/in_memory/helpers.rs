//! Shared fixtures for in-memory work orchestration tests.
//!
//! The playground holds two checkouts: `org/alpha`, a public repository
//! worked on through a fork, and `org/beta`, a private repository pushed to
//! directly.

use std::sync::Arc;

use camino::Utf8PathBuf;
use liq_work::work::{
    adapters::memory::{
        InMemoryBuildRunner, InMemoryHostingService, InMemoryIssueTracker, InMemoryLocalVcs,
        InMemoryProjectCatalog, InMemoryWorkRecordStore, LocalCheckout,
        StaticCredentialProvider,
    },
    config::{BuildFailurePolicy, WorkConfig},
    domain::{
        AuthToken, BranchName, CallerIdentity, IssueReference, IssueStatus, ProjectName,
        RepoVisibility,
    },
    services::{StartWorkReport, StartWorkRequest, WorkOrchestrator, WorkPorts},
};
use mockable::DefaultClock;
use rstest::fixture;

/// Root of the simulated playground.
pub const PLAYGROUND: &str = "/playground";

/// Login that owns every token.
pub const CALLER: &str = "me";

/// Work branch derived from `org/alpha/42`.
pub const ALPHA_BRANCH: &str = "work/org/alpha-42";

/// Orchestrator type used by the tests.
pub type TestOrchestrator = WorkOrchestrator<InMemoryWorkRecordStore, DefaultClock>;

/// In-memory collaborators plus the orchestrator wired to them.
pub struct WorkHarness {
    pub tracker: InMemoryIssueTracker,
    pub hosting: InMemoryHostingService,
    pub vcs: InMemoryLocalVcs,
    pub builder: InMemoryBuildRunner,
    pub store: Arc<InMemoryWorkRecordStore>,
    pub orchestrator: TestOrchestrator,
}

impl WorkHarness {
    /// Creates a harness using `policy` for build failures.
    pub fn with_policy(policy: BuildFailurePolicy) -> Self {
        Self::with_config(WorkConfig::new(PLAYGROUND).with_build_failure_policy(policy))
    }

    /// Creates a harness whose orchestrator uses `config`.
    pub fn with_config(config: WorkConfig) -> Self {
        let tracker = InMemoryIssueTracker::new(caller(CALLER));
        for (reference, status) in [
            ("org/alpha/42", IssueStatus::open()),
            ("org/alpha/43", IssueStatus::open()),
            ("org/alpha/44", IssueStatus::closed()),
            (
                "org/alpha/50",
                IssueStatus::open().with_assignees([caller("alice")]),
            ),
            ("org/beta/7", IssueStatus::open()),
        ] {
            tracker
                .insert_issue(issue(reference), status)
                .expect("issue registered");
        }

        let hosting = InMemoryHostingService::new();
        hosting
            .add_repository("org", "alpha", RepoVisibility::Public)
            .expect("alpha registered");
        hosting
            .add_repository("org", "beta", RepoVisibility::Private)
            .expect("beta registered");

        let vcs = InMemoryLocalVcs::new();
        for name in ["alpha", "beta"] {
            vcs.add_checkout(
                checkout_path(&project(&format!("org/{name}"))),
                LocalCheckout::new(format!("git@github.com:org/{name}.git")),
            )
            .expect("checkout registered");
        }

        let builder = InMemoryBuildRunner::new();
        let store = Arc::new(InMemoryWorkRecordStore::new());
        let ports = WorkPorts {
            issue_tracker: Arc::new(tracker.clone()),
            hosting: Arc::new(hosting.clone()),
            vcs: Arc::new(vcs.clone()),
            credentials: Arc::new(StaticCredentialProvider::new(AuthToken::new("token"))),
            catalog: Arc::new(InMemoryProjectCatalog::new([
                project("org/alpha"),
                project("org/beta"),
            ])),
            builder: Arc::new(builder.clone()),
        };
        let orchestrator = WorkOrchestrator::new(
            config,
            ports,
            Arc::clone(&store),
            Arc::new(DefaultClock),
        );

        Self {
            tracker,
            hosting,
            vcs,
            builder,
            store,
            orchestrator,
        }
    }

    /// Starts work on `org/alpha/42` and `org/beta/7` across both projects.
    pub async fn start_alpha_and_beta(&self) -> StartWorkReport {
        self.orchestrator
            .start_work(
                StartWorkRequest::new(["42", "org/beta/7"])
                    .with_projects(["org/alpha", "org/beta"]),
            )
            .await
            .expect("work starts")
    }
}

/// Provides a harness that collects every build outcome.
#[fixture]
pub fn harness() -> WorkHarness {
    WorkHarness::with_policy(BuildFailurePolicy::CollectAll)
}

/// Parses a project name.
pub fn project(name: &str) -> ProjectName {
    ProjectName::new(name).expect("valid project")
}

/// Parses a fully qualified issue reference.
pub fn issue(value: &str) -> IssueReference {
    IssueReference::parse(value).expect("valid issue")
}

/// Parses a caller login.
pub fn caller(login: &str) -> CallerIdentity {
    CallerIdentity::new(login).expect("valid caller")
}

/// Parses a branch name.
pub fn branch(name: &str) -> BranchName {
    BranchName::new(name).expect("valid branch")
}

/// Returns the playground checkout of `project`.
pub fn checkout_path(project: &ProjectName) -> Utf8PathBuf {
    Utf8PathBuf::from(PLAYGROUND)
        .join(project.org())
        .join(project.repo_base_name())
}

//! Shared world state for work orchestration BDD scenarios.

use std::sync::Arc;

use liq_work::work::{
    adapters::memory::{
        InMemoryBuildRunner, InMemoryHostingService, InMemoryIssueTracker, InMemoryLocalVcs,
        InMemoryProjectCatalog, InMemoryWorkRecordStore, StaticCredentialProvider,
    },
    config::WorkConfig,
    domain::{AuthToken, CallerIdentity, ProjectName},
    services::{BuildWorkReport, StartWorkReport, WorkError, WorkOrchestrator, WorkPorts},
};
use mockable::DefaultClock;
use rstest::fixture;

/// Root of the simulated playground.
pub const PLAYGROUND: &str = "/playground";

/// Orchestrator type used by the BDD world.
pub type TestOrchestrator = WorkOrchestrator<InMemoryWorkRecordStore, DefaultClock>;

/// Scenario world for work orchestration behaviour tests.
pub struct WorkWorld {
    pub tracker: InMemoryIssueTracker,
    pub hosting: InMemoryHostingService,
    pub vcs: InMemoryLocalVcs,
    pub builder: InMemoryBuildRunner,
    pub store: Arc<InMemoryWorkRecordStore>,
    pub local_projects: Vec<ProjectName>,
    pub last_start_result: Option<Result<StartWorkReport, WorkError>>,
    pub last_build_result: Option<Result<BuildWorkReport, WorkError>>,
}

impl WorkWorld {
    /// Creates a world with an empty playground.
    #[must_use]
    pub fn new() -> Self {
        let caller = CallerIdentity::new("me").expect("valid caller");
        Self {
            tracker: InMemoryIssueTracker::new(caller),
            hosting: InMemoryHostingService::new(),
            vcs: InMemoryLocalVcs::new(),
            builder: InMemoryBuildRunner::new(),
            store: Arc::new(InMemoryWorkRecordStore::new()),
            local_projects: Vec::new(),
            last_start_result: None,
            last_build_result: None,
        }
    }

    /// Wires an orchestrator over the world's current collaborators.
    #[must_use]
    pub fn orchestrator(&self) -> TestOrchestrator {
        let ports = WorkPorts {
            issue_tracker: Arc::new(self.tracker.clone()),
            hosting: Arc::new(self.hosting.clone()),
            vcs: Arc::new(self.vcs.clone()),
            credentials: Arc::new(StaticCredentialProvider::new(AuthToken::new("token"))),
            catalog: Arc::new(InMemoryProjectCatalog::new(self.local_projects.clone())),
            builder: Arc::new(self.builder.clone()),
        };
        WorkOrchestrator::new(
            WorkConfig::new(PLAYGROUND),
            ports,
            Arc::clone(&self.store),
            Arc::new(DefaultClock),
        )
    }
}

impl Default for WorkWorld {
    fn default() -> Self {
        Self::new()
    }
}

/// Fixture that creates a new scenario world.
#[fixture]
pub fn world() -> WorkWorld {
    WorkWorld::default()
}

/// Splits a comma-separated list of names.
pub fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_owned)
        .collect()
}

/// Runs an async operation within sync step definitions.
pub fn run_async<T>(future: impl std::future::Future<Output = T>) -> T {
    tokio::task::block_in_place(|| tokio::runtime::Handle::current().block_on(future))
}

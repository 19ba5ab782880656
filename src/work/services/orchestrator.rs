//! Top-level driver for starting, building, and extending work.
//!
//! Starting work is an explicit multi-step pipeline without a shared
//! transaction: validate input, verify and claim issues, then provision and
//! reconcile each repository in order, and finally persist the unit of work.
//! Validation failures abort before any external mutation. A failure in a
//! repository step aborts the run but leaves earlier repositories as they
//! are; nothing is persisted in that case.

use camino::{Utf8Path, Utf8PathBuf};
use mockable::Clock;
use std::sync::Arc;
use tracing::{info, warn};

use super::{
    AddIssuesReport, BuildOutcome, BuildStatus, BuildWorkReport, BranchReconciler, ClaimOptions,
    IssueClaimCoordinator, ProjectResolver, ProjectScope, ProjectSelection, RepoProvisioner,
    RepoReport, StartWorkReport, WorkError, WorkRegistry, WorkResult, WorkStep,
};
use crate::work::{
    config::{BuildFailurePolicy, WorkConfig},
    domain::{
        AuthToken, CallerIdentity, IssueReference, NewWorkUnit, ProjectBinding, ProjectName,
        WorkDomainError, WorkKey, WorkUnit, ensure_issues_within, work_branch_name,
    },
    ports::{
        BuildRunner, CredentialProvider, CredentialPurpose, HostingService, IssueTracker,
        LocalVcs, ProjectCatalog, WorkRecordStore,
    },
};

/// Request to start a new unit of work.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartWorkRequest {
    issues: Vec<String>,
    projects: Vec<String>,
    assignee: Option<String>,
    comment: Option<String>,
    no_auto_assign: bool,
    not_closed: bool,
    current_dir: Option<Utf8PathBuf>,
}

impl StartWorkRequest {
    /// Creates a request for `issues`; bare numbers refer to the first
    /// project.
    #[must_use]
    pub fn new(issues: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            issues: issues.into_iter().map(Into::into).collect(),
            projects: Vec::new(),
            assignee: None,
            comment: None,
            no_auto_assign: false,
            not_closed: true,
            current_dir: None,
        }
    }

    /// Sets the projects to work in, as `org/project`.
    #[must_use]
    pub fn with_projects(mut self, projects: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.projects = projects.into_iter().map(Into::into).collect();
        self
    }

    /// Sets an explicit assignee.
    #[must_use]
    pub fn with_assignee(mut self, assignee: impl Into<String>) -> Self {
        self.assignee = Some(assignee.into());
        self
    }

    /// Sets an explicit claim comment.
    #[must_use]
    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    /// Suppresses assigning the issues to the caller.
    #[must_use]
    pub const fn with_no_auto_assign(mut self, no_auto_assign: bool) -> Self {
        self.no_auto_assign = no_auto_assign;
        self
    }

    /// Controls whether closed issues are rejected; defaults to `true`.
    #[must_use]
    pub const fn with_not_closed(mut self, not_closed: bool) -> Self {
        self.not_closed = not_closed;
        self
    }

    /// Sets the working directory used to infer a project.
    #[must_use]
    pub fn with_current_dir(mut self, current_dir: impl Into<Utf8PathBuf>) -> Self {
        self.current_dir = Some(current_dir.into());
        self
    }
}

/// Request to build some or all projects of a unit of work.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildWorkRequest {
    work_key: Option<String>,
    projects: Vec<String>,
    all: bool,
    current_dir: Option<Utf8PathBuf>,
}

impl BuildWorkRequest {
    /// Creates a request; the work key defaults to the current branch.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the work key explicitly.
    #[must_use]
    pub fn with_work_key(mut self, work_key: impl Into<String>) -> Self {
        self.work_key = Some(work_key.into());
        self
    }

    /// Sets the projects to build.
    #[must_use]
    pub fn with_projects(mut self, projects: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.projects = projects.into_iter().map(Into::into).collect();
        self
    }

    /// Builds every project bound to the work.
    #[must_use]
    pub const fn with_all(mut self, all: bool) -> Self {
        self.all = all;
        self
    }

    /// Sets the working directory used to infer the work key and project.
    #[must_use]
    pub fn with_current_dir(mut self, current_dir: impl Into<Utf8PathBuf>) -> Self {
        self.current_dir = Some(current_dir.into());
        self
    }
}

/// Request to add issues to an existing unit of work.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddIssuesRequest {
    work_key: Option<String>,
    issues: Vec<String>,
    assignee: Option<String>,
    comment: Option<String>,
    no_auto_assign: bool,
    not_closed: bool,
    current_dir: Option<Utf8PathBuf>,
}

impl AddIssuesRequest {
    /// Creates a request adding `issues`; bare numbers refer to the work's
    /// first project.
    #[must_use]
    pub fn new(issues: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            work_key: None,
            issues: issues.into_iter().map(Into::into).collect(),
            assignee: None,
            comment: None,
            no_auto_assign: false,
            not_closed: true,
            current_dir: None,
        }
    }

    /// Sets the work key explicitly.
    #[must_use]
    pub fn with_work_key(mut self, work_key: impl Into<String>) -> Self {
        self.work_key = Some(work_key.into());
        self
    }

    /// Sets an explicit assignee.
    #[must_use]
    pub fn with_assignee(mut self, assignee: impl Into<String>) -> Self {
        self.assignee = Some(assignee.into());
        self
    }

    /// Sets an explicit claim comment.
    #[must_use]
    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    /// Suppresses assigning the issues to the caller.
    #[must_use]
    pub const fn with_no_auto_assign(mut self, no_auto_assign: bool) -> Self {
        self.no_auto_assign = no_auto_assign;
        self
    }

    /// Controls whether closed issues are rejected; defaults to `true`.
    #[must_use]
    pub const fn with_not_closed(mut self, not_closed: bool) -> Self {
        self.not_closed = not_closed;
        self
    }

    /// Sets the working directory used to infer the work key.
    #[must_use]
    pub fn with_current_dir(mut self, current_dir: impl Into<Utf8PathBuf>) -> Self {
        self.current_dir = Some(current_dir.into());
        self
    }
}

/// External collaborators used by the orchestrator.
#[derive(Clone)]
pub struct WorkPorts {
    /// Issue tracker client.
    pub issue_tracker: Arc<dyn IssueTracker>,
    /// Hosting-service client.
    pub hosting: Arc<dyn HostingService>,
    /// Local checkout operations.
    pub vcs: Arc<dyn LocalVcs>,
    /// Token source.
    pub credentials: Arc<dyn CredentialProvider>,
    /// Locally available projects.
    pub catalog: Arc<dyn ProjectCatalog>,
    /// External build step.
    pub builder: Arc<dyn BuildRunner>,
}

/// Sequences resolution, claims, provisioning, reconciliation, and
/// persistence.
#[derive(Clone)]
pub struct WorkOrchestrator<S, C>
where
    S: WorkRecordStore,
    C: Clock + Send + Sync,
{
    config: Arc<WorkConfig>,
    ports: WorkPorts,
    resolver: ProjectResolver,
    claims: IssueClaimCoordinator,
    provisioner: RepoProvisioner,
    reconciler: BranchReconciler,
    registry: WorkRegistry<S, C>,
}

impl<S, C> WorkOrchestrator<S, C>
where
    S: WorkRecordStore,
    C: Clock + Send + Sync,
{
    /// Wires the orchestrator and its component services.
    #[must_use]
    pub fn new(config: WorkConfig, ports: WorkPorts, store: Arc<S>, clock: Arc<C>) -> Self {
        let shared = Arc::new(config);
        Self {
            resolver: ProjectResolver::new(Arc::clone(&shared)),
            claims: IssueClaimCoordinator::new(
                Arc::clone(&ports.issue_tracker),
                Arc::clone(&shared),
            ),
            provisioner: RepoProvisioner::new(
                Arc::clone(&ports.hosting),
                Arc::clone(&ports.vcs),
                Arc::clone(&shared),
            ),
            reconciler: BranchReconciler::new(Arc::clone(&ports.hosting), Arc::clone(&ports.vcs)),
            registry: WorkRegistry::new(store, clock),
            config: shared,
            ports,
        }
    }

    /// Returns the registry.
    #[must_use]
    pub const fn registry(&self) -> &WorkRegistry<S, C> {
        &self.registry
    }

    /// Starts a new unit of work.
    ///
    /// # Errors
    ///
    /// Returns an invalid-request, not-found, or conflict [`WorkError`]
    /// before any external mutation, or a fatal error from the first failed
    /// external step. Repositories processed before a failure keep their
    /// side effects and no unit of work is stored.
    pub async fn start_work(&self, request: StartWorkRequest) -> WorkResult<StartWorkReport> {
        self.config.validate()?;
        let explicit = parse_projects(&request.projects)?;
        let selection = ProjectSelection {
            projects: explicit,
            all: false,
            current_dir: request.current_dir.clone(),
        };
        let projects = self
            .resolver
            .resolve(&selection, ProjectScope::Candidates(&*self.ports.catalog))?;
        let primary_project = projects.first().ok_or(WorkDomainError::NoProjects)?;
        let issues = self.claims.normalize(&request.issues, primary_project)?;
        let primary_issue = issues.first().ok_or(WorkDomainError::NoIssues)?;
        let branch = work_branch_name(primary_issue);
        let draft = self
            .registry
            .prepare(NewWorkUnit::new(issues.clone(), projects.clone(), branch.clone()))
            .await?;
        let options = ClaimOptions {
            assignee: parse_assignee(request.assignee.as_deref())?,
            comment: request.comment,
            no_auto_assign: request.no_auto_assign,
        };

        info!(
            work_key = %draft.key(),
            branch = %branch,
            projects = projects.len(),
            "starting work"
        );
        let token = self.token()?;
        self.claims
            .verify_available(&token, &issues, request.no_auto_assign, request.not_closed)
            .await?;
        let caller = self.claims.caller_identity(&token).await?;
        self.claims
            .claim(&token, &issues, &branch, &caller, &options)
            .await?;

        let mut repositories = Vec::with_capacity(projects.len());
        for project in &projects {
            repositories.push(self.prepare_repository(project, &caller, &draft).await?);
        }

        self.registry.commit(&draft).await?;
        Ok(StartWorkReport {
            work: draft,
            repositories,
        })
    }

    async fn prepare_repository(
        &self,
        project: &ProjectName,
        caller: &CallerIdentity,
        work: &WorkUnit,
    ) -> WorkResult<RepoReport> {
        let outcome = self.provisioner.provision(project, caller).await?;
        let reconciliation = self
            .reconciler
            .reconcile(&outcome.binding, work.branch_name())
            .await?;
        Ok(RepoReport {
            project: project.clone(),
            remote: reconciliation.remote,
            kind: outcome.binding.kind(),
            fork_created: outcome.fork_created,
            remote_added: outcome.remote_added,
            action: reconciliation.action,
        })
    }

    /// Builds the selected projects of a unit of work in resolved order.
    ///
    /// Under [`BuildFailurePolicy::CollectAll`] every project is attempted
    /// and failures are reported per project. Under
    /// [`BuildFailurePolicy::FailFast`] the first failure is returned.
    ///
    /// # Errors
    ///
    /// Returns resolution errors, [`WorkError::WorkNotFound`], or, when
    /// failing fast, [`WorkError::Build`].
    pub async fn build_work(&self, request: BuildWorkRequest) -> WorkResult<BuildWorkReport> {
        let work_key = self
            .work_key(
                request.work_key.as_deref(),
                request.current_dir.as_deref(),
                "build work",
            )
            .await?;
        let work = self.registry.require_data(&work_key).await?;
        let selection = ProjectSelection {
            projects: parse_projects(&request.projects)?,
            all: request.all,
            current_dir: request.current_dir,
        };
        let projects = self.resolver.resolve(&selection, ProjectScope::Work(&work))?;

        let mut outcomes = Vec::with_capacity(projects.len());
        for project in projects {
            let path = self.config.project_path(&project);
            info!(work_key = %work_key, project = %project, "building project");
            let result = self.ports.builder.build(&project, &path).await;
            let status = match result {
                Ok(()) => BuildStatus::Built,
                Err(err) if self.config.build_failure_policy == BuildFailurePolicy::FailFast => {
                    return Err(WorkError::Build {
                        project,
                        source: err,
                    });
                }
                Err(err) => {
                    warn!(project = %project, error = %err, "build failed");
                    BuildStatus::Failed(err.to_string())
                }
            };
            outcomes.push(BuildOutcome { project, status });
        }

        Ok(BuildWorkReport { work_key, outcomes })
    }

    /// Adds issues to an existing unit of work after verifying and claiming
    /// them.
    ///
    /// # Errors
    ///
    /// Returns [`WorkError::WorkNotFound`] for unknown work,
    /// [`WorkError::Domain`] for issues outside the bound projects, and the
    /// classified claim errors. Nothing is stored when a claim fails.
    pub async fn add_issues(&self, request: AddIssuesRequest) -> WorkResult<AddIssuesReport> {
        self.config.validate()?;
        let work_key = self
            .work_key(
                request.work_key.as_deref(),
                request.current_dir.as_deref(),
                "add issues",
            )
            .await?;
        let work = self.registry.require_data(&work_key).await?;
        let default_project = work.first_project().ok_or(WorkDomainError::NoProjects)?;
        let requested = self.claims.normalize(&request.issues, default_project)?;
        if requested.is_empty() {
            return Err(WorkDomainError::NoIssues.into());
        }
        ensure_issues_within(&requested, work.projects().iter().map(ProjectBinding::name))?;
        let fresh: Vec<IssueReference> = requested
            .into_iter()
            .filter(|issue| !work.issues().contains(issue))
            .collect();
        if fresh.is_empty() {
            info!(work_key = %work_key, "issues already part of work");
            return Ok(AddIssuesReport {
                work,
                added: Vec::new(),
            });
        }

        let options = ClaimOptions {
            assignee: parse_assignee(request.assignee.as_deref())?,
            comment: request.comment,
            no_auto_assign: request.no_auto_assign,
        };
        let token = self.token()?;
        self.claims
            .verify_available(&token, &fresh, request.no_auto_assign, request.not_closed)
            .await?;
        let caller = self.claims.caller_identity(&token).await?;
        self.claims
            .claim(&token, &fresh, work.branch_name(), &caller, &options)
            .await?;

        let (updated, added) = self.registry.add_issues(&work_key, fresh).await?;
        Ok(AddIssuesReport {
            work: updated,
            added,
        })
    }

    async fn work_key(
        &self,
        explicit: Option<&str>,
        current_dir: Option<&Utf8Path>,
        operation: &'static str,
    ) -> WorkResult<WorkKey> {
        if let Some(key) = explicit {
            return Ok(WorkKey::new(key)?);
        }
        let dir = current_dir.ok_or(WorkError::MissingWorkingContext {
            operation,
            needed: "a work key",
        })?;
        let branch = self
            .ports
            .vcs
            .current_branch(dir)
            .await
            .map_err(|err| WorkError::vcs(dir.to_string(), WorkStep::DetectBranch, err))?;
        Ok(WorkKey::from(&branch))
    }

    fn token(&self) -> WorkResult<AuthToken> {
        Ok(self
            .ports
            .credentials
            .get_token(CredentialPurpose::HostingApi)?)
    }
}

fn parse_projects(raw: &[String]) -> WorkResult<Vec<ProjectName>> {
    raw.iter()
        .map(|name| ProjectName::new(name.as_str()).map_err(WorkError::from))
        .collect()
}

fn parse_assignee(raw: Option<&str>) -> WorkResult<Option<CallerIdentity>> {
    raw.map(CallerIdentity::new)
        .transpose()
        .map_err(WorkError::from)
}

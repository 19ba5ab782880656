//! Structured results of work operations.

use serde::Serialize;

use crate::work::domain::{
    BranchAction, IssueReference, ProjectName, RemoteName, RepoKind, WorkKey, WorkUnit,
};

/// What happened in one repository while starting work.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RepoReport {
    /// Project the repository belongs to.
    pub project: ProjectName,
    /// Remote the work branch is synchronized with.
    pub remote: RemoteName,
    /// Provisioning variant.
    pub kind: RepoKind,
    /// Whether a fork was requested.
    pub fork_created: bool,
    /// Whether the workspace remote was added.
    pub remote_added: bool,
    /// Branch action applied.
    pub action: BranchAction,
}

/// Result of starting work.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StartWorkReport {
    /// The persisted unit of work.
    pub work: WorkUnit,
    /// Per-repository actions in project order.
    pub repositories: Vec<RepoReport>,
}

/// Build result for one project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "message", rename_all = "snake_case")]
pub enum BuildStatus {
    /// The build succeeded.
    Built,
    /// The build failed with the given message.
    Failed(String),
}

/// Build outcome for one project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuildOutcome {
    /// Project that was built.
    pub project: ProjectName,
    /// Result of the build.
    #[serde(flatten)]
    pub status: BuildStatus,
}

impl BuildOutcome {
    /// Returns `true` when the build succeeded.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self.status, BuildStatus::Built)
    }
}

/// Result of building work.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuildWorkReport {
    /// Work that was built.
    pub work_key: WorkKey,
    /// Outcomes in resolved project order.
    pub outcomes: Vec<BuildOutcome>,
}

impl BuildWorkReport {
    /// Returns `true` when every build succeeded.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.outcomes.iter().all(BuildOutcome::is_success)
    }

    /// Returns the projects whose build failed.
    #[must_use]
    pub fn failed_projects(&self) -> Vec<&ProjectName> {
        self.outcomes
            .iter()
            .filter(|outcome| !outcome.is_success())
            .map(|outcome| &outcome.project)
            .collect()
    }
}

/// Result of adding issues to existing work.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AddIssuesReport {
    /// The updated unit of work.
    pub work: WorkUnit,
    /// Issues that were not already part of the work.
    pub added: Vec<IssueReference>,
}

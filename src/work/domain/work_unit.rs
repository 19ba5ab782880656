//! Work-unit aggregate root.

use super::{
    BranchName, IssueReference, ProjectName, WorkDomainError, WorkKey, ensure_issues_within,
};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};

/// A project bound to a unit of work.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectBinding {
    name: ProjectName,
    org: String,
    repo_base_name: String,
}

impl ProjectBinding {
    /// Creates a binding for a project.
    #[must_use]
    pub fn new(name: ProjectName) -> Self {
        let org = name.org().to_owned();
        let repo_base_name = name.repo_base_name().to_owned();
        Self {
            name,
            org,
            repo_base_name,
        }
    }

    /// Returns the project name.
    #[must_use]
    pub const fn name(&self) -> &ProjectName {
        &self.name
    }

    /// Returns the owning organisation.
    #[must_use]
    pub fn org(&self) -> &str {
        &self.org
    }

    /// Returns the repository base name.
    #[must_use]
    pub fn repo_base_name(&self) -> &str {
        &self.repo_base_name
    }
}

/// Parameter object for creating a new unit of work.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewWorkUnit {
    /// Normalized issues; the first one is primary.
    pub issues: Vec<IssueReference>,
    /// Resolved projects in caller order.
    pub projects: Vec<ProjectName>,
    /// Shared work branch.
    pub branch_name: BranchName,
}

impl NewWorkUnit {
    /// Creates the parameter object.
    #[must_use]
    pub const fn new(
        issues: Vec<IssueReference>,
        projects: Vec<ProjectName>,
        branch_name: BranchName,
    ) -> Self {
        Self {
            issues,
            projects,
            branch_name,
        }
    }
}

/// A persisted bundle of issues and projects sharing one work branch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkUnit {
    key: WorkKey,
    description: String,
    issues: Vec<IssueReference>,
    projects: Vec<ProjectBinding>,
    branch_name: BranchName,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl WorkUnit {
    /// Creates a new unit of work.
    ///
    /// The key is the branch name; the description names the primary issue
    /// and the involved projects.
    ///
    /// # Errors
    ///
    /// Returns [`WorkDomainError`] when issues or projects are empty, a
    /// project repeats, or an issue belongs to an unbound project.
    pub fn start(new_unit: NewWorkUnit, clock: &impl Clock) -> Result<Self, WorkDomainError> {
        let NewWorkUnit {
            issues,
            projects,
            branch_name,
        } = new_unit;

        let primary = issues.first().ok_or(WorkDomainError::NoIssues)?;
        if projects.is_empty() {
            return Err(WorkDomainError::NoProjects);
        }
        for (index, project) in projects.iter().enumerate() {
            if projects.iter().take(index).any(|seen| seen == project) {
                return Err(WorkDomainError::DuplicateProject(project.to_string()));
            }
        }
        ensure_issues_within(&issues, &projects)?;

        let description = describe(primary, &projects);
        let mut unique_issues: Vec<IssueReference> = Vec::with_capacity(issues.len());
        for issue in issues {
            if !unique_issues.contains(&issue) {
                unique_issues.push(issue);
            }
        }
        let timestamp = clock.utc();

        Ok(Self {
            key: WorkKey::from(&branch_name),
            description,
            issues: unique_issues,
            projects: projects.into_iter().map(ProjectBinding::new).collect(),
            branch_name,
            created_at: timestamp,
            updated_at: timestamp,
        })
    }

    /// Returns the registry key.
    #[must_use]
    pub const fn key(&self) -> &WorkKey {
        &self.key
    }

    /// Returns the human-readable summary.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Returns the issues, primary first.
    #[must_use]
    pub fn issues(&self) -> &[IssueReference] {
        &self.issues
    }

    /// Returns the project bindings in insertion order.
    #[must_use]
    pub fn projects(&self) -> &[ProjectBinding] {
        &self.projects
    }

    /// Returns the bound project names in insertion order.
    #[must_use]
    pub fn project_names(&self) -> Vec<ProjectName> {
        self.projects
            .iter()
            .map(|binding| binding.name().clone())
            .collect()
    }

    /// Returns the first bound project, used as the default for bare issue
    /// numbers.
    #[must_use]
    pub fn first_project(&self) -> Option<&ProjectName> {
        self.projects.first().map(ProjectBinding::name)
    }

    /// Returns `true` when `project` is bound to this unit.
    #[must_use]
    pub fn contains_project(&self, project: &ProjectName) -> bool {
        self.projects.iter().any(|binding| binding.name() == project)
    }

    /// Returns the shared work branch.
    #[must_use]
    pub const fn branch_name(&self) -> &BranchName {
        &self.branch_name
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the latest modification timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Adds issues to the unit, skipping ones already present.
    ///
    /// Returns the issues that were actually added.
    ///
    /// # Errors
    ///
    /// Returns [`WorkDomainError::IssueOutsideProjects`] when an issue belongs
    /// to a project that is not bound to this unit. No issue is added in
    /// that case.
    pub fn add_issues(
        &mut self,
        issues: impl IntoIterator<Item = IssueReference>,
        clock: &impl Clock,
    ) -> Result<Vec<IssueReference>, WorkDomainError> {
        let candidates: Vec<IssueReference> = issues.into_iter().collect();
        let bound = self.project_names();
        ensure_issues_within(&candidates, &bound)?;

        let mut added = Vec::new();
        for issue in candidates {
            if !self.issues.contains(&issue) {
                self.issues.push(issue.clone());
                added.push(issue);
            }
        }
        if !added.is_empty() {
            self.updated_at = clock.utc();
        }
        Ok(added)
    }
}

fn describe(primary: &IssueReference, projects: &[ProjectName]) -> String {
    let names = projects
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ");
    format!("Work on {primary} in {names}")
}

//! Error types for work-unit domain validation.

use thiserror::Error;

/// Errors returned while constructing work-unit domain values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum WorkDomainError {
    /// The project name does not follow `org/project` format.
    #[error("invalid project name '{0}', expected org/project")]
    InvalidProjectName(String),

    /// The issue reference is neither a bare number nor
    /// `org/project/number`.
    #[error("invalid issue reference '{0}', expected <org>/<project>/<issue number>")]
    InvalidIssueReference(String),

    /// The issue number is invalid.
    #[error("invalid issue number {0}, expected a positive integer")]
    InvalidIssueNumber(u64),

    /// The branch name is not a usable Git ref name.
    #[error("invalid branch name '{0}'")]
    InvalidBranchName(String),

    /// The remote name is not a usable Git remote name.
    #[error("invalid remote name '{0}'")]
    InvalidRemoteName(String),

    /// The work key is empty or contains whitespace.
    #[error("invalid work key '{0}'")]
    InvalidWorkKey(String),

    /// The caller identity is empty after trimming.
    #[error("caller identity must not be empty")]
    EmptyCallerIdentity,

    /// The remote URL pattern could not be compiled.
    #[error("invalid remote URL pattern for repository '{repository}': {reason}")]
    InvalidRemotePattern {
        /// Repository base name the pattern was built for.
        repository: String,
        /// Compiler diagnostic.
        reason: String,
    },

    /// A unit of work was requested without issues.
    #[error("a unit of work requires at least one issue")]
    NoIssues,

    /// A unit of work was requested without projects.
    #[error("a unit of work requires at least one project")]
    NoProjects,

    /// An issue references a project that is not bound to the work.
    #[error("issue {issue} belongs to project '{project}', which is not part of the work")]
    IssueOutsideProjects {
        /// Offending issue reference.
        issue: String,
        /// Project the issue belongs to.
        project: String,
    },

    /// The same project was bound twice.
    #[error("project '{0}' is bound more than once")]
    DuplicateProject(String),
}

//! Domain model for cross-repository units of work.
//!
//! The domain holds the value objects, the branch reconciliation decision
//! table, and the work-unit aggregate. Everything here is pure: external
//! systems are reached only through [`crate::work::ports`].

mod branch;
mod error;
mod ids;
mod issue;
mod repo;
mod work_unit;

pub use branch::{BranchAction, BranchName, BranchPresence, work_branch_name};
pub use error::WorkDomainError;
pub use ids::{AuthToken, CallerIdentity, IssueNumber, ProjectName, RemoteName, WorkKey};
pub use issue::{
    IssueReference, IssueState, IssueStatus, IssueUnavailable, ensure_issues_within,
    normalize_issue_references,
};
pub use repo::{ForkState, RemoteUrlPattern, RepoBinding, RepoKind, RepoVisibility};
pub use work_unit::{NewWorkUnit, ProjectBinding, WorkUnit};

//! Work branch naming and the branch reconciliation decision table.

use super::{IssueReference, WorkDomainError};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Prefix shared by every derived work branch.
const WORK_BRANCH_PREFIX: &str = "work/";

/// Validated Git branch name.
///
/// Branch names must be non-empty, must not contain whitespace, `:` or `..`,
/// and must not start with `-` or end with `/` or `.lock`.
///
/// # Examples
///
///     use liq_work::work::domain::BranchName;
///
///     let name = BranchName::new("work/acme/widgets-42").expect("valid");
///     assert_eq!(name.as_str(), "work/acme/widgets-42");
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct BranchName(String);

impl BranchName {
    /// Creates a validated branch name.
    ///
    /// # Errors
    ///
    /// Returns [`WorkDomainError::InvalidBranchName`] when the value breaks
    /// any of the ref-name constraints above.
    pub fn new(value: impl Into<String>) -> Result<Self, WorkDomainError> {
        let raw = value.into();
        let normalized = raw.trim();

        if Self::is_invalid_branch_name(normalized) {
            return Err(WorkDomainError::InvalidBranchName(raw));
        }

        Ok(Self(normalized.to_owned()))
    }

    fn is_invalid_branch_name(name: &str) -> bool {
        name.is_empty()
            || name.starts_with('-')
            || name.ends_with('/')
            || name.ends_with(".lock")
            || name.contains("..")
            || name.contains(':')
            || name.chars().any(char::is_whitespace)
    }

    /// Returns the branch name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for BranchName {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl TryFrom<String> for BranchName {
    type Error = WorkDomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<BranchName> for String {
    fn from(value: BranchName) -> Self {
        value.0
    }
}

impl fmt::Display for BranchName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Derives the work branch name from the primary issue.
///
/// `acme/widgets/42` becomes `work/acme/widgets-42`. Project segments are
/// restricted to ref-safe characters and never contain `/`, so the result
/// is always valid and distinct issues yield distinct names.
#[must_use]
pub fn work_branch_name(primary_issue: &IssueReference) -> BranchName {
    let project = primary_issue.project();
    BranchName(format!(
        "{WORK_BRANCH_PREFIX}{}/{}-{}",
        project.org(),
        project.repo_base_name(),
        primary_issue.number()
    ))
}

/// Observed presence of the work branch in one repository.
///
/// Derived per repository, consumed once by the reconciler and discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct BranchPresence {
    has_local: bool,
    has_remote: bool,
    tracks_remote: bool,
}

impl BranchPresence {
    /// Creates a presence observation without upstream tracking.
    #[must_use]
    pub const fn new(has_local: bool, has_remote: bool) -> Self {
        Self {
            has_local,
            has_remote,
            tracks_remote: false,
        }
    }

    /// Records whether the local branch already tracks the remote branch.
    ///
    /// Tracking is only meaningful when both branches exist and is ignored
    /// otherwise.
    #[must_use]
    pub const fn with_tracking(mut self, tracks_remote: bool) -> Self {
        self.tracks_remote = tracks_remote && self.has_local && self.has_remote;
        self
    }

    /// Presence after a successful reconciliation: both branches exist and
    /// the local branch tracks the remote one.
    #[must_use]
    pub const fn settled() -> Self {
        Self {
            has_local: true,
            has_remote: true,
            tracks_remote: true,
        }
    }

    /// Returns whether the branch exists locally.
    #[must_use]
    pub const fn has_local(self) -> bool {
        self.has_local
    }

    /// Returns whether the branch exists on the remote.
    #[must_use]
    pub const fn has_remote(self) -> bool {
        self.has_remote
    }

    /// Returns whether the local branch tracks the remote branch.
    #[must_use]
    pub const fn tracks_remote(self) -> bool {
        self.tracks_remote
    }

    /// Returns the presence that results from applying `action`.
    #[must_use]
    pub const fn after(self, action: BranchAction) -> Self {
        match action {
            BranchAction::CreateAndPush | BranchAction::Pull | BranchAction::Push => {
                Self::settled()
            }
            BranchAction::NoOp => self,
        }
    }
}

/// The single synchronizing action chosen for a repository.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BranchAction {
    /// Create the branch locally, then push it upstream with tracking.
    CreateAndPush,
    /// Pull the remote branch with upstream tracking set.
    Pull,
    /// Push the existing local branch upstream with tracking.
    Push,
    /// Local and remote branches are already consistent.
    NoOp,
}

impl BranchAction {
    /// Chooses the action for the observed presence.
    ///
    /// Remote presence dominates: a remote branch is pulled unless the local
    /// branch already exists and tracks it. A local-only branch is pushed.
    /// With neither present the branch is created and pushed.
    #[must_use]
    pub const fn decide(presence: BranchPresence) -> Self {
        if presence.has_remote {
            if presence.has_local && presence.tracks_remote {
                return Self::NoOp;
            }
            return Self::Pull;
        }
        if presence.has_local {
            return Self::Push;
        }
        Self::CreateAndPush
    }

    /// Returns `true` when the action changes local or remote state.
    #[must_use]
    pub const fn is_mutation(self) -> bool {
        !matches!(self, Self::NoOp)
    }

    /// Returns a short label for reports and logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::CreateAndPush => "create_and_push",
            Self::Pull => "pull",
            Self::Push => "push",
            Self::NoOp => "no_op",
        }
    }
}

impl fmt::Display for BranchAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

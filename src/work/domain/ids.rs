//! Identifier and validated scalar types for the work domain.

use super::{BranchName, WorkDomainError};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Returns `true` when a single `org` or `project` segment is usable both as
/// a directory name and inside a derived branch name.
fn is_valid_segment(segment: &str) -> bool {
    !segment.is_empty()
        && !segment.starts_with('.')
        && !segment.contains("..")
        && segment
            .chars()
            .all(|ch| ch.is_ascii_alphanumeric() || matches!(ch, '-' | '_' | '.' | '@'))
}

/// Fully qualified project name in `org/project` format.
///
/// The second segment doubles as the repository base name on the hosting
/// service and as the checkout directory name inside the playground.
///
/// # Examples
///
///     use liq_work::work::domain::ProjectName;
///
///     let name = ProjectName::new("acme/widgets").expect("valid");
///     assert_eq!(name.org(), "acme");
///     assert_eq!(name.repo_base_name(), "widgets");
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ProjectName {
    org: String,
    repo_base_name: String,
}

impl ProjectName {
    /// Creates a validated project name.
    ///
    /// # Errors
    ///
    /// Returns [`WorkDomainError::InvalidProjectName`] if the value does not
    /// contain exactly one slash-delimited `org` and `project` segment.
    pub fn new(value: impl Into<String>) -> Result<Self, WorkDomainError> {
        let raw = value.into();
        let normalized = raw.trim();
        let Some((org, repo_base_name)) = normalized.split_once('/') else {
            return Err(WorkDomainError::InvalidProjectName(raw));
        };
        Self::from_parts(org, repo_base_name).map_err(|_| WorkDomainError::InvalidProjectName(raw))
    }

    /// Creates a project name from its two segments.
    ///
    /// # Errors
    ///
    /// Returns [`WorkDomainError::InvalidProjectName`] when either segment is
    /// empty or contains characters outside `[A-Za-z0-9._@-]`.
    pub fn from_parts(org: &str, repo_base_name: &str) -> Result<Self, WorkDomainError> {
        if !is_valid_segment(org) || !is_valid_segment(repo_base_name) {
            return Err(WorkDomainError::InvalidProjectName(format!(
                "{org}/{repo_base_name}"
            )));
        }
        Ok(Self {
            org: org.to_owned(),
            repo_base_name: repo_base_name.to_owned(),
        })
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

impl fmt::Display for ProjectName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.org, self.repo_base_name)
    }
}

impl TryFrom<String> for ProjectName {
    type Error = WorkDomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ProjectName> for String {
    fn from(value: ProjectName) -> Self {
        value.to_string()
    }
}

/// Positive issue number from the issue tracker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IssueNumber(u64);

impl IssueNumber {
    /// Creates a validated issue number.
    ///
    /// # Errors
    ///
    /// Returns [`WorkDomainError::InvalidIssueNumber`] when the value is zero.
    pub const fn new(value: u64) -> Result<Self, WorkDomainError> {
        if value == 0 {
            return Err(WorkDomainError::InvalidIssueNumber(value));
        }
        Ok(Self(value))
    }

    /// Returns the underlying numeric value.
    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for IssueNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Registry key identifying a unit of work.
///
/// Keys are derived from the work branch name, so the current branch of any
/// involved checkout implies the work it belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct WorkKey(String);

impl WorkKey {
    /// Creates a validated work key.
    ///
    /// # Errors
    ///
    /// Returns [`WorkDomainError::InvalidWorkKey`] when the value is empty or
    /// contains whitespace.
    pub fn new(value: impl Into<String>) -> Result<Self, WorkDomainError> {
        let raw = value.into();
        let normalized = raw.trim();
        if normalized.is_empty() || normalized.chars().any(char::is_whitespace) {
            return Err(WorkDomainError::InvalidWorkKey(raw));
        }
        Ok(Self(normalized.to_owned()))
    }

    /// Returns the key as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&BranchName> for WorkKey {
    fn from(branch: &BranchName) -> Self {
        Self(branch.as_str().to_owned())
    }
}

impl TryFrom<String> for WorkKey {
    type Error = WorkDomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<WorkKey> for String {
    fn from(value: WorkKey) -> Self {
        value.0
    }
}

impl fmt::Display for WorkKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Name of a Git remote configured in a local checkout.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RemoteName(String);

impl RemoteName {
    /// Name of the conventional upstream remote.
    pub const ORIGIN: &'static str = "origin";

    /// Name of the remote pointing at a personal fork.
    pub const WORKSPACE: &'static str = "workspace";

    /// Creates a validated remote name.
    ///
    /// # Errors
    ///
    /// Returns [`WorkDomainError::InvalidRemoteName`] when the value is empty,
    /// contains whitespace, or starts with a dash.
    pub fn new(value: impl Into<String>) -> Result<Self, WorkDomainError> {
        let raw = value.into();
        let normalized = raw.trim();
        if normalized.is_empty()
            || normalized.starts_with('-')
            || normalized.chars().any(char::is_whitespace)
        {
            return Err(WorkDomainError::InvalidRemoteName(raw));
        }
        Ok(Self(normalized.to_owned()))
    }

    /// Returns the `origin` remote name.
    #[must_use]
    pub fn origin() -> Self {
        Self(Self::ORIGIN.to_owned())
    }

    /// Returns the default workspace remote name.
    #[must_use]
    pub fn workspace() -> Self {
        Self(Self::WORKSPACE.to_owned())
    }

    /// Returns the remote name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for RemoteName {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl TryFrom<String> for RemoteName {
    type Error = WorkDomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<RemoteName> for String {
    fn from(value: RemoteName) -> Self {
        value.0
    }
}

impl fmt::Display for RemoteName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Login of the authenticated caller on the hosting service.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CallerIdentity(String);

impl CallerIdentity {
    /// Creates a caller identity.
    ///
    /// # Errors
    ///
    /// Returns [`WorkDomainError::EmptyCallerIdentity`] when the value is
    /// empty after trimming.
    pub fn new(value: impl Into<String>) -> Result<Self, WorkDomainError> {
        let raw = value.into();
        let normalized = raw.trim();
        if normalized.is_empty() {
            return Err(WorkDomainError::EmptyCallerIdentity);
        }
        Ok(Self(normalized.to_owned()))
    }

    /// Returns the login as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for CallerIdentity {
    type Error = WorkDomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<CallerIdentity> for String {
    fn from(value: CallerIdentity) -> Self {
        value.0
    }
}

impl fmt::Display for CallerIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Opaque API token handed to the issue tracker.
///
/// The value never appears in `Debug` output.
#[derive(Clone, PartialEq, Eq)]
pub struct AuthToken(String);

impl AuthToken {
    /// Wraps a raw token value.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Returns the raw token for transmission.
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AuthToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AuthToken(***)")
    }
}

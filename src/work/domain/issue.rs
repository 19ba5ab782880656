//! Issue references, normalization, and claim availability rules.

use super::{CallerIdentity, IssueNumber, ProjectName, WorkDomainError};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Fully qualified issue reference in `org/project/number` format.
///
/// # Examples
///
///     use liq_work::work::domain::IssueReference;
///
///     let issue = IssueReference::parse("acme/widgets/42").expect("valid");
///     assert_eq!(issue.project().to_string(), "acme/widgets");
///     assert_eq!(issue.number().value(), 42);
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct IssueReference {
    project: ProjectName,
    number: IssueNumber,
}

impl IssueReference {
    /// Creates an issue reference from validated components.
    #[must_use]
    pub const fn new(project: ProjectName, number: IssueNumber) -> Self {
        Self { project, number }
    }

    /// Parses a fully qualified `org/project/number` reference.
    ///
    /// # Errors
    ///
    /// Returns [`WorkDomainError::InvalidIssueReference`] when the value is
    /// not fully qualified or the number is not a positive integer.
    pub fn parse(value: &str) -> Result<Self, WorkDomainError> {
        let invalid = || WorkDomainError::InvalidIssueReference(value.to_owned());
        let trimmed = value.trim();
        let (raw_project, raw_number) = trimmed.rsplit_once('/').ok_or_else(invalid)?;
        let project = ProjectName::new(raw_project).map_err(|_| invalid())?;
        let number = parse_issue_number(raw_number).ok_or_else(invalid)?;
        Ok(Self::new(project, number))
    }

    /// Normalizes a raw reference against the default project.
    ///
    /// Bare integers are rewritten to `<default_project>/<number>`; anything
    /// else must already be fully qualified. Normalizing a normalized
    /// reference returns it unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`WorkDomainError::InvalidIssueReference`] when the value is
    /// neither a bare number nor fully qualified.
    pub fn normalize(raw: &str, default_project: &ProjectName) -> Result<Self, WorkDomainError> {
        let trimmed = raw.trim();
        if !trimmed.is_empty() && trimmed.chars().all(|ch| ch.is_ascii_digit()) {
            let number = parse_issue_number(trimmed)
                .ok_or_else(|| WorkDomainError::InvalidIssueReference(raw.to_owned()))?;
            return Ok(Self::new(default_project.clone(), number));
        }
        Self::parse(trimmed)
    }

    /// Returns the project the issue belongs to.
    #[must_use]
    pub const fn project(&self) -> &ProjectName {
        &self.project
    }

    /// Returns the issue number.
    #[must_use]
    pub const fn number(&self) -> IssueNumber {
        self.number
    }
}

fn parse_issue_number(value: &str) -> Option<IssueNumber> {
    value
        .parse::<u64>()
        .ok()
        .and_then(|number| IssueNumber::new(number).ok())
}

impl fmt::Display for IssueReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.project, self.number)
    }
}

impl TryFrom<String> for IssueReference {
    type Error = WorkDomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<IssueReference> for String {
    fn from(value: IssueReference) -> Self {
        value.to_string()
    }
}

/// Normalizes raw issue references, dropping repeats in first-seen order.
///
/// # Errors
///
/// Returns the first [`WorkDomainError::InvalidIssueReference`] encountered.
pub fn normalize_issue_references(
    raw: &[String],
    default_project: &ProjectName,
) -> Result<Vec<IssueReference>, WorkDomainError> {
    let mut normalized: Vec<IssueReference> = Vec::with_capacity(raw.len());
    for value in raw {
        let issue = IssueReference::normalize(value, default_project)?;
        if !normalized.contains(&issue) {
            normalized.push(issue);
        }
    }
    Ok(normalized)
}

/// Verifies that every issue belongs to one of the given projects.
///
/// # Errors
///
/// Returns [`WorkDomainError::IssueOutsideProjects`] for the first issue
/// whose project is not listed.
pub fn ensure_issues_within<'a>(
    issues: &[IssueReference],
    projects: impl IntoIterator<Item = &'a ProjectName> + Clone,
) -> Result<(), WorkDomainError> {
    for issue in issues {
        let is_bound = projects
            .clone()
            .into_iter()
            .any(|project| project == issue.project());
        if !is_bound {
            return Err(WorkDomainError::IssueOutsideProjects {
                issue: issue.to_string(),
                project: issue.project().to_string(),
            });
        }
    }
    Ok(())
}

/// Open/closed state of an issue on the tracker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueState {
    /// Issue is open.
    Open,
    /// Issue is closed.
    Closed,
}

/// Tracker-side status consulted before claiming an issue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssueStatus {
    state: IssueState,
    assignees: Vec<CallerIdentity>,
}

impl IssueStatus {
    /// Creates an open, unassigned issue status.
    #[must_use]
    pub const fn open() -> Self {
        Self {
            state: IssueState::Open,
            assignees: Vec::new(),
        }
    }

    /// Creates a closed, unassigned issue status.
    #[must_use]
    pub const fn closed() -> Self {
        Self {
            state: IssueState::Closed,
            assignees: Vec::new(),
        }
    }

    /// Sets the current assignees.
    #[must_use]
    pub fn with_assignees(mut self, assignees: impl IntoIterator<Item = CallerIdentity>) -> Self {
        self.assignees = assignees.into_iter().collect();
        self
    }

    /// Returns the issue state.
    #[must_use]
    pub const fn state(&self) -> IssueState {
        self.state
    }

    /// Returns the current assignees.
    #[must_use]
    pub fn assignees(&self) -> &[CallerIdentity] {
        &self.assignees
    }

    /// Adds an assignee unless already present.
    pub fn assign(&mut self, assignee: CallerIdentity) {
        if !self.assignees.contains(&assignee) {
            self.assignees.push(assignee);
        }
    }

    /// Checks whether `caller` may claim the issue.
    ///
    /// A closed issue is rejected when `not_closed` is requested. An issue
    /// assigned to anyone other than the caller is rejected unless
    /// auto-assignment is suppressed.
    ///
    /// # Errors
    ///
    /// Returns the [`IssueUnavailable`] reason for the rejection.
    pub fn check_available(
        &self,
        issue: &IssueReference,
        caller: &CallerIdentity,
        no_auto_assign: bool,
        not_closed: bool,
    ) -> Result<(), IssueUnavailable> {
        if not_closed && self.state == IssueState::Closed {
            return Err(IssueUnavailable::Closed(issue.clone()));
        }
        let assigned_elsewhere =
            !self.assignees.is_empty() && !self.assignees.contains(caller);
        if !no_auto_assign && assigned_elsewhere {
            return Err(IssueUnavailable::AssignedElsewhere {
                issue: issue.clone(),
                assignees: self
                    .assignees
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join(", "),
            });
        }
        Ok(())
    }
}

/// Reason an issue cannot be claimed.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum IssueUnavailable {
    /// The issue is closed.
    #[error("issue {0} is closed")]
    Closed(IssueReference),

    /// The issue is already assigned to someone else.
    #[error("issue {issue} is already assigned to {assignees}")]
    AssignedElsewhere {
        /// Issue that was checked.
        issue: IssueReference,
        /// Comma-separated current assignees.
        assignees: String,
    },
}

impl IssueUnavailable {
    /// Returns the issue the rejection is about.
    #[must_use]
    pub const fn issue(&self) -> &IssueReference {
        match self {
            Self::Closed(issue) | Self::AssignedElsewhere { issue, .. } => issue,
        }
    }
}

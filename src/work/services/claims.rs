//! Issue normalization, availability checks, and claims.

use std::sync::Arc;
use tracing::{debug, info};

use super::{WorkError, WorkResult, WorkStep};
use crate::work::{
    config::WorkConfig,
    domain::{
        AuthToken, BranchName, CallerIdentity, IssueReference, ProjectName,
        normalize_issue_references,
    },
    ports::{IssueClaim, IssueTracker},
};

/// Caller preferences for claiming issues.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClaimOptions {
    /// Explicit assignee; defaults to the caller unless auto-assignment is
    /// suppressed.
    pub assignee: Option<CallerIdentity>,
    /// Explicit comment; defaults to the configured claim comment.
    pub comment: Option<String>,
    /// Leave issues unassigned unless an assignee is given.
    pub no_auto_assign: bool,
}

/// Coordinates issue claims with the issue tracker.
#[derive(Clone)]
pub struct IssueClaimCoordinator {
    tracker: Arc<dyn IssueTracker>,
    config: Arc<WorkConfig>,
}

impl IssueClaimCoordinator {
    /// Creates a coordinator.
    #[must_use]
    pub const fn new(tracker: Arc<dyn IssueTracker>, config: Arc<WorkConfig>) -> Self {
        Self { tracker, config }
    }

    /// Normalizes raw references, qualifying bare numbers with
    /// `default_project`.
    ///
    /// # Errors
    ///
    /// Returns [`WorkError::Domain`] for malformed references.
    pub fn normalize(
        &self,
        raw: &[String],
        default_project: &ProjectName,
    ) -> WorkResult<Vec<IssueReference>> {
        Ok(normalize_issue_references(raw, default_project)?)
    }

    /// Verifies every issue may be claimed; nothing is claimed on failure.
    ///
    /// # Errors
    ///
    /// Returns [`WorkError::IssueUnavailable`], [`WorkError::IssueNotFound`],
    /// or a fatal [`WorkError::IssueTracker`].
    pub async fn verify_available(
        &self,
        token: &AuthToken,
        issues: &[IssueReference],
        no_auto_assign: bool,
        not_closed: bool,
    ) -> WorkResult<()> {
        debug!(issues = issues.len(), no_auto_assign, not_closed, "verifying issues");
        self.tracker
            .verify_issues_available(token, issues, no_auto_assign, not_closed)
            .await
            .map_err(|err| WorkError::issue_tracker(WorkStep::VerifyIssues, err))
    }

    /// Returns the login owning `token`.
    ///
    /// # Errors
    ///
    /// Returns a fatal [`WorkError::IssueTracker`] when the lookup fails.
    pub async fn caller_identity(&self, token: &AuthToken) -> WorkResult<CallerIdentity> {
        self.tracker
            .determine_caller_identity(token)
            .await
            .map_err(|err| WorkError::issue_tracker(WorkStep::IdentifyCaller, err))
    }

    /// Claims `issues` for work on `branch`.
    ///
    /// Returns the claim that was submitted.
    ///
    /// # Errors
    ///
    /// Returns [`WorkError::Config`] when the default comment cannot be
    /// rendered, or the classified tracker failure.
    pub async fn claim(
        &self,
        token: &AuthToken,
        issues: &[IssueReference],
        branch: &BranchName,
        caller: &CallerIdentity,
        options: &ClaimOptions,
    ) -> WorkResult<IssueClaim> {
        let comment = options
            .comment
            .clone()
            .map_or_else(|| self.config.claim_comment(branch.as_str()), Ok)?;
        let claim = IssueClaim {
            issues: issues.to_vec(),
            assignee: default_assignee(options, caller),
            comment,
        };

        info!(
            issues = %join(&claim.issues),
            assignee = claim.assignee.as_ref().map_or("", CallerIdentity::as_str),
            branch = %branch,
            "claiming issues"
        );
        self.tracker
            .claim_issues(token, &claim)
            .await
            .map_err(|err| WorkError::issue_tracker(WorkStep::ClaimIssues, err))?;
        Ok(claim)
    }
}

fn default_assignee(options: &ClaimOptions, caller: &CallerIdentity) -> Option<CallerIdentity> {
    options
        .assignee
        .clone()
        .or_else(|| (!options.no_auto_assign).then(|| caller.clone()))
}

fn join(issues: &[IssueReference]) -> String {
    issues
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

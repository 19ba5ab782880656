//! Issue tracker port for availability checks and issue claims.

use crate::work::domain::{AuthToken, CallerIdentity, IssueReference, IssueUnavailable};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for issue tracker operations.
pub type IssueTrackerResult<T> = Result<T, IssueTrackerError>;

/// Claim submitted to the issue tracker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssueClaim {
    /// Issues being claimed.
    pub issues: Vec<IssueReference>,
    /// Login added to each issue's assignees, if any.
    pub assignee: Option<CallerIdentity>,
    /// Comment posted on each issue.
    pub comment: String,
}

/// Issue tracker contract.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait IssueTracker: Send + Sync {
    /// Verifies that every issue may be claimed by the token's owner.
    ///
    /// # Errors
    ///
    /// Returns [`IssueTrackerError::Unavailable`] for the first issue that is
    /// closed (when `not_closed` is set) or assigned elsewhere (unless
    /// `no_auto_assign` is set), and [`IssueTrackerError::NotFound`] for an
    /// unknown issue.
    async fn verify_issues_available(
        &self,
        token: &AuthToken,
        issues: &[IssueReference],
        no_auto_assign: bool,
        not_closed: bool,
    ) -> IssueTrackerResult<()>;

    /// Assigns and comments on every issue in the claim.
    async fn claim_issues(&self, token: &AuthToken, claim: &IssueClaim)
    -> IssueTrackerResult<()>;

    /// Returns the login that owns the token.
    async fn determine_caller_identity(&self, token: &AuthToken)
    -> IssueTrackerResult<CallerIdentity>;
}

/// Errors returned by issue tracker adapters.
#[derive(Debug, Clone, Error)]
pub enum IssueTrackerError {
    /// The issue cannot be claimed.
    #[error(transparent)]
    Unavailable(#[from] IssueUnavailable),

    /// The issue does not exist.
    #[error("issue not found: {0}")]
    NotFound(IssueReference),

    /// Transport or API failure.
    #[error("issue tracker error: {0}")]
    Transport(Arc<dyn std::error::Error + Send + Sync>),
}

impl IssueTrackerError {
    /// Wraps a transport error.
    pub fn transport(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Transport(Arc::new(err))
    }
}

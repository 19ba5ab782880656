//! In-memory issue tracker for orchestration tests.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::work::{
    domain::{AuthToken, CallerIdentity, IssueReference, IssueStatus},
    ports::{IssueClaim, IssueTracker, IssueTrackerError, IssueTrackerResult},
};

/// Thread-safe in-memory issue tracker.
///
/// Every token belongs to the single configured caller. Claims are recorded
/// and applied to the stored issue assignees.
#[derive(Debug, Clone)]
pub struct InMemoryIssueTracker {
    state: Arc<RwLock<InMemoryIssueTrackerState>>,
}

#[derive(Debug)]
struct InMemoryIssueTrackerState {
    caller: CallerIdentity,
    issues: HashMap<IssueReference, IssueStatus>,
    claims: Vec<IssueClaim>,
}

fn lock_error(err: impl ToString) -> IssueTrackerError {
    IssueTrackerError::transport(std::io::Error::other(err.to_string()))
}

impl InMemoryIssueTracker {
    /// Creates a tracker whose tokens all belong to `caller`.
    #[must_use]
    pub fn new(caller: CallerIdentity) -> Self {
        Self {
            state: Arc::new(RwLock::new(InMemoryIssueTrackerState {
                caller,
                issues: HashMap::new(),
                claims: Vec::new(),
            })),
        }
    }

    /// Registers or replaces an issue.
    ///
    /// # Errors
    ///
    /// Returns a transport error when lock acquisition fails.
    pub fn insert_issue(
        &self,
        issue: IssueReference,
        status: IssueStatus,
    ) -> IssueTrackerResult<()> {
        let mut state = self.state.write().map_err(lock_error)?;
        state.issues.insert(issue, status);
        Ok(())
    }

    /// Returns the current status of an issue.
    ///
    /// # Errors
    ///
    /// Returns a transport error when lock acquisition fails.
    pub fn status(&self, issue: &IssueReference) -> IssueTrackerResult<Option<IssueStatus>> {
        let state = self.state.read().map_err(lock_error)?;
        Ok(state.issues.get(issue).cloned())
    }

    /// Returns every claim received, oldest first.
    ///
    /// # Errors
    ///
    /// Returns a transport error when lock acquisition fails.
    pub fn claims(&self) -> IssueTrackerResult<Vec<IssueClaim>> {
        let state = self.state.read().map_err(lock_error)?;
        Ok(state.claims.clone())
    }
}

#[async_trait]
impl IssueTracker for InMemoryIssueTracker {
    async fn verify_issues_available(
        &self,
        _token: &AuthToken,
        issues: &[IssueReference],
        no_auto_assign: bool,
        not_closed: bool,
    ) -> IssueTrackerResult<()> {
        let state = self.state.read().map_err(lock_error)?;
        for issue in issues {
            let status = state
                .issues
                .get(issue)
                .ok_or_else(|| IssueTrackerError::NotFound(issue.clone()))?;
            status.check_available(issue, &state.caller, no_auto_assign, not_closed)?;
        }
        Ok(())
    }

    async fn claim_issues(
        &self,
        _token: &AuthToken,
        claim: &IssueClaim,
    ) -> IssueTrackerResult<()> {
        let mut state = self.state.write().map_err(lock_error)?;
        if let Some(missing) = claim
            .issues
            .iter()
            .find(|issue| !state.issues.contains_key(issue))
        {
            return Err(IssueTrackerError::NotFound(missing.clone()));
        }
        if let Some(assignee) = &claim.assignee {
            for issue in &claim.issues {
                if let Some(status) = state.issues.get_mut(issue) {
                    status.assign(assignee.clone());
                }
            }
        }
        state.claims.push(claim.clone());
        Ok(())
    }

    async fn determine_caller_identity(
        &self,
        _token: &AuthToken,
    ) -> IssueTrackerResult<CallerIdentity> {
        let state = self.state.read().map_err(lock_error)?;
        Ok(state.caller.clone())
    }
}

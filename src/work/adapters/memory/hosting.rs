//! In-memory hosting service for orchestration tests.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, RwLock};

use crate::work::{
    domain::{BranchName, CallerIdentity, RepoVisibility},
    ports::{HostingError, HostingResult, HostingService, RepositoryDetails},
};

/// Hosting operations that can be made to fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HostingOperation {
    /// Repository lookup.
    GetRepository,
    /// Fork lookup.
    GetFork,
    /// Fork creation.
    CreateFork,
    /// Remote branch lookup.
    GetBranch,
}

/// A fork request received by the in-memory hosting service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForkRequest {
    /// Organisation owning the source repository.
    pub org: String,
    /// Repository base name.
    pub repo: String,
    /// Login the fork was requested for.
    pub target: CallerIdentity,
}

/// Thread-safe in-memory hosting service.
///
/// Fork creation registers the fork as a public repository immediately.
#[derive(Debug, Clone, Default)]
pub struct InMemoryHostingService {
    state: Arc<RwLock<InMemoryHostingState>>,
}

#[derive(Debug, Default)]
struct InMemoryHostingState {
    repositories: HashMap<(String, String), RepoVisibility>,
    branches: HashSet<(String, String, BranchName)>,
    fork_requests: Vec<ForkRequest>,
    failing: HashSet<HostingOperation>,
}

fn lock_error(err: impl ToString) -> HostingError {
    HostingError::transport(std::io::Error::other(err.to_string()))
}

impl InMemoryHostingService {
    /// Creates an empty hosting service.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `owner/repo` with the given visibility.
    ///
    /// # Errors
    ///
    /// Returns a transport error when lock acquisition fails.
    pub fn add_repository(
        &self,
        owner: &str,
        repo: &str,
        visibility: RepoVisibility,
    ) -> HostingResult<()> {
        let mut state = self.state.write().map_err(lock_error)?;
        state
            .repositories
            .insert((owner.to_owned(), repo.to_owned()), visibility);
        Ok(())
    }

    /// Registers `branch` on `owner/repo`.
    ///
    /// # Errors
    ///
    /// Returns a transport error when lock acquisition fails.
    pub fn add_branch(&self, owner: &str, repo: &str, branch: BranchName) -> HostingResult<()> {
        let mut state = self.state.write().map_err(lock_error)?;
        state
            .branches
            .insert((owner.to_owned(), repo.to_owned(), branch));
        Ok(())
    }

    /// Makes every later call of `operation` fail with a transport error.
    ///
    /// # Errors
    ///
    /// Returns a transport error when lock acquisition fails.
    pub fn fail_operation(&self, operation: HostingOperation) -> HostingResult<()> {
        let mut state = self.state.write().map_err(lock_error)?;
        state.failing.insert(operation);
        Ok(())
    }

    /// Returns the fork requests received, oldest first.
    ///
    /// # Errors
    ///
    /// Returns a transport error when lock acquisition fails.
    pub fn fork_requests(&self) -> HostingResult<Vec<ForkRequest>> {
        let state = self.state.read().map_err(lock_error)?;
        Ok(state.fork_requests.clone())
    }
}

impl InMemoryHostingState {
    fn check(&self, operation: HostingOperation) -> HostingResult<()> {
        if self.failing.contains(&operation) {
            return Err(HostingError::transport(std::io::Error::other(format!(
                "injected {operation:?} failure"
            ))));
        }
        Ok(())
    }

    fn repository(&self, owner: &str, repo: &str) -> HostingResult<RepositoryDetails> {
        self.repositories
            .get(&(owner.to_owned(), repo.to_owned()))
            .map(|visibility| RepositoryDetails {
                visibility: *visibility,
            })
            .ok_or_else(|| HostingError::NotFound(format!("repository {owner}/{repo}")))
    }
}

#[async_trait]
impl HostingService for InMemoryHostingService {
    async fn get_repository(&self, owner: &str, repo: &str) -> HostingResult<RepositoryDetails> {
        let state = self.state.read().map_err(lock_error)?;
        state.check(HostingOperation::GetRepository)?;
        state.repository(owner, repo)
    }

    async fn get_fork(
        &self,
        owner: &CallerIdentity,
        repo: &str,
    ) -> HostingResult<RepositoryDetails> {
        let state = self.state.read().map_err(lock_error)?;
        state.check(HostingOperation::GetFork)?;
        state.repository(owner.as_str(), repo)
    }

    async fn create_fork(
        &self,
        org: &str,
        repo: &str,
        target: &CallerIdentity,
    ) -> HostingResult<()> {
        let mut state = self.state.write().map_err(lock_error)?;
        state.check(HostingOperation::CreateFork)?;
        state.repository(org, repo)?;
        state.fork_requests.push(ForkRequest {
            org: org.to_owned(),
            repo: repo.to_owned(),
            target: target.clone(),
        });
        state.repositories.insert(
            (target.as_str().to_owned(), repo.to_owned()),
            RepoVisibility::Public,
        );
        Ok(())
    }

    async fn get_branch(&self, owner: &str, repo: &str, branch: &BranchName) -> HostingResult<()> {
        let state = self.state.read().map_err(lock_error)?;
        state.check(HostingOperation::GetBranch)?;
        let key = (owner.to_owned(), repo.to_owned(), branch.clone());
        if state.branches.contains(&key) {
            Ok(())
        } else {
            Err(HostingError::NotFound(format!(
                "branch {branch} on {owner}/{repo}"
            )))
        }
    }
}

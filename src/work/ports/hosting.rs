//! Hosting-service port for repository, fork, and remote branch lookups.

use crate::work::domain::{BranchName, CallerIdentity, RepoVisibility};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for hosting-service operations.
pub type HostingResult<T> = Result<T, HostingError>;

/// Repository details returned by the hosting service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RepositoryDetails {
    /// Repository visibility.
    pub visibility: RepoVisibility,
}

/// Hosting-service contract.
///
/// Lookups report absence as [`HostingError::NotFound`], mirroring an HTTP
/// 404; callers decide whether absence is an error.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait HostingService: Send + Sync {
    /// Looks up `owner/repo`.
    async fn get_repository(&self, owner: &str, repo: &str)
    -> HostingResult<RepositoryDetails>;

    /// Looks up the caller's fork of `repo`.
    async fn get_fork(&self, owner: &CallerIdentity, repo: &str)
    -> HostingResult<RepositoryDetails>;

    /// Requests a fork of `org/repo` under `target`.
    ///
    /// Returns once the request is acknowledged; the fork may still be
    /// materialising.
    async fn create_fork(&self, org: &str, repo: &str, target: &CallerIdentity)
    -> HostingResult<()>;

    /// Succeeds when `branch` exists on `owner/repo`.
    async fn get_branch(&self, owner: &str, repo: &str, branch: &BranchName)
    -> HostingResult<()>;
}

/// Errors returned by hosting-service adapters.
#[derive(Debug, Clone, Error)]
pub enum HostingError {
    /// The requested resource does not exist or is not visible.
    #[error("not found: {0}")]
    NotFound(String),

    /// Transport or API failure.
    #[error("hosting service error: {0}")]
    Transport(Arc<dyn std::error::Error + Send + Sync>),
}

impl HostingError {
    /// Wraps a transport error.
    pub fn transport(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Transport(Arc::new(err))
    }

    /// Returns `true` for a lookup miss.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

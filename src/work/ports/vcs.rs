//! Local version-control port operating on checkouts inside the playground.

use crate::work::domain::{BranchName, RemoteName};
use async_trait::async_trait;
use camino::{Utf8Path, Utf8PathBuf};
use std::sync::Arc;
use thiserror::Error;

/// Result type for local VCS operations.
pub type VcsResult<T> = Result<T, VcsError>;

/// Local checkout contract.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LocalVcs: Send + Sync {
    /// Returns whether `branch` exists in the checkout.
    async fn has_local_branch(&self, path: &Utf8Path, branch: &BranchName) -> VcsResult<bool>;

    /// Returns the URL of `remote`, or `None` when no such remote exists.
    async fn remote_url(&self, path: &Utf8Path, remote: &RemoteName)
    -> VcsResult<Option<String>>;

    /// Adds `remote` pointing at `url`.
    async fn add_remote(&self, path: &Utf8Path, remote: &RemoteName, url: &str)
    -> VcsResult<()>;

    /// Returns the remote holding the main line, normally `origin`.
    async fn determine_origin_and_main(&self, path: &Utf8Path) -> VcsResult<RemoteName>;

    /// Returns the upstream of `branch` as `remote/branch`, if configured.
    async fn upstream_of(&self, path: &Utf8Path, branch: &BranchName)
    -> VcsResult<Option<String>>;

    /// Returns the checked-out branch.
    async fn current_branch(&self, path: &Utf8Path) -> VcsResult<BranchName>;

    /// Creates `branch` locally and pushes it to `remote` with tracking.
    async fn create_and_push_branch(
        &self,
        path: &Utf8Path,
        remote: &RemoteName,
        branch: &BranchName,
    ) -> VcsResult<()>;

    /// Pulls `branch` from `remote` with tracking, creating it locally when
    /// absent.
    async fn pull_branch(
        &self,
        path: &Utf8Path,
        remote: &RemoteName,
        branch: &BranchName,
    ) -> VcsResult<()>;

    /// Pushes the existing local `branch` to `remote` with tracking.
    async fn push_branch(
        &self,
        path: &Utf8Path,
        remote: &RemoteName,
        branch: &BranchName,
    ) -> VcsResult<()>;
}

/// Errors returned by local VCS adapters.
#[derive(Debug, Clone, Error)]
pub enum VcsError {
    /// The path is not a known checkout.
    #[error("not a git repository: {0}")]
    NotARepository(Utf8PathBuf),

    /// A VCS command exited unsuccessfully.
    #[error("`{command}` failed: {stderr}")]
    CommandFailed {
        /// Command line that was run.
        command: String,
        /// Captured standard error.
        stderr: String,
    },

    /// The VCS output could not be interpreted.
    #[error("unexpected output from `{command}`: {output}")]
    UnexpectedOutput {
        /// Command line that was run.
        command: String,
        /// Offending output.
        output: String,
    },

    /// The VCS process could not be run.
    #[error("failed to run git: {0}")]
    Io(Arc<dyn std::error::Error + Send + Sync>),
}

impl VcsError {
    /// Wraps a process or I/O error.
    pub fn io(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Io(Arc::new(err))
    }
}

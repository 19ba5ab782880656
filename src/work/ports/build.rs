//! Port for the external per-project build step.

use crate::work::domain::ProjectName;
use async_trait::async_trait;
use camino::Utf8Path;
use std::sync::Arc;
use thiserror::Error;

/// Result type for build invocations.
pub type BuildResult<T> = Result<T, BuildError>;

/// Build step contract.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BuildRunner: Send + Sync {
    /// Builds the project checked out at `path`.
    async fn build(&self, project: &ProjectName, path: &Utf8Path) -> BuildResult<()>;
}

/// Errors returned by build runners.
#[derive(Debug, Clone, Error)]
pub enum BuildError {
    /// The build ran and failed.
    #[error("build failed ({status}): {output}")]
    Failed {
        /// Exit status description.
        status: String,
        /// Tail of the build output.
        output: String,
    },

    /// The build could not be started.
    #[error("failed to start build: {0}")]
    Spawn(Arc<dyn std::error::Error + Send + Sync>),
}

impl BuildError {
    /// Wraps a spawn error.
    pub fn spawn(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Spawn(Arc::new(err))
    }
}

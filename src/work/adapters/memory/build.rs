//! In-memory build runner.

use async_trait::async_trait;
use camino::Utf8Path;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::work::{
    domain::ProjectName,
    ports::{BuildError, BuildResult, BuildRunner},
};

/// Build runner that records invocations and fails on demand.
#[derive(Debug, Clone, Default)]
pub struct InMemoryBuildRunner {
    state: Arc<RwLock<InMemoryBuildState>>,
}

#[derive(Debug, Default)]
struct InMemoryBuildState {
    builds: Vec<ProjectName>,
    failures: HashMap<ProjectName, String>,
}

fn lock_error(err: impl ToString) -> BuildError {
    BuildError::spawn(std::io::Error::other(err.to_string()))
}

impl InMemoryBuildRunner {
    /// Creates a runner where every build succeeds.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes builds of `project` fail with `output`.
    ///
    /// # Errors
    ///
    /// Returns a spawn error when lock acquisition fails.
    pub fn fail_project(&self, project: ProjectName, output: impl Into<String>) -> BuildResult<()> {
        let mut state = self.state.write().map_err(lock_error)?;
        state.failures.insert(project, output.into());
        Ok(())
    }

    /// Returns the projects built so far, in invocation order.
    ///
    /// # Errors
    ///
    /// Returns a spawn error when lock acquisition fails.
    pub fn builds(&self) -> BuildResult<Vec<ProjectName>> {
        let state = self.state.read().map_err(lock_error)?;
        Ok(state.builds.clone())
    }
}

#[async_trait]
impl BuildRunner for InMemoryBuildRunner {
    async fn build(&self, project: &ProjectName, _path: &Utf8Path) -> BuildResult<()> {
        let mut state = self.state.write().map_err(lock_error)?;
        state.builds.push(project.clone());
        state
            .failures
            .get(project)
            .map_or(Ok(()), |output| {
                Err(BuildError::Failed {
                    status: "exit status: 1".to_owned(),
                    output: output.clone(),
                })
            })
    }
}

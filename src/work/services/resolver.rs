//! Project scope resolution for work operations.

use camino::Utf8PathBuf;
use std::sync::Arc;
use tracing::debug;

use super::{WorkError, WorkResult};
use crate::work::{
    config::WorkConfig,
    domain::{ProjectName, WorkUnit},
    ports::ProjectCatalog,
};

/// Caller input selecting projects.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectSelection {
    /// Explicitly named projects, possibly repeated.
    pub projects: Vec<ProjectName>,
    /// Select every project bound to the work.
    pub all: bool,
    /// Caller's working directory, used to infer a project.
    pub current_dir: Option<Utf8PathBuf>,
}

impl ProjectSelection {
    /// Selects the given projects.
    #[must_use]
    pub fn explicit(projects: impl IntoIterator<Item = ProjectName>) -> Self {
        Self {
            projects: projects.into_iter().collect(),
            ..Self::default()
        }
    }

    /// Selects every project bound to the work.
    #[must_use]
    pub fn all() -> Self {
        Self {
            all: true,
            ..Self::default()
        }
    }

    /// Sets the working directory used for inference.
    #[must_use]
    pub fn with_current_dir(mut self, current_dir: impl Into<Utf8PathBuf>) -> Self {
        self.current_dir = Some(current_dir.into());
        self
    }
}

/// What selected projects are validated against.
#[derive(Clone, Copy)]
pub enum ProjectScope<'a> {
    /// Projects bound to an existing unit of work.
    Work(&'a WorkUnit),
    /// Locally available projects, used before any work exists.
    Candidates(&'a dyn ProjectCatalog),
}

/// Resolves which projects an operation applies to.
#[derive(Debug, Clone)]
pub struct ProjectResolver {
    config: Arc<WorkConfig>,
}

impl ProjectResolver {
    /// Creates a resolver using the configured playground layout.
    #[must_use]
    pub const fn new(config: Arc<WorkConfig>) -> Self {
        Self { config }
    }

    /// Resolves `selection` within `scope`.
    ///
    /// `all` wins over explicit projects. Explicit projects are deduplicated
    /// in first-seen order. Without either, the single project containing
    /// the working directory is used.
    ///
    /// # Errors
    ///
    /// Returns [`WorkError::ProjectNotInWork`] for a project missing from the
    /// work, [`WorkError::UnknownLocalProject`] for a project missing from the
    /// catalog, [`WorkError::AllWithoutWork`] when `all` is used without
    /// work, and [`WorkError::MissingWorkingContext`] or
    /// [`WorkError::NoImpliedProject`] when inference is impossible.
    pub fn resolve(
        &self,
        selection: &ProjectSelection,
        scope: ProjectScope<'_>,
    ) -> WorkResult<Vec<ProjectName>> {
        if selection.all {
            return match scope {
                ProjectScope::Work(work) => Ok(work.project_names()),
                ProjectScope::Candidates(_) => Err(WorkError::AllWithoutWork),
            };
        }

        let requested = if selection.projects.is_empty() {
            vec![self.implied_project(selection)?]
        } else {
            dedupe(&selection.projects)
        };

        for project in &requested {
            validate(project, scope)?;
        }
        Ok(requested)
    }

    fn implied_project(&self, selection: &ProjectSelection) -> WorkResult<ProjectName> {
        let current_dir =
            selection
                .current_dir
                .as_deref()
                .ok_or(WorkError::MissingWorkingContext {
                    operation: "project resolution",
                    needed: "explicit projects",
                })?;
        let project = self
            .config
            .implied_project(current_dir)
            .ok_or_else(|| WorkError::NoImpliedProject(current_dir.to_owned()))?;
        debug!(project = %project, cwd = %current_dir, "inferred project from working directory");
        Ok(project)
    }
}

fn dedupe(projects: &[ProjectName]) -> Vec<ProjectName> {
    let mut unique: Vec<ProjectName> = Vec::with_capacity(projects.len());
    for project in projects {
        if !unique.contains(project) {
            unique.push(project.clone());
        }
    }
    unique
}

fn validate(project: &ProjectName, scope: ProjectScope<'_>) -> WorkResult<()> {
    match scope {
        ProjectScope::Work(work) if !work.contains_project(project) => {
            Err(WorkError::ProjectNotInWork {
                project: project.clone(),
                work_key: work.key().clone(),
            })
        }
        ProjectScope::Candidates(catalog) if !catalog.contains(project) => {
            Err(WorkError::UnknownLocalProject(project.clone()))
        }
        ProjectScope::Work(_) | ProjectScope::Candidates(_) => Ok(()),
    }
}

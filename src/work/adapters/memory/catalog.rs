//! In-memory project catalog.

use std::collections::HashSet;

use crate::work::{domain::ProjectName, ports::ProjectCatalog};

/// Fixed set of locally available projects.
#[derive(Debug, Clone, Default)]
pub struct InMemoryProjectCatalog {
    projects: HashSet<ProjectName>,
}

impl InMemoryProjectCatalog {
    /// Creates a catalog holding `projects`.
    #[must_use]
    pub fn new(projects: impl IntoIterator<Item = ProjectName>) -> Self {
        Self {
            projects: projects.into_iter().collect(),
        }
    }
}

impl ProjectCatalog for InMemoryProjectCatalog {
    fn contains(&self, project: &ProjectName) -> bool {
        self.projects.contains(project)
    }
}

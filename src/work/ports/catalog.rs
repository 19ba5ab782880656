//! Port listing the projects checked out locally.

use crate::work::domain::ProjectName;

/// Registry of candidate projects for new work.
#[cfg_attr(test, mockall::automock)]
pub trait ProjectCatalog: Send + Sync {
    /// Returns `true` when `project` is available locally.
    fn contains(&self, project: &ProjectName) -> bool;
}

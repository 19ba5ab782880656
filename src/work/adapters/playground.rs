//! [`ProjectCatalog`] backed by the playground directory tree.

use camino::Utf8PathBuf;

use crate::work::{config::WorkConfig, domain::ProjectName, ports::ProjectCatalog};

/// Treats every `<root>/<org>/<project>` directory as a local project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaygroundCatalog {
    root: Utf8PathBuf,
}

impl PlaygroundCatalog {
    /// Creates a catalog over `root`.
    #[must_use]
    pub fn new(root: impl Into<Utf8PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Creates a catalog over the configured playground root.
    #[must_use]
    pub fn from_config(config: &WorkConfig) -> Self {
        Self::new(config.playground_root.clone())
    }
}

impl ProjectCatalog for PlaygroundCatalog {
    fn contains(&self, project: &ProjectName) -> bool {
        self.root
            .join(project.org())
            .join(project.repo_base_name())
            .is_dir()
    }
}

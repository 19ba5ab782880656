//! Repository visibility, fork state, and per-project remote bindings.

use super::{ProjectName, RemoteName, WorkDomainError};
use camino::{Utf8Path, Utf8PathBuf};
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Repository visibility reported by the hosting service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RepoVisibility {
    /// Anyone may read the repository; work happens on a fork.
    Public,
    /// Access is restricted; work happens directly on origin.
    Private,
}

/// Whether the caller's fork of a public repository existed beforehand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ForkState {
    /// The fork already existed.
    Existing,
    /// The fork was missing and has been requested.
    Created,
}

/// Provisioning variant dispatched once per repository.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "visibility", rename_all = "snake_case")]
pub enum RepoKind {
    /// Private repository pushed to directly.
    Private,
    /// Public repository pushed to through the caller's fork.
    Public {
        /// Fork state observed during provisioning.
        fork: ForkState,
    },
}

impl RepoKind {
    /// Returns the visibility this variant was derived from.
    #[must_use]
    pub const fn visibility(self) -> RepoVisibility {
        match self {
            Self::Private => RepoVisibility::Private,
            Self::Public { .. } => RepoVisibility::Public,
        }
    }
}

/// Transient description of where a project's work branch lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoBinding {
    project: ProjectName,
    local_path: Utf8PathBuf,
    kind: RepoKind,
    remote_name: Option<RemoteName>,
    branch_owner: String,
}

impl RepoBinding {
    /// Binds a private repository.
    ///
    /// The remote is left unset so the reconciler falls back to the
    /// checkout's detected origin remote, normally `origin`.
    #[must_use]
    pub fn private(project: ProjectName, local_path: Utf8PathBuf) -> Self {
        let branch_owner = project.org().to_owned();
        Self {
            project,
            local_path,
            kind: RepoKind::Private,
            remote_name: None,
            branch_owner,
        }
    }

    /// Binds a public repository to the caller's fork.
    #[must_use]
    pub const fn public(
        project: ProjectName,
        local_path: Utf8PathBuf,
        fork: ForkState,
        workspace_remote: RemoteName,
        fork_owner: String,
    ) -> Self {
        Self {
            project,
            local_path,
            kind: RepoKind::Public { fork },
            remote_name: Some(workspace_remote),
            branch_owner: fork_owner,
        }
    }

    /// Returns the bound project.
    #[must_use]
    pub const fn project(&self) -> &ProjectName {
        &self.project
    }

    /// Returns the owning organisation.
    #[must_use]
    pub fn org(&self) -> &str {
        self.project.org()
    }

    /// Returns the repository base name.
    #[must_use]
    pub fn repo_base_name(&self) -> &str {
        self.project.repo_base_name()
    }

    /// Returns the local checkout path.
    #[must_use]
    pub fn local_path(&self) -> &Utf8Path {
        &self.local_path
    }

    /// Returns the provisioning variant.
    #[must_use]
    pub const fn kind(&self) -> RepoKind {
        self.kind
    }

    /// Returns the repository visibility.
    #[must_use]
    pub const fn visibility(&self) -> RepoVisibility {
        self.kind.visibility()
    }

    /// Returns the explicit push remote, if any.
    #[must_use]
    pub const fn remote_name(&self) -> Option<&RemoteName> {
        self.remote_name.as_ref()
    }

    /// Returns the hosting-service owner of the branch's push target.
    #[must_use]
    pub fn branch_owner(&self) -> &str {
        &self.branch_owner
    }
}

/// Matcher for remote URLs that point at a given repository.
///
/// Accepts `.../<repo>` and `.../<repo>.git`, optionally followed by
/// whitespace, so both SSH and HTTPS URLs of the fork qualify.
#[derive(Debug, Clone)]
pub struct RemoteUrlPattern(Regex);

impl RemoteUrlPattern {
    /// Builds the pattern for a repository base name.
    ///
    /// # Errors
    ///
    /// Returns [`WorkDomainError::InvalidRemotePattern`] when the pattern
    /// cannot be compiled.
    pub fn for_repository(repo_base_name: &str) -> Result<Self, WorkDomainError> {
        let pattern = format!(r"/{}(?:\.git)?(?:\s|$)", regex::escape(repo_base_name));
        Regex::new(&pattern)
            .map(Self)
            .map_err(|err| WorkDomainError::InvalidRemotePattern {
                repository: repo_base_name.to_owned(),
                reason: err.to_string(),
            })
    }

    /// Returns `true` when `url` points at the repository.
    #[must_use]
    pub fn matches(&self, url: &str) -> bool {
        self.0.is_match(url)
    }
}

//! Remote provisioning for private and public repositories.
//!
//! Private repositories are worked on through `origin`. Public repositories
//! are worked on through the caller's fork, reached via the workspace
//! remote. An existing workspace remote that points anywhere else is a
//! conflict and is never overwritten.

use camino::Utf8Path;
use std::sync::Arc;
use tracing::{debug, info};

use super::{WorkError, WorkResult, WorkStep};
use crate::work::{
    config::WorkConfig,
    domain::{CallerIdentity, ForkState, ProjectName, RemoteUrlPattern, RepoBinding, RepoVisibility},
    ports::{HostingError, HostingService, LocalVcs},
};

/// Result of provisioning one repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvisionOutcome {
    /// Where the work branch lives.
    pub binding: RepoBinding,
    /// Whether a fork was requested.
    pub fork_created: bool,
    /// Whether the workspace remote was added.
    pub remote_added: bool,
}

/// Ensures each repository has the correct push remote.
#[derive(Clone)]
pub struct RepoProvisioner {
    hosting: Arc<dyn HostingService>,
    vcs: Arc<dyn LocalVcs>,
    config: Arc<WorkConfig>,
}

impl RepoProvisioner {
    /// Creates a provisioner.
    #[must_use]
    pub const fn new(
        hosting: Arc<dyn HostingService>,
        vcs: Arc<dyn LocalVcs>,
        config: Arc<WorkConfig>,
    ) -> Self {
        Self {
            hosting,
            vcs,
            config,
        }
    }

    /// Provisions `project` for work by `caller`.
    ///
    /// # Errors
    ///
    /// Returns [`WorkError::RepositoryNotFound`] when the hosting service
    /// does not know the repository, [`WorkError::RemoteMismatch`] when the
    /// workspace remote points elsewhere, and fatal errors for failed
    /// hosting or VCS calls.
    pub async fn provision(
        &self,
        project: &ProjectName,
        caller: &CallerIdentity,
    ) -> WorkResult<ProvisionOutcome> {
        let local_path = self.config.project_path(project);
        let details = self
            .hosting
            .get_repository(project.org(), project.repo_base_name())
            .await
            .map_err(|err| match err {
                HostingError::NotFound(detail) => WorkError::RepositoryNotFound {
                    project: project.clone(),
                    detail,
                },
                other => WorkError::hosting(project.to_string(), WorkStep::LookupRepository, other),
            })?;

        match details.visibility {
            RepoVisibility::Private => {
                debug!(project = %project, "private repository, using origin");
                Ok(ProvisionOutcome {
                    binding: RepoBinding::private(project.clone(), local_path),
                    fork_created: false,
                    remote_added: false,
                })
            }
            RepoVisibility::Public => self.provision_public(project, &local_path, caller).await,
        }
    }

    async fn provision_public(
        &self,
        project: &ProjectName,
        local_path: &Utf8Path,
        caller: &CallerIdentity,
    ) -> WorkResult<ProvisionOutcome> {
        let remote = self.config.workspace_remote.clone();
        let pattern = RemoteUrlPattern::for_repository(project.repo_base_name())?;

        // Inspect before any mutation so a conflict leaves everything as is.
        let existing_url = self
            .vcs
            .remote_url(local_path, &remote)
            .await
            .map_err(|err| WorkError::vcs(project.to_string(), WorkStep::InspectRemote, err))?;
        if let Some(url) = existing_url.as_deref().filter(|url| !pattern.matches(url)) {
            return Err(WorkError::RemoteMismatch {
                project: project.clone(),
                remote,
                url: url.to_owned(),
            });
        }

        let fork_url = if existing_url.is_some() {
            None
        } else {
            Some(self.config.fork_url(caller.as_str(), project.repo_base_name())?)
        };

        let fork = self.ensure_fork(project, caller).await?;

        let remote_added = match fork_url {
            Some(url) => {
                info!(project = %project, remote = %remote, url = %url, "adding workspace remote");
                self.vcs
                    .add_remote(local_path, &remote, &url)
                    .await
                    .map_err(|err| WorkError::vcs(project.to_string(), WorkStep::AddRemote, err))?;
                true
            }
            None => {
                debug!(project = %project, remote = %remote, "workspace remote already configured");
                false
            }
        };

        Ok(ProvisionOutcome {
            binding: RepoBinding::public(
                project.clone(),
                local_path.to_owned(),
                fork,
                remote,
                caller.to_string(),
            ),
            fork_created: fork == ForkState::Created,
            remote_added,
        })
    }

    async fn ensure_fork(
        &self,
        project: &ProjectName,
        caller: &CallerIdentity,
    ) -> WorkResult<ForkState> {
        match self.hosting.get_fork(caller, project.repo_base_name()).await {
            Ok(_) => {
                debug!(project = %project, owner = %caller, "fork already exists");
                return Ok(ForkState::Existing);
            }
            Err(HostingError::NotFound(_)) => {
                debug!(project = %project, owner = %caller, "no fork found");
            }
            Err(err) => {
                return Err(WorkError::hosting(
                    project.to_string(),
                    WorkStep::LookupFork,
                    err,
                ));
            }
        }

        info!(project = %project, owner = %caller, "creating fork");
        self.hosting
            .create_fork(project.org(), project.repo_base_name(), caller)
            .await
            .map_err(|err| WorkError::hosting(project.to_string(), WorkStep::CreateFork, err))?;
        Ok(ForkState::Created)
    }
}

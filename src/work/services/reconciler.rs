//! Branch reconciliation: observe the work branch, then apply exactly one
//! synchronizing action.

use std::sync::Arc;
use tracing::{debug, info};

use super::{WorkError, WorkResult, WorkStep};
use crate::work::{
    domain::{BranchAction, BranchName, BranchPresence, RemoteName, RepoBinding},
    ports::{HostingError, HostingService, LocalVcs},
};

/// Result of reconciling one repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reconciliation {
    /// Remote the branch was synchronized with.
    pub remote: RemoteName,
    /// Presence observed before acting.
    pub presence: BranchPresence,
    /// Action that was applied.
    pub action: BranchAction,
}

/// Brings the local and remote work branch into agreement.
#[derive(Clone)]
pub struct BranchReconciler {
    hosting: Arc<dyn HostingService>,
    vcs: Arc<dyn LocalVcs>,
}

impl BranchReconciler {
    /// Creates a reconciler.
    #[must_use]
    pub const fn new(hosting: Arc<dyn HostingService>, vcs: Arc<dyn LocalVcs>) -> Self {
        Self { hosting, vcs }
    }

    /// Observes where `branch` exists for `binding`.
    ///
    /// Without an explicit remote on the binding, the checkout's origin
    /// remote is used.
    ///
    /// # Errors
    ///
    /// Returns a fatal [`WorkError`] naming the project and the failed step.
    pub async fn observe(
        &self,
        binding: &RepoBinding,
        branch: &BranchName,
    ) -> WorkResult<(RemoteName, BranchPresence)> {
        let subject = binding.project().to_string();
        let path = binding.local_path();

        let remote = self.push_remote(binding).await?;

        let has_local = self
            .vcs
            .has_local_branch(path, branch)
            .await
            .map_err(|err| WorkError::vcs(subject.clone(), WorkStep::InspectLocalBranch, err))?;

        let has_remote = match self
            .hosting
            .get_branch(binding.branch_owner(), binding.repo_base_name(), branch)
            .await
        {
            Ok(()) => true,
            Err(HostingError::NotFound(_)) => {
                debug!(project = %subject, branch = %branch, "remote branch absent");
                false
            }
            Err(err) => {
                return Err(WorkError::hosting(subject, WorkStep::LookupRemoteBranch, err));
            }
        };

        let mut presence = BranchPresence::new(has_local, has_remote);
        if has_local && has_remote {
            let upstream = self
                .vcs
                .upstream_of(path, branch)
                .await
                .map_err(|err| WorkError::vcs(subject.clone(), WorkStep::InspectLocalBranch, err))?;
            let expected = format!("{remote}/{branch}");
            presence = presence.with_tracking(upstream.as_deref() == Some(expected.as_str()));
        }
        Ok((remote, presence))
    }

    async fn push_remote(&self, binding: &RepoBinding) -> WorkResult<RemoteName> {
        if let Some(remote) = binding.remote_name() {
            return Ok(remote.clone());
        }
        self.vcs
            .determine_origin_and_main(binding.local_path())
            .await
            .map_err(|err| {
                WorkError::vcs(binding.project().to_string(), WorkStep::DetectOrigin, err)
            })
    }

    /// Reconciles `branch` for `binding`.
    ///
    /// # Errors
    ///
    /// Returns a fatal [`WorkError`] naming the project and the failed step.
    /// Repositories reconciled earlier are left as they are.
    pub async fn reconcile(
        &self,
        binding: &RepoBinding,
        branch: &BranchName,
    ) -> WorkResult<Reconciliation> {
        let (remote, presence) = self.observe(binding, branch).await?;
        let action = BranchAction::decide(presence);
        self.apply(binding, &remote, branch, action).await?;
        Ok(Reconciliation {
            remote,
            presence,
            action,
        })
    }

    async fn apply(
        &self,
        binding: &RepoBinding,
        remote: &RemoteName,
        branch: &BranchName,
        action: BranchAction,
    ) -> WorkResult<()> {
        let project = binding.project();
        let path = binding.local_path();
        if !action.is_mutation() {
            debug!(project = %project, branch = %branch, "work branch already consistent");
            return Ok(());
        }

        info!(
            project = %project,
            remote = %remote,
            branch = %branch,
            action = %action,
            "reconciling work branch"
        );
        let (step, result) = match action {
            BranchAction::CreateAndPush => (
                WorkStep::CreateAndPushBranch,
                self.vcs.create_and_push_branch(path, remote, branch).await,
            ),
            BranchAction::Pull => (
                WorkStep::PullBranch,
                self.vcs.pull_branch(path, remote, branch).await,
            ),
            BranchAction::Push => (
                WorkStep::PushBranch,
                self.vcs.push_branch(path, remote, branch).await,
            ),
            BranchAction::NoOp => return Ok(()),
        };
        result.map_err(|err| WorkError::vcs(project.to_string(), step, err))
    }
}

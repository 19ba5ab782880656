//! In-memory local checkouts for orchestration tests.

use async_trait::async_trait;
use camino::{Utf8Path, Utf8PathBuf};
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::sync::{Arc, RwLock};

use crate::work::{
    domain::{BranchName, RemoteName},
    ports::{LocalVcs, VcsError, VcsResult},
};

/// Simulated state of one local checkout.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocalCheckout {
    branches: BTreeSet<String>,
    remotes: BTreeMap<String, String>,
    upstreams: BTreeMap<String, String>,
    current_branch: Option<String>,
}

impl LocalCheckout {
    /// Creates a checkout on `main` with an `origin` remote at `origin_url`.
    #[must_use]
    pub fn new(origin_url: impl Into<String>) -> Self {
        Self::default()
            .with_branch("main")
            .with_remote(RemoteName::ORIGIN, origin_url)
    }

    /// Adds a local branch and checks it out.
    #[must_use]
    pub fn with_branch(mut self, branch: impl Into<String>) -> Self {
        let name = branch.into();
        self.current_branch = Some(name.clone());
        self.branches.insert(name);
        self
    }

    /// Adds a remote.
    #[must_use]
    pub fn with_remote(mut self, remote: impl Into<String>, url: impl Into<String>) -> Self {
        self.remotes.insert(remote.into(), url.into());
        self
    }

    /// Sets the upstream of `branch` to `remote/branch`.
    #[must_use]
    pub fn with_upstream(mut self, branch: impl Into<String>, remote: &str) -> Self {
        let name = branch.into();
        let upstream = format!("{remote}/{name}");
        self.upstreams.insert(name, upstream);
        self
    }

    /// Returns `true` when `branch` exists locally.
    #[must_use]
    pub fn has_branch(&self, branch: &str) -> bool {
        self.branches.contains(branch)
    }

    /// Returns the URL of `remote`.
    #[must_use]
    pub fn remote_url(&self, remote: &str) -> Option<&str> {
        self.remotes.get(remote).map(String::as_str)
    }

    /// Returns the upstream of `branch`.
    #[must_use]
    pub fn upstream_of(&self, branch: &str) -> Option<&str> {
        self.upstreams.get(branch).map(String::as_str)
    }

    /// Returns the checked-out branch.
    #[must_use]
    pub fn current_branch(&self) -> Option<&str> {
        self.current_branch.as_deref()
    }

    fn require_remote(&self, remote: &RemoteName, command: &str) -> VcsResult<()> {
        if self.remotes.contains_key(remote.as_str()) {
            return Ok(());
        }
        Err(VcsError::CommandFailed {
            command: command.to_owned(),
            stderr: format!("'{remote}' does not appear to be a git repository"),
        })
    }

    fn track(&mut self, remote: &RemoteName, branch: &BranchName) {
        self.upstreams
            .insert(branch.as_str().to_owned(), format!("{remote}/{branch}"));
    }
}

/// Mutating operation received by the in-memory VCS.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VcsOperation {
    /// A remote was added.
    AddRemote {
        /// Checkout path.
        path: Utf8PathBuf,
        /// Remote name.
        remote: RemoteName,
        /// Remote URL.
        url: String,
    },
    /// A branch was created and pushed.
    CreateAndPush {
        /// Checkout path.
        path: Utf8PathBuf,
        /// Push remote.
        remote: RemoteName,
        /// Branch name.
        branch: BranchName,
    },
    /// A branch was pulled.
    Pull {
        /// Checkout path.
        path: Utf8PathBuf,
        /// Pull remote.
        remote: RemoteName,
        /// Branch name.
        branch: BranchName,
    },
    /// A branch was pushed.
    Push {
        /// Checkout path.
        path: Utf8PathBuf,
        /// Push remote.
        remote: RemoteName,
        /// Branch name.
        branch: BranchName,
    },
}

/// Kinds of [`VcsOperation`] that can be made to fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VcsOperationKind {
    /// Remote addition.
    AddRemote,
    /// Branch creation and push.
    CreateAndPush,
    /// Branch pull.
    Pull,
    /// Branch push.
    Push,
}

/// Thread-safe in-memory implementation of [`LocalVcs`].
#[derive(Debug, Clone, Default)]
pub struct InMemoryLocalVcs {
    state: Arc<RwLock<InMemoryVcsState>>,
}

#[derive(Debug, Default)]
struct InMemoryVcsState {
    checkouts: HashMap<Utf8PathBuf, LocalCheckout>,
    operations: Vec<VcsOperation>,
    failing: HashSet<VcsOperationKind>,
}

fn lock_error(err: impl ToString) -> VcsError {
    VcsError::io(std::io::Error::other(err.to_string()))
}

impl InMemoryVcsState {
    fn checkout(&self, path: &Utf8Path) -> VcsResult<&LocalCheckout> {
        self.checkouts
            .get(path)
            .ok_or_else(|| VcsError::NotARepository(path.to_owned()))
    }

    fn checkout_mut(&mut self, path: &Utf8Path) -> VcsResult<&mut LocalCheckout> {
        self.checkouts
            .get_mut(path)
            .ok_or_else(|| VcsError::NotARepository(path.to_owned()))
    }

    fn check(&self, kind: VcsOperationKind, command: &str) -> VcsResult<()> {
        if self.failing.contains(&kind) {
            return Err(VcsError::CommandFailed {
                command: command.to_owned(),
                stderr: "injected failure".to_owned(),
            });
        }
        Ok(())
    }
}

impl InMemoryLocalVcs {
    /// Creates a VCS with no checkouts.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a checkout at `path`, replacing any previous one.
    ///
    /// # Errors
    ///
    /// Returns an I/O error when lock acquisition fails.
    pub fn add_checkout(
        &self,
        path: impl Into<Utf8PathBuf>,
        checkout: LocalCheckout,
    ) -> VcsResult<()> {
        let mut state = self.state.write().map_err(lock_error)?;
        state.checkouts.insert(path.into(), checkout);
        Ok(())
    }

    /// Returns a snapshot of the checkout at `path`.
    ///
    /// # Errors
    ///
    /// Returns an I/O error when lock acquisition fails.
    pub fn checkout(&self, path: &Utf8Path) -> VcsResult<Option<LocalCheckout>> {
        let state = self.state.read().map_err(lock_error)?;
        Ok(state.checkouts.get(path).cloned())
    }

    /// Returns the mutating operations received, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an I/O error when lock acquisition fails.
    pub fn operations(&self) -> VcsResult<Vec<VcsOperation>> {
        let state = self.state.read().map_err(lock_error)?;
        Ok(state.operations.clone())
    }

    /// Makes every later operation of `kind` fail.
    ///
    /// # Errors
    ///
    /// Returns an I/O error when lock acquisition fails.
    pub fn fail_operation(&self, kind: VcsOperationKind) -> VcsResult<()> {
        let mut state = self.state.write().map_err(lock_error)?;
        state.failing.insert(kind);
        Ok(())
    }
}

#[async_trait]
impl LocalVcs for InMemoryLocalVcs {
    async fn has_local_branch(&self, path: &Utf8Path, branch: &BranchName) -> VcsResult<bool> {
        let state = self.state.read().map_err(lock_error)?;
        Ok(state.checkout(path)?.has_branch(branch.as_str()))
    }

    async fn remote_url(
        &self,
        path: &Utf8Path,
        remote: &RemoteName,
    ) -> VcsResult<Option<String>> {
        let state = self.state.read().map_err(lock_error)?;
        Ok(state
            .checkout(path)?
            .remote_url(remote.as_str())
            .map(str::to_owned))
    }

    async fn add_remote(&self, path: &Utf8Path, remote: &RemoteName, url: &str) -> VcsResult<()> {
        let mut state = self.state.write().map_err(lock_error)?;
        let command = format!("git remote add {remote} {url}");
        state.check(VcsOperationKind::AddRemote, &command)?;
        let checkout = state.checkout_mut(path)?;
        if checkout.remotes.contains_key(remote.as_str()) {
            return Err(VcsError::CommandFailed {
                command,
                stderr: format!("remote {remote} already exists"),
            });
        }
        checkout
            .remotes
            .insert(remote.as_str().to_owned(), url.to_owned());
        state.operations.push(VcsOperation::AddRemote {
            path: path.to_owned(),
            remote: remote.clone(),
            url: url.to_owned(),
        });
        Ok(())
    }

    async fn determine_origin_and_main(&self, path: &Utf8Path) -> VcsResult<RemoteName> {
        let state = self.state.read().map_err(lock_error)?;
        let checkout = state.checkout(path)?;
        let name = if checkout.remotes.contains_key(RemoteName::ORIGIN) {
            RemoteName::ORIGIN
        } else {
            checkout
                .remotes
                .keys()
                .next()
                .map(String::as_str)
                .ok_or_else(|| VcsError::UnexpectedOutput {
                    command: "git remote".to_owned(),
                    output: String::new(),
                })?
        };
        RemoteName::new(name).map_err(|err| VcsError::UnexpectedOutput {
            command: "git remote".to_owned(),
            output: err.to_string(),
        })
    }

    async fn upstream_of(
        &self,
        path: &Utf8Path,
        branch: &BranchName,
    ) -> VcsResult<Option<String>> {
        let state = self.state.read().map_err(lock_error)?;
        Ok(state
            .checkout(path)?
            .upstream_of(branch.as_str())
            .map(str::to_owned))
    }

    async fn current_branch(&self, path: &Utf8Path) -> VcsResult<BranchName> {
        let state = self.state.read().map_err(lock_error)?;
        let current = state
            .checkout(path)?
            .current_branch()
            .ok_or_else(|| VcsError::UnexpectedOutput {
                command: "git rev-parse --abbrev-ref HEAD".to_owned(),
                output: "HEAD".to_owned(),
            })?;
        BranchName::new(current).map_err(|err| VcsError::UnexpectedOutput {
            command: "git rev-parse --abbrev-ref HEAD".to_owned(),
            output: err.to_string(),
        })
    }

    async fn create_and_push_branch(
        &self,
        path: &Utf8Path,
        remote: &RemoteName,
        branch: &BranchName,
    ) -> VcsResult<()> {
        let mut state = self.state.write().map_err(lock_error)?;
        let command =
            format!("git checkout -b {branch} && git push --set-upstream {remote} {branch}");
        state.check(VcsOperationKind::CreateAndPush, &command)?;
        let checkout = state.checkout_mut(path)?;
        if checkout.has_branch(branch.as_str()) {
            return Err(VcsError::CommandFailed {
                command,
                stderr: format!("a branch named '{branch}' already exists"),
            });
        }
        checkout.require_remote(remote, &command)?;
        checkout.branches.insert(branch.as_str().to_owned());
        checkout.current_branch = Some(branch.as_str().to_owned());
        checkout.track(remote, branch);
        state.operations.push(VcsOperation::CreateAndPush {
            path: path.to_owned(),
            remote: remote.clone(),
            branch: branch.clone(),
        });
        Ok(())
    }

    async fn pull_branch(
        &self,
        path: &Utf8Path,
        remote: &RemoteName,
        branch: &BranchName,
    ) -> VcsResult<()> {
        let mut state = self.state.write().map_err(lock_error)?;
        let command = format!("git pull --set-upstream {remote} {branch}");
        state.check(VcsOperationKind::Pull, &command)?;
        let checkout = state.checkout_mut(path)?;
        checkout.require_remote(remote, &command)?;
        checkout.branches.insert(branch.as_str().to_owned());
        checkout.current_branch = Some(branch.as_str().to_owned());
        checkout.track(remote, branch);
        state.operations.push(VcsOperation::Pull {
            path: path.to_owned(),
            remote: remote.clone(),
            branch: branch.clone(),
        });
        Ok(())
    }

    async fn push_branch(
        &self,
        path: &Utf8Path,
        remote: &RemoteName,
        branch: &BranchName,
    ) -> VcsResult<()> {
        let mut state = self.state.write().map_err(lock_error)?;
        let command = format!("git push --set-upstream {remote} {branch}");
        state.check(VcsOperationKind::Push, &command)?;
        let checkout = state.checkout_mut(path)?;
        if !checkout.has_branch(branch.as_str()) {
            return Err(VcsError::CommandFailed {
                command,
                stderr: format!("src refspec {branch} does not match any"),
            });
        }
        checkout.require_remote(remote, &command)?;
        checkout.track(remote, branch);
        state.operations.push(VcsOperation::Push {
            path: path.to_owned(),
            remote: remote.clone(),
            branch: branch.clone(),
        });
        Ok(())
    }
}

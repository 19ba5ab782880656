//! [`LocalVcs`] over the `git` command line.

use async_trait::async_trait;
use camino::Utf8Path;
use std::process::{Output, Stdio};
use tokio::process::Command;
use tracing::debug;

use crate::work::{
    domain::{BranchName, RemoteName},
    ports::{LocalVcs, VcsError, VcsResult},
};

/// Preferred main-line remotes, in order.
const MAIN_REMOTES: [&str; 2] = [RemoteName::ORIGIN, "upstream"];

/// Local checkouts driven through the `git` binary on `PATH`.
#[derive(Debug, Clone, Copy, Default)]
pub struct GitCli;

impl GitCli {
    /// Creates the adapter.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

async fn run(cwd: &Utf8Path, args: &[&str]) -> VcsResult<Output> {
    debug!(cwd = %cwd, command = %args.join(" "), "running git");
    Command::new("git")
        .args(args)
        .current_dir(cwd)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .await
        .map_err(VcsError::io)
}

/// Runs git and returns trimmed stdout, failing on a non-zero exit.
async fn git(cwd: &Utf8Path, args: &[&str]) -> VcsResult<String> {
    let output = run(cwd, args).await?;
    if !output.status.success() {
        return Err(VcsError::CommandFailed {
            command: format!("git {}", args.join(" ")),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_owned(),
        });
    }
    Ok(String::from_utf8_lossy(&output.stdout).trim().to_owned())
}

/// Runs git and returns trimmed stdout, or `None` on a non-zero exit.
async fn git_optional(cwd: &Utf8Path, args: &[&str]) -> VcsResult<Option<String>> {
    let output = run(cwd, args).await?;
    if !output.status.success() {
        return Ok(None);
    }
    Ok(Some(String::from_utf8_lossy(&output.stdout).trim().to_owned()))
}

fn unexpected(command: &str, output: impl Into<String>) -> VcsError {
    VcsError::UnexpectedOutput {
        command: command.to_owned(),
        output: output.into(),
    }
}

#[async_trait]
impl LocalVcs for GitCli {
    async fn has_local_branch(&self, path: &Utf8Path, branch: &BranchName) -> VcsResult<bool> {
        let reference = format!("refs/heads/{branch}");
        let found = git_optional(path, &["rev-parse", "--verify", "--quiet", &reference]).await?;
        Ok(found.is_some())
    }

    async fn remote_url(
        &self,
        path: &Utf8Path,
        remote: &RemoteName,
    ) -> VcsResult<Option<String>> {
        git_optional(path, &["remote", "get-url", remote.as_str()]).await
    }

    async fn add_remote(&self, path: &Utf8Path, remote: &RemoteName, url: &str) -> VcsResult<()> {
        git(path, &["remote", "add", remote.as_str(), url]).await?;
        Ok(())
    }

    async fn determine_origin_and_main(&self, path: &Utf8Path) -> VcsResult<RemoteName> {
        let listing = git(path, &["remote"]).await?;
        let remotes: Vec<&str> = listing.lines().map(str::trim).collect();
        let chosen = MAIN_REMOTES
            .iter()
            .copied()
            .find(|candidate| remotes.contains(candidate))
            .or_else(|| remotes.first().copied())
            .ok_or_else(|| unexpected("git remote", "no remotes configured"))?;
        RemoteName::new(chosen).map_err(|err| unexpected("git remote", err.to_string()))
    }

    async fn upstream_of(
        &self,
        path: &Utf8Path,
        branch: &BranchName,
    ) -> VcsResult<Option<String>> {
        let spec = format!("{branch}@{{upstream}}");
        git_optional(path, &["rev-parse", "--abbrev-ref", &spec]).await
    }

    async fn current_branch(&self, path: &Utf8Path) -> VcsResult<BranchName> {
        let command = "git rev-parse --abbrev-ref HEAD";
        let name = git(path, &["rev-parse", "--abbrev-ref", "HEAD"]).await?;
        if name == "HEAD" {
            return Err(unexpected(command, "detached HEAD"));
        }
        BranchName::new(name).map_err(|err| unexpected(command, err.to_string()))
    }

    async fn create_and_push_branch(
        &self,
        path: &Utf8Path,
        remote: &RemoteName,
        branch: &BranchName,
    ) -> VcsResult<()> {
        git(path, &["checkout", "-b", branch.as_str()]).await?;
        git(path, &["push", "--set-upstream", remote.as_str(), branch.as_str()]).await?;
        Ok(())
    }

    async fn pull_branch(
        &self,
        path: &Utf8Path,
        remote: &RemoteName,
        branch: &BranchName,
    ) -> VcsResult<()> {
        if self.has_local_branch(path, branch).await? {
            git(path, &["checkout", branch.as_str()]).await?;
            git(path, &["pull", "--set-upstream", remote.as_str(), branch.as_str()]).await?;
            return Ok(());
        }
        // Materialise the branch from the remote rather than pulling into
        // whatever happens to be checked out.
        let tracking = format!("{remote}/{branch}");
        git(path, &["fetch", remote.as_str(), branch.as_str()]).await?;
        git(path, &["checkout", "-b", branch.as_str(), "--track", &tracking]).await?;
        Ok(())
    }

    async fn push_branch(
        &self,
        path: &Utf8Path,
        remote: &RemoteName,
        branch: &BranchName,
    ) -> VcsResult<()> {
        git(path, &["push", "--set-upstream", remote.as_str(), branch.as_str()]).await?;
        Ok(())
    }
}

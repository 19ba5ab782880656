//! [`BuildRunner`] that runs a command inside each project checkout.

use async_trait::async_trait;
use camino::Utf8Path;
use std::process::Stdio;
use tokio::process::Command;
use tracing::debug;

use crate::work::{
    domain::ProjectName,
    ports::{BuildError, BuildResult, BuildRunner},
};

/// Maximum number of output lines kept in a failure report.
const OUTPUT_TAIL_LINES: usize = 20;

/// Runs a build command, `npm run build` by default, in the project
/// directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessBuildRunner {
    program: String,
    args: Vec<String>,
}

impl Default for ProcessBuildRunner {
    fn default() -> Self {
        Self::new("npm", ["run", "build"])
    }
}

impl ProcessBuildRunner {
    /// Creates a runner invoking `program` with `args`.
    #[must_use]
    pub fn new(
        program: impl Into<String>,
        args: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    /// Returns the command line for logs and errors.
    #[must_use]
    pub fn command_line(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

fn tail(stdout: &[u8], stderr: &[u8]) -> String {
    let combined = format!(
        "{}\n{}",
        String::from_utf8_lossy(stdout),
        String::from_utf8_lossy(stderr)
    );
    let lines: Vec<&str> = combined.lines().filter(|line| !line.trim().is_empty()).collect();
    let start = lines.len().saturating_sub(OUTPUT_TAIL_LINES);
    lines.get(start..).unwrap_or_default().join("\n")
}

#[async_trait]
impl BuildRunner for ProcessBuildRunner {
    async fn build(&self, project: &ProjectName, path: &Utf8Path) -> BuildResult<()> {
        debug!(project = %project, cwd = %path, command = %self.command_line(), "running build");
        let output = Command::new(&self.program)
            .args(&self.args)
            .current_dir(path)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(BuildError::spawn)?;

        if output.status.success() {
            return Ok(());
        }
        Err(BuildError::Failed {
            status: output.status.to_string(),
            output: tail(&output.stdout, &output.stderr),
        })
    }
}

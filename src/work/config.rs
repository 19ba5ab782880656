//! Configuration for work orchestration.

use crate::work::domain::{ProjectName, RemoteName, RemoteUrlPattern};
use camino::{Utf8Component, Utf8Path, Utf8PathBuf};
use minijinja::{Environment, context};
use serde::Deserialize;
use thiserror::Error;

/// Default fork URL template.
pub const DEFAULT_FORK_URL_TEMPLATE: &str = "git@github.com:{{ owner }}/{{ repo }}.git";

/// Default comment posted when claiming issues.
pub const DEFAULT_CLAIM_COMMENT_TEMPLATE: &str =
    "Work for this issue has begun on branch {{ branch }}.";

const SAMPLE_OWNER: &str = "owner";
const SAMPLE_REPO: &str = "project";
const SAMPLE_BRANCH: &str = "work/org/project-1";

/// How `build work` treats a failing project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuildFailurePolicy {
    /// Attempt every project and report each outcome.
    #[default]
    CollectAll,
    /// Stop at the first failing project.
    FailFast,
}

/// Errors raised while loading or applying configuration.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// The configuration text could not be parsed.
    #[error("invalid work configuration: {0}")]
    Parse(String),

    /// A configured template failed to render.
    #[error("failed to render {template} template: {reason}")]
    Template {
        /// Which template failed.
        template: &'static str,
        /// Renderer diagnostic.
        reason: String,
    },

    /// The fork URL template does not point at the repository it is given.
    #[error("fork URL template renders '{url}', which does not point at repository '{repo}'")]
    ForkUrlMismatch {
        /// Rendered URL.
        url: String,
        /// Repository the URL was rendered for.
        repo: String,
    },
}

/// Work orchestration settings.
///
/// # Examples
///
/// ```
/// use liq_work::work::config::{BuildFailurePolicy, WorkConfig};
///
/// let config = WorkConfig::default();
/// assert_eq!(config.workspace_remote.as_str(), "workspace");
/// assert_eq!(config.build_failure_policy, BuildFailurePolicy::CollectAll);
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WorkConfig {
    /// Directory holding checkouts as `<root>/<org>/<project>`.
    pub playground_root: Utf8PathBuf,
    /// Remote name used for forks of public repositories.
    pub workspace_remote: RemoteName,
    /// `minijinja` template for fork URLs; receives `owner` and `repo`.
    pub fork_url_template: String,
    /// `minijinja` template for the default claim comment; receives `branch`.
    pub claim_comment_template: String,
    /// Failure handling for `build work`.
    pub build_failure_policy: BuildFailurePolicy,
}

impl Default for WorkConfig {
    fn default() -> Self {
        Self {
            playground_root: Utf8PathBuf::from("playground"),
            workspace_remote: RemoteName::workspace(),
            fork_url_template: DEFAULT_FORK_URL_TEMPLATE.to_owned(),
            claim_comment_template: DEFAULT_CLAIM_COMMENT_TEMPLATE.to_owned(),
            build_failure_policy: BuildFailurePolicy::default(),
        }
    }
}

impl WorkConfig {
    /// Creates a configuration rooted at `playground_root`.
    #[must_use]
    pub fn new(playground_root: impl Into<Utf8PathBuf>) -> Self {
        Self {
            playground_root: playground_root.into(),
            ..Self::default()
        }
    }

    /// Parses a JSON configuration; missing fields take their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] when the text is not valid
    /// configuration JSON, or the [`WorkConfig::validate`] error when a
    /// template is unusable.
    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(text).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Checks that both templates render and that fork URLs point at the
    /// repository they are rendered for.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Template`] or [`ConfigError::ForkUrlMismatch`].
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.claim_comment(SAMPLE_BRANCH)?;
        self.fork_url(SAMPLE_OWNER, SAMPLE_REPO)?;
        Ok(())
    }

    /// Sets the build failure policy.
    #[must_use]
    pub const fn with_build_failure_policy(mut self, policy: BuildFailurePolicy) -> Self {
        self.build_failure_policy = policy;
        self
    }

    /// Sets the workspace remote name.
    #[must_use]
    pub fn with_workspace_remote(mut self, remote: RemoteName) -> Self {
        self.workspace_remote = remote;
        self
    }

    /// Returns the checkout path of `project`.
    #[must_use]
    pub fn project_path(&self, project: &ProjectName) -> Utf8PathBuf {
        self.playground_root
            .join(project.org())
            .join(project.repo_base_name())
    }

    /// Infers the project containing `current_dir`.
    ///
    /// Returns `None` when the directory is not at or below
    /// `<playground_root>/<org>/<project>`.
    #[must_use]
    pub fn implied_project(&self, current_dir: &Utf8Path) -> Option<ProjectName> {
        let relative = current_dir.strip_prefix(&self.playground_root).ok()?;
        let mut segments = relative.components().filter_map(|component| match component {
            Utf8Component::Normal(segment) => Some(segment),
            _ => None,
        });
        let org = segments.next()?;
        let repo = segments.next()?;
        ProjectName::from_parts(org, repo).ok()
    }

    /// Renders the fork URL for `owner/repo`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Template`] when the template fails to render,
    /// or [`ConfigError::ForkUrlMismatch`] when the URL would not be
    /// recognised as a remote for `repo`.
    pub fn fork_url(&self, owner: &str, repo: &str) -> Result<String, ConfigError> {
        let url = Environment::new()
            .render_str(&self.fork_url_template, context! { owner, repo })
            .map_err(|err| ConfigError::Template {
                template: "fork URL",
                reason: err.to_string(),
            })?;
        let points_at_repo =
            RemoteUrlPattern::for_repository(repo).is_ok_and(|pattern| pattern.matches(&url));
        if !points_at_repo {
            return Err(ConfigError::ForkUrlMismatch {
                url,
                repo: repo.to_owned(),
            });
        }
        Ok(url)
    }

    /// Renders the default claim comment for `branch`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Template`] when the template fails to render.
    pub fn claim_comment(&self, branch: &str) -> Result<String, ConfigError> {
        Environment::new()
            .render_str(&self.claim_comment_template, context! { branch })
            .map_err(|err| ConfigError::Template {
                template: "claim comment",
                reason: err.to_string(),
            })
    }
}

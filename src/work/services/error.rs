//! Unified error taxonomy for work orchestration services.

use camino::Utf8PathBuf;
use std::fmt;
use thiserror::Error;

use crate::work::{
    config::ConfigError,
    domain::{IssueReference, IssueUnavailable, ProjectName, RemoteName, WorkDomainError, WorkKey},
    ports::{
        BuildError, CredentialError, HostingError, IssueTrackerError, VcsError,
        WorkRecordStoreError,
    },
};

/// Result type for work orchestration services.
pub type WorkResult<T> = Result<T, WorkError>;

/// Coarse classification of a [`WorkError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WorkErrorKind {
    /// Bad or missing input.
    InvalidRequest,
    /// A project, work key, repository, or issue lookup missed.
    NotFound,
    /// Existing state contradicts the request.
    Conflict,
    /// An external process or transport failed.
    Fatal,
}

/// External step that was running when a fatal error occurred.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WorkStep {
    /// Repository visibility lookup.
    LookupRepository,
    /// Fork existence lookup.
    LookupFork,
    /// Fork creation request.
    CreateFork,
    /// Workspace remote inspection.
    InspectRemote,
    /// Workspace remote creation.
    AddRemote,
    /// Remote work branch lookup.
    LookupRemoteBranch,
    /// Local work branch inspection.
    InspectLocalBranch,
    /// Branch creation and push.
    CreateAndPushBranch,
    /// Branch pull.
    PullBranch,
    /// Branch push.
    PushBranch,
    /// Origin remote detection.
    DetectOrigin,
    /// Current branch detection.
    DetectBranch,
    /// Issue availability verification.
    VerifyIssues,
    /// Issue claim.
    ClaimIssues,
    /// Caller identity lookup.
    IdentifyCaller,
    /// Registry read.
    LoadWork,
    /// Registry write.
    PersistWork,
    /// External build step.
    Build,
}

impl WorkStep {
    /// Returns a human-readable step name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::LookupRepository => "lookup repository",
            Self::LookupFork => "lookup fork",
            Self::CreateFork => "create fork",
            Self::InspectRemote => "inspect remote",
            Self::AddRemote => "add remote",
            Self::LookupRemoteBranch => "lookup remote branch",
            Self::InspectLocalBranch => "inspect local branch",
            Self::CreateAndPushBranch => "create and push branch",
            Self::PullBranch => "pull branch",
            Self::PushBranch => "push branch",
            Self::DetectOrigin => "detect origin",
            Self::DetectBranch => "detect current branch",
            Self::VerifyIssues => "verify issues",
            Self::ClaimIssues => "claim issues",
            Self::IdentifyCaller => "identify caller",
            Self::LoadWork => "load work",
            Self::PersistWork => "persist work",
            Self::Build => "build",
        }
    }
}

impl fmt::Display for WorkStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Service-level errors for work orchestration.
#[derive(Debug, Error)]
pub enum WorkError {
    /// Domain validation failed.
    #[error(transparent)]
    Domain(#[from] WorkDomainError),

    /// The operation needs a working context the caller did not provide.
    #[error("{operation} requires {needed} when no working directory is available")]
    MissingWorkingContext {
        /// Operation that was requested.
        operation: &'static str,
        /// Input that would have replaced the working context.
        needed: &'static str,
    },

    /// The working directory is not inside a playground project.
    #[error("cannot infer a project from '{0}'; specify the project explicitly")]
    NoImpliedProject(Utf8PathBuf),

    /// `all` was requested without an existing unit of work.
    #[error("selecting all projects requires an existing unit of work")]
    AllWithoutWork,

    /// A project is not available locally.
    #[error("unknown local project '{0}'; do you need to import it?")]
    UnknownLocalProject(ProjectName),

    /// A project is not bound to the unit of work.
    #[error("project '{project}' is not part of work '{work_key}'")]
    ProjectNotInWork {
        /// Requested project.
        project: ProjectName,
        /// Work the project was looked up in.
        work_key: WorkKey,
    },

    /// No unit of work is stored under the key.
    #[error("no work found for '{0}'")]
    WorkNotFound(WorkKey),

    /// The hosting service does not know the repository or hides it.
    #[error("repository '{project}' not found or not visible: {detail}")]
    RepositoryNotFound {
        /// Project whose repository was looked up.
        project: ProjectName,
        /// Hosting-service diagnostic.
        detail: String,
    },

    /// The issue tracker does not know the issue.
    #[error("issue '{0}' not found")]
    IssueNotFound(IssueReference),

    /// An issue cannot be claimed.
    #[error(transparent)]
    IssueUnavailable(#[from] IssueUnavailable),

    /// The workspace remote exists but points somewhere unexpected.
    #[error(
        "remote '{remote}' in project '{project}' points to '{url}', which is not the expected \
         fork; fix or remove the remote manually"
    )]
    RemoteMismatch {
        /// Project whose checkout holds the remote.
        project: ProjectName,
        /// Remote name.
        remote: RemoteName,
        /// URL currently configured.
        url: String,
    },

    /// A unit of work with the key already exists.
    #[error("work '{0}' already exists")]
    DuplicateWork(WorkKey),

    /// A hosting-service call failed.
    #[error("{step} failed for '{subject}': {source}")]
    Hosting {
        /// Repository or project being processed.
        subject: String,
        /// Failed step.
        step: WorkStep,
        /// Underlying error.
        #[source]
        source: HostingError,
    },

    /// A local VCS operation failed.
    #[error("{step} failed for '{subject}': {source}")]
    Vcs {
        /// Project being processed.
        subject: String,
        /// Failed step.
        step: WorkStep,
        /// Underlying error.
        #[source]
        source: VcsError,
    },

    /// An issue tracker call failed.
    #[error("{step} failed: {source}")]
    IssueTracker {
        /// Failed step.
        step: WorkStep,
        /// Underlying error.
        #[source]
        source: IssueTrackerError,
    },

    /// No usable credential is available.
    #[error("failed to load credentials: {0}")]
    Credentials(#[from] CredentialError),

    /// The registry backend failed.
    #[error("{step} failed for work '{work_key}': {source}")]
    Registry {
        /// Work being read or written.
        work_key: WorkKey,
        /// Failed step.
        step: WorkStep,
        /// Underlying error.
        #[source]
        source: WorkRecordStoreError,
    },

    /// The configuration is unusable.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The build step failed for a project.
    #[error("build failed for '{project}': {source}")]
    Build {
        /// Project that failed.
        project: ProjectName,
        /// Underlying error.
        #[source]
        source: BuildError,
    },
}

impl WorkError {
    /// Returns the error class.
    #[must_use]
    pub const fn kind(&self) -> WorkErrorKind {
        match self {
            Self::Domain(_)
            | Self::MissingWorkingContext { .. }
            | Self::NoImpliedProject(_)
            | Self::AllWithoutWork
            | Self::UnknownLocalProject(_)
            | Self::Config(_) => WorkErrorKind::InvalidRequest,
            Self::ProjectNotInWork { .. }
            | Self::WorkNotFound(_)
            | Self::RepositoryNotFound { .. }
            | Self::IssueNotFound(_) => WorkErrorKind::NotFound,
            Self::IssueUnavailable(_) | Self::RemoteMismatch { .. } | Self::DuplicateWork(_) => {
                WorkErrorKind::Conflict
            }
            Self::Hosting { .. }
            | Self::Vcs { .. }
            | Self::IssueTracker { .. }
            | Self::Credentials(_)
            | Self::Registry { .. }
            | Self::Build { .. } => WorkErrorKind::Fatal,
        }
    }

    /// Classifies an issue tracker failure.
    ///
    /// Unavailable and unknown issues keep their own classes; everything else
    /// is fatal for `step`.
    #[must_use]
    pub fn issue_tracker(step: WorkStep, err: IssueTrackerError) -> Self {
        match err {
            IssueTrackerError::Unavailable(unavailable) => Self::IssueUnavailable(unavailable),
            IssueTrackerError::NotFound(issue) => Self::IssueNotFound(issue),
            transport @ IssueTrackerError::Transport(_) => Self::IssueTracker {
                step,
                source: transport,
            },
        }
    }

    pub(crate) const fn hosting(subject: String, step: WorkStep, source: HostingError) -> Self {
        Self::Hosting {
            subject,
            step,
            source,
        }
    }

    pub(crate) const fn vcs(subject: String, step: WorkStep, source: VcsError) -> Self {
        Self::Vcs {
            subject,
            step,
            source,
        }
    }

    pub(crate) const fn registry(
        work_key: WorkKey,
        step: WorkStep,
        source: WorkRecordStoreError,
    ) -> Self {
        Self::Registry {
            work_key,
            step,
            source,
        }
    }
}

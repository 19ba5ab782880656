//! Port contracts for work orchestration.
//!
//! Ports define infrastructure-agnostic interfaces to the issue tracker,
//! hosting service, local checkouts, credentials, registry persistence,
//! the local project catalog, and the build step.

pub mod build;
pub mod catalog;
pub mod credentials;
pub mod hosting;
pub mod issue_tracker;
pub mod store;
pub mod vcs;

pub use build::{BuildError, BuildResult, BuildRunner};
pub use catalog::ProjectCatalog;
pub use credentials::{CredentialError, CredentialProvider, CredentialPurpose, CredentialResult};
pub use hosting::{HostingError, HostingResult, HostingService, RepositoryDetails};
pub use issue_tracker::{IssueClaim, IssueTracker, IssueTrackerError, IssueTrackerResult};
pub use store::{WorkRecordStore, WorkRecordStoreError, WorkRecordStoreResult};
pub use vcs::{LocalVcs, VcsError, VcsResult};

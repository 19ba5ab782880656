//! In-memory adapters for every work port.
//!
//! These adapters model external systems deterministically and record the
//! mutations they receive, so tests can assert exactly which side effects an
//! operation caused.

mod build;
mod catalog;
mod credentials;
mod hosting;
mod issue_tracker;
mod store;
mod vcs;

pub use build::InMemoryBuildRunner;
pub use catalog::InMemoryProjectCatalog;
pub use credentials::StaticCredentialProvider;
pub use hosting::{ForkRequest, HostingOperation, InMemoryHostingService};
pub use issue_tracker::InMemoryIssueTracker;
pub use store::InMemoryWorkRecordStore;
pub use vcs::{InMemoryLocalVcs, LocalCheckout, VcsOperation, VcsOperationKind};

//! Application services for work orchestration.

mod claims;
mod error;
mod orchestrator;
mod provisioner;
mod reconciler;
mod registry;
mod reports;
mod resolver;

pub use claims::{ClaimOptions, IssueClaimCoordinator};
pub use error::{WorkError, WorkErrorKind, WorkResult, WorkStep};
pub use orchestrator::{
    AddIssuesRequest, BuildWorkRequest, StartWorkRequest, WorkOrchestrator, WorkPorts,
};
pub use provisioner::{ProvisionOutcome, RepoProvisioner};
pub use reconciler::{BranchReconciler, Reconciliation};
pub use registry::WorkRegistry;
pub use reports::{
    AddIssuesReport, BuildOutcome, BuildStatus, BuildWorkReport, RepoReport, StartWorkReport,
};
pub use resolver::{ProjectResolver, ProjectScope, ProjectSelection};

//! Liq work: cross-repository units of work.
//!
//! This crate starts, builds, and extends units of work that span one or
//! more repositories checked out under a local playground. Starting work
//! claims the referenced issues, provisions a push remote per repository,
//! and reconciles a shared work branch before the unit is recorded.
//!
//! # Architecture
//!
//! The crate follows hexagonal architecture principles:
//!
//! - **Domain**: Pure business logic with no infrastructure dependencies
//! - **Ports**: Abstract trait interfaces for external interactions
//! - **Adapters**: Concrete implementations of ports (Git CLI, files, memory)
//!
//! # Modules
//!
//! - [`work`]: Work units, issue claims, provisioning, and branch reconciliation

pub mod work;

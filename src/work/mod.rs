//! Cross-repository units of work.
//!
//! A unit of work bundles tracked issues with the repositories they touch
//! and a single work branch that must exist, consistently, in every one of
//! them. Starting work claims the issues, provisions each repository's push
//! remote (a personal fork for public repositories), reconciles the work
//! branch, and records the unit in the registry. Building work runs the
//! external build step for the selected projects. The module follows
//! hexagonal architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]
//! - Settings in [`config`]

pub mod adapters;
pub mod config;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;

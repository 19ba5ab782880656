//! Adapter implementations for work ports.

pub mod file;
pub mod git;
pub mod memory;
pub mod playground;
pub mod process;

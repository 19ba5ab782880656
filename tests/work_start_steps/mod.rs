//! Step definitions for work start and build scenarios.

pub mod world;

mod given;
mod then;
mod when;

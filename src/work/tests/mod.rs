//! Unit tests for the work module.
//!
//! Tests are organised by service, using the in-memory adapters for
//! behaviour and `mockall` doubles where a test must prove that a port is
//! never called.

//! Shared test utilities for findoc integration tests.
//!
//! - `TestHarness` wires a staging area, a file-backed result store, a queue
//!   and a worker pool inside a temp directory
//! - scripted analyzers stand in for the analysis pipeline

pub mod analyzers;
pub mod harness;

pub use analyzers::*;
pub use harness::TestHarness;

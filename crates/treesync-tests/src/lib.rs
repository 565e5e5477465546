//! treesync testing suite
//!
//! Shared fixtures for the integration tests and benchmarks of the treesync
//! workspace.

#![warn(missing_docs)]
#![warn(clippy::all)]

/// Instrumented copiers for concurrency and retry tests
pub mod concurrency_utils;

/// Scratch directory trees with pinned sizes and modification times
pub mod test_utils;

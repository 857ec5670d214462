//! dirmirror test suite
//!
//! Integration tests and benchmarks that drive the sync, engine and config
//! crates together against real temporary directory trees.

#![warn(missing_docs)]
#![warn(clippy::all)]

/// Tree building and comparison helpers
///
/// Shared by the integration tests and the benchmarks so both exercise the
/// same fixtures.
pub mod test_utils;

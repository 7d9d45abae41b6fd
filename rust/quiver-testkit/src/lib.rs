//! Test utilities for the Quiver project.
//!
//! This crate provides sample data: the small "archers" record set used by the
//! struct-array scenarios, and seeded random numeric batches. It is used by the
//! test suites and by `quiver-cmd`.

pub mod data_gen;

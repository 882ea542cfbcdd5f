//! Benchmark support crate for clustree.
//!
//! Provides seeded synthetic membership tables and parameter types used by
//! the Criterion benchmarks for tree assembly and the color passes.

pub mod error;
pub mod params;
pub mod source;

//! Shared test utilities used across clustree crates.

pub mod fixtures;
pub mod profile;
pub mod tracing;

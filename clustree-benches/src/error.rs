//! Benchmark setup error type.
//!
//! Aggregates the errors that may arise while preparing benchmark inputs so
//! that setup functions can propagate failures with `?`.

use crate::source::SyntheticError;
use clustree_core::ClustreeError;

/// Errors that may occur during benchmark setup.
#[derive(Debug, thiserror::Error)]
pub enum BenchSetupError {
    /// Synthetic membership generation failed.
    #[error("synthetic membership generation failed: {0}")]
    Synthetic(#[from] SyntheticError),
    /// Building or running the pipeline failed.
    #[error("clustree pipeline failed: {0}")]
    Clustree(#[from] ClustreeError),
}

//! Error types for synthetic membership generation.

use clustree_core::MembershipError;

/// Errors that may occur while generating a synthetic membership table.
#[derive(Debug, thiserror::Error)]
pub enum SyntheticError {
    /// The requested sample count was zero.
    #[error("sample count must be greater than zero")]
    ZeroSamples,
    /// The requested resolution count was zero.
    #[error("resolution count must be greater than zero")]
    ZeroResolutions,
    /// A probability parameter was outside `0.0..=1.0`.
    #[error("`{parameter}` must be a probability in 0..=1 (got {value})")]
    InvalidProbability {
        /// Name of the invalid parameter.
        parameter: &'static str,
        /// Value supplied.
        value: f64,
    },
    /// The generated labels did not form a valid table.
    #[error("generated table is invalid: {0}")]
    Membership(#[from] MembershipError),
}

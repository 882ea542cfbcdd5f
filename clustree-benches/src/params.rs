//! Benchmark parameter types.
//!
//! Groups related benchmark parameters so Criterion ids read the same across
//! benchmark groups.

use std::fmt;

/// Shape of the membership table a benchmark runs against.
#[derive(Clone, Debug)]
pub struct TreeBenchParams {
    /// Number of samples (table rows).
    pub sample_count: usize,
    /// Number of resolutions (table columns).
    pub kk: u32,
}

impl fmt::Display for TreeBenchParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "n={},kk={}", self.sample_count, self.kk)
    }
}

/// Parameters for a color pass benchmark run.
#[derive(Clone, Debug)]
pub struct AnnotateBenchParams {
    /// Table shape.
    pub tree: TreeBenchParams,
    /// Short name of the node color strategy.
    pub strategy: &'static str,
}

impl fmt::Display for AnnotateBenchParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.tree, self.strategy)
    }
}

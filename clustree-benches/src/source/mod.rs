//! Synthetic membership tables for benchmarks.
//!
//! Tables are generated one resolution at a time. At resolution `k` a parent
//! cluster is chosen and part of its samples split off into the new cluster
//! `k`; optional noise reassigns samples to a uniform label, breaking the
//! nesting the way real clusterings drift between resolutions.

mod errors;

pub use errors::SyntheticError;

use clustree_core::{ClusterLabel, IndexingConvention, MembershipTable, Resolution};
use rand::{Rng, SeedableRng, rngs::SmallRng};

/// Name of the uniform metadata column attached to every synthetic table.
pub const METADATA_COLUMN: &str = "score";

/// Configuration for a synthetic membership table.
#[derive(Clone, Debug)]
pub struct SyntheticMembershipConfig {
    /// Number of samples (rows).
    pub sample_count: usize,
    /// Number of resolutions (columns).
    pub kk: Resolution,
    /// Chance that a sample of the chosen parent moves to the new cluster.
    pub split_probability: f64,
    /// Chance that a sample is reassigned to a uniform label instead.
    pub noise: f64,
    /// RNG seed.
    pub seed: u64,
}

/// A generated one-based membership table.
#[derive(Debug)]
pub struct SyntheticMembership {
    table: MembershipTable,
}

impl SyntheticMembership {
    /// Generates a table from `config`.
    ///
    /// The same configuration always yields the same table.
    ///
    /// # Errors
    /// Returns [`SyntheticError`] when a parameter is out of range or the
    /// resolution count exceeds what a membership table accepts.
    pub fn generate(config: &SyntheticMembershipConfig) -> Result<Self, SyntheticError> {
        validate(config)?;
        let mut rng = SmallRng::seed_from_u64(config.seed);

        let mut previous: Vec<ClusterLabel> = vec![1; config.sample_count];
        let mut columns = vec![to_labels(&previous)];
        for resolution in 2..=config.kk {
            let parent = rng.gen_range(1..resolution);
            let next: Vec<ClusterLabel> = previous
                .iter()
                .map(|&label| next_label(label, parent, resolution, config, &mut rng))
                .collect();
            columns.push(to_labels(&next));
            previous = next;
        }

        let scores = (0..config.sample_count)
            .map(|_| rng.gen_range(0.0..1.0))
            .collect();
        let table = MembershipTable::try_new(IndexingConvention::OneBased, columns)?
            .with_metadata(METADATA_COLUMN, scores)?;
        Ok(Self { table })
    }

    /// Returns the generated table.
    #[must_use]
    pub const fn table(&self) -> &MembershipTable {
        &self.table
    }

    /// Consumes the generator output and returns the table.
    #[must_use]
    pub fn into_table(self) -> MembershipTable {
        self.table
    }
}

fn validate(config: &SyntheticMembershipConfig) -> Result<(), SyntheticError> {
    if config.sample_count == 0 {
        return Err(SyntheticError::ZeroSamples);
    }
    if config.kk == 0 {
        return Err(SyntheticError::ZeroResolutions);
    }
    for (parameter, value) in [
        ("split_probability", config.split_probability),
        ("noise", config.noise),
    ] {
        if !(0.0..=1.0).contains(&value) {
            return Err(SyntheticError::InvalidProbability { parameter, value });
        }
    }
    Ok(())
}

fn next_label(
    label: ClusterLabel,
    parent: ClusterLabel,
    resolution: Resolution,
    config: &SyntheticMembershipConfig,
    rng: &mut SmallRng,
) -> ClusterLabel {
    if rng.gen_bool(config.noise) {
        return rng.gen_range(1..=resolution);
    }
    if label == parent && rng.gen_bool(config.split_probability) {
        return resolution;
    }
    label
}

fn to_labels(labels: &[ClusterLabel]) -> Vec<i64> {
    labels.iter().copied().map(i64::from).collect()
}

#[cfg(test)]
mod tests;

//! Shared test utilities for `clustree-core`.

use clustree_test_support::{
    fixtures::{iris_membership, iris_sepal_length},
    profile::ProptestRunProfile,
};
use proptest::test_runner::Config as ProptestConfig;

use crate::{IndexingConvention, MembershipTable};

/// Name of the metadata column carried by [`iris_table`].
pub(crate) const IRIS_METADATA: &str = "sepal_length";

/// Builds a standard proptest configuration from the shared CI profile.
#[must_use]
pub(crate) fn suite_proptest_config(default_cases: u32) -> ProptestConfig {
    let profile = ProptestRunProfile::load(default_cases, false);
    ProptestConfig {
        cases: profile.cases(),
        fork: profile.fork(),
        ..ProptestConfig::default()
    }
}

/// The one-based iris membership table with its `sepal_length` column.
#[must_use]
pub(crate) fn iris_table() -> MembershipTable {
    MembershipTable::try_new(IndexingConvention::OneBased, iris_membership())
        .and_then(|table| table.with_metadata(IRIS_METADATA, iris_sepal_length()))
        .expect("iris fixture must be a valid membership table")
}

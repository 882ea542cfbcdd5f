use clustree_core::{IndexingConvention, MembershipTable};
use clustree_test_support::fixtures::{iris_membership, iris_sepal_length};

pub const SEPAL_LENGTH: &str = "sepal_length";

#[must_use]
pub fn iris_table() -> MembershipTable {
    MembershipTable::try_new(IndexingConvention::OneBased, iris_membership())
        .and_then(|table| table.with_metadata(SEPAL_LENGTH, iris_sepal_length()))
        .expect("iris fixture must be valid")
}

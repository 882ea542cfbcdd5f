//! Unit tests for the synthetic membership generator.

use super::{METADATA_COLUMN, SyntheticError, SyntheticMembership, SyntheticMembershipConfig};
use clustree_core::{ClusterTree, encode_node};
use rstest::{fixture, rstest};

#[fixture]
fn nested_config() -> SyntheticMembershipConfig {
    SyntheticMembershipConfig {
        sample_count: 256,
        kk: 6,
        split_probability: 0.5,
        noise: 0.0,
        seed: 7,
    }
}

#[rstest]
#[case::small(16, 2)]
#[case::medium(500, 8)]
#[case::single_resolution(40, 1)]
fn generator_respects_shape(
    nested_config: SyntheticMembershipConfig,
    #[case] sample_count: usize,
    #[case] kk: u32,
) {
    let generated = SyntheticMembership::generate(&SyntheticMembershipConfig {
        sample_count,
        kk,
        ..nested_config
    })
    .expect("generation should succeed");

    let table = generated.table();
    assert_eq!(table.rows(), sample_count);
    assert_eq!(table.kk(), kk);
    assert_eq!(
        table.metadata(METADATA_COLUMN).map(<[f64]>::len),
        Some(sample_count)
    );
}

#[rstest]
fn generator_is_deterministic(nested_config: SyntheticMembershipConfig) {
    let config = SyntheticMembershipConfig {
        noise: 0.1,
        ..nested_config
    };
    let left = SyntheticMembership::generate(&config).expect("first generation");
    let right = SyntheticMembership::generate(&config).expect("second generation");

    for resolution in 1..=config.kk {
        assert_eq!(
            left.table().labels(resolution),
            right.table().labels(resolution)
        );
    }
}

#[rstest]
fn first_resolution_is_a_single_cluster(nested_config: SyntheticMembershipConfig) {
    let generated = SyntheticMembership::generate(&nested_config).expect("generation");
    let tree = ClusterTree::from_membership(generated.table());
    let root = tree.node(encode_node(1, 1)).expect("root exists");
    assert_eq!(root.sample_count(), nested_config.sample_count);
}

#[rstest]
fn noiseless_tables_are_nested(nested_config: SyntheticMembershipConfig) {
    let tree = ClusterTree::from_membership(
        SyntheticMembership::generate(&nested_config)
            .expect("generation")
            .table(),
    );

    for (id, node) in tree.nodes().filter(|(_, node)| node.resolution() > 1) {
        assert_eq!(
            tree.incoming(id).count(),
            1,
            "node {id:?} at resolution {} must have one parent",
            node.resolution()
        );
    }
    tree.check_conservation().expect("samples are conserved");
}

#[rstest]
fn generator_rejects_zero_samples(nested_config: SyntheticMembershipConfig) {
    let error = SyntheticMembership::generate(&SyntheticMembershipConfig {
        sample_count: 0,
        ..nested_config
    })
    .expect_err("zero samples must fail");
    assert!(matches!(error, SyntheticError::ZeroSamples));
}

#[rstest]
fn generator_rejects_zero_resolutions(nested_config: SyntheticMembershipConfig) {
    let error = SyntheticMembership::generate(&SyntheticMembershipConfig {
        kk: 0,
        ..nested_config
    })
    .expect_err("zero resolutions must fail");
    assert!(matches!(error, SyntheticError::ZeroResolutions));
}

#[rstest]
#[case::split_above_one(1.5, 0.0, "split_probability")]
#[case::negative_noise(0.5, -0.1, "noise")]
#[case::nan_noise(0.5, f64::NAN, "noise")]
fn generator_rejects_invalid_probabilities(
    nested_config: SyntheticMembershipConfig,
    #[case] split_probability: f64,
    #[case] noise: f64,
    #[case] expected: &str,
) {
    let error = SyntheticMembership::generate(&SyntheticMembershipConfig {
        split_probability,
        noise,
        ..nested_config
    })
    .expect_err("invalid probability must fail");
    assert!(matches!(
        error,
        SyntheticError::InvalidProbability { parameter, .. } if parameter == expected
    ));
}

//! Property tests for tree assembly over generated membership tables.
#![expect(clippy::expect_used, reason = "tests require contextual panics")]

use clustree_core::{
    ClusterTree, EdgeColorStrategy, FLOW_TOLERANCE, IndexingConvention, MembershipTable,
    NamedColormap, NodeColorStrategy, annotate_edges, annotate_nodes, encode_edge, encode_node,
};
use clustree_test_support::profile::ProptestRunProfile;
use proptest::{
    collection::vec,
    prelude::any,
    prop_assert, prop_assert_eq, proptest,
    test_runner::Config,
};
use test_strategy::Arbitrary;

/// How generated samples move between resolutions.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Arbitrary)]
enum Movement {
    /// Independent labels at every resolution.
    #[weight(3)]
    Scattered,
    /// Each sample keeps its relative position, so clusters split cleanly.
    #[weight(3)]
    Nested,
    /// Every sample sits in the first cluster at every resolution.
    #[weight(1)]
    Collapsed,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Arbitrary)]
enum Convention {
    Zero,
    One,
}

impl From<Convention> for IndexingConvention {
    fn from(convention: Convention) -> Self {
        match convention {
            Convention::Zero => Self::ZeroBased,
            Convention::One => Self::OneBased,
        }
    }
}

fn label(movement: Movement, seed: u32, resolution: u32) -> i64 {
    let offset = match movement {
        Movement::Scattered => seed.rotate_left(resolution * 7) % resolution,
        Movement::Nested => {
            let scaled = (u64::from(seed) * u64::from(resolution)) >> 32;
            u32::try_from(scaled).expect("scaled seed stays below the resolution")
        }
        Movement::Collapsed => 0,
    };
    i64::from(offset)
}

fn columns(movement: Movement, kk: u32, seeds: &[u32], base: i64) -> Vec<Vec<i64>> {
    (1..=kk)
        .map(|resolution| {
            seeds
                .iter()
                .map(|seed| base + label(movement, *seed, resolution))
                .collect()
        })
        .collect()
}

fn table(movement: Movement, convention: Convention, kk: u32, seeds: &[u32]) -> MembershipTable {
    let convention = IndexingConvention::from(convention);
    let base = i64::from(convention.min_label());
    MembershipTable::try_new(convention, columns(movement, kk, seeds, base))
        .expect("generated labels stay in range")
}

fn config() -> Config {
    let profile = ProptestRunProfile::load(128, false);
    Config {
        cases: profile.cases(),
        fork: profile.fork(),
        ..Config::default()
    }
}

proptest! {
    #![proptest_config(config())]

    #[test]
    fn samples_are_conserved(
        movement in any::<Movement>(),
        convention in any::<Convention>(),
        kk in 1u32..=8,
        seeds in vec(any::<u32>(), 1..80),
    ) {
        let tree = ClusterTree::from_membership(&table(movement, convention, kk, &seeds));
        prop_assert!(tree.check_conservation().is_ok());

        for resolution in 1..=kk {
            let total: usize = tree.nodes_at(resolution).map(|(_, node)| node.sample_count()).sum();
            prop_assert_eq!(total, seeds.len());
        }
        for (_, node) in tree.nodes().filter(|(_, node)| node.resolution() > 1) {
            let id = encode_node(node.resolution(), node.label());
            let incoming: usize = tree.incoming(id).map(|(_, edge)| edge.sample_count()).sum();
            let flow: f64 = tree.incoming(id).map(|(_, edge)| edge.flow_fraction()).sum();
            prop_assert_eq!(incoming, node.sample_count());
            prop_assert!((flow - 1.0).abs() <= FLOW_TOLERANCE);
        }
        prop_assert!(tree.edges().all(|(_, edge)| edge.resolution() > 1));
    }

    #[test]
    fn row_order_does_not_matter(
        movement in any::<Movement>(),
        kk in 1u32..=6,
        seeds in vec(any::<u32>(), 1..60),
    ) {
        let mut reversed = seeds.clone();
        reversed.reverse();
        prop_assert_eq!(
            ClusterTree::from_membership(&table(movement, Convention::One, kk, &seeds)),
            ClusterTree::from_membership(&table(movement, Convention::One, kk, &reversed))
        );
    }

    #[test]
    fn conventions_agree_on_counts(
        movement in any::<Movement>(),
        kk in 2u32..=6,
        seeds in vec(any::<u32>(), 1..60),
    ) {
        let zero = ClusterTree::from_membership(&table(movement, Convention::Zero, kk, &seeds));
        let one = ClusterTree::from_membership(&table(movement, Convention::One, kk, &seeds));
        prop_assert_eq!(zero.node_count(), one.node_count());
        prop_assert_eq!(zero.edge_count(), one.edge_count());
        for (_, edge) in zero.edges() {
            let shifted = one
                .edge(encode_edge(edge.resolution(), edge.start_label() + 1, edge.end_label() + 1))
                .expect("shifted edge exists");
            prop_assert_eq!(shifted.sample_count(), edge.sample_count());
            prop_assert!((shifted.flow_fraction() - edge.flow_fraction()).abs() <= f64::EPSILON);
        }
    }

    #[test]
    fn sample_count_coloring_is_idempotent(
        movement in any::<Movement>(),
        kk in 1u32..=6,
        seeds in vec(any::<u32>(), 1..60),
    ) {
        let membership = table(movement, Convention::One, kk, &seeds);
        let color = |tree: ClusterTree| {
            annotate_nodes(tree, &NodeColorStrategy::BySampleCount, &NamedColormap::Blues, &membership)
                .map(|tree| annotate_edges(tree, &EdgeColorStrategy::BySampleCount, &NamedColormap::Reds))
                .expect("sample coloring cannot fail")
        };
        let once = color(ClusterTree::from_membership(&membership));
        let twice = color(once.clone());
        prop_assert_eq!(once, twice);
    }
}

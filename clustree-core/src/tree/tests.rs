//! Unit tests for node and edge counting.

use rstest::rstest;

use crate::{
    ClusterTree, IndexingConvention, InvariantError, MembershipTable, encode_edge, encode_node,
    test_utils::iris_table,
};

fn table(columns: Vec<Vec<i64>>) -> MembershipTable {
    MembershipTable::try_new(IndexingConvention::OneBased, columns).expect("table must build")
}

#[rstest]
#[case(1, 1, 150)]
#[case(2, 1, 70)]
#[case(2, 2, 80)]
#[case(3, 1, 45)]
#[case(3, 2, 45)]
#[case(3, 3, 60)]
fn iris_node_counts(#[case] resolution: u32, #[case] label: u32, #[case] expected: usize) {
    let tree = ClusterTree::from_membership(&iris_table());
    let node = tree
        .node(encode_node(resolution, label))
        .expect("node must exist");
    assert_eq!(node.resolution(), resolution);
    assert_eq!(node.label(), label);
    assert_eq!(node.sample_count(), expected);
}

#[rstest]
#[case(2, 1, 1, 70, 1.0)]
#[case(2, 1, 2, 80, 1.0)]
#[case(3, 1, 1, 45, 1.0)]
#[case(3, 1, 2, 25, 5.0 / 9.0)]
#[case(3, 2, 2, 20, 4.0 / 9.0)]
#[case(3, 2, 3, 60, 1.0)]
fn iris_edges(
    #[case] resolution: u32,
    #[case] start: u32,
    #[case] end: u32,
    #[case] samples: usize,
    #[case] flow: f64,
) {
    let tree = ClusterTree::from_membership(&iris_table());
    let edge = tree
        .edge(encode_edge(resolution, start, end))
        .expect("edge must exist");
    assert_eq!(edge.resolution(), resolution);
    assert_eq!(edge.start(), encode_node(resolution - 1, start));
    assert_eq!(edge.end(), encode_node(resolution, end));
    assert_eq!(edge.sample_count(), samples);
    assert!((edge.flow_fraction() - flow).abs() < 1e-12);
}

#[test]
fn iris_registry_sizes() {
    let tree = ClusterTree::from_membership(&iris_table());
    assert_eq!(tree.kk(), 3);
    assert_eq!(tree.sample_total(), 150);
    assert_eq!(tree.node_count(), 6);
    assert_eq!(tree.edge_count(), 6);
    tree.check_conservation().expect("iris tree must conserve samples");
}

#[test]
fn single_resolution_has_no_edges() {
    let tree = ClusterTree::from_membership(&table(vec![vec![1, 1, 1]]));
    assert_eq!(tree.node_count(), 1);
    assert_eq!(tree.edge_count(), 0);
    assert_eq!(
        tree.node(encode_node(1, 1)).map(|node| node.sample_count()),
        Some(3)
    );
}

#[test]
fn counts_ignore_row_order() {
    let forward = vec![vec![1, 1, 1, 1, 1], vec![1, 2, 1, 2, 2], vec![3, 1, 2, 3, 1]];
    let reversed = forward
        .iter()
        .map(|column| column.iter().rev().copied().collect())
        .collect();
    assert_eq!(
        ClusterTree::from_membership(&table(forward)),
        ClusterTree::from_membership(&table(reversed))
    );
}

#[test]
fn merged_clusters_produce_multiple_incoming_edges() {
    // Two clusters at K = 2 feed the same cluster at K = 3.
    let tree = ClusterTree::from_membership(&table(vec![
        vec![1, 1, 1, 1],
        vec![1, 1, 2, 2],
        vec![3, 3, 3, 1],
    ]));
    let destination = encode_node(3, 3);
    let incoming: Vec<_> = tree.incoming(destination).collect();
    assert_eq!(incoming.len(), 2);
    let fractions: Vec<f64> = incoming
        .iter()
        .map(|(_, edge)| edge.flow_fraction())
        .collect();
    assert!((fractions.iter().sum::<f64>() - 1.0).abs() < 1e-12);
    assert_eq!(tree.outgoing(encode_node(2, 2)).count(), 2);
}

#[test]
fn seeded_index_holds_every_label_until_sampled() {
    let membership = table(vec![vec![1, 1], vec![2, 2]]);
    let seeded = ClusterTree::skeleton(&membership).seed_node_index();
    assert_eq!(seeded.node_count(), 3);
    assert!(seeded.nodes().all(|(_, node)| node.sample_count() == 0));
    assert_eq!(
        seeded.check_conservation(),
        Err(InvariantError::SampleInfoMissing)
    );

    let sampled = seeded.with_sample_info(&membership);
    assert_eq!(sampled.node_count(), 2);
    assert!(sampled.node(encode_node(2, 1)).is_none());
    assert_eq!(sampled, ClusterTree::from_membership(&membership));
}

#[test]
fn nodes_at_is_ordered_by_label() {
    let tree = ClusterTree::from_membership(&iris_table());
    let labels: Vec<u32> = tree.nodes_at(3).map(|(_, node)| node.label()).collect();
    assert_eq!(labels, vec![1, 2, 3]);
    assert_eq!(tree.nodes_at(4).count(), 0);
}

#[test]
fn zero_based_labels_shift_ids_but_not_counts() {
    let one_based = vec![vec![1, 1, 1, 1], vec![1, 1, 2, 2], vec![1, 2, 3, 3]];
    let zero_based: Vec<Vec<i64>> = one_based
        .iter()
        .map(|column| column.iter().map(|label| label - 1).collect())
        .collect();
    let ones = ClusterTree::from_membership(&table(one_based));
    let zeros = ClusterTree::from_membership(
        &MembershipTable::try_new(IndexingConvention::ZeroBased, zero_based)
            .expect("table must build"),
    );

    assert_ne!(
        ones.nodes().map(|(id, _)| id).collect::<Vec<_>>(),
        zeros.nodes().map(|(id, _)| id).collect::<Vec<_>>()
    );
    assert_eq!(ones.edge_count(), zeros.edge_count());
    for (_, zero) in zeros.edges() {
        let one = ones
            .edge(encode_edge(
                zero.resolution(),
                zero.start_label() + 1,
                zero.end_label() + 1,
            ))
            .expect("shifted edge must exist");
        assert_eq!(one.sample_count(), zero.sample_count());
        assert_eq!(one.flow_fraction(), zero.flow_fraction());
    }
}

//! Directed graph view over an annotated clustering tree.

use std::collections::BTreeMap;

use crate::{
    annotate::ValueRange,
    identity::{EdgeId, NodeId, Resolution},
    membership::IndexingConvention,
    tree::{ClusterTree, Edge, Node},
};

/// Directed graph whose vertices are tree nodes and whose arcs run from
/// `start` to `end` of every tree edge.
///
/// Layout engines and renderers consume this type; it carries the node and
/// edge attributes unchanged together with the ranges the color passes
/// normalised against.
///
/// # Examples
/// ```
/// use clustree_core::{encode_node, ClusterGraph, ClusterTree, IndexingConvention, MembershipTable};
///
/// let table = MembershipTable::try_new(
///     IndexingConvention::OneBased,
///     vec![vec![1, 1, 1], vec![1, 2, 2]],
/// )?;
/// let graph = ClusterGraph::from(ClusterTree::from_membership(&table));
/// assert_eq!(graph.roots().collect::<Vec<_>>(), vec![encode_node(1, 1)]);
/// assert_eq!(graph.successors(encode_node(1, 1)).count(), 2);
/// # Ok::<(), clustree_core::MembershipError>(())
/// ```
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ClusterGraph {
    kk: Resolution,
    sample_total: usize,
    convention: IndexingConvention,
    nodes: BTreeMap<NodeId, Node>,
    edges: BTreeMap<EdgeId, Edge>,
    #[cfg_attr(feature = "serde", serde(skip))]
    outgoing: BTreeMap<NodeId, Vec<EdgeId>>,
    #[cfg_attr(feature = "serde", serde(skip))]
    incoming: BTreeMap<NodeId, Vec<EdgeId>>,
    node_scale: Option<ValueRange>,
    edge_scale: Option<ValueRange>,
}

impl From<ClusterTree> for ClusterGraph {
    fn from(tree: ClusterTree) -> Self {
        let (shape, nodes, edges) = tree.into_parts();
        let mut outgoing: BTreeMap<NodeId, Vec<EdgeId>> = BTreeMap::new();
        let mut incoming: BTreeMap<NodeId, Vec<EdgeId>> = BTreeMap::new();
        for (id, edge) in &edges {
            outgoing.entry(edge.start()).or_default().push(*id);
            incoming.entry(edge.end()).or_default().push(*id);
        }
        Self {
            kk: shape.kk,
            sample_total: shape.rows,
            convention: shape.convention,
            nodes,
            edges,
            outgoing,
            incoming,
            node_scale: shape.node_scale,
            edge_scale: shape.edge_scale,
        }
    }
}

impl ClusterGraph {
    /// Number of resolutions.
    #[must_use]
    pub fn kk(&self) -> Resolution {
        self.kk
    }

    /// Number of samples in the source table.
    #[must_use]
    pub fn sample_total(&self) -> usize {
        self.sample_total
    }

    /// Label convention of the source table.
    #[must_use]
    pub fn convention(&self) -> IndexingConvention {
        self.convention
    }

    /// Number of vertices.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of arcs.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Looks up a vertex.
    #[must_use]
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    /// Looks up an arc.
    #[must_use]
    pub fn edge(&self, id: EdgeId) -> Option<&Edge> {
        self.edges.get(&id)
    }

    /// Every vertex ordered by identifier.
    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &Node)> {
        self.nodes.iter().map(|(id, node)| (*id, node))
    }

    /// Every arc ordered by identifier.
    pub fn edges(&self) -> impl Iterator<Item = (EdgeId, &Edge)> {
        self.edges.iter().map(|(id, edge)| (*id, edge))
    }

    /// Arcs leaving `node`.
    pub fn out_edges(&self, node: NodeId) -> impl Iterator<Item = (EdgeId, &Edge)> {
        self.adjacent(&self.outgoing, node)
    }

    /// Arcs entering `node`.
    pub fn in_edges(&self, node: NodeId) -> impl Iterator<Item = (EdgeId, &Edge)> {
        self.adjacent(&self.incoming, node)
    }

    /// Vertices at the next resolution reached from `node`.
    pub fn successors(&self, node: NodeId) -> impl Iterator<Item = NodeId> {
        self.out_edges(node).map(|(_, edge)| edge.end())
    }

    /// Vertices at the previous resolution feeding `node`.
    pub fn predecessors(&self, node: NodeId) -> impl Iterator<Item = NodeId> {
        self.in_edges(node).map(|(_, edge)| edge.start())
    }

    /// Vertices without incoming arcs.
    pub fn roots(&self) -> impl Iterator<Item = NodeId> {
        self.nodes
            .keys()
            .copied()
            .filter(|id| !self.incoming.contains_key(id))
    }

    /// Vertex identifiers grouped by resolution and ordered by label, the
    /// layering a multipartite layout expects.
    #[must_use]
    pub fn layers(&self) -> BTreeMap<Resolution, Vec<NodeId>> {
        let mut layers: BTreeMap<Resolution, Vec<(u32, NodeId)>> = BTreeMap::new();
        for (id, node) in &self.nodes {
            layers
                .entry(node.resolution())
                .or_default()
                .push((node.label(), *id));
        }
        layers
            .into_iter()
            .map(|(resolution, mut members)| {
                members.sort_unstable();
                (resolution, members.into_iter().map(|(_, id)| id).collect())
            })
            .collect()
    }

    /// Range the node color pass normalised against, for a colorbar.
    #[must_use]
    pub fn node_scale(&self) -> Option<ValueRange> {
        self.node_scale
    }

    /// Range the edge color pass normalised against, for a colorbar.
    #[must_use]
    pub fn edge_scale(&self) -> Option<ValueRange> {
        self.edge_scale
    }

    fn adjacent<'a>(
        &'a self,
        index: &'a BTreeMap<NodeId, Vec<EdgeId>>,
        node: NodeId,
    ) -> impl Iterator<Item = (EdgeId, &'a Edge)> + 'a {
        index
            .get(&node)
            .into_iter()
            .flatten()
            .filter_map(|id| self.edges.get(id).map(|edge| (*id, edge)))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;
    use crate::{encode_node, test_utils::iris_table};

    fn iris_graph() -> ClusterGraph {
        ClusterGraph::from(ClusterTree::from_membership(&iris_table()))
    }

    #[test]
    fn mirrors_tree_registries() {
        let tree = ClusterTree::from_membership(&iris_table());
        let graph = ClusterGraph::from(tree.clone());
        assert_eq!(graph.node_count(), tree.node_count());
        assert_eq!(graph.edge_count(), tree.edge_count());
        assert!(tree.nodes().all(|(id, node)| graph.node(id) == Some(node)));
        assert!(tree.edges().all(|(id, edge)| graph.edge(id) == Some(edge)));
        assert_eq!(graph.sample_total(), 150);
        assert_eq!(graph.kk(), 3);
    }

    #[test]
    fn adjacency_follows_edges() {
        let graph = iris_graph();
        let successors: BTreeSet<_> = graph.successors(encode_node(2, 1)).collect();
        assert_eq!(
            successors,
            BTreeSet::from([encode_node(3, 1), encode_node(3, 2)])
        );
        let predecessors: BTreeSet<_> = graph.predecessors(encode_node(3, 2)).collect();
        assert_eq!(
            predecessors,
            BTreeSet::from([encode_node(2, 1), encode_node(2, 2)])
        );
        assert_eq!(graph.successors(encode_node(3, 3)).count(), 0);
        assert_eq!(graph.in_edges(encode_node(1, 1)).count(), 0);
    }

    #[test]
    fn single_root_and_layers() {
        let graph = iris_graph();
        assert_eq!(graph.roots().collect::<Vec<_>>(), vec![encode_node(1, 1)]);
        let layers = graph.layers();
        assert_eq!(layers.len(), 3);
        assert_eq!(
            layers.get(&3),
            Some(&vec![encode_node(3, 1), encode_node(3, 2), encode_node(3, 3)])
        );
    }
}

//! Node and edge registries computed from a membership table.
//!
//! A node stands for one cluster at one resolution and counts the samples
//! assigned to it. An edge joins a cluster at resolution `K - 1` to a cluster
//! at resolution `K` and counts the samples that moved between them. Its flow
//! fraction is normalised by the destination node, so the incoming fractions
//! of every node past the first resolution sum to one.

use std::collections::BTreeMap;

use tracing::{debug, instrument};

use crate::{
    annotate::ValueRange,
    color::Rgba,
    error::InvariantError,
    identity::{ClusterLabel, EdgeId, NodeId, Resolution, encode_edge, encode_node},
    image::NodeImage,
    membership::{IndexingConvention, MembershipTable},
};

/// Tolerance used when checking that incoming flow fractions sum to one.
pub const FLOW_TOLERANCE: f64 = 1e-9;

/// A cluster at one resolution.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Node {
    resolution: Resolution,
    label: ClusterLabel,
    sample_count: usize,
    color: Option<Rgba>,
    image: Option<NodeImage>,
}

impl Node {
    const fn new(resolution: Resolution, label: ClusterLabel) -> Self {
        Self {
            resolution,
            label,
            sample_count: 0,
            color: None,
            image: None,
        }
    }

    /// Resolution the cluster belongs to.
    #[must_use]
    pub fn resolution(&self) -> Resolution {
        self.resolution
    }

    /// Label of the cluster at its resolution.
    #[must_use]
    pub fn label(&self) -> ClusterLabel {
        self.label
    }

    /// Number of samples assigned to the cluster.
    #[must_use]
    pub fn sample_count(&self) -> usize {
        self.sample_count
    }

    /// Color assigned by the node color pass.
    #[must_use]
    pub fn color(&self) -> Option<Rgba> {
        self.color
    }

    /// Image attached by the image pass.
    #[must_use]
    pub fn image(&self) -> Option<&NodeImage> {
        self.image.as_ref()
    }

    pub(crate) fn set_color(&mut self, color: Option<Rgba>) {
        self.color = color;
    }

    pub(crate) fn set_image(&mut self, image: NodeImage) {
        self.image = Some(image);
    }
}

/// Samples moving from a cluster at resolution `K - 1` to one at `K`.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Edge {
    resolution: Resolution,
    start_label: ClusterLabel,
    end_label: ClusterLabel,
    start: NodeId,
    end: NodeId,
    sample_count: usize,
    flow_fraction: f64,
    color: Option<Rgba>,
}

impl Edge {
    /// Resolution of the destination cluster.
    #[must_use]
    pub fn resolution(&self) -> Resolution {
        self.resolution
    }

    /// Label of the source cluster at `resolution - 1`.
    #[must_use]
    pub fn start_label(&self) -> ClusterLabel {
        self.start_label
    }

    /// Label of the destination cluster at `resolution`.
    #[must_use]
    pub fn end_label(&self) -> ClusterLabel {
        self.end_label
    }

    /// Source node.
    #[must_use]
    pub fn start(&self) -> NodeId {
        self.start
    }

    /// Destination node.
    #[must_use]
    pub fn end(&self) -> NodeId {
        self.end
    }

    /// Number of samples that moved along the edge.
    #[must_use]
    pub fn sample_count(&self) -> usize {
        self.sample_count
    }

    /// Share of the destination node's samples that arrived along this edge.
    #[must_use]
    pub fn flow_fraction(&self) -> f64 {
        self.flow_fraction
    }

    /// Color assigned by the edge color pass.
    #[must_use]
    pub fn color(&self) -> Option<Rgba> {
        self.color
    }

    pub(crate) fn set_color(&mut self, color: Option<Rgba>) {
        self.color = color;
    }
}

/// Node and edge registries of a clustering tree.
///
/// # Examples
/// ```
/// use clustree_core::{encode_node, ClusterTree, IndexingConvention, MembershipTable};
///
/// let table = MembershipTable::try_new(
///     IndexingConvention::OneBased,
///     vec![vec![1, 1, 1, 1], vec![1, 1, 2, 2]],
/// )?;
/// let tree = ClusterTree::from_membership(&table);
/// assert_eq!(tree.node_count(), 3);
/// assert_eq!(tree.edge_count(), 2);
/// let node = tree.node(encode_node(2, 2)).expect("node exists");
/// assert_eq!(node.sample_count(), 2);
/// # Ok::<(), clustree_core::MembershipError>(())
/// ```
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ClusterTree {
    kk: Resolution,
    rows: usize,
    convention: IndexingConvention,
    sampled: bool,
    nodes: BTreeMap<NodeId, Node>,
    edges: BTreeMap<EdgeId, Edge>,
    node_scale: Option<ValueRange>,
    edge_scale: Option<ValueRange>,
}

impl ClusterTree {
    /// An empty registry shaped after `table`.
    #[must_use]
    pub fn skeleton(table: &MembershipTable) -> Self {
        Self {
            kk: table.kk(),
            rows: table.rows(),
            convention: table.convention(),
            sampled: false,
            nodes: BTreeMap::new(),
            edges: BTreeMap::new(),
            node_scale: None,
            edge_scale: None,
        }
    }

    /// Counts nodes and edges for every resolution in `table`.
    #[must_use]
    pub fn from_membership(table: &MembershipTable) -> Self {
        Self::skeleton(table).with_sample_info(table)
    }

    /// Seeds the registry with every label the convention allows at each
    /// resolution, each holding zero samples.
    ///
    /// Inserts `kk * (kk + 1) / 2` nodes regardless of the sample count.
    #[must_use]
    #[instrument(name = "core.node_index", skip_all, fields(kk = self.kk))]
    pub fn seed_node_index(mut self) -> Self {
        for resolution in 1..=self.kk {
            for label in self.convention.labels(resolution) {
                self.nodes
                    .entry(encode_node(resolution, label))
                    .or_insert_with(|| Node::new(resolution, label));
            }
        }
        debug!(nodes = self.nodes.len(), "seeded node index");
        self
    }

    /// Counts samples per node and derives the edges between adjacent
    /// resolutions.
    ///
    /// Seeded nodes that no sample reaches are dropped. Presentation
    /// attributes on surviving nodes are kept; edges are rebuilt.
    #[must_use]
    #[instrument(
        name = "core.sample_info",
        skip_all,
        fields(kk = table.kk(), rows = table.rows())
    )]
    pub fn with_sample_info(mut self, table: &MembershipTable) -> Self {
        self.kk = table.kk();
        self.rows = table.rows();
        self.convention = table.convention();
        self.edges.clear();
        self.edge_scale = None;
        for node in self.nodes.values_mut() {
            node.sample_count = 0;
        }

        let mut previous: Option<&[ClusterLabel]> = None;
        for resolution in table.resolutions() {
            let Some(current) = table.labels(resolution) else {
                continue;
            };
            let counts = label_counts(current);
            for (&label, &count) in &counts {
                self.nodes
                    .entry(encode_node(resolution, label))
                    .or_insert_with(|| Node::new(resolution, label))
                    .sample_count = count;
            }
            if let Some(previous) = previous {
                for ((start_label, end_label), count) in transition_counts(previous, current) {
                    let destination = counts.get(&end_label).copied().unwrap_or(count);
                    self.edges.insert(
                        encode_edge(resolution, start_label, end_label),
                        Edge {
                            resolution,
                            start_label,
                            end_label,
                            start: encode_node(resolution - 1, start_label),
                            end: encode_node(resolution, end_label),
                            sample_count: count,
                            flow_fraction: fraction(count, destination),
                            color: None,
                        },
                    );
                }
            }
            previous = Some(current);
        }

        self.nodes.retain(|_, node| node.sample_count > 0);
        self.sampled = true;
        debug_assert!(self.check_conservation().is_ok());
        debug!(
            nodes = self.nodes.len(),
            edges = self.edges.len(),
            "computed sample information"
        );
        self
    }

    /// Number of resolutions.
    #[must_use]
    pub fn kk(&self) -> Resolution {
        self.kk
    }

    /// Number of samples in the source table.
    #[must_use]
    pub fn sample_total(&self) -> usize {
        self.rows
    }

    /// Label convention of the source table.
    #[must_use]
    pub fn convention(&self) -> IndexingConvention {
        self.convention
    }

    /// Whether sample counts and edges have been computed.
    #[must_use]
    pub fn has_sample_info(&self) -> bool {
        self.sampled
    }

    /// Looks up a node.
    #[must_use]
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    /// Looks up an edge.
    #[must_use]
    pub fn edge(&self, id: EdgeId) -> Option<&Edge> {
        self.edges.get(&id)
    }

    /// Every node ordered by identifier.
    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &Node)> {
        self.nodes.iter().map(|(id, node)| (*id, node))
    }

    /// Every edge ordered by identifier.
    pub fn edges(&self) -> impl Iterator<Item = (EdgeId, &Edge)> {
        self.edges.iter().map(|(id, edge)| (*id, edge))
    }

    /// Number of nodes.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of edges.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Nodes at `resolution`, ordered by label.
    pub fn nodes_at(&self, resolution: Resolution) -> impl Iterator<Item = (NodeId, &Node)> {
        self.nodes().filter(move |(_, node)| node.resolution == resolution)
    }

    /// Edges arriving at `node`.
    pub fn incoming(&self, node: NodeId) -> impl Iterator<Item = (EdgeId, &Edge)> {
        self.edges().filter(move |(_, edge)| edge.end == node)
    }

    /// Edges leaving `node`.
    pub fn outgoing(&self, node: NodeId) -> impl Iterator<Item = (EdgeId, &Edge)> {
        self.edges().filter(move |(_, edge)| edge.start == node)
    }

    /// Range the node color pass normalised against, if it was continuous.
    #[must_use]
    pub fn node_scale(&self) -> Option<ValueRange> {
        self.node_scale
    }

    /// Range the edge color pass normalised against, if it was continuous.
    #[must_use]
    pub fn edge_scale(&self) -> Option<ValueRange> {
        self.edge_scale
    }

    /// Checks sample conservation across the registries.
    ///
    /// # Errors
    /// Returns the first [`InvariantError`] found: node counts at a
    /// resolution that do not add up to the sample total, incoming edge counts
    /// or fractions that do not match their destination, or an edge ending at
    /// resolution 1.
    pub fn check_conservation(&self) -> Result<(), InvariantError> {
        if !self.sampled {
            return Err(InvariantError::SampleInfoMissing);
        }

        let mut totals: BTreeMap<Resolution, usize> = BTreeMap::new();
        for node in self.nodes.values() {
            *totals.entry(node.resolution).or_insert(0) += node.sample_count;
        }
        for resolution in 1..=self.kk {
            let found = totals.get(&resolution).copied().unwrap_or(0);
            if found != self.rows {
                return Err(InvariantError::NodeTotal {
                    resolution,
                    expected: self.rows,
                    found,
                });
            }
        }

        let mut incoming: BTreeMap<NodeId, (usize, f64)> = BTreeMap::new();
        for (id, edge) in &self.edges {
            if edge.resolution <= 1 {
                return Err(InvariantError::EdgeAtFirstResolution { edge: *id });
            }
            let entry = incoming.entry(edge.end).or_insert((0, 0.0));
            entry.0 += edge.sample_count;
            entry.1 = add(entry.1, edge.flow_fraction);
        }
        for (id, node) in &self.nodes {
            if node.resolution == 1 {
                continue;
            }
            let (found, sum) = incoming.get(id).copied().unwrap_or((0, 0.0));
            if found != node.sample_count {
                return Err(InvariantError::IncomingTotal {
                    node: *id,
                    expected: node.sample_count,
                    found,
                });
            }
            if !within_tolerance(sum) {
                return Err(InvariantError::FlowFraction { node: *id, sum });
            }
        }
        Ok(())
    }

    pub(crate) fn nodes_mut(&mut self) -> impl Iterator<Item = (NodeId, &mut Node)> {
        self.nodes.iter_mut().map(|(id, node)| (*id, node))
    }

    pub(crate) fn edges_mut(&mut self) -> impl Iterator<Item = &mut Edge> {
        self.edges.values_mut()
    }

    pub(crate) fn set_node_scale(&mut self, scale: Option<ValueRange>) {
        self.node_scale = scale;
    }

    pub(crate) fn set_edge_scale(&mut self, scale: Option<ValueRange>) {
        self.edge_scale = scale;
    }

    pub(crate) fn into_parts(self) -> (TreeShape, BTreeMap<NodeId, Node>, BTreeMap<EdgeId, Edge>) {
        (
            TreeShape {
                kk: self.kk,
                rows: self.rows,
                convention: self.convention,
                node_scale: self.node_scale,
                edge_scale: self.edge_scale,
            },
            self.nodes,
            self.edges,
        )
    }
}

/// Scalar properties carried from a tree into its graph.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct TreeShape {
    pub(crate) kk: Resolution,
    pub(crate) rows: usize,
    pub(crate) convention: IndexingConvention,
    pub(crate) node_scale: Option<ValueRange>,
    pub(crate) edge_scale: Option<ValueRange>,
}

fn label_counts(labels: &[ClusterLabel]) -> BTreeMap<ClusterLabel, usize> {
    let mut counts = BTreeMap::new();
    for &label in labels {
        *counts.entry(label).or_insert(0) += 1;
    }
    counts
}

fn transition_counts(
    previous: &[ClusterLabel],
    current: &[ClusterLabel],
) -> BTreeMap<(ClusterLabel, ClusterLabel), usize> {
    let mut counts = BTreeMap::new();
    for (&start, &end) in previous.iter().zip(current) {
        *counts.entry((start, end)).or_insert(0) += 1;
    }
    counts
}

#[expect(
    clippy::cast_precision_loss,
    clippy::float_arithmetic,
    reason = "flow fractions are ratios of sample counts"
)]
fn fraction(count: usize, total: usize) -> f64 {
    count as f64 / total as f64
}

#[expect(clippy::float_arithmetic, reason = "fractions are summed for the check")]
fn add(left: f64, right: f64) -> f64 {
    left + right
}

#[expect(clippy::float_arithmetic, reason = "tolerance comparison")]
fn within_tolerance(sum: f64) -> bool {
    (sum - 1.0).abs() <= FLOW_TOLERANCE
}

#[cfg(test)]
mod tests;

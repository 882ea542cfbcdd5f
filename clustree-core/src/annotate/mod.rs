//! Presentation passes that color the nodes and edges of a tree.
//!
//! Each pass consumes a [`ClusterTree`] and returns it with colors assigned.
//! Structural fields (identities, counts, flow fractions) are never touched,
//! and running a pass twice yields the same tree as running it once.

use std::{collections::BTreeMap, fmt, str::FromStr};

use tracing::{debug, instrument};

use crate::{
    color::{Colormap, Rgba, palette_color},
    error::{ClustreeError, ParseError},
    identity::{NodeId, encode_node},
    membership::MembershipTable,
    tree::ClusterTree,
};

/// Reduces the metadata values of a node's samples to one number.
#[derive(Clone, Copy)]
pub enum Aggregator {
    /// Sum of the values.
    Sum,
    /// Arithmetic mean.
    Mean,
    /// Median; the mean of the two central values for even counts.
    Median,
    /// Smallest value.
    Min,
    /// Largest value.
    Max,
    /// Number of values.
    Count,
    /// Caller-supplied reduction over a non-empty slice.
    Custom(fn(&[f64]) -> f64),
}

impl Aggregator {
    /// Reduces `values`, returning `None` for an empty slice.
    ///
    /// # Examples
    /// ```
    /// use clustree_core::Aggregator;
    ///
    /// assert_eq!(Aggregator::Sum.apply(&[1.0, 2.0, 4.0]), Some(7.0));
    /// assert_eq!(Aggregator::Median.apply(&[4.0, 1.0, 2.0, 3.0]), Some(2.5));
    /// assert_eq!(Aggregator::Mean.apply(&[]), None);
    /// ```
    #[must_use]
    #[expect(
        clippy::float_arithmetic,
        clippy::cast_precision_loss,
        reason = "aggregates are floating-point reductions"
    )]
    pub fn apply(self, values: &[f64]) -> Option<f64> {
        if values.is_empty() {
            return None;
        }
        let value = match self {
            Self::Sum => values.iter().sum(),
            Self::Mean => values.iter().sum::<f64>() / values.len() as f64,
            Self::Median => {
                let mut sorted = values.to_vec();
                sorted.sort_by(f64::total_cmp);
                let middle = sorted.len() / 2;
                if sorted.len() % 2 == 0 {
                    (sorted[middle - 1] + sorted[middle]) / 2.0
                } else {
                    sorted[middle]
                }
            }
            Self::Min => values.iter().copied().fold(f64::INFINITY, f64::min),
            Self::Max => values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            Self::Count => values.len() as f64,
            Self::Custom(reduce) => reduce(values),
        };
        Some(value)
    }

    /// Name of the aggregator; `"custom"` for caller-supplied reductions.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Sum => "sum",
            Self::Mean => "mean",
            Self::Median => "median",
            Self::Min => "min",
            Self::Max => "max",
            Self::Count => "count",
            Self::Custom(_) => "custom",
        }
    }
}

impl fmt::Debug for Aggregator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Aggregator({})", self.as_str())
    }
}

impl FromStr for Aggregator {
    type Err = ParseError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name.trim().to_ascii_lowercase().as_str() {
            "sum" => Ok(Self::Sum),
            "mean" | "average" => Ok(Self::Mean),
            "median" => Ok(Self::Median),
            "min" => Ok(Self::Min),
            "max" => Ok(Self::Max),
            "count" | "size" => Ok(Self::Count),
            _ => Err(ParseError::UnknownAggregator {
                name: name.to_owned(),
            }),
        }
    }
}

/// How the node color pass assigns colors.
#[derive(Clone, Debug, Default)]
pub enum NodeColorStrategy {
    /// Palette entry indexed by the node's resolution.
    #[default]
    ByResolution,
    /// Colormap over the globally normalised sample count.
    BySampleCount,
    /// Colormap over a per-node aggregate of a metadata column.
    ByAggregateColumn {
        /// Metadata column to aggregate.
        column: String,
        /// Reduction applied to the column values of each node's samples.
        aggregator: Option<Aggregator>,
    },
    /// The same color on every node.
    Fixed(Rgba),
}

/// How the edge color pass assigns colors.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum EdgeColorStrategy {
    /// Palette entry indexed by the destination resolution.
    ByResolution,
    /// Colormap over the globally normalised sample count.
    #[default]
    BySampleCount,
    /// The same color on every edge.
    Fixed(Rgba),
}

/// The values a continuous color pass normalised against.
///
/// Renderers use it to label a colorbar.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ValueRange {
    /// Smallest observed value; maps to colormap position 0.
    pub min: f64,
    /// Largest observed value; maps to colormap position 1.
    pub max: f64,
}

impl ValueRange {
    /// Spans `values`, skipping `NaN`. Returns `None` when nothing remains.
    ///
    /// # Examples
    /// ```
    /// use clustree_core::ValueRange;
    ///
    /// let range = ValueRange::spanning([3.0, f64::NAN, 1.0, 2.0]).expect("non-empty");
    /// assert_eq!(range, ValueRange { min: 1.0, max: 3.0 });
    /// assert_eq!(range.normalise(2.0), 0.5);
    /// ```
    pub fn spanning(values: impl IntoIterator<Item = f64>) -> Option<Self> {
        values
            .into_iter()
            .filter(|value| !value.is_nan())
            .fold(None, |range: Option<Self>, value| {
                Some(range.map_or(
                    Self {
                        min: value,
                        max: value,
                    },
                    |range| Self {
                        min: range.min.min(value),
                        max: range.max.max(value),
                    },
                ))
            })
    }

    /// Position of `value` within the range; `0` when the range is degenerate.
    #[must_use]
    #[expect(clippy::float_arithmetic, reason = "min-max normalisation")]
    pub fn normalise(self, value: f64) -> f64 {
        let width = self.max - self.min;
        if width > 0.0 {
            (value - self.min) / width
        } else {
            0.0
        }
    }
}

/// Colors every node of `tree` according to `strategy`.
///
/// # Errors
/// Returns [`ClustreeError::MissingAggregator`] when
/// [`NodeColorStrategy::ByAggregateColumn`] has no aggregator and
/// [`ClustreeError::UnknownColumn`] when the table lacks the named column.
///
/// # Examples
/// ```
/// use clustree_core::{
///     annotate_nodes, ClusterTree, IndexingConvention, MembershipTable, NamedColormap,
///     NodeColorStrategy, Rgba,
/// };
///
/// let table = MembershipTable::try_new(IndexingConvention::OneBased, vec![vec![1, 1]])?;
/// let tree = ClusterTree::from_membership(&table);
/// let red = Rgba::from_hex(0xff0000);
/// let tree = annotate_nodes(tree, &NodeColorStrategy::Fixed(red), &NamedColormap::Blues, &table)?;
/// assert!(tree.nodes().all(|(_, node)| node.color() == Some(red)));
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[instrument(
    name = "core.node_color",
    err,
    skip_all,
    fields(strategy = strategy_name(strategy), colormap = colormap.name())
)]
pub fn annotate_nodes(
    mut tree: ClusterTree,
    strategy: &NodeColorStrategy,
    colormap: &dyn Colormap,
    table: &MembershipTable,
) -> Result<ClusterTree, ClustreeError> {
    match strategy {
        NodeColorStrategy::ByResolution => {
            for (_, node) in tree.nodes_mut() {
                node.set_color(Some(palette_color(palette_index(node.resolution()))));
            }
            tree.set_node_scale(None);
        }
        NodeColorStrategy::Fixed(color) => {
            for (_, node) in tree.nodes_mut() {
                node.set_color(Some(*color));
            }
            tree.set_node_scale(None);
        }
        NodeColorStrategy::BySampleCount => {
            let values: BTreeMap<NodeId, f64> = tree
                .nodes()
                .map(|(id, node)| (id, count_value(node.sample_count())))
                .collect();
            let scale = apply_node_values(&mut tree, &values, colormap);
            tree.set_node_scale(scale);
        }
        NodeColorStrategy::ByAggregateColumn { column, aggregator } => {
            let aggregator = aggregator.ok_or_else(|| ClustreeError::MissingAggregator {
                column: column.clone(),
            })?;
            let metadata = table
                .metadata(column)
                .ok_or_else(|| ClustreeError::UnknownColumn {
                    column: column.clone(),
                })?;
            let values = aggregate_by_node(table, metadata, aggregator);
            let scale = apply_node_values(&mut tree, &values, colormap);
            tree.set_node_scale(scale);
        }
    }
    debug!(scale = ?tree.node_scale(), "colored nodes");
    Ok(tree)
}

/// Colors every edge of `tree` according to `strategy`.
#[must_use]
#[instrument(
    name = "core.edge_color",
    skip_all,
    fields(strategy = ?strategy, colormap = colormap.name())
)]
pub fn annotate_edges(
    mut tree: ClusterTree,
    strategy: &EdgeColorStrategy,
    colormap: &dyn Colormap,
) -> ClusterTree {
    match strategy {
        EdgeColorStrategy::ByResolution => {
            for edge in tree.edges_mut() {
                edge.set_color(Some(palette_color(palette_index(edge.resolution()))));
            }
            tree.set_edge_scale(None);
        }
        EdgeColorStrategy::Fixed(color) => {
            for edge in tree.edges_mut() {
                edge.set_color(Some(*color));
            }
            tree.set_edge_scale(None);
        }
        EdgeColorStrategy::BySampleCount => {
            let scale = ValueRange::spanning(
                tree.edges().map(|(_, edge)| count_value(edge.sample_count())),
            );
            for edge in tree.edges_mut() {
                let color = scale
                    .map(|scale| colormap.map(scale.normalise(count_value(edge.sample_count()))));
                edge.set_color(color);
            }
            tree.set_edge_scale(scale);
        }
    }
    debug!(scale = ?tree.edge_scale(), "colored edges");
    tree
}

fn strategy_name(strategy: &NodeColorStrategy) -> &'static str {
    match strategy {
        NodeColorStrategy::ByResolution => "resolution",
        NodeColorStrategy::BySampleCount => "samples",
        NodeColorStrategy::ByAggregateColumn { .. } => "column",
        NodeColorStrategy::Fixed(_) => "fixed",
    }
}

fn palette_index(resolution: u32) -> usize {
    usize::try_from(resolution).unwrap_or(usize::MAX)
}

#[expect(
    clippy::cast_precision_loss,
    reason = "sample counts are normalised as floating-point values"
)]
fn count_value(count: usize) -> f64 {
    count as f64
}

/// Colors nodes from `values`, leaving nodes without a value uncolored.
fn apply_node_values(
    tree: &mut ClusterTree,
    values: &BTreeMap<NodeId, f64>,
    colormap: &dyn Colormap,
) -> Option<ValueRange> {
    let scale = ValueRange::spanning(tree.nodes().filter_map(|(id, _)| values.get(&id).copied()));
    for (id, node) in tree.nodes_mut() {
        let color = scale
            .zip(values.get(&id))
            .map(|(scale, value)| colormap.map(scale.normalise(*value)));
        node.set_color(color);
    }
    scale
}

/// Groups `metadata` by each sample's label at every resolution and reduces
/// each group with `aggregator`.
///
/// `NaN` marks a missing value and is left out of its group. A node whose
/// values are all missing, or whose reduction is `NaN`, gets no value.
fn aggregate_by_node(
    table: &MembershipTable,
    metadata: &[f64],
    aggregator: Aggregator,
) -> BTreeMap<NodeId, f64> {
    let mut values = BTreeMap::new();
    for resolution in table.resolutions() {
        let Some(labels) = table.labels(resolution) else {
            continue;
        };
        let mut groups: BTreeMap<u32, Vec<f64>> = BTreeMap::new();
        for (&label, &value) in labels.iter().zip(metadata) {
            let group = groups.entry(label).or_default();
            if !value.is_nan() {
                group.push(value);
            }
        }
        for (label, group) in groups {
            if let Some(value) = aggregator.apply(&group).filter(|value| !value.is_nan()) {
                values.insert(encode_node(resolution, label), value);
            }
        }
    }
    values
}

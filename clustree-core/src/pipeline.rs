//! Clustering-tree assembly for the clustree library.
//!
//! Provides the [`Clustree`] runtime entry point, which runs the enabled
//! stages in a fixed order: node index, sample information, images, node
//! color, edge color.

use std::sync::Arc;

use tracing::{debug, info, instrument};

use crate::{
    Result,
    annotate::{EdgeColorStrategy, NodeColorStrategy, annotate_edges, annotate_nodes},
    builder::SetupToggles,
    color::Colormap,
    graph::ClusterGraph,
    image::{ImageProvider, attach_images},
    membership::MembershipTable,
    tree::ClusterTree,
};

/// Entry point for assembling clustering trees.
///
/// # Examples
/// ```
/// use clustree_core::{encode_node, ClustreeBuilder, IndexingConvention, MembershipTable};
///
/// let table = MembershipTable::try_new(
///     IndexingConvention::OneBased,
///     vec![vec![1, 1, 1, 1], vec![1, 1, 2, 2]],
/// )?;
/// let clustree = ClustreeBuilder::new().build()?;
/// let graph = clustree.run(&table)?;
/// assert_eq!(graph.node_count(), 3);
/// assert_eq!(graph.edge_count(), 2);
/// assert!(graph.node(encode_node(2, 1)).and_then(|node| node.color()).is_some());
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Clone)]
pub struct Clustree {
    node_color: NodeColorStrategy,
    node_colormap: Arc<dyn Colormap>,
    edge_color: EdgeColorStrategy,
    edge_colormap: Arc<dyn Colormap>,
    setup: SetupToggles,
}

impl Clustree {
    pub(crate) fn new(
        node_color: NodeColorStrategy,
        node_colormap: Arc<dyn Colormap>,
        edge_color: EdgeColorStrategy,
        edge_colormap: Arc<dyn Colormap>,
        setup: SetupToggles,
    ) -> Self {
        Self {
            node_color,
            node_colormap,
            edge_color,
            edge_colormap,
            setup,
        }
    }

    /// Returns the node color strategy.
    #[must_use]
    pub fn node_color(&self) -> &NodeColorStrategy {
        &self.node_color
    }

    /// Returns the node colormap.
    #[must_use]
    pub fn node_colormap(&self) -> &dyn Colormap {
        self.node_colormap.as_ref()
    }

    /// Returns the edge color strategy.
    #[must_use]
    pub fn edge_color(&self) -> &EdgeColorStrategy {
        &self.edge_color
    }

    /// Returns the edge colormap.
    #[must_use]
    pub fn edge_colormap(&self) -> &dyn Colormap {
        self.edge_colormap.as_ref()
    }

    /// Returns the stages this instance runs.
    #[must_use]
    pub fn setup(&self) -> SetupToggles {
        self.setup
    }

    /// Assembles the clustering tree of `table` without images.
    ///
    /// # Errors
    /// Returns [`crate::ClustreeError::UnknownColumn`] when the node strategy
    /// aggregates a column `table` does not carry.
    pub fn run(&self, table: &MembershipTable) -> Result<ClusterGraph> {
        self.run_stages(table, None)
    }

    /// Assembles the clustering tree of `table`, attaching an image from
    /// `images` to every node when the image stage is enabled.
    ///
    /// # Errors
    /// Returns [`crate::ClustreeError::Image`] when the provider fails for a
    /// node, and the errors of [`Clustree::run`].
    pub fn run_with_images(
        &self,
        table: &MembershipTable,
        images: &dyn ImageProvider,
    ) -> Result<ClusterGraph> {
        self.run_stages(table, Some(images))
    }

    #[instrument(
        name = "core.run",
        err,
        skip(self, table, images),
        fields(
            kk = table.kk(),
            rows = table.rows(),
            images = images.map(|provider| provider.name()),
        ),
    )]
    fn run_stages(
        &self,
        table: &MembershipTable,
        images: Option<&dyn ImageProvider>,
    ) -> Result<ClusterGraph> {
        let setup = self.setup;
        let mut tree = ClusterTree::skeleton(table);

        if setup.build_node_index {
            tree = tree.seed_node_index();
        }
        if setup.compute_sample_info {
            tree = tree.with_sample_info(table);
        }
        match images {
            Some(provider) if setup.attach_images => {
                tree = attach_images(tree, provider)?;
            }
            Some(provider) => {
                debug!(provider = provider.name(), "image stage disabled");
            }
            None => {}
        }
        if setup.annotate_node_color {
            tree = annotate_nodes(tree, &self.node_color, self.node_colormap.as_ref(), table)?;
        }
        if setup.annotate_edge_color {
            tree = annotate_edges(tree, &self.edge_color, self.edge_colormap.as_ref());
        }

        info!(
            nodes = tree.node_count(),
            edges = tree.edge_count(),
            "clustering tree assembled"
        );
        Ok(ClusterGraph::from(tree))
    }
}

//! Builder utilities for configuring clustering-tree assembly.
//!
//! Exposes the setup toggles and color configuration validated before
//! constructing [`Clustree`] instances.

use std::sync::Arc;

use crate::{
    Result,
    annotate::{EdgeColorStrategy, NodeColorStrategy},
    color::{Colormap, NamedColormap},
    error::ClustreeError,
    pipeline::Clustree,
};

/// Stages [`Clustree::run`] performs, in pipeline order.
///
/// Every stage is enabled by default.
///
/// # Examples
/// ```
/// use clustree_core::SetupToggles;
///
/// let toggles = SetupToggles {
///     attach_images: false,
///     ..SetupToggles::default()
/// };
/// assert!(toggles.compute_sample_info);
/// assert!(!toggles.attach_images);
/// ```
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[expect(
    clippy::struct_excessive_bools,
    reason = "each flag toggles an independent pipeline stage"
)]
pub struct SetupToggles {
    /// Seed every `(K, k)` in the label range before counting.
    ///
    /// Seeding touches `kk * (kk + 1) / 2` slots whatever the row count, so
    /// it is off by default. Counting alone registers every occurring node.
    pub build_node_index: bool,
    /// Count samples per node and derive edges.
    pub compute_sample_info: bool,
    /// Attach images when an image provider is supplied.
    pub attach_images: bool,
    /// Run the node color pass.
    pub annotate_node_color: bool,
    /// Run the edge color pass.
    pub annotate_edge_color: bool,
}

impl Default for SetupToggles {
    fn default() -> Self {
        Self {
            build_node_index: false,
            compute_sample_info: true,
            attach_images: true,
            annotate_node_color: true,
            annotate_edge_color: true,
        }
    }
}

/// Configures and constructs [`Clustree`] instances.
///
/// # Examples
/// ```
/// use clustree_core::{ClustreeBuilder, EdgeColorStrategy, NamedColormap, NodeColorStrategy};
///
/// let clustree = ClustreeBuilder::new()
///     .with_node_color(NodeColorStrategy::BySampleCount)
///     .with_edge_colormap(NamedColormap::Greys)
///     .build()
///     .expect("builder configuration is valid");
/// assert!(matches!(clustree.node_color(), NodeColorStrategy::BySampleCount));
/// assert_eq!(clustree.edge_color(), &EdgeColorStrategy::BySampleCount);
/// assert_eq!(clustree.edge_colormap().name(), "Greys");
/// ```
#[derive(Debug, Clone)]
pub struct ClustreeBuilder {
    node_color: NodeColorStrategy,
    node_colormap: Arc<dyn Colormap>,
    edge_color: EdgeColorStrategy,
    edge_colormap: Arc<dyn Colormap>,
    setup: SetupToggles,
}

impl Default for ClustreeBuilder {
    fn default() -> Self {
        Self {
            node_color: NodeColorStrategy::default(),
            node_colormap: Arc::new(NamedColormap::Blues),
            edge_color: EdgeColorStrategy::default(),
            edge_colormap: Arc::new(NamedColormap::Reds),
            setup: SetupToggles::default(),
        }
    }
}

impl ClustreeBuilder {
    /// Creates a builder that colors nodes by resolution and edges by sample
    /// count, with `Blues` and `Reds` colormaps.
    ///
    /// # Examples
    /// ```
    /// use clustree_core::{ClustreeBuilder, NodeColorStrategy, SetupToggles};
    ///
    /// let builder = ClustreeBuilder::new();
    /// assert!(matches!(builder.node_color(), NodeColorStrategy::ByResolution));
    /// assert_eq!(builder.node_colormap().name(), "Blues");
    /// assert_eq!(builder.setup(), SetupToggles::default());
    /// ```
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the node color strategy.
    #[must_use]
    pub fn with_node_color(mut self, strategy: NodeColorStrategy) -> Self {
        self.node_color = strategy;
        self
    }

    /// Sets the colormap used by continuous node strategies.
    #[must_use]
    pub fn with_node_colormap(mut self, colormap: impl Colormap + 'static) -> Self {
        self.node_colormap = Arc::new(colormap);
        self
    }

    /// Sets the edge color strategy.
    #[must_use]
    pub fn with_edge_color(mut self, strategy: EdgeColorStrategy) -> Self {
        self.edge_color = strategy;
        self
    }

    /// Sets the colormap used by continuous edge strategies.
    #[must_use]
    pub fn with_edge_colormap(mut self, colormap: impl Colormap + 'static) -> Self {
        self.edge_colormap = Arc::new(colormap);
        self
    }

    /// Replaces the setup toggles.
    ///
    /// # Examples
    /// ```
    /// use clustree_core::{ClustreeBuilder, SetupToggles};
    ///
    /// let toggles = SetupToggles { build_node_index: true, ..SetupToggles::default() };
    /// let builder = ClustreeBuilder::new().with_setup(toggles);
    /// assert!(builder.setup().build_node_index);
    /// ```
    #[must_use]
    pub fn with_setup(mut self, setup: SetupToggles) -> Self {
        self.setup = setup;
        self
    }

    /// Returns the configured node color strategy.
    #[must_use]
    pub fn node_color(&self) -> &NodeColorStrategy {
        &self.node_color
    }

    /// Returns the configured node colormap.
    #[must_use]
    pub fn node_colormap(&self) -> &dyn Colormap {
        self.node_colormap.as_ref()
    }

    /// Returns the configured edge color strategy.
    #[must_use]
    pub fn edge_color(&self) -> &EdgeColorStrategy {
        &self.edge_color
    }

    /// Returns the configured edge colormap.
    #[must_use]
    pub fn edge_colormap(&self) -> &dyn Colormap {
        self.edge_colormap.as_ref()
    }

    /// Returns the configured setup toggles.
    #[must_use]
    pub fn setup(&self) -> SetupToggles {
        self.setup
    }

    /// Validates the configuration and constructs a [`Clustree`] instance.
    ///
    /// # Errors
    /// Returns [`ClustreeError::MissingAggregator`] when the node strategy
    /// aggregates a column without naming an aggregator.
    ///
    /// # Examples
    /// ```
    /// use clustree_core::{ClustreeBuilder, ClustreeError, NodeColorStrategy};
    ///
    /// let err = ClustreeBuilder::new()
    ///     .with_node_color(NodeColorStrategy::ByAggregateColumn {
    ///         column: "score".into(),
    ///         aggregator: None,
    ///     })
    ///     .build()
    ///     .expect_err("an aggregate strategy needs an aggregator");
    /// assert!(matches!(err, ClustreeError::MissingAggregator { .. }));
    /// ```
    pub fn build(self) -> Result<Clustree> {
        if let NodeColorStrategy::ByAggregateColumn {
            column,
            aggregator: None,
        } = &self.node_color
        {
            return Err(ClustreeError::MissingAggregator {
                column: column.clone(),
            });
        }

        Ok(Clustree::new(
            self.node_color,
            self.node_colormap,
            self.edge_color,
            self.edge_colormap,
            self.setup,
        ))
    }
}

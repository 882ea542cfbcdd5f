//! Clustree core library.
//!
//! Builds the data behind a clustering tree: nodes for every cluster at every
//! resolution, edges for the samples that move between clusters at adjacent
//! resolutions, and the colors and images a renderer attaches to them.
#![cfg_attr(docsrs, feature(doc_cfg))]

mod annotate;
mod builder;
mod color;
mod columns;
mod error;
mod graph;
mod identity;
mod image;
mod membership;
mod pipeline;
mod tree;

#[cfg(test)]
mod test_utils;

pub use crate::{
    annotate::{
        Aggregator, EdgeColorStrategy, NodeColorStrategy, ValueRange, annotate_edges,
        annotate_nodes,
    },
    builder::{ClustreeBuilder, SetupToggles},
    color::{Colormap, NamedColormap, Rgba, TAB10, palette_color},
    columns::{MembershipLayout, resolution_columns},
    error::{
        ClustreeError, ClustreeErrorCode, ImageError, ImageErrorCode, InvariantError,
        InvariantErrorCode, MembershipError, MembershipErrorCode, ParseError, ParseErrorCode,
        Result,
    },
    graph::ClusterGraph,
    identity::{
        ClusterLabel, EdgeId, MAX_RESOLUTIONS, NodeId, Resolution, encode_edge, encode_node,
        szudzik_pair,
    },
    image::{ImageProvider, NodeImage, PlaceholderImages, attach_images, node_stem},
    membership::{IndexingConvention, MembershipTable},
    pipeline::Clustree,
    tree::{ClusterTree, Edge, FLOW_TOLERANCE, Node},
};

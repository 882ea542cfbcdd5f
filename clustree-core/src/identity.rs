//! Stable integer identities for clustering-tree nodes and edges.
//!
//! Nodes are keyed by `(resolution, label)` and edges by
//! `(resolution, start_label, end_label)`, both folded into a single integer
//! with Szudzik's pairing function. Identities depend only on their inputs, so
//! the same membership table always yields the same keys.

use std::fmt;

/// Number of clusters requested at one level of the tree (`K`).
pub type Resolution = u32;

/// Cluster label of a sample at a given resolution.
pub type ClusterLabel = u32;

/// Largest number of resolutions a membership table may hold.
///
/// Labels never exceed the resolution they belong to, so bounding the
/// resolution bounds every pairing input and keeps edge identities inside
/// `u64`.
pub const MAX_RESOLUTIONS: u32 = 32_768;

/// Identifier of a node in the clustering tree.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[cfg_attr(feature = "serde", derive(serde::Serialize), serde(transparent))]
pub struct NodeId(u64);

/// Identifier of an edge in the clustering tree.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[cfg_attr(feature = "serde", derive(serde::Serialize), serde(transparent))]
pub struct EdgeId(u64);

impl NodeId {
    /// Returns the raw integer value.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl EdgeId {
    /// Returns the raw integer value.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for EdgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Szudzik's elegant pairing of two non-negative integers.
///
/// The result is unique for every `(x, y)` pair whose result fits in `u64`.
/// Arithmetic wraps beyond that domain.
///
/// # Examples
/// ```
/// use clustree_core::szudzik_pair;
///
/// assert_eq!(szudzik_pair(0, 0), 0);
/// assert_eq!(szudzik_pair(0, 1), 1);
/// assert_eq!(szudzik_pair(1, 0), 2);
/// assert_eq!(szudzik_pair(1, 1), 3);
/// assert_eq!(szudzik_pair(2, 3), 11);
/// ```
#[must_use]
pub const fn szudzik_pair(x: u64, y: u64) -> u64 {
    if x < y {
        y.wrapping_mul(y).wrapping_add(x)
    } else {
        x.wrapping_mul(x).wrapping_add(x).wrapping_add(y)
    }
}

/// Encodes the node for `label` at `resolution`.
///
/// Injective over every pair of `u32` values.
///
/// # Examples
/// ```
/// use clustree_core::encode_node;
///
/// assert_ne!(encode_node(2, 1), encode_node(1, 2));
/// assert_eq!(encode_node(3, 2), encode_node(3, 2));
/// ```
#[must_use]
pub const fn encode_node(resolution: Resolution, label: ClusterLabel) -> NodeId {
    NodeId(szudzik_pair(resolution as u64, label as u64))
}

/// Encodes the edge arriving at resolution `resolution` from `start` at the
/// previous resolution to `end` at `resolution`.
///
/// Injective while all inputs stay within [`MAX_RESOLUTIONS`].
///
/// # Examples
/// ```
/// use clustree_core::{encode_edge, szudzik_pair};
///
/// let id = encode_edge(3, 1, 2);
/// assert_eq!(id.get(), szudzik_pair(szudzik_pair(3, 1), 2));
/// assert_ne!(id, encode_edge(3, 2, 1));
/// ```
#[must_use]
pub const fn encode_edge(resolution: Resolution, start: ClusterLabel, end: ClusterLabel) -> EdgeId {
    EdgeId(szudzik_pair(
        szudzik_pair(resolution as u64, start as u64),
        end as u64,
    ))
}

//! Image provider abstractions for attaching pictures to nodes.

use std::{path::PathBuf, sync::Arc};

use tracing::{debug, instrument};

use crate::{
    error::{ClustreeError, ImageError},
    identity::{ClusterLabel, Resolution},
    tree::ClusterTree,
};

/// An image reference attached to a node.
#[derive(Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum NodeImage {
    /// An image file on disk; it is not opened or decoded.
    File(PathBuf),
    /// A synthesised stand-in showing `text`.
    Placeholder {
        /// Text a renderer should draw in place of the image.
        text: String,
    },
}

impl NodeImage {
    /// Placeholder for the node `resolution_label`.
    ///
    /// # Examples
    /// ```
    /// use clustree_core::NodeImage;
    ///
    /// assert_eq!(
    ///     NodeImage::placeholder(3, 2),
    ///     NodeImage::Placeholder { text: "3_2".into() },
    /// );
    /// ```
    #[must_use]
    pub fn placeholder(resolution: Resolution, label: ClusterLabel) -> Self {
        Self::Placeholder {
            text: node_stem(resolution, label),
        }
    }
}

/// File stem naming the node `label` at `resolution`, e.g. `3_2`.
#[must_use]
pub fn node_stem(resolution: Resolution, label: ClusterLabel) -> String {
    format!("{resolution}_{label}")
}

/// Resolves the image of a node.
///
/// # Examples
/// ```
/// use std::path::PathBuf;
///
/// use clustree_core::{ImageError, ImageProvider, NodeImage};
///
/// struct Fixed;
///
/// impl ImageProvider for Fixed {
///     fn name(&self) -> &str { "fixed" }
///     fn image(&self, resolution: u32, label: u32) -> Result<NodeImage, ImageError> {
///         Ok(NodeImage::File(PathBuf::from(format!("/img/{resolution}_{label}.png"))))
///     }
/// }
///
/// assert_eq!(Fixed.image(2, 1)?, NodeImage::File("/img/2_1.png".into()));
/// # Ok::<(), ImageError>(())
/// ```
pub trait ImageProvider {
    /// Human-readable name used in errors and logs.
    fn name(&self) -> &str;

    /// Image for the node `label` at `resolution`.
    ///
    /// # Errors
    /// Returns an [`ImageError`] when no image can be supplied.
    fn image(&self, resolution: Resolution, label: ClusterLabel) -> Result<NodeImage, ImageError>;
}

/// Provider that synthesises a placeholder for every node.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct PlaceholderImages;

impl ImageProvider for PlaceholderImages {
    fn name(&self) -> &str {
        "placeholder"
    }

    fn image(&self, resolution: Resolution, label: ClusterLabel) -> Result<NodeImage, ImageError> {
        Ok(NodeImage::placeholder(resolution, label))
    }
}

/// Attaches an image from `provider` to every node of `tree`.
///
/// # Errors
/// Returns [`ClustreeError::Image`] for the first node the provider fails on.
#[instrument(name = "core.images", err, skip_all, fields(provider = provider.name()))]
pub fn attach_images(
    mut tree: ClusterTree,
    provider: &dyn ImageProvider,
) -> Result<ClusterTree, ClustreeError> {
    let mut placeholders = 0_usize;
    for (_, node) in tree.nodes_mut() {
        let (resolution, label) = (node.resolution(), node.label());
        let image = provider
            .image(resolution, label)
            .map_err(|error| ClustreeError::Image {
                provider: Arc::from(provider.name()),
                resolution,
                label,
                error,
            })?;
        if matches!(image, NodeImage::Placeholder { .. }) {
            placeholders += 1;
        }
        node.set_image(image);
    }
    debug!(placeholders, "attached node images");
    Ok(tree)
}

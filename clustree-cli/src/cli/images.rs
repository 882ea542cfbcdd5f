//! Directory-backed node images.

use std::path::{Path, PathBuf};

use clustree_core::{ClusterLabel, ImageError, ImageProvider, NodeImage, Resolution, node_stem};

/// Resolves node images to `<root>/<K>_<k>.png`.
///
/// Missing files fall back to placeholders unless the provider is strict. A
/// missing root directory is always an error.
#[derive(Debug, Clone)]
pub struct DirectoryImages {
    root: PathBuf,
    strict: bool,
}

impl DirectoryImages {
    /// Creates a provider rooted at `root`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>, strict: bool) -> Self {
        Self {
            root: root.into(),
            strict,
        }
    }

    /// Directory searched for images.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Whether missing images are errors.
    #[must_use]
    pub const fn is_strict(&self) -> bool {
        self.strict
    }
}

impl ImageProvider for DirectoryImages {
    fn name(&self) -> &str {
        "directory"
    }

    fn image(&self, resolution: Resolution, label: ClusterLabel) -> Result<NodeImage, ImageError> {
        if !self.root.is_dir() {
            return Err(ImageError::MissingDirectory {
                path: self.root.clone(),
            });
        }
        let path = self
            .root
            .join(format!("{}.png", node_stem(resolution, label)));
        if path.is_file() {
            Ok(NodeImage::File(path))
        } else if self.strict {
            Err(ImageError::Missing { path })
        } else {
            Ok(NodeImage::placeholder(resolution, label))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use rstest::rstest;
    use tempfile::TempDir;

    fn image_dir() -> TempDir {
        let dir = TempDir::new().expect("temp dir");
        std::fs::write(dir.path().join("2_1.png"), b"png").expect("write image");
        dir
    }

    #[rstest]
    #[case::lenient(false)]
    #[case::strict(true)]
    fn existing_images_resolve_to_files(#[case] strict: bool) {
        let dir = image_dir();
        let images = DirectoryImages::new(dir.path(), strict);
        assert_eq!(
            images.image(2, 1).expect("image exists"),
            NodeImage::File(dir.path().join("2_1.png"))
        );
    }

    #[test]
    fn lenient_provider_uses_placeholders() {
        let dir = image_dir();
        let images = DirectoryImages::new(dir.path(), false);
        assert_eq!(
            images.image(3, 2).expect("placeholder"),
            NodeImage::placeholder(3, 2)
        );
    }

    #[test]
    fn strict_provider_reports_missing_images() {
        let dir = image_dir();
        let images = DirectoryImages::new(dir.path(), true);
        let err = images.image(3, 2).expect_err("image missing");
        assert_eq!(
            err,
            ImageError::Missing {
                path: dir.path().join("3_2.png")
            }
        );
    }

    #[rstest]
    #[case::lenient(false)]
    #[case::strict(true)]
    fn missing_directories_are_errors(#[case] strict: bool) {
        let dir = TempDir::new().expect("temp dir");
        let root = dir.path().join("absent");
        let images = DirectoryImages::new(&root, strict);
        assert!(matches!(
            images.image(1, 1),
            Err(ImageError::MissingDirectory { path }) if path == root
        ));
    }
}

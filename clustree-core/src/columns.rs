//! Resolution column discovery shared by the table loaders.
//!
//! Tabular inputs name their resolution columns with a common prefix followed
//! by the resolution, e.g. `K1`, `K2`, `K3`. Loaders pass the header names
//! through [`resolution_columns`] to learn which columns to read and in what
//! order.

use std::collections::BTreeMap;

use crate::{
    error::MembershipError,
    identity::Resolution,
    membership::IndexingConvention,
};

/// How a loader should interpret the columns of a tabular input.
///
/// # Examples
/// ```
/// use clustree_core::{IndexingConvention, MembershipLayout};
///
/// let layout = MembershipLayout::new("K")
///     .with_kk(2)
///     .with_convention(IndexingConvention::ZeroBased)
///     .with_metadata_column("sepal_length");
/// assert_eq!(layout.prefix(), "K");
/// assert_eq!(layout.kk(), Some(2));
/// assert_eq!(layout.metadata_columns(), ["sepal_length".to_owned()]);
/// ```
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct MembershipLayout {
    prefix: String,
    kk: Option<usize>,
    convention: IndexingConvention,
    metadata_columns: Vec<String>,
}

impl MembershipLayout {
    /// Creates a layout reading every `prefix<K>` column with one-based labels.
    #[must_use]
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            kk: None,
            convention: IndexingConvention::OneBased,
            metadata_columns: Vec::new(),
        }
    }

    /// Reads only resolutions `1..=kk`.
    #[must_use]
    pub fn with_kk(mut self, kk: usize) -> Self {
        self.kk = Some(kk);
        self
    }

    /// Sets the label convention.
    #[must_use]
    pub fn with_convention(mut self, convention: IndexingConvention) -> Self {
        self.convention = convention;
        self
    }

    /// Adds a numeric column to load as metadata.
    #[must_use]
    pub fn with_metadata_column(mut self, column: impl Into<String>) -> Self {
        let column = column.into();
        if !self.metadata_columns.contains(&column) {
            self.metadata_columns.push(column);
        }
        self
    }

    /// Prefix of the resolution columns.
    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Requested number of resolutions, if any.
    #[must_use]
    pub fn kk(&self) -> Option<usize> {
        self.kk
    }

    /// Label convention of the resolution columns.
    #[must_use]
    pub fn convention(&self) -> IndexingConvention {
        self.convention
    }

    /// Metadata columns to load alongside the resolution columns.
    #[must_use]
    pub fn metadata_columns(&self) -> &[String] {
        &self.metadata_columns
    }

    /// Resolves this layout's resolution columns among `names`.
    ///
    /// # Errors
    /// See [`resolution_columns`].
    pub fn resolve<'a, I>(&self, names: I) -> Result<Vec<String>, MembershipError>
    where
        I: IntoIterator<Item = &'a str>,
    {
        resolution_columns(&self.prefix, names, self.kk)
    }
}

/// Finds the columns named `prefix` followed by a resolution number and
/// returns them ordered by resolution.
///
/// Names that carry the prefix but continue with anything other than decimal
/// digits are ignored, so `K` does not claim a column called `Kmeans`. When
/// `kk` is supplied only resolutions `1..=kk` are returned.
///
/// # Errors
/// Returns [`MembershipError::NoResolutionColumns`] when nothing matches,
/// [`MembershipError::InvalidResolutionColumn`] for a column naming
/// resolution 0, [`MembershipError::DuplicateResolution`] when two columns
/// name the same resolution, [`MembershipError::NonConsecutiveResolutions`]
/// when a resolution is skipped, and
/// [`MembershipError::RequestedResolutionsUnavailable`] when `kk` is zero or
/// exceeds the resolutions found.
///
/// # Examples
/// ```
/// use clustree_core::resolution_columns;
///
/// let names = ["sample", "K2", "K1", "Kmeans", "K3"];
/// let columns = resolution_columns("K", names, Some(2))?;
/// assert_eq!(columns, ["K1", "K2"]);
/// # Ok::<(), clustree_core::MembershipError>(())
/// ```
pub fn resolution_columns<'a, I>(
    prefix: &str,
    names: I,
    kk: Option<usize>,
) -> Result<Vec<String>, MembershipError>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut found: BTreeMap<Resolution, String> = BTreeMap::new();
    for name in names {
        let Some(resolution) = parse_resolution(prefix, name) else {
            continue;
        };
        if resolution == 0 {
            return Err(MembershipError::InvalidResolutionColumn {
                column: name.to_owned(),
            });
        }
        if found.insert(resolution, name.to_owned()).is_some() {
            return Err(MembershipError::DuplicateResolution {
                prefix: prefix.to_owned(),
                resolution,
            });
        }
    }

    if found.is_empty() {
        return Err(MembershipError::NoResolutionColumns {
            prefix: prefix.to_owned(),
        });
    }

    if let Some(missing) = (1..).zip(found.keys()).find_map(|(expected, actual)| {
        (expected != *actual).then_some(expected)
    }) {
        return Err(MembershipError::NonConsecutiveResolutions {
            prefix: prefix.to_owned(),
            missing,
        });
    }

    let available = found.len();
    let requested = kk.unwrap_or(available);
    if requested == 0 || requested > available {
        return Err(MembershipError::RequestedResolutionsUnavailable {
            requested,
            available,
        });
    }

    Ok(found.into_values().take(requested).collect())
}

fn parse_resolution(prefix: &str, name: &str) -> Option<Resolution> {
    let digits = name.strip_prefix(prefix)?;
    if digits.is_empty() || !digits.bytes().all(|byte| byte.is_ascii_digit()) {
        return None;
    }
    // Absurdly long numbers saturate and surface as a gap.
    Some(digits.parse().unwrap_or(Resolution::MAX))
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case::ordered(&["K1", "K2", "K3"], None, &["K1", "K2", "K3"])]
    #[case::shuffled(&["K3", "x", "K1", "K2"], None, &["K1", "K2", "K3"])]
    #[case::truncated(&["K1", "K2", "K3"], Some(2), &["K1", "K2"])]
    #[case::ignores_words(&["K1", "Kmeans", "K", "K2"], None, &["K1", "K2"])]
    #[case::leading_zero(&["K01", "K2"], None, &["K01", "K2"])]
    fn discovers_resolution_columns(
        #[case] names: &[&str],
        #[case] kk: Option<usize>,
        #[case] expected: &[&str],
    ) {
        let columns = resolution_columns("K", names.iter().copied(), kk)
            .expect("columns must resolve");
        assert_eq!(columns, expected);
    }

    #[rstest]
    #[case::none(&["a", "b"], None, MembershipError::NoResolutionColumns { prefix: "K".into() })]
    #[case::zero(&["K0", "K1"], None, MembershipError::InvalidResolutionColumn { column: "K0".into() })]
    #[case::duplicate(&["K1", "K01"], None, MembershipError::DuplicateResolution { prefix: "K".into(), resolution: 1 })]
    #[case::gap(&["K1", "K3"], None, MembershipError::NonConsecutiveResolutions { prefix: "K".into(), missing: 2 })]
    #[case::missing_first(&["K2", "K3"], None, MembershipError::NonConsecutiveResolutions { prefix: "K".into(), missing: 1 })]
    #[case::too_many(&["K1", "K2"], Some(3), MembershipError::RequestedResolutionsUnavailable { requested: 3, available: 2 })]
    #[case::zero_requested(&["K1"], Some(0), MembershipError::RequestedResolutionsUnavailable { requested: 0, available: 1 })]
    fn reports_invalid_layouts(
        #[case] names: &[&str],
        #[case] kk: Option<usize>,
        #[case] expected: MembershipError,
    ) {
        let err = resolution_columns("K", names.iter().copied(), kk)
            .expect_err("layout must be rejected");
        assert_eq!(err, expected);
    }

    #[test]
    fn layout_deduplicates_metadata_columns() {
        let layout = MembershipLayout::new("res")
            .with_metadata_column("score")
            .with_metadata_column("score");
        assert_eq!(layout.metadata_columns(), ["score".to_owned()]);
        assert_eq!(
            layout.resolve(["res1", "res2", "score"]).expect("must resolve"),
            ["res1", "res2"]
        );
    }
}

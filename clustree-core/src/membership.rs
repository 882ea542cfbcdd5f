//! Validated per-sample cluster assignments across resolutions.

use std::{collections::BTreeMap, ops::RangeInclusive};

use crate::{
    error::MembershipError,
    identity::{ClusterLabel, MAX_RESOLUTIONS, Resolution},
};

/// Whether cluster labels start at 0 or at 1.
///
/// At resolution `K` the valid labels are `0..=K-1` under
/// [`IndexingConvention::ZeroBased`] and `1..=K` under
/// [`IndexingConvention::OneBased`].
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum IndexingConvention {
    /// Labels run from 0 to `K - 1`.
    ZeroBased,
    /// Labels run from 1 to `K`.
    #[default]
    OneBased,
}

impl IndexingConvention {
    /// Smallest label this convention allows.
    #[must_use]
    pub const fn min_label(self) -> ClusterLabel {
        match self {
            Self::ZeroBased => 0,
            Self::OneBased => 1,
        }
    }

    /// Valid labels at `resolution`.
    ///
    /// # Examples
    /// ```
    /// use clustree_core::IndexingConvention;
    ///
    /// assert_eq!(IndexingConvention::OneBased.labels(3), 1..=3);
    /// assert_eq!(IndexingConvention::ZeroBased.labels(3), 0..=2);
    /// ```
    #[must_use]
    pub const fn labels(self, resolution: Resolution) -> RangeInclusive<ClusterLabel> {
        match self {
            Self::ZeroBased => 0..=resolution.saturating_sub(1),
            Self::OneBased => 1..=resolution,
        }
    }
}

impl TryFrom<i64> for IndexingConvention {
    type Error = MembershipError;

    fn try_from(min_cluster_number: i64) -> Result<Self, Self::Error> {
        match min_cluster_number {
            0 => Ok(Self::ZeroBased),
            1 => Ok(Self::OneBased),
            got => Err(MembershipError::InvalidIndexingConvention { got }),
        }
    }
}

/// Cluster labels for `N` samples at resolutions `1..=kk`.
///
/// Column `K - 1` holds the label of every sample at resolution `K` and row
/// `i` refers to the same sample in every column. Optional numeric metadata
/// columns of the same length travel with the table for aggregate coloring.
///
/// # Examples
/// ```
/// use clustree_core::{IndexingConvention, MembershipTable};
///
/// let table = MembershipTable::try_new(
///     IndexingConvention::OneBased,
///     vec![vec![1, 1, 1], vec![1, 2, 2]],
/// )?;
/// assert_eq!(table.kk(), 2);
/// assert_eq!(table.rows(), 3);
/// assert_eq!(table.labels(2), Some(&[1, 2, 2][..]));
/// # Ok::<(), clustree_core::MembershipError>(())
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct MembershipTable {
    convention: IndexingConvention,
    rows: usize,
    columns: Vec<Vec<ClusterLabel>>,
    metadata: BTreeMap<String, Vec<f64>>,
}

impl MembershipTable {
    /// Validates label columns ordered by resolution.
    ///
    /// # Errors
    /// Returns [`MembershipError::NoColumns`] or
    /// [`MembershipError::TooManyResolutions`] when the column count is out of
    /// range, [`MembershipError::EmptyTable`] when there are no rows,
    /// [`MembershipError::ColumnLengthMismatch`] when a column has a different
    /// length to the first, and [`MembershipError::LabelOutOfRange`] for the
    /// first label outside its resolution's range.
    pub fn try_new(
        convention: IndexingConvention,
        columns: Vec<Vec<i64>>,
    ) -> Result<Self, MembershipError> {
        if columns.is_empty() {
            return Err(MembershipError::NoColumns);
        }
        let count = columns.len();
        let kk = Resolution::try_from(count)
            .ok()
            .filter(|kk| *kk <= MAX_RESOLUTIONS)
            .ok_or(MembershipError::TooManyResolutions {
                count,
                max: MAX_RESOLUTIONS,
            })?;

        let rows = columns.first().map_or(0, Vec::len);
        if rows == 0 {
            return Err(MembershipError::EmptyTable);
        }

        let mut validated = Vec::with_capacity(columns.len());
        for (resolution, column) in (1..=kk).zip(columns) {
            if column.len() != rows {
                return Err(MembershipError::ColumnLengthMismatch {
                    resolution,
                    expected: rows,
                    found: column.len(),
                });
            }
            validated.push(validate_column(convention, resolution, column)?);
        }

        Ok(Self {
            convention,
            rows,
            columns: validated,
            metadata: BTreeMap::new(),
        })
    }

    /// Attaches a numeric metadata column, replacing any column of the same
    /// name.
    ///
    /// # Errors
    /// Returns [`MembershipError::MetadataLengthMismatch`] when `values` does
    /// not hold one entry per sample.
    pub fn with_metadata(
        mut self,
        name: impl Into<String>,
        values: Vec<f64>,
    ) -> Result<Self, MembershipError> {
        let column = name.into();
        if values.len() != self.rows {
            return Err(MembershipError::MetadataLengthMismatch {
                column,
                expected: self.rows,
                found: values.len(),
            });
        }
        self.metadata.insert(column, values);
        Ok(self)
    }

    /// Number of resolutions, `kk`.
    #[must_use]
    pub fn kk(&self) -> Resolution {
        // Bounded by MAX_RESOLUTIONS at construction.
        Resolution::try_from(self.columns.len()).unwrap_or(MAX_RESOLUTIONS)
    }

    /// Number of samples, `N`.
    #[must_use]
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Label convention of the table.
    #[must_use]
    pub fn convention(&self) -> IndexingConvention {
        self.convention
    }

    /// Resolutions present in the table.
    #[must_use]
    pub fn resolutions(&self) -> RangeInclusive<Resolution> {
        1..=self.kk()
    }

    /// Labels of every sample at `resolution`, or `None` outside `1..=kk`.
    #[must_use]
    pub fn labels(&self, resolution: Resolution) -> Option<&[ClusterLabel]> {
        let index = usize::try_from(resolution.checked_sub(1)?).ok()?;
        self.columns.get(index).map(Vec::as_slice)
    }

    /// Values of the metadata column `name`.
    #[must_use]
    pub fn metadata(&self, name: &str) -> Option<&[f64]> {
        self.metadata.get(name).map(Vec::as_slice)
    }

    /// Names of the attached metadata columns in sorted order.
    pub fn metadata_names(&self) -> impl Iterator<Item = &str> {
        self.metadata.keys().map(String::as_str)
    }
}

fn validate_column(
    convention: IndexingConvention,
    resolution: Resolution,
    column: Vec<i64>,
) -> Result<Vec<ClusterLabel>, MembershipError> {
    let range = convention.labels(resolution);
    column
        .into_iter()
        .enumerate()
        .map(|(row, label)| {
            ClusterLabel::try_from(label)
                .ok()
                .filter(|value| range.contains(value))
                .ok_or(MembershipError::LabelOutOfRange {
                    resolution,
                    row,
                    label,
                    min: *range.start(),
                    max: *range.end(),
                })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(0, Ok(IndexingConvention::ZeroBased))]
    #[case(1, Ok(IndexingConvention::OneBased))]
    #[case(2, Err(MembershipError::InvalidIndexingConvention { got: 2 }))]
    #[case(-1, Err(MembershipError::InvalidIndexingConvention { got: -1 }))]
    fn convention_from_min_cluster_number(
        #[case] raw: i64,
        #[case] expected: Result<IndexingConvention, MembershipError>,
    ) {
        assert_eq!(IndexingConvention::try_from(raw), expected);
    }

    #[test]
    fn rejects_missing_columns() {
        let err = MembershipTable::try_new(IndexingConvention::OneBased, Vec::new())
            .expect_err("no columns must fail");
        assert_eq!(err, MembershipError::NoColumns);
    }

    #[test]
    fn rejects_empty_columns() {
        let err = MembershipTable::try_new(IndexingConvention::OneBased, vec![Vec::new()])
            .expect_err("no rows must fail");
        assert_eq!(err, MembershipError::EmptyTable);
    }

    #[test]
    fn rejects_ragged_columns() {
        let err = MembershipTable::try_new(
            IndexingConvention::OneBased,
            vec![vec![1, 1, 1], vec![1, 2]],
        )
        .expect_err("ragged columns must fail");
        assert_eq!(
            err,
            MembershipError::ColumnLengthMismatch {
                resolution: 2,
                expected: 3,
                found: 2,
            }
        );
    }

    #[rstest]
    #[case::above_resolution(IndexingConvention::OneBased, vec![1, 3], 1, 3, 1, 2)]
    #[case::zero_in_one_based(IndexingConvention::OneBased, vec![0, 1], 0, 0, 1, 2)]
    #[case::resolution_in_zero_based(IndexingConvention::ZeroBased, vec![0, 2], 1, 2, 0, 1)]
    #[case::negative(IndexingConvention::ZeroBased, vec![-1, 0], 0, -1, 0, 1)]
    fn rejects_labels_outside_resolution_range(
        #[case] convention: IndexingConvention,
        #[case] second: Vec<i64>,
        #[case] row: usize,
        #[case] label: i64,
        #[case] min: ClusterLabel,
        #[case] max: ClusterLabel,
    ) {
        let first = vec![i64::from(convention.min_label()); second.len()];
        let err = MembershipTable::try_new(convention, vec![first, second])
            .expect_err("out of range label must fail");
        assert_eq!(
            err,
            MembershipError::LabelOutOfRange {
                resolution: 2,
                row,
                label,
                min,
                max,
            }
        );
    }

    #[test]
    fn rejects_too_many_resolutions() {
        let count = usize::try_from(MAX_RESOLUTIONS).expect("fits") + 1;
        let err = MembershipTable::try_new(IndexingConvention::OneBased, vec![vec![1]; count])
            .expect_err("too many resolutions must fail");
        assert_eq!(err.code().as_str(), "MEMBERSHIP_TOO_MANY_RESOLUTIONS");
    }

    #[test]
    fn metadata_must_match_row_count() {
        let table = MembershipTable::try_new(IndexingConvention::OneBased, vec![vec![1, 1]])
            .expect("table must build");
        let err = table
            .with_metadata("score", vec![1.0])
            .expect_err("short metadata must fail");
        assert_eq!(
            err,
            MembershipError::MetadataLengthMismatch {
                column: "score".into(),
                expected: 2,
                found: 1,
            }
        );
    }

    #[test]
    fn exposes_columns_by_resolution() {
        let table = MembershipTable::try_new(
            IndexingConvention::ZeroBased,
            vec![vec![0, 0], vec![1, 0]],
        )
        .and_then(|table| table.with_metadata("score", vec![0.5, 1.5]))
        .expect("table must build");

        assert_eq!(table.resolutions(), 1..=2);
        assert_eq!(table.labels(0), None);
        assert_eq!(table.labels(2), Some(&[1, 0][..]));
        assert_eq!(table.labels(3), None);
        assert_eq!(table.metadata("score"), Some(&[0.5, 1.5][..]));
        assert_eq!(table.metadata_names().collect::<Vec<_>>(), vec!["score"]);
    }
}

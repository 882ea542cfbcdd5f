//! Delimited text provider reading membership tables from CSV and TSV files.
use std::{fs::File, io::Read, path::Path};

use clustree_core::{MembershipError, MembershipLayout, MembershipTable};
use csv::{ReaderBuilder, StringRecord, Trim};
use thiserror::Error;
use tracing::debug;

/// Errors raised while loading delimited membership tables.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum TextProviderError {
    /// The input has no header row.
    #[error("input contains no header row")]
    EmptyInput,
    /// A metadata column named by the layout is missing from the header.
    #[error("column `{column}` not found in header")]
    ColumnNotFound {
        /// Column that was requested.
        column: String,
    },
    /// A resolution column holds something other than an integer.
    #[error(
        "`{raw}` in column `{column}` at row {row} is not an integer label \
         (whole numbers such as `2` or `2.0` are accepted)"
    )]
    InvalidLabel {
        /// Column holding the value.
        column: String,
        /// Zero-based data row.
        row: usize,
        /// Cell contents.
        raw: String,
    },
    /// A metadata column holds something other than a number.
    #[error("`{raw}` in column `{column}` at row {row} is not a number")]
    InvalidMetadata {
        /// Column holding the value.
        column: String,
        /// Zero-based data row.
        row: usize,
        /// Cell contents.
        raw: String,
    },
    /// Column resolution or label validation failed.
    #[error(transparent)]
    Membership(#[from] MembershipError),
    /// The reader produced malformed records.
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    /// The file could not be opened.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

/// Returns the delimiter implied by a file extension.
///
/// `.tsv` and `.tab` files are tab separated; everything else is read as CSV.
///
/// # Examples
/// ```
/// use clustree_providers_text::delimiter_for_path;
///
/// assert_eq!(delimiter_for_path("clusters.tsv"), b'\t');
/// assert_eq!(delimiter_for_path("clusters.csv"), b',');
/// ```
#[must_use]
pub fn delimiter_for_path(path: impl AsRef<Path>) -> u8 {
    let tab = path.as_ref().extension().is_some_and(|extension| {
        extension.eq_ignore_ascii_case("tsv") || extension.eq_ignore_ascii_case("tab")
    });
    if tab { b'\t' } else { b',' }
}

/// Membership table loaded from a delimited text file with a header row.
#[derive(Debug)]
pub struct DelimitedTextProvider {
    name: String,
    resolution_columns: Vec<String>,
    table: MembershipTable,
}

impl DelimitedTextProvider {
    /// Loads a membership table from the file at `path`.
    ///
    /// # Errors
    /// Returns [`TextProviderError::Io`] when the file cannot be opened and
    /// any error reported by [`Self::try_from_reader`].
    pub fn try_from_path(
        name: impl Into<String>,
        path: impl AsRef<Path>,
        layout: &MembershipLayout,
        delimiter: u8,
    ) -> Result<Self, TextProviderError> {
        let file = File::open(path)?;
        Self::try_from_reader(name, file, layout, delimiter)
    }

    /// Loads a membership table from delimited text.
    ///
    /// Cells are trimmed. Labels may carry a zero fraction (`2.0`). Empty and
    /// `NA` metadata cells load as `NaN` and are ignored by aggregate colors.
    ///
    /// # Errors
    /// Returns [`TextProviderError::EmptyInput`] without a header row,
    /// [`TextProviderError::Membership`] when the resolution columns cannot be
    /// resolved or hold invalid labels, and
    /// [`TextProviderError::InvalidLabel`] or
    /// [`TextProviderError::InvalidMetadata`] for unparsable cells.
    ///
    /// # Examples
    /// ```
    /// use clustree_core::MembershipLayout;
    /// use clustree_providers_text::DelimitedTextProvider;
    ///
    /// let raw = "K1,K2\n1,1\n1,2\n";
    /// let provider = DelimitedTextProvider::try_from_reader(
    ///     "demo",
    ///     raw.as_bytes(),
    ///     &MembershipLayout::new("K"),
    ///     b',',
    /// )?;
    /// assert_eq!(provider.table().kk(), 2);
    /// # Ok::<(), clustree_providers_text::TextProviderError>(())
    /// ```
    pub fn try_from_reader<R: Read>(
        name: impl Into<String>,
        reader: R,
        layout: &MembershipLayout,
        delimiter: u8,
    ) -> Result<Self, TextProviderError> {
        let mut records = ReaderBuilder::new()
            .delimiter(delimiter)
            .trim(Trim::All)
            .from_reader(reader);
        let headers = records.headers()?.clone();
        if headers.is_empty() {
            return Err(TextProviderError::EmptyInput);
        }
        let resolution_columns = layout.resolve(headers.iter())?;
        let label_indices = positions(&headers, &resolution_columns)?;
        let metadata_indices = positions(&headers, layout.metadata_columns())?;

        let mut labels = vec![Vec::new(); resolution_columns.len()];
        let mut metadata = vec![Vec::new(); metadata_indices.len()];
        for (row, record) in records.records().enumerate() {
            let record = record?;
            for ((column, &index), out) in resolution_columns
                .iter()
                .zip(&label_indices)
                .zip(&mut labels)
            {
                out.push(parse_label(column, row, cell(&record, index))?);
            }
            for ((column, &index), out) in layout
                .metadata_columns()
                .iter()
                .zip(&metadata_indices)
                .zip(&mut metadata)
            {
                out.push(parse_metadata(column, row, cell(&record, index))?);
            }
        }

        let mut table = MembershipTable::try_new(layout.convention(), labels)?;
        for (column, values) in layout.metadata_columns().iter().zip(metadata) {
            table = table.with_metadata(column.as_str(), values)?;
        }
        let provider = Self {
            name: name.into(),
            resolution_columns,
            table,
        };
        debug!(
            name = %provider.name,
            kk = provider.table.kk(),
            rows = provider.table.rows(),
            "membership table loaded"
        );
        Ok(provider)
    }

    /// Returns the provider name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the resolution columns in resolution order.
    #[must_use]
    pub fn resolution_columns(&self) -> &[String] {
        &self.resolution_columns
    }

    /// Returns the loaded membership table.
    #[must_use]
    pub const fn table(&self) -> &MembershipTable {
        &self.table
    }

    /// Consumes the provider and returns its membership table.
    #[must_use]
    pub fn into_table(self) -> MembershipTable {
        self.table
    }
}

fn positions(headers: &StringRecord, columns: &[String]) -> Result<Vec<usize>, TextProviderError> {
    columns
        .iter()
        .map(|column| {
            headers
                .iter()
                .position(|header| header == column)
                .ok_or_else(|| TextProviderError::ColumnNotFound {
                    column: column.clone(),
                })
        })
        .collect()
}

// Records always match the header width because the reader is not flexible.
fn cell(record: &StringRecord, index: usize) -> &str {
    record.get(index).unwrap_or_default()
}

// Float-typed exports write labels as `2.0`; a zero fraction is accepted.
fn parse_label(column: &str, row: usize, raw: &str) -> Result<i64, TextProviderError> {
    let integral = match raw.split_once('.') {
        Some((whole, fraction)) if !fraction.is_empty() && fraction.bytes().all(|b| b == b'0') => {
            whole
        }
        _ => raw,
    };
    integral.parse().map_err(|_| TextProviderError::InvalidLabel {
        column: column.to_owned(),
        row,
        raw: raw.to_owned(),
    })
}

fn parse_metadata(column: &str, row: usize, raw: &str) -> Result<f64, TextProviderError> {
    if raw.is_empty() || raw == "NA" {
        return Ok(f64::NAN);
    }
    raw.parse().map_err(|_| TextProviderError::InvalidMetadata {
        column: column.to_owned(),
        row,
        raw: raw.to_owned(),
    })
}

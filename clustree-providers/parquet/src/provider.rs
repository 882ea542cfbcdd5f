//! Membership provider backed by Parquet files and Arrow record batches.
use std::{fs::File, path::Path};

use arrow_array::RecordBatch;
use clustree_core::{MembershipLayout, MembershipTable};
use parquet::arrow::{ProjectionMask, arrow_reader::ParquetRecordBatchReaderBuilder};
use parquet::file::reader::ChunkReader;
use tracing::debug;

use crate::errors::ParquetProviderError;
use crate::ingest::ColumnBuffers;

/// Membership table loaded from columnar storage.
///
/// Resolution columns are located with a [`MembershipLayout`]: every column
/// named `<prefix><K>` holds the integer cluster labels for resolution `K`.
/// Metadata columns named by the layout are read as `f64`.
#[derive(Debug)]
pub struct ParquetMembershipProvider {
    name: String,
    resolution_columns: Vec<String>,
    table: MembershipTable,
}

impl ParquetMembershipProvider {
    fn from_buffers(
        name: impl Into<String>,
        buffers: ColumnBuffers,
        layout: &MembershipLayout,
    ) -> Result<Self, ParquetProviderError> {
        let (resolution_columns, table) = buffers.finish(layout.convention())?;
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

    /// Loads a membership table from the Parquet file at `path`.
    ///
    /// # Errors
    /// Returns [`ParquetProviderError::Io`] when the file cannot be opened,
    /// and any error reported by [`Self::try_from_parquet_reader`].
    pub fn try_from_parquet_path(
        name: impl Into<String>,
        path: impl AsRef<Path>,
        layout: &MembershipLayout,
    ) -> Result<Self, ParquetProviderError> {
        let file = File::open(path)?;
        Self::try_from_parquet_reader(name, file, layout)
    }

    /// Loads a membership table from a Parquet reader.
    ///
    /// Only the resolution and metadata columns are decoded.
    ///
    /// # Errors
    /// Returns [`ParquetProviderError::Membership`] when the resolution
    /// columns cannot be resolved or the labels fail validation,
    /// [`ParquetProviderError::InvalidColumnType`] for non-numeric columns and
    /// [`ParquetProviderError::NullValue`] for missing cells.
    pub fn try_from_parquet_reader<R>(
        name: impl Into<String>,
        reader: R,
        layout: &MembershipLayout,
    ) -> Result<Self, ParquetProviderError>
    where
        R: ChunkReader + 'static,
    {
        let builder = ParquetRecordBatchReaderBuilder::try_new(reader)?;
        let mut buffers = ColumnBuffers::for_schema(builder.schema(), layout)?;
        let mask = ProjectionMask::columns(builder.parquet_schema(), buffers.columns());
        let reader = builder.with_projection(mask).build()?;
        for batch in reader {
            buffers.append(&batch?)?;
        }
        Self::from_buffers(name, buffers, layout)
    }

    /// Loads a membership table from in-memory record batches.
    ///
    /// Columns are resolved against the schema of the first batch.
    ///
    /// # Errors
    /// Returns [`ParquetProviderError::NoBatches`] when `batches` is empty,
    /// and the same errors as [`Self::try_from_parquet_reader`] otherwise.
    pub fn try_from_record_batches(
        name: impl Into<String>,
        batches: &[RecordBatch],
        layout: &MembershipLayout,
    ) -> Result<Self, ParquetProviderError> {
        let first = batches.first().ok_or(ParquetProviderError::NoBatches)?;
        let mut buffers = ColumnBuffers::for_schema(&first.schema(), layout)?;
        for batch in batches {
            buffers.append(batch)?;
        }
        Self::from_buffers(name, buffers, layout)
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

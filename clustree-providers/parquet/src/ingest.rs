//! Helpers for copying Arrow columns into membership buffers.
use arrow_array::{
    Array, ArrayRef, ArrowPrimitiveType, RecordBatch,
    cast::AsArray,
    types::{
        Float32Type, Float64Type, Int8Type, Int16Type, Int32Type, Int64Type, UInt8Type,
        UInt16Type, UInt32Type, UInt64Type,
    },
};
use arrow_schema::{DataType, Schema};
use clustree_core::{IndexingConvention, MembershipLayout, MembershipTable};

use crate::errors::ParquetProviderError;

const LABEL: &str = "integer";
const METADATA: &str = "numeric";

/// Column buffers filled batch by batch before the table is validated.
#[derive(Debug)]
pub(crate) struct ColumnBuffers {
    resolution_columns: Vec<String>,
    metadata_columns: Vec<String>,
    labels: Vec<Vec<i64>>,
    metadata: Vec<Vec<f64>>,
    rows: usize,
}

impl ColumnBuffers {
    pub(crate) fn for_schema(
        schema: &Schema,
        layout: &MembershipLayout,
    ) -> Result<Self, ParquetProviderError> {
        let resolution_columns =
            layout.resolve(schema.fields().iter().map(|field| field.name().as_str()))?;
        for column in &resolution_columns {
            check_type(schema, column, LABEL, is_label_type)?;
        }
        let metadata_columns = layout.metadata_columns().to_vec();
        for column in &metadata_columns {
            check_type(schema, column, METADATA, is_metadata_type)?;
        }
        Ok(Self {
            labels: vec![Vec::new(); resolution_columns.len()],
            metadata: vec![Vec::new(); metadata_columns.len()],
            resolution_columns,
            metadata_columns,
            rows: 0,
        })
    }

    /// Names of every column the buffers read.
    pub(crate) fn columns(&self) -> impl Iterator<Item = &str> {
        self.resolution_columns
            .iter()
            .chain(&self.metadata_columns)
            .map(String::as_str)
    }

    pub(crate) fn append(&mut self, batch: &RecordBatch) -> Result<(), ParquetProviderError> {
        for (column, out) in self.resolution_columns.iter().zip(&mut self.labels) {
            append_labels(column_named(batch, column)?.as_ref(), column, self.rows, out)?;
        }
        for (column, out) in self.metadata_columns.iter().zip(&mut self.metadata) {
            append_metadata(column_named(batch, column)?.as_ref(), column, self.rows, out)?;
        }
        self.rows += batch.num_rows();
        Ok(())
    }

    pub(crate) fn finish(
        self,
        convention: IndexingConvention,
    ) -> Result<(Vec<String>, MembershipTable), ParquetProviderError> {
        let mut table = MembershipTable::try_new(convention, self.labels)?;
        for (column, values) in self.metadata_columns.into_iter().zip(self.metadata) {
            table = table.with_metadata(column, values)?;
        }
        Ok((self.resolution_columns, table))
    }
}

const fn is_label_type(data_type: &DataType) -> bool {
    matches!(
        data_type,
        DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
    )
}

const fn is_metadata_type(data_type: &DataType) -> bool {
    is_label_type(data_type) || matches!(data_type, DataType::Float32 | DataType::Float64)
}

fn check_type(
    schema: &Schema,
    column: &str,
    expected: &'static str,
    accepts: fn(&DataType) -> bool,
) -> Result<(), ParquetProviderError> {
    let field =
        schema
            .field_with_name(column)
            .map_err(|_| ParquetProviderError::ColumnNotFound {
                column: column.to_owned(),
            })?;
    if accepts(field.data_type()) {
        Ok(())
    } else {
        Err(ParquetProviderError::InvalidColumnType {
            column: column.to_owned(),
            expected,
            actual: field.data_type().clone(),
        })
    }
}

fn column_named<'a>(
    batch: &'a RecordBatch,
    column: &str,
) -> Result<&'a ArrayRef, ParquetProviderError> {
    batch
        .column_by_name(column)
        .ok_or_else(|| ParquetProviderError::ColumnNotFound {
            column: column.to_owned(),
        })
}

/// Copies one integer label column, widening every value to `i64`.
pub(crate) fn append_labels(
    array: &dyn Array,
    column: &str,
    start_row: usize,
    out: &mut Vec<i64>,
) -> Result<(), ParquetProviderError> {
    match array.data_type() {
        DataType::Int8 => extend::<Int8Type, _>(array, column, LABEL, start_row, out, widen),
        DataType::Int16 => extend::<Int16Type, _>(array, column, LABEL, start_row, out, widen),
        DataType::Int32 => extend::<Int32Type, _>(array, column, LABEL, start_row, out, widen),
        DataType::Int64 => extend::<Int64Type, _>(array, column, LABEL, start_row, out, |_, v| {
            Ok(v)
        }),
        DataType::UInt8 => extend::<UInt8Type, _>(array, column, LABEL, start_row, out, widen),
        DataType::UInt16 => {
            extend::<UInt16Type, _>(array, column, LABEL, start_row, out, widen)
        }
        DataType::UInt32 => {
            extend::<UInt32Type, _>(array, column, LABEL, start_row, out, widen)
        }
        DataType::UInt64 => {
            extend::<UInt64Type, _>(array, column, LABEL, start_row, out, |row, value| {
                i64::try_from(value).map_err(|_| ParquetProviderError::LabelOverflow {
                    column: column.to_owned(),
                    row,
                    value,
                })
            })
        }
        other => Err(ParquetProviderError::InvalidColumnType {
            column: column.to_owned(),
            expected: LABEL,
            actual: other.clone(),
        }),
    }
}

/// Copies one numeric metadata column as `f64`.
#[expect(
    clippy::cast_precision_loss,
    reason = "64-bit integer metadata is only used for coloring"
)]
pub(crate) fn append_metadata(
    array: &dyn Array,
    column: &str,
    start_row: usize,
    out: &mut Vec<f64>,
) -> Result<(), ParquetProviderError> {
    match array.data_type() {
        DataType::Float32 => {
            extend::<Float32Type, _>(array, column, METADATA, start_row, out, exact)
        }
        DataType::Float64 => {
            extend::<Float64Type, _>(array, column, METADATA, start_row, out, |_, v| Ok(v))
        }
        DataType::Int8 => extend::<Int8Type, _>(array, column, METADATA, start_row, out, exact),
        DataType::Int16 => {
            extend::<Int16Type, _>(array, column, METADATA, start_row, out, exact)
        }
        DataType::Int32 => {
            extend::<Int32Type, _>(array, column, METADATA, start_row, out, exact)
        }
        DataType::Int64 => {
            extend::<Int64Type, _>(array, column, METADATA, start_row, out, |_, v| Ok(v as f64))
        }
        DataType::UInt8 => {
            extend::<UInt8Type, _>(array, column, METADATA, start_row, out, exact)
        }
        DataType::UInt16 => {
            extend::<UInt16Type, _>(array, column, METADATA, start_row, out, exact)
        }
        DataType::UInt32 => {
            extend::<UInt32Type, _>(array, column, METADATA, start_row, out, exact)
        }
        DataType::UInt64 => {
            extend::<UInt64Type, _>(array, column, METADATA, start_row, out, |_, v| Ok(v as f64))
        }
        other => Err(ParquetProviderError::InvalidColumnType {
            column: column.to_owned(),
            expected: METADATA,
            actual: other.clone(),
        }),
    }
}

fn widen<N: Into<i64>>(_row: usize, value: N) -> Result<i64, ParquetProviderError> {
    Ok(value.into())
}

fn exact<N: Into<f64>>(_row: usize, value: N) -> Result<f64, ParquetProviderError> {
    Ok(value.into())
}

fn extend<T, O>(
    array: &dyn Array,
    column: &str,
    expected: &'static str,
    start_row: usize,
    out: &mut Vec<O>,
    convert: impl Fn(usize, T::Native) -> Result<O, ParquetProviderError>,
) -> Result<(), ParquetProviderError>
where
    T: ArrowPrimitiveType,
{
    let values = array.as_primitive_opt::<T>().ok_or_else(|| {
        ParquetProviderError::InvalidColumnType {
            column: column.to_owned(),
            expected,
            actual: array.data_type().clone(),
        }
    })?;
    out.reserve(values.len());
    for (offset, value) in values.iter().enumerate() {
        let row = start_row + offset;
        let value = value.ok_or_else(|| ParquetProviderError::NullValue {
            column: column.to_owned(),
            row,
        })?;
        out.push(convert(row, value)?);
    }
    Ok(())
}

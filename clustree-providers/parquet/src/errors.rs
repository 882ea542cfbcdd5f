use arrow_schema::{ArrowError, DataType};
use clustree_core::MembershipError;
use thiserror::Error;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ParquetProviderError {
    #[error("column `{column}` not found in Parquet schema")]
    ColumnNotFound { column: String },
    #[error("column `{column}` must hold {expected} values but found {actual:?}")]
    InvalidColumnType {
        column: String,
        expected: &'static str,
        actual: DataType,
    },
    #[error("column `{column}` is null at row {row}")]
    NullValue { column: String, row: usize },
    #[error("label {value} in column `{column}` at row {row} does not fit in i64")]
    LabelOverflow {
        column: String,
        row: usize,
        value: u64,
    },
    #[error("no record batches were supplied")]
    NoBatches,
    #[error(transparent)]
    Membership(#[from] MembershipError),
    #[error("arrow error: {0}")]
    Arrow(#[from] ArrowError),
    #[error("parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

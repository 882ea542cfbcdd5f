use arrow_array::{ArrayRef, Float64Array, Int32Array, RecordBatch};
use arrow_schema::{DataType, Field, Schema};
use bytes::Bytes;
use clustree_test_support::fixtures::{iris_membership, iris_sepal_length};
use parquet::arrow::arrow_writer::ArrowWriter;
use std::sync::Arc;

pub(crate) const SEPAL_LENGTH: &str = "sepal_length";

/// Builds the iris membership batch with `K1..K3` and a sepal length column.
pub(crate) fn iris_batch() -> RecordBatch {
    let mut fields = Vec::new();
    let mut columns: Vec<ArrayRef> = Vec::new();
    for (index, labels) in iris_membership().into_iter().enumerate() {
        fields.push(Field::new(format!("K{}", index + 1), DataType::Int32, false));
        let labels = labels
            .into_iter()
            .map(|label| i32::try_from(label).expect("fixture labels fit in i32"));
        columns.push(Arc::new(Int32Array::from_iter_values(labels)));
    }
    fields.push(Field::new(SEPAL_LENGTH, DataType::Float64, false));
    columns.push(Arc::new(Float64Array::from(iris_sepal_length())));
    RecordBatch::try_new(Arc::new(Schema::new(fields)), columns).expect("batch")
}

/// Builds a batch from named columns.
pub(crate) fn batch(columns: Vec<(&str, ArrayRef)>) -> RecordBatch {
    RecordBatch::try_from_iter(columns).expect("batch")
}

pub(crate) fn write_parquet(batch: &RecordBatch) -> Bytes {
    let mut buffer = Vec::new();
    {
        let mut writer = ArrowWriter::try_new(&mut buffer, batch.schema(), None).expect("writer");
        writer.write(batch).expect("write");
        writer.close().expect("close");
    }
    Bytes::from(buffer)
}

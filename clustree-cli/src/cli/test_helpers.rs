//! Small helpers shared across CLI tests.
//!
//! The CLI unit tests write temporary membership tables and assert error
//! handling behaviour. These helpers keep the test cases concise.

use std::fs::File;
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;

use arrow_array::{ArrayRef, Float64Array, Int64Array, RecordBatch};
use arrow_schema::{DataType, Field, Schema};
use clap::Parser;
use clustree_test_support::fixtures::{iris_csv, iris_membership, iris_sepal_length};
use parquet::arrow::arrow_writer::ArrowWriter;
use tempfile::TempDir;

use super::commands::run_build;
use super::{BuildCommand, Cli, CliError, Command};

pub(super) type TestResult = Result<(), Box<dyn std::error::Error>>;

pub(super) fn temp_dir() -> TempDir {
    match TempDir::new() {
        Ok(dir) => dir,
        Err(err) => panic!("failed to create temp dir: {err}"),
    }
}

pub(super) fn create_text_file(dir: &TempDir, name: &str, contents: &str) -> io::Result<PathBuf> {
    let path = dir.path().join(name);
    let mut file = File::create(&path)?;
    file.write_all(contents.as_bytes())?;
    Ok(path)
}

pub(super) fn create_iris_csv(dir: &TempDir) -> io::Result<PathBuf> {
    create_text_file(dir, "iris.csv", &iris_csv())
}

/// Schema of the iris Parquet fixture: `K1..K3` labels plus `sepal_length`.
pub(super) fn iris_schema() -> Arc<Schema> {
    let mut fields: Vec<Field> = (1..=iris_membership().len())
        .map(|resolution| Field::new(format!("K{resolution}"), DataType::Int64, false))
        .collect();
    fields.push(Field::new("sepal_length", DataType::Float64, false));
    Arc::new(Schema::new(fields))
}

/// Writes the iris membership table as `K1..K3` plus `sepal_length`.
pub(super) fn create_iris_parquet(
    dir: &TempDir,
) -> Result<PathBuf, Box<dyn std::error::Error>> {
    let path = dir.path().join("iris.parquet");
    let mut columns: Vec<ArrayRef> = iris_membership()
        .into_iter()
        .map(|labels| Arc::new(Int64Array::from(labels)) as ArrayRef)
        .collect();
    columns.push(Arc::new(Float64Array::from(iris_sepal_length())));
    let schema = iris_schema();
    let batch = RecordBatch::try_new(Arc::clone(&schema), columns)?;
    let file = File::create(&path)?;
    let mut writer = ArrowWriter::try_new(file, schema, None)?;
    writer.write(&batch)?;
    writer.close()?;
    Ok(path)
}

/// Parses `args` after `clustree build` and returns the build command.
pub(super) fn parse_build(args: &[&str]) -> BuildCommand {
    let argv = ["clustree", "build"].iter().chain(args);
    match Cli::try_parse_from(argv) {
        Ok(Cli {
            command: Command::Build(build),
        }) => build,
        Err(err) => panic!("arguments must parse: {err}"),
    }
}

pub(super) fn run_build_expecting_error(command: BuildCommand, panic_msg: &str) -> CliError {
    match run_build(command) {
        Ok(_) => panic!("{panic_msg}"),
        Err(err) => err,
    }
}

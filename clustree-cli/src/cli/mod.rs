//! Command-line interface orchestration for building clustering trees.
//!
//! The `build` command loads a membership table from Parquet or delimited
//! text, runs the clustree pipeline and renders the tree as a summary or JSON.

mod commands;
mod images;
mod render;

pub use commands::{
    BuildCommand, BuildSource, Cli, CliError, ColorArgError, Command, ExecutionSummary,
    NodeColorChoice, OutputFormat, ParquetArgs, TextArgs, run_cli,
};
pub use images::DirectoryImages;
pub use render::{render, render_json, render_summary};

#[cfg(test)]
mod test_helpers;

//! Command implementations and argument parsing for the clustree CLI.

use std::fs::File;
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clustree_core::{
    Aggregator, ClusterGraph, Clustree, ClustreeBuilder, ClustreeError, EdgeColorStrategy,
    IndexingConvention, MembershipError, MembershipLayout, MembershipTable, NamedColormap,
    NodeColorStrategy, ParseError, Rgba,
};
use clustree_providers_parquet::{ParquetMembershipProvider, ParquetProviderError};
use clustree_providers_text::{DelimitedTextProvider, TextProviderError, delimiter_for_path};
use thiserror::Error;
use tracing::{Span, field, info, instrument};

use super::images::DirectoryImages;

const DEFAULT_PREFIX: &str = "K";

/// Top-level CLI options parsed by [`clap`].
#[derive(Debug, Parser, Clone)]
#[command(
    name = "clustree",
    about = "Build clustering trees from cluster membership tables."
)]
pub struct Cli {
    /// Command to execute.
    #[command(subcommand)]
    pub command: Command,
}

/// Supported CLI commands.
#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Build the clustering tree for a membership table.
    Build(BuildCommand),
}

/// Options accepted by the `build` command.
#[derive(Debug, Args, Clone)]
pub struct BuildCommand {
    /// Prefix shared by the resolution columns (`K` matches `K1`, `K2`, ...).
    #[arg(long, default_value = DEFAULT_PREFIX)]
    pub prefix: String,

    /// Number of resolutions to use (defaults to every column found).
    #[arg(long)]
    pub kk: Option<usize>,

    /// Smallest cluster label: 1 for one-based tables, 0 for zero-based.
    #[arg(long = "min-cluster-number", default_value_t = 1)]
    pub min_cluster_number: i64,

    /// Node coloring: `resolution`, `samples`, `fixed:<color>` or `column:<name>`.
    #[arg(long = "node-color", default_value = "resolution")]
    pub node_color: NodeColorChoice,

    /// Aggregator applied to the `column:<name>` node color.
    #[arg(long = "node-aggregate")]
    pub node_aggregate: Option<Aggregator>,

    /// Colormap for continuous node colors.
    #[arg(long = "node-cmap", default_value = "Blues")]
    pub node_cmap: NamedColormap,

    /// Edge coloring: `resolution`, `samples` or `fixed:<color>`.
    #[arg(long = "edge-color", default_value = "samples", value_parser = parse_edge_color)]
    pub edge_color: EdgeColorStrategy,

    /// Colormap for continuous edge colors.
    #[arg(long = "edge-cmap", default_value = "Reds")]
    pub edge_cmap: NamedColormap,

    /// Directory holding `<K>_<k>.png` node images.
    #[arg(long)]
    pub images: Option<PathBuf>,

    /// Fail when a node image is missing instead of using a placeholder.
    #[arg(long = "strict-images", requires = "images")]
    pub strict_images: bool,

    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Summary)]
    pub format: OutputFormat,

    /// Membership table source.
    #[command(subcommand)]
    pub source: BuildSource,
}

/// Membership table sources supported by the `build` command.
#[derive(Debug, Subcommand, Clone)]
pub enum BuildSource {
    /// Read integer resolution columns from a Parquet file.
    Parquet(ParquetArgs),
    /// Read a delimited text file with a header row.
    Text(TextArgs),
}

/// Parquet ingestion arguments.
#[derive(Debug, Args, Clone)]
pub struct ParquetArgs {
    /// Path to the Parquet file.
    pub path: PathBuf,

    /// Override name for the table (defaults to the file name).
    #[arg(long)]
    pub name: Option<String>,
}

/// Delimited text ingestion arguments.
#[derive(Debug, Args, Clone)]
pub struct TextArgs {
    /// Path to the delimited text file.
    pub path: PathBuf,

    /// Field delimiter (defaults to tab for `.tsv` files, comma otherwise).
    #[arg(long)]
    pub delimiter: Option<char>,

    /// Override name for the table (defaults to the file name).
    #[arg(long)]
    pub name: Option<String>,
}

/// Output formats for the built tree.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Counts followed by one line per node and edge.
    #[default]
    Summary,
    /// The full graph as JSON.
    Json,
}

/// Node coloring selected on the command line.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeColorChoice {
    /// Palette color per resolution.
    Resolution,
    /// Colormap over node sample counts.
    Samples,
    /// One color for every node.
    Fixed(Rgba),
    /// Colormap over an aggregated metadata column.
    Column(String),
}

/// Errors raised while parsing color arguments.
#[derive(Debug, Error)]
pub enum ColorArgError {
    /// The value matched none of the supported choices.
    #[error("unknown color choice `{raw}`; expected {expected}")]
    UnknownChoice {
        /// Value supplied by the user.
        raw: String,
        /// Supported forms.
        expected: &'static str,
    },
    /// The value after `column:` was empty.
    #[error("`column:` requires a metadata column name")]
    EmptyColumn,
    /// A `fixed:` color failed to parse.
    #[error(transparent)]
    Color(#[from] ParseError),
}

impl FromStr for NodeColorChoice {
    type Err = ColorArgError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        if let Some(color) = raw.strip_prefix("fixed:") {
            return Ok(Self::Fixed(color.parse()?));
        }
        if let Some(column) = raw.strip_prefix("column:") {
            if column.is_empty() {
                return Err(ColorArgError::EmptyColumn);
            }
            return Ok(Self::Column(column.to_owned()));
        }
        match raw {
            "resolution" => Ok(Self::Resolution),
            "samples" => Ok(Self::Samples),
            _ => Err(ColorArgError::UnknownChoice {
                raw: raw.to_owned(),
                expected: "resolution, samples, fixed:<color> or column:<name>",
            }),
        }
    }
}

impl NodeColorChoice {
    fn strategy(&self, aggregator: Option<Aggregator>) -> NodeColorStrategy {
        match self {
            Self::Resolution => NodeColorStrategy::ByResolution,
            Self::Samples => NodeColorStrategy::BySampleCount,
            Self::Fixed(color) => NodeColorStrategy::Fixed(*color),
            Self::Column(column) => NodeColorStrategy::ByAggregateColumn {
                column: column.clone(),
                aggregator,
            },
        }
    }

    fn metadata_column(&self) -> Option<&str> {
        match self {
            Self::Column(column) => Some(column),
            _ => None,
        }
    }
}

pub(super) fn parse_edge_color(raw: &str) -> Result<EdgeColorStrategy, ColorArgError> {
    if let Some(color) = raw.strip_prefix("fixed:") {
        return Ok(EdgeColorStrategy::Fixed(color.parse()?));
    }
    match raw {
        "resolution" => Ok(EdgeColorStrategy::ByResolution),
        "samples" => Ok(EdgeColorStrategy::BySampleCount),
        _ => Err(ColorArgError::UnknownChoice {
            raw: raw.to_owned(),
            expected: "resolution, samples or fixed:<color>",
        }),
    }
}

/// Errors surfaced while executing CLI commands.
#[derive(Debug, Error)]
pub enum CliError {
    /// File I/O failed while loading an input source.
    #[error("failed to open `{path}`: {source}")]
    Io {
        /// Path that triggered the failure.
        path: PathBuf,
        /// Underlying operating system error.
        #[source]
        source: io::Error,
    },
    /// The text delimiter is not a single-byte character.
    #[error("delimiter `{delimiter}` must be a single ASCII character")]
    InvalidDelimiter {
        /// Delimiter supplied by the user.
        delimiter: char,
    },
    /// Parquet ingestion failed.
    #[error(transparent)]
    Parquet(#[from] ParquetProviderError),
    /// Text ingestion failed.
    #[error(transparent)]
    Text(#[from] TextProviderError),
    /// Membership layout options were invalid.
    #[error(transparent)]
    Membership(#[from] MembershipError),
    /// Core orchestration failed.
    #[error(transparent)]
    Core(#[from] ClustreeError),
}

impl CliError {
    /// Stable code of the underlying library error, when it has one.
    #[must_use]
    pub fn code(&self) -> Option<&'static str> {
        match self {
            Self::Core(error) => Some(error.code().as_str()),
            Self::Membership(error)
            | Self::Parquet(ParquetProviderError::Membership(error))
            | Self::Text(TextProviderError::Membership(error)) => Some(error.code().as_str()),
            _ => None,
        }
    }

    /// Code of the error nested inside a core error, when there is one.
    #[must_use]
    pub fn detail_code(&self) -> Option<&'static str> {
        match self {
            Self::Core(error) => error
                .membership_code()
                .map(|code| code.as_str())
                .or_else(|| error.image_code().map(|code| code.as_str())),
            _ => None,
        }
    }
}

/// Outcome of a `build` command.
#[derive(Debug, Clone)]
pub struct ExecutionSummary {
    /// Name of the membership table.
    pub data_source: String,
    /// Output format requested on the command line.
    pub format: OutputFormat,
    /// The assembled clustering tree.
    pub graph: ClusterGraph,
}

/// Executes the CLI command represented by `cli`.
///
/// # Errors
/// Returns [`CliError`] when loading the table or building the tree fails.
///
/// # Examples
/// ```
/// # use std::error::Error;
/// # use clap::Parser;
/// # use clustree_cli::cli::{Cli, run_cli};
/// # use tempfile::NamedTempFile;
/// #
/// # fn main() -> Result<(), Box<dyn Error>> {
/// let file = NamedTempFile::new()?;
/// std::fs::write(file.path(), "K1,K2\n1,1\n1,2\n")?;
/// let path = file.path().to_str().ok_or("non-UTF-8 temp path")?;
/// let cli = Cli::try_parse_from(["clustree", "build", "text", path])?;
/// let summary = run_cli(cli)?;
/// assert_eq!(summary.graph.node_count(), 3);
/// # Ok(())
/// # }
/// ```
#[instrument(
    name = "cli.run",
    err,
    skip(cli),
    fields(command = field::Empty),
)]
pub fn run_cli(cli: Cli) -> Result<ExecutionSummary, CliError> {
    match cli.command {
        Command::Build(build) => {
            Span::current().record("command", field::display("build"));
            run_build(build)
        }
    }
}

#[instrument(
    name = "cli.build",
    err,
    skip(command),
    fields(prefix = field::Empty, source = field::Empty, images = field::Empty),
)]
pub(super) fn run_build(command: BuildCommand) -> Result<ExecutionSummary, CliError> {
    let clustree = configure(&command)?;
    let layout = layout(&command)?;

    let span = Span::current();
    span.record("prefix", field::display(&command.prefix));
    span.record("images", command.images.is_some());

    let (data_source, table) = match command.source {
        BuildSource::Parquet(args) => {
            span.record("source", field::display("parquet"));
            load_parquet(args, &layout)?
        }
        BuildSource::Text(args) => {
            span.record("source", field::display("text"));
            load_text(args, &layout)?
        }
    };

    let graph = match &command.images {
        Some(root) => {
            clustree.run_with_images(&table, &DirectoryImages::new(root, command.strict_images))?
        }
        None => clustree.run(&table)?,
    };

    info!(
        data_source = data_source.as_str(),
        nodes = graph.node_count(),
        edges = graph.edge_count(),
        "command completed"
    );
    Ok(ExecutionSummary {
        data_source,
        format: command.format,
        graph,
    })
}

fn configure(command: &BuildCommand) -> Result<Clustree, CliError> {
    let clustree = ClustreeBuilder::new()
        .with_node_color(command.node_color.strategy(command.node_aggregate))
        .with_node_colormap(command.node_cmap)
        .with_edge_color(command.edge_color.clone())
        .with_edge_colormap(command.edge_cmap)
        .build()?;
    Ok(clustree)
}

pub(super) fn layout(command: &BuildCommand) -> Result<MembershipLayout, CliError> {
    let convention = IndexingConvention::try_from(command.min_cluster_number)?;
    let mut layout = MembershipLayout::new(command.prefix.as_str()).with_convention(convention);
    if let Some(kk) = command.kk {
        layout = layout.with_kk(kk);
    }
    if let Some(column) = command.node_color.metadata_column() {
        layout = layout.with_metadata_column(column);
    }
    Ok(layout)
}

#[instrument(
    name = "cli.load_parquet",
    err,
    skip(args, layout),
    fields(path = field::Empty, override_name = field::Empty),
)]
pub(super) fn load_parquet(
    args: ParquetArgs,
    layout: &MembershipLayout,
) -> Result<(String, MembershipTable), CliError> {
    let ParquetArgs { path, name } = args;
    let span = Span::current();
    span.record("path", field::display(path.display()));
    span.record(
        "override_name",
        field::display(name.as_deref().unwrap_or("<derived>")),
    );
    let chosen_name = derive_data_source_name(&path, name.as_deref());
    let provider = ParquetMembershipProvider::try_from_parquet_path(chosen_name, &path, layout)?;
    info!(
        data_source = provider.name(),
        resolutions = provider.resolution_columns().len(),
        "parquet table loaded"
    );
    Ok((provider.name().to_owned(), provider.into_table()))
}

#[instrument(
    name = "cli.load_text",
    err,
    skip(args, layout),
    fields(path = field::Empty, delimiter = field::Empty, override_name = field::Empty),
)]
pub(super) fn load_text(
    args: TextArgs,
    layout: &MembershipLayout,
) -> Result<(String, MembershipTable), CliError> {
    let TextArgs {
        path,
        delimiter,
        name,
    } = args;
    let delimiter = match delimiter {
        Some(delimiter) => u8::try_from(delimiter)
            .ok()
            .filter(u8::is_ascii)
            .ok_or(CliError::InvalidDelimiter { delimiter })?,
        None => delimiter_for_path(&path),
    };
    let span = Span::current();
    span.record("path", field::display(path.display()));
    span.record("delimiter", field::debug(char::from(delimiter)));
    span.record(
        "override_name",
        field::display(name.as_deref().unwrap_or("<derived>")),
    );
    let chosen_name = derive_data_source_name(&path, name.as_deref());
    let reader = open_text_reader(&path)?;
    let provider = DelimitedTextProvider::try_from_reader(chosen_name, reader, layout, delimiter)?;
    info!(
        data_source = provider.name(),
        resolutions = provider.resolution_columns().len(),
        "text table loaded"
    );
    Ok((provider.name().to_owned(), provider.into_table()))
}

#[instrument(name = "cli.open_text_reader", err, fields(path = field::Empty))]
pub(super) fn open_text_reader(path: &Path) -> Result<BufReader<File>, CliError> {
    Span::current().record("path", field::display(path.display()));
    let file = File::open(path).map_err(|source| CliError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(BufReader::new(file))
}

pub(super) fn derive_data_source_name(path: &Path, override_name: Option<&str>) -> String {
    if let Some(name) = override_name {
        return name.to_owned();
    }

    path.file_stem()
        .and_then(|value| value.to_str())
        .map_or_else(|| "membership".to_owned(), ToOwned::to_owned)
}

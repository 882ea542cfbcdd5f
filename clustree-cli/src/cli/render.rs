//! Output rendering for the `build` command.

use std::io::{self, Write};

use clustree_core::{ClusterGraph, Rgba, node_stem};
use serde::Serialize;

use super::commands::{ExecutionSummary, OutputFormat};

#[derive(Serialize)]
struct JsonOutput<'a> {
    data_source: &'a str,
    graph: &'a ClusterGraph,
}

/// Renders `summary` in the format it requested.
///
/// # Errors
/// Returns [`io::Error`] if serialisation or writing fails.
pub fn render(summary: &ExecutionSummary, writer: impl Write) -> io::Result<()> {
    match summary.format {
        OutputFormat::Summary => render_summary(summary, writer),
        OutputFormat::Json => render_json(summary, writer),
    }
}

/// Renders `summary` as counts followed by one tab-separated line per node
/// and edge, ordered by resolution then label.
///
/// # Errors
/// Returns [`io::Error`] if writing to the supplied writer fails.
pub fn render_summary(summary: &ExecutionSummary, mut writer: impl Write) -> io::Result<()> {
    let graph = &summary.graph;
    writeln!(writer, "data source: {}", summary.data_source)?;
    writeln!(writer, "resolutions: {}", graph.kk())?;
    writeln!(writer, "samples: {}", graph.sample_total())?;
    writeln!(writer, "nodes: {}", graph.node_count())?;
    writeln!(writer, "edges: {}", graph.edge_count())?;
    for (_, node) in graph.nodes() {
        writeln!(
            writer,
            "node\t{}\t{}\t{}",
            node_stem(node.resolution(), node.label()),
            node.sample_count(),
            color_cell(node.color()),
        )?;
    }
    for (_, edge) in graph.edges() {
        writeln!(
            writer,
            "edge\t{}->{}\t{}\t{:.4}\t{}",
            node_stem(edge.resolution() - 1, edge.start_label()),
            node_stem(edge.resolution(), edge.end_label()),
            edge.sample_count(),
            edge.flow_fraction(),
            color_cell(edge.color()),
        )?;
    }
    Ok(())
}

/// Renders `summary` as pretty-printed JSON.
///
/// # Errors
/// Returns [`io::Error`] if serialisation or writing fails.
pub fn render_json(summary: &ExecutionSummary, mut writer: impl Write) -> io::Result<()> {
    let output = JsonOutput {
        data_source: &summary.data_source,
        graph: &summary.graph,
    };
    serde_json::to_writer_pretty(&mut writer, &output)?;
    writeln!(writer)
}

fn color_cell(color: Option<Rgba>) -> String {
    color.map_or_else(|| "-".to_owned(), |color| color.to_hex())
}

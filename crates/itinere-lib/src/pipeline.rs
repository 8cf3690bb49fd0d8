//! End-to-end build: load features, build the graph, bridge ports, serialise.

use std::io::BufRead;
use std::path::Path;

use tracing::{info, warn};

use crate::artifact::GraphArtifact;
use crate::config::BuildConfig;
use crate::error::Result;
use crate::feature::{open_features, FeatureReader};
use crate::graph::{FeatureOutcome, GraphBuilder};
use crate::output::BuildReport;
use crate::ports::bridge_sea_ports;

/// Artifact plus the counters gathered while producing it.
#[derive(Debug, Clone)]
pub struct GraphBuild {
    pub artifact: GraphArtifact,
    pub report: BuildReport,
}

/// Build a graph from any newline-delimited feature source.
pub fn build_graph<R: BufRead>(reader: R, config: &BuildConfig) -> Result<GraphBuild> {
    config.validate()?;
    build_from_features(FeatureReader::new(reader), config)
}

/// Build a graph from a feature file on disk.
pub fn build_graph_from_path(input: &Path, config: &BuildConfig) -> Result<GraphBuild> {
    config.validate()?;
    info!(path = %input.display(), "loading features");
    build_from_features(open_features(input)?, config)
}

/// Build from `input` and atomically write the artifact to `output`.
///
/// Nothing is written unless the whole build succeeds.
pub fn run_build(input: &Path, output: &Path, config: &BuildConfig) -> Result<BuildReport> {
    let GraphBuild {
        artifact,
        mut report,
    } = build_graph_from_path(input, config)?;
    report.bytes_written = Some(artifact.save(output)?);
    Ok(report)
}

fn build_from_features<R: BufRead>(
    mut features: FeatureReader<R>,
    config: &BuildConfig,
) -> Result<GraphBuild> {
    let mut builder = GraphBuilder::new(config.cell_size);
    let mut report = BuildReport::default();

    for feature in features.by_ref() {
        let feature = feature?;
        report.features_read += 1;
        if let FeatureOutcome::Skipped(reason) = builder.add_feature(&feature) {
            report.skipped.record(reason);
        }
    }
    report.malformed_lines = features.malformed_lines();

    if report.features_read == 0 {
        warn!(
            lines = features.lines_read(),
            "input contained no decodable features"
        );
    }

    let [(_, land), (_, river), (_, sea), _] = builder.edge_counts();
    info!(
        features = report.features_read,
        malformed_lines = report.malformed_lines,
        skipped = report.skipped.total(),
        nodes = builder.nodes().len(),
        edges = builder.edges().len(),
        land,
        river,
        sea,
        "built routing graph"
    );

    if config.bridge_ports {
        report.ports = Some(bridge_sea_ports(&mut builder, config.port_radius_km));
    }

    report.nodes = builder.nodes().len();
    report.edges = builder.edges().len();
    report.edges_by_kind = builder.edge_counts().into_iter().collect();
    report.spatial_cells = builder.spatial_index().len();

    Ok(GraphBuild {
        artifact: GraphArtifact::from_builder(builder),
        report,
    })
}

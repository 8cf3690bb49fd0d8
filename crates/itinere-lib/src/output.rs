use std::collections::BTreeMap;
use std::fmt::Write;

use serde::Serialize;

use crate::graph::{Edge, EdgeKind, SkipReason};
use crate::ports::PortReport;

/// Features dropped by the builder, by reason.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SkippedFeatures {
    pub not_line_string: usize,
    pub invalid_coordinates: usize,
    pub too_few_points: usize,
    pub self_loops: usize,
}

impl SkippedFeatures {
    pub fn record(&mut self, reason: SkipReason) {
        let counter = match reason {
            SkipReason::NotLineString => &mut self.not_line_string,
            SkipReason::InvalidCoordinates => &mut self.invalid_coordinates,
            SkipReason::TooFewPoints => &mut self.too_few_points,
            SkipReason::SelfLoop => &mut self.self_loops,
        };
        *counter += 1;
    }

    pub fn total(&self) -> usize {
        self.not_line_string + self.invalid_coordinates + self.too_few_points + self.self_loops
    }
}

/// Counters collected while running the build pipeline.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BuildReport {
    pub features_read: usize,
    pub malformed_lines: usize,
    pub skipped: SkippedFeatures,
    pub nodes: usize,
    pub edges: usize,
    pub edges_by_kind: BTreeMap<EdgeKind, usize>,
    /// `None` when bridging was disabled.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ports: Option<PortReport>,
    pub spatial_cells: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bytes_written: Option<u64>,
}

impl BuildReport {
    pub fn edges_of(&self, kind: EdgeKind) -> usize {
        self.edges_by_kind.get(&kind).copied().unwrap_or(0)
    }

    pub fn render_plain(&self) -> String {
        let mut buffer = String::new();
        let _ = writeln!(
            buffer,
            "Loaded {} features ({} malformed lines skipped)",
            self.features_read, self.malformed_lines
        );
        if self.skipped.total() > 0 {
            let _ = writeln!(
                buffer,
                "Skipped {} features: {} non-line, {} invalid coordinates, {} too short, {} self-loops",
                self.skipped.total(),
                self.skipped.not_line_string,
                self.skipped.invalid_coordinates,
                self.skipped.too_few_points,
                self.skipped.self_loops
            );
        }
        let _ = writeln!(buffer, "Created {} nodes and {} edges", self.nodes, self.edges);
        let _ = writeln!(
            buffer,
            "Edge types: {} land, {} sea, {} river, {} port",
            self.edges_of(EdgeKind::Land),
            self.edges_of(EdgeKind::Sea),
            self.edges_of(EdgeKind::River),
            self.edges_of(EdgeKind::Port)
        );
        match &self.ports {
            Some(ports) => {
                let _ = writeln!(
                    buffer,
                    "Added {} port connector edges ({} of {} sea-only nodes left unbridged)",
                    ports.ports_added, ports.unbridged, ports.sea_only_nodes
                );
            }
            None => {
                let _ = writeln!(buffer, "Port bridging disabled");
            }
        }
        let _ = writeln!(buffer, "Spatial index cells: {}", self.spatial_cells);
        if let Some(bytes) = self.bytes_written {
            let _ = writeln!(
                buffer,
                "Written {:.2} MB",
                bytes as f64 / (1024.0 * 1024.0)
            );
        }
        buffer
    }
}

/// Per-kind totals inside a [`GraphSummary`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct KindTotals {
    pub kind: EdgeKind,
    pub edges: usize,
    pub length_km: f64,
}

/// Shape of a finished graph artifact.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphSummary {
    pub nodes: usize,
    pub edges: usize,
    pub spatial_cells: usize,
    pub cell_size: f64,
    /// One entry per kind present in the graph, in [`EdgeKind::ALL`] order.
    pub kinds: Vec<KindTotals>,
}

impl GraphSummary {
    pub fn new(nodes: usize, edges: &[Edge], spatial_cells: usize, cell_size: f64) -> Self {
        let kinds = EdgeKind::ALL
            .iter()
            .filter_map(|&kind| {
                let (count, length_km) = edges
                    .iter()
                    .filter(|edge| edge.kind == kind)
                    .fold((0, 0.0), |(count, total), edge| (count + 1, total + edge.length));
                (count > 0).then_some(KindTotals {
                    kind,
                    edges: count,
                    length_km,
                })
            })
            .collect();

        Self {
            nodes,
            edges: edges.len(),
            spatial_cells,
            cell_size,
            kinds,
        }
    }

    pub fn kind(&self, kind: EdgeKind) -> Option<&KindTotals> {
        self.kinds.iter().find(|totals| totals.kind == kind)
    }

    pub fn render_plain(&self) -> String {
        let mut buffer = String::new();
        let _ = writeln!(buffer, "Graph summary:");
        let _ = writeln!(buffer, "  Nodes: {}", self.nodes);
        let _ = writeln!(buffer, "  Edges: {}", self.edges);
        for totals in &self.kinds {
            let _ = writeln!(
                buffer,
                "    {:<5} {:>7} edges {:>12.3} km",
                totals.kind.label(),
                totals.edges,
                totals.length_km
            );
        }
        let _ = writeln!(
            buffer,
            "  Spatial index cells: {} ({} deg)",
            self.spatial_cells, self.cell_size
        );
        buffer
    }
}

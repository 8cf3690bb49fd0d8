//! The graph artifact written for the routing front end.
//!
//! # Format
//!
//! A single compact JSON object:
//!
//! ```text
//! {
//!   "nodes":        [{"lat": f64, "lon": f64}, ...],          index = node id
//!   "edges":        [{"from", "to", "length", "type", "coords"}, ...]
//!   "spatialIndex": {"<lat_cell>,<lon_cell>": [edge index, ...], ...}
//!   "cellSize":     0.25
//! }
//! ```
//!
//! Edge `coords` are latitude-first pairs. The artifact is written to a
//! temporary file beside the destination and renamed into place, so readers
//! never observe a partially written graph.

use std::collections::{BTreeMap, HashSet};
use std::fs::File;
use std::io::{BufReader, BufWriter, ErrorKind, Read, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::geo::{round_to, LatLon};
use crate::graph::{Edge, EdgeIndex, GraphBuilder, COORD_PRECISION};
use crate::output::GraphSummary;
use crate::spatial::{CellKey, SpatialIndex};

/// Serialisable routing graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphArtifact {
    pub nodes: Vec<LatLon>,
    pub edges: Vec<Edge>,
    pub spatial_index: BTreeMap<CellKey, Vec<EdgeIndex>>,
    pub cell_size: f64,
}

impl GraphArtifact {
    /// Freeze a builder into an artifact, rounding node coordinates.
    pub fn from_builder(builder: GraphBuilder) -> Self {
        let (nodes, edges, spatial_index) = builder.into_parts();
        let cell_size = spatial_index.cell_size();
        let nodes = nodes
            .iter()
            .map(|node| {
                LatLon::new(
                    round_to(node.position.lat, COORD_PRECISION),
                    round_to(node.position.lon, COORD_PRECISION),
                )
            })
            .collect();

        Self {
            nodes,
            edges,
            spatial_index: spatial_index.into_cells(),
            cell_size,
        }
    }

    /// Typed view of the spatial index.
    pub fn spatial_index(&self) -> SpatialIndex {
        SpatialIndex::from_cells(self.cell_size, self.spatial_index.clone())
    }

    pub fn summary(&self) -> GraphSummary {
        GraphSummary::new(
            self.nodes.len(),
            &self.edges,
            self.spatial_index.len(),
            self.cell_size,
        )
    }

    /// Encode as compact JSON.
    pub fn write_to<W: Write>(&self, writer: W) -> Result<()> {
        serde_json::to_writer(writer, self)?;
        Ok(())
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Atomically write the artifact to `path`, returning its size in bytes.
    pub fn save(&self, path: &Path) -> Result<u64> {
        let write_error = |message: String| Error::ArtifactWrite {
            path: path.to_path_buf(),
            message,
        };
        let parent = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        let mut tmp = NamedTempFile::new_in(parent)
            .map_err(|e| write_error(format!("failed to create temporary file: {}", e)))?;
        {
            let mut writer = BufWriter::new(tmp.as_file_mut());
            self.write_to(&mut writer)?;
            writer.flush()?;
        }
        let bytes = tmp.as_file().metadata()?.len();
        tmp.persist(path)
            .map_err(|e| write_error(format!("failed to move artifact into place: {}", e.error)))?;

        info!(
            path = %path.display(),
            bytes,
            nodes = self.nodes.len(),
            edges = self.edges.len(),
            "graph artifact written"
        );
        Ok(bytes)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        Ok(serde_json::from_reader(reader)?)
    }

    /// Load an artifact from disk without checking its invariants.
    pub fn load(path: &Path) -> Result<Self> {
        debug!(path = %path.display(), "loading graph artifact");
        let load_error = |message: String| Error::ArtifactLoad {
            path: path.to_path_buf(),
            message,
        };

        let file = File::open(path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => load_error("file does not exist".to_string()),
            _ => load_error(format!("failed to open file: {}", e)),
        })?;
        serde_json::from_reader(BufReader::new(file))
            .map_err(|e| load_error(format!("invalid graph JSON: {}", e)))
    }

    /// Every invariant violation found in the artifact.
    pub fn problems(&self) -> Vec<String> {
        let mut problems = Vec::new();

        if !self.cell_size.is_finite() || self.cell_size <= 0.0 {
            problems.push(format!("cell size {} is not positive", self.cell_size));
            return problems;
        }

        let node_count = self.nodes.len();
        for (index, edge) in self.edges.iter().enumerate() {
            if edge.from >= node_count || edge.to >= node_count {
                problems.push(format!(
                    "edge {} references node {}-{} outside 0..{}",
                    index, edge.from, edge.to, node_count
                ));
            }
            if edge.from == edge.to {
                problems.push(format!("edge {} is a self-loop on node {}", index, edge.from));
            }
            if edge.coords.len() < 2 {
                problems.push(format!("edge {} has fewer than two coordinates", index));
            }
        }

        let mut registered: HashSet<(CellKey, EdgeIndex)> = HashSet::new();
        for (cell, bucket) in &self.spatial_index {
            for &edge in bucket {
                if edge >= self.edges.len() {
                    problems.push(format!("cell {} lists unknown edge {}", cell, edge));
                }
                if !registered.insert((*cell, edge)) {
                    problems.push(format!("cell {} lists edge {} more than once", cell, edge));
                }
            }
        }

        for (index, edge) in self.edges.iter().enumerate() {
            for &[lat, lon] in &edge.coords {
                let covered = candidate_cells(lat, lon, self.cell_size)
                    .any(|cell| registered.contains(&(cell, index)));
                if !covered {
                    problems.push(format!(
                        "edge {} point [{}, {}] is missing from the spatial index",
                        index, lat, lon
                    ));
                }
            }
        }

        problems
    }

    /// Check the graph invariants, reporting every violation at once.
    pub fn validate(&self) -> Result<()> {
        let problems = self.problems();
        if problems.is_empty() {
            Ok(())
        } else {
            Err(Error::InvalidArtifact { problems })
        }
    }
}

/// Cells the unrounded source of a stored coordinate could have fallen in.
///
/// Stored coordinates are rounded, while land edges are indexed from the raw
/// input, so a point near a cell boundary may be registered in the adjacent
/// cell.
fn candidate_cells(lat: f64, lon: f64, cell_size: f64) -> impl Iterator<Item = CellKey> {
    let slack = 0.5 * 10f64.powi(-COORD_PRECISION);
    let mut cells = Vec::with_capacity(4);
    for dlat in [-slack, slack] {
        for dlon in [-slack, slack] {
            let cell = CellKey::containing(&LatLon::new(lat + dlat, lon + dlon), cell_size);
            if !cells.contains(&cell) {
                cells.push(cell);
            }
        }
    }
    let exact = CellKey::containing(&LatLon::new(lat, lon), cell_size);
    if !cells.contains(&exact) {
        cells.push(exact);
    }
    cells.into_iter()
}

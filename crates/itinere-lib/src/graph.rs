//! Node deduplication and edge construction.
//!
//! Segment endpoints are merged into one node when their coordinates agree to
//! four decimals; the first-seen coordinate is kept. Each accepted segment
//! becomes one undirected, typed edge whose path points are registered in the
//! spatial index.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::feature::Feature;
use crate::geo::{path_length_km, round_to, LatLon};
use crate::spatial::SpatialIndex;

/// Position of a node in the node array.
pub type NodeId = usize;

/// Position of an edge in the edge list.
pub type EdgeIndex = usize;

/// Decimal digits used to deduplicate endpoints (about 11 m).
pub const NODE_KEY_PRECISION: i32 = 4;

/// Decimal digits kept for coordinates in the artifact.
pub const COORD_PRECISION: i32 = 5;

/// Decimal digits kept for edge lengths in the artifact.
pub const LENGTH_PRECISION: i32 = 3;

/// Category label that marks a sea lane.
pub const SEA_LANE_CATEGORY: &str = "Sea Lane";

/// Category label that marks a navigable river.
pub const RIVER_CATEGORY: &str = "River";

/// Quantised endpoint coordinate used to merge nearby endpoints into one node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeKey {
    lat: i64,
    lon: i64,
}

impl NodeKey {
    pub fn from_position(position: &LatLon) -> Self {
        let scale = 10f64.powi(NODE_KEY_PRECISION);
        Self {
            lat: (position.lat * scale).round() as i64,
            lon: (position.lon * scale).round() as i64,
        }
    }
}

impl fmt::Display for NodeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let scale = 10f64.powi(NODE_KEY_PRECISION);
        let digits = NODE_KEY_PRECISION as usize;
        write!(
            f,
            "{:.digits$},{:.digits$}",
            self.lat as f64 / scale,
            self.lon as f64 / scale
        )
    }
}

/// Graph vertex at the first-seen coordinate of its key.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Node {
    pub id: NodeId,
    pub position: LatLon,
}

/// Classification for an edge in the routing graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeKind {
    Land,
    River,
    Sea,
    Port,
}

impl EdgeKind {
    pub const ALL: [EdgeKind; 4] = [
        EdgeKind::Land,
        EdgeKind::River,
        EdgeKind::Sea,
        EdgeKind::Port,
    ];

    /// Map a feature category label onto an edge kind; unknown or missing
    /// labels are roads.
    pub fn from_category(category: Option<&str>) -> Self {
        match category {
            Some(SEA_LANE_CATEGORY) => EdgeKind::Sea,
            Some(RIVER_CATEGORY) => EdgeKind::River,
            _ => EdgeKind::Land,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            EdgeKind::Land => "land",
            EdgeKind::River => "river",
            EdgeKind::Sea => "sea",
            EdgeKind::Port => "port",
        }
    }
}

impl fmt::Display for EdgeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Edge as stored in the artifact. Semantically undirected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    pub from: NodeId,
    pub to: NodeId,
    /// Length in kilometres.
    pub length: f64,
    #[serde(rename = "type")]
    pub kind: EdgeKind,
    /// Path as latitude-first pairs.
    pub coords: Vec<[f64; 2]>,
}

/// Why a feature did not produce an edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    NotLineString,
    InvalidCoordinates,
    TooFewPoints,
    SelfLoop,
}

impl SkipReason {
    pub fn label(self) -> &'static str {
        match self {
            SkipReason::NotLineString => "not a line string",
            SkipReason::InvalidCoordinates => "invalid coordinates",
            SkipReason::TooFewPoints => "fewer than two points",
            SkipReason::SelfLoop => "self-loop",
        }
    }
}

/// Result of feeding one feature to the builder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeatureOutcome {
    Added(EdgeIndex),
    Skipped(SkipReason),
}

/// Accumulates nodes, edges and the spatial index in one pass over the input.
#[derive(Debug, Clone)]
pub struct GraphBuilder {
    nodes: Vec<Node>,
    node_ids: HashMap<NodeKey, NodeId>,
    edges: Vec<Edge>,
    spatial_index: SpatialIndex,
}

impl GraphBuilder {
    pub fn new(cell_size: f64) -> Self {
        Self {
            nodes: Vec::new(),
            node_ids: HashMap::new(),
            edges: Vec::new(),
            spatial_index: SpatialIndex::new(cell_size),
        }
    }

    /// Turn a feature into an edge, creating endpoint nodes as needed.
    pub fn add_feature(&mut self, feature: &Feature) -> FeatureOutcome {
        let path = match feature.line_path() {
            Ok(path) => path,
            Err(reason) => return FeatureOutcome::Skipped(reason),
        };
        let kind = EdgeKind::from_category(feature.category());
        self.add_segment(kind, &path, feature.recorded_length_km())
    }

    /// Add a segment from a decoded path.
    ///
    /// `recorded_length_km` wins when present; otherwise the haversine length
    /// of the path is used. Endpoint nodes are created even when the segment
    /// turns out to be a self-loop.
    pub fn add_segment(
        &mut self,
        kind: EdgeKind,
        path: &[LatLon],
        recorded_length_km: Option<f64>,
    ) -> FeatureOutcome {
        let (Some(first), Some(last)) = (path.first(), path.last()) else {
            return FeatureOutcome::Skipped(SkipReason::TooFewPoints);
        };
        if path.len() < 2 {
            return FeatureOutcome::Skipped(SkipReason::TooFewPoints);
        }

        let length = recorded_length_km.unwrap_or_else(|| path_length_km(path));
        let from = self.node_for(*first);
        let to = self.node_for(*last);
        if from == to {
            debug!(node = from, kind = %kind, "dropping self-loop segment");
            return FeatureOutcome::Skipped(SkipReason::SelfLoop);
        }

        let edge = Edge {
            from,
            to,
            length: round_to(length, LENGTH_PRECISION),
            kind,
            coords: path
                .iter()
                .map(|position| position.rounded_pair(COORD_PRECISION))
                .collect(),
        };
        FeatureOutcome::Added(self.push_edge(edge, path))
    }

    /// Append an edge and index every point of `path` under it.
    pub(crate) fn push_edge(&mut self, edge: Edge, path: &[LatLon]) -> EdgeIndex {
        let index = self.edges.len();
        self.edges.push(edge);
        self.spatial_index.insert_path(index, path);
        index
    }

    fn node_for(&mut self, position: LatLon) -> NodeId {
        let key = NodeKey::from_position(&position);
        if let Some(&id) = self.node_ids.get(&key) {
            return id;
        }
        let id = self.nodes.len();
        self.nodes.push(Node { id, position });
        self.node_ids.insert(key, id);
        id
    }

    /// Node id for a coordinate, if an endpoint with the same key exists.
    pub fn node_id_at(&self, position: &LatLon) -> Option<NodeId> {
        self.node_ids
            .get(&NodeKey::from_position(position))
            .copied()
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id)
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn spatial_index(&self) -> &SpatialIndex {
        &self.spatial_index
    }

    /// Count of edges per kind, in [`EdgeKind::ALL`] order.
    pub fn edge_counts(&self) -> [(EdgeKind, usize); 4] {
        EdgeKind::ALL.map(|kind| {
            let count = self.edges.iter().filter(|edge| edge.kind == kind).count();
            (kind, count)
        })
    }

    pub(crate) fn into_parts(self) -> (Vec<Node>, Vec<Edge>, SpatialIndex) {
        (self.nodes, self.edges, self.spatial_index)
    }
}

impl Default for GraphBuilder {
    fn default() -> Self {
        Self::new(crate::spatial::DEFAULT_CELL_SIZE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(points: &[(f64, f64)]) -> Vec<LatLon> {
        points
            .iter()
            .map(|&(lat, lon)| LatLon::new(lat, lon))
            .collect()
    }

    #[test]
    fn categories_map_to_edge_kinds() {
        assert_eq!(EdgeKind::from_category(Some("Sea Lane")), EdgeKind::Sea);
        assert_eq!(EdgeKind::from_category(Some("River")), EdgeKind::River);
        assert_eq!(EdgeKind::from_category(Some("Road")), EdgeKind::Land);
        assert_eq!(EdgeKind::from_category(Some("sea lane")), EdgeKind::Land);
        assert_eq!(EdgeKind::from_category(None), EdgeKind::Land);
    }

    #[test]
    fn node_key_rounds_to_four_decimals() {
        let a = NodeKey::from_position(&LatLon::new(41.893_31, 12.482_94));
        let b = NodeKey::from_position(&LatLon::new(41.893_34, 12.482_86));
        assert_eq!(a, b);
        assert_eq!(a.to_string(), "41.8933,12.4829");
    }

    #[test]
    fn endpoints_within_precision_share_a_node() {
        let mut builder = GraphBuilder::default();
        builder.add_segment(EdgeKind::Land, &line(&[(1.0, 1.0), (2.0, 2.0)]), None);
        builder.add_segment(
            EdgeKind::Land,
            &line(&[(2.000_01, 2.000_02), (3.0, 3.0)]),
            None,
        );

        assert_eq!(builder.nodes().len(), 3);
        assert_eq!(builder.edges()[1].from, 1);
        assert_eq!(builder.node(1).map(|n| n.position), Some(LatLon::new(2.0, 2.0)));
    }

    #[test]
    fn self_loops_are_dropped_but_allocate_their_node() {
        let mut builder = GraphBuilder::default();
        let outcome = builder.add_segment(
            EdgeKind::Land,
            &line(&[(5.0, 5.0), (5.5, 5.5), (5.000_01, 5.0)]),
            None,
        );

        assert_eq!(outcome, FeatureOutcome::Skipped(SkipReason::SelfLoop));
        assert!(builder.edges().is_empty());
        assert_eq!(builder.nodes().len(), 1);
        assert!(builder.spatial_index().is_empty());
    }

    #[test]
    fn single_point_paths_are_rejected() {
        let mut builder = GraphBuilder::default();
        assert_eq!(
            builder.add_segment(EdgeKind::Sea, &line(&[(1.0, 1.0)]), None),
            FeatureOutcome::Skipped(SkipReason::TooFewPoints)
        );
        assert_eq!(
            builder.add_segment(EdgeKind::Sea, &[], None),
            FeatureOutcome::Skipped(SkipReason::TooFewPoints)
        );
        assert!(builder.nodes().is_empty());
    }

    #[test]
    fn edge_rounds_length_and_coordinates() {
        let mut builder = GraphBuilder::default();
        builder.add_segment(
            EdgeKind::River,
            &line(&[(41.123_456_7, 12.765_432_1), (41.2, 12.8)]),
            Some(10.123_456),
        );

        let edge = &builder.edges()[0];
        assert_eq!(edge.length, 10.123);
        assert_eq!(edge.coords[0], [41.12346, 12.76543]);
        assert_eq!(edge.kind, EdgeKind::River);
    }

    #[test]
    fn missing_length_is_measured_from_the_path() {
        let mut builder = GraphBuilder::default();
        builder.add_segment(EdgeKind::Land, &line(&[(0.0, 0.0), (1.0, 0.0)]), None);
        assert_eq!(builder.edges()[0].length, 111.195);
    }

    #[test]
    fn every_path_point_is_indexed() {
        let mut builder = GraphBuilder::default();
        builder.add_segment(
            EdgeKind::Land,
            &line(&[(0.1, 0.1), (0.6, 0.1), (0.6, 0.6)]),
            None,
        );

        let cells: Vec<String> = builder
            .spatial_index()
            .cells()
            .keys()
            .map(ToString::to_string)
            .collect();
        assert_eq!(cells, vec!["0,0", "2,0", "2,2"]);
    }
}

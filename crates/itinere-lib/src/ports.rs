//! Synthetic port edges between the sea-lane and land networks.
//!
//! Sea lanes rarely end exactly on a road endpoint, so without help the two
//! networks are disconnected. Every node touched only by sea edges is linked
//! to the nearest node touched by any non-sea edge, provided that node lies
//! strictly closer than the search radius. Nodes with no such neighbour stay
//! unbridged.
//!
//! The nearest-neighbour search is a linear scan over all land-touching nodes,
//! so the stage costs `O(sea_only * land)`. That is fine for the itiner-e
//! dataset; a much larger network would want to consult nearby grid cells
//! first.

use std::collections::BTreeSet;

use serde::Serialize;
use tracing::{debug, info};

use crate::geo::{round_to, LatLon};
use crate::graph::{Edge, EdgeKind, GraphBuilder, NodeId, COORD_PRECISION, LENGTH_PRECISION};

/// Maximum distance between a sea endpoint and the land node it is bridged to.
pub const PORT_SEARCH_RADIUS_KM: f64 = 20.0;

/// Tally of one bridging pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PortReport {
    /// Nodes that only appear on sea edges.
    pub sea_only_nodes: usize,
    /// Port edges appended to the graph.
    pub ports_added: usize,
    /// Sea-only nodes with no land node inside the radius.
    pub unbridged: usize,
}

/// Node ids split by the kinds of edge that touch them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NodeClasses {
    pub sea: BTreeSet<NodeId>,
    pub land: BTreeSet<NodeId>,
}

impl NodeClasses {
    /// Classify the endpoints of `edges`; a node can be in both sets.
    pub fn from_edges(edges: &[Edge]) -> Self {
        let mut classes = Self::default();
        for edge in edges {
            let set = if edge.kind == EdgeKind::Sea {
                &mut classes.sea
            } else {
                &mut classes.land
            };
            set.insert(edge.from);
            set.insert(edge.to);
        }
        classes
    }

    /// Nodes touched by sea edges and nothing else, in ascending id order.
    pub fn sea_only(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.sea.difference(&self.land).copied()
    }
}

/// Closest candidate strictly within `radius_km` of `origin`.
///
/// Ties keep the earliest candidate.
pub fn nearest_within<I>(origin: &LatLon, candidates: I, radius_km: f64) -> Option<(NodeId, f64)>
where
    I: IntoIterator<Item = (NodeId, LatLon)>,
{
    let mut best: Option<(NodeId, f64)> = None;
    let mut best_distance = radius_km;
    for (id, position) in candidates {
        let distance = origin.distance_to(&position);
        if distance < best_distance {
            best_distance = distance;
            best = Some((id, distance));
        }
    }
    best
}

/// Append a port edge for every sea-only node that has a land node in range.
pub fn bridge_sea_ports(builder: &mut GraphBuilder, radius_km: f64) -> PortReport {
    let classes = NodeClasses::from_edges(builder.edges());
    let land: Vec<(NodeId, LatLon)> = classes
        .land
        .iter()
        .filter_map(|&id| builder.node(id).map(|node| (id, node.position)))
        .collect();

    let mut report = PortReport::default();
    let mut bridges = Vec::new();
    for sea_id in classes.sea_only() {
        report.sea_only_nodes += 1;
        let Some(sea_node) = builder.node(sea_id) else {
            continue;
        };
        let candidates = land.iter().copied().filter(|(id, _)| *id != sea_id);
        match nearest_within(&sea_node.position, candidates, radius_km) {
            Some((land_id, distance)) => bridges.push((sea_id, land_id, distance)),
            None => {
                report.unbridged += 1;
                debug!(node = sea_id, radius_km, "no land node in range of sea endpoint");
            }
        }
    }

    for (sea_id, land_id, distance) in bridges {
        let (Some(sea), Some(land)) = (builder.node(sea_id), builder.node(land_id)) else {
            continue;
        };
        let coords = vec![
            sea.position.rounded_pair(COORD_PRECISION),
            land.position.rounded_pair(COORD_PRECISION),
        ];
        let path: Vec<LatLon> = coords
            .iter()
            .map(|&[lat, lon]| LatLon::new(lat, lon))
            .collect();
        let edge = Edge {
            from: sea_id,
            to: land_id,
            length: round_to(distance, LENGTH_PRECISION),
            kind: EdgeKind::Port,
            coords,
        };
        builder.push_edge(edge, &path);
        report.ports_added += 1;
    }

    info!(
        sea_only_nodes = report.sea_only_nodes,
        ports_added = report.ports_added,
        unbridged = report.unbridged,
        radius_km,
        "bridged sea lanes to land network"
    );
    report
}

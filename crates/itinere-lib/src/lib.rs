//! itinere library entry points.
//!
//! This crate turns newline-delimited GeoJSON features describing ancient
//! roads, rivers and sea lanes into a compact routing graph: deduplicated
//! nodes, typed and weighted edges, synthetic port edges joining the sea and
//! land networks, and a coarse spatial grid for proximity lookups. Consumers
//! (the CLI, tests, benchmarks) should only depend on the items exported here.
//!

#![deny(warnings)]

pub mod artifact;
pub mod config;
pub mod error;
pub mod feature;
pub mod geo;
pub mod graph;
pub mod output;
pub mod pipeline;
pub mod ports;
pub mod spatial;

pub use artifact::GraphArtifact;
pub use config::{resolve_input_path, resolve_output_path, BuildConfig};
pub use error::{Error, Result};
pub use feature::{open_features, Feature, FeatureProperties, FeatureReader, Geometry};
pub use geo::{haversine_km, path_length_km, round_to, LatLon, EARTH_RADIUS_KM};
pub use graph::{
    Edge, EdgeIndex, EdgeKind, FeatureOutcome, GraphBuilder, Node, NodeId, NodeKey, SkipReason,
};
pub use output::{BuildReport, GraphSummary, KindTotals, SkippedFeatures};
pub use pipeline::{build_graph, build_graph_from_path, run_build, GraphBuild};
pub use ports::{bridge_sea_ports, nearest_within, NodeClasses, PortReport, PORT_SEARCH_RADIUS_KM};
pub use spatial::{CellKey, SpatialIndex, DEFAULT_CELL_SIZE};

//! Coarse lat/lon grid that buckets edges by the cells their paths touch.
//!
//! Each cell is addressed by `floor(lat / cell_size), floor(lon / cell_size)`
//! and serialised as the string `"<lat_cell>,<lon_cell>"`. A cell lists every
//! edge whose path has at least one point inside it, each edge at most once.
//! Cells are kept in a `BTreeMap` so iteration and serialisation order are
//! deterministic across runs.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::geo::LatLon;
use crate::graph::EdgeIndex;

/// Grid cell edge length in degrees.
pub const DEFAULT_CELL_SIZE: f64 = 0.25;

/// Integer address of a grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellKey {
    pub lat: i64,
    pub lon: i64,
}

impl CellKey {
    pub fn new(lat: i64, lon: i64) -> Self {
        Self { lat, lon }
    }

    /// Cell containing `position` for a grid of `cell_size` degrees.
    pub fn containing(position: &LatLon, cell_size: f64) -> Self {
        Self {
            lat: (position.lat / cell_size).floor() as i64,
            lon: (position.lon / cell_size).floor() as i64,
        }
    }

    /// This cell and its eight neighbours, row by row.
    pub fn neighbourhood(self) -> impl Iterator<Item = CellKey> {
        (-1..=1).flat_map(move |dlat| {
            (-1..=1).map(move |dlon| CellKey::new(self.lat + dlat, self.lon + dlon))
        })
    }
}

impl fmt::Display for CellKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.lat, self.lon)
    }
}

/// Error returned when a cell key string is not `"<int>,<int>"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseCellKeyError(String);

impl fmt::Display for ParseCellKeyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid grid cell key '{}'", self.0)
    }
}

impl std::error::Error for ParseCellKeyError {}

impl FromStr for CellKey {
    type Err = ParseCellKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ParseCellKeyError(s.to_string());
        let (lat, lon) = s.split_once(',').ok_or_else(invalid)?;
        Ok(Self {
            lat: lat.trim().parse().map_err(|_| invalid())?,
            lon: lon.trim().parse().map_err(|_| invalid())?,
        })
    }
}

impl Serialize for CellKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for CellKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(D::Error::custom)
    }
}

/// Grid index from cell to the edges passing through it.
#[derive(Debug, Clone, PartialEq)]
pub struct SpatialIndex {
    cell_size: f64,
    cells: BTreeMap<CellKey, Vec<EdgeIndex>>,
}

impl SpatialIndex {
    pub fn new(cell_size: f64) -> Self {
        Self {
            cell_size,
            cells: BTreeMap::new(),
        }
    }

    /// Rebuild an index from previously serialised cells.
    pub fn from_cells(cell_size: f64, cells: BTreeMap<CellKey, Vec<EdgeIndex>>) -> Self {
        Self { cell_size, cells }
    }

    pub fn cell_size(&self) -> f64 {
        self.cell_size
    }

    /// Number of non-empty cells.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn cell_for(&self, position: &LatLon) -> CellKey {
        CellKey::containing(position, self.cell_size)
    }

    /// Register `edge` under the cell containing `position`.
    ///
    /// A cell lists each edge at most once. Paths are indexed one edge at a
    /// time, so a repeat is usually the bucket's last entry.
    pub fn insert(&mut self, edge: EdgeIndex, position: &LatLon) {
        let cell = self.cell_for(position);
        let bucket = self.cells.entry(cell).or_default();
        if bucket.last() != Some(&edge) && !bucket.contains(&edge) {
            bucket.push(edge);
        }
    }

    /// Register every point of an edge's path.
    pub fn insert_path<'a>(
        &mut self,
        edge: EdgeIndex,
        path: impl IntoIterator<Item = &'a LatLon>,
    ) {
        for position in path {
            self.insert(edge, position);
        }
    }

    /// Edges registered in a single cell.
    pub fn edges_in(&self, cell: CellKey) -> &[EdgeIndex] {
        self.cells.get(&cell).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Edges in the cell containing `position` and its eight neighbours,
    /// sorted and without duplicates.
    pub fn edges_near(&self, position: &LatLon) -> Vec<EdgeIndex> {
        let mut edges: Vec<EdgeIndex> = self
            .cell_for(position)
            .neighbourhood()
            .flat_map(|cell| self.edges_in(cell).iter().copied())
            .collect();
        edges.sort_unstable();
        edges.dedup();
        edges
    }

    pub fn cells(&self) -> &BTreeMap<CellKey, Vec<EdgeIndex>> {
        &self.cells
    }

    pub fn into_cells(self) -> BTreeMap<CellKey, Vec<EdgeIndex>> {
        self.cells
    }
}

impl Default for SpatialIndex {
    fn default() -> Self {
        Self::new(DEFAULT_CELL_SIZE)
    }
}

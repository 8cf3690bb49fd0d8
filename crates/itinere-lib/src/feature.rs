//! Newline-delimited GeoJSON feature loading.
//!
//! Every line of the input is an independent GeoJSON `Feature`. Lines are
//! decoded lazily and in input order; blank lines are ignored and lines that
//! fail to decode are counted and skipped so one corrupt record never aborts
//! ingestion of an otherwise valid file. Only I/O failures surface as errors.

use std::fs::File;
use std::io::{BufRead, BufReader, ErrorKind, Split};
use std::path::Path;

use serde::{Deserialize, Deserializer};
use serde_json::Value;
use tracing::debug;

use crate::error::{Error, Result};
use crate::geo::LatLon;
use crate::graph::SkipReason;

/// GeoJSON geometry type accepted by the graph builder.
pub const LINE_STRING: &str = "LineString";

/// A single decoded input record.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Feature {
    #[serde(default)]
    pub geometry: Option<Geometry>,
    #[serde(default)]
    pub properties: Option<FeatureProperties>,
}

/// Raw geometry; coordinates are only interpreted for line strings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Geometry {
    #[serde(rename = "type", default, deserialize_with = "string_or_none")]
    pub kind: Option<String>,
    #[serde(default)]
    pub coordinates: Value,
}

/// Properties the builder cares about. Anything else in the bag is ignored.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct FeatureProperties {
    /// Segment category, e.g. `Road`, `River` or `Sea Lane`.
    #[serde(rename = "type", default, deserialize_with = "string_or_none")]
    pub category: Option<String>,
    /// Precomputed segment length in kilometres.
    #[serde(rename = "_lengthInKm", default)]
    pub length_km: Option<f64>,
}

impl Feature {
    /// Category label, if the record carries one.
    pub fn category(&self) -> Option<&str> {
        self.properties
            .as_ref()
            .and_then(|props| props.category.as_deref())
    }

    /// Recorded length in kilometres.
    ///
    /// An explicit `0` is treated exactly like a missing value so the caller
    /// falls back to measuring the path.
    pub fn recorded_length_km(&self) -> Option<f64> {
        self.properties
            .as_ref()
            .and_then(|props| props.length_km)
            .filter(|length| *length != 0.0)
    }

    /// Decode the path of a line-string feature.
    ///
    /// Returns the reason the feature cannot contribute an edge when the
    /// geometry is not a line string or its coordinates are unusable. The
    /// minimum point count is enforced by the builder.
    pub fn line_path(&self) -> std::result::Result<Vec<LatLon>, SkipReason> {
        let geometry = match &self.geometry {
            Some(geometry) if geometry.kind.as_deref() == Some(LINE_STRING) => geometry,
            _ => return Err(SkipReason::NotLineString),
        };

        let points = match &geometry.coordinates {
            Value::Array(points) => points,
            Value::Null => return Ok(Vec::new()),
            _ => return Err(SkipReason::InvalidCoordinates),
        };

        points
            .iter()
            .map(|point| parse_position(point).ok_or(SkipReason::InvalidCoordinates))
            .collect()
    }
}

/// Accept any JSON value, keeping it only when it is a string.
fn string_or_none<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(text) => Some(text),
        _ => None,
    })
}

/// Parse a GeoJSON position (`[lon, lat, ...]`); extra ordinates are ignored.
fn parse_position(value: &Value) -> Option<LatLon> {
    let pair = value.as_array()?;
    let lon = pair.first()?.as_f64()?;
    let lat = pair.get(1)?.as_f64()?;
    Some(LatLon::from_lon_lat([lon, lat]))
}

/// Lazy iterator over the features of a newline-delimited source.
///
/// Yields `Err` only for I/O failures; decoding failures are tallied in
/// [`FeatureReader::malformed_lines`].
pub struct FeatureReader<R> {
    lines: Split<R>,
    line_number: usize,
    malformed: usize,
}

impl<R: BufRead> FeatureReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            lines: reader.split(b'\n'),
            line_number: 0,
            malformed: 0,
        }
    }

    /// Number of non-blank lines skipped because they failed to decode.
    pub fn malformed_lines(&self) -> usize {
        self.malformed
    }

    /// Number of lines consumed so far, blank ones included.
    pub fn lines_read(&self) -> usize {
        self.line_number
    }
}

impl<R: BufRead> Iterator for FeatureReader<R> {
    type Item = Result<Feature>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let line = match self.lines.next()? {
                Ok(line) => line,
                Err(error) => return Some(Err(error.into())),
            };
            self.line_number += 1;

            let record = line.trim_ascii();
            if record.is_empty() {
                continue;
            }

            match serde_json::from_slice::<Feature>(record) {
                Ok(feature) => return Some(Ok(feature)),
                Err(error) => {
                    self.malformed += 1;
                    debug!(
                        line = self.line_number,
                        %error,
                        "skipping malformed feature record"
                    );
                }
            }
        }
    }
}

/// Open a newline-delimited feature file for lazy reading.
pub fn open_features(path: &Path) -> Result<FeatureReader<BufReader<File>>> {
    let file = File::open(path).map_err(|error| match error.kind() {
        ErrorKind::NotFound => Error::InputNotFound {
            path: path.to_path_buf(),
        },
        _ => Error::Io(error),
    })?;
    debug!(path = %path.display(), "reading features");
    Ok(FeatureReader::new(BufReader::new(file)))
}

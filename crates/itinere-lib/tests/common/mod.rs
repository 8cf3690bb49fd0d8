//! Common test utilities and fixture helpers.
//!
//! Integration tests build graphs either from the checked-in
//! `docs/fixtures/sample_network.ndjson` or from synthetic newline-delimited
//! features assembled with [`line_feature`].

use std::io::Cursor;
use std::path::PathBuf;

use itinere_lib::EARTH_RADIUS_KM;
use serde_json::json;

/// Kilometres spanned by one degree of latitude on the haversine sphere.
#[allow(dead_code)]
pub const KM_PER_DEGREE: f64 = EARTH_RADIUS_KM * std::f64::consts::PI / 180.0;

/// Path to fixtures directory used by tests.
#[allow(dead_code)]
pub fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../docs/fixtures")
}

#[allow(dead_code)]
pub fn sample_network_path() -> PathBuf {
    fixtures_dir().join("sample_network.ndjson")
}

/// One GeoJSON line-string feature; `points` are `[lon, lat]` pairs.
#[allow(dead_code)]
pub fn line_feature(category: &str, points: &[[f64; 2]], length_km: Option<f64>) -> String {
    let mut properties = json!({ "type": category });
    if let Some(length) = length_km {
        properties["_lengthInKm"] = json!(length);
    }
    json!({
        "type": "Feature",
        "geometry": { "type": "LineString", "coordinates": points },
        "properties": properties,
    })
    .to_string()
}

/// Join feature lines into an in-memory newline-delimited source.
#[allow(dead_code)]
pub fn ndjson(lines: &[String]) -> Cursor<Vec<u8>> {
    Cursor::new(lines.join("\n").into_bytes())
}

//! Spherical geometry helpers shared by the graph builder and the port bridger.

use serde::{Deserialize, Serialize};

/// Mean Earth radius used by the haversine formula, in kilometres.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Geographic position in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLon {
    pub lat: f64,
    pub lon: f64,
}

impl LatLon {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Build a position from a GeoJSON `[longitude, latitude]` pair.
    pub fn from_lon_lat(pair: [f64; 2]) -> Self {
        Self {
            lat: pair[1],
            lon: pair[0],
        }
    }

    /// Great-circle distance to another position in kilometres.
    pub fn distance_to(&self, other: &Self) -> f64 {
        haversine_km(self.lat, self.lon, other.lat, other.lon)
    }

    /// Latitude-first pair with both components rounded to `decimals`.
    pub fn rounded_pair(&self, decimals: i32) -> [f64; 2] {
        [round_to(self.lat, decimals), round_to(self.lon, decimals)]
    }
}

/// Haversine great-circle distance between two points on a sphere of radius
/// [`EARTH_RADIUS_KM`].
pub fn haversine_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let lat1_rad = lat1.to_radians();
    let lat2_rad = lat2.to_radians();
    let dlat = (lat2 - lat1).to_radians();
    let dlon = (lon2 - lon1).to_radians();

    let a = (dlat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (dlon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
    EARTH_RADIUS_KM * c
}

/// Sum of haversine distances between consecutive points.
pub fn path_length_km(path: &[LatLon]) -> f64 {
    path.windows(2)
        .map(|pair| pair[0].distance_to(&pair[1]))
        .sum()
}

/// Round `value` to a fixed number of decimal digits, half away from zero.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

//! Conversions between geographic longitude/latitude (EPSG:4326) and the
//! spherical web mercator map projection (EPSG:3857).

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::geometry::{Coordinate, Geometry};

/// Earth radius used by EPSG:3857.
pub const MERCATOR_RADIUS: f64 = 6_378_137.0;

/// Latitude limit of the square mercator world.
pub const MAX_LATITUDE: f64 = 85.051_128_779_806_59;

/// A geographic position in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct LonLat {
    pub lon: f64,
    pub lat: f64,
}

impl LonLat {
    pub fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }

    /// Unprojects a map coordinate.
    pub fn from_map(c: Coordinate) -> Self {
        let (lon, lat) = to_lon_lat(c);
        Self { lon, lat }
    }

    /// Projects to map units.
    pub fn to_map(self) -> Coordinate {
        from_lon_lat(self.lon, self.lat)
    }
}

impl fmt::Display for LonLat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.4}, {:.4}", self.lon, self.lat)
    }
}

/// Projects longitude/latitude degrees to map meters.
pub fn from_lon_lat(lon: f64, lat: f64) -> Coordinate {
    let lat = lat.clamp(-MAX_LATITUDE, MAX_LATITUDE);
    let x = MERCATOR_RADIUS * lon.to_radians();
    let y = MERCATOR_RADIUS * (std::f64::consts::FRAC_PI_4 + lat.to_radians() / 2.0).tan().ln();
    Coordinate::new(x, y)
}

/// Unprojects map meters to `(lon, lat)` degrees.
pub fn to_lon_lat(c: Coordinate) -> (f64, f64) {
    let lon = (c.x / MERCATOR_RADIUS).to_degrees();
    let lat =
        (2.0 * (c.y / MERCATOR_RADIUS).exp().atan() - std::f64::consts::FRAC_PI_2).to_degrees();
    (lon, lat)
}

/// Reprojects a map-unit geometry into lon/lat degrees (x = lon, y = lat).
pub fn geometry_to_lon_lat(geometry: &Geometry) -> Geometry {
    geometry.map_coordinates(|c| {
        let (lon, lat) = to_lon_lat(c);
        Coordinate::new(lon, lat)
    })
}

/// Reprojects a lon/lat geometry (x = lon, y = lat) into map units.
pub fn geometry_from_lon_lat(geometry: &Geometry) -> Geometry {
    geometry.map_coordinates(|c| from_lon_lat(c.x, c.y))
}

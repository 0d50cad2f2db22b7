//! Geometry algorithms used by the measure tools and buffer analysis.
//!
//! The viewer talks to a [`GeometryService`]; [`GeodesicEngine`] is the
//! in-process implementation. Inputs and outputs are in longitude/latitude.

pub mod buffer;
pub mod geodesy;

use mapscope_core::GeometryError;

use crate::geometry::Geometry;

pub use buffer::buffer_geometry;
pub use geodesy::{geodesic_area, geodesic_length, haversine, path_length, EARTH_RADIUS};

/// Length, area and buffer computations on lon/lat geometries.
pub trait GeometryService: Send + Sync {
    /// Geodesic length in meters.
    fn length(&self, geometry: &Geometry) -> f64;

    /// Geodesic area in square meters.
    fn area(&self, geometry: &Geometry) -> f64;

    /// Polygon covering every position within `meters` of the geometry.
    fn buffer(&self, geometry: &Geometry, meters: f64) -> Result<Geometry, GeometryError>;
}

/// Spherical measurements and local-plane buffering.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeodesicEngine {
    /// Sides of the polygon a point buffer becomes.
    pub circle_segments: usize,
}

impl GeodesicEngine {
    pub fn new() -> Self {
        Self { circle_segments: 64 }
    }
}

impl Default for GeodesicEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl GeometryService for GeodesicEngine {
    fn length(&self, geometry: &Geometry) -> f64 {
        geodesic_length(geometry)
    }

    fn area(&self, geometry: &Geometry) -> f64 {
        geodesic_area(geometry)
    }

    fn buffer(&self, geometry: &Geometry, meters: f64) -> Result<Geometry, GeometryError> {
        buffer_geometry(geometry, meters, self.circle_segments)
    }
}

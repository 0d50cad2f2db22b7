//! Route analysis output.

use mapscope_core::units::{route_distance_km, route_duration_minutes};
use serde::{Deserialize, Serialize};

use crate::geometry::{Coordinate, Geometry};
use crate::projection::{geometry_from_lon_lat, LonLat};
use crate::tools::ModeTicket;

/// Spacing of direction arrows along a drawn route, in map units.
pub const ARROW_INTERVAL: f64 = 1500.0;

/// Ordered lon/lat points to route through.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteRequest {
    pub points: Vec<LonLat>,
}

/// Successful answer of a routing service.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteResponse {
    /// Route line in lon/lat.
    pub geometry: Geometry,
    /// Meters.
    pub distance_m: f64,
    /// Seconds.
    pub duration_s: f64,
}

/// A route applied to the map.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteOutput {
    /// Route line in map units.
    pub geometry: Geometry,
    /// Kilometers, two decimals.
    pub distance_km: f64,
    /// Whole minutes, rounded up.
    pub duration_min: u64,
}

impl RouteOutput {
    pub fn from_response(response: &RouteResponse) -> Self {
        Self {
            geometry: geometry_from_lon_lat(&response.geometry),
            distance_km: route_distance_km(response.distance_m),
            duration_min: route_duration_minutes(response.duration_s),
        }
    }

    /// Direction arrows every [`ARROW_INTERVAL`] along the route.
    pub fn arrows(&self) -> Vec<RouteArrow> {
        match &self.geometry {
            Geometry::LineString(path) => route_arrows(path, ARROW_INTERVAL),
            Geometry::MultiLineString(paths) => paths
                .iter()
                .flat_map(|p| route_arrows(p, ARROW_INTERVAL))
                .collect(),
            _ => Vec::new(),
        }
    }
}

/// A direction marker on the route line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RouteArrow {
    pub position: Coordinate,
    /// Direction of travel, radians counter-clockwise from east.
    pub heading: f64,
}

/// Places a marker every `interval` map units along the path, starting one
/// interval from its start. The path end itself never gets one.
pub fn route_arrows(path: &[Coordinate], interval: f64) -> Vec<RouteArrow> {
    let mut arrows = Vec::new();
    if interval <= 0.0 {
        return arrows;
    }
    let mut next = interval;
    let mut walked = 0.0;
    for w in path.windows(2) {
        let (a, b) = (w[0], w[1]);
        let len = a.distance_to(&b);
        if len == 0.0 {
            continue;
        }
        let heading = (b.y - a.y).atan2(b.x - a.x);
        while next < walked + len {
            let t = (next - walked) / len;
            arrows.push(RouteArrow {
                position: Coordinate::new(a.x + (b.x - a.x) * t, a.y + (b.y - a.y) * t),
                heading,
            });
            next += interval;
        }
        walked += len;
    }
    arrows
}

/// A route request waiting for its response.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingRoute {
    pub ticket: ModeTicket,
    pub request: RouteRequest,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_units() {
        let response = RouteResponse {
            geometry: Geometry::LineString(vec![
                Coordinate::new(116.0, 40.0),
                Coordinate::new(116.1, 40.0),
            ]),
            distance_m: 12_340.0,
            duration_s: 601.0,
        };
        let output = RouteOutput::from_response(&response);
        assert_eq!(output.distance_km, 12.34);
        assert_eq!(output.duration_min, 11);
        let Geometry::LineString(path) = &output.geometry else {
            panic!("route should stay a line");
        };
        assert!(path[0].x > 12_000_000.0);
    }

    #[test]
    fn test_arrows_spacing() {
        let path = [
            Coordinate::new(0.0, 0.0),
            Coordinate::new(2000.0, 0.0),
            Coordinate::new(2000.0, 2000.0),
        ];
        let arrows = route_arrows(&path, 1500.0);
        assert_eq!(arrows.len(), 2);
        assert_eq!(arrows[0].position, Coordinate::new(1500.0, 0.0));
        assert_eq!(arrows[0].heading, 0.0);
        assert_eq!(arrows[1].position, Coordinate::new(2000.0, 1000.0));
        assert!((arrows[1].heading - std::f64::consts::FRAC_PI_2).abs() < 1e-12);

        assert!(route_arrows(&path[..2], 5000.0).is_empty());
    }
}

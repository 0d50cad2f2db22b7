//! Geometry model
//!
//! Simple-feature geometries with GeoJSON (de)serialization. Coordinates are
//! in whatever space the owner uses: map layers hold EPSG:3857 meters, the
//! geometry collaborator receives longitude/latitude degrees.

use mapscope_core::GeometryError;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::fmt;

use crate::extent::Extent;

/// A 2D coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Coordinate {
    pub x: f64,
    pub y: f64,
}

impl Coordinate {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another coordinate.
    pub fn distance_to(&self, other: &Coordinate) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.4}, {:.4})", self.x, self.y)
    }
}

/// Simple-feature geometry.
///
/// Polygons are stored as rings, the first ring being the exterior. Rings are
/// kept closed (first == last) when parsed from GeoJSON but algorithms do not
/// rely on it.
#[derive(Debug, Clone, PartialEq)]
pub enum Geometry {
    Point(Coordinate),
    MultiPoint(Vec<Coordinate>),
    LineString(Vec<Coordinate>),
    MultiLineString(Vec<Vec<Coordinate>>),
    Polygon(Vec<Vec<Coordinate>>),
    MultiPolygon(Vec<Vec<Vec<Coordinate>>>),
}

impl Geometry {
    /// GeoJSON type name.
    pub fn geometry_type(&self) -> &'static str {
        match self {
            Geometry::Point(_) => "Point",
            Geometry::MultiPoint(_) => "MultiPoint",
            Geometry::LineString(_) => "LineString",
            Geometry::MultiLineString(_) => "MultiLineString",
            Geometry::Polygon(_) => "Polygon",
            Geometry::MultiPolygon(_) => "MultiPolygon",
        }
    }

    /// Iterates every vertex of the geometry.
    pub fn coordinates(&self) -> Box<dyn Iterator<Item = &Coordinate> + '_> {
        match self {
            Geometry::Point(c) => Box::new(std::iter::once(c)),
            Geometry::MultiPoint(points) | Geometry::LineString(points) => Box::new(points.iter()),
            Geometry::MultiLineString(lines) | Geometry::Polygon(lines) => {
                Box::new(lines.iter().flatten())
            }
            Geometry::MultiPolygon(polygons) => Box::new(polygons.iter().flatten().flatten()),
        }
    }

    /// True when the geometry has no vertices.
    pub fn is_empty(&self) -> bool {
        self.coordinates().next().is_none()
    }

    /// Bounding extent; empty for a geometry without vertices.
    pub fn extent(&self) -> Extent {
        Extent::from_coordinates(self.coordinates())
    }

    /// Returns a copy with every vertex transformed by `f`.
    pub fn map_coordinates<F>(&self, f: F) -> Geometry
    where
        F: Fn(Coordinate) -> Coordinate,
    {
        let map_ring = |ring: &Vec<Coordinate>| ring.iter().map(|c| f(*c)).collect::<Vec<_>>();
        match self {
            Geometry::Point(c) => Geometry::Point(f(*c)),
            Geometry::MultiPoint(points) => Geometry::MultiPoint(map_ring(points)),
            Geometry::LineString(points) => Geometry::LineString(map_ring(points)),
            Geometry::MultiLineString(lines) => {
                Geometry::MultiLineString(lines.iter().map(&map_ring).collect())
            }
            Geometry::Polygon(rings) => Geometry::Polygon(rings.iter().map(&map_ring).collect()),
            Geometry::MultiPolygon(polygons) => Geometry::MultiPolygon(
                polygons
                    .iter()
                    .map(|rings| rings.iter().map(&map_ring).collect())
                    .collect(),
            ),
        }
    }

    /// Hit test at map resolution.
    ///
    /// Points and lines are hit within `tolerance` map units; polygons are hit
    /// when the point lies inside the exterior ring and outside every hole, or
    /// within `tolerance` of any ring.
    pub fn contains_point(&self, p: Coordinate, tolerance: f64) -> bool {
        match self {
            Geometry::Point(c) => c.distance_to(&p) <= tolerance,
            Geometry::MultiPoint(points) => points.iter().any(|c| c.distance_to(&p) <= tolerance),
            Geometry::LineString(line) => distance_to_path(line, p) <= tolerance,
            Geometry::MultiLineString(lines) => {
                lines.iter().any(|line| distance_to_path(line, p) <= tolerance)
            }
            Geometry::Polygon(rings) => polygon_hit(rings, p, tolerance),
            Geometry::MultiPolygon(polygons) => {
                polygons.iter().any(|rings| polygon_hit(rings, p, tolerance))
            }
        }
    }

    /// Parses a GeoJSON geometry object.
    pub fn from_geojson(value: &Value) -> Result<Geometry, GeometryError> {
        let geometry_type = value
            .get("type")
            .and_then(Value::as_str)
            .ok_or_else(|| GeometryError::Invalid {
                reason: "missing geometry type".to_string(),
            })?;
        let coords = value.get("coordinates").ok_or_else(|| GeometryError::Invalid {
            reason: format!("{} without coordinates", geometry_type),
        })?;

        let geometry = match geometry_type {
            "Point" => Geometry::Point(parse_position(coords)?),
            "MultiPoint" => Geometry::MultiPoint(parse_positions(coords)?),
            "LineString" => Geometry::LineString(parse_positions(coords)?),
            "MultiLineString" => Geometry::MultiLineString(parse_rings(coords)?),
            "Polygon" => Geometry::Polygon(parse_rings(coords)?),
            "MultiPolygon" => Geometry::MultiPolygon(
                as_array(coords)?
                    .iter()
                    .map(parse_rings)
                    .collect::<Result<Vec<_>, _>>()?,
            ),
            other => {
                return Err(GeometryError::Unsupported {
                    geometry_type: other.to_string(),
                })
            }
        };
        Ok(geometry)
    }

    /// Serializes to a GeoJSON geometry object.
    pub fn to_geojson(&self) -> Value {
        fn pos(c: &Coordinate) -> Value {
            json!([c.x, c.y])
        }
        fn ring(r: &[Coordinate]) -> Value {
            Value::Array(r.iter().map(pos).collect())
        }
        fn rings(rs: &[Vec<Coordinate>]) -> Value {
            Value::Array(rs.iter().map(|r| ring(r)).collect())
        }

        let coordinates = match self {
            Geometry::Point(c) => pos(c),
            Geometry::MultiPoint(points) | Geometry::LineString(points) => ring(points),
            Geometry::MultiLineString(lines) | Geometry::Polygon(lines) => rings(lines),
            Geometry::MultiPolygon(polygons) => {
                Value::Array(polygons.iter().map(|p| rings(p)).collect())
            }
        };
        json!({
            "type": self.geometry_type(),
            "coordinates": coordinates,
        })
    }
}

fn as_array(value: &Value) -> Result<&Vec<Value>, GeometryError> {
    value.as_array().ok_or_else(|| GeometryError::Invalid {
        reason: "coordinates must be an array".to_string(),
    })
}

fn parse_position(value: &Value) -> Result<Coordinate, GeometryError> {
    let items = as_array(value)?;
    match (
        items.first().and_then(Value::as_f64),
        items.get(1).and_then(Value::as_f64),
    ) {
        (Some(x), Some(y)) => Ok(Coordinate::new(x, y)),
        _ => Err(GeometryError::Invalid {
            reason: "position needs two numbers".to_string(),
        }),
    }
}

fn parse_positions(value: &Value) -> Result<Vec<Coordinate>, GeometryError> {
    as_array(value)?.iter().map(parse_position).collect()
}

fn parse_rings(value: &Value) -> Result<Vec<Vec<Coordinate>>, GeometryError> {
    as_array(value)?.iter().map(parse_positions).collect()
}

fn distance_to_segment(p: Coordinate, a: Coordinate, b: Coordinate) -> f64 {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    let len_sq = dx * dx + dy * dy;
    if len_sq == 0.0 {
        return p.distance_to(&a);
    }
    let t = (((p.x - a.x) * dx + (p.y - a.y) * dy) / len_sq).clamp(0.0, 1.0);
    p.distance_to(&Coordinate::new(a.x + t * dx, a.y + t * dy))
}

fn distance_to_path(path: &[Coordinate], p: Coordinate) -> f64 {
    match path {
        [] => f64::INFINITY,
        [single] => single.distance_to(&p),
        _ => path
            .windows(2)
            .map(|w| distance_to_segment(p, w[0], w[1]))
            .fold(f64::INFINITY, f64::min),
    }
}

/// Even-odd ray casting.
fn ring_contains(ring: &[Coordinate], p: Coordinate) -> bool {
    let mut inside = false;
    let n = ring.len();
    if n < 3 {
        return false;
    }
    let mut j = n - 1;
    for i in 0..n {
        let (a, b) = (ring[i], ring[j]);
        if (a.y > p.y) != (b.y > p.y) && p.x < (b.x - a.x) * (p.y - a.y) / (b.y - a.y) + a.x {
            inside = !inside;
        }
        j = i;
    }
    inside
}

fn polygon_hit(rings: &[Vec<Coordinate>], p: Coordinate, tolerance: f64) -> bool {
    let Some((exterior, holes)) = rings.split_first() else {
        return false;
    };
    if rings.iter().any(|ring| distance_to_path(ring, p) <= tolerance) {
        return true;
    }
    ring_contains(exterior, p) && !holes.iter().any(|hole| ring_contains(hole, p))
}

//! Metric buffers around lon/lat geometries.
//!
//! The geometry is projected into a local equirectangular plane in meters
//! centered on its own latitude, buffered there, then unprojected:
//! - points become regular polygons (`circle_segments` sides)
//! - polygon exteriors are offset outward with `cavalier_contours`
//! - every line segment becomes a capsule (two half circles joined by the
//!   segment's offsets); capsules of one line are returned as separate
//!   polygons, not dissolved

use cavalier_contours::polyline::{PlineSource, PlineSourceMut, PlineVertex, Polyline};
use mapscope_core::GeometryError;
use std::f64::consts::{PI, TAU};

use crate::geometry::{Coordinate, Geometry};

use super::geodesy::EARTH_RADIUS;

/// Maximum sweep of one flattened arc step.
const ARC_STEP: f64 = PI / 32.0;

/// Vertices closer than this (meters) are merged before offsetting.
const DUPLICATE_TOLERANCE: f64 = 0.01;

type Ring = Vec<Coordinate>;

/// Local metric plane around a reference latitude.
#[derive(Debug, Clone, Copy)]
struct LocalPlane {
    cos_lat: f64,
}

impl LocalPlane {
    fn around(geometry: &Geometry) -> Self {
        let lat = geometry.extent().center().map_or(0.0, |c| c.y);
        Self {
            cos_lat: lat.to_radians().cos().max(1e-6),
        }
    }

    fn forward(&self, c: Coordinate) -> Coordinate {
        Coordinate::new(
            EARTH_RADIUS * c.x.to_radians() * self.cos_lat,
            EARTH_RADIUS * c.y.to_radians(),
        )
    }

    fn inverse(&self, c: Coordinate) -> Coordinate {
        Coordinate::new(
            (c.x / (EARTH_RADIUS * self.cos_lat)).to_degrees(),
            (c.y / EARTH_RADIUS).to_degrees(),
        )
    }
}

/// Buffers a lon/lat geometry by `meters`.
///
/// Returns a `Polygon` when the buffer has one part, a `MultiPolygon`
/// otherwise.
pub fn buffer_geometry(
    geometry: &Geometry,
    meters: f64,
    circle_segments: usize,
) -> Result<Geometry, GeometryError> {
    if !(meters > 0.0) {
        return Err(GeometryError::BufferFailed {
            reason: format!("distance must be positive, got {}", meters),
        });
    }
    if geometry.is_empty() {
        return Err(GeometryError::Empty);
    }

    let plane = LocalPlane::around(geometry);
    let local = geometry.map_coordinates(|c| plane.forward(c));

    let mut polygons: Vec<Vec<Ring>> = Vec::new();
    match &local {
        Geometry::Point(c) => polygons.push(vec![circle_ring(*c, meters, circle_segments)]),
        Geometry::MultiPoint(points) => {
            polygons.extend(points.iter().map(|c| vec![circle_ring(*c, meters, circle_segments)]))
        }
        Geometry::LineString(path) => polygons.extend(path_capsules(path, meters, circle_segments)),
        Geometry::MultiLineString(paths) => {
            for path in paths {
                polygons.extend(path_capsules(path, meters, circle_segments));
            }
        }
        Geometry::Polygon(rings) => polygons.push(vec![offset_exterior(rings, meters)?]),
        Geometry::MultiPolygon(parts) => {
            for rings in parts {
                polygons.push(vec![offset_exterior(rings, meters)?]);
            }
        }
    }

    if polygons.is_empty() {
        return Err(GeometryError::BufferFailed {
            reason: format!("{} produced no area", geometry.geometry_type()),
        });
    }

    let buffered = if polygons.len() == 1 {
        Geometry::Polygon(polygons.remove(0))
    } else {
        Geometry::MultiPolygon(polygons)
    };
    Ok(buffered.map_coordinates(|c| plane.inverse(c)))
}

fn circle_ring(center: Coordinate, radius: f64, segments: usize) -> Ring {
    let segments = segments.max(8);
    let mut ring: Ring = (0..segments)
        .map(|i| {
            let angle = TAU * i as f64 / segments as f64;
            Coordinate::new(center.x + radius * angle.cos(), center.y + radius * angle.sin())
        })
        .collect();
    ring.push(ring[0]);
    ring
}

/// One capsule per segment; a single-vertex path buffers as a circle.
fn path_capsules(path: &[Coordinate], d: f64, segments: usize) -> Vec<Vec<Ring>> {
    if let [single] = path {
        return vec![vec![circle_ring(*single, d, segments)]];
    }
    path.windows(2)
        .filter_map(|w| {
            let (a, b) = (w[0], w[1]);
            let len = a.distance_to(&b);
            if len < DUPLICATE_TOLERANCE {
                return None;
            }
            // Left normal scaled to the buffer distance.
            let nx = -(b.y - a.y) / len * d;
            let ny = (b.x - a.x) / len * d;

            // Clockwise: forward along the left side, half circle around b,
            // back along the right side, half circle around a.
            let mut capsule = Polyline::new();
            capsule.add_vertex(PlineVertex::new(a.x + nx, a.y + ny, 0.0));
            capsule.add_vertex(PlineVertex::new(b.x + nx, b.y + ny, -1.0));
            capsule.add_vertex(PlineVertex::new(b.x - nx, b.y - ny, 0.0));
            capsule.add_vertex(PlineVertex::new(a.x - nx, a.y - ny, -1.0));
            capsule.set_is_closed(true);
            Some(vec![close(flatten(&capsule))])
        })
        .collect()
}

/// Offsets the exterior ring outward. Holes are not carried over.
fn offset_exterior(rings: &[Ring], d: f64) -> Result<Ring, GeometryError> {
    let exterior = rings.first().ok_or(GeometryError::Empty)?;
    let polyline = prepare_ring(exterior)?;

    // Clockwise input: a positive offset grows the ring.
    let offsets = polyline.parallel_offset(d);
    offsets
        .iter()
        .map(flatten)
        .filter(|ring| ring.len() >= 3)
        .max_by(|a, b| planar_area(a).abs().total_cmp(&planar_area(b).abs()))
        .map(close)
        .ok_or_else(|| GeometryError::BufferFailed {
            reason: "offset produced no ring".to_string(),
        })
}

/// Removes duplicate and closing vertices and orients the ring clockwise.
fn prepare_ring(ring: &[Coordinate]) -> Result<Polyline<f64>, GeometryError> {
    let mut clean: Ring = Vec::with_capacity(ring.len());
    for &c in ring {
        if clean
            .last()
            .is_none_or(|last| last.distance_to(&c) > DUPLICATE_TOLERANCE)
        {
            clean.push(c);
        }
    }
    if clean.len() > 1
        && clean[0].distance_to(&clean[clean.len() - 1]) < DUPLICATE_TOLERANCE
    {
        clean.pop();
    }
    if clean.len() < 3 {
        return Err(GeometryError::Invalid {
            reason: format!("ring has {} distinct vertices", clean.len()),
        });
    }

    if planar_area(&clean) > 0.0 {
        clean.reverse();
    }

    let mut polyline = Polyline::new();
    for c in clean {
        polyline.add_vertex(PlineVertex::new(c.x, c.y, 0.0));
    }
    polyline.set_is_closed(true);
    Ok(polyline)
}

/// Shoelace area, positive for counter-clockwise rings.
fn planar_area(ring: &[Coordinate]) -> f64 {
    let n = ring.len();
    (0..n)
        .map(|i| {
            let (p1, p2) = (ring[i], ring[(i + 1) % n]);
            p1.x * p2.y - p2.x * p1.y
        })
        .sum::<f64>()
        / 2.0
}

/// Converts a polyline with arc segments (non-zero bulge) into straight
/// segments.
fn flatten(polyline: &Polyline<f64>) -> Ring {
    let vertices = &polyline.vertex_data;
    let n = vertices.len();
    let mut out = Vec::with_capacity(n);
    for i in 0..n {
        let v1 = vertices[i];
        out.push(Coordinate::new(v1.x, v1.y));
        if i + 1 == n && !polyline.is_closed() {
            break;
        }
        let v2 = vertices[(i + 1) % n];
        if v1.bulge.abs() > 1e-12 {
            push_arc(&mut out, v1, v2);
        }
    }
    out
}

/// Pushes the interior points of the arc from `v1` to `v2` with `v1.bulge`.
fn push_arc(out: &mut Ring, v1: PlineVertex<f64>, v2: PlineVertex<f64>) {
    let bulge = v1.bulge;
    let (cx, cy) = (v2.x - v1.x, v2.y - v1.y);
    let chord = cx.hypot(cy);
    if chord < 1e-12 {
        return;
    }
    let radius = chord * (bulge * bulge + 1.0) / (4.0 * bulge.abs());
    let sagitta = bulge.abs() * chord / 2.0;
    let m = radius - sagitta;
    let (mut ox, mut oy) = (-m * cy / chord, m * cx / chord);
    if bulge < 0.0 {
        ox = -ox;
        oy = -oy;
    }
    let center = Coordinate::new(v1.x + cx / 2.0 + ox, v1.y + cy / 2.0 + oy);

    let start = (v1.y - center.y).atan2(v1.x - center.x);
    let sweep = 4.0 * bulge.atan();
    let steps = ((sweep.abs() / ARC_STEP).ceil() as usize).max(1);
    for k in 1..steps {
        let angle = start + sweep * k as f64 / steps as f64;
        out.push(Coordinate::new(
            center.x + radius * angle.cos(),
            center.y + radius * angle.sin(),
        ));
    }
}

fn close(mut ring: Ring) -> Ring {
    if let (Some(first), Some(last)) = (ring.first().copied(), ring.last().copied()) {
        if first != last {
            ring.push(first);
        }
    }
    ring
}

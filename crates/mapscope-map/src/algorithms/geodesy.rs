//! Geodesic length and area on a sphere.
//!
//! Coordinates are longitude/latitude degrees (x = lon, y = lat).

use crate::geometry::{Coordinate, Geometry};

/// Mean earth radius in meters.
pub const EARTH_RADIUS: f64 = 6_371_008.8;

/// Great-circle distance between two lon/lat positions (haversine).
pub fn haversine(a: Coordinate, b: Coordinate) -> f64 {
    let lat1 = a.y.to_radians();
    let lat2 = b.y.to_radians();
    let dlat = lat2 - lat1;
    let dlon = (b.x - a.x).to_radians();
    let h = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS * h.sqrt().atan2((1.0 - h).sqrt())
}

/// Length of a path in meters.
pub fn path_length(path: &[Coordinate]) -> f64 {
    path.windows(2).map(|w| haversine(w[0], w[1])).sum()
}

/// Signed spherical area of a ring in square meters.
fn ring_area(ring: &[Coordinate]) -> f64 {
    let Some(&last) = ring.last() else {
        return 0.0;
    };
    let mut area = 0.0;
    let mut prev = last;
    for &c in ring {
        area += (c.x - prev.x).to_radians()
            * (2.0 + prev.y.to_radians().sin() + c.y.to_radians().sin());
        prev = c;
    }
    area * EARTH_RADIUS * EARTH_RADIUS / 2.0
}

fn polygon_area(rings: &[Vec<Coordinate>]) -> f64 {
    let Some((exterior, holes)) = rings.split_first() else {
        return 0.0;
    };
    let holes: f64 = holes.iter().map(|h| ring_area(h).abs()).sum();
    (ring_area(exterior).abs() - holes).max(0.0)
}

/// Geodesic length in meters. Polygons measure the length of every ring;
/// points measure zero.
pub fn geodesic_length(geometry: &Geometry) -> f64 {
    match geometry {
        Geometry::Point(_) | Geometry::MultiPoint(_) => 0.0,
        Geometry::LineString(path) => path_length(path),
        Geometry::MultiLineString(paths) | Geometry::Polygon(paths) => {
            paths.iter().map(|p| path_length(p)).sum()
        }
        Geometry::MultiPolygon(polygons) => polygons
            .iter()
            .flatten()
            .map(|ring| path_length(ring))
            .sum(),
    }
}

/// Geodesic area in square meters; zero for points and lines.
pub fn geodesic_area(geometry: &Geometry) -> f64 {
    match geometry {
        Geometry::Polygon(rings) => polygon_area(rings),
        Geometry::MultiPolygon(polygons) => polygons.iter().map(|p| polygon_area(p)).sum(),
        _ => 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn c(x: f64, y: f64) -> Coordinate {
        Coordinate::new(x, y)
    }

    #[test]
    fn test_one_degree_of_latitude() {
        let d = haversine(c(0.0, 0.0), c(0.0, 1.0));
        assert!((d - 111_195.08).abs() < 0.01);
    }

    #[test]
    fn test_unit_square_area_at_equator() {
        let square = Geometry::Polygon(vec![vec![
            c(0.0, 0.0),
            c(1.0, 0.0),
            c(1.0, 1.0),
            c(0.0, 1.0),
            c(0.0, 0.0),
        ]]);
        let area = geodesic_area(&square);
        assert!((area - 12_363_718_145.18).abs() < 1.0);
        assert_eq!(geodesic_area(&Geometry::Point(c(0.0, 0.0))), 0.0);
    }

    #[test]
    fn test_hole_is_subtracted() {
        let outer = vec![c(0.0, 0.0), c(2.0, 0.0), c(2.0, 2.0), c(0.0, 2.0), c(0.0, 0.0)];
        let hole = vec![c(0.5, 0.5), c(1.5, 0.5), c(1.5, 1.5), c(0.5, 1.5), c(0.5, 0.5)];
        let with_hole = geodesic_area(&Geometry::Polygon(vec![outer.clone(), hole.clone()]));
        let solid = geodesic_area(&Geometry::Polygon(vec![outer]));
        let hole_area = geodesic_area(&Geometry::Polygon(vec![hole]));
        assert!((with_hole - (solid - hole_area)).abs() < 1e-3);
    }

    #[test]
    fn test_multiline_length() {
        let lines = Geometry::MultiLineString(vec![
            vec![c(0.0, 0.0), c(0.0, 1.0)],
            vec![c(10.0, 0.0), c(10.0, 1.0)],
        ]);
        assert!((geodesic_length(&lines) - 2.0 * 111_195.08).abs() < 0.1);
    }
}

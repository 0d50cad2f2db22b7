//! Distance and area measurement tool.

use mapscope_core::units::{format_area, format_length};
use serde::{Deserialize, Serialize};

use crate::algorithms::GeometryService;
use crate::geometry::{Coordinate, Geometry};
use crate::projection::geometry_to_lon_lat;

/// What a measurement computes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MeasureKind {
    /// Geodesic length of a polyline.
    Distance,
    /// Spherical area of a polygon.
    Area,
}

/// A committed measurement shown in the measure overlay.
#[derive(Debug, Clone, PartialEq)]
pub struct MeasuredFeature {
    pub kind: MeasureKind,
    /// Geometry in map units.
    pub geometry: Geometry,
    /// Formatted value, e.g. `"1.23 km"`.
    pub label: String,
    /// Where the label is anchored.
    pub anchor: Coordinate,
}

/// In-progress measurement sketch in map units.
#[derive(Debug, Clone, PartialEq)]
pub struct MeasureSketch {
    kind: MeasureKind,
    vertices: Vec<Coordinate>,
}

impl MeasureSketch {
    pub fn new(kind: MeasureKind) -> Self {
        Self {
            kind,
            vertices: Vec::new(),
        }
    }

    pub fn kind(&self) -> MeasureKind {
        self.kind
    }

    pub fn vertices(&self) -> &[Coordinate] {
        &self.vertices
    }

    /// True once the first vertex was placed.
    pub fn is_started(&self) -> bool {
        !self.vertices.is_empty()
    }

    pub fn add_vertex(&mut self, c: Coordinate) {
        self.vertices.push(c);
    }

    /// Drops the sketch.
    pub fn cancel(&mut self) {
        self.vertices.clear();
    }

    /// Sketch geometry once it has enough vertices: two for a line, three
    /// for a polygon (returned closed).
    pub fn geometry(&self) -> Option<Geometry> {
        match self.kind {
            MeasureKind::Distance if self.vertices.len() >= 2 => {
                Some(Geometry::LineString(self.vertices.clone()))
            }
            MeasureKind::Area if self.vertices.len() >= 3 => {
                let mut ring = self.vertices.clone();
                ring.push(self.vertices[0]);
                Some(Geometry::Polygon(vec![ring]))
            }
            _ => None,
        }
    }

    /// Live label of the sketch.
    pub fn label(&self, engine: &dyn GeometryService) -> Option<String> {
        self.geometry()
            .map(|geometry| measure_label(self.kind, &geometry, engine))
    }

    /// Commits the sketch, leaving it empty. `None` when the sketch is too
    /// short to measure.
    pub fn finish(&mut self, engine: &dyn GeometryService) -> Option<MeasuredFeature> {
        let geometry = self.geometry();
        let vertices = std::mem::take(&mut self.vertices);
        let geometry = geometry?;
        let anchor = match self.kind {
            MeasureKind::Distance => vertices.last().copied(),
            MeasureKind::Area => geometry.extent().center(),
        }
        .unwrap_or_default();
        Some(MeasuredFeature {
            kind: self.kind,
            label: measure_label(self.kind, &geometry, engine),
            geometry,
            anchor,
        })
    }
}

/// Formats the geodesic length or area of a map-unit geometry.
pub fn measure_label(
    kind: MeasureKind,
    geometry: &Geometry,
    engine: &dyn GeometryService,
) -> String {
    let lon_lat = geometry_to_lon_lat(geometry);
    match kind {
        MeasureKind::Distance => format_length(engine.length(&lon_lat)),
        MeasureKind::Area => format_area(engine.area(&lon_lat)),
    }
}

/// Committed measurements.
#[derive(Debug, Clone, Default)]
pub struct MeasureOverlay {
    items: Vec<MeasuredFeature>,
}

impl MeasureOverlay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, item: MeasuredFeature) {
        self.items.push(item);
    }

    pub fn items(&self) -> &[MeasuredFeature] {
        &self.items
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithms::GeodesicEngine;
    use crate::projection::from_lon_lat;

    #[test]
    fn test_distance_needs_two_vertices() {
        let engine = GeodesicEngine::new();
        let mut sketch = MeasureSketch::new(MeasureKind::Distance);
        sketch.add_vertex(from_lon_lat(0.0, 0.0));
        assert!(sketch.label(&engine).is_none());

        sketch.add_vertex(from_lon_lat(0.0, 1.0));
        // One degree of latitude on the 6 371 008.8 m sphere.
        assert_eq!(sketch.label(&engine).as_deref(), Some("111.2 km"));

        let measured = sketch.finish(&engine).unwrap();
        assert_eq!(measured.label, "111.2 km");
        assert!(!sketch.is_started());
    }

    #[test]
    fn test_area_polygon_is_closed() {
        let mut sketch = MeasureSketch::new(MeasureKind::Area);
        for (x, y) in [(0.0, 0.0), (100.0, 0.0), (100.0, 100.0)] {
            sketch.add_vertex(Coordinate::new(x, y));
        }
        match sketch.geometry() {
            Some(Geometry::Polygon(rings)) => {
                assert_eq!(rings[0].len(), 4);
                assert_eq!(rings[0][0], rings[0][3]);
            }
            other => panic!("unexpected geometry {:?}", other),
        }
    }

    #[test]
    fn test_finish_too_short_discards() {
        let engine = GeodesicEngine::new();
        let mut sketch = MeasureSketch::new(MeasureKind::Area);
        sketch.add_vertex(Coordinate::new(0.0, 0.0));
        assert!(sketch.finish(&engine).is_none());
        assert!(!sketch.is_started());
    }
}

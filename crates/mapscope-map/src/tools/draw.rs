//! Free-hand drawing tool.

use serde::{Deserialize, Serialize};
use std::f64::consts::TAU;

use crate::feature::Feature;
use crate::geometry::{Coordinate, Geometry};

/// Number of sides of the regular polygon a drawn circle is stored as.
pub const CIRCLE_SIDES: usize = 100;

/// Shape drawn by a draw mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DrawShape {
    Point,
    Line,
    Polygon,
    Circle,
}

impl DrawShape {
    pub fn name(self) -> &'static str {
        match self {
            DrawShape::Point => "point",
            DrawShape::Line => "line",
            DrawShape::Polygon => "polygon",
            DrawShape::Circle => "circle",
        }
    }
}

/// In-progress drawing in map units.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawSketch {
    shape: DrawShape,
    vertices: Vec<Coordinate>,
}

impl DrawSketch {
    pub fn new(shape: DrawShape) -> Self {
        Self {
            shape,
            vertices: Vec::new(),
        }
    }

    pub fn shape(&self) -> DrawShape {
        self.shape
    }

    pub fn vertices(&self) -> &[Coordinate] {
        &self.vertices
    }

    pub fn is_started(&self) -> bool {
        !self.vertices.is_empty()
    }

    /// Adds a clicked vertex.
    ///
    /// Points complete on the first click and circles on the second (center
    /// then rim); the completed geometry is returned and the sketch reset.
    /// Lines and polygons keep collecting until [`DrawSketch::finish`].
    pub fn add_vertex(&mut self, c: Coordinate) -> Option<Geometry> {
        match self.shape {
            DrawShape::Point => Some(Geometry::Point(c)),
            DrawShape::Circle => match self.vertices.first().copied() {
                Some(center) => {
                    self.vertices.clear();
                    let radius = center.distance_to(&c);
                    (radius > 0.0).then(|| circle_polygon(center, radius, CIRCLE_SIDES))
                }
                None => {
                    self.vertices.push(c);
                    None
                }
            },
            DrawShape::Line | DrawShape::Polygon => {
                self.vertices.push(c);
                None
            }
        }
    }

    /// Completes a line (two vertices or more) or polygon (three or more).
    /// The sketch is reset either way.
    pub fn finish(&mut self) -> Option<Geometry> {
        let vertices = std::mem::take(&mut self.vertices);
        match self.shape {
            DrawShape::Line if vertices.len() >= 2 => Some(Geometry::LineString(vertices)),
            DrawShape::Polygon if vertices.len() >= 3 => {
                let mut ring = vertices;
                ring.push(ring[0]);
                Some(Geometry::Polygon(vec![ring]))
            }
            _ => None,
        }
    }

    /// Drops the in-progress vertices.
    pub fn cancel(&mut self) {
        self.vertices.clear();
    }
}

/// Regular polygon approximating a circle, closed.
pub fn circle_polygon(center: Coordinate, radius: f64, sides: usize) -> Geometry {
    let sides = sides.max(3);
    let mut ring: Vec<Coordinate> = (0..sides)
        .map(|i| {
            let angle = TAU * i as f64 / sides as f64;
            Coordinate::new(center.x + radius * angle.cos(), center.y + radius * angle.sin())
        })
        .collect();
    ring.push(ring[0]);
    Geometry::Polygon(vec![ring])
}

/// Features drawn by hand, kept until the draw tools are left or cleared.
#[derive(Debug, Clone, Default)]
pub struct DrawOverlay {
    features: Vec<Feature>,
    next_id: u64,
}

impl DrawOverlay {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a drawn geometry and returns the new feature count.
    pub fn add(&mut self, shape: DrawShape, geometry: Geometry) -> usize {
        self.next_id += 1;
        let feature = Feature::new(geometry)
            .with_id(format!("draw-{}", self.next_id))
            .with_attribute("shape", shape.name());
        self.features.push(feature);
        self.features.len()
    }

    pub fn features(&self) -> &[Feature] {
        &self.features
    }

    /// Removes every drawn feature, returning how many were removed.
    pub fn clear(&mut self) -> usize {
        let count = self.features.len();
        self.features.clear();
        count
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_completes_immediately() {
        let mut sketch = DrawSketch::new(DrawShape::Point);
        let geometry = sketch.add_vertex(Coordinate::new(1.0, 2.0));
        assert_eq!(geometry, Some(Geometry::Point(Coordinate::new(1.0, 2.0))));
        assert!(!sketch.is_started());
    }

    #[test]
    fn test_circle_is_100_gon() {
        let mut sketch = DrawSketch::new(DrawShape::Circle);
        assert!(sketch.add_vertex(Coordinate::new(0.0, 0.0)).is_none());
        let Some(Geometry::Polygon(rings)) = sketch.add_vertex(Coordinate::new(10.0, 0.0)) else {
            panic!("circle not completed");
        };
        assert_eq!(rings[0].len(), CIRCLE_SIDES + 1);
        for c in &rings[0] {
            assert!((c.distance_to(&Coordinate::new(0.0, 0.0)) - 10.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_polygon_finish() {
        let mut sketch = DrawSketch::new(DrawShape::Polygon);
        sketch.add_vertex(Coordinate::new(0.0, 0.0));
        sketch.add_vertex(Coordinate::new(1.0, 0.0));
        assert!(sketch.clone().finish().is_none());
        sketch.add_vertex(Coordinate::new(1.0, 1.0));
        assert!(matches!(sketch.finish(), Some(Geometry::Polygon(_))));
        assert!(!sketch.is_started());
    }

    #[test]
    fn test_overlay_accumulates() {
        let mut overlay = DrawOverlay::new();
        overlay.add(DrawShape::Point, Geometry::Point(Coordinate::new(0.0, 0.0)));
        assert_eq!(overlay.add(DrawShape::Point, Geometry::Point(Coordinate::new(1.0, 0.0))), 2);
        assert_eq!(overlay.features()[1].id(), Some("draw-2"));
        assert_eq!(overlay.clear(), 2);
        assert!(overlay.is_empty());
    }
}

//! Axis-aligned bounding boxes in projected map units.
//!
//! An extent with `min > max` is the distinguished *empty* extent: it is the
//! identity for [`Extent::extend`] and intersects nothing. An extent with zero
//! width or height is *degenerate*; spatial queries treat it as empty.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::geometry::Coordinate;

/// Bounding box `(min_x, min_y, max_x, max_y)` in EPSG:3857 meters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Extent {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Extent {
    /// Creates an extent from its corners, normalizing swapped bounds.
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self {
            min_x: min_x.min(max_x),
            min_y: min_y.min(max_y),
            max_x: min_x.max(max_x),
            max_y: min_y.max(max_y),
        }
    }

    /// The empty extent ("no geometry yet").
    pub fn empty() -> Self {
        Self {
            min_x: f64::INFINITY,
            min_y: f64::INFINITY,
            max_x: f64::NEG_INFINITY,
            max_y: f64::NEG_INFINITY,
        }
    }

    /// Creates the extent spanning two corner coordinates in any order.
    pub fn from_corners(a: Coordinate, b: Coordinate) -> Self {
        Self::new(a.x, a.y, b.x, b.y)
    }

    /// Creates the smallest extent containing all coordinates.
    pub fn from_coordinates<'a>(coords: impl IntoIterator<Item = &'a Coordinate>) -> Self {
        let mut extent = Self::empty();
        for c in coords {
            extent.extend_coordinate(*c);
        }
        extent
    }

    /// True when no coordinate has been added.
    pub fn is_empty(&self) -> bool {
        self.min_x > self.max_x || self.min_y > self.max_y
    }

    /// True when the extent is empty or has zero width or height.
    pub fn is_degenerate(&self) -> bool {
        self.is_empty() || self.width() <= 0.0 || self.height() <= 0.0
    }

    pub fn width(&self) -> f64 {
        if self.is_empty() {
            0.0
        } else {
            self.max_x - self.min_x
        }
    }

    pub fn height(&self) -> f64 {
        if self.is_empty() {
            0.0
        } else {
            self.max_y - self.min_y
        }
    }

    /// Center of the extent, `None` when empty.
    pub fn center(&self) -> Option<Coordinate> {
        if self.is_empty() {
            return None;
        }
        Some(Coordinate::new(
            (self.min_x + self.max_x) / 2.0,
            (self.min_y + self.max_y) / 2.0,
        ))
    }

    /// Grows the extent to include a coordinate.
    pub fn extend_coordinate(&mut self, c: Coordinate) {
        self.min_x = self.min_x.min(c.x);
        self.min_y = self.min_y.min(c.y);
        self.max_x = self.max_x.max(c.x);
        self.max_y = self.max_y.max(c.y);
    }

    /// Grows the extent to include another extent. Extending by the empty
    /// extent is a no-op.
    pub fn extend(&mut self, other: &Extent) {
        if other.is_empty() {
            return;
        }
        self.min_x = self.min_x.min(other.min_x);
        self.min_y = self.min_y.min(other.min_y);
        self.max_x = self.max_x.max(other.max_x);
        self.max_y = self.max_y.max(other.max_y);
    }

    /// Returns the union of two extents.
    pub fn union(&self, other: &Extent) -> Extent {
        let mut out = *self;
        out.extend(other);
        out
    }

    /// Closed-interval intersection test. Touching edges intersect; the
    /// empty extent intersects nothing.
    pub fn intersects(&self, other: &Extent) -> bool {
        if self.is_empty() || other.is_empty() {
            return false;
        }
        self.min_x <= other.max_x
            && self.max_x >= other.min_x
            && self.min_y <= other.max_y
            && self.max_y >= other.min_y
    }

    /// True when the coordinate lies inside or on the boundary.
    pub fn contains_coordinate(&self, c: Coordinate) -> bool {
        !self.is_empty()
            && c.x >= self.min_x
            && c.x <= self.max_x
            && c.y >= self.min_y
            && c.y <= self.max_y
    }

    /// Returns a copy grown by `amount` on every side.
    pub fn buffered(&self, amount: f64) -> Extent {
        if self.is_empty() {
            return *self;
        }
        Extent {
            min_x: self.min_x - amount,
            min_y: self.min_y - amount,
            max_x: self.max_x + amount,
            max_y: self.max_y + amount,
        }
    }
}

impl Default for Extent {
    fn default() -> Self {
        Self::empty()
    }
}

impl fmt::Display for Extent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            write!(f, "(empty)")
        } else {
            write!(
                f,
                "[{:.2}, {:.2}, {:.2}, {:.2}]",
                self.min_x, self.min_y, self.max_x, self.max_y
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_is_identity_for_extend() {
        let mut e = Extent::empty();
        assert!(e.is_empty());
        e.extend(&Extent::new(0.0, 0.0, 10.0, 5.0));
        assert_eq!(e, Extent::new(0.0, 0.0, 10.0, 5.0));

        let before = e;
        e.extend(&Extent::empty());
        assert_eq!(e, before);
    }

    #[test]
    fn test_degenerate() {
        let point = Extent::from_corners(Coordinate::new(3.0, 3.0), Coordinate::new(3.0, 3.0));
        assert!(!point.is_empty());
        assert!(point.is_degenerate());

        let line = Extent::new(0.0, 1.0, 5.0, 1.0);
        assert!(line.is_degenerate());
        assert!(!Extent::new(0.0, 0.0, 1.0, 1.0).is_degenerate());
    }

    #[test]
    fn test_intersects_touching_edges() {
        let a = Extent::new(0.0, 0.0, 10.0, 10.0);
        assert!(a.intersects(&Extent::new(10.0, 10.0, 20.0, 20.0)));
        assert!(a.intersects(&Extent::new(2.0, 2.0, 3.0, 3.0)));
        assert!(!a.intersects(&Extent::new(10.5, 0.0, 20.0, 10.0)));
        assert!(!a.intersects(&Extent::empty()));
    }

    #[test]
    fn test_new_normalizes() {
        let e = Extent::new(10.0, 8.0, 2.0, 1.0);
        assert_eq!(e.min_x, 2.0);
        assert_eq!(e.max_y, 8.0);
        assert_eq!(e.width(), 8.0);
        assert_eq!(e.center(), Some(Coordinate::new(6.0, 4.5)));
    }
}

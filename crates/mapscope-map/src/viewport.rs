//! Map view state and pixel/map coordinate transformation.
//!
//! Pixels have (0,0) at the top-left of the map element with +Y down; map
//! coordinates are EPSG:3857 meters with +Y up. Zoom levels follow the web
//! mercator tile pyramid: resolution halves with every zoom level.

use std::fmt;

use crate::extent::Extent;
use crate::geometry::Coordinate;

/// Resolution (meters per pixel) at zoom level 0.
pub const MAX_RESOLUTION: f64 = 156_543.033_927_980_97;

/// Deepest zoom level the view accepts.
pub const MAX_ZOOM: f64 = 28.0;

/// A position on the map element in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Pixel {
    pub x: f64,
    pub y: f64,
}

impl Pixel {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Padding and zoom cap for fitting an extent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitOptions {
    /// Padding in pixels: top, right, bottom, left.
    pub padding: [f64; 4],
    /// Zoom level the fit will not exceed.
    pub max_zoom: Option<f64>,
}

impl FitOptions {
    /// Uniform padding without a zoom cap.
    pub fn padded(padding: f64) -> Self {
        Self {
            padding: [padding; 4],
            max_zoom: None,
        }
    }

    pub fn with_max_zoom(mut self, max_zoom: f64) -> Self {
        self.max_zoom = Some(max_zoom);
        self
    }
}

/// The view: center, resolution and map element size.
#[derive(Debug, Clone, PartialEq)]
pub struct Viewport {
    center: Coordinate,
    resolution: f64,
    width: f64,
    height: f64,
}

impl Viewport {
    /// Creates a view of `width` x `height` pixels centered on `center` at
    /// `zoom`.
    pub fn new(width: f64, height: f64, center: Coordinate, zoom: f64) -> Self {
        Self {
            center,
            resolution: resolution_for_zoom(zoom),
            width,
            height,
        }
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    /// Sets the map element size (window resize).
    pub fn set_size(&mut self, width: f64, height: f64) {
        self.width = width;
        self.height = height;
    }

    pub fn center(&self) -> Coordinate {
        self.center
    }

    pub fn set_center(&mut self, center: Coordinate) {
        self.center = center;
    }

    /// Map meters per pixel.
    pub fn resolution(&self) -> f64 {
        self.resolution
    }

    /// Fractional zoom level.
    pub fn zoom(&self) -> f64 {
        zoom_for_resolution(self.resolution)
    }

    /// Sets the zoom level, clamped to `0..=MAX_ZOOM`.
    pub fn set_zoom(&mut self, zoom: f64) {
        self.resolution = resolution_for_zoom(zoom);
    }

    /// Pans by a pixel delta (drag semantics: content follows the pointer).
    pub fn pan_by_pixels(&mut self, dx: f64, dy: f64) {
        self.center.x -= dx * self.resolution;
        self.center.y += dy * self.resolution;
    }

    /// Converts a pixel to map coordinates.
    ///
    /// ```text
    /// x = center.x + (px - width / 2) * resolution
    /// y = center.y - (py - height / 2) * resolution
    /// ```
    pub fn pixel_to_coordinate(&self, pixel: Pixel) -> Coordinate {
        Coordinate::new(
            self.center.x + (pixel.x - self.width / 2.0) * self.resolution,
            self.center.y - (pixel.y - self.height / 2.0) * self.resolution,
        )
    }

    /// Converts map coordinates to a pixel.
    pub fn coordinate_to_pixel(&self, c: Coordinate) -> Pixel {
        Pixel::new(
            (c.x - self.center.x) / self.resolution + self.width / 2.0,
            (self.center.y - c.y) / self.resolution + self.height / 2.0,
        )
    }

    /// Extent currently visible.
    pub fn visible_extent(&self) -> Extent {
        let half_w = self.width / 2.0 * self.resolution;
        let half_h = self.height / 2.0 * self.resolution;
        Extent::new(
            self.center.x - half_w,
            self.center.y - half_h,
            self.center.x + half_w,
            self.center.y + half_h,
        )
    }

    /// Fits an extent into the view leaving `options.padding` pixels free on
    /// each side.
    ///
    /// A degenerate extent (a single point) is centered at `max_zoom`, or at
    /// the current zoom without a cap. Returns false for the empty extent,
    /// leaving the view unchanged.
    pub fn fit_extent(&mut self, extent: &Extent, options: FitOptions) -> bool {
        let Some(center) = extent.center() else {
            return false;
        };
        let [top, right, bottom, left] = options.padding;
        let avail_w = (self.width - left - right).max(1.0);
        let avail_h = (self.height - top - bottom).max(1.0);

        let mut resolution = (extent.width() / avail_w).max(extent.height() / avail_h);
        if resolution <= 0.0 {
            resolution = options
                .max_zoom
                .map(resolution_for_zoom)
                .unwrap_or(self.resolution);
        }
        if let Some(max_zoom) = options.max_zoom {
            resolution = resolution.max(resolution_for_zoom(max_zoom));
        }
        self.resolution = resolution.clamp(resolution_for_zoom(MAX_ZOOM), MAX_RESOLUTION);

        // Shift the center so the extent sits in the middle of the padded area.
        let dx = (right - left) / 2.0 * self.resolution;
        let dy = (top - bottom) / 2.0 * self.resolution;
        self.center = Coordinate::new(center.x + dx, center.y + dy);
        true
    }
}

impl fmt::Display for Viewport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Zoom: {:.2} | Center: ({:.1}, {:.1})",
            self.zoom(),
            self.center.x,
            self.center.y
        )
    }
}

/// Resolution at a zoom level, with the zoom clamped to `0..=MAX_ZOOM`.
pub fn resolution_for_zoom(zoom: f64) -> f64 {
    MAX_RESOLUTION / 2f64.powf(zoom.clamp(0.0, MAX_ZOOM))
}

/// Zoom level for a resolution.
pub fn zoom_for_resolution(resolution: f64) -> f64 {
    (MAX_RESOLUTION / resolution).log2()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn view() -> Viewport {
        Viewport::new(800.0, 600.0, Coordinate::new(0.0, 0.0), 10.0)
    }

    #[test]
    fn test_pixel_round_trip() {
        let v = view();
        let c = v.pixel_to_coordinate(Pixel::new(400.0, 300.0));
        assert_eq!(c, Coordinate::new(0.0, 0.0));

        let p = Pixel::new(123.0, 456.0);
        let back = v.coordinate_to_pixel(v.pixel_to_coordinate(p));
        assert!((back.x - p.x).abs() < 1e-9);
        assert!((back.y - p.y).abs() < 1e-9);
    }

    #[test]
    fn test_y_axis_flipped() {
        let v = view();
        let top = v.pixel_to_coordinate(Pixel::new(400.0, 0.0));
        assert!(top.y > 0.0);
    }

    #[test]
    fn test_fit_extent_respects_padding() {
        let mut v = view();
        let extent = Extent::new(1000.0, 2000.0, 5000.0, 4000.0);
        assert!(v.fit_extent(&extent, FitOptions::padded(100.0)));

        let min = v.coordinate_to_pixel(Coordinate::new(extent.min_x, extent.min_y));
        let max = v.coordinate_to_pixel(Coordinate::new(extent.max_x, extent.max_y));
        assert!(min.x >= 100.0 - 1e-6);
        assert!(max.x <= 700.0 + 1e-6);
        assert!(max.y >= 100.0 - 1e-6);
        assert!(min.y <= 500.0 + 1e-6);
    }

    #[test]
    fn test_fit_point_uses_max_zoom() {
        let mut v = view();
        let point = Extent::from_corners(Coordinate::new(50.0, 50.0), Coordinate::new(50.0, 50.0));
        assert!(v.fit_extent(&point, FitOptions::padded(50.0).with_max_zoom(15.0)));
        assert!((v.zoom() - 15.0).abs() < 1e-9);
        assert_eq!(v.center(), Coordinate::new(50.0, 50.0));
    }

    #[test]
    fn test_fit_empty_is_noop() {
        let mut v = view();
        let before = v.clone();
        assert!(!v.fit_extent(&Extent::empty(), FitOptions::padded(10.0)));
        assert_eq!(v, before);
    }
}

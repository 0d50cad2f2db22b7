//! Pointer and keyboard input.

use mapscope_core::{AppEvent, QueryEvent};

use super::loading::RasterQuery;
use super::MapViewer;
use crate::geometry::Coordinate;
use crate::highlight::HighlightChannel;
use crate::layer::topmost_raster;
use crate::panels::{FeatureInfo, InfoPanel};
use crate::projection::LonLat;
use crate::query::{QueryHit, QueryResult, SpatialQuery};
use crate::services::RasterInfoRequest;
use crate::surface::Cursor;
use crate::tools::box_select::pixels_to_extent;
use crate::tools::{InteractionMode, PathPointType, ToolSession};
use crate::viewport::Pixel;

/// Keys the viewer reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    /// Cancels the current sketch or drag.
    Escape,
    /// Finishes the current sketch, like a double-click.
    Enter,
}

/// What a click did.
#[derive(Debug, Clone, PartialEq)]
pub enum ClickOutcome {
    /// The current tool does not use clicks.
    Ignored,
    /// A vector feature was picked.
    Hit(QueryHit),
    /// Nothing under the pointer and no raster to ask.
    Miss,
    /// Nothing vector under the pointer; a raster point query should run.
    Raster(RasterQuery),
    /// A vertex was added to the current sketch.
    Vertex,
    /// A measurement was committed with this label.
    Measured(String),
    /// A shape was drawn; `total` drawn features now exist.
    Drawn { total: usize },
    /// A route point was picked.
    PathPoint(PathPointType),
}

impl MapViewer {
    /// Handles a single click at `pixel`.
    pub fn handle_click(&mut self, pixel: Pixel) -> ClickOutcome {
        let coordinate = self.viewport.pixel_to_coordinate(pixel);
        match self.coordinator.current() {
            InteractionMode::QuerySingle => self.query_point(coordinate),
            InteractionMode::PathAnalysis => self.pick_path_point(coordinate),
            mode if mode.is_measure() || mode.is_draw() => self.add_sketch_vertex(coordinate),
            _ => ClickOutcome::Ignored,
        }
    }

    /// Handles a double-click: finishes a measurement or a line/polygon
    /// drawing.
    pub fn handle_double_click(&mut self, _pixel: Pixel) -> ClickOutcome {
        self.finish_sketch()
    }

    /// Starts a box drag. Returns false outside box selection.
    pub fn handle_pointer_down(&mut self, pixel: Pixel) -> bool {
        match self.coordinator.session_mut() {
            ToolSession::BoxSelect(tool) => {
                tool.pointer_down(pixel);
                true
            }
            _ => false,
        }
    }

    /// Moves the free corner of a box drag.
    pub fn handle_pointer_drag(&mut self, pixel: Pixel) {
        if let ToolSession::BoxSelect(tool) = self.coordinator.session_mut() {
            tool.pointer_drag(pixel);
        }
    }

    /// Ends a box drag and selects what the box covers.
    pub fn handle_pointer_up(&mut self, pixel: Pixel) -> Option<QueryResult> {
        let corners = match self.coordinator.session_mut() {
            ToolSession::BoxSelect(tool) => tool.pointer_up(pixel),
            _ => None,
        }?;
        let extent = pixels_to_extent(&self.viewport, corners.0, corners.1);
        self.select_in_extent(&extent)
    }

    /// Updates the pointer readout, the hover cursor and the help tooltip.
    pub fn handle_pointer_move(&mut self, pixel: Pixel) {
        let coordinate = self.viewport.pixel_to_coordinate(pixel);
        self.coordinator
            .status_mut()
            .pointer_position(LonLat::from_map(coordinate));

        let mode = self.coordinator.current();
        let cursor = match mode {
            InteractionMode::QuerySingle | InteractionMode::None => {
                if self.has_feature_at(coordinate) {
                    Cursor::Pointer
                } else {
                    Cursor::Default
                }
            }
            other => other.cursor(),
        };
        self.coordinator.surface_mut().set_cursor(cursor);
        self.coordinator.status_mut().cursor(cursor);

        match self.tooltip_text(mode, coordinate) {
            Some(text) => self.coordinator.status_mut().show_tooltip(text, coordinate),
            None => self.coordinator.status_mut().hide_tooltip(),
        }
    }

    /// Handles a key press. Returns false when the key did nothing.
    pub fn handle_key(&mut self, key: Key) -> bool {
        match key {
            Key::Escape => self.coordinator.cancel_on_escape(),
            Key::Enter => !matches!(self.finish_sketch(), ClickOutcome::Ignored),
        }
    }

    fn has_feature_at(&self, coordinate: Coordinate) -> bool {
        SpatialQuery::new(&self.layers).has_feature_at(coordinate, self.hit_tolerance())
    }

    /// Single-click query: the topmost vector feature, or a raster point
    /// query when no vector feature is there.
    fn query_point(&mut self, coordinate: Coordinate) -> ClickOutcome {
        self.point_queries += 1;
        let hit = SpatialQuery::new(&self.layers).at_point(coordinate, self.hit_tolerance());
        match hit {
            Some(hit) => {
                self.coordinator
                    .highlights_mut()
                    .set(HighlightChannel::SingleQuery, [hit.feature.as_ref()]);
                self.coordinator.set_info(InfoPanel::Feature(FeatureInfo {
                    layer_id: hit.layer_id.clone(),
                    layer_name: hit.layer_name.clone(),
                    feature: hit.feature.clone(),
                }));
                self.coordinator
                    .status_mut()
                    .success(format!("Showing attributes from {}", hit.layer_name));
                self.publish(AppEvent::Query(QueryEvent::PointHit {
                    layer_id: hit.layer_id.clone(),
                    feature_id: hit.feature.id().map(str::to_string),
                }));
                ClickOutcome::Hit(hit)
            }
            None => {
                self.coordinator
                    .highlights_mut()
                    .clear(HighlightChannel::SingleQuery);
                self.coordinator.set_info(InfoPanel::Hidden);

                if let Some(raster) = topmost_raster(&self.rasters) {
                    tracing::debug!("No vector hit, querying raster {}", raster.id);
                    return ClickOutcome::Raster(RasterQuery {
                        ticket: self.coordinator.ticket(),
                        click: self.point_queries,
                        title: raster.title.clone(),
                        request: RasterInfoRequest {
                            layer_id: raster.id.clone(),
                            url: raster.url.clone(),
                            layer_name: raster.layer_name.clone(),
                            coordinate,
                            resolution: self.viewport.resolution(),
                        },
                    });
                }
                self.coordinator.status_mut().info("No feature at this location");
                self.publish(AppEvent::Query(QueryEvent::PointMiss));
                ClickOutcome::Miss
            }
        }
    }

    fn pick_path_point(&mut self, coordinate: Coordinate) -> ClickOutcome {
        let ToolSession::Path(picker) = self.coordinator.session_mut() else {
            return ClickOutcome::Ignored;
        };
        let kind = picker.pick(LonLat::from_map(coordinate));
        if kind == PathPointType::Barrier {
            self.coordinator.status_mut().info("Barrier marked");
        }
        ClickOutcome::PathPoint(kind)
    }

    fn add_sketch_vertex(&mut self, coordinate: Coordinate) -> ClickOutcome {
        let drawn = match self.coordinator.session_mut() {
            ToolSession::Measure(sketch) => {
                sketch.add_vertex(coordinate);
                return ClickOutcome::Vertex;
            }
            ToolSession::Draw(sketch) => match sketch.add_vertex(coordinate) {
                Some(geometry) => (sketch.shape(), geometry),
                None => return ClickOutcome::Vertex,
            },
            _ => return ClickOutcome::Ignored,
        };
        self.commit_drawing(drawn.0, drawn.1)
    }

    fn finish_sketch(&mut self) -> ClickOutcome {
        match self.coordinator.session_mut() {
            ToolSession::Measure(sketch) => {
                let Some(measured) = sketch.finish(self.engine.as_ref()) else {
                    return ClickOutcome::Ignored;
                };
                let label = measured.label.clone();
                self.coordinator.measures_mut().push(measured);
                self.coordinator.status_mut().hide_tooltip();
                self.coordinator
                    .status_mut()
                    .success(format!("Measured {}", label));
                ClickOutcome::Measured(label)
            }
            ToolSession::Draw(sketch) => {
                let shape = sketch.shape();
                match sketch.finish() {
                    Some(geometry) => self.commit_drawing(shape, geometry),
                    None => ClickOutcome::Ignored,
                }
            }
            _ => ClickOutcome::Ignored,
        }
    }

    fn commit_drawing(
        &mut self,
        shape: crate::tools::DrawShape,
        geometry: crate::geometry::Geometry,
    ) -> ClickOutcome {
        let total = self.coordinator.drawings_mut().add(shape, geometry);
        tracing::debug!("Drew {} ({} total)", shape.name(), total);
        self.coordinator.status_mut().success(format!(
            "Added {} | {} drawn features",
            shape.name(),
            total
        ));
        ClickOutcome::Drawn { total }
    }

    /// Help text, or the live measurement once a measure sketch has started.
    fn tooltip_text(&self, mode: InteractionMode, pointer: Coordinate) -> Option<String> {
        if let ToolSession::Measure(sketch) = self.coordinator.session() {
            if sketch.is_started() {
                let mut preview = sketch.clone();
                preview.add_vertex(pointer);
                if let Some(label) = preview.label(self.engine.as_ref()) {
                    return Some(label);
                }
            }
        }
        mode.help_text().map(str::to_string)
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::viewer;
    use super::*;
    use crate::feature::Feature;
    use crate::geometry::Geometry;
    use crate::layer::{Layer, RasterLayer};
    use crate::surface::MapSurface;

    fn square(cx: f64, cy: f64, half: f64) -> Geometry {
        Geometry::Polygon(vec![vec![
            Coordinate::new(cx - half, cy - half),
            Coordinate::new(cx + half, cy - half),
            Coordinate::new(cx + half, cy + half),
            Coordinate::new(cx - half, cy + half),
            Coordinate::new(cx - half, cy - half),
        ]])
    }

    fn center_pixel(viewer: &MapViewer) -> Pixel {
        viewer.viewport().coordinate_to_pixel(viewer.viewport().center())
    }

    #[test]
    fn test_click_hits_topmost_layer() {
        let (mut viewer, _) = viewer();
        let center = viewer.viewport().center();
        let lower = Layer::data("lower", "Lower");
        let upper = Layer::data("upper", "Upper");
        lower.store().unwrap().add(Feature::new(square(center.x, center.y, 1000.0)));
        upper.store().unwrap().add(Feature::new(square(center.x, center.y, 1000.0)).with_id("u1"));
        viewer.add_layer(lower);
        viewer.add_layer(upper);
        viewer.activate(InteractionMode::QuerySingle).unwrap();

        let pixel = center_pixel(&viewer);
        let ClickOutcome::Hit(hit) = viewer.handle_click(pixel) else {
            panic!("expected a hit");
        };
        assert_eq!(hit.layer_id, "upper");
        assert_eq!(
            viewer.coordinator().highlights().len(HighlightChannel::SingleQuery),
            1
        );
        assert!(viewer.coordinator().info().is_visible());
    }

    #[test]
    fn test_miss_falls_back_to_raster() {
        let (mut viewer, _) = viewer();
        viewer.add_raster(RasterLayer {
            id: "dem".to_string(),
            title: "Elevation".to_string(),
            url: "http://localhost/wms".to_string(),
            layer_name: "ws:dem".to_string(),
            visible: true,
            z_index: 1,
        });
        viewer.activate(InteractionMode::QuerySingle).unwrap();
        match viewer.handle_click(Pixel::new(10.0, 10.0)) {
            ClickOutcome::Raster(query) => {
                assert_eq!(query.request.layer_name, "ws:dem");
                assert!(viewer.coordinator().is_current(&query.ticket));
            }
            other => panic!("unexpected {:?}", other),
        }

        viewer.set_raster_visible("dem", false);
        assert_eq!(viewer.handle_click(Pixel::new(10.0, 10.0)), ClickOutcome::Miss);
    }

    #[test]
    fn test_measure_by_clicks() {
        let (mut viewer, _) = viewer();
        viewer.activate(InteractionMode::MeasureDistance).unwrap();
        assert_eq!(viewer.handle_click(Pixel::new(100.0, 100.0)), ClickOutcome::Vertex);
        viewer.handle_pointer_move(Pixel::new(150.0, 100.0));
        let tooltip = viewer.coordinator().status().display().tooltip.clone();
        assert!(tooltip.unwrap().text.ends_with("km"));

        viewer.handle_click(Pixel::new(200.0, 100.0));
        assert!(matches!(
            viewer.handle_double_click(Pixel::new(200.0, 100.0)),
            ClickOutcome::Measured(_)
        ));
        assert_eq!(viewer.coordinator().measures().len(), 1);
    }

    #[test]
    fn test_draw_circle_and_escape() {
        let (mut viewer, surface) = viewer();
        viewer.activate(InteractionMode::DrawCircle).unwrap();
        assert_eq!(viewer.handle_click(Pixel::new(100.0, 100.0)), ClickOutcome::Vertex);
        assert_eq!(
            viewer.handle_click(Pixel::new(120.0, 100.0)),
            ClickOutcome::Drawn { total: 1 }
        );
        viewer.handle_click(Pixel::new(300.0, 300.0));
        assert!(viewer.handle_key(Key::Escape));
        assert_eq!(viewer.current_mode(), InteractionMode::None);
        assert_eq!(viewer.coordinator().drawings().len(), 1);
        assert_eq!(surface.interaction_count(), 0);
    }

    #[test]
    fn test_box_drag_selects() {
        let (mut viewer, _) = viewer();
        let center = viewer.viewport().center();
        let layer = Layer::data("parcels", "Parcels");
        layer.store().unwrap().add(Feature::new(square(center.x, center.y, 100.0)));
        viewer.add_layer(layer);
        viewer.activate(InteractionMode::QueryBox).unwrap();

        let c = center_pixel(&viewer);
        assert!(viewer.handle_pointer_down(Pixel::new(c.x - 50.0, c.y - 50.0)));
        viewer.handle_pointer_drag(Pixel::new(c.x, c.y));
        let result = viewer.handle_pointer_up(Pixel::new(c.x + 50.0, c.y + 50.0)).unwrap();
        assert_eq!((result.total(), result.layer_count()), (1, 1));
        assert_eq!(viewer.coordinator().highlights().len(HighlightChannel::BoxQuery), 1);

        // A click without movement is a degenerate box.
        viewer.handle_pointer_down(c);
        let result = viewer.handle_pointer_up(c).unwrap();
        assert!(result.is_empty());
    }

    #[test]
    fn test_hover_cursor() {
        let (mut viewer, surface) = viewer();
        let center = viewer.viewport().center();
        let layer = Layer::data("parcels", "Parcels");
        layer.store().unwrap().add(Feature::new(square(center.x, center.y, 100_000.0)));
        viewer.add_layer(layer);
        viewer.activate(InteractionMode::QuerySingle).unwrap();

        viewer.handle_pointer_move(center_pixel(&viewer));
        assert_eq!(surface.cursor(), Cursor::Pointer);
        viewer.handle_pointer_move(Pixel::new(0.0, 0.0));
        assert_eq!(surface.cursor(), Cursor::Default);

        viewer.activate(InteractionMode::QueryBox).unwrap();
        viewer.handle_pointer_move(center_pixel(&viewer));
        assert_eq!(surface.cursor(), Cursor::Crosshair);
    }
}

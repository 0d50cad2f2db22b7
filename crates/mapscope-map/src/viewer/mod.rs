//! Map viewer aggregate.
//! Owns every piece of session state and routes user input to the current
//! tool.
//!
//! This module is split into submodules by concern:
//! - `pointer`: clicks, drags, pointer moves and keys
//! - `queries`: attribute queries and box result selection
//! - `analysis`: buffer and route analysis
//! - `loading`: feature loading and raster point queries

mod analysis;
mod loading;
mod pointer;
mod queries;

pub use loading::RasterQuery;
pub use pointer::{ClickOutcome, Key};

use mapscope_core::{AppEvent, EventBus, LayerEvent, Result};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::algorithms::{GeodesicEngine, GeometryService};
use crate::analysis::AnalysisState;
use crate::extent::Extent;
use crate::highlight::{HighlightChannel, HighlightStyle};
use crate::layer::{Layer, LayerStack, LayerStyle, OverlayKind, RasterLayer};
use crate::projection::LonLat;
use crate::surface::MapSurface;
use crate::tools::{InteractionMode, ModeCoordinator, ToolbarState};
use crate::viewport::{FitOptions, Viewport};

/// Ids of the overlay layers every viewer carries.
pub const DRAW_LAYER_ID: &str = "draw-overlay";
pub const MEASURE_LAYER_ID: &str = "measure-overlay";
pub const ANALYSIS_LAYER_ID: &str = "analysis-overlay";

/// Viewer behavior knobs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewerOptions {
    /// Center restored by "reset view".
    pub home: LonLat,
    pub home_zoom: f64,
    /// Zoom cap when fitting a single selected feature.
    pub max_fit_zoom: f64,
    /// Click tolerance in pixels.
    pub hit_tolerance_px: f64,
    /// Padding when fitting a whole result set.
    pub result_padding: f64,
    /// Padding when fitting one selected feature.
    pub selection_padding: f64,
    /// Initial surface size in pixels.
    pub width: f64,
    pub height: f64,
}

impl Default for ViewerOptions {
    fn default() -> Self {
        Self {
            home: LonLat::new(116.4, 39.9),
            home_zoom: 4.0,
            max_fit_zoom: 15.0,
            hit_tolerance_px: 3.0,
            result_padding: 100.0,
            selection_padding: 50.0,
            width: 1280.0,
            height: 800.0,
        }
    }
}

/// The map viewer core.
pub struct MapViewer {
    layers: LayerStack,
    rasters: Vec<RasterLayer>,
    viewport: Viewport,
    coordinator: ModeCoordinator,
    analysis: AnalysisState,
    engine: Arc<dyn GeometryService>,
    options: ViewerOptions,
    /// Bumped on every QuerySingle click; a raster answer only applies to
    /// the click that launched it.
    point_queries: u64,
}

impl MapViewer {
    /// Creates a viewer with the default geometry engine.
    pub fn new(surface: Box<dyn MapSurface>, bus: Arc<EventBus>, options: ViewerOptions) -> Self {
        Self::with_engine(surface, bus, options, Arc::new(GeodesicEngine::new()))
    }

    pub fn with_engine(
        surface: Box<dyn MapSurface>,
        bus: Arc<EventBus>,
        options: ViewerOptions,
        engine: Arc<dyn GeometryService>,
    ) -> Self {
        let mut layers = LayerStack::new();
        layers.push(Layer::overlay(ANALYSIS_LAYER_ID, OverlayKind::Analysis));
        layers.push(Layer::overlay(DRAW_LAYER_ID, OverlayKind::Draw));
        layers.push(Layer::overlay(MEASURE_LAYER_ID, OverlayKind::Measure));
        for channel in HighlightChannel::QUERY {
            layers.push(Layer::overlay(
                format!("highlight-{}", channel),
                OverlayKind::Highlight(channel),
            ));
        }

        let viewport = Viewport::new(
            options.width,
            options.height,
            options.home.to_map(),
            options.home_zoom,
        );
        let mut viewer = Self {
            layers,
            rasters: Vec::new(),
            viewport,
            coordinator: ModeCoordinator::new(surface, bus),
            analysis: AnalysisState::new(),
            engine,
            options,
            point_queries: 0,
        };
        viewer.show_view();
        viewer
    }

    pub fn options(&self) -> &ViewerOptions {
        &self.options
    }

    pub fn layers(&self) -> &LayerStack {
        &self.layers
    }

    /// Registers a data layer; false if the id is taken.
    pub fn add_layer(&mut self, layer: Layer) -> bool {
        let id = layer.id.clone();
        let added = self.layers.push(layer);
        if added {
            tracing::debug!("Layer {} registered", id);
        } else {
            tracing::warn!("Layer {} already registered", id);
        }
        added
    }

    pub fn rasters(&self) -> &[RasterLayer] {
        &self.rasters
    }

    pub fn add_raster(&mut self, raster: RasterLayer) {
        self.rasters.push(raster);
    }

    /// Shows or hides a data layer. Returns false for unknown layers.
    pub fn set_layer_visible(&mut self, layer_id: &str, visible: bool) -> bool {
        let Some(layer) = self.layers.get_mut(layer_id).filter(|l| !l.is_overlay()) else {
            return false;
        };
        layer.visible = visible;
        self.publish(AppEvent::Layer(LayerEvent::VisibilityChanged {
            layer_id: layer_id.to_string(),
            visible,
        }));
        true
    }

    /// Restyles a data layer. Features already copied into a highlight
    /// channel keep their look until highlighted again.
    pub fn set_layer_style(&mut self, layer_id: &str, style: LayerStyle) -> bool {
        let Some(layer) = self.layers.get_mut(layer_id).filter(|l| !l.is_overlay()) else {
            return false;
        };
        layer.style = style;
        self.publish(AppEvent::Layer(LayerEvent::StyleChanged {
            layer_id: layer_id.to_string(),
        }));
        true
    }

    pub fn set_raster_visible(&mut self, raster_id: &str, visible: bool) -> bool {
        match self.rasters.iter_mut().find(|r| r.id == raster_id) {
            Some(raster) => {
                raster.visible = visible;
                true
            }
            None => false,
        }
    }

    pub fn set_highlight_style(&mut self, channel: HighlightChannel, style: HighlightStyle) {
        self.coordinator.highlights_mut().set_style(channel, style);
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    /// Resizes the map area.
    pub fn resize(&mut self, width: f64, height: f64) {
        self.viewport.set_size(width, height);
        self.show_view();
    }

    pub fn pan_by_pixels(&mut self, dx: f64, dy: f64) {
        self.viewport.pan_by_pixels(dx, dy);
        self.show_view();
    }

    pub fn set_zoom(&mut self, zoom: f64) {
        self.viewport.set_zoom(zoom);
        self.show_view();
    }

    pub fn coordinator(&self) -> &ModeCoordinator {
        &self.coordinator
    }

    pub fn coordinator_mut(&mut self) -> &mut ModeCoordinator {
        &mut self.coordinator
    }

    pub fn current_mode(&self) -> InteractionMode {
        self.coordinator.current()
    }

    pub fn toolbar(&self) -> ToolbarState {
        self.coordinator.toolbar()
    }

    pub fn analysis(&self) -> &AnalysisState {
        &self.analysis
    }

    pub fn engine(&self) -> &dyn GeometryService {
        self.engine.as_ref()
    }

    /// Activates a tool.
    pub fn activate(&mut self, mode: InteractionMode) -> Result<()> {
        self.coordinator.activate(mode)
    }

    /// Toolbar button press: activates the tool, or leaves it when it is
    /// already current.
    pub fn toggle(&mut self, mode: InteractionMode) -> Result<()> {
        if mode != InteractionMode::None && self.coordinator.current() == mode {
            self.coordinator.deactivate();
            Ok(())
        } else {
            self.coordinator.activate(mode)
        }
    }

    pub fn deactivate(&mut self) {
        self.coordinator.deactivate();
    }

    /// Recenters on the home view and leaves every tool, dropping measured
    /// and drawn features. Analysis outputs stay.
    pub fn reset_view(&mut self) {
        self.coordinator.deactivate();
        self.coordinator.clear_measurements();
        self.coordinator.clear_drawings();
        self.viewport.set_center(self.options.home.to_map());
        self.viewport.set_zoom(self.options.home_zoom);
        self.show_view();
        self.coordinator.status_mut().info("View reset");
    }

    /// Removes every measurement.
    pub fn clear_measurements(&mut self) {
        let removed = self.coordinator.clear_measurements();
        if removed > 0 {
            self.coordinator
                .status_mut()
                .info(format!("Cleared {} measurements", removed));
        }
    }

    /// Removes every drawn feature.
    pub fn clear_drawings(&mut self) {
        let removed = self.coordinator.clear_drawings();
        if removed > 0 {
            self.coordinator.status_mut().info("Cleared all drawn features");
        }
    }

    /// Fits the view to `extent`. Empty extents leave the view alone.
    pub(crate) fn fit(&mut self, extent: &Extent, options: FitOptions) -> bool {
        let fitted = self.viewport.fit_extent(extent, options);
        if fitted {
            self.show_view();
        }
        fitted
    }

    pub(crate) fn fit_result(&mut self, extent: &Extent) -> bool {
        self.fit(extent, FitOptions::padded(self.options.result_padding))
    }

    pub(crate) fn fit_selection(&mut self, extent: &Extent) -> bool {
        self.fit(
            extent,
            FitOptions::padded(self.options.selection_padding)
                .with_max_zoom(self.options.max_fit_zoom),
        )
    }

    fn show_view(&mut self) {
        self.coordinator.surface_mut().show_view(&self.viewport);
    }

    /// Click tolerance in map units at the current resolution.
    pub(crate) fn hit_tolerance(&self) -> f64 {
        self.options.hit_tolerance_px * self.viewport.resolution()
    }

    /// Re-derives the analysis highlight channel from the analysis outputs.
    pub(crate) fn refresh_analysis_channel(&mut self) {
        let features = self.analysis.features();
        self.coordinator
            .highlights_mut()
            .set(HighlightChannel::Analysis, &features);
    }

    pub(crate) fn publish(&self, event: AppEvent) {
        self.coordinator.status().publish(event);
    }
}

impl std::fmt::Debug for MapViewer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MapViewer")
            .field("layers", &self.layers.len())
            .field("rasters", &self.rasters.len())
            .field("viewport", &self.viewport)
            .field("coordinator", &self.coordinator)
            .finish()
    }
}

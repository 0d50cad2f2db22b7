//! # MapScope
//!
//! Core of an interactive web-map viewer:
//! - Mutually exclusive map tools (measure, draw, query, analysis)
//! - Click, box and attribute queries over loaded vector layers
//! - Buffer and shortest-path analysis
//! - Independent highlight overlays per result channel
//!
//! ## Architecture
//!
//! MapScope is organized as a workspace with multiple crates:
//!
//! 1. **mapscope-core** - Errors, events, unit formatting
//! 2. **mapscope-map** - Layers, spatial queries, tool-mode coordinator, viewer
//! 3. **mapscope-services** - WFS, OSRM and WMS over HTTP
//! 4. **mapscope-settings** - Configuration files
//! 5. **mapscope** - Binary that wires configuration, services and viewer

pub use mapscope_core::{Error, EventBus, Result};
pub use mapscope_map::{
    HighlightChannel, HighlightStyle, InteractionMode, Layer, LayerStyle, LonLat, MapSurface,
    MapViewer, RasterLayer, ViewerOptions,
};
pub use mapscope_services::HttpServices;
pub use mapscope_settings::{ChannelColors, Config, LayerSettings, RasterSettings, ViewSettings};

use std::sync::Arc;
use std::time::Duration;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build date (set at compile time)
pub const BUILD_DATE: &str = env!("BUILD_DATE");

/// Initialize logging with the default configuration
///
/// Sets up structured logging with:
/// - Console output with pretty formatting
/// - RUST_LOG environment variable support
pub fn init_logging() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stdout)
        .with_target(true)
        .with_level(true)
        .with_thread_ids(true)
        .with_line_number(true)
        .pretty();

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()?;

    Ok(())
}

pub fn viewer_options(view: &ViewSettings) -> ViewerOptions {
    ViewerOptions {
        home: LonLat::new(view.home_lon, view.home_lat),
        home_zoom: view.home_zoom,
        max_fit_zoom: view.max_fit_zoom,
        hit_tolerance_px: view.hit_tolerance_px,
        width: view.width,
        height: view.height,
        ..ViewerOptions::default()
    }
}

pub fn business_layer(settings: &LayerSettings) -> Layer {
    Layer::data(settings.id.as_str(), settings.name.as_str())
        .with_source(settings.layer_name.as_str())
        .with_style(LayerStyle {
            fill_color: settings.color.clone(),
            border_color: settings.border_color.clone(),
            opacity: settings.opacity,
            ..LayerStyle::default()
        })
        .with_visible(settings.visible)
}

pub fn raster_layer(settings: &RasterSettings) -> RasterLayer {
    RasterLayer {
        id: settings.id.clone(),
        title: settings.title.clone(),
        url: settings.url.clone(),
        layer_name: settings.layer_name.clone(),
        visible: settings.visible,
        z_index: settings.z_index,
    }
}

fn highlight_style(colors: &ChannelColors) -> HighlightStyle {
    HighlightStyle::new(colors.stroke.as_str(), colors.fill.as_str(), colors.width)
}

/// Builds a viewer with every configured layer and highlight style.
pub fn build_viewer(
    config: &Config,
    surface: Box<dyn MapSurface>,
    bus: Arc<EventBus>,
) -> MapViewer {
    let mut viewer = MapViewer::new(surface, bus, viewer_options(&config.view));

    for layer in &config.layers {
        viewer.add_layer(business_layer(layer));
    }
    for raster in &config.rasters {
        viewer.add_raster(raster_layer(raster));
    }

    let highlight = &config.highlight;
    for (channel, colors) in [
        (HighlightChannel::SingleQuery, &highlight.single_query),
        (HighlightChannel::BoxQuery, &highlight.box_query),
        (HighlightChannel::AttributeQuery, &highlight.attribute_query),
        (HighlightChannel::Analysis, &highlight.analysis),
    ] {
        viewer.set_highlight_style(channel, highlight_style(colors));
    }

    tracing::info!(
        "Viewer ready with {} layers and {} rasters",
        config.layers.len(),
        config.rasters.len()
    );
    viewer
}

/// HTTP services for the configured endpoints.
pub fn build_services(config: &Config) -> HttpServices {
    HttpServices::new(
        &config.services.wfs_url,
        &config.services.routing_url,
        Duration::from_millis(config.services.timeout_ms),
    )
}

//! # MapScope Map
//!
//! The interactive core of the map viewer: one exclusive tool mode at a
//! time, spatial and attribute queries over the loaded layers, and the
//! highlight channels results are drawn into.
//!
//! ## Core Components
//!
//! ### Data
//! - **Geometry**: points, lines and polygons in Web Mercator map units
//! - **Features**: geometry plus ordered attributes, read from GeoJSON
//! - **Feature stores**: append-only per-layer storage with snapshot reads
//! - **Layers**: data layers above a base map, tool overlays on top
//!
//! ### Interaction
//! - **Mode coordinator**: the single current tool and its pointer handler
//! - **Tools**: measuring, drawing, box selection, route point picking
//! - **Highlights**: independent single, box, attribute and analysis channels
//! - **Status**: toasts, tooltips, pointer readout and loading indicator
//!
//! ### Queries and analysis
//! - **Spatial queries**: topmost-first point picking and extent selection
//! - **Attribute queries**: text predicates on one field of one layer
//! - **Buffers and routes**: outputs that persist across tool changes
//!
//! ## Architecture
//!
//! ```text
//! MapViewer
//!   ├── LayerStack (data layers + overlays)
//!   ├── Viewport (center, resolution, pixel mapping)
//!   ├── ModeCoordinator
//!   │     ├── MapSurface (interactions, cursor, rendering)
//!   │     ├── ToolSession (sketch / drag / path picker)
//!   │     ├── HighlightManager
//!   │     └── StatusPresenter -> EventBus
//!   └── AnalysisState (buffer, route)
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use mapscope_map::{HeadlessSurface, InteractionMode, Layer, MapViewer, ViewerOptions};
//!
//! let surface = Box::new(HeadlessSurface::new());
//! let mut viewer = MapViewer::new(surface, bus, ViewerOptions::default());
//! viewer.add_layer(Layer::data("roads", "Roads").with_source("ws:roads"));
//! viewer.activate(InteractionMode::QueryBox)?;
//! ```

pub mod algorithms;
pub mod analysis;
pub mod extent;
pub mod feature;
pub mod feature_store;
pub mod geometry;
pub mod highlight;
pub mod layer;
pub mod panels;
pub mod projection;
pub mod query;
pub mod services;
pub mod status;
pub mod surface;
pub mod tools;
pub mod viewer;
pub mod viewport;

pub use algorithms::{GeodesicEngine, GeometryService};
pub use analysis::{
    AnalysisState, BufferOutput, BufferRequest, PendingRoute, RouteOutput, RouteRequest,
    RouteResponse, TaskOutcome,
};
pub use extent::Extent;
pub use feature::Feature;
pub use feature_store::FeatureStore;
pub use geometry::{Coordinate, Geometry};
pub use highlight::{HighlightChannel, HighlightManager, HighlightStyle};
pub use layer::{Layer, LayerKind, LayerStack, LayerStyle, OverlayKind, RasterLayer};
pub use panels::{BoxResults, FeatureInfo, FeaturePreview, InfoPanel, LayerPreview, RasterInfo};
pub use projection::LonLat;
pub use query::{
    AttributeOperator, AttributeQuery, AttributeResults, LayerHits, QueryHit, QueryResult,
    SpatialQuery,
};
pub use services::{FeatureService, RasterInfoRequest, RasterInfoService, RoutingService};
pub use status::{StatusDisplay, StatusPresenter};
pub use surface::{Cursor, HeadlessSurface, InteractionHandle, InteractionKind, MapSurface};
pub use tools::{
    InteractionMode, ModeCoordinator, ModeTicket, PathPointType, ToolButton, ToolSession,
    ToolbarState,
};
pub use viewer::{ClickOutcome, Key, MapViewer, RasterQuery, ViewerOptions};
pub use viewport::{FitOptions, Pixel, Viewport};

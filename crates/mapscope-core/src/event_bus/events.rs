//! Event type definitions for the event bus.
//!
//! Events are grouped by category. They are cloneable and serializable so
//! they can be logged or replayed by a front end.

use serde::{Deserialize, Serialize};

/// Root event enum for all application events
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AppEvent {
    /// Transient text shown to the operator
    Status(StatusEvent),
    /// Interaction mode transitions
    Mode(ModeEvent),
    /// Spatial and attribute query outcomes
    Query(QueryEvent),
    /// Layer loading and styling
    Layer(LayerEvent),
    /// Buffer and route analysis
    Analysis(AnalysisEvent),
}

impl AppEvent {
    /// Get the category of this event
    pub fn category(&self) -> EventCategory {
        match self {
            AppEvent::Status(_) => EventCategory::Status,
            AppEvent::Mode(_) => EventCategory::Mode,
            AppEvent::Query(_) => EventCategory::Query,
            AppEvent::Layer(_) => EventCategory::Layer,
            AppEvent::Analysis(_) => EventCategory::Analysis,
        }
    }

    /// Get a short description of this event for logging
    pub fn description(&self) -> String {
        match self {
            AppEvent::Status(e) => e.description(),
            AppEvent::Mode(e) => e.description(),
            AppEvent::Query(e) => e.description(),
            AppEvent::Layer(e) => e.description(),
            AppEvent::Analysis(e) => e.description(),
        }
    }
}

/// Event category for filtering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventCategory {
    /// Status, tooltip and pointer readout events.
    Status,
    /// Mode transition events.
    Mode,
    /// Query outcome events.
    Query,
    /// Layer events.
    Layer,
    /// Analysis events.
    Analysis,
}

impl std::fmt::Display for EventCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EventCategory::Status => write!(f, "Status"),
            EventCategory::Mode => write!(f, "Mode"),
            EventCategory::Query => write!(f, "Query"),
            EventCategory::Layer => write!(f, "Layer"),
            EventCategory::Analysis => write!(f, "Analysis"),
        }
    }
}

/// Severity of a status message, used for coloring the toast
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum StatusLevel {
    /// Neutral information.
    #[default]
    Info,
    /// An operation completed.
    Success,
    /// Something needs attention but nothing failed.
    Warning,
    /// An operation failed.
    Error,
}

/// Status presenter events
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum StatusEvent {
    /// Toast message in the status area.
    Toast {
        /// Message text.
        text: String,
        /// Severity.
        level: StatusLevel,
    },
    /// Help text following the cursor; `position` of `None` hides it.
    Tooltip {
        /// Tooltip text.
        text: String,
        /// Map coordinate the tooltip is anchored to.
        position: Option<(f64, f64)>,
    },
    /// Pointer position readout in longitude/latitude.
    PointerPosition {
        /// Longitude in degrees.
        lon: f64,
        /// Latitude in degrees.
        lat: f64,
    },
    /// Cursor icon changed.
    Cursor {
        /// CSS-style cursor name.
        cursor: String,
    },
    /// Loading indicator visibility.
    Loading {
        /// Whether any layer is loading.
        active: bool,
    },
}

impl StatusEvent {
    /// Get a description of the event
    pub fn description(&self) -> String {
        match self {
            StatusEvent::Toast { text, level } => format!("{:?}: {}", level, text),
            StatusEvent::Tooltip { text, position } => match position {
                Some(_) => format!("Tooltip: {}", text),
                None => "Tooltip hidden".to_string(),
            },
            StatusEvent::PointerPosition { lon, lat } => {
                format!("Pointer at {:.4}, {:.4}", lon, lat)
            }
            StatusEvent::Cursor { cursor } => format!("Cursor: {}", cursor),
            StatusEvent::Loading { active } => {
                if *active {
                    "Loading".to_string()
                } else {
                    "Idle".to_string()
                }
            }
        }
    }
}

/// Mode coordinator events
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ModeEvent {
    /// A mode became current.
    Activated {
        /// Mode name.
        mode: String,
        /// Activation epoch after the transition.
        epoch: u64,
    },
    /// A mode stopped being current.
    Deactivated {
        /// Mode name.
        mode: String,
    },
    /// An async result arrived after its mode was left and was dropped.
    StaleResultDiscarded {
        /// What kind of task produced the result.
        task: String,
    },
}

impl ModeEvent {
    /// Get a description of the event
    pub fn description(&self) -> String {
        match self {
            ModeEvent::Activated { mode, epoch } => {
                format!("Mode {} active (epoch {})", mode, epoch)
            }
            ModeEvent::Deactivated { mode } => format!("Mode {} inactive", mode),
            ModeEvent::StaleResultDiscarded { task } => format!("Discarded stale {} result", task),
        }
    }
}

/// Query outcome events
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum QueryEvent {
    /// A click hit a feature.
    PointHit {
        /// Owning layer.
        layer_id: String,
        /// Feature identifier, if the service provided one.
        feature_id: Option<String>,
    },
    /// A click hit nothing.
    PointMiss,
    /// Raster point query returned text.
    RasterInfo {
        /// Queried raster layer.
        layer_id: String,
    },
    /// Box query finished.
    BoxCompleted {
        /// Total matched features.
        total: usize,
        /// Distinct layers with matches.
        layers: usize,
    },
    /// Attribute query finished.
    AttributeCompleted {
        /// Queried layer.
        layer_id: String,
        /// Number of matches.
        matches: usize,
    },
    /// A result set was cleared.
    Cleared {
        /// Name of the cleared highlight channel.
        channel: String,
    },
}

impl QueryEvent {
    /// Get a description of the event
    pub fn description(&self) -> String {
        match self {
            QueryEvent::PointHit { layer_id, .. } => format!("Hit feature in {}", layer_id),
            QueryEvent::PointMiss => "No feature under pointer".to_string(),
            QueryEvent::RasterInfo { layer_id } => format!("Raster info from {}", layer_id),
            QueryEvent::BoxCompleted { total, layers } => {
                format!("Box query: {} features in {} layers", total, layers)
            }
            QueryEvent::AttributeCompleted { layer_id, matches } => {
                format!("Attribute query on {}: {} matches", layer_id, matches)
            }
            QueryEvent::Cleared { channel } => format!("Cleared {}", channel),
        }
    }
}

/// Layer events
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum LayerEvent {
    /// Feature request sent.
    LoadStarted {
        /// Layer identifier.
        layer_id: String,
    },
    /// Feature request finished.
    LoadFinished {
        /// Layer identifier.
        layer_id: String,
        /// Features added by this request.
        added: usize,
    },
    /// Feature request failed.
    LoadFailed {
        /// Layer identifier.
        layer_id: String,
        /// Failure description.
        reason: String,
    },
    /// Visibility toggled.
    VisibilityChanged {
        /// Layer identifier.
        layer_id: String,
        /// New visibility.
        visible: bool,
    },
    /// Color or opacity changed.
    StyleChanged {
        /// Layer identifier.
        layer_id: String,
    },
}

impl LayerEvent {
    /// Get a description of the event
    pub fn description(&self) -> String {
        match self {
            LayerEvent::LoadStarted { layer_id } => format!("Loading {}", layer_id),
            LayerEvent::LoadFinished { layer_id, added } => {
                format!("Loaded {} features into {}", added, layer_id)
            }
            LayerEvent::LoadFailed { layer_id, reason } => {
                format!("Loading {} failed: {}", layer_id, reason)
            }
            LayerEvent::VisibilityChanged { layer_id, visible } => {
                format!("{} visible={}", layer_id, visible)
            }
            LayerEvent::StyleChanged { layer_id } => format!("{} restyled", layer_id),
        }
    }
}

/// Analysis events
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AnalysisEvent {
    /// Buffers produced.
    BufferCompleted {
        /// Source layer.
        layer_id: String,
        /// Number of buffer polygons.
        count: usize,
    },
    /// Buffer output cleared.
    BufferCleared,
    /// Route applied.
    RouteCompleted {
        /// Distance in kilometers.
        distance_km: f64,
        /// Duration in minutes.
        duration_min: u64,
    },
    /// Route request failed.
    RouteFailed {
        /// Failure description.
        reason: String,
    },
    /// Route and picked points cleared.
    RouteCleared,
}

impl AnalysisEvent {
    /// Get a description of the event
    pub fn description(&self) -> String {
        match self {
            AnalysisEvent::BufferCompleted { layer_id, count } => {
                format!("{} buffers around {}", count, layer_id)
            }
            AnalysisEvent::BufferCleared => "Buffers cleared".to_string(),
            AnalysisEvent::RouteCompleted {
                distance_km,
                duration_min,
            } => format!("Route {:.2} km, {} min", distance_km, duration_min),
            AnalysisEvent::RouteFailed { reason } => format!("Route failed: {}", reason),
            AnalysisEvent::RouteCleared => "Route cleared".to_string(),
        }
    }
}

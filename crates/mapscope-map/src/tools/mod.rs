//! Interactive tools.
//!
//! Exactly one [`InteractionMode`] is current at a time. The
//! [`ModeCoordinator`] owns the mode, its single pointer interaction and the
//! transient state of the tool (sketch, drag box, picked path points).

pub mod box_select;
pub mod coordinator;
pub mod draw;
pub mod measure;
pub mod path;

pub use box_select::{BoxSelect, BoxState};
pub use coordinator::{ModeCoordinator, ModeTicket, ToolSession};
pub use draw::{circle_polygon, DrawOverlay, DrawShape, DrawSketch, CIRCLE_SIDES};
pub use measure::{MeasureKind, MeasureOverlay, MeasureSketch, MeasuredFeature};
pub use path::{PathMarker, PathPicker, PathPointType, PathPoints};

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::surface::{Cursor, InteractionKind, SketchKind};

/// The pointer-driven behavior currently attached to the map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum InteractionMode {
    #[default]
    None,
    MeasureDistance,
    MeasureArea,
    DrawPoint,
    DrawLine,
    DrawPolygon,
    DrawCircle,
    QuerySingle,
    QueryBox,
    AttributeQuery,
    BufferAnalysis,
    PathAnalysis,
}

impl InteractionMode {
    /// Every mode, `None` first.
    pub const ALL: [InteractionMode; 12] = [
        InteractionMode::None,
        InteractionMode::MeasureDistance,
        InteractionMode::MeasureArea,
        InteractionMode::DrawPoint,
        InteractionMode::DrawLine,
        InteractionMode::DrawPolygon,
        InteractionMode::DrawCircle,
        InteractionMode::QuerySingle,
        InteractionMode::QueryBox,
        InteractionMode::AttributeQuery,
        InteractionMode::BufferAnalysis,
        InteractionMode::PathAnalysis,
    ];

    pub fn is_measure(self) -> bool {
        matches!(self, InteractionMode::MeasureDistance | InteractionMode::MeasureArea)
    }

    pub fn is_draw(self) -> bool {
        self.draw_shape().is_some()
    }

    /// Shape drawn by a draw mode.
    pub fn draw_shape(self) -> Option<DrawShape> {
        match self {
            InteractionMode::DrawPoint => Some(DrawShape::Point),
            InteractionMode::DrawLine => Some(DrawShape::Line),
            InteractionMode::DrawPolygon => Some(DrawShape::Polygon),
            InteractionMode::DrawCircle => Some(DrawShape::Circle),
            _ => None,
        }
    }

    /// Kind measured by a measure mode.
    pub fn measure_kind(self) -> Option<MeasureKind> {
        match self {
            InteractionMode::MeasureDistance => Some(MeasureKind::Distance),
            InteractionMode::MeasureArea => Some(MeasureKind::Area),
            _ => None,
        }
    }

    /// Pointer interaction the mode installs, if any.
    pub fn interaction(self) -> Option<InteractionKind> {
        match self {
            InteractionMode::MeasureDistance => {
                Some(InteractionKind::Sketch(SketchKind::LineString))
            }
            InteractionMode::MeasureArea => Some(InteractionKind::Sketch(SketchKind::Polygon)),
            InteractionMode::DrawPoint => Some(InteractionKind::Sketch(SketchKind::Point)),
            InteractionMode::DrawLine => Some(InteractionKind::Sketch(SketchKind::LineString)),
            InteractionMode::DrawPolygon => Some(InteractionKind::Sketch(SketchKind::Polygon)),
            InteractionMode::DrawCircle => Some(InteractionKind::Sketch(SketchKind::Circle)),
            InteractionMode::QuerySingle | InteractionMode::PathAnalysis => {
                Some(InteractionKind::Click)
            }
            InteractionMode::QueryBox => Some(InteractionKind::DragBox),
            InteractionMode::None
            | InteractionMode::AttributeQuery
            | InteractionMode::BufferAnalysis => None,
        }
    }

    /// Cursor set on activation.
    pub fn cursor(self) -> Cursor {
        match self {
            InteractionMode::None
            | InteractionMode::QuerySingle
            | InteractionMode::AttributeQuery
            | InteractionMode::BufferAnalysis => Cursor::Default,
            _ => Cursor::Crosshair,
        }
    }

    /// Status text shown on activation.
    pub fn status_text(self) -> &'static str {
        match self {
            InteractionMode::None => "Ready",
            InteractionMode::MeasureDistance => "Distance measurement active",
            InteractionMode::MeasureArea => "Area measurement active",
            InteractionMode::DrawPoint => "Draw point active, features accumulate",
            InteractionMode::DrawLine => "Draw line active, features accumulate",
            InteractionMode::DrawPolygon => "Draw polygon active, features accumulate",
            InteractionMode::DrawCircle => "Draw circle active, features accumulate",
            InteractionMode::QuerySingle => "Click a feature to inspect its attributes",
            InteractionMode::QueryBox => "Drag a box to select features",
            InteractionMode::AttributeQuery => "Attribute query: choose a layer and a field",
            InteractionMode::BufferAnalysis => "Buffer analysis: choose a layer and a distance",
            InteractionMode::PathAnalysis => "Path analysis: set the start point on the map",
        }
    }

    /// Help text following the cursor while the mode is current.
    pub fn help_text(self) -> Option<&'static str> {
        match self {
            InteractionMode::MeasureDistance => {
                Some("Click to add points for distance, double-click to finish")
            }
            InteractionMode::MeasureArea => {
                Some("Click to add points for area, double-click to finish")
            }
            InteractionMode::DrawPoint => Some("Click anywhere to add a point"),
            InteractionMode::DrawLine => {
                Some("Click to add vertices, double-click to finish | Esc cancels")
            }
            InteractionMode::DrawPolygon => {
                Some("Click to add vertices, double-click to close | Esc cancels")
            }
            InteractionMode::DrawCircle => {
                Some("Click the center, click again to set the radius | Esc cancels")
            }
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            InteractionMode::None => "None",
            InteractionMode::MeasureDistance => "MeasureDistance",
            InteractionMode::MeasureArea => "MeasureArea",
            InteractionMode::DrawPoint => "DrawPoint",
            InteractionMode::DrawLine => "DrawLine",
            InteractionMode::DrawPolygon => "DrawPolygon",
            InteractionMode::DrawCircle => "DrawCircle",
            InteractionMode::QuerySingle => "QuerySingle",
            InteractionMode::QueryBox => "QueryBox",
            InteractionMode::AttributeQuery => "AttributeQuery",
            InteractionMode::BufferAnalysis => "BufferAnalysis",
            InteractionMode::PathAnalysis => "PathAnalysis",
        }
    }
}

impl fmt::Display for InteractionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Toolbar buttons whose "active" styling follows the current mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolButton {
    MeasureDistance,
    MeasureArea,
    DrawPoint,
    DrawLine,
    DrawPolygon,
    DrawCircle,
    FeatureQuery,
    QuerySingle,
    QueryBox,
    AttributeQuery,
    BufferAnalysis,
    PathAnalysis,
}

impl ToolButton {
    pub const ALL: [ToolButton; 12] = [
        ToolButton::MeasureDistance,
        ToolButton::MeasureArea,
        ToolButton::DrawPoint,
        ToolButton::DrawLine,
        ToolButton::DrawPolygon,
        ToolButton::DrawCircle,
        ToolButton::FeatureQuery,
        ToolButton::QuerySingle,
        ToolButton::QueryBox,
        ToolButton::AttributeQuery,
        ToolButton::BufferAnalysis,
        ToolButton::PathAnalysis,
    ];

    /// True if the button is styled active while `mode` is current.
    pub fn is_active(self, mode: InteractionMode) -> bool {
        use InteractionMode as M;
        match self {
            ToolButton::MeasureDistance => mode == M::MeasureDistance,
            ToolButton::MeasureArea => mode == M::MeasureArea,
            ToolButton::DrawPoint => mode == M::DrawPoint,
            ToolButton::DrawLine => mode == M::DrawLine,
            ToolButton::DrawPolygon => mode == M::DrawPolygon,
            ToolButton::DrawCircle => mode == M::DrawCircle,
            ToolButton::FeatureQuery => matches!(mode, M::QuerySingle | M::QueryBox),
            ToolButton::QuerySingle => mode == M::QuerySingle,
            ToolButton::QueryBox => mode == M::QueryBox,
            ToolButton::AttributeQuery => mode == M::AttributeQuery,
            ToolButton::BufferAnalysis => mode == M::BufferAnalysis,
            ToolButton::PathAnalysis => mode == M::PathAnalysis,
        }
    }
}

/// Active/inactive styling of every toolbar button.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolbarState {
    active: Vec<ToolButton>,
}

impl ToolbarState {
    /// Derives the toolbar styling from the current mode.
    pub fn from_mode(mode: InteractionMode) -> Self {
        Self {
            active: ToolButton::ALL
                .into_iter()
                .filter(|b| b.is_active(mode))
                .collect(),
        }
    }

    pub fn is_active(&self, button: ToolButton) -> bool {
        self.active.contains(&button)
    }

    /// Active buttons in toolbar order.
    pub fn active(&self) -> &[ToolButton] {
        &self.active
    }
}

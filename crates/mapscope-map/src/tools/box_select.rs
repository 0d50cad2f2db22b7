//! Box selection sub-mode: `Idle -> Dragging -> Idle`.

use crate::extent::Extent;
use crate::viewport::{Pixel, Viewport};

/// Drag state of the box tool.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum BoxState {
    #[default]
    Idle,
    Dragging { start: Pixel, current: Pixel },
}

/// Tracks one rectangle drag.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoxSelect {
    state: BoxState,
}

impl BoxSelect {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> BoxState {
        self.state
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, BoxState::Dragging { .. })
    }

    /// Starts a drag, discarding any unfinished one.
    pub fn pointer_down(&mut self, at: Pixel) {
        self.state = BoxState::Dragging {
            start: at,
            current: at,
        };
    }

    /// Moves the free corner; ignored when idle.
    pub fn pointer_drag(&mut self, at: Pixel) {
        if let BoxState::Dragging { current, .. } = &mut self.state {
            *current = at;
        }
    }

    /// Ends the drag and returns the dragged corners, or `None` when no drag
    /// was in progress.
    pub fn pointer_up(&mut self, at: Pixel) -> Option<(Pixel, Pixel)> {
        match std::mem::take(&mut self.state) {
            BoxState::Dragging { start, .. } => Some((start, at)),
            BoxState::Idle => None,
        }
    }

    /// Rectangle being dragged, for drawing the rubber band.
    pub fn rectangle(&self) -> Option<(Pixel, Pixel)> {
        match self.state {
            BoxState::Dragging { start, current } => Some((start, current)),
            BoxState::Idle => None,
        }
    }

    pub fn cancel(&mut self) {
        self.state = BoxState::Idle;
    }
}

/// Converts two dragged pixel corners into a map extent.
pub fn pixels_to_extent(viewport: &Viewport, a: Pixel, b: Pixel) -> Extent {
    Extent::from_corners(viewport.pixel_to_coordinate(a), viewport.pixel_to_coordinate(b))
}

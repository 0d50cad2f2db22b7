//! Rendering surface abstraction.
//!
//! The viewer core never draws. It asks a [`MapSurface`] to install or remove
//! pointer interactions, to change the cursor and to show a new view. The
//! [`HeadlessSurface`] implementation records every call so the coordinator
//! can run without a display.

use parking_lot::Mutex;
use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;

use crate::viewport::Viewport;

/// What a sketch interaction draws.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SketchKind {
    Point,
    LineString,
    Polygon,
    Circle,
}

/// Pointer interaction installed on the surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InteractionKind {
    /// Single clicks are forwarded (feature picking, path points).
    Click,
    /// Rectangle dragging for box selection.
    DragBox,
    /// Vertex sketching for measure and draw tools.
    Sketch(SketchKind),
}

impl fmt::Display for InteractionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InteractionKind::Click => write!(f, "click"),
            InteractionKind::DragBox => write!(f, "drag-box"),
            InteractionKind::Sketch(kind) => write!(f, "sketch({:?})", kind),
        }
    }
}

/// Opaque handle of an installed interaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct InteractionHandle(u64);

impl InteractionHandle {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn id(&self) -> u64 {
        self.0
    }
}

/// Cursor icon over the map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Cursor {
    #[default]
    Default,
    Pointer,
    Crosshair,
}

impl Cursor {
    /// CSS cursor name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Cursor::Default => "default",
            Cursor::Pointer => "pointer",
            Cursor::Crosshair => "crosshair",
        }
    }
}

/// A map rendering surface.
pub trait MapSurface: Send {
    /// True once the surface has finished initializing.
    fn is_ready(&self) -> bool;

    /// Installs a pointer interaction.
    fn add_interaction(&mut self, kind: InteractionKind) -> InteractionHandle;

    /// Removes an interaction; false if the handle is unknown.
    fn remove_interaction(&mut self, handle: InteractionHandle) -> bool;

    /// Number of interactions currently installed.
    fn interaction_count(&self) -> usize;

    fn set_cursor(&mut self, cursor: Cursor);

    fn cursor(&self) -> Cursor;

    /// Called whenever the view changed and must be re-rendered.
    fn show_view(&mut self, viewport: &Viewport);
}

/// A call recorded by [`HeadlessSurface`].
#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceOp {
    Added(InteractionHandle, InteractionKind),
    Removed(InteractionHandle),
    Cursor(Cursor),
    View,
}

#[derive(Debug, Default)]
struct HeadlessState {
    ready: bool,
    next_handle: u64,
    installed: Vec<(InteractionHandle, InteractionKind)>,
    cursor: Cursor,
    last_view: Option<Viewport>,
    log: VecDeque<SurfaceOp>,
}

impl HeadlessState {
    fn record(&mut self, op: SurfaceOp) {
        if self.log.len() == HeadlessSurface::LOG_CAPACITY {
            self.log.pop_front();
        }
        self.log.push_back(op);
    }
}

/// In-process surface without a display.
///
/// Clones share state, so a test can keep one clone while the viewer owns
/// another.
#[derive(Debug, Clone, Default)]
pub struct HeadlessSurface {
    state: Arc<Mutex<HeadlessState>>,
}

impl HeadlessSurface {
    /// Calls kept in the log; older ones are dropped.
    pub const LOG_CAPACITY: usize = 1024;

    /// Creates a ready surface.
    pub fn new() -> Self {
        let surface = Self::default();
        surface.set_ready(true);
        surface
    }

    /// Creates a surface that is still initializing.
    pub fn not_ready() -> Self {
        Self::default()
    }

    pub fn set_ready(&self, ready: bool) {
        self.state.lock().ready = ready;
    }

    /// Installed interactions in installation order.
    pub fn installed(&self) -> Vec<(InteractionHandle, InteractionKind)> {
        self.state.lock().installed.clone()
    }

    /// The most recent recorded calls, oldest first.
    pub fn log(&self) -> Vec<SurfaceOp> {
        self.state.lock().log.iter().cloned().collect()
    }

    pub fn clear_log(&self) {
        self.state.lock().log.clear();
    }

    /// The last view shown.
    pub fn last_view(&self) -> Option<Viewport> {
        self.state.lock().last_view.clone()
    }
}

impl MapSurface for HeadlessSurface {
    fn is_ready(&self) -> bool {
        self.state.lock().ready
    }

    fn add_interaction(&mut self, kind: InteractionKind) -> InteractionHandle {
        let mut state = self.state.lock();
        state.next_handle += 1;
        let handle = InteractionHandle::new(state.next_handle);
        state.installed.push((handle, kind));
        state.record(SurfaceOp::Added(handle, kind));
        handle
    }

    fn remove_interaction(&mut self, handle: InteractionHandle) -> bool {
        let mut state = self.state.lock();
        let before = state.installed.len();
        state.installed.retain(|(h, _)| *h != handle);
        let removed = state.installed.len() != before;
        if removed {
            state.record(SurfaceOp::Removed(handle));
        }
        removed
    }

    fn interaction_count(&self) -> usize {
        self.state.lock().installed.len()
    }

    fn set_cursor(&mut self, cursor: Cursor) {
        let mut state = self.state.lock();
        if state.cursor != cursor {
            state.cursor = cursor;
            state.record(SurfaceOp::Cursor(cursor));
        }
    }

    fn cursor(&self) -> Cursor {
        self.state.lock().cursor
    }

    fn show_view(&mut self, viewport: &Viewport) {
        let mut state = self.state.lock();
        state.last_view = Some(viewport.clone());
        state.record(SurfaceOp::View);
    }
}

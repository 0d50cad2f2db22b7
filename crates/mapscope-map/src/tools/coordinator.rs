//! Mode coordinator.
//!
//! Owns the one exclusive interaction mode together with everything that
//! lives only while that mode is current: the installed pointer
//! interaction, the tool session, the query highlight channels and the
//! result panels. Analysis outputs are held elsewhere and survive every
//! transition here.
//!
//! A transition always runs in this order:
//!
//! ```text
//! remove old interaction -> reset cursor -> clear old mode's overlays
//!     -> install new interaction -> set cursor -> fresh session -> epoch + 1
//! ```

use mapscope_core::{AppEvent, EventBus, ModeEvent, NotReadyError, Result};
use std::sync::Arc;

use crate::highlight::{HighlightChannel, HighlightManager};
use crate::panels::{BoxResults, InfoPanel};
use crate::query::AttributeResults;
use crate::status::StatusPresenter;
use crate::surface::{Cursor, InteractionHandle, MapSurface};

use super::{
    BoxSelect, DrawOverlay, DrawSketch, InteractionMode, MeasureOverlay, MeasureSketch,
    PathPicker, PathPointType, ToolbarState,
};

/// Snapshot of an activation, taken when an async task is launched.
///
/// The task's result may only be applied while the ticket is current.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModeTicket {
    pub mode: InteractionMode,
    pub epoch: u64,
}

/// Transient per-activation state of the current tool.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum ToolSession {
    #[default]
    Idle,
    Measure(MeasureSketch),
    Draw(DrawSketch),
    BoxSelect(BoxSelect),
    Path(PathPicker),
}

impl ToolSession {
    fn for_mode(mode: InteractionMode, path_type: PathPointType) -> Self {
        if let Some(kind) = mode.measure_kind() {
            return ToolSession::Measure(MeasureSketch::new(kind));
        }
        if let Some(shape) = mode.draw_shape() {
            return ToolSession::Draw(DrawSketch::new(shape));
        }
        match mode {
            InteractionMode::QueryBox => ToolSession::BoxSelect(BoxSelect::new()),
            InteractionMode::PathAnalysis => {
                let mut picker = PathPicker::new();
                picker.set_current_type(path_type);
                ToolSession::Path(picker)
            }
            _ => ToolSession::Idle,
        }
    }
}

/// Single owner of the exclusive interaction mode.
pub struct ModeCoordinator {
    surface: Box<dyn MapSurface>,
    current: InteractionMode,
    epoch: u64,
    /// The one installed interaction; always removed before another is added.
    handler: Option<InteractionHandle>,
    session: ToolSession,
    path_type: PathPointType,
    highlights: HighlightManager,
    measures: MeasureOverlay,
    drawings: DrawOverlay,
    info: InfoPanel,
    box_results: BoxResults,
    attribute_results: AttributeResults,
    status: StatusPresenter,
}

impl ModeCoordinator {
    pub fn new(surface: Box<dyn MapSurface>, bus: Arc<EventBus>) -> Self {
        Self {
            surface,
            current: InteractionMode::None,
            epoch: 0,
            handler: None,
            session: ToolSession::Idle,
            path_type: PathPointType::default(),
            highlights: HighlightManager::new(),
            measures: MeasureOverlay::new(),
            drawings: DrawOverlay::new(),
            info: InfoPanel::Hidden,
            box_results: BoxResults::Hidden,
            attribute_results: AttributeResults::NotQueried,
            status: StatusPresenter::new(bus),
        }
    }

    pub fn current(&self) -> InteractionMode {
        self.current
    }

    /// Number of transitions so far.
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Ticket of the current activation.
    pub fn ticket(&self) -> ModeTicket {
        ModeTicket {
            mode: self.current,
            epoch: self.epoch,
        }
    }

    /// True while no transition happened since the ticket was taken.
    pub fn is_current(&self, ticket: &ModeTicket) -> bool {
        ticket.epoch == self.epoch && ticket.mode == self.current
    }

    /// Toolbar styling derived from the current mode.
    pub fn toolbar(&self) -> ToolbarState {
        ToolbarState::from_mode(self.current)
    }

    /// Makes `mode` current.
    ///
    /// Fails with [`NotReadyError::Surface`] before touching any state when
    /// the surface is still initializing. Activating the current mode again
    /// only refreshes the status text.
    pub fn activate(&mut self, mode: InteractionMode) -> Result<()> {
        if !self.surface.is_ready() {
            tracing::debug!("Activation of {} refused: surface not ready", mode);
            return Err(NotReadyError::Surface.into());
        }

        if mode == self.current {
            self.status.info(mode.status_text());
            return Ok(());
        }

        let previous = self.current;
        self.teardown(mode.is_draw());

        if let Some(kind) = mode.interaction() {
            self.handler = Some(self.surface.add_interaction(kind));
        }
        let cursor = mode.cursor();
        self.surface.set_cursor(cursor);
        self.status.cursor(cursor);
        self.session = ToolSession::for_mode(mode, self.path_type);
        self.current = mode;
        self.epoch += 1;

        tracing::debug!("Mode {} -> {} (epoch {})", previous, mode, self.epoch);
        self.status.info(mode.status_text());
        self.status.publish(AppEvent::Mode(ModeEvent::Activated {
            mode: mode.name().to_string(),
            epoch: self.epoch,
        }));
        Ok(())
    }

    /// Leaves the current mode, clearing its transient state.
    pub fn deactivate(&mut self) {
        self.leave(false);
    }

    /// Esc handling.
    ///
    /// In a draw mode the sketch is dropped and the tool is left while the
    /// drawn features stay. In a measure mode only the sketch is dropped; an
    /// unfinished box drag is abandoned. Returns false when Esc does nothing.
    pub fn cancel_on_escape(&mut self) -> bool {
        match &mut self.session {
            ToolSession::Draw(sketch) => {
                let shape = sketch.shape();
                sketch.cancel();
                self.leave(true);
                self.status.info(format!(
                    "Drawing {} cancelled, drawn features kept",
                    shape.name()
                ));
                true
            }
            ToolSession::Measure(sketch) if sketch.is_started() => {
                sketch.cancel();
                self.status.hide_tooltip();
                true
            }
            ToolSession::BoxSelect(tool) if tool.is_dragging() => {
                tool.cancel();
                true
            }
            _ => false,
        }
    }

    fn leave(&mut self, keep_drawings: bool) {
        if self.current == InteractionMode::None && self.handler.is_none() {
            if !keep_drawings {
                self.drawings.clear();
            }
            return;
        }
        let previous = self.current;
        self.teardown(keep_drawings);
        self.current = InteractionMode::None;
        self.epoch += 1;
        tracing::debug!("Mode {} -> None (epoch {})", previous, self.epoch);
    }

    /// Removes the installed interaction and clears the current mode's
    /// transient overlays. Analysis outputs are never touched.
    fn teardown(&mut self, keep_drawings: bool) {
        if let Some(handle) = self.handler.take() {
            if !self.surface.remove_interaction(handle) {
                tracing::warn!("Interaction {} was already gone", handle.id());
            }
        }
        self.surface.set_cursor(Cursor::Default);
        self.status.cursor(Cursor::Default);

        match self.current {
            InteractionMode::MeasureDistance | InteractionMode::MeasureArea => {
                self.measures.clear();
            }
            InteractionMode::QuerySingle => {
                self.highlights.clear(HighlightChannel::SingleQuery);
                self.info = InfoPanel::Hidden;
            }
            InteractionMode::QueryBox => {
                self.highlights.clear(HighlightChannel::BoxQuery);
                self.highlights.clear(HighlightChannel::SingleQuery);
                self.box_results = BoxResults::Hidden;
            }
            InteractionMode::AttributeQuery => {
                self.highlights.clear(HighlightChannel::AttributeQuery);
                self.attribute_results = AttributeResults::NotQueried;
            }
            _ => {}
        }
        if !keep_drawings {
            let removed = self.drawings.clear();
            if removed > 0 {
                tracing::debug!("Cleared {} drawn features", removed);
            }
        }

        self.session = ToolSession::Idle;
        self.status.hide_tooltip();
        if self.current != InteractionMode::None {
            self.status.publish(AppEvent::Mode(ModeEvent::Deactivated {
                mode: self.current.name().to_string(),
            }));
        }
    }

    /// Publishes that a late result was dropped.
    pub fn discard_stale(&self, task: &str, ticket: &ModeTicket) {
        tracing::debug!(
            "Discarding stale {} result from {} (epoch {}, now {})",
            task,
            ticket.mode,
            ticket.epoch,
            self.epoch
        );
        self.status.publish(AppEvent::Mode(ModeEvent::StaleResultDiscarded {
            task: task.to_string(),
        }));
    }

    pub fn session(&self) -> &ToolSession {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut ToolSession {
        &mut self.session
    }

    /// Point type the next path click sets. Kept across activations.
    pub fn path_point_type(&self) -> PathPointType {
        self.path_type
    }

    pub fn set_path_point_type(&mut self, kind: PathPointType) {
        self.path_type = kind;
        if let ToolSession::Path(picker) = &mut self.session {
            picker.set_current_type(kind);
        }
    }

    /// Path picker of the current PathAnalysis activation.
    pub fn path_picker(&self) -> Option<&PathPicker> {
        match &self.session {
            ToolSession::Path(picker) => Some(picker),
            _ => None,
        }
    }

    /// Drops the picked path points without leaving the mode.
    pub fn clear_path_points(&mut self) {
        if let ToolSession::Path(picker) = &mut self.session {
            picker.clear();
        }
    }

    /// Removes every measurement, including the one being sketched.
    pub fn clear_measurements(&mut self) -> usize {
        let count = self.measures.len();
        self.measures.clear();
        if let ToolSession::Measure(sketch) = &mut self.session {
            sketch.cancel();
        }
        count
    }

    /// Removes every drawn feature, including the one being sketched.
    pub fn clear_drawings(&mut self) -> usize {
        if let ToolSession::Draw(sketch) = &mut self.session {
            sketch.cancel();
        }
        self.drawings.clear()
    }

    pub fn highlights(&self) -> &HighlightManager {
        &self.highlights
    }

    pub fn highlights_mut(&mut self) -> &mut HighlightManager {
        &mut self.highlights
    }

    pub fn measures(&self) -> &MeasureOverlay {
        &self.measures
    }

    pub fn measures_mut(&mut self) -> &mut MeasureOverlay {
        &mut self.measures
    }

    pub fn drawings(&self) -> &DrawOverlay {
        &self.drawings
    }

    pub fn drawings_mut(&mut self) -> &mut DrawOverlay {
        &mut self.drawings
    }

    pub fn info(&self) -> &InfoPanel {
        &self.info
    }

    pub fn set_info(&mut self, info: InfoPanel) {
        self.info = info;
    }

    pub fn box_results(&self) -> &BoxResults {
        &self.box_results
    }

    pub fn set_box_results(&mut self, results: BoxResults) {
        self.box_results = results;
    }

    pub fn attribute_results(&self) -> &AttributeResults {
        &self.attribute_results
    }

    pub fn set_attribute_results(&mut self, results: AttributeResults) {
        self.attribute_results = results;
    }

    pub fn status(&self) -> &StatusPresenter {
        &self.status
    }

    pub fn status_mut(&mut self) -> &mut StatusPresenter {
        &mut self.status
    }

    pub fn surface(&self) -> &dyn MapSurface {
        self.surface.as_ref()
    }

    pub fn surface_mut(&mut self) -> &mut dyn MapSurface {
        self.surface.as_mut()
    }
}

impl std::fmt::Debug for ModeCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModeCoordinator")
            .field("current", &self.current)
            .field("epoch", &self.epoch)
            .field("handler", &self.handler)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feature::Feature;
    use crate::geometry::{Coordinate, Geometry};
    use crate::surface::{HeadlessSurface, InteractionKind, SketchKind, SurfaceOp};
    use crate::tools::DrawShape;
    use proptest::prelude::*;

    fn coordinator() -> (ModeCoordinator, HeadlessSurface) {
        let surface = HeadlessSurface::new();
        let coordinator =
            ModeCoordinator::new(Box::new(surface.clone()), Arc::new(EventBus::new()));
        (coordinator, surface)
    }

    fn point(x: f64) -> Feature {
        Feature::new(Geometry::Point(Coordinate::new(x, 0.0)))
    }

    #[test]
    fn test_not_ready_changes_nothing() {
        let surface = HeadlessSurface::not_ready();
        let mut coordinator =
            ModeCoordinator::new(Box::new(surface.clone()), Arc::new(EventBus::new()));
        let err = coordinator.activate(InteractionMode::QueryBox).unwrap_err();
        assert!(err.is_not_ready());
        assert_eq!(coordinator.current(), InteractionMode::None);
        assert_eq!(coordinator.epoch(), 0);
        assert!(surface.log().is_empty());

        surface.set_ready(true);
        coordinator.activate(InteractionMode::QueryBox).unwrap();
        assert_eq!(coordinator.current(), InteractionMode::QueryBox);
    }

    #[test]
    fn test_box_after_measure_removes_sketch_first() {
        let (mut coordinator, surface) = coordinator();
        coordinator.activate(InteractionMode::MeasureDistance).unwrap();
        if let ToolSession::Measure(sketch) = coordinator.session_mut() {
            sketch.add_vertex(Coordinate::new(0.0, 0.0));
        }
        surface.clear_log();

        coordinator.activate(InteractionMode::QueryBox).unwrap();

        let log = surface.log();
        let removed = log.iter().position(|op| matches!(op, SurfaceOp::Removed(_)));
        let added = log
            .iter()
            .position(|op| matches!(op, SurfaceOp::Added(_, InteractionKind::DragBox)));
        assert!(removed.unwrap() < added.unwrap());
        assert_eq!(surface.installed().len(), 1);
        assert!(matches!(coordinator.session(), ToolSession::BoxSelect(_)));
    }

    #[test]
    fn test_reactivation_is_noop() {
        let (mut coordinator, surface) = coordinator();
        coordinator.activate(InteractionMode::QueryBox).unwrap();
        let epoch = coordinator.epoch();
        let installed = surface.installed();

        coordinator.activate(InteractionMode::QueryBox).unwrap();
        assert_eq!(coordinator.epoch(), epoch);
        assert_eq!(surface.installed(), installed);
    }

    #[test]
    fn test_ticket_goes_stale_on_switch() {
        let (mut coordinator, _) = coordinator();
        coordinator.activate(InteractionMode::QuerySingle).unwrap();
        let ticket = coordinator.ticket();
        assert!(coordinator.is_current(&ticket));

        coordinator.activate(InteractionMode::QueryBox).unwrap();
        coordinator.activate(InteractionMode::QuerySingle).unwrap();
        assert!(!coordinator.is_current(&ticket));
    }

    #[test]
    fn test_leaving_query_clears_its_channel_only() {
        let (mut coordinator, _) = coordinator();
        coordinator.activate(InteractionMode::QuerySingle).unwrap();
        coordinator
            .highlights_mut()
            .set(HighlightChannel::SingleQuery, &[point(1.0)]);
        coordinator
            .highlights_mut()
            .set(HighlightChannel::Analysis, &[point(2.0)]);

        coordinator.activate(InteractionMode::MeasureArea).unwrap();
        assert!(coordinator.highlights().is_empty(HighlightChannel::SingleQuery));
        assert_eq!(coordinator.highlights().len(HighlightChannel::Analysis), 1);
    }

    #[test]
    fn test_draw_history_rules() {
        let (mut coordinator, surface) = coordinator();
        coordinator.activate(InteractionMode::DrawPoint).unwrap();
        coordinator
            .drawings_mut()
            .add(DrawShape::Point, Geometry::Point(Coordinate::new(0.0, 0.0)));

        // Switching between draw tools keeps what was drawn.
        coordinator.activate(InteractionMode::DrawLine).unwrap();
        assert_eq!(coordinator.drawings().len(), 1);
        assert_eq!(
            surface.installed()[0].1,
            InteractionKind::Sketch(SketchKind::LineString)
        );

        // Esc leaves the tool but keeps the history.
        assert!(coordinator.cancel_on_escape());
        assert_eq!(coordinator.current(), InteractionMode::None);
        assert_eq!(coordinator.drawings().len(), 1);
        assert!(surface.installed().is_empty());

        // Any non-draw tool clears it.
        coordinator.activate(InteractionMode::QuerySingle).unwrap();
        assert!(coordinator.drawings().is_empty());
    }

    #[test]
    fn test_path_points_cleared_on_leave_type_kept() {
        let (mut coordinator, _) = coordinator();
        coordinator.activate(InteractionMode::PathAnalysis).unwrap();
        coordinator.set_path_point_type(PathPointType::Waypoint);
        if let ToolSession::Path(picker) = coordinator.session_mut() {
            picker.pick(crate::projection::LonLat::new(116.0, 40.0));
        }
        coordinator.deactivate();
        assert!(coordinator.path_picker().is_none());

        coordinator.activate(InteractionMode::PathAnalysis).unwrap();
        let picker = coordinator.path_picker().unwrap();
        assert!(picker.points().is_empty());
        assert_eq!(picker.current_type(), PathPointType::Waypoint);
    }

    #[test]
    fn test_toolbar_after_transitions() {
        let (mut coordinator, _) = coordinator();
        coordinator.activate(InteractionMode::QuerySingle).unwrap();
        assert_eq!(coordinator.toolbar(), ToolbarState::from_mode(InteractionMode::QuerySingle));
        coordinator.deactivate();
        assert!(coordinator.toolbar().active().is_empty());
    }

    proptest! {
        #[test]
        fn prop_one_interaction_at_most(steps in prop::collection::vec(0usize..13, 0..40)) {
            let (mut coordinator, surface) = coordinator();
            for step in steps {
                match InteractionMode::ALL.get(step) {
                    Some(mode) => coordinator.activate(*mode).unwrap(),
                    None => coordinator.deactivate(),
                }
                let expected = usize::from(coordinator.current().interaction().is_some());
                prop_assert_eq!(surface.interaction_count(), expected);
                prop_assert!(surface.interaction_count() <= 1);
            }
        }
    }
}

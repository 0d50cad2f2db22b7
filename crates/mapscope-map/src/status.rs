//! Tooltip and status presenter.
//!
//! Every message goes out as an [`AppEvent`] on the viewer's event bus. The
//! presenter keeps only what is on screen right now so callers (and tests)
//! can read it back.

use mapscope_core::{AppEvent, EventBus, StatusEvent, StatusLevel};
use std::sync::Arc;

use crate::geometry::Coordinate;
use crate::projection::LonLat;
use crate::surface::Cursor;

/// A toast currently shown.
#[derive(Debug, Clone, PartialEq)]
pub struct Toast {
    pub text: String,
    pub level: StatusLevel,
}

/// The cursor tooltip currently shown.
#[derive(Debug, Clone, PartialEq)]
pub struct Tooltip {
    pub text: String,
    pub position: Coordinate,
}

/// What the presenter displays.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatusDisplay {
    pub toast: Option<Toast>,
    pub tooltip: Option<Tooltip>,
    /// Pointer readout, `"lon, lat"` with four decimals.
    pub pointer: Option<String>,
    pub cursor: Cursor,
    pub loading: bool,
}

/// Publishes status events and remembers the displayed state.
#[derive(Debug, Clone)]
pub struct StatusPresenter {
    bus: Arc<EventBus>,
    display: StatusDisplay,
}

impl StatusPresenter {
    pub fn new(bus: Arc<EventBus>) -> Self {
        Self {
            bus,
            display: StatusDisplay::default(),
        }
    }

    pub fn bus(&self) -> &Arc<EventBus> {
        &self.bus
    }

    pub fn display(&self) -> &StatusDisplay {
        &self.display
    }

    /// Publishes any event on the viewer bus.
    pub fn publish(&self, event: AppEvent) {
        self.bus.publish(event);
    }

    pub fn toast(&mut self, text: impl Into<String>, level: StatusLevel) {
        let text = text.into();
        match level {
            StatusLevel::Error => tracing::warn!("{}", text),
            _ => tracing::debug!("status: {}", text),
        }
        self.display.toast = Some(Toast {
            text: text.clone(),
            level,
        });
        self.publish(AppEvent::Status(StatusEvent::Toast { text, level }));
    }

    pub fn info(&mut self, text: impl Into<String>) {
        self.toast(text, StatusLevel::Info);
    }

    pub fn success(&mut self, text: impl Into<String>) {
        self.toast(text, StatusLevel::Success);
    }

    pub fn warning(&mut self, text: impl Into<String>) {
        self.toast(text, StatusLevel::Warning);
    }

    pub fn error(&mut self, text: impl Into<String>) {
        self.toast(text, StatusLevel::Error);
    }

    /// Shows help text anchored at a map coordinate.
    pub fn show_tooltip(&mut self, text: impl Into<String>, position: Coordinate) {
        let text = text.into();
        if self
            .display
            .tooltip
            .as_ref()
            .is_some_and(|t| t.text == text && t.position == position)
        {
            return;
        }
        self.display.tooltip = Some(Tooltip {
            text: text.clone(),
            position,
        });
        self.publish(AppEvent::Status(StatusEvent::Tooltip {
            text,
            position: Some((position.x, position.y)),
        }));
    }

    pub fn hide_tooltip(&mut self) {
        if self.display.tooltip.take().is_some() {
            self.publish(AppEvent::Status(StatusEvent::Tooltip {
                text: String::new(),
                position: None,
            }));
        }
    }

    /// Updates the pointer position readout.
    pub fn pointer_position(&mut self, position: LonLat) {
        self.display.pointer = Some(position.to_string());
        self.publish(AppEvent::Status(StatusEvent::PointerPosition {
            lon: position.lon,
            lat: position.lat,
        }));
    }

    /// Records a cursor change; unchanged cursors publish nothing.
    pub fn cursor(&mut self, cursor: Cursor) {
        if self.display.cursor != cursor {
            self.display.cursor = cursor;
            self.publish(AppEvent::Status(StatusEvent::Cursor {
                cursor: cursor.as_str().to_string(),
            }));
        }
    }

    pub fn loading(&mut self, active: bool) {
        if self.display.loading != active {
            self.display.loading = active;
            self.publish(AppEvent::Status(StatusEvent::Loading { active }));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mapscope_core::{EventCategory, EventFilter};
    use parking_lot::Mutex;

    fn presenter_with_log() -> (StatusPresenter, Arc<Mutex<Vec<AppEvent>>>) {
        let bus = Arc::new(EventBus::new());
        let log = Arc::new(Mutex::new(Vec::new()));
        let sink = log.clone();
        bus.subscribe(EventFilter::Categories(vec![EventCategory::Status]), move |e| {
            sink.lock().push(e.clone())
        });
        (StatusPresenter::new(bus), log)
    }

    #[test]
    fn test_toast_is_published_and_remembered() {
        let (mut presenter, log) = presenter_with_log();
        presenter.success("Found 3 features");
        assert_eq!(
            presenter.display().toast,
            Some(Toast {
                text: "Found 3 features".to_string(),
                level: StatusLevel::Success
            })
        );
        assert_eq!(log.lock().len(), 1);
    }

    #[test]
    fn test_tooltip_hide_only_when_shown() {
        let (mut presenter, log) = presenter_with_log();
        presenter.hide_tooltip();
        assert!(log.lock().is_empty());

        presenter.show_tooltip("Click to add a point", Coordinate::new(1.0, 2.0));
        presenter.show_tooltip("Click to add a point", Coordinate::new(1.0, 2.0));
        presenter.hide_tooltip();
        assert_eq!(log.lock().len(), 2);
        assert!(presenter.display().tooltip.is_none());
    }

    #[test]
    fn test_pointer_readout() {
        let (mut presenter, _log) = presenter_with_log();
        presenter.pointer_position(LonLat::new(116.40391, 39.91488));
        assert_eq!(presenter.display().pointer.as_deref(), Some("116.4039, 39.9149"));
    }
}

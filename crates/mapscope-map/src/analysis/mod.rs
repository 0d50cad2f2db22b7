//! Non-exclusive analysis outputs.
//!
//! Buffer polygons and the computed route live here, outside the mode
//! coordinator, so switching tools never removes them. Each has its own
//! explicit clear action.

pub mod buffer;
pub mod route;

pub use buffer::{BufferOutput, BufferRequest};
pub use route::{
    route_arrows, PendingRoute, RouteArrow, RouteOutput, RouteRequest, RouteResponse,
    ARROW_INTERVAL,
};

use crate::feature::Feature;

/// What happened to the result of an async task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskOutcome {
    /// The launching activation was still current; the result is shown.
    Applied,
    /// The operator moved on; the result was dropped.
    Discarded,
}

/// Persisted analysis outputs.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnalysisState {
    buffer: Option<BufferOutput>,
    route: Option<RouteOutput>,
}

impl AnalysisState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn buffer(&self) -> Option<&BufferOutput> {
        self.buffer.as_ref()
    }

    /// Replaces the previous buffer output.
    pub fn set_buffer(&mut self, output: BufferOutput) {
        self.buffer = Some(output);
    }

    /// Returns true if there was something to clear.
    pub fn clear_buffer(&mut self) -> bool {
        self.buffer.take().is_some()
    }

    pub fn route(&self) -> Option<&RouteOutput> {
        self.route.as_ref()
    }

    pub fn set_route(&mut self, output: RouteOutput) {
        self.route = Some(output);
    }

    pub fn clear_route(&mut self) -> bool {
        self.route.take().is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_none() && self.route.is_none()
    }

    /// Content of the analysis highlight channel: buffers, then the route.
    pub fn features(&self) -> Vec<Feature> {
        let mut features: Vec<Feature> = self
            .buffer
            .iter()
            .flat_map(|b| b.features.iter().cloned())
            .collect();
        if let Some(route) = &self.route {
            features.push(
                Feature::new(route.geometry.clone())
                    .with_id("route")
                    .with_attribute("distance_km", route.distance_km)
                    .with_attribute("duration_min", route.duration_min),
            );
        }
        features
    }
}

//! Buffer and route analysis.
//!
//! Outputs land in [`AnalysisState`](crate::analysis::AnalysisState) and the
//! analysis highlight channel. Neither is touched by mode transitions.

use mapscope_core::{AnalysisEvent, AppEvent, Result, ServiceError};

use super::MapViewer;
use crate::analysis::{
    BufferRequest, PendingRoute, RouteOutput, RouteRequest, RouteResponse, TaskOutcome,
};
use crate::services::RoutingService;
use crate::tools::{PathPoints, PathPointType};

impl MapViewer {
    /// Buffers every loaded feature of a layer and replaces the previous
    /// buffer output.
    pub fn run_buffer(&mut self, request: &BufferRequest) -> Result<usize> {
        let output = match request.execute(&self.layers, self.engine.as_ref()) {
            Ok(output) => output,
            Err(e) => {
                self.coordinator.status_mut().error(e.to_string());
                return Err(e.into());
            }
        };

        let count = output.features.len();
        let failed = output.failed;
        let layer_id = output.layer_id.clone();
        let extent = output.extent();
        self.analysis.set_buffer(output);
        self.refresh_analysis_channel();
        self.fit_result(&extent);

        let status = self.coordinator.status_mut();
        if failed == 0 {
            status.success(format!("Created {} buffers", count));
        } else {
            status.warning(format!("Created {} buffers, {} features failed", count, failed));
        }
        self.publish(AppEvent::Analysis(AnalysisEvent::BufferCompleted {
            layer_id,
            count,
        }));
        Ok(count)
    }

    /// Removes the buffer output.
    pub fn clear_buffer(&mut self) {
        if self.analysis.clear_buffer() {
            self.refresh_analysis_channel();
        }
        self.coordinator.status_mut().info("Buffer results cleared");
        self.publish(AppEvent::Analysis(AnalysisEvent::BufferCleared));
    }

    /// Selects which path point the next click sets.
    pub fn set_path_point_type(&mut self, kind: PathPointType) {
        self.coordinator.set_path_point_type(kind);
        let text = match kind {
            PathPointType::Start => "Click the map to set the start point",
            PathPointType::End => "Click the map to set the end point",
            PathPointType::Waypoint => "Click the map to add a waypoint",
            PathPointType::Barrier => "Click the map to mark a barrier",
        };
        self.coordinator.status_mut().info(text);
    }

    /// Points picked in the current PathAnalysis activation.
    pub fn path_points(&self) -> Option<&PathPoints> {
        self.coordinator.path_picker().map(|p| p.points())
    }

    /// Builds a route request from the picked points and ties it to the
    /// current activation.
    ///
    /// Outside PathAnalysis nothing is picked, so this fails like a route
    /// without a start point.
    pub fn prepare_route(&mut self) -> Result<PendingRoute> {
        let empty = PathPoints::default();
        let points = self.path_points().unwrap_or(&empty).route_points();
        match points {
            Ok(points) => {
                tracing::debug!("Route request through {} points", points.len());
                self.coordinator.status_mut().info("Calculating route...");
                Ok(PendingRoute {
                    ticket: self.coordinator.ticket(),
                    request: RouteRequest { points },
                })
            }
            Err(e) => {
                self.coordinator.status_mut().error(e.to_string());
                Err(e.into())
            }
        }
    }

    /// Applies a routing answer if its activation is still current.
    pub fn complete_route(
        &mut self,
        pending: PendingRoute,
        response: std::result::Result<RouteResponse, ServiceError>,
    ) -> TaskOutcome {
        if !self.coordinator.is_current(&pending.ticket) {
            self.coordinator.discard_stale("route", &pending.ticket);
            return TaskOutcome::Discarded;
        }
        match response {
            Ok(response) => {
                let output = RouteOutput::from_response(&response);
                let (distance_km, duration_min) = (output.distance_km, output.duration_min);
                let extent = output.geometry.extent();
                self.analysis.set_route(output);
                self.refresh_analysis_channel();
                self.fit_result(&extent);
                tracing::info!("Route: {} km, {} min", distance_km, duration_min);
                self.coordinator.status_mut().success(format!(
                    "Route: {} km, about {} min",
                    distance_km, duration_min
                ));
                self.publish(AppEvent::Analysis(AnalysisEvent::RouteCompleted {
                    distance_km,
                    duration_min,
                }));
            }
            Err(e) => {
                tracing::warn!("Route request failed: {}", e);
                self.coordinator
                    .status_mut()
                    .error(format!("Route calculation failed: {}", e));
                self.publish(AppEvent::Analysis(AnalysisEvent::RouteFailed {
                    reason: e.to_string(),
                }));
            }
        }
        TaskOutcome::Applied
    }

    /// Prepares, sends and completes a route request.
    ///
    /// The viewer is borrowed across the request, so the route always
    /// applies. Front ends that keep handling input use
    /// [`prepare_route`](Self::prepare_route) and
    /// [`complete_route`](Self::complete_route), which drop answers that
    /// arrive after a mode change.
    pub async fn request_route(&mut self, service: &dyn RoutingService) -> Result<TaskOutcome> {
        let pending = self.prepare_route()?;
        let response = service.route(&pending.request).await;
        Ok(self.complete_route(pending, response))
    }

    /// Removes the computed route and the picked points.
    pub fn clear_route(&mut self) {
        if self.analysis.clear_route() {
            self.refresh_analysis_channel();
        }
        self.coordinator.clear_path_points();
        self.coordinator.status_mut().info("Route cleared");
        self.publish(AppEvent::Analysis(AnalysisEvent::RouteCleared));
    }
}

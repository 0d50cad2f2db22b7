//! Route point picking for path analysis.

use mapscope_core::ValidationError;
use serde::{Deserialize, Serialize};

use crate::projection::LonLat;

/// Which path point a map click sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PathPointType {
    #[default]
    Start,
    End,
    Waypoint,
    Barrier,
}

/// Picked route points in longitude/latitude.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PathPoints {
    pub start: Option<LonLat>,
    pub end: Option<LonLat>,
    pub waypoints: Vec<LonLat>,
    /// Recorded for display; never sent to the routing service.
    pub barriers: Vec<LonLat>,
}

impl PathPoints {
    /// Stores a point: start and end replace, waypoints and barriers append.
    pub fn set(&mut self, kind: PathPointType, point: LonLat) {
        match kind {
            PathPointType::Start => self.start = Some(point),
            PathPointType::End => self.end = Some(point),
            PathPointType::Waypoint => self.waypoints.push(point),
            PathPointType::Barrier => self.barriers.push(point),
        }
    }

    /// Ordered points to route through: start, waypoints, end.
    pub fn route_points(&self) -> Result<Vec<LonLat>, ValidationError> {
        let start = self.start.ok_or_else(|| ValidationError::MissingRouteEndpoint {
            endpoint: "start".to_string(),
        })?;
        let end = self.end.ok_or_else(|| ValidationError::MissingRouteEndpoint {
            endpoint: "end".to_string(),
        })?;
        let mut points = Vec::with_capacity(self.waypoints.len() + 2);
        points.push(start);
        points.extend(self.waypoints.iter().copied());
        points.push(end);
        Ok(points)
    }

    pub fn is_empty(&self) -> bool {
        self.start.is_none()
            && self.end.is_none()
            && self.waypoints.is_empty()
            && self.barriers.is_empty()
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

/// A labelled marker drawn for a picked point.
#[derive(Debug, Clone, PartialEq)]
pub struct PathMarker {
    pub kind: PathPointType,
    pub position: LonLat,
    /// `S`, `E`, waypoint number, or `X` for barriers.
    pub label: String,
}

/// Path analysis picking state: the points plus the selected point type.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PathPicker {
    points: PathPoints,
    current: PathPointType,
    markers: Vec<PathMarker>,
}

impl PathPicker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn points(&self) -> &PathPoints {
        &self.points
    }

    pub fn current_type(&self) -> PathPointType {
        self.current
    }

    pub fn set_current_type(&mut self, kind: PathPointType) {
        self.current = kind;
    }

    /// Handles a map click according to the selected point type.
    pub fn pick(&mut self, point: LonLat) -> PathPointType {
        let kind = self.current;
        self.points.set(kind, point);
        let label = match kind {
            PathPointType::Start => "S".to_string(),
            PathPointType::End => "E".to_string(),
            PathPointType::Waypoint => self.points.waypoints.len().to_string(),
            PathPointType::Barrier => "X".to_string(),
        };
        self.markers.push(PathMarker {
            kind,
            position: point,
            label,
        });
        kind
    }

    /// Every marker placed, oldest first.
    pub fn markers(&self) -> &[PathMarker] {
        &self.markers
    }

    /// Clears points and markers; the selected type is kept.
    pub fn clear(&mut self) {
        self.points.clear();
        self.markers.clear();
    }
}

//! Remote collaborators the viewer depends on.
//!
//! Implementations live outside this crate (HTTP in `mapscope-services`,
//! fakes in tests). Every call returns a `ServiceError` on failure; the
//! viewer turns failures into status messages and never retries.

use async_trait::async_trait;
use mapscope_core::ServiceError;

use crate::analysis::{RouteRequest, RouteResponse};
use crate::extent::Extent;
use crate::feature::Feature;
use crate::geometry::Coordinate;

/// Source of vector features.
#[async_trait]
pub trait FeatureService: Send + Sync {
    /// Fetches the features of a remote type name inside `extent` (map
    /// units). Features are returned in map units.
    async fn fetch_features(
        &self,
        type_name: &str,
        extent: &Extent,
    ) -> Result<Vec<Feature>, ServiceError>;
}

/// Driving routes between ordered points.
#[async_trait]
pub trait RoutingService: Send + Sync {
    async fn route(&self, request: &RouteRequest) -> Result<RouteResponse, ServiceError>;
}

/// Parameters of a raster point query.
#[derive(Debug, Clone, PartialEq)]
pub struct RasterInfoRequest {
    pub layer_id: String,
    /// Service endpoint.
    pub url: String,
    /// Qualified layer name.
    pub layer_name: String,
    /// Clicked position in map units.
    pub coordinate: Coordinate,
    /// Map units per pixel at click time.
    pub resolution: f64,
}

/// Point queries against raster overlays.
#[async_trait]
pub trait RasterInfoService: Send + Sync {
    /// Plain text describing the pixel; empty when nothing is there.
    async fn feature_info(&self, request: &RasterInfoRequest) -> Result<String, ServiceError>;
}

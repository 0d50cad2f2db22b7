//! # MapScope Services
//!
//! HTTP implementations of the viewer's remote collaborators:
//!
//! - **WFS**: vector features per layer and extent (GeoJSON)
//! - **OSRM**: driving routes through ordered points
//! - **WMS**: `GetFeatureInfo` text for raster point queries
//!
//! Requests are blocking `ureq` calls moved onto the tokio blocking pool.
//! URL builders and response parsers are public so they can be tested
//! without a network.

pub mod http;
pub mod osrm;
pub mod wfs;
pub mod wms;

pub use http::{HttpClient, DEFAULT_TIMEOUT};
pub use osrm::{OsrmRoutingService, DEFAULT_ROUTING_URL};
pub use wfs::WfsFeatureService;
pub use wms::WmsRasterInfoService;

use std::time::Duration;

/// The three HTTP collaborators sharing one client.
#[derive(Debug, Clone)]
pub struct HttpServices {
    pub features: WfsFeatureService,
    pub routing: OsrmRoutingService,
    pub raster: WmsRasterInfoService,
}

impl HttpServices {
    pub fn new(wfs_url: &str, routing_url: &str, timeout: Duration) -> Self {
        let client = HttpClient::new(timeout);
        Self {
            features: WfsFeatureService::new(client.clone(), wfs_url),
            routing: OsrmRoutingService::new(client.clone(), routing_url),
            raster: WmsRasterInfoService::new(client),
        }
    }
}

//! WFS feature service.
//!
//! Issues WFS 1.1.0 `GetFeature` requests for one extent at a time and reads
//! the GeoJSON answer. Features arrive in Web Mercator, the map projection.

use async_trait::async_trait;
use mapscope_core::ServiceError;
use mapscope_map::{Extent, Feature, FeatureService};
use serde_json::Value;

use crate::http::{join_numbers, run_blocking, HttpClient};

const SERVICE: &str = "wfs";

/// Builds the `GetFeature` URL for a type name and map extent.
pub fn get_feature_url(base_url: &str, type_name: &str, extent: &Extent) -> String {
    let bbox = join_numbers(&[extent.min_x, extent.min_y, extent.max_x, extent.max_y]);
    format!(
        "{}?service=WFS&version=1.1.0&request=GetFeature&typeName={}\
         &outputFormat=application/json&srsname=EPSG:3857&bbox={},EPSG:3857",
        base_url, type_name, bbox
    )
}

/// Reads the features of a GeoJSON `FeatureCollection`.
///
/// Features with an unreadable geometry are skipped with a warning; a body
/// that is not a feature collection is an error.
pub fn parse_feature_collection(body: &Value) -> Result<Vec<Feature>, ServiceError> {
    let Some(features) = body.get("features").and_then(Value::as_array) else {
        return Err(ServiceError::InvalidResponse {
            service: SERVICE.to_string(),
            reason: "missing features array".to_string(),
        });
    };
    let mut parsed = Vec::with_capacity(features.len());
    for value in features {
        match Feature::from_geojson(value) {
            Ok(feature) => parsed.push(feature),
            Err(e) => tracing::warn!("Skipping unreadable feature: {}", e),
        }
    }
    Ok(parsed)
}

/// GeoServer-style WFS endpoint.
#[derive(Debug, Clone)]
pub struct WfsFeatureService {
    client: HttpClient,
    base_url: String,
}

impl WfsFeatureService {
    pub fn new(client: HttpClient, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl FeatureService for WfsFeatureService {
    async fn fetch_features(
        &self,
        type_name: &str,
        extent: &Extent,
    ) -> Result<Vec<Feature>, ServiceError> {
        let url = get_feature_url(&self.base_url, type_name, extent);
        let client = self.client.clone();
        let body = run_blocking(SERVICE, move || client.get_json(SERVICE, &url)).await?;
        let features = parse_feature_collection(&body)?;
        tracing::info!("WFS {}: {} features", type_name, features.len());
        Ok(features)
    }
}

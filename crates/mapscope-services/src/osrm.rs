//! OSRM routing service.

use async_trait::async_trait;
use mapscope_core::ServiceError;
use mapscope_map::{Geometry, RouteRequest, RouteResponse, RoutingService};
use serde::Deserialize;
use serde_json::Value;

use crate::http::{run_blocking, HttpClient};

const SERVICE: &str = "routing";

/// Public OSRM demo server.
pub const DEFAULT_ROUTING_URL: &str = "https://router.project-osrm.org";

/// Builds a driving route URL through `request.points` in order.
pub fn route_url(base_url: &str, request: &RouteRequest) -> String {
    let points = request
        .points
        .iter()
        .map(|p| format!("{},{}", p.lon, p.lat))
        .collect::<Vec<_>>()
        .join(";");
    format!(
        "{}/route/v1/driving/{}?overview=full&geometries=geojson",
        base_url.trim_end_matches('/'),
        points
    )
}

#[derive(Debug, Deserialize)]
struct OsrmRoute {
    geometry: Value,
    distance: f64,
    duration: f64,
}

#[derive(Debug, Deserialize)]
struct OsrmAnswer {
    code: String,
    #[serde(default)]
    routes: Vec<OsrmRoute>,
}

/// Reads the first route of an OSRM answer. Any `code` other than `Ok` is a
/// rejection.
pub fn parse_route(body: Value) -> Result<RouteResponse, ServiceError> {
    let invalid = |reason: String| ServiceError::InvalidResponse {
        service: SERVICE.to_string(),
        reason,
    };
    let answer: OsrmAnswer = serde_json::from_value(body).map_err(|e| invalid(e.to_string()))?;
    if answer.code != "Ok" {
        return Err(ServiceError::Rejected {
            service: SERVICE.to_string(),
            code: answer.code,
        });
    }
    let route = answer
        .routes
        .into_iter()
        .next()
        .ok_or_else(|| invalid("no route in answer".to_string()))?;
    let geometry = Geometry::from_geojson(&route.geometry).map_err(|e| invalid(e.to_string()))?;
    Ok(RouteResponse {
        geometry,
        distance_m: route.distance,
        duration_s: route.duration,
    })
}

/// OSRM HTTP endpoint.
#[derive(Debug, Clone)]
pub struct OsrmRoutingService {
    client: HttpClient,
    base_url: String,
}

impl OsrmRoutingService {
    pub fn new(client: HttpClient, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl RoutingService for OsrmRoutingService {
    async fn route(&self, request: &RouteRequest) -> Result<RouteResponse, ServiceError> {
        let url = route_url(&self.base_url, request);
        let client = self.client.clone();
        let body = run_blocking(SERVICE, move || client.get_json(SERVICE, &url)).await?;
        parse_route(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mapscope_map::LonLat;
    use serde_json::json;

    #[test]
    fn test_route_url_orders_points() {
        let request = RouteRequest {
            points: vec![
                LonLat::new(116.3, 39.9),
                LonLat::new(116.35, 39.92),
                LonLat::new(116.4, 39.95),
            ],
        };
        assert_eq!(
            route_url("https://router.project-osrm.org/", &request),
            "https://router.project-osrm.org/route/v1/driving/116.3,39.9;116.35,39.92;116.4,39.95\
             ?overview=full&geometries=geojson"
        );
    }

    #[test]
    fn test_parse_ok_answer() {
        let body = json!({
            "code": "Ok",
            "routes": [{
                "geometry": {"type": "LineString", "coordinates": [[116.3, 39.9], [116.4, 39.95]]},
                "distance": 12345.6,
                "duration": 901.2
            }],
            "waypoints": []
        });
        let response = parse_route(body).unwrap();
        assert_eq!(response.distance_m, 12345.6);
        assert!(matches!(response.geometry, Geometry::LineString(ref c) if c.len() == 2));
    }

    #[test]
    fn test_parse_rejection() {
        let err =
            parse_route(json!({"code": "NoRoute", "message": "Impossible route"})).unwrap_err();
        assert_eq!(
            err,
            ServiceError::Rejected {
                service: "routing".to_string(),
                code: "NoRoute".to_string(),
            }
        );
        let err = parse_route(json!({"routes": []})).unwrap_err();
        assert!(matches!(err, ServiceError::InvalidResponse { .. }));
    }
}

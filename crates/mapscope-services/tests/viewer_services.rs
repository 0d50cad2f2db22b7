//! Services plugged into a viewer, without touching the network.

use mapscope_core::{EventBus, ServiceError};
use mapscope_map::{
    HeadlessSurface, InteractionMode, Layer, LonLat, MapViewer, PathPointType, RouteRequest,
    RoutingService, TaskOutcome, ViewerOptions,
};
use mapscope_services::{osrm, wfs, HttpServices};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

#[test]
fn test_wfs_answer_loads_into_store() {
    let surface = HeadlessSurface::new();
    let mut viewer = MapViewer::new(
        Box::new(surface),
        Arc::new(EventBus::new()),
        ViewerOptions::default(),
    );
    viewer.add_layer(Layer::data("province", "Provinces").with_source("ws:province"));

    let body = json!({
        "type": "FeatureCollection",
        "features": [
            {"type": "Feature", "geometry": {"type": "Point", "coordinates": [0.0, 0.0]},
             "properties": {"name": "A"}},
            {"type": "Feature", "geometry": {"type": "Point", "coordinates": [10.0, 0.0]},
             "properties": {"name": "B", "population": null}}
        ]
    });
    let features = wfs::parse_feature_collection(&body).unwrap();

    let store = viewer.begin_load("province").unwrap();
    let added = store.extend(features);
    viewer.end_load("province", Ok(added));

    assert_eq!(added, 2);
    assert_eq!(viewer.layer_fields("province"), vec!["name".to_string()]);
    assert!(!viewer.is_loading());
}

#[test]
fn test_osrm_rejection_reaches_status() {
    let mut viewer = MapViewer::new(
        Box::new(HeadlessSurface::new()),
        Arc::new(EventBus::new()),
        ViewerOptions::default(),
    );
    viewer.activate(InteractionMode::PathAnalysis).unwrap();
    for (kind, lon) in [(PathPointType::Start, 116.3), (PathPointType::End, 116.4)] {
        viewer.set_path_point_type(kind);
        let pixel = viewer
            .viewport()
            .coordinate_to_pixel(LonLat::new(lon, 39.9).to_map());
        viewer.handle_click(pixel);
    }
    let pending = viewer.prepare_route().unwrap();
    let url = osrm::route_url("http://osrm.local", &pending.request);
    assert!(url.contains("/route/v1/driving/"));

    let response = osrm::parse_route(json!({"code": "NoSegment"}));
    assert!(matches!(response, Err(ServiceError::Rejected { .. })));
    assert_eq!(viewer.complete_route(pending, response), TaskOutcome::Applied);
    let toast = viewer.coordinator().status().display().toast.clone().unwrap();
    assert!(toast.text.contains("NoSegment"));
}

#[tokio::test]
async fn test_unreachable_host_is_a_request_failure() {
    let services = HttpServices::new(
        "http://127.0.0.1:9/geoserver/wfs",
        "http://127.0.0.1:9",
        Duration::from_millis(500),
    );
    let request = RouteRequest {
        points: vec![
            LonLat::new(116.3, 39.9),
            LonLat::new(116.4, 39.9),
        ],
    };
    let err = services.routing.route(&request).await.unwrap_err();
    assert!(matches!(err, ServiceError::RequestFailed { .. }));
}

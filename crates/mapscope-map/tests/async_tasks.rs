//! Remote collaborators, staleness and concurrent loading.

use async_trait::async_trait;
use mapscope_core::{EventBus, ServiceError};
use mapscope_map::{
    ClickOutcome, Coordinate, Extent, Feature, FeatureService, FeatureStore, Geometry,
    HeadlessSurface, HighlightChannel, InfoPanel, InteractionMode, Layer, LonLat, MapViewer,
    PathPointType, Pixel, RasterInfoRequest, RasterInfoService, RasterLayer, RouteRequest,
    RouteResponse, RoutingService, TaskOutcome, ViewerOptions,
};
use parking_lot::Mutex;
use std::sync::Arc;

struct FakeFeatures {
    requests: Mutex<Vec<String>>,
}

#[async_trait]
impl FeatureService for FakeFeatures {
    async fn fetch_features(
        &self,
        type_name: &str,
        extent: &Extent,
    ) -> Result<Vec<Feature>, ServiceError> {
        self.requests.lock().push(type_name.to_string());
        if type_name == "ws:broken" {
            return Err(ServiceError::HttpStatus {
                service: "wfs".to_string(),
                status: 503,
            });
        }
        let center = extent.center().unwrap_or_default();
        Ok(vec![
            Feature::new(Geometry::Point(center)).with_attribute("name", "a"),
            Feature::new(Geometry::Point(center)).with_attribute("name", "b"),
        ])
    }
}

struct FakeRouting;

#[async_trait]
impl RoutingService for FakeRouting {
    async fn route(&self, request: &RouteRequest) -> Result<RouteResponse, ServiceError> {
        let coords = request
            .points
            .iter()
            .map(|p| Coordinate::new(p.lon, p.lat))
            .collect();
        Ok(RouteResponse {
            geometry: Geometry::LineString(coords),
            distance_m: 8_000.0,
            duration_s: 540.0,
        })
    }
}

struct FakeRaster;

#[async_trait]
impl RasterInfoService for FakeRaster {
    async fn feature_info(&self, request: &RasterInfoRequest) -> Result<String, ServiceError> {
        Ok(format!("layer {}\n", request.layer_name))
    }
}

fn setup() -> MapViewer {
    MapViewer::new(
        Box::new(HeadlessSurface::new()),
        Arc::new(EventBus::new()),
        ViewerOptions::default(),
    )
}

fn click_at(viewer: &mut MapViewer, lon: f64, lat: f64) -> ClickOutcome {
    let pixel = viewer
        .viewport()
        .coordinate_to_pixel(LonLat::new(lon, lat).to_map());
    viewer.handle_click(pixel)
}

#[tokio::test]
async fn test_load_visible_skips_failed_layers() {
    let mut viewer = setup();
    viewer.add_layer(Layer::data("roads", "Roads").with_source("ws:roads"));
    viewer.add_layer(Layer::data("broken", "Broken").with_source("ws:broken"));
    let service = FakeFeatures {
        requests: Mutex::new(Vec::new()),
    };

    let added = viewer.load_visible(&service).await;
    assert_eq!(added, 2);
    assert_eq!(*service.requests.lock(), vec!["ws:roads", "ws:broken"]);
    assert_eq!(viewer.layers().store("roads").unwrap().len(), 2);
    assert!(!viewer.is_loading());
    assert!(!viewer.coordinator().status().display().loading);
}

#[tokio::test]
async fn test_route_round_trip() {
    let mut viewer = setup();
    viewer.activate(InteractionMode::PathAnalysis).unwrap();
    viewer.set_path_point_type(PathPointType::Start);
    click_at(&mut viewer, 116.30, 39.90);
    viewer.set_path_point_type(PathPointType::End);
    click_at(&mut viewer, 116.40, 39.95);

    let outcome = viewer.request_route(&FakeRouting).await.unwrap();
    assert_eq!(outcome, TaskOutcome::Applied);
    let route = viewer.analysis().route().unwrap();
    assert_eq!(route.distance_km, 8.0);
    assert_eq!(route.duration_min, 9);
    assert!(!route.arrows().is_empty());
    assert_eq!(viewer.coordinator().highlights().len(HighlightChannel::Analysis), 1);
}

#[tokio::test]
async fn test_late_route_does_not_touch_new_mode() {
    let mut viewer = setup();
    viewer.activate(InteractionMode::PathAnalysis).unwrap();
    viewer.set_path_point_type(PathPointType::Start);
    click_at(&mut viewer, 116.30, 39.90);
    viewer.set_path_point_type(PathPointType::End);
    click_at(&mut viewer, 116.40, 39.95);
    let pending = viewer.prepare_route().unwrap();

    let task = tokio::spawn({
        let request = pending.request.clone();
        async move { FakeRouting.route(&request).await }
    });
    viewer.activate(InteractionMode::QueryBox).unwrap();
    let response = task.await.unwrap();

    assert_eq!(viewer.complete_route(pending, response), TaskOutcome::Discarded);
    assert!(viewer.analysis().route().is_none());
    assert!(viewer.coordinator().highlights().is_empty(HighlightChannel::Analysis));
    assert!(viewer.coordinator().box_results().result().is_none());
}

#[tokio::test]
async fn test_raster_query_round_trip() {
    let mut viewer = setup();
    viewer.add_raster(RasterLayer {
        id: "landuse".to_string(),
        title: "Land use".to_string(),
        url: "http://localhost/geoserver/wms".to_string(),
        layer_name: "ws:landuse".to_string(),
        visible: true,
        z_index: 2,
    });
    viewer.activate(InteractionMode::QuerySingle).unwrap();

    let ClickOutcome::Raster(query) = viewer.handle_click(Pixel::new(40.0, 40.0)) else {
        panic!("expected a raster query");
    };
    assert_eq!(viewer.query_raster(&FakeRaster, query).await, TaskOutcome::Applied);
    let InfoPanel::Raster(info) = viewer.coordinator().info() else {
        panic!("expected raster info");
    };
    assert_eq!(info.text, "layer ws:landuse");
}

#[tokio::test]
async fn test_queries_see_consistent_snapshots_while_loading() {
    let store = Arc::new(FeatureStore::new("points"));
    let writer = {
        let store = store.clone();
        tokio::task::spawn_blocking(move || {
            for i in 0..2_000 {
                store.add(
                    Feature::new(Geometry::Point(Coordinate::new(i as f64, 0.0)))
                        .with_attribute("n", i),
                );
            }
        })
    };

    let mut last = 0;
    for _ in 0..50 {
        let snapshot = store.snapshot();
        assert!(snapshot.len() >= last);
        for (i, feature) in snapshot.iter().enumerate() {
            assert_eq!(feature.attribute_text("n"), Some(i.to_string()));
        }
        last = snapshot.len();
        tokio::task::yield_now().await;
    }
    writer.await.unwrap();
    assert_eq!(store.len(), 2_000);
}

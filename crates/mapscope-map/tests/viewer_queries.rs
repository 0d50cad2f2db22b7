//! Query behavior of the viewer through its public API.

use mapscope_core::{AppEvent, EventBus, EventCategory, EventFilter, QueryEvent};
use mapscope_map::surface::SurfaceOp;
use mapscope_map::{
    AttributeOperator, AttributeQuery, Coordinate, Extent, Feature, Geometry, HeadlessSurface,
    HighlightChannel, HighlightManager, InteractionKind, InteractionMode, Layer, MapViewer,
    ViewerOptions,
};
use parking_lot::Mutex;
use std::sync::Arc;

fn square(min_x: f64, min_y: f64, size: f64) -> Geometry {
    Geometry::Polygon(vec![vec![
        Coordinate::new(min_x, min_y),
        Coordinate::new(min_x + size, min_y),
        Coordinate::new(min_x + size, min_y + size),
        Coordinate::new(min_x, min_y + size),
        Coordinate::new(min_x, min_y),
    ]])
}

fn setup() -> (MapViewer, HeadlessSurface, Arc<EventBus>) {
    let surface = HeadlessSurface::new();
    let bus = Arc::new(EventBus::new());
    let viewer = MapViewer::new(
        Box::new(surface.clone()),
        bus.clone(),
        ViewerOptions::default(),
    );
    (viewer, surface, bus)
}

#[test]
fn test_box_query_counts_inside_feature_only() {
    let (mut viewer, _, bus) = setup();
    let completed = Arc::new(Mutex::new(Vec::new()));
    let sink = completed.clone();
    bus.subscribe(
        EventFilter::Categories(vec![EventCategory::Query]),
        move |event| {
            if let AppEvent::Query(QueryEvent::BoxCompleted { total, layers }) = event {
                sink.lock().push((*total, *layers));
            }
        },
    );

    let parcels = Layer::data("parcels", "Parcels");
    let store = parcels.store().cloned().unwrap();
    store.add(Feature::new(square(10.0, 10.0, 5.0)).with_id("F1"));
    store.add(Feature::new(square(500.0, 500.0, 5.0)).with_id("F2"));
    viewer.add_layer(parcels);
    viewer.add_layer(Layer::data("empty", "Empty"));
    viewer.activate(InteractionMode::QueryBox).unwrap();

    let region = Extent::new(0.0, 0.0, 100.0, 100.0);
    let first = viewer.select_in_extent(&region).unwrap();
    assert_eq!((first.total(), first.layer_count()), (1, 1));
    assert_eq!(first.groups()[0].features[0].id(), Some("F1"));

    let second = viewer.select_in_extent(&region).unwrap();
    assert_eq!(first, second);
    assert_eq!(*completed.lock(), vec![(1, 1), (1, 1)]);
}

#[test]
fn test_empty_extent_reads_no_store() {
    let (mut viewer, _, _) = setup();
    let parcels = Layer::data("parcels", "Parcels");
    let store = parcels.store().cloned().unwrap();
    store.add(Feature::new(square(0.0, 0.0, 5.0)));
    viewer.add_layer(parcels);
    viewer.activate(InteractionMode::QueryBox).unwrap();

    let before = store.snapshots_taken();
    let result = viewer.select_in_extent(&Extent::empty()).unwrap();
    assert_eq!((result.total(), result.layer_count()), (0, 0));
    assert_eq!(store.snapshots_taken(), before);
    assert_eq!(
        viewer.coordinator().box_results().empty_message(),
        Some("No features found in the selected area")
    );
}

#[test]
fn test_clearing_one_channel_keeps_the_other() {
    let a = Feature::new(square(0.0, 0.0, 1.0)).with_id("a");
    let b = Feature::new(square(5.0, 5.0, 1.0)).with_id("b");

    let mut highlights = HighlightManager::new();
    highlights.set(HighlightChannel::BoxQuery, [&a]);
    highlights.set(HighlightChannel::AttributeQuery, [&b]);
    highlights.clear(HighlightChannel::BoxQuery);

    assert!(highlights.is_empty(HighlightChannel::BoxQuery));
    let kept = highlights.features(HighlightChannel::AttributeQuery);
    assert_eq!(kept.len(), 1);
    assert_eq!(kept[0].id(), Some("b"));
}

#[test]
fn test_numeric_equals_is_exact() {
    let (mut viewer, _, _) = setup();
    let stats = Layer::data("stats", "Stats");
    let store = stats.store().cloned().unwrap();
    store.add(Feature::new(square(0.0, 0.0, 1.0)).with_id("three").with_attribute("count", 3));
    store.add(Feature::new(square(2.0, 0.0, 1.0)).with_id("thirty").with_attribute("count", 30));
    viewer.add_layer(stats);

    let query = AttributeQuery::new("stats", "count", AttributeOperator::Equals, "3");
    assert_eq!(viewer.run_attribute_query(&query).unwrap(), 1);
    let hit = viewer.select_attribute_result(0).unwrap();
    assert_eq!(hit.feature.id(), Some("three"));
    assert_eq!(viewer.layer_fields("stats"), vec!["count".to_string()]);
}

#[test]
fn test_box_after_measure_tears_down_first() {
    let (mut viewer, surface, _) = setup();
    viewer.activate(InteractionMode::MeasureDistance).unwrap();
    viewer.handle_click(mapscope_map::Pixel::new(10.0, 10.0));
    surface.clear_log();

    viewer.activate(InteractionMode::QueryBox).unwrap();
    let log = surface.log();
    let removed = log
        .iter()
        .position(|op| matches!(op, SurfaceOp::Removed(_)))
        .unwrap();
    let added = log
        .iter()
        .position(|op| matches!(op, SurfaceOp::Added(_, InteractionKind::DragBox)))
        .unwrap();
    assert!(removed < added);
    assert_eq!(surface.installed().len(), 1);
    assert!(viewer.coordinator().measures().is_empty());
}

#[test]
fn test_switching_queries_keeps_attribute_results_until_left() {
    let (mut viewer, _, _) = setup();
    let stats = Layer::data("stats", "Stats");
    stats
        .store()
        .unwrap()
        .add(Feature::new(square(0.0, 0.0, 1.0)).with_attribute("name", "Lake"));
    viewer.add_layer(stats);

    let query = AttributeQuery::new("stats", "name", AttributeOperator::Contains, "lak");
    viewer.run_attribute_query(&query).unwrap();
    assert_eq!(
        viewer.coordinator().highlights().len(HighlightChannel::AttributeQuery),
        1
    );

    viewer.activate(InteractionMode::QuerySingle).unwrap();
    assert!(viewer
        .coordinator()
        .highlights()
        .is_empty(HighlightChannel::AttributeQuery));
    assert_eq!(viewer.coordinator().attribute_results().match_count(), 0);
}

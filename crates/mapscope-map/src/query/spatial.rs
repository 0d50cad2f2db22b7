//! Spatial query engine: point picking and extent selection.
//!
//! Both operations are pure reads over store snapshots of data layers;
//! overlays are never queried. Point picking sees visible layers only.

use crate::extent::Extent;
use crate::geometry::Coordinate;
use crate::layer::LayerStack;

use super::result::{QueryHit, QueryResult};

/// Read-only query view over a layer stack.
#[derive(Debug, Clone, Copy)]
pub struct SpatialQuery<'a> {
    layers: &'a LayerStack,
}

impl<'a> SpatialQuery<'a> {
    pub fn new(layers: &'a LayerStack) -> Self {
        Self { layers }
    }

    /// First feature under `point`, searching layers topmost first.
    ///
    /// `tolerance` is in map units (hit tolerance in pixels times the
    /// current resolution). Within a layer the most recently added feature
    /// wins, matching draw order.
    pub fn at_point(&self, point: Coordinate, tolerance: f64) -> Option<QueryHit> {
        for layer in self.layers.queryable_top_down() {
            let Some(store) = layer.store() else {
                continue;
            };
            let hit = store.snapshot().into_iter().rev().find(|f| {
                f.geometry()
                    .is_some_and(|g| g.contains_point(point, tolerance))
            });
            if let Some(feature) = hit {
                return Some(QueryHit {
                    feature,
                    layer_id: layer.id.clone(),
                    layer_name: layer.name.clone(),
                });
            }
        }
        None
    }

    /// True when any queryable feature lies under `point`.
    pub fn has_feature_at(&self, point: Coordinate, tolerance: f64) -> bool {
        self.at_point(point, tolerance).is_some()
    }

    /// Every feature whose extent intersects `extent`, grouped per layer in
    /// stack order (bottom first) and store order.
    ///
    /// Hidden data layers are included: only point picking is limited to
    /// what is rendered.
    ///
    /// An empty or degenerate extent returns an empty result without
    /// touching any store.
    pub fn in_extent(&self, extent: &Extent) -> QueryResult {
        let mut result = QueryResult::new();
        if extent.is_degenerate() {
            return result;
        }
        for layer in self.layers.data_layers() {
            let Some(store) = layer.store() else {
                continue;
            };
            let hits: Vec<_> = store
                .snapshot()
                .into_iter()
                .filter(|f| f.extent().intersects(extent))
                .collect();
            result.push_layer(layer.id.clone(), layer.name.clone(), hits);
        }
        tracing::debug!(
            "Extent query {}: {} features in {} layers",
            extent,
            result.total(),
            result.layer_count()
        );
        result
    }
}

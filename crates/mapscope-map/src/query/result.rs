//! Query results grouped per layer.

use std::sync::Arc;

use crate::extent::Extent;
use crate::feature::Feature;

/// Hits of one layer, in store order.
#[derive(Debug, Clone, PartialEq)]
pub struct LayerHits {
    pub layer_id: String,
    pub layer_name: String,
    pub features: Vec<Arc<Feature>>,
}

/// One `(feature, layer)` entry of a result.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryHit {
    pub feature: Arc<Feature>,
    pub layer_id: String,
    pub layer_name: String,
}

/// Result of a spatial or attribute query.
///
/// Layers without hits are never present, so `layer_count()` is the number
/// of distinct layers with at least one match.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryResult {
    groups: Vec<LayerHits>,
}

impl QueryResult {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a layer group; empty groups are dropped.
    pub fn push_layer(
        &mut self,
        layer_id: impl Into<String>,
        layer_name: impl Into<String>,
        features: Vec<Arc<Feature>>,
    ) {
        if features.is_empty() {
            return;
        }
        self.groups.push(LayerHits {
            layer_id: layer_id.into(),
            layer_name: layer_name.into(),
            features,
        });
    }

    pub fn groups(&self) -> &[LayerHits] {
        &self.groups
    }

    /// Total number of features.
    pub fn total(&self) -> usize {
        self.groups.iter().map(|g| g.features.len()).sum()
    }

    /// Number of distinct layers with hits.
    pub fn layer_count(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Flattened hits, layer by layer.
    pub fn hits(&self) -> impl Iterator<Item = QueryHit> + '_ {
        self.groups.iter().flat_map(|g| {
            g.features.iter().map(move |f| QueryHit {
                feature: f.clone(),
                layer_id: g.layer_id.clone(),
                layer_name: g.layer_name.clone(),
            })
        })
    }

    /// The n-th hit in flattened order.
    pub fn hit(&self, index: usize) -> Option<QueryHit> {
        self.hits().nth(index)
    }

    /// Every matched feature, layer by layer.
    pub fn features(&self) -> impl Iterator<Item = &Feature> + '_ {
        self.groups.iter().flat_map(|g| g.features.iter().map(|f| f.as_ref()))
    }

    /// Union extent of all matched features.
    pub fn extent(&self) -> Extent {
        let mut extent = Extent::empty();
        for f in self.features() {
            extent.extend(&f.extent());
        }
        extent
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Coordinate, Geometry};

    fn point(x: f64) -> Arc<Feature> {
        Arc::new(Feature::new(Geometry::Point(Coordinate::new(x, x))))
    }

    #[test]
    fn test_counts_and_order() {
        let mut result = QueryResult::new();
        result.push_layer("a", "Layer A", vec![point(1.0), point(2.0)]);
        result.push_layer("empty", "Empty", Vec::new());
        result.push_layer("b", "Layer B", vec![point(3.0)]);

        assert_eq!(result.total(), 3);
        assert_eq!(result.layer_count(), 2);
        let layers: Vec<String> = result.hits().map(|h| h.layer_id).collect();
        assert_eq!(layers, vec!["a", "a", "b"]);
        assert_eq!(result.hit(2).map(|h| h.layer_name), Some("Layer B".to_string()));
        assert_eq!(result.extent(), Extent::new(1.0, 1.0, 3.0, 3.0));
    }
}

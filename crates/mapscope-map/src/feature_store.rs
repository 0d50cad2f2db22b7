//! Append-only feature storage for one data layer.
//!
//! Loading tasks append features while queries read point-in-time
//! snapshots. A snapshot is a clone of the `Arc<Feature>` vector taken under
//! a read lock, so a query never observes a half-appended batch and never
//! blocks a loader for longer than the clone.

use indexmap::IndexSet;
use parking_lot::RwLock;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;

use crate::extent::Extent;
use crate::feature::Feature;

/// Features of one layer, in arrival order.
#[derive(Debug)]
pub struct FeatureStore {
    layer_id: String,
    features: RwLock<Vec<Arc<Feature>>>,
    fields: RwLock<IndexSet<String>>,
    pending_loads: AtomicUsize,
    snapshots_taken: AtomicU64,
}

impl FeatureStore {
    pub fn new(layer_id: impl Into<String>) -> Self {
        Self {
            layer_id: layer_id.into(),
            features: RwLock::new(Vec::new()),
            fields: RwLock::new(IndexSet::new()),
            pending_loads: AtomicUsize::new(0),
            snapshots_taken: AtomicU64::new(0),
        }
    }

    pub fn layer_id(&self) -> &str {
        &self.layer_id
    }

    /// Appends a feature and records its non-null attribute names.
    pub fn add(&self, feature: Feature) -> Arc<Feature> {
        {
            let mut fields = self.fields.write();
            for (key, value) in feature.attributes() {
                if !value.is_null() && !fields.contains(key) {
                    fields.insert(key.clone());
                }
            }
        }
        let feature = Arc::new(feature);
        self.features.write().push(feature.clone());
        feature
    }

    /// Appends a batch of features, returning how many were added.
    pub fn extend(&self, features: impl IntoIterator<Item = Feature>) -> usize {
        features.into_iter().map(|f| self.add(f)).count()
    }

    /// Point-in-time copy of the feature list.
    pub fn snapshot(&self) -> Vec<Arc<Feature>> {
        self.snapshots_taken.fetch_add(1, Ordering::Relaxed);
        self.features.read().clone()
    }

    /// Number of snapshots handed out so far.
    pub fn snapshots_taken(&self) -> u64 {
        self.snapshots_taken.load(Ordering::Relaxed)
    }

    pub fn len(&self) -> usize {
        self.features.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.read().is_empty()
    }

    /// Attribute names seen with a non-null value, in first-seen order.
    pub fn fields(&self) -> Vec<String> {
        self.fields.read().iter().cloned().collect()
    }

    /// Union extent of every stored feature.
    pub fn extent(&self) -> Extent {
        let features = self.features.read();
        let mut extent = Extent::empty();
        for f in features.iter() {
            extent.extend(&f.extent());
        }
        extent
    }

    /// Marks a feature request as in flight.
    pub fn begin_load(&self) {
        self.pending_loads.fetch_add(1, Ordering::SeqCst);
    }

    /// Marks a feature request as finished (successfully or not).
    pub fn end_load(&self) {
        // Saturates at zero.
        let _ = self
            .pending_loads
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1));
    }

    /// True while any request for this layer is in flight.
    pub fn is_loading(&self) -> bool {
        self.pending_loads.load(Ordering::SeqCst) > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Coordinate, Geometry};
    use serde_json::Value;

    fn point(x: f64, y: f64) -> Feature {
        Feature::new(Geometry::Point(Coordinate::new(x, y)))
    }

    #[test]
    fn test_snapshot_is_point_in_time() {
        let store = FeatureStore::new("roads");
        store.add(point(0.0, 0.0));
        let snap = store.snapshot();
        store.add(point(1.0, 1.0));
        assert_eq!(snap.len(), 1);
        assert_eq!(store.len(), 2);
        assert_eq!(store.snapshots_taken(), 1);
    }

    #[test]
    fn test_field_catalog_skips_nulls() {
        let store = FeatureStore::new("admin");
        store.add(point(0.0, 0.0).with_attribute("name", "a").with_attribute("code", Value::Null));
        assert_eq!(store.fields(), vec!["name".to_string()]);
        store.add(point(0.0, 0.0).with_attribute("code", 5).with_attribute("name", "b"));
        assert_eq!(store.fields(), vec!["name".to_string(), "code".to_string()]);
    }

    #[test]
    fn test_load_tracking() {
        let store = FeatureStore::new("admin");
        assert!(!store.is_loading());
        store.begin_load();
        store.begin_load();
        store.end_load();
        assert!(store.is_loading());
        store.end_load();
        store.end_load();
        assert!(!store.is_loading());
    }

    #[test]
    fn test_extent() {
        let store = FeatureStore::new("pts");
        assert!(store.extent().is_empty());
        store.extend(vec![point(1.0, 5.0), point(-2.0, 3.0)]);
        assert_eq!(store.extent(), Extent::new(-2.0, 3.0, 1.0, 5.0));
    }
}

//! Buffer analysis.

use mapscope_core::ValidationError;

use crate::algorithms::GeometryService;
use crate::extent::Extent;
use crate::feature::Feature;
use crate::layer::LayerStack;
use crate::projection::{geometry_from_lon_lat, geometry_to_lon_lat};

/// Buffer polygons produced for one layer, in map units.
#[derive(Debug, Clone, PartialEq)]
pub struct BufferOutput {
    pub layer_id: String,
    pub distance: f64,
    pub features: Vec<Feature>,
    /// Source features whose buffer could not be computed.
    pub failed: usize,
}

impl BufferOutput {
    pub fn extent(&self) -> Extent {
        let mut extent = Extent::empty();
        for f in &self.features {
            extent.extend(&f.extent());
        }
        extent
    }
}

/// Validated buffer parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct BufferRequest {
    pub layer_id: Option<String>,
    /// Distance in meters.
    pub distance: f64,
}

impl BufferRequest {
    pub fn new(layer_id: impl Into<String>, distance: f64) -> Self {
        Self {
            layer_id: Some(layer_id.into()),
            distance,
        }
    }

    /// Buffers every loaded feature of the layer.
    ///
    /// Checks run in order: a layer is selected, the distance is positive,
    /// the layer exists, the layer has features. Features whose buffer
    /// fails are skipped and counted in [`BufferOutput::failed`].
    pub fn execute(
        &self,
        layers: &LayerStack,
        engine: &dyn GeometryService,
    ) -> Result<BufferOutput, ValidationError> {
        let layer_id = self
            .layer_id
            .as_deref()
            .filter(|id| !id.is_empty())
            .ok_or(ValidationError::NoLayerSelected)?;
        if !(self.distance > 0.0) || !self.distance.is_finite() {
            return Err(ValidationError::InvalidDistance {
                distance: self.distance,
            });
        }
        let store = layers
            .store(layer_id)
            .ok_or_else(|| ValidationError::UnknownLayer {
                layer_id: layer_id.to_string(),
            })?;
        let snapshot = store.snapshot();
        if snapshot.is_empty() {
            return Err(ValidationError::LayerEmpty {
                layer_id: layer_id.to_string(),
            });
        }

        let mut features = Vec::with_capacity(snapshot.len());
        let mut failed = 0;
        for source in &snapshot {
            let Some(geometry) = source.geometry().filter(|g| !g.is_empty()) else {
                failed += 1;
                continue;
            };
            match engine.buffer(&geometry_to_lon_lat(geometry), self.distance) {
                Ok(buffered) => {
                    let mut feature = Feature::new(geometry_from_lon_lat(&buffered))
                        .with_attribute("source_layer", layer_id)
                        .with_attribute("distance", self.distance);
                    if let Some(id) = source.id() {
                        feature = feature.with_attribute("source_id", id);
                    }
                    features.push(feature);
                }
                Err(e) => {
                    tracing::warn!("Buffer of a {} feature failed: {}", layer_id, e);
                    failed += 1;
                }
            }
        }

        tracing::info!(
            "Buffered {} of {} features in {} by {} m",
            features.len(),
            snapshot.len(),
            layer_id,
            self.distance
        );
        Ok(BufferOutput {
            layer_id: layer_id.to_string(),
            distance: self.distance,
            features,
            failed,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithms::GeodesicEngine;
    use crate::geometry::Geometry;
    use crate::layer::Layer;
    use crate::projection::from_lon_lat;

    fn stack_with_points(n: usize) -> LayerStack {
        let mut stack = LayerStack::new();
        let layer = Layer::data("pois", "POIs");
        let store = layer.store().cloned().unwrap();
        stack.push(layer);
        for i in 0..n {
            store.add(
                Feature::new(Geometry::Point(from_lon_lat(116.0 + i as f64 * 0.1, 40.0)))
                    .with_id(format!("p{}", i)),
            );
        }
        stack
    }

    #[test]
    fn test_validation_order() {
        let stack = stack_with_points(0);
        let engine = GeodesicEngine::new();

        let none = BufferRequest {
            layer_id: None,
            distance: -1.0,
        };
        assert_eq!(none.execute(&stack, &engine), Err(ValidationError::NoLayerSelected));

        let bad = BufferRequest::new("pois", 0.0);
        assert!(matches!(
            bad.execute(&stack, &engine),
            Err(ValidationError::InvalidDistance { .. })
        ));

        let missing = BufferRequest::new("roads", 10.0);
        assert!(matches!(
            missing.execute(&stack, &engine),
            Err(ValidationError::UnknownLayer { .. })
        ));

        let empty = BufferRequest::new("pois", 10.0);
        assert!(matches!(
            empty.execute(&stack, &engine),
            Err(ValidationError::LayerEmpty { .. })
        ));
    }

    #[test]
    fn test_one_buffer_per_feature() {
        let stack = stack_with_points(3);
        let output = BufferRequest::new("pois", 250.0)
            .execute(&stack, &GeodesicEngine::new())
            .unwrap();
        assert_eq!(output.features.len(), 3);
        assert_eq!(output.failed, 0);
        assert_eq!(output.features[2].attribute_text("source_id").as_deref(), Some("p2"));
        assert!(matches!(output.features[0].geometry(), Some(Geometry::Polygon(_))));

        let extent = output.extent();
        let source = stack.store("pois").unwrap().extent();
        assert!(extent.min_x < source.min_x && extent.max_x > source.max_x);
    }
}

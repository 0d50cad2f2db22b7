//! Result panels shown next to the map.
//!
//! Panels are plain data; a front end renders them. Each panel belongs to
//! the mode that fills it and is reset when that mode is left.

use std::sync::Arc;

use crate::feature::Feature;
use crate::geometry::Coordinate;
use crate::projection::LonLat;
use crate::query::QueryResult;

/// Attributes shown per feature in the box result list.
pub const PREVIEW_ATTRIBUTES: usize = 3;

/// Attribute popup of a clicked vector feature.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureInfo {
    pub layer_id: String,
    pub layer_name: String,
    pub feature: Arc<Feature>,
}

impl FeatureInfo {
    /// `(name, value)` rows, nulls shown as `(null)`.
    pub fn rows(&self) -> Vec<(String, String)> {
        self.feature.display_attributes()
    }

    /// Message shown instead of rows when the feature has no attributes.
    pub fn empty_message(&self) -> Option<&'static str> {
        self.feature
            .attributes()
            .is_empty()
            .then_some("This feature has no attributes")
    }
}

/// Text returned by a raster point query.
#[derive(Debug, Clone, PartialEq)]
pub struct RasterInfo {
    pub layer_id: String,
    pub title: String,
    /// Queried position in map units.
    pub coordinate: Coordinate,
    /// Trimmed service answer.
    pub text: String,
}

impl RasterInfo {
    pub fn lon_lat(&self) -> LonLat {
        LonLat::from_map(self.coordinate)
    }

    pub fn empty_message(&self) -> Option<&'static str> {
        self.text
            .is_empty()
            .then_some("No data at this location, or the layer is not queryable")
    }
}

/// Popup content of a single-click query.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum InfoPanel {
    #[default]
    Hidden,
    Feature(FeatureInfo),
    Raster(RasterInfo),
}

impl InfoPanel {
    pub fn is_visible(&self) -> bool {
        !matches!(self, InfoPanel::Hidden)
    }
}

/// One feature entry in the box result list.
#[derive(Debug, Clone, PartialEq)]
pub struct FeaturePreview {
    /// Position inside its layer group.
    pub index: usize,
    /// `Feature {n}`, one-based.
    pub title: String,
    /// First non-null attributes.
    pub attributes: Vec<(String, String)>,
    /// How many non-null attributes are not shown.
    pub more: usize,
}

impl FeaturePreview {
    pub fn new(index: usize, feature: &Feature) -> Self {
        let mut present = feature.present_attributes();
        let more = present.len().saturating_sub(PREVIEW_ATTRIBUTES);
        present.truncate(PREVIEW_ATTRIBUTES);
        Self {
            index,
            title: format!("Feature {}", index + 1),
            attributes: present,
            more,
        }
    }

    /// `+N more` footer, when attributes were cut.
    pub fn more_label(&self) -> Option<String> {
        (self.more > 0).then(|| format!("+{} more", self.more))
    }
}

/// One layer group of the box result list.
#[derive(Debug, Clone, PartialEq)]
pub struct LayerPreview {
    pub layer_id: String,
    pub layer_name: String,
    pub features: Vec<FeaturePreview>,
}

/// Box selection result panel.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum BoxResults {
    #[default]
    Hidden,
    Shown(QueryResult),
}

impl BoxResults {
    pub fn result(&self) -> Option<&QueryResult> {
        match self {
            BoxResults::Shown(result) => Some(result),
            BoxResults::Hidden => None,
        }
    }

    /// `(total, layers)` counters of the panel header.
    pub fn counts(&self) -> (usize, usize) {
        self.result()
            .map_or((0, 0), |r| (r.total(), r.layer_count()))
    }

    pub fn empty_message(&self) -> Option<&'static str> {
        match self {
            BoxResults::Shown(result) if result.is_empty() => {
                Some("No features found in the selected area")
            }
            _ => None,
        }
    }

    /// Per-layer previews in result order.
    pub fn previews(&self) -> Vec<LayerPreview> {
        let Some(result) = self.result() else {
            return Vec::new();
        };
        result
            .groups()
            .iter()
            .map(|group| LayerPreview {
                layer_id: group.layer_id.clone(),
                layer_name: group.layer_name.clone(),
                features: group
                    .features
                    .iter()
                    .enumerate()
                    .map(|(i, f)| FeaturePreview::new(i, f))
                    .collect(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Geometry;
    use serde_json::Value;

    #[test]
    fn test_preview_truncates() {
        let feature = Feature::new(Geometry::Point(Coordinate::new(0.0, 0.0)))
            .with_attribute("a", 1)
            .with_attribute("b", Value::Null)
            .with_attribute("c", "x")
            .with_attribute("d", true)
            .with_attribute("e", 2.5);
        let preview = FeaturePreview::new(0, &feature);
        assert_eq!(preview.title, "Feature 1");
        let keys: Vec<&str> = preview.attributes.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["a", "c", "d"]);
        assert_eq!(preview.more_label().as_deref(), Some("+1 more"));
    }

    #[test]
    fn test_box_panel_empty_message() {
        assert_eq!(BoxResults::Hidden.empty_message(), None);
        let shown = BoxResults::Shown(QueryResult::new());
        assert!(shown.empty_message().is_some());
        assert_eq!(shown.counts(), (0, 0));
    }
}

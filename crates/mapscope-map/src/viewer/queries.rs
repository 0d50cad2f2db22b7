//! Attribute queries and result list selection.

use mapscope_core::{AppEvent, QueryEvent, Result, ValidationError};

use super::MapViewer;
use crate::extent::Extent;
use crate::highlight::HighlightChannel;
use crate::panels::BoxResults;
use crate::query::{AttributeQuery, AttributeResults, QueryHit, QueryResult, SpatialQuery};
use crate::tools::InteractionMode;

impl MapViewer {
    /// Attribute names offered by the field selector of a layer.
    pub fn layer_fields(&self, layer_id: &str) -> Vec<String> {
        self.layers
            .store(layer_id)
            .map(|store| store.fields())
            .unwrap_or_default()
    }

    /// Runs an attribute query and shows its matches.
    ///
    /// Invalid input is reported and nothing changes. A valid query makes
    /// AttributeQuery the current tool, replaces the attribute channel and
    /// fits the view to the matches.
    pub fn run_attribute_query(&mut self, query: &AttributeQuery) -> Result<usize> {
        let result = match query.execute(&self.layers) {
            Ok(result) => result,
            Err(e) => {
                self.coordinator.status_mut().error(e.to_string());
                return Err(e.into());
            }
        };
        if self.coordinator.current() != InteractionMode::AttributeQuery {
            self.coordinator.activate(InteractionMode::AttributeQuery)?;
        }

        let matches = result.total();
        let layer_id = query.layer_id.clone().unwrap_or_default();
        self.coordinator
            .highlights_mut()
            .set(HighlightChannel::AttributeQuery, result.features());
        if matches == 0 {
            self.coordinator.status_mut().warning("No matching features found");
        } else {
            let extent = result.extent();
            self.fit_result(&extent);
            self.coordinator
                .status_mut()
                .success(format!("Found {} matching features", matches));
        }
        self.coordinator
            .set_attribute_results(AttributeResults::from_result(result));
        self.publish(AppEvent::Query(QueryEvent::AttributeCompleted { layer_id, matches }));
        Ok(matches)
    }

    /// Clears the attribute highlight and result list.
    pub fn clear_attribute_query(&mut self) {
        self.coordinator
            .highlights_mut()
            .clear(HighlightChannel::AttributeQuery);
        self.coordinator
            .set_attribute_results(AttributeResults::NotQueried);
        self.coordinator
            .status_mut()
            .info("Query highlight and results cleared");
        self.publish(AppEvent::Query(QueryEvent::Cleared {
            channel: HighlightChannel::AttributeQuery.to_string(),
        }));
    }

    /// Highlights only the `index`-th attribute match and zooms to it.
    pub fn select_attribute_result(&mut self, index: usize) -> Option<QueryHit> {
        let hit = self.coordinator.attribute_results().result()?.hit(index)?;
        self.coordinator
            .highlights_mut()
            .set(HighlightChannel::AttributeQuery, [hit.feature.as_ref()]);
        self.fit_selection(&hit.feature.extent());
        self.coordinator
            .status_mut()
            .info(format!("Zoomed to match {}", index + 1));
        Some(hit)
    }

    /// Box query over a map extent.
    ///
    /// Only runs while QueryBox is current. Replaces the box channel and the
    /// box result panel; a degenerate extent yields an empty result.
    pub fn select_in_extent(&mut self, extent: &Extent) -> Option<QueryResult> {
        if self.coordinator.current() != InteractionMode::QueryBox {
            return None;
        }
        let result = SpatialQuery::new(&self.layers).in_extent(extent);
        let (total, layers) = (result.total(), result.layer_count());

        let highlights = self.coordinator.highlights_mut();
        highlights.clear(HighlightChannel::SingleQuery);
        highlights.set(HighlightChannel::BoxQuery, result.features());
        self.coordinator
            .set_box_results(BoxResults::Shown(result.clone()));

        if total == 0 {
            self.coordinator
                .status_mut()
                .warning("No features found in the selected area");
        } else {
            self.coordinator.status_mut().success(format!(
                "Selected {} features in {} layers",
                total, layers
            ));
        }
        self.publish(AppEvent::Query(QueryEvent::BoxCompleted { total, layers }));
        Some(result)
    }

    /// Moves one box result into the single channel and zooms to it.
    /// `index` counts within the layer group.
    pub fn select_box_result(&mut self, layer_id: &str, index: usize) -> Option<QueryHit> {
        let hit = {
            let result = self.coordinator.box_results().result()?;
            let group = result.groups().iter().find(|g| g.layer_id == layer_id)?;
            QueryHit {
                feature: group.features.get(index)?.clone(),
                layer_id: group.layer_id.clone(),
                layer_name: group.layer_name.clone(),
            }
        };
        let highlights = self.coordinator.highlights_mut();
        highlights.clear(HighlightChannel::BoxQuery);
        highlights.set(HighlightChannel::SingleQuery, [hit.feature.as_ref()]);
        self.fit_selection(&hit.feature.extent());
        self.coordinator
            .status_mut()
            .info(format!("Zoomed to feature {}", index + 1));
        Some(hit)
    }

    /// Fits the view to every box result.
    pub fn zoom_to_all(&mut self) -> bool {
        let Some(extent) = self.coordinator.box_results().result().map(QueryResult::extent)
        else {
            return false;
        };
        self.fit_result(&extent)
    }

    /// Layer of the attribute query, checked without running it.
    pub fn validate_attribute_query(&self, query: &AttributeQuery) -> Result<()> {
        let (layer_id, _, _) = query.validate()?;
        if self.layers.store(layer_id).is_none() {
            return Err(ValidationError::UnknownLayer {
                layer_id: layer_id.to_string(),
            }
            .into());
        }
        Ok(())
    }
}

//! Feature loading and raster point queries.

use mapscope_core::{AppEvent, LayerEvent, QueryEvent, Result, ServiceError, ValidationError};
use std::sync::Arc;

use super::MapViewer;
use crate::analysis::TaskOutcome;
use crate::extent::Extent;
use crate::feature::Feature;
use crate::feature_store::FeatureStore;
use crate::panels::{InfoPanel, RasterInfo};
use crate::services::{FeatureService, RasterInfoRequest, RasterInfoService};
use crate::tools::ModeTicket;

/// A raster point query waiting for its answer.
#[derive(Debug, Clone, PartialEq)]
pub struct RasterQuery {
    pub ticket: ModeTicket,
    /// Sequence number of the click that launched the query.
    pub click: u64,
    /// Title of the queried raster, shown in the popup header.
    pub title: String,
    pub request: RasterInfoRequest,
}

impl MapViewer {
    /// True while any data layer has a request in flight.
    pub fn is_loading(&self) -> bool {
        self.layers
            .data_layers()
            .filter_map(|l| l.store())
            .any(|s| s.is_loading())
    }

    /// Marks a layer as loading and returns its store for appending.
    pub fn begin_load(&mut self, layer_id: &str) -> Option<Arc<FeatureStore>> {
        let store = self.layers.store(layer_id)?;
        store.begin_load();
        self.coordinator.status_mut().loading(true);
        self.publish(AppEvent::Layer(LayerEvent::LoadStarted {
            layer_id: layer_id.to_string(),
        }));
        Some(store)
    }

    /// Appends one fetched feature. False for unknown layers.
    pub fn add_feature(&self, layer_id: &str, feature: Feature) -> bool {
        match self.layers.store(layer_id) {
            Some(store) => {
                store.add(feature);
                true
            }
            None => false,
        }
    }

    /// Ends a load started with [`begin_load`](Self::begin_load).
    ///
    /// Failures are reported and never retried. The loading indicator goes
    /// off once no layer is loading any more.
    pub fn end_load(&mut self, layer_id: &str, outcome: std::result::Result<usize, ServiceError>) {
        if let Some(store) = self.layers.store(layer_id) {
            store.end_load();
        }
        match outcome {
            Ok(added) => {
                tracing::info!("Loaded {} features into {}", added, layer_id);
                self.publish(AppEvent::Layer(LayerEvent::LoadFinished {
                    layer_id: layer_id.to_string(),
                    added,
                }));
            }
            Err(e) => {
                tracing::warn!("Loading {} failed: {}", layer_id, e);
                self.coordinator
                    .status_mut()
                    .error(format!("Failed to load {}: {}", layer_id, e));
                self.publish(AppEvent::Layer(LayerEvent::LoadFailed {
                    layer_id: layer_id.to_string(),
                    reason: e.to_string(),
                }));
            }
        }
        let loading = self.is_loading();
        self.coordinator.status_mut().loading(loading);
    }

    /// Fetches a layer's features inside `extent` and appends them.
    ///
    /// Holds the viewer for the whole request. Front ends that keep
    /// handling input meanwhile use `begin_load`, `add_feature` and
    /// `end_load` instead.
    pub async fn load_layer(
        &mut self,
        service: &dyn FeatureService,
        layer_id: &str,
        extent: &Extent,
    ) -> Result<usize> {
        let type_name = self
            .layers
            .get(layer_id)
            .filter(|l| !l.is_overlay())
            .map(|l| l.source_name.clone().unwrap_or_else(|| l.id.clone()))
            .ok_or_else(|| ValidationError::UnknownLayer {
                layer_id: layer_id.to_string(),
            })?;
        let Some(store) = self.begin_load(layer_id) else {
            return Err(ValidationError::UnknownLayer {
                layer_id: layer_id.to_string(),
            }
            .into());
        };

        match service.fetch_features(&type_name, extent).await {
            Ok(features) => {
                let added = store.extend(features);
                self.end_load(layer_id, Ok(added));
                Ok(added)
            }
            Err(e) => {
                self.end_load(layer_id, Err(e.clone()));
                Err(e.into())
            }
        }
    }

    /// Loads every data layer inside the visible extent. Returns the number
    /// of features added; failed layers are reported and skipped.
    pub async fn load_visible(&mut self, service: &dyn FeatureService) -> usize {
        let extent = self.viewport.visible_extent();
        let ids: Vec<String> = self.layers.data_layers().map(|l| l.id.clone()).collect();
        let mut total = 0;
        for id in ids {
            if let Ok(added) = self.load_layer(service, &id, &extent).await {
                total += added;
            }
        }
        total
    }

    /// Shows a raster answer if the QuerySingle activation that asked is
    /// still current and no later click has replaced it.
    pub fn complete_raster_query(
        &mut self,
        query: RasterQuery,
        response: std::result::Result<String, ServiceError>,
    ) -> TaskOutcome {
        if !self.coordinator.is_current(&query.ticket) {
            self.coordinator.discard_stale("raster info", &query.ticket);
            return TaskOutcome::Discarded;
        }
        if query.click != self.point_queries {
            tracing::debug!(
                "Discarding raster info for click {} (now {})",
                query.click,
                self.point_queries
            );
            self.coordinator.discard_stale("raster info", &query.ticket);
            return TaskOutcome::Discarded;
        }
        match response {
            Ok(text) => {
                let info = RasterInfo {
                    layer_id: query.request.layer_id.clone(),
                    title: query.title.clone(),
                    coordinate: query.request.coordinate,
                    text: text.trim().to_string(),
                };
                self.coordinator.set_info(InfoPanel::Raster(info));
                self.coordinator
                    .status_mut()
                    .success(format!("Showing info from {}", query.title));
                self.publish(AppEvent::Query(QueryEvent::RasterInfo {
                    layer_id: query.request.layer_id,
                }));
            }
            Err(e) => {
                tracing::warn!("Raster query on {} failed: {}", query.request.layer_id, e);
                self.coordinator.set_info(InfoPanel::Hidden);
                self.coordinator
                    .status_mut()
                    .error(format!("Raster query failed: {}", e));
            }
        }
        TaskOutcome::Applied
    }

    /// Sends a raster point query and applies its answer.
    ///
    /// The viewer is borrowed across the request, so no click or mode change
    /// can intervene; the answer applies when `query` came from the latest
    /// click. Front ends that keep handling input send the request
    /// themselves and call [`complete_raster_query`](Self::complete_raster_query).
    pub async fn query_raster(
        &mut self,
        service: &dyn RasterInfoService,
        query: RasterQuery,
    ) -> TaskOutcome {
        let response = service.feature_info(&query.request).await;
        self.complete_raster_query(query, response)
    }
}

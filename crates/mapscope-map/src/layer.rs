//! Layers and the z-ordered layer stack.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::feature_store::FeatureStore;
use crate::highlight::HighlightChannel;

/// Fill/border styling of a vector layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerStyle {
    /// Fill color as `#rrggbb`.
    pub fill_color: String,
    /// Border color as `#rrggbb`.
    pub border_color: String,
    /// Fill opacity, 0.0 to 1.0.
    pub opacity: f64,
    /// Border width in pixels.
    pub border_width: f64,
}

impl Default for LayerStyle {
    fn default() -> Self {
        Self {
            fill_color: "#3388ff".to_string(),
            border_color: "#ffffff".to_string(),
            opacity: 0.6,
            border_width: 1.0,
        }
    }
}

/// Kind of overlay a non-data layer carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OverlayKind {
    Draw,
    Measure,
    Highlight(HighlightChannel),
    Analysis,
}

/// Whether a layer holds queryable data.
#[derive(Debug, Clone)]
pub enum LayerKind {
    /// Business data backed by a feature store.
    Data(Arc<FeatureStore>),
    /// Tool overlay; never queried.
    Overlay(OverlayKind),
}

/// A named, styled layer.
#[derive(Debug, Clone)]
pub struct Layer {
    pub id: String,
    pub name: String,
    /// Remote type name used when fetching features (e.g. `ws:roads`).
    pub source_name: Option<String>,
    pub visible: bool,
    pub style: LayerStyle,
    pub kind: LayerKind,
}

impl Layer {
    /// Creates a visible data layer with an empty store.
    pub fn data(id: impl Into<String>, name: impl Into<String>) -> Self {
        let id = id.into();
        let store = Arc::new(FeatureStore::new(id.clone()));
        Self::base(id, name.into()).with_kind(LayerKind::Data(store))
    }

    /// Creates a visible overlay layer.
    pub fn overlay(id: impl Into<String>, kind: OverlayKind) -> Self {
        let id = id.into();
        let name = id.clone();
        Self::base(id, name).with_kind(LayerKind::Overlay(kind))
    }

    fn base(id: String, name: String) -> Self {
        Self {
            id,
            name,
            source_name: None,
            visible: true,
            style: LayerStyle::default(),
            kind: LayerKind::Overlay(OverlayKind::Draw),
        }
    }

    fn with_kind(mut self, kind: LayerKind) -> Self {
        self.kind = kind;
        self
    }

    /// Sets the remote type name.
    pub fn with_source(mut self, source_name: impl Into<String>) -> Self {
        self.source_name = Some(source_name.into());
        self
    }

    pub fn with_style(mut self, style: LayerStyle) -> Self {
        self.style = style;
        self
    }

    pub fn with_visible(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }

    /// Feature store of a data layer.
    pub fn store(&self) -> Option<&Arc<FeatureStore>> {
        match &self.kind {
            LayerKind::Data(store) => Some(store),
            LayerKind::Overlay(_) => None,
        }
    }

    pub fn is_overlay(&self) -> bool {
        matches!(self.kind, LayerKind::Overlay(_))
    }

    /// Data layers that are visible take part in spatial queries.
    pub fn is_queryable(&self) -> bool {
        self.visible && !self.is_overlay()
    }
}

/// Layers bottom to top. Overlays always sit above every data layer.
#[derive(Debug, Clone, Default)]
pub struct LayerStack {
    layers: Vec<Layer>,
}

impl LayerStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a layer. Data layers are inserted below the first overlay,
    /// overlays go on top. Returns false if the id is already taken.
    pub fn push(&mut self, layer: Layer) -> bool {
        if self.get(&layer.id).is_some() {
            return false;
        }
        if layer.is_overlay() {
            self.layers.push(layer);
        } else {
            let at = self
                .layers
                .iter()
                .position(Layer::is_overlay)
                .unwrap_or(self.layers.len());
            self.layers.insert(at, layer);
        }
        true
    }

    pub fn get(&self, id: &str) -> Option<&Layer> {
        self.layers.iter().find(|l| l.id == id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut Layer> {
        self.layers.iter_mut().find(|l| l.id == id)
    }

    /// Feature store of a data layer by id.
    pub fn store(&self, id: &str) -> Option<Arc<FeatureStore>> {
        self.get(id).and_then(Layer::store).cloned()
    }

    /// All layers, bottom first.
    pub fn iter(&self) -> impl Iterator<Item = &Layer> {
        self.layers.iter()
    }

    /// Queryable layers, topmost first.
    pub fn queryable_top_down(&self) -> impl Iterator<Item = &Layer> {
        self.layers.iter().rev().filter(|l| l.is_queryable())
    }

    /// Queryable layers, bottom first.
    pub fn queryable(&self) -> impl Iterator<Item = &Layer> {
        self.layers.iter().filter(|l| l.is_queryable())
    }

    /// Data layers, bottom first, regardless of visibility.
    pub fn data_layers(&self) -> impl Iterator<Item = &Layer> {
        self.layers.iter().filter(|l| !l.is_overlay())
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }
}

/// A WMS raster overlay used by the raster point query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RasterLayer {
    pub id: String,
    pub title: String,
    /// WMS endpoint.
    pub url: String,
    /// Qualified WMS layer name (`workspace:name`).
    pub layer_name: String,
    pub visible: bool,
    pub z_index: i32,
}

/// Topmost visible raster: highest z-index, ties go to the last registered.
pub fn topmost_raster(rasters: &[RasterLayer]) -> Option<&RasterLayer> {
    rasters
        .iter()
        .filter(|r| r.visible)
        .fold(None, |best: Option<&RasterLayer>, r| match best {
            Some(b) if b.z_index > r.z_index => Some(b),
            _ => Some(r),
        })
}

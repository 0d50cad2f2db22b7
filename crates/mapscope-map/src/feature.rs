//! Features: a geometry plus an ordered attribute mapping.

use indexmap::IndexMap;
use mapscope_core::GeometryError;
use serde_json::{Map, Value};

use crate::extent::Extent;
use crate::geometry::Geometry;

/// Attribute key implicitly carried by every feature and never listed.
pub const GEOMETRY_KEY: &str = "geometry";

/// Text shown for a null attribute in the feature info listing.
pub const NULL_DISPLAY: &str = "(null)";

/// A geographic entity.
///
/// Features are shared as `Arc<Feature>` between a layer's store and query
/// results; highlight channels hold independent clones.
#[derive(Debug, Clone, PartialEq)]
pub struct Feature {
    id: Option<String>,
    geometry: Option<Geometry>,
    attributes: IndexMap<String, Value>,
}

impl Feature {
    /// Creates a feature without attributes.
    pub fn new(geometry: Geometry) -> Self {
        Self {
            id: None,
            geometry: Some(geometry),
            attributes: IndexMap::new(),
        }
    }

    /// Sets the feature identifier.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Adds an attribute, keeping insertion order.
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set_attribute(key, value);
        self
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn geometry(&self) -> Option<&Geometry> {
        self.geometry.as_ref()
    }

    /// Replaces the geometry.
    pub fn set_geometry(&mut self, geometry: Option<Geometry>) {
        self.geometry = geometry;
    }

    /// Sets an attribute. The reserved geometry key is ignored.
    pub fn set_attribute(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        let key = key.into();
        if key == GEOMETRY_KEY {
            return;
        }
        self.attributes.insert(key, value.into());
    }

    /// All attributes in insertion order, nulls included.
    pub fn attributes(&self) -> &IndexMap<String, Value> {
        &self.attributes
    }

    /// Attribute value; `None` when missing or null.
    pub fn attribute(&self, key: &str) -> Option<&Value> {
        self.attributes.get(key).filter(|v| !v.is_null())
    }

    /// Attribute coerced to text, `None` when missing or null.
    pub fn attribute_text(&self, key: &str) -> Option<String> {
        self.attribute(key).map(value_text)
    }

    /// Geometry extent; empty when the feature has no geometry.
    pub fn extent(&self) -> Extent {
        self.geometry
            .as_ref()
            .map(Geometry::extent)
            .unwrap_or_default()
    }

    /// Full attribute listing for the feature info panel: nulls are shown as
    /// [`NULL_DISPLAY`].
    pub fn display_attributes(&self) -> Vec<(String, String)> {
        self.attributes
            .iter()
            .map(|(k, v)| {
                let text = if v.is_null() {
                    NULL_DISPLAY.to_string()
                } else {
                    value_text(v)
                };
                (k.clone(), text)
            })
            .collect()
    }

    /// Non-null attributes only, used by result lists.
    pub fn present_attributes(&self) -> Vec<(String, String)> {
        self.attributes
            .iter()
            .filter(|(_, v)| !v.is_null())
            .map(|(k, v)| (k.clone(), value_text(v)))
            .collect()
    }

    /// Parses a GeoJSON `Feature` object.
    ///
    /// A null geometry is kept as `None`; an unparsable geometry is an error.
    pub fn from_geojson(value: &Value) -> Result<Feature, GeometryError> {
        let geometry = match value.get(GEOMETRY_KEY) {
            None | Some(Value::Null) => None,
            Some(g) => Some(Geometry::from_geojson(g)?),
        };
        let id = match value.get("id") {
            Some(Value::String(s)) => Some(s.clone()),
            Some(Value::Number(n)) => Some(n.to_string()),
            _ => None,
        };
        let mut attributes = IndexMap::new();
        if let Some(Value::Object(props)) = value.get("properties") {
            for (k, v) in props {
                if k != GEOMETRY_KEY {
                    attributes.insert(k.clone(), v.clone());
                }
            }
        }
        Ok(Feature {
            id,
            geometry,
            attributes,
        })
    }

    /// Serializes to a GeoJSON `Feature` object.
    pub fn to_geojson(&self) -> Value {
        let mut object = Map::new();
        object.insert("type".to_string(), Value::from("Feature"));
        if let Some(id) = &self.id {
            object.insert("id".to_string(), Value::from(id.as_str()));
        }
        object.insert(
            GEOMETRY_KEY.to_string(),
            self.geometry
                .as_ref()
                .map(Geometry::to_geojson)
                .unwrap_or(Value::Null),
        );
        let props: Map<String, Value> = self
            .attributes
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        object.insert("properties".to_string(), Value::Object(props));
        Value::Object(object)
    }
}

/// Coerces an attribute value to comparison/display text.
///
/// Strings are taken verbatim. Numbers print in their shortest form, with
/// integral floats as integers (`3.0` prints `3`). Booleans print as
/// `true`/`false`, arrays and objects as compact JSON, null as `null`.
pub fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => number_text(n),
        other => other.to_string(),
    }
}

// Integers above 2^53 lose precision as f64.
const MAX_EXACT_INTEGER: f64 = 9_007_199_254_740_992.0;

fn number_text(n: &serde_json::Number) -> String {
    if n.is_i64() || n.is_u64() {
        return n.to_string();
    }
    match n.as_f64() {
        Some(v) if v.fract() == 0.0 && v.abs() <= MAX_EXACT_INTEGER => format!("{}", v as i64),
        Some(v) => format!("{}", v),
        None => n.to_string(),
    }
}

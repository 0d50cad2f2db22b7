//! Configuration file handling.
//!
//! Sections:
//! - Services (WFS, routing and timeout)
//! - Business layers loaded over WFS
//! - Raster layers queried over WMS
//! - Initial view and picking tolerance
//! - Highlight colors per result channel

use crate::error::{ConfigError, SettingsError, SettingsResult};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Remote service endpoints.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ServiceSettings {
    /// GeoServer WFS endpoint
    pub wfs_url: String,
    /// OSRM base URL
    pub routing_url: String,
    /// Request timeout in milliseconds
    pub timeout_ms: u64,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            wfs_url: "http://10.8.49.5:8080/geoserver/wrok1/wfs".to_string(),
            routing_url: "https://router.project-osrm.org".to_string(),
            timeout_ms: 30_000,
        }
    }
}

/// One business layer served over WFS.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LayerSettings {
    pub id: String,
    /// Display name
    pub name: String,
    /// WFS type name, e.g. `workspace:layer`
    pub layer_name: String,
    #[serde(default = "default_true")]
    pub visible: bool,
    pub color: String,
    pub border_color: String,
    pub opacity: f64,
}

fn default_true() -> bool {
    true
}

impl LayerSettings {
    fn defaults() -> Vec<Self> {
        vec![
            Self {
                id: "custom_layer_1".to_string(),
                name: "山东省行政区划".to_string(),
                layer_name: "wrok1:面".to_string(),
                visible: true,
                color: "#594A42".to_string(),
                border_color: "#3A4759".to_string(),
                opacity: 0.9,
            },
            Self {
                id: "custom_layer_2".to_string(),
                name: "深圳行政区划".to_string(),
                layer_name: "wrok1:深圳行政区划".to_string(),
                visible: true,
                color: "#3E5F64".to_string(),
                border_color: "#ffffff".to_string(),
                opacity: 0.9,
            },
        ]
    }
}

/// One WMS raster layer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RasterSettings {
    pub id: String,
    pub title: String,
    /// WMS endpoint
    pub url: String,
    pub layer_name: String,
    #[serde(default = "default_true")]
    pub visible: bool,
    #[serde(default)]
    pub z_index: i32,
}

/// Initial view and picking.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ViewSettings {
    pub home_lon: f64,
    pub home_lat: f64,
    pub home_zoom: f64,
    /// Zoom cap when fitting one feature
    pub max_fit_zoom: f64,
    /// Click tolerance in pixels
    pub hit_tolerance_px: f64,
    pub width: f64,
    pub height: f64,
}

impl Default for ViewSettings {
    fn default() -> Self {
        Self {
            home_lon: 116.4,
            home_lat: 39.9,
            home_zoom: 4.0,
            max_fit_zoom: 15.0,
            hit_tolerance_px: 3.0,
            width: 1280.0,
            height: 800.0,
        }
    }
}

/// Stroke and fill of one highlight channel.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChannelColors {
    pub stroke: String,
    pub fill: String,
    pub width: f64,
}

impl ChannelColors {
    fn new(stroke: &str, fill: &str, width: f64) -> Self {
        Self {
            stroke: stroke.to_string(),
            fill: fill.to_string(),
            width,
        }
    }
}

/// Highlight colors for the four result channels.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HighlightSettings {
    pub single_query: ChannelColors,
    pub box_query: ChannelColors,
    pub attribute_query: ChannelColors,
    pub analysis: ChannelColors,
}

impl Default for HighlightSettings {
    fn default() -> Self {
        Self {
            single_query: ChannelColors::new("#ff0000", "rgba(255, 0, 0, 0.3)", 3.0),
            box_query: ChannelColors::new("#0066ff", "rgba(0, 102, 255, 0.3)", 3.0),
            attribute_query: ChannelColors::new("#ff6600", "rgba(255, 102, 0, 0.3)", 3.0),
            analysis: ChannelColors::new("#0099ff", "rgba(0, 153, 255, 0.2)", 2.0),
        }
    }
}

/// Complete application configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub services: ServiceSettings,
    #[serde(default = "LayerSettings::defaults")]
    pub layers: Vec<LayerSettings>,
    #[serde(default)]
    pub rasters: Vec<RasterSettings>,
    #[serde(default)]
    pub view: ViewSettings,
    #[serde(default)]
    pub highlight: HighlightSettings,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            services: ServiceSettings::default(),
            layers: LayerSettings::defaults(),
            rasters: Vec::new(),
            view: ViewSettings::default(),
            highlight: HighlightSettings::default(),
        }
    }
}

impl Config {
    /// Create new configuration with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// `<config dir>/mapscope/config.toml`.
    pub fn default_path() -> SettingsResult<PathBuf> {
        let dir = dirs::config_dir().ok_or(SettingsError::NoConfigDir)?;
        Ok(dir.join("mapscope").join("config.toml"))
    }

    /// Load configuration from file (JSON or TOML)
    pub fn load_from_file(path: &Path) -> SettingsResult<Self> {
        let format = Format::of(path)?;
        let content = std::fs::read_to_string(path).map_err(|e| SettingsError::io(path, e))?;

        let parsed = match format {
            Format::Json => serde_json::from_str::<Config>(&content).map_err(|e| e.to_string()),
            Format::Toml => toml::from_str::<Config>(&content).map_err(|e| e.to_string()),
        };
        let config = parsed.map_err(|reason| SettingsError::Parse {
            path: path.to_path_buf(),
            format: format.name(),
            reason,
        })?;

        config.validate()?;
        tracing::debug!("Loaded settings from {}", path.display());
        Ok(config)
    }

    /// Loads `path` when it exists, defaults otherwise.
    pub fn load_or_default(path: &Path) -> SettingsResult<Self> {
        if path.exists() {
            Self::load_from_file(path)
        } else {
            tracing::info!("No config at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// Save configuration to file
    pub fn save_to_file(&self, path: &Path) -> SettingsResult<()> {
        self.validate()?;
        let format = Format::of(path)?;

        let encoded = match format {
            Format::Json => serde_json::to_string_pretty(self).map_err(|e| e.to_string()),
            Format::Toml => toml::to_string_pretty(self).map_err(|e| e.to_string()),
        };
        let content = encoded.map_err(|reason| SettingsError::Encode {
            format: format.name(),
            reason,
        })?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| SettingsError::io(parent, e))?;
        }
        std::fs::write(path, content).map_err(|e| SettingsError::io(path, e))
    }

    /// Validate configuration
    pub fn validate(&self) -> SettingsResult<()> {
        for (key, url) in [
            ("services.wfs_url", &self.services.wfs_url),
            ("services.routing_url", &self.services.routing_url),
        ] {
            check_url(key, url)?;
        }
        if self.services.timeout_ms == 0 {
            return Err(SettingsError::invalid("services.timeout_ms", "must be > 0"));
        }

        let mut ids = HashSet::new();
        for layer in &self.layers {
            if layer.id.trim().is_empty() {
                return Err(SettingsError::invalid("layers.id", "must not be empty"));
            }
            if !ids.insert(layer.id.as_str()) {
                return Err(ConfigError::DuplicateLayer(layer.id.clone()).into());
            }
            if layer.layer_name.trim().is_empty() {
                return Err(SettingsError::invalid(
                    &format!("layers.{}.layer_name", layer.id),
                    "must not be empty",
                ));
            }
            if !(0.0..=1.0).contains(&layer.opacity) {
                return Err(SettingsError::invalid(
                    &format!("layers.{}.opacity", layer.id),
                    "must be between 0 and 1",
                ));
            }
        }
        for raster in &self.rasters {
            if !ids.insert(raster.id.as_str()) {
                return Err(ConfigError::DuplicateLayer(raster.id.clone()).into());
            }
            check_url(&format!("rasters.{}.url", raster.id), &raster.url)?;
        }

        let view = &self.view;
        if !(-180.0..=180.0).contains(&view.home_lon) {
            return Err(SettingsError::invalid("view.home_lon", "must be in [-180, 180]"));
        }
        if !(-85.0..=85.0).contains(&view.home_lat) {
            return Err(SettingsError::invalid("view.home_lat", "must be in [-85, 85]"));
        }
        if !(0.0..=28.0).contains(&view.home_zoom) || !(0.0..=28.0).contains(&view.max_fit_zoom)
        {
            return Err(SettingsError::invalid("view.zoom", "must be in [0, 28]"));
        }
        if view.hit_tolerance_px <= 0.0 {
            return Err(SettingsError::invalid("view.hit_tolerance_px", "must be > 0"));
        }
        if view.width <= 0.0 || view.height <= 0.0 {
            return Err(SettingsError::invalid("view.size", "must be > 0"));
        }

        Ok(())
    }
}

#[derive(Debug, Clone, Copy)]
enum Format {
    Json,
    Toml,
}

impl Format {
    fn of(path: &Path) -> SettingsResult<Self> {
        let ext = path
            .extension()
            .and_then(|s| s.to_str())
            .unwrap_or("")
            .to_ascii_lowercase();
        match ext.as_str() {
            "json" => Ok(Format::Json),
            "toml" => Ok(Format::Toml),
            _ => Err(ConfigError::UnsupportedFormat(ext).into()),
        }
    }

    fn name(self) -> &'static str {
        match self {
            Format::Json => "JSON",
            Format::Toml => "TOML",
        }
    }
}

fn check_url(key: &str, url: &str) -> SettingsResult<()> {
    if url.starts_with("http://") || url.starts_with("https://") {
        Ok(())
    } else {
        Err(SettingsError::invalid(key, "must be an http(s) URL"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.layers.len(), 2);
        assert_eq!(config.layers[0].layer_name, "wrok1:面");
        assert!(config.layers.iter().all(|l| l.visible));
        assert!(config.rasters.is_empty());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let mut config = Config::default();
        config.services.timeout_ms = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.layers[1].id = config.layers[0].id.clone();
        assert!(matches!(
            config.validate(),
            Err(SettingsError::Config(ConfigError::DuplicateLayer(_)))
        ));

        let mut config = Config::default();
        config.layers[0].opacity = 1.5;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.services.routing_url = "router.local".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_toml_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let mut config = Config::default();
        config.view.home_zoom = 6.0;
        config.rasters.push(RasterSettings {
            id: "dem".to_string(),
            title: "DEM".to_string(),
            url: "http://localhost:8080/geoserver/wms".to_string(),
            layer_name: "ws:dem".to_string(),
            visible: true,
            z_index: 2,
        });

        config.save_to_file(&path).unwrap();
        let loaded = Config::load_from_file(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"view": {"home_lon": 120.0, "home_lat": 30.0,
            "home_zoom": 8, "max_fit_zoom": 14, "hit_tolerance_px": 5,
            "width": 800, "height": 600}}"#)
        .unwrap();

        let config = Config::load_from_file(&path).unwrap();
        assert_eq!(config.view.home_lon, 120.0);
        assert_eq!(config.layers.len(), 2);
        assert_eq!(config.services, ServiceSettings::default());
    }

    #[test]
    fn test_unsupported_extension() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        assert!(matches!(
            Config::default().save_to_file(&path),
            Err(SettingsError::Config(ConfigError::UnsupportedFormat(_)))
        ));
    }

    #[test]
    fn test_parse_error_names_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{ not json").unwrap();
        let err = Config::load_from_file(&path).unwrap_err();
        assert!(matches!(err, SettingsError::Parse { format: "JSON", .. }));
        assert!(err.to_string().contains("config.json"));
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let dir = tempdir().unwrap();
        let config = Config::load_or_default(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_invalid_file_is_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "[services]\nwfs_url = \"http://x\"\nrouting_url = \"http://y\"\ntimeout_ms = 0\n",
        )
        .unwrap();
        assert!(matches!(
            Config::load_from_file(&path),
            Err(SettingsError::Invalid { .. })
        ));
    }
}

//! MapScope Settings Crate
//!
//! Handles viewer configuration: service endpoints, business layers, the
//! initial view and highlight colors.

pub mod config;
pub mod error;

pub use config::{
    ChannelColors, Config, HighlightSettings, LayerSettings, RasterSettings, ServiceSettings,
    ViewSettings,
};
pub use error::{ConfigError, SettingsError, SettingsResult};

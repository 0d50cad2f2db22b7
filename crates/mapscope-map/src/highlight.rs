//! Highlight channel manager.
//!
//! Each channel is a dedicated overlay collection with a fixed style. Setting
//! a channel replaces its whole content with clones of the given features;
//! the source features in the layer stores are never touched.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::feature::Feature;

/// The four highlight overlays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HighlightChannel {
    /// Feature picked by a single click.
    SingleQuery,
    /// Features inside a dragged box.
    BoxQuery,
    /// Features matching an attribute predicate.
    AttributeQuery,
    /// Buffer polygons and the computed route.
    Analysis,
}

impl HighlightChannel {
    /// Every channel.
    pub const ALL: [HighlightChannel; 4] = [
        HighlightChannel::SingleQuery,
        HighlightChannel::BoxQuery,
        HighlightChannel::AttributeQuery,
        HighlightChannel::Analysis,
    ];

    /// The channels fed by queries.
    pub const QUERY: [HighlightChannel; 3] = [
        HighlightChannel::SingleQuery,
        HighlightChannel::BoxQuery,
        HighlightChannel::AttributeQuery,
    ];

    fn index(self) -> usize {
        match self {
            HighlightChannel::SingleQuery => 0,
            HighlightChannel::BoxQuery => 1,
            HighlightChannel::AttributeQuery => 2,
            HighlightChannel::Analysis => 3,
        }
    }
}

impl fmt::Display for HighlightChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HighlightChannel::SingleQuery => write!(f, "single-query"),
            HighlightChannel::BoxQuery => write!(f, "box-query"),
            HighlightChannel::AttributeQuery => write!(f, "attribute-query"),
            HighlightChannel::Analysis => write!(f, "analysis"),
        }
    }
}

/// Stroke and fill of a highlight channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HighlightStyle {
    /// Stroke color, any CSS color string.
    pub stroke: String,
    /// Fill color, any CSS color string.
    pub fill: String,
    /// Stroke width in pixels.
    pub width: f64,
}

impl HighlightStyle {
    pub fn new(stroke: impl Into<String>, fill: impl Into<String>, width: f64) -> Self {
        Self {
            stroke: stroke.into(),
            fill: fill.into(),
            width,
        }
    }

    /// Default style of a channel.
    pub fn default_for(channel: HighlightChannel) -> Self {
        match channel {
            HighlightChannel::SingleQuery => Self::new("#ff0000", "rgba(255, 0, 0, 0.3)", 3.0),
            HighlightChannel::BoxQuery => Self::new("#0066ff", "rgba(0, 102, 255, 0.3)", 3.0),
            HighlightChannel::AttributeQuery => {
                Self::new("#ff6600", "rgba(255, 102, 0, 0.3)", 3.0)
            }
            HighlightChannel::Analysis => Self::new("#0099ff", "rgba(0, 153, 255, 0.2)", 2.0),
        }
    }
}

#[derive(Debug, Clone)]
struct ChannelState {
    style: HighlightStyle,
    features: Vec<Feature>,
}

/// Owner of the highlight overlays.
#[derive(Debug, Clone)]
pub struct HighlightManager {
    channels: [ChannelState; 4],
}

impl HighlightManager {
    /// Creates a manager with the default channel styles.
    pub fn new() -> Self {
        Self {
            channels: HighlightChannel::ALL.map(|c| ChannelState {
                style: HighlightStyle::default_for(c),
                features: Vec::new(),
            }),
        }
    }

    /// Overrides a channel's style.
    pub fn set_style(&mut self, channel: HighlightChannel, style: HighlightStyle) {
        self.channels[channel.index()].style = style;
    }

    pub fn style(&self, channel: HighlightChannel) -> &HighlightStyle {
        &self.channels[channel.index()].style
    }

    /// Replaces a channel's content with clones of `features`.
    pub fn set<'a>(
        &mut self,
        channel: HighlightChannel,
        features: impl IntoIterator<Item = &'a Feature>,
    ) {
        let cloned: Vec<Feature> = features.into_iter().cloned().collect();
        tracing::debug!("Highlight {}: {} features", channel, cloned.len());
        self.channels[channel.index()].features = cloned;
    }

    /// Empties one channel.
    pub fn clear(&mut self, channel: HighlightChannel) {
        self.channels[channel.index()].features.clear();
    }

    /// Empties the three query channels; the analysis channel is kept.
    pub fn clear_all(&mut self) {
        for channel in HighlightChannel::QUERY {
            self.clear(channel);
        }
    }

    /// Current content of a channel.
    pub fn features(&self, channel: HighlightChannel) -> &[Feature] {
        &self.channels[channel.index()].features
    }

    pub fn len(&self, channel: HighlightChannel) -> usize {
        self.channels[channel.index()].features.len()
    }

    pub fn is_empty(&self, channel: HighlightChannel) -> bool {
        self.channels[channel.index()].features.is_empty()
    }
}

impl Default for HighlightManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Coordinate, Geometry};

    fn feature(name: &str) -> Feature {
        Feature::new(Geometry::Point(Coordinate::new(0.0, 0.0))).with_attribute("name", name)
    }

    #[test]
    fn test_channels_are_independent() {
        let mut manager = HighlightManager::new();
        let x = vec![feature("x")];
        let y = vec![feature("y1"), feature("y2")];

        manager.set(HighlightChannel::SingleQuery, &x);
        manager.set(HighlightChannel::BoxQuery, &y);
        manager.clear(HighlightChannel::SingleQuery);

        assert!(manager.is_empty(HighlightChannel::SingleQuery));
        assert_eq!(manager.features(HighlightChannel::BoxQuery), y.as_slice());
    }

    #[test]
    fn test_set_replaces() {
        let mut manager = HighlightManager::new();
        manager.set(HighlightChannel::AttributeQuery, &[feature("a"), feature("b")]);
        manager.set(HighlightChannel::AttributeQuery, &[feature("c")]);
        assert_eq!(manager.len(HighlightChannel::AttributeQuery), 1);
    }

    #[test]
    fn test_clear_all_keeps_analysis() {
        let mut manager = HighlightManager::new();
        for channel in HighlightChannel::ALL {
            manager.set(channel, &[feature("f")]);
        }
        manager.clear_all();
        for channel in HighlightChannel::QUERY {
            assert!(manager.is_empty(channel));
        }
        assert_eq!(manager.len(HighlightChannel::Analysis), 1);
    }

    #[test]
    fn test_clones_are_independent() {
        let mut manager = HighlightManager::new();
        let source = feature("orig");
        manager.set(HighlightChannel::SingleQuery, [&source]);
        assert_eq!(manager.features(HighlightChannel::SingleQuery)[0], source);
        assert_eq!(source.attribute_text("name").as_deref(), Some("orig"));
    }
}

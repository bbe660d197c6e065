//! Configuration for the tile overlay
//!
//! Options can be built from presets, tweaked field by field, or loaded from JSON
//! (missing fields fall back to the defaults of the balanced preset).

use crate::{rendering::color::SerializableColor, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Default)]
pub enum CompositorProfile {
    #[default]
    Balanced,
    /// No extra cache headroom; for memory-constrained hosts
    LowMemory,
    /// Generous cache headroom for hosts that pan a lot
    Prefetching,
    Custom(CompositorOptions),
}

impl CompositorProfile {
    pub fn resolve(&self) -> CompositorOptions {
        match self {
            Self::Balanced => CompositorOptions {
                overshoot_tile_cache: 8,
                ..CompositorOptions::base()
            },
            Self::LowMemory => CompositorOptions {
                overshoot_tile_cache: 0,
                ..CompositorOptions::base()
            },
            Self::Prefetching => CompositorOptions {
                overshoot_tile_cache: 32,
                ..CompositorOptions::base()
            },
            Self::Custom(options) => options.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompositorOptions {
    /// Extra tiles requested from the cache beyond the visible count
    pub overshoot_tile_cache: usize,
    /// Placeholder background; transparent disables the placeholder
    pub loading_background: SerializableColor,
    /// Placeholder grid lines
    pub loading_line: SerializableColor,
    /// Draw tile labels, cell borders and the center crosshair
    pub debug: bool,
}

impl CompositorOptions {
    fn base() -> Self {
        Self {
            overshoot_tile_cache: 0,
            loading_background: SerializableColor::loading_background(),
            loading_line: SerializableColor::loading_line(),
            debug: false,
        }
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Whether a placeholder is drawn for tiles that are not ready
    pub fn placeholder_enabled(&self) -> bool {
        !self.loading_background.is_transparent()
    }
}

impl Default for CompositorOptions {
    fn default() -> Self {
        CompositorProfile::default().resolve()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_presets() {
        let balanced = CompositorProfile::Balanced.resolve();
        let low_memory = CompositorProfile::LowMemory.resolve();
        let prefetching = CompositorProfile::Prefetching.resolve();

        assert_eq!(balanced, CompositorOptions::default());
        assert_eq!(low_memory.overshoot_tile_cache, 0);
        assert!(prefetching.overshoot_tile_cache > balanced.overshoot_tile_cache);
        assert!(balanced.placeholder_enabled());
        assert!(!balanced.debug);
    }

    #[test]
    fn test_custom_profile_passes_through() {
        let options = CompositorOptions {
            debug: true,
            ..CompositorOptions::default()
        };
        assert_eq!(CompositorProfile::Custom(options.clone()).resolve(), options);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let options = CompositorOptions::from_json(
            r#"{ "overshoot_tile_cache": 3, "loading_background": { "r": 0, "g": 0, "b": 0, "a": 0 } }"#,
        )
        .unwrap();

        assert_eq!(options.overshoot_tile_cache, 3);
        assert!(!options.placeholder_enabled());
        assert_eq!(options.loading_line, SerializableColor::loading_line());
        assert!(!options.debug);
    }

    #[test]
    fn test_json_round_trip() {
        let options = CompositorProfile::Prefetching.resolve();
        let json = options.to_json().unwrap();
        assert_eq!(CompositorOptions::from_json(&json).unwrap(), options);
    }

    #[test]
    fn test_malformed_json_is_an_error() {
        assert!(CompositorOptions::from_json("{ overshoot").is_err());
    }
}

//! Layer configuration

use serde::{Deserialize, Serialize};
use worm_anchor::AnchorConfig;

use crate::error::ConfigError;

/// Timing and appearance of the render layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RenderConfig {
    /// Minimum interval between re-plans
    pub throttle_ms: u64,
    /// Quiet time after the last scroll event before markers fade back in
    pub scroll_idle_ms: u64,
    /// Marker opacity while the page scrolls
    pub scrolling_opacity: f64,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            throttle_ms: 100,
            scroll_idle_ms: 150,
            scrolling_opacity: 0.2,
        }
    }
}

/// Complete configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WormConfig {
    pub anchor: AnchorConfig,
    pub render: RenderConfig,
}

impl WormConfig {
    /// Parse from JSON; missing fields keep their defaults
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: WormConfig = serde_json::from_str(json)?;
        if !(0.0..=1.0).contains(&config.render.scrolling_opacity) {
            return Err(ConfigError::Invalid(format!(
                "scrollingOpacity must be within [0, 1], got {}",
                config.render.scrolling_opacity
            )));
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = WormConfig::default();
        assert_eq!(config.render.throttle_ms, 100);
        assert_eq!(config.render.scroll_idle_ms, 150);
        assert_eq!(config.anchor.max_quote_chars, 1024);
    }

    #[test]
    fn test_partial_json() {
        let config = WormConfig::from_json(r#"{"render": {"throttleMs": 40}, "anchor": {"maxContextChars": 32}}"#).unwrap();
        assert_eq!(config.render.throttle_ms, 40);
        assert_eq!(config.render.scroll_idle_ms, 150);
        assert_eq!(config.anchor.max_context_chars, 32);
        assert_eq!(config.anchor.max_quote_chars, 1024);

        assert_eq!(WormConfig::from_json("{}").unwrap(), WormConfig::default());
    }

    #[test]
    fn test_rejects_bad_input() {
        assert!(matches!(WormConfig::from_json("{"), Err(ConfigError::Json(_))));
        assert!(matches!(
            WormConfig::from_json(r#"{"render": {"scrollingOpacity": 3}}"#),
            Err(ConfigError::Invalid(_))
        ));
    }
}

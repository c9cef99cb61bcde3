//! Configuration for the ray-traced render

use serde::{Deserialize, Serialize};

use crate::color::is_valid_color_name;
use crate::config::ConfigError;

/// Render settings applied after coloring
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RenderConfig {
    /// Image width in pixels
    pub width: u32,

    /// Image height in pixels
    pub height: u32,

    /// Resolution recorded in the written image
    pub dpi: u32,

    /// Antialiasing level
    pub antialias: u32,

    /// Background color name
    pub background: String,

    /// Whether ray trace mode is switched on
    pub ray_trace: bool,

    /// Ray trace outline gain
    pub ray_trace_gain: f64,

    /// Cartoon style variant with fancy helices
    pub fancy_helices: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 900,
            height: 900,
            dpi: 300,
            antialias: 3,
            background: "white".to_string(),
            ray_trace: true,
            ray_trace_gain: 0.001,
            fancy_helices: true,
        }
    }
}

impl RenderConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the rendered image size
    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Set the output DPI
    pub fn with_dpi(mut self, dpi: u32) -> Self {
        self.dpi = dpi;
        self
    }

    /// Set the antialiasing level
    pub fn with_antialias(mut self, level: u32) -> Self {
        self.antialias = level;
        self
    }

    /// Set the background color name
    pub fn with_background(mut self, background: impl Into<String>) -> Self {
        self.background = background.into();
        self
    }

    /// Enable or disable ray trace mode
    pub fn with_ray_trace(mut self, enabled: bool) -> Self {
        self.ray_trace = enabled;
        self
    }

    /// Set the ray trace gain
    pub fn with_ray_trace_gain(mut self, gain: f64) -> Self {
        self.ray_trace_gain = gain;
        self
    }

    /// Enable or disable fancy helices
    pub fn with_fancy_helices(mut self, enabled: bool) -> Self {
        self.fancy_helices = enabled;
        self
    }

    /// Ray trace mode as the engine setting value
    pub fn ray_trace_mode(&self) -> u32 {
        u32::from(self.ray_trace)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for (what, value) in [("width", self.width), ("height", self.height), ("dpi", self.dpi)] {
            if value == 0 {
                return Err(ConfigError::ZeroValue { what });
            }
        }
        if !self.ray_trace_gain.is_finite() || self.ray_trace_gain < 0.0 {
            return Err(ConfigError::InvalidGain {
                gain: self.ray_trace_gain,
            });
        }
        if self.background.trim().is_empty() {
            return Err(ConfigError::EmptyBackground);
        }
        if !is_valid_color_name(&self.background) {
            return Err(ConfigError::InvalidBackground {
                background: self.background.clone(),
            });
        }
        if self.ray_trace && !self.background.eq_ignore_ascii_case("white") {
            return Err(ConfigError::RayTraceBackground {
                background: self.background.clone(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = RenderConfig::default();
        assert_eq!((config.width, config.height), (900, 900));
        assert_eq!(config.dpi, 300);
        assert_eq!(config.antialias, 3);
        assert_eq!(config.background, "white");
        assert!(config.ray_trace);
        assert_eq!(config.ray_trace_mode(), 1);
        assert_eq!(config.ray_trace_gain, 0.001);
        assert!(config.fancy_helices);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder_pattern() {
        let config = RenderConfig::new()
            .with_size(1200, 800)
            .with_dpi(600)
            .with_antialias(2)
            .with_ray_trace(false)
            .with_background("black")
            .with_ray_trace_gain(0.1)
            .with_fancy_helices(false);

        assert_eq!((config.width, config.height), (1200, 800));
        assert_eq!(config.dpi, 600);
        assert_eq!(config.antialias, 2);
        assert_eq!(config.ray_trace_mode(), 0);
        assert_eq!(config.background, "black");
        assert!(!config.fancy_helices);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_ray_trace_requires_white_background() {
        let config = RenderConfig::new().with_background("black");
        assert!(matches!(
            config.validate(),
            Err(ConfigError::RayTraceBackground { .. })
        ));
    }

    #[test]
    fn test_background_must_be_a_color_name() {
        for background in ["light blue", "png", "#ffffff"] {
            let config = RenderConfig::new()
                .with_ray_trace(false)
                .with_background(background);
            assert!(
                matches!(config.validate(), Err(ConfigError::InvalidBackground { .. })),
                "{} accepted",
                background
            );
        }
        let config = RenderConfig::new().with_background("");
        assert!(matches!(config.validate(), Err(ConfigError::EmptyBackground)));
        let config = RenderConfig::new()
            .with_ray_trace(false)
            .with_background("grey70");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_dimensions_rejected() {
        let config = RenderConfig::new().with_size(0, 900);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ZeroValue { what: "width" })
        ));
        let config = RenderConfig::new().with_dpi(0);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ZeroValue { what: "dpi" })
        ));
    }

    #[test]
    fn test_negative_gain_rejected() {
        let config = RenderConfig::new().with_ray_trace_gain(-1.0);
        assert!(matches!(config.validate(), Err(ConfigError::InvalidGain { .. })));
    }
}

//! Scene configuration files
//!
//! Scenes can be described in TOML. Every section is optional; anything left
//! out keeps the built-in default, which reproduces the classic four-band
//! confidence coloring.
//!
//! ```toml
//! representation = "cartoon"
//! attribute = "b"
//!
//! [metadata]
//! name = "FOXG"
//!
//! [render]
//! width = 900
//! height = 900
//!
//! [output]
//! path = "FOXG_07142.png"
//!
//! [[bands]]
//! name = "n0"
//! rgb = [0.051, 0.341, 0.827]
//! threshold = 100.0
//! ```

use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::color::{ColorBand, Palette, Rgb};
use crate::scene::{Attribute, OutputTarget, RenderConfig, Representation, SceneConfig};

/// Errors that can occur when loading or validating a scene configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read scene file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse scene TOML: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("Failed to serialize scene TOML: {0}")]
    SerializeError(#[from] toml::ser::Error),

    #[error("palette must contain at least one color band")]
    EmptyPalette,
    #[error("invalid color band name '{name}'")]
    InvalidBandName { name: String },
    #[error("color band name '{name}' shadows a builtin color")]
    BuiltinBandName { name: String },
    #[error("duplicate color band '{name}'")]
    DuplicateBand { name: String },
    #[error("color bands '{first}' and '{second}' share threshold {threshold}")]
    DuplicateThreshold {
        threshold: f64,
        first: String,
        second: String,
    },
    #[error("color band '{name}' has a non-finite threshold")]
    NonFiniteThreshold { name: String },
    #[error("color band '{name}' has components outside [0, 1]: {rgb}")]
    ComponentOutOfRange { name: String, rgb: Rgb },

    #[error("{what} must be positive")]
    ZeroValue { what: &'static str },
    #[error("ray trace gain must be finite and non-negative, got {gain}")]
    InvalidGain { gain: f64 },
    #[error("background color must not be empty")]
    EmptyBackground,
    #[error("invalid background color name '{background}'")]
    InvalidBackground { background: String },
    #[error("ray tracing requires a white background, got '{background}'")]
    RayTraceBackground { background: String },
    #[error("'{representation}' cannot be used as the scene representation")]
    InvalidRepresentation { representation: Representation },

    #[error("output path must not be empty")]
    EmptyOutputPath,
    #[error("unsupported image format for '{}' (expected .png)", path.display())]
    UnsupportedFormat { path: PathBuf },
}

/// TOML structure for (de)serializing scenes
#[derive(Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct TomlScene {
    #[serde(default)]
    representation: Representation,
    #[serde(default)]
    attribute: Attribute,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    metadata: Option<TomlMetadata>,
    #[serde(default)]
    render: RenderConfig,
    #[serde(default)]
    output: TomlOutput,
    #[serde(default = "default_bands")]
    bands: Vec<ColorBand>,
}

#[derive(Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct TomlMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<String>,
}

#[derive(Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct TomlOutput {
    path: PathBuf,
}

impl Default for TomlOutput {
    fn default() -> Self {
        Self {
            path: OutputTarget::default().path().to_path_buf(),
        }
    }
}

fn default_bands() -> Vec<ColorBand> {
    Palette::default().bands().to_vec()
}

impl FromStr for SceneConfig {
    type Err = ConfigError;

    /// Load a scene from a TOML string
    fn from_str(content: &str) -> Result<Self, Self::Err> {
        let parsed: TomlScene = toml::from_str(content)?;

        let config = SceneConfig {
            name: parsed.metadata.as_ref().and_then(|m| m.name.clone()),
            description: parsed.metadata.as_ref().and_then(|m| m.description.clone()),
            representation: parsed.representation,
            attribute: parsed.attribute,
            palette: Palette::new(parsed.bands)?,
            render: parsed.render,
            output: OutputTarget::new(parsed.output.path)?,
        };
        config.validate()?;

        debug!(
            bands = config.palette.bands().len(),
            output = %config.output.path().display(),
            "scene loaded"
        );
        Ok(config)
    }
}

impl SceneConfig {
    /// Load a scene from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        debug!(path = %path.display(), "loading scene file");
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    /// Serialize the scene back to TOML
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        let metadata = if self.name.is_some() || self.description.is_some() {
            Some(TomlMetadata {
                name: self.name.clone(),
                description: self.description.clone(),
            })
        } else {
            None
        };
        let scene = TomlScene {
            representation: self.representation,
            attribute: self.attribute,
            metadata,
            render: self.render.clone(),
            output: TomlOutput {
                path: self.output.path().to_path_buf(),
            },
            bands: self.palette.bands().to_vec(),
        };
        Ok(toml::to_string(&scene)?)
    }
}

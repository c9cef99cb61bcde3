//! Engine directives and the scene configurator
//!
//! A [`Directive`] is one command of the engine's command language. Its
//! `Display` form is exactly the line written to a command script, so a
//! generated script parses back into the same directives.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;
use tracing::debug;

use crate::color::Rgb;
use crate::scene::{ImageFormat, Representation, SceneConfig, Selection};

/// Value of a generic `set` command
#[derive(Debug, Clone, PartialEq)]
pub enum SettingValue {
    Number(f64),
    Text(String),
}

impl fmt::Display for SettingValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingValue::Number(n) => write!(f, "{}", n),
            SettingValue::Text(s) => f.write_str(s),
        }
    }
}

/// A setting value of the wrong shape for its key
#[derive(Debug, Clone, Error)]
#[error("invalid value '{value}' for setting '{key}': expected {expected}")]
pub struct SettingError {
    pub key: String,
    pub value: String,
    pub expected: &'static str,
}

/// Rendering options issued before the render
#[derive(Debug, Clone, PartialEq)]
pub enum RenderOption {
    RayTraceMode(u32),
    Background(String),
    Antialias(u32),
    RayTraceGain(f64),
    CartoonFancyHelices(bool),
    /// Any setting without a typed counterpart
    Other { key: String, value: SettingValue },
}

impl RenderOption {
    /// Build a typed option from a `set KEY, VALUE` pair
    pub fn from_setting(key: &str, value: SettingValue) -> Result<Self, SettingError> {
        let rendered = value.to_string();
        let invalid = |expected| SettingError {
            key: key.to_string(),
            value: rendered.clone(),
            expected,
        };
        match key {
            "ray_trace_mode" => as_count(&value)
                .map(RenderOption::RayTraceMode)
                .ok_or_else(|| invalid("a non-negative integer")),
            "antialias" => as_count(&value)
                .map(RenderOption::Antialias)
                .ok_or_else(|| invalid("a non-negative integer")),
            "ray_trace_gain" => match value {
                SettingValue::Number(n) if n.is_finite() => Ok(RenderOption::RayTraceGain(n)),
                _ => Err(invalid("a number")),
            },
            "cartoon_fancy_helices" => match as_count(&value) {
                Some(0) => Ok(RenderOption::CartoonFancyHelices(false)),
                Some(1) => Ok(RenderOption::CartoonFancyHelices(true)),
                _ => Err(invalid("0 or 1")),
            },
            "bg_color" => match value {
                SettingValue::Text(name) => Ok(RenderOption::Background(name)),
                SettingValue::Number(_) => Err(invalid("a color name")),
            },
            _ => Ok(RenderOption::Other {
                key: key.to_string(),
                value,
            }),
        }
    }

    /// Setting key this option is stored under by the engine
    pub fn key(&self) -> &str {
        match self {
            RenderOption::RayTraceMode(_) => "ray_trace_mode",
            RenderOption::Background(_) => "bg_color",
            RenderOption::Antialias(_) => "antialias",
            RenderOption::RayTraceGain(_) => "ray_trace_gain",
            RenderOption::CartoonFancyHelices(_) => "cartoon_fancy_helices",
            RenderOption::Other { key, .. } => key,
        }
    }
}

fn as_count(value: &SettingValue) -> Option<u32> {
    match value {
        SettingValue::Number(n) if n.fract() == 0.0 && *n >= 0.0 && *n <= u32::MAX as f64 => {
            Some(*n as u32)
        }
        _ => None,
    }
}

impl fmt::Display for RenderOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderOption::Background(name) => write!(f, "bg_color {}", name),
            RenderOption::RayTraceMode(mode) => write!(f, "set ray_trace_mode, {}", mode),
            RenderOption::Antialias(level) => write!(f, "set antialias, {}", level),
            RenderOption::RayTraceGain(gain) => write!(f, "set ray_trace_gain, {}", gain),
            RenderOption::CartoonFancyHelices(on) => {
                write!(f, "set cartoon_fancy_helices, {}", u8::from(*on))
            }
            RenderOption::Other { key, value } => write!(f, "set {}, {}", key, value),
        }
    }
}

/// One command sent to the visualization engine
#[derive(Debug, Clone, PartialEq)]
pub enum Directive {
    Hide {
        representation: Representation,
        selection: Selection,
    },
    Show {
        representation: Representation,
        selection: Selection,
    },
    SetColor {
        name: String,
        rgb: Rgb,
    },
    Color {
        name: String,
        selection: Selection,
    },
    Set(RenderOption),
    Ray {
        width: u32,
        height: u32,
    },
    Png {
        path: PathBuf,
        format: ImageFormat,
        dpi: u32,
    },
}

impl fmt::Display for Directive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Directive::Hide {
                representation,
                selection,
            } => write!(f, "hide {}, {}", representation, selection),
            Directive::Show {
                representation,
                selection,
            } => write!(f, "show {}, {}", representation, selection),
            Directive::SetColor { name, rgb } => write!(f, "set_color {}, {}", name, rgb),
            Directive::Color { name, selection } => write!(f, "color {}, {}", name, selection),
            Directive::Set(option) => write!(f, "{}", option),
            Directive::Ray { width, height } => write!(f, "ray {}, {}", width, height),
            Directive::Png { path, dpi, .. } => {
                let path = path.display().to_string();
                if needs_quoting(&path) {
                    write!(f, "png \"{}\", dpi={}", escape(&path), dpi)
                } else {
                    write!(f, "png {}, dpi={}", path, dpi)
                }
            }
        }
    }
}

/// Characters a bare word may contain in a command script
fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '/' | '-')
}

/// A path can go out bare only if it lexes back as a single word
fn needs_quoting(path: &str) -> bool {
    !path.chars().all(is_word_char) || !path.chars().any(|c| c.is_ascii_alphabetic() || c == '_')
}

fn escape(text: &str) -> String {
    text.replace('\\', "\\\\").replace('"', "\\\"")
}

/// Build the directive sequence for a scene.
///
/// The order is fixed: clear annotations, show the representation, register
/// the band colors, apply the color rules from the widest band to the
/// narrowest, set render options, render, write the image. The widest band
/// is applied to every element so values above all thresholds keep its
/// color; each later rule overwrites the elements below its threshold.
pub fn build_directives(config: &SceneConfig) -> Vec<Directive> {
    let bands = config.palette.bands();
    let render = &config.render;
    let mut directives = Vec::with_capacity(bands.len() * 2 + 9);

    directives.push(Directive::Hide {
        representation: Representation::Everything,
        selection: Selection::All,
    });
    directives.push(Directive::Show {
        representation: config.representation,
        selection: Selection::All,
    });

    for band in bands {
        directives.push(Directive::SetColor {
            name: band.name.clone(),
            rgb: band.rgb,
        });
    }

    for (i, band) in bands.iter().enumerate() {
        let selection = if i == 0 {
            Selection::All
        } else {
            Selection::below(config.attribute, band.threshold)
        };
        directives.push(Directive::Color {
            name: band.name.clone(),
            selection,
        });
    }

    directives.extend(
        [
            RenderOption::RayTraceMode(render.ray_trace_mode()),
            RenderOption::Background(render.background.clone()),
            RenderOption::Antialias(render.antialias),
            RenderOption::RayTraceGain(render.ray_trace_gain),
            RenderOption::CartoonFancyHelices(render.fancy_helices),
        ]
        .into_iter()
        .map(Directive::Set),
    );

    directives.push(Directive::Ray {
        width: render.width,
        height: render.height,
    });
    directives.push(Directive::Png {
        path: config.output.path().to_path_buf(),
        format: config.output.format(),
        dpi: render.dpi,
    });

    debug!(count = directives.len(), "built directive sequence");
    directives
}

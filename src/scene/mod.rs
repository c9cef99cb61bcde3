//! Scene description: what to show, how to color it, how to render it
//!
//! A [`SceneConfig`] is the single input of the configurator. It is built
//! once, validated, and turned into directives by
//! [`build_directives`](crate::directive::build_directives).

pub mod config;
pub mod output;

pub use config::RenderConfig;
pub use output::{ImageFormat, OutputTarget};

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::color::Palette;
use crate::config::ConfigError;

/// A name that does not denote any known variant
#[derive(Debug, Clone, Error)]
#[error("unknown {kind} '{name}'")]
pub struct UnknownName {
    pub kind: &'static str,
    pub name: String,
}

/// Molecular representation styles
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Representation {
    /// Every representation at once; only meaningful when hiding
    Everything,
    Lines,
    #[default]
    Cartoon,
    Sticks,
    Spheres,
    Surface,
    Ribbon,
}

impl Representation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Representation::Everything => "everything",
            Representation::Lines => "lines",
            Representation::Cartoon => "cartoon",
            Representation::Sticks => "sticks",
            Representation::Spheres => "spheres",
            Representation::Surface => "surface",
            Representation::Ribbon => "ribbon",
        }
    }
}

impl fmt::Display for Representation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Representation {
    type Err = UnknownName;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "everything" => Ok(Representation::Everything),
            "lines" => Ok(Representation::Lines),
            "cartoon" => Ok(Representation::Cartoon),
            "sticks" => Ok(Representation::Sticks),
            "spheres" => Ok(Representation::Spheres),
            "surface" => Ok(Representation::Surface),
            "ribbon" => Ok(Representation::Ribbon),
            other => Err(UnknownName {
                kind: "representation",
                name: other.to_string(),
            }),
        }
    }
}

/// Per-element scalar attributes a selection can test
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Attribute {
    /// B-factor, or a confidence score stored in its column
    #[default]
    B,
    /// Occupancy
    Q,
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Attribute::B => f.write_str("b"),
            Attribute::Q => f.write_str("q"),
        }
    }
}

impl FromStr for Attribute {
    type Err = UnknownName;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "b" => Ok(Attribute::B),
            "q" => Ok(Attribute::Q),
            other => Err(UnknownName {
                kind: "attribute",
                name: other.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    Less,
    LessOrEqual,
    Greater,
    GreaterOrEqual,
}

impl Comparison {
    pub fn holds(&self, lhs: f64, rhs: f64) -> bool {
        match self {
            Comparison::Less => lhs < rhs,
            Comparison::LessOrEqual => lhs <= rhs,
            Comparison::Greater => lhs > rhs,
            Comparison::GreaterOrEqual => lhs >= rhs,
        }
    }

    fn is_upper_bound(&self) -> bool {
        matches!(self, Comparison::Less | Comparison::LessOrEqual)
    }
}

impl fmt::Display for Comparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Comparison::Less => "<",
            Comparison::LessOrEqual => "<=",
            Comparison::Greater => ">",
            Comparison::GreaterOrEqual => ">=",
        })
    }
}

/// Which elements a directive applies to
#[derive(Debug, Clone, PartialEq)]
pub enum Selection {
    All,
    Attribute {
        attribute: Attribute,
        comparison: Comparison,
        value: f64,
    },
}

impl Selection {
    pub fn below(attribute: Attribute, value: f64) -> Self {
        Selection::Attribute {
            attribute,
            comparison: Comparison::Less,
            value,
        }
    }

    /// Whether an element with the given attribute reader is selected
    pub fn matches(&self, read: impl Fn(Attribute) -> f64) -> bool {
        match self {
            Selection::All => true,
            Selection::Attribute {
                attribute,
                comparison,
                value,
            } => comparison.holds(read(*attribute), *value),
        }
    }

    /// Whether every element selected by `other` is also selected by `self`
    ///
    /// Only decides the cases that matter for one-sided threshold rules;
    /// anything else answers `false`.
    pub fn contains(&self, other: &Selection) -> bool {
        match (self, other) {
            (Selection::All, _) => true,
            (Selection::Attribute { .. }, Selection::All) => false,
            (
                Selection::Attribute {
                    attribute: a1,
                    comparison: c1,
                    value: v1,
                },
                Selection::Attribute {
                    attribute: a2,
                    comparison: c2,
                    value: v2,
                },
            ) => {
                if a1 != a2 || c1.is_upper_bound() != c2.is_upper_bound() {
                    return false;
                }
                let strict_inside_loose = matches!(
                    (c1, c2),
                    (Comparison::LessOrEqual, Comparison::Less)
                        | (Comparison::GreaterOrEqual, Comparison::Greater)
                );
                let same_kind = c1 == c2;
                if c1.is_upper_bound() {
                    if same_kind || strict_inside_loose {
                        v1 >= v2
                    } else {
                        v1 > v2
                    }
                } else if same_kind || strict_inside_loose {
                    v1 <= v2
                } else {
                    v1 < v2
                }
            }
        }
    }

    /// Upper bound of an upper-bounded selection
    pub fn upper_bound(&self) -> Option<f64> {
        match self {
            Selection::Attribute {
                comparison, value, ..
            } if comparison.is_upper_bound() => Some(*value),
            _ => None,
        }
    }
}

impl fmt::Display for Selection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Selection::All => f.write_str("all"),
            Selection::Attribute {
                attribute,
                comparison,
                value,
            } => write!(f, "{} {} {}", attribute, comparison, value),
        }
    }
}

/// Everything the configurator needs for one run
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SceneConfig {
    pub name: Option<String>,
    pub description: Option<String>,
    pub representation: Representation,
    pub attribute: Attribute,
    pub palette: Palette,
    pub render: RenderConfig,
    pub output: OutputTarget,
}

impl SceneConfig {
    /// Create a new configuration with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the representation shown for the whole structure
    pub fn with_representation(mut self, representation: Representation) -> Self {
        self.representation = representation;
        self
    }

    /// Set the attribute the color bands test
    pub fn with_attribute(mut self, attribute: Attribute) -> Self {
        self.attribute = attribute;
        self
    }

    pub fn with_palette(mut self, palette: Palette) -> Self {
        self.palette = palette;
        self
    }

    pub fn with_render(mut self, render: RenderConfig) -> Self {
        self.render = render;
        self
    }

    pub fn with_output(mut self, output: OutputTarget) -> Self {
        self.output = output;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.representation == Representation::Everything {
            return Err(ConfigError::InvalidRepresentation {
                representation: self.representation,
            });
        }
        self.render.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_representation_names_round_trip() {
        for rep in [
            Representation::Everything,
            Representation::Lines,
            Representation::Cartoon,
            Representation::Sticks,
            Representation::Spheres,
            Representation::Surface,
            Representation::Ribbon,
        ] {
            assert_eq!(rep.as_str().parse::<Representation>().ok(), Some(rep));
        }
        assert!("licorice".parse::<Representation>().is_err());
    }

    #[test]
    fn test_selection_display() {
        assert_eq!(Selection::All.to_string(), "all");
        assert_eq!(Selection::below(Attribute::B, 90.0).to_string(), "b < 90");
    }

    #[test]
    fn test_selection_matches() {
        let sel = Selection::below(Attribute::B, 50.0);
        assert!(sel.matches(|_| 49.0));
        assert!(!sel.matches(|_| 50.0));
        assert!(Selection::All.matches(|_| f64::NAN));
    }

    #[test]
    fn test_selection_contains() {
        let wide = Selection::below(Attribute::B, 100.0);
        let narrow = Selection::below(Attribute::B, 50.0);
        assert!(wide.contains(&narrow));
        assert!(!narrow.contains(&wide));
        assert!(Selection::All.contains(&wide));
        assert!(!wide.contains(&Selection::All));
        assert!(!Selection::below(Attribute::Q, 100.0).contains(&narrow));

        let le = Selection::Attribute {
            attribute: Attribute::B,
            comparison: Comparison::LessOrEqual,
            value: 50.0,
        };
        assert!(le.contains(&narrow));
        assert!(!narrow.contains(&le));

        let above = Selection::Attribute {
            attribute: Attribute::B,
            comparison: Comparison::Greater,
            value: 10.0,
        };
        assert!(!above.contains(&narrow));
    }

    #[test]
    fn test_default_scene_validates() {
        assert!(SceneConfig::default().validate().is_ok());
    }

    #[test]
    fn test_everything_is_not_a_display_style() {
        let config = SceneConfig::new().with_representation(Representation::Everything);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidRepresentation { .. })
        ));
    }
}

//! Color bands and attribute classification
//!
//! A [`Palette`] is an ordered set of [`ColorBand`]s. Bands are kept in
//! application order (largest threshold first) so the emitted color rules
//! narrow down as they go, and [`Palette::classify`] answers which band a
//! value ends up in without replaying any directives.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::ConfigError;

/// Colors every engine knows without a `set_color`
pub const BUILTIN_COLORS: &[(&str, Rgb)] = &[
    ("white", Rgb::new(1.0, 1.0, 1.0)),
    ("black", Rgb::new(0.0, 0.0, 0.0)),
    ("grey", Rgb::new(0.5, 0.5, 0.5)),
    ("gray", Rgb::new(0.5, 0.5, 0.5)),
    ("red", Rgb::new(1.0, 0.0, 0.0)),
    ("green", Rgb::new(0.0, 1.0, 0.0)),
    ("blue", Rgb::new(0.0, 0.0, 1.0)),
    ("yellow", Rgb::new(1.0, 1.0, 0.0)),
    ("orange", Rgb::new(1.0, 0.5, 0.0)),
    ("cyan", Rgb::new(0.0, 1.0, 1.0)),
    ("magenta", Rgb::new(1.0, 0.0, 1.0)),
];

/// Look up a builtin color by name
pub fn builtin_color(name: &str) -> Option<Rgb> {
    BUILTIN_COLORS
        .iter()
        .find(|(builtin, _)| builtin.eq_ignore_ascii_case(name))
        .map(|(_, rgb)| *rgb)
}

/// An RGB triple with components in `[0, 1]`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 3]", into = "[f64; 3]")]
pub struct Rgb {
    pub r: f64,
    pub g: f64,
    pub b: f64,
}

impl Rgb {
    pub const fn new(r: f64, g: f64, b: f64) -> Self {
        Self { r, g, b }
    }

    pub fn components(&self) -> [f64; 3] {
        [self.r, self.g, self.b]
    }

    /// True when every component lies in `[0, 1]`
    pub fn is_normalized(&self) -> bool {
        self.components()
            .iter()
            .all(|c| (0.0..=1.0).contains(c))
    }
}

impl From<[f64; 3]> for Rgb {
    fn from([r, g, b]: [f64; 3]) -> Self {
        Self::new(r, g, b)
    }
}

impl From<Rgb> for [f64; 3] {
    fn from(rgb: Rgb) -> Self {
        rgb.components()
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}, {}]", self.r, self.g, self.b)
    }
}

/// A named color applied to elements whose attribute falls below `threshold`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ColorBand {
    pub name: String,
    pub rgb: Rgb,
    pub threshold: f64,
}

impl ColorBand {
    pub fn new(name: impl Into<String>, rgb: Rgb, threshold: f64) -> Self {
        Self {
            name: name.into(),
            rgb,
            threshold,
        }
    }
}

/// Command words of the script dialect; a color named after one would not
/// lex back as a name
pub const COMMAND_KEYWORDS: &[&str] = &[
    "hide",
    "show",
    "set_color",
    "color",
    "set",
    "bg_color",
    "ray",
    "png",
];

/// Check that a name is usable as a color identifier in a command script
pub fn is_valid_color_name(name: &str) -> bool {
    if COMMAND_KEYWORDS.contains(&name) {
        return false;
    }
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Color bands in application order: strictly decreasing thresholds
#[derive(Debug, Clone, PartialEq)]
pub struct Palette {
    bands: Vec<ColorBand>,
}

impl Palette {
    /// Validate and normalize a set of bands.
    ///
    /// Bands are sorted into application order regardless of the order they
    /// were given in. Empty palettes, duplicate names, duplicate thresholds,
    /// non-finite thresholds and out-of-range components are rejected.
    pub fn new(bands: Vec<ColorBand>) -> Result<Self, ConfigError> {
        if bands.is_empty() {
            return Err(ConfigError::EmptyPalette);
        }

        let mut names = HashSet::new();
        for band in &bands {
            if !is_valid_color_name(&band.name) {
                return Err(ConfigError::InvalidBandName {
                    name: band.name.clone(),
                });
            }
            if builtin_color(&band.name).is_some() {
                return Err(ConfigError::BuiltinBandName {
                    name: band.name.clone(),
                });
            }
            if !names.insert(band.name.as_str()) {
                return Err(ConfigError::DuplicateBand {
                    name: band.name.clone(),
                });
            }
            if !band.threshold.is_finite() {
                return Err(ConfigError::NonFiniteThreshold {
                    name: band.name.clone(),
                });
            }
            if !band.rgb.is_normalized() {
                return Err(ConfigError::ComponentOutOfRange {
                    name: band.name.clone(),
                    rgb: band.rgb,
                });
            }
        }

        let mut bands = bands;
        bands.sort_by(|a, b| b.threshold.total_cmp(&a.threshold));

        if let Some(pair) = bands.windows(2).find(|w| w[0].threshold == w[1].threshold) {
            return Err(ConfigError::DuplicateThreshold {
                threshold: pair[0].threshold,
                first: pair[0].name.clone(),
                second: pair[1].name.clone(),
            });
        }

        Ok(Self { bands })
    }

    /// Bands in application order (largest threshold first)
    pub fn bands(&self) -> &[ColorBand] {
        &self.bands
    }

    /// The band with the largest threshold; it covers everything the
    /// narrower bands leave alone
    pub fn widest(&self) -> &ColorBand {
        &self.bands[0]
    }

    pub fn get(&self, name: &str) -> Option<&ColorBand> {
        self.bands.iter().find(|b| b.name == name)
    }

    /// Classify an attribute value.
    ///
    /// Bands are scanned from the smallest threshold up and the first band
    /// with `value < threshold` wins. Values above every threshold, and NaN,
    /// land in the widest band.
    pub fn classify(&self, value: f64) -> &ColorBand {
        self.bands
            .iter()
            .rev()
            .find(|band| value < band.threshold)
            .unwrap_or_else(|| self.widest())
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            bands: vec![
                ColorBand::new("n0", Rgb::new(0.051, 0.341, 0.827), 100.0),
                ColorBand::new("n1", Rgb::new(0.416, 0.796, 0.945), 90.0),
                ColorBand::new("n2", Rgb::new(0.996, 0.851, 0.212), 70.0),
                ColorBand::new("n3", Rgb::new(0.992, 0.490, 0.302), 50.0),
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn band(name: &str, threshold: f64) -> ColorBand {
        ColorBand::new(name, Rgb::new(0.5, 0.5, 0.5), threshold)
    }

    #[test]
    fn test_default_palette_is_valid() {
        let palette = Palette::default();
        let rebuilt = Palette::new(palette.bands().to_vec()).expect("defaults validate");
        assert_eq!(rebuilt, palette);
    }

    #[test]
    fn test_classify_default_intervals() {
        let palette = Palette::default();
        let name = |v: f64| palette.classify(v).name.as_str();

        assert_eq!(name(-10.0), "n3");
        assert_eq!(name(0.0), "n3");
        assert_eq!(name(49.99), "n3");
        assert_eq!(name(50.0), "n2");
        assert_eq!(name(69.9), "n2");
        assert_eq!(name(70.0), "n1");
        assert_eq!(name(89.9), "n1");
        assert_eq!(name(90.0), "n0");
        assert_eq!(name(99.9), "n0");
        assert_eq!(name(100.0), "n0");
        assert_eq!(name(250.0), "n0");
    }

    #[test]
    fn test_classify_nan_falls_into_widest_band() {
        let palette = Palette::default();
        assert_eq!(palette.classify(f64::NAN).name, "n0");
    }

    #[test]
    fn test_bands_sorted_into_application_order() {
        let palette = Palette::new(vec![band("low", 10.0), band("high", 30.0), band("mid", 20.0)])
            .expect("valid palette");
        let names: Vec<_> = palette.bands().iter().map(|b| b.name.as_str()).collect();
        assert_eq!(names, vec!["high", "mid", "low"]);
        assert_eq!(palette.widest().name, "high");
        assert_eq!(palette.classify(15.0).name, "mid");
    }

    #[test]
    fn test_empty_palette_rejected() {
        assert!(matches!(Palette::new(vec![]), Err(ConfigError::EmptyPalette)));
    }

    #[test]
    fn test_duplicate_threshold_rejected() {
        let err = Palette::new(vec![band("a", 10.0), band("b", 10.0)]).unwrap_err();
        assert!(matches!(err, ConfigError::DuplicateThreshold { .. }));
    }

    #[test]
    fn test_duplicate_name_rejected() {
        let err = Palette::new(vec![band("a", 10.0), band("a", 20.0)]).unwrap_err();
        assert!(matches!(err, ConfigError::DuplicateBand { .. }));
    }

    #[test]
    fn test_invalid_names_rejected() {
        assert!(matches!(
            Palette::new(vec![band("9lives", 1.0)]),
            Err(ConfigError::InvalidBandName { .. })
        ));
        assert!(matches!(
            Palette::new(vec![band("white", 1.0)]),
            Err(ConfigError::BuiltinBandName { .. })
        ));
    }

    #[test]
    fn test_command_keyword_names_rejected() {
        for keyword in COMMAND_KEYWORDS {
            assert!(
                matches!(
                    Palette::new(vec![band(keyword, 1.0)]),
                    Err(ConfigError::InvalidBandName { .. })
                ),
                "{} accepted",
                keyword
            );
        }
        // Keywords are case sensitive, so these still lex as names
        assert!(Palette::new(vec![band("Ray", 1.0), band("rays", 2.0)]).is_ok());
    }

    #[test]
    fn test_out_of_range_component_rejected() {
        let err = Palette::new(vec![ColorBand::new("x", Rgb::new(1.2, 0.0, 0.0), 1.0)]).unwrap_err();
        assert!(matches!(err, ConfigError::ComponentOutOfRange { .. }));
    }

    #[test]
    fn test_non_finite_threshold_rejected() {
        let err = Palette::new(vec![band("x", f64::INFINITY)]).unwrap_err();
        assert!(matches!(err, ConfigError::NonFiniteThreshold { .. }));
    }

    #[test]
    fn test_rgb_display() {
        assert_eq!(Rgb::new(0.992, 0.490, 0.302).to_string(), "[0.992, 0.49, 0.302]");
    }

    #[test]
    fn test_builtin_lookup_is_case_insensitive() {
        assert_eq!(builtin_color("White"), Some(Rgb::new(1.0, 1.0, 1.0)));
        assert_eq!(builtin_color("n0"), None);
    }
}

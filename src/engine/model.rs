//! In-memory scene that applies directives the way the engine does
//!
//! Elements carry their attribute values, the set of representations shown
//! for them and their current color. Color rules overwrite earlier colors,
//! so the final coloring depends on the order rules arrive in.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use tracing::trace;

use super::{EngineError, VisualizationEngine};
use crate::color::{builtin_color, Rgb};
use crate::directive::{Directive, RenderOption, SettingValue};
use crate::scene::{Attribute, ImageFormat, Representation, Selection};

/// A structural element (atom or residue) with its scalar attributes
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub name: String,
    pub b: f64,
    pub q: f64,
}

impl Element {
    /// Element with full occupancy
    pub fn new(name: impl Into<String>, b: f64) -> Self {
        Self {
            name: name.into(),
            b,
            q: 1.0,
        }
    }

    pub fn attribute(&self, attribute: Attribute) -> f64 {
        match attribute {
            Attribute::B => self.b,
            Attribute::Q => self.q,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ElementState {
    pub element: Element,
    pub representations: BTreeSet<Representation>,
    pub color: Option<String>,
}

impl ElementState {
    fn selected_by(&self, selection: &Selection) -> bool {
        selection.matches(|attribute| self.element.attribute(attribute))
    }
}

/// Engine-wide render settings
#[derive(Debug, Clone, PartialEq)]
pub struct RenderState {
    pub ray_trace_mode: u32,
    pub background: String,
    pub antialias: u32,
    pub ray_trace_gain: f64,
    pub fancy_helices: bool,
    pub other: BTreeMap<String, SettingValue>,
}

impl Default for RenderState {
    fn default() -> Self {
        Self {
            ray_trace_mode: 0,
            background: "black".to_string(),
            antialias: 0,
            ray_trace_gain: 0.12,
            fancy_helices: false,
            other: BTreeMap::new(),
        }
    }
}

/// Size of the last rendered frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Frame {
    pub width: u32,
    pub height: u32,
}

/// An image the engine was asked to write
#[derive(Debug, Clone, PartialEq)]
pub struct ImageRecord {
    pub path: PathBuf,
    pub format: ImageFormat,
    pub width: u32,
    pub height: u32,
    pub dpi: u32,
}

#[derive(Debug, Clone, Default)]
pub struct SceneModel {
    elements: Vec<ElementState>,
    colors: BTreeMap<String, Rgb>,
    settings: RenderState,
    frame: Option<Frame>,
    images: Vec<ImageRecord>,
    log: Vec<Directive>,
}

impl SceneModel {
    /// Scene over the given elements, each initially drawn as lines
    pub fn new(elements: impl IntoIterator<Item = Element>) -> Self {
        let elements = elements
            .into_iter()
            .map(|element| ElementState {
                element,
                representations: BTreeSet::from([Representation::Lines]),
                color: None,
            })
            .collect();
        Self {
            elements,
            ..Self::default()
        }
    }

    /// Scene with one element per B-factor, named by position
    pub fn from_b_factors(values: impl IntoIterator<Item = f64>) -> Self {
        Self::new(
            values
                .into_iter()
                .enumerate()
                .map(|(i, b)| Element::new(format!("{}", i + 1), b)),
        )
    }

    pub fn elements(&self) -> &[ElementState] {
        &self.elements
    }

    /// Color currently assigned to the element with this name
    pub fn color_of(&self, name: &str) -> Option<&str> {
        self.elements
            .iter()
            .find(|state| state.element.name == name)
            .and_then(|state| state.color.as_deref())
    }

    /// Colors registered with `set_color`
    pub fn defined_colors(&self) -> &BTreeMap<String, Rgb> {
        &self.colors
    }

    pub fn settings(&self) -> &RenderState {
        &self.settings
    }

    pub fn frame(&self) -> Option<Frame> {
        self.frame
    }

    pub fn images(&self) -> &[ImageRecord] {
        &self.images
    }

    /// Every directive received, in order
    pub fn log(&self) -> &[Directive] {
        &self.log
    }

    fn resolve_color(&self, name: &str) -> Option<Rgb> {
        self.colors.get(name).copied().or_else(|| builtin_color(name))
    }

    fn require_color(&self, name: &str) -> Result<(), EngineError> {
        match self.resolve_color(name) {
            Some(_) => Ok(()),
            None => Err(EngineError::UnknownColor {
                name: name.to_string(),
            }),
        }
    }
}

impl VisualizationEngine for SceneModel {
    fn clear_annotations(
        &mut self,
        representation: Representation,
        selection: &Selection,
    ) -> Result<(), EngineError> {
        for state in self.elements.iter_mut().filter(|s| s.selected_by(selection)) {
            if representation == Representation::Everything {
                state.representations.clear();
            } else {
                state.representations.remove(&representation);
            }
        }
        self.log.push(Directive::Hide {
            representation,
            selection: selection.clone(),
        });
        Ok(())
    }

    fn set_representation(
        &mut self,
        representation: Representation,
        selection: &Selection,
    ) -> Result<(), EngineError> {
        if representation == Representation::Everything {
            return Err(EngineError::UnsupportedRepresentation { representation });
        }
        for state in self.elements.iter_mut().filter(|s| s.selected_by(selection)) {
            state.representations.insert(representation);
        }
        self.log.push(Directive::Show {
            representation,
            selection: selection.clone(),
        });
        Ok(())
    }

    fn define_color(&mut self, name: &str, rgb: Rgb) -> Result<(), EngineError> {
        if !rgb.is_normalized() {
            return Err(EngineError::InvalidColor {
                name: name.to_string(),
                rgb,
            });
        }
        self.colors.insert(name.to_string(), rgb);
        self.log.push(Directive::SetColor {
            name: name.to_string(),
            rgb,
        });
        Ok(())
    }

    fn apply_color_rule(&mut self, name: &str, selection: &Selection) -> Result<(), EngineError> {
        self.require_color(name)?;
        let mut colored = 0usize;
        for state in self.elements.iter_mut().filter(|s| s.selected_by(selection)) {
            state.color = Some(name.to_string());
            colored += 1;
        }
        trace!(color = name, %selection, colored, "applied color rule");
        self.log.push(Directive::Color {
            name: name.to_string(),
            selection: selection.clone(),
        });
        Ok(())
    }

    fn set_render_option(&mut self, option: &RenderOption) -> Result<(), EngineError> {
        match option {
            RenderOption::RayTraceMode(mode) => self.settings.ray_trace_mode = *mode,
            RenderOption::Background(name) => {
                self.require_color(name)?;
                self.settings.background = name.clone();
            }
            RenderOption::Antialias(level) => self.settings.antialias = *level,
            RenderOption::RayTraceGain(gain) => self.settings.ray_trace_gain = *gain,
            RenderOption::CartoonFancyHelices(on) => self.settings.fancy_helices = *on,
            RenderOption::Other { key, value } => {
                self.settings.other.insert(key.clone(), value.clone());
            }
        }
        self.log.push(Directive::Set(option.clone()));
        Ok(())
    }

    fn render(&mut self, width: u32, height: u32) -> Result<(), EngineError> {
        self.frame = Some(Frame { width, height });
        self.log.push(Directive::Ray { width, height });
        Ok(())
    }

    fn write_image(
        &mut self,
        path: &Path,
        format: ImageFormat,
        dpi: u32,
    ) -> Result<(), EngineError> {
        let frame = self.frame.ok_or_else(|| EngineError::NothingRendered {
            path: path.to_path_buf(),
        })?;
        self.images.push(ImageRecord {
            path: path.to_path_buf(),
            format,
            width: frame.width,
            height: frame.height,
            dpi,
        });
        self.log.push(Directive::Png {
            path: path.to_path_buf(),
            format,
            dpi,
        });
        Ok(())
    }
}

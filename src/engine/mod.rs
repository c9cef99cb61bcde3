//! The engine contract a directive sequence is issued against
//!
//! The configurator never renders anything itself. It sequences calls to a
//! [`VisualizationEngine`]; [`ScriptWriter`] turns those calls into a command
//! script for a real engine, [`SceneModel`] applies them to an in-memory scene.

pub mod model;
pub mod script;

pub use model::{Element, ElementState, Frame, ImageRecord, RenderState, SceneModel};
pub use script::ScriptWriter;

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

use crate::color::Rgb;
use crate::directive::{Directive, RenderOption};
use crate::scene::{ImageFormat, Representation, Selection};

/// Failures reported by an engine while executing directives
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("unknown color '{name}'")]
    UnknownColor { name: String },

    #[error("color '{name}' has components outside [0, 1]: {rgb}")]
    InvalidColor { name: String, rgb: Rgb },

    #[error("cannot show '{representation}'")]
    UnsupportedRepresentation { representation: Representation },

    #[error("cannot write '{}' before anything was rendered", path.display())]
    NothingRendered { path: PathBuf },

    #[error("failed to write directive: {0}")]
    Io(#[from] std::io::Error),
}

/// Operations a visualization engine exposes
pub trait VisualizationEngine {
    /// Hide a representation on the selected elements
    fn clear_annotations(
        &mut self,
        representation: Representation,
        selection: &Selection,
    ) -> Result<(), EngineError>;

    /// Show a representation on the selected elements
    fn set_representation(
        &mut self,
        representation: Representation,
        selection: &Selection,
    ) -> Result<(), EngineError>;

    fn define_color(&mut self, name: &str, rgb: Rgb) -> Result<(), EngineError>;

    /// Color the selected elements, overwriting any earlier color
    fn apply_color_rule(&mut self, name: &str, selection: &Selection) -> Result<(), EngineError>;

    fn set_render_option(&mut self, option: &RenderOption) -> Result<(), EngineError>;

    fn render(&mut self, width: u32, height: u32) -> Result<(), EngineError>;

    fn write_image(&mut self, path: &Path, format: ImageFormat, dpi: u32)
        -> Result<(), EngineError>;
}

/// Issue one directive
pub fn apply<E: VisualizationEngine + ?Sized>(
    engine: &mut E,
    directive: &Directive,
) -> Result<(), EngineError> {
    match directive {
        Directive::Hide {
            representation,
            selection,
        } => engine.clear_annotations(*representation, selection),
        Directive::Show {
            representation,
            selection,
        } => engine.set_representation(*representation, selection),
        Directive::SetColor { name, rgb } => engine.define_color(name, *rgb),
        Directive::Color { name, selection } => engine.apply_color_rule(name, selection),
        Directive::Set(option) => engine.set_render_option(option),
        Directive::Ray { width, height } => engine.render(*width, *height),
        Directive::Png { path, format, dpi } => engine.write_image(path, *format, *dpi),
    }
}

/// Issue directives in order, stopping at the first failure
pub fn execute<'a, E, I>(engine: &mut E, directives: I) -> Result<(), EngineError>
where
    E: VisualizationEngine + ?Sized,
    I: IntoIterator<Item = &'a Directive>,
{
    for directive in directives {
        debug!(%directive, "issuing directive");
        apply(engine, directive)?;
    }
    Ok(())
}

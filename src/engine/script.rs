//! Command script output

use std::io::Write;
use std::path::Path;

use super::{EngineError, VisualizationEngine};
use crate::color::Rgb;
use crate::directive::{Directive, RenderOption};
use crate::scene::{ImageFormat, Representation, Selection};

/// Engine that writes each call as one line of a command script
#[derive(Debug)]
pub struct ScriptWriter<W: Write> {
    out: W,
    lines: usize,
}

impl<W: Write> ScriptWriter<W> {
    pub fn new(out: W) -> Self {
        Self { out, lines: 0 }
    }

    /// Number of command lines written so far
    pub fn lines(&self) -> usize {
        self.lines
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn emit(&mut self, directive: Directive) -> Result<(), EngineError> {
        writeln!(self.out, "{}", directive)?;
        self.lines += 1;
        Ok(())
    }
}

impl<W: Write> VisualizationEngine for ScriptWriter<W> {
    fn clear_annotations(
        &mut self,
        representation: Representation,
        selection: &Selection,
    ) -> Result<(), EngineError> {
        self.emit(Directive::Hide {
            representation,
            selection: selection.clone(),
        })
    }

    fn set_representation(
        &mut self,
        representation: Representation,
        selection: &Selection,
    ) -> Result<(), EngineError> {
        self.emit(Directive::Show {
            representation,
            selection: selection.clone(),
        })
    }

    fn define_color(&mut self, name: &str, rgb: Rgb) -> Result<(), EngineError> {
        self.emit(Directive::SetColor {
            name: name.to_string(),
            rgb,
        })
    }

    fn apply_color_rule(&mut self, name: &str, selection: &Selection) -> Result<(), EngineError> {
        self.emit(Directive::Color {
            name: name.to_string(),
            selection: selection.clone(),
        })
    }

    fn set_render_option(&mut self, option: &RenderOption) -> Result<(), EngineError> {
        self.emit(Directive::Set(option.clone()))
    }

    fn render(&mut self, width: u32, height: u32) -> Result<(), EngineError> {
        self.emit(Directive::Ray { width, height })
    }

    fn write_image(
        &mut self,
        path: &Path,
        format: ImageFormat,
        dpi: u32,
    ) -> Result<(), EngineError> {
        self.emit(Directive::Png {
            path: path.to_path_buf(),
            format,
            dpi,
        })
    }
}

//! bfactor-scene - cartoon scenes colored by per-atom attribute bands
//!
//! This library builds the command sequence a molecular visualization engine
//! needs to draw a structure as cartoon, color it by B-factor (or confidence)
//! bands, ray trace it and write a PNG. It also parses and lints existing
//! command scripts of the same dialect.
//!
//! # Example
//!
//! ```rust
//! use bfactor_scene::{render_script, SceneConfig};
//!
//! let script = render_script(&SceneConfig::default()).unwrap();
//! assert!(script.starts_with("hide everything, all\nshow cartoon, all\n"));
//! assert!(script.contains("color n3, b < 50"));
//! ```

pub mod color;
pub mod config;
pub mod directive;
pub mod engine;
pub mod error;
pub mod lint;
pub mod parser;
pub mod scene;

pub use color::{ColorBand, Palette, Rgb};
pub use config::ConfigError;
pub use directive::{build_directives, Directive, RenderOption};
pub use engine::{EngineError, SceneModel, ScriptWriter, VisualizationEngine};
pub use error::ParseError;
pub use lint::{LintCategory, LintWarning};
pub use parser::{parse, Spanned};
pub use scene::{Attribute, ImageFormat, OutputTarget, RenderConfig, Representation, SceneConfig};

use thiserror::Error;
use tracing::{debug, info};

/// Errors that can occur while generating or checking a scene
#[derive(Debug, Error)]
pub enum SceneError {
    /// Error in a command script
    #[error("parse errors: {}", format_parse_errors(.0))]
    Parse(Vec<ParseError>),

    /// Invalid scene configuration
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Failure reported by the engine
    #[error("engine error: {0}")]
    Engine(#[from] EngineError),
}

impl From<Vec<ParseError>> for SceneError {
    fn from(errors: Vec<ParseError>) -> Self {
        SceneError::Parse(errors)
    }
}

fn format_parse_errors(errors: &[ParseError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

/// Generate the command script for a scene
///
/// The configuration is validated, turned into directives and issued
/// against a [`ScriptWriter`]. Identical configurations always produce
/// identical scripts.
///
/// # Example
///
/// ```rust
/// use bfactor_scene::{render_script, RenderConfig, SceneConfig};
///
/// let config = SceneConfig::new().with_render(RenderConfig::new().with_size(1200, 800));
/// let script = render_script(&config).unwrap();
/// assert!(script.contains("ray 1200, 800"));
/// ```
pub fn render_script(config: &SceneConfig) -> Result<String, SceneError> {
    config.validate()?;

    let directives = build_directives(config);
    let mut writer = ScriptWriter::new(Vec::new());
    engine::execute(&mut writer, &directives)?;

    info!(
        lines = writer.lines(),
        output = %config.output.path().display(),
        "generated scene script"
    );
    Ok(String::from_utf8_lossy(&writer.into_inner()).into_owned())
}

/// Run a scene against an engine directly
pub fn run_scene<E: VisualizationEngine + ?Sized>(
    config: &SceneConfig,
    engine: &mut E,
) -> Result<(), SceneError> {
    config.validate()?;
    let directives = build_directives(config);
    engine::execute(engine, &directives)?;
    Ok(())
}

/// Parse a command script and lint it
///
/// # Example
///
/// ```rust
/// use bfactor_scene::{check_script, LintCategory};
///
/// let warnings = check_script("set_color n0, [0, 0, 1]\ncolor n0, b < 100").unwrap();
/// assert_eq!(warnings[0].category, LintCategory::UncoveredRange);
/// ```
pub fn check_script(source: &str) -> Result<Vec<LintWarning>, SceneError> {
    let directives = parse(source)?;
    debug!(count = directives.len(), "parsed script");
    Ok(lint::check(&directives))
}

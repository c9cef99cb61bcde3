//! Output image target

use std::fmt;
use std::path::{Path, PathBuf};

use crate::config::ConfigError;

/// Image formats the engine is asked to write
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Png,
}

impl ImageFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ImageFormat::Png => "png",
        }
    }

    /// Infer the format from a path's extension
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?;
        if ext.eq_ignore_ascii_case("png") {
            Some(ImageFormat::Png)
        } else {
            None
        }
    }
}

impl fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Where the rendered image is written
#[derive(Debug, Clone, PartialEq)]
pub struct OutputTarget {
    path: PathBuf,
    format: ImageFormat,
}

impl OutputTarget {
    pub fn new(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let path = path.into();
        if path.as_os_str().is_empty() {
            return Err(ConfigError::EmptyOutputPath);
        }
        let format = ImageFormat::from_path(&path)
            .ok_or_else(|| ConfigError::UnsupportedFormat { path: path.clone() })?;
        Ok(Self { path, format })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn format(&self) -> ImageFormat {
        self.format
    }
}

impl Default for OutputTarget {
    fn default() -> Self {
        Self {
            path: PathBuf::from("scene.png"),
            format: ImageFormat::Png,
        }
    }
}

//! Parameter types for image operations.
//!
//! These structs describe *what* to produce, not *how*. The planning code in
//! [`convert`](crate::convert) and [`icons`](crate::icons) fills them in; the
//! [`backend`](super::backend) turns them into pixels. Keeping the two apart
//! lets tests swap in a recording mock.
//!
//! ## Types
//!
//! - [`Quality`]: lossy encoding quality (1–100, default 80). Clamped on construction.
//! - [`OutputFormat`]: encoder chosen from the output file extension.
//! - [`ResizeParams`]: resize to exact dimensions, optional blur, encode.
//! - [`IconParams`]: contain-fit a square PNG icon on a background.
//! - [`IcoParams`]: multi-frame `.ico` built from contain-fit frames.

use std::path::{Path, PathBuf};

/// Quality setting for lossy image encoding (1-100).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Quality(pub u32);

impl Quality {
    pub fn new(value: u32) -> Self {
        Self(value.clamp(1, 100))
    }

    pub fn value(self) -> u32 {
        self.0
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(80)
    }
}

/// Encoders the backend knows how to write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    WebP,
    Jpeg,
    Png,
    Gif,
}

impl OutputFormat {
    /// Map a file extension (with or without the dot, any case) to a format.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.trim_start_matches('.').to_ascii_lowercase().as_str() {
            "webp" => Some(Self::WebP),
            "jpg" | "jpeg" => Some(Self::Jpeg),
            "png" => Some(Self::Png),
            "gif" => Some(Self::Gif),
            _ => None,
        }
    }

    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(Self::from_extension)
    }

    /// Whether the encoder honors [`Quality`].
    pub fn is_lossy(self) -> bool {
        matches!(self, Self::Jpeg)
    }
}

/// RGBA fill used around contain-fit icons.
pub type Background = [u8; 4];

/// Fully transparent white, the fill every icon set uses by default.
pub const TRANSPARENT: Background = [255, 255, 255, 0];

/// Parameters for a resize (and optional blur) operation.
#[derive(Debug, Clone, PartialEq)]
pub struct ResizeParams {
    pub source: PathBuf,
    pub output: PathBuf,
    pub width: u32,
    pub height: u32,
    pub quality: Quality,
    /// Gaussian blur sigma applied after resizing.
    pub blur: Option<f32>,
}

/// Parameters for a square icon (contain fit, centered).
#[derive(Debug, Clone, PartialEq)]
pub struct IconParams {
    pub source: PathBuf,
    pub output: PathBuf,
    pub size: u32,
    pub background: Background,
}

/// Parameters for a multi-resolution `.ico` file.
#[derive(Debug, Clone, PartialEq)]
pub struct IcoParams {
    pub source: PathBuf,
    pub output: PathBuf,
    pub sizes: Vec<u32>,
    pub background: Background,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quality_clamps_to_valid_range() {
        assert_eq!(Quality::new(0).value(), 1);
        assert_eq!(Quality::new(50).value(), 50);
        assert_eq!(Quality::new(150).value(), 100);
    }

    #[test]
    fn quality_default_is_80() {
        assert_eq!(Quality::default().value(), 80);
    }

    #[test]
    fn output_format_from_extension() {
        assert_eq!(OutputFormat::from_extension("jpg"), Some(OutputFormat::Jpeg));
        assert_eq!(OutputFormat::from_extension(".JPEG"), Some(OutputFormat::Jpeg));
        assert_eq!(OutputFormat::from_extension("webp"), Some(OutputFormat::WebP));
        assert_eq!(OutputFormat::from_extension("Png"), Some(OutputFormat::Png));
        assert_eq!(OutputFormat::from_extension("gif"), Some(OutputFormat::Gif));
        assert_eq!(OutputFormat::from_extension("svg"), None);
    }

    #[test]
    fn output_format_from_path_without_extension() {
        assert_eq!(OutputFormat::from_path(Path::new("/tmp/noext")), None);
        assert_eq!(
            OutputFormat::from_path(Path::new("/tmp/a.webp")),
            Some(OutputFormat::WebP)
        );
    }

    #[test]
    fn only_jpeg_is_lossy() {
        assert!(OutputFormat::Jpeg.is_lossy());
        assert!(!OutputFormat::WebP.is_lossy());
        assert!(!OutputFormat::Png.is_lossy());
    }
}

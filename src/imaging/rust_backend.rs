//! Pure Rust image processing backend.
//!
//! Everything is statically linked into the binary; no libvips, no
//! ImageMagick.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Decode (JPEG, PNG, GIF, WebP) | `image` crate (pure Rust decoders) |
//! | Resize | `DynamicImage::resize_exact` with `Lanczos3` filter |
//! | Placeholder blur | `DynamicImage::blur` (Gaussian) |
//! | Encode → WebP | `image::codecs::webp::WebPEncoder` (lossless) |
//! | Encode → JPEG | `image::codecs::jpeg::JpegEncoder` (quality-aware) |
//! | Encode → PNG | `image::codecs::png::PngEncoder` (best compression) |
//! | Encode → GIF | `image::codecs::gif::GifEncoder` |
//! | Icon contain fit | `resize_exact` + `imageops::overlay` on a filled canvas |
//! | Encode → ICO | `image::codecs::ico::IcoEncoder` with PNG frames |

use super::backend::{BackendError, Dimensions, ImageBackend};
use super::calculations::{center_offset, contain_dimensions};
use super::params::{Background, IcoParams, IconParams, OutputFormat, ResizeParams};
use image::codecs::ico::{IcoEncoder, IcoFrame};
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::{CompressionType, FilterType as PngFilter, PngEncoder};
use image::codecs::webp::WebPEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, ExtendedColorType, ImageEncoder, ImageFormat, ImageReader, RgbaImage};
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::sync::{Arc, LazyLock, Mutex, PoisonError};
use std::time::SystemTime;

/// Extensions whose decoders are compiled in.
const INPUT_CANDIDATES: &[(&str, ImageFormat)] = &[
    ("jpg", ImageFormat::Jpeg),
    ("jpeg", ImageFormat::Jpeg),
    ("png", ImageFormat::Png),
    ("gif", ImageFormat::Gif),
    ("webp", ImageFormat::WebP),
];

static SUPPORTED_EXTENSIONS: LazyLock<Vec<&'static str>> = LazyLock::new(|| {
    INPUT_CANDIDATES
        .iter()
        .filter(|(_, fmt)| fmt.reading_enabled())
        .map(|(ext, _)| *ext)
        .collect()
});

/// Returns the set of image file extensions that have working decoders compiled in.
pub fn supported_input_extensions() -> &'static [&'static str] {
    &SUPPORTED_EXTENSIONS
}

/// Pure Rust backend using the `image` crate.
///
/// The last decoded source is kept, so the outputs planned for one image
/// (full size, every width, placeholders) share a single decode. The entry is
/// keyed by path, length and modification time.
///
/// See the [module docs](self) for the crate-to-operation mapping.
pub struct RustBackend {
    last_decoded: Mutex<Option<Decoded>>,
}

struct Decoded {
    key: SourceKey,
    image: Arc<DynamicImage>,
}

#[derive(PartialEq, Eq)]
struct SourceKey {
    path: PathBuf,
    len: u64,
    modified: Option<SystemTime>,
}

impl SourceKey {
    fn of(path: &Path) -> Result<Self, BackendError> {
        let meta = std::fs::metadata(path)?;
        Ok(Self {
            path: path.to_path_buf(),
            len: meta.len(),
            modified: meta.modified().ok(),
        })
    }
}

impl RustBackend {
    pub fn new() -> Self {
        Self {
            last_decoded: Mutex::new(None),
        }
    }

    /// Decode `path`, reusing the previous result for the same unchanged file.
    fn decode(&self, path: &Path) -> Result<Arc<DynamicImage>, BackendError> {
        let key = SourceKey::of(path)?;
        let mut slot = self.last_decoded.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(cached) = slot.as_ref().filter(|d| d.key == key) {
            tracing::trace!(path = %path.display(), "decode cache hit");
            return Ok(Arc::clone(&cached.image));
        }
        let image = Arc::new(load_image(path)?);
        *slot = Some(Decoded {
            key,
            image: Arc::clone(&image),
        });
        Ok(image)
    }
}

impl Default for RustBackend {
    fn default() -> Self {
        Self::new()
    }
}

fn processing_failed(what: &str, path: &Path, err: impl std::fmt::Display) -> BackendError {
    BackendError::ProcessingFailed(format!("{what} {}: {err}", path.display()))
}

/// Load and decode an image from disk, sniffing the format from content.
fn load_image(path: &Path) -> Result<DynamicImage, BackendError> {
    ImageReader::open(path)?
        .with_guessed_format()?
        .decode()
        .map_err(|e| processing_failed("Failed to decode", path, e))
}

/// Encode `img` for `path`, choosing the encoder from the extension.
fn encode_image(img: &DynamicImage, path: &Path, quality: u32) -> Result<Vec<u8>, BackendError> {
    let format = OutputFormat::from_path(path).ok_or_else(|| {
        BackendError::ProcessingFailed(format!("Unsupported output format: {}", path.display()))
    })?;
    if !format.is_lossy() {
        tracing::trace!(path = %path.display(), quality, "lossless encoder, quality ignored");
    }
    let mut buffer = Vec::new();

    let result = match format {
        OutputFormat::WebP => {
            if img.color().has_alpha() {
                let rgba = img.to_rgba8();
                WebPEncoder::new_lossless(&mut buffer).write_image(
                    rgba.as_raw(),
                    rgba.width(),
                    rgba.height(),
                    ExtendedColorType::Rgba8,
                )
            } else {
                let rgb = img.to_rgb8();
                WebPEncoder::new_lossless(&mut buffer).write_image(
                    rgb.as_raw(),
                    rgb.width(),
                    rgb.height(),
                    ExtendedColorType::Rgb8,
                )
            }
        }
        OutputFormat::Jpeg => {
            let rgb = img.to_rgb8();
            JpegEncoder::new_with_quality(&mut buffer, quality.clamp(1, 100) as u8).write_image(
                rgb.as_raw(),
                rgb.width(),
                rgb.height(),
                ExtendedColorType::Rgb8,
            )
        }
        OutputFormat::Png => write_png(&mut buffer, &img.to_rgba8()),
        OutputFormat::Gif => DynamicImage::ImageRgba8(img.to_rgba8())
            .write_to(&mut Cursor::new(&mut buffer), ImageFormat::Gif),
    };

    result.map_err(|e| processing_failed("Failed to encode", path, e))?;
    Ok(buffer)
}

/// Write fully encoded bytes. Nothing touches `path` until encoding succeeded,
/// so a failed encode never leaves a file that later runs would skip.
fn write_output(path: &Path, bytes: &[u8]) -> Result<(), BackendError> {
    std::fs::write(path, bytes)?;
    Ok(())
}

fn write_png<W: std::io::Write>(writer: W, rgba: &RgbaImage) -> image::ImageResult<()> {
    PngEncoder::new_with_quality(writer, CompressionType::Best, PngFilter::Adaptive).write_image(
        rgba.as_raw(),
        rgba.width(),
        rgba.height(),
        ExtendedColorType::Rgba8,
    )
}

/// Contain-fit `img` into an `edge`×`edge` canvas filled with `background`.
fn render_icon(img: &DynamicImage, edge: u32, background: Background) -> RgbaImage {
    let (w, h) = contain_dimensions((img.width(), img.height()), edge);
    let fitted = img.resize_exact(w, h, FilterType::Lanczos3).to_rgba8();
    let mut canvas = RgbaImage::from_pixel(edge, edge, image::Rgba(background));
    let (x, y) = center_offset((w, h), edge);
    image::imageops::overlay(&mut canvas, &fitted, x, y);
    canvas
}

impl ImageBackend for RustBackend {
    fn identify(&self, path: &Path) -> Result<Dimensions, BackendError> {
        let (width, height) = image::image_dimensions(path)
            .map_err(|e| processing_failed("Failed to read dimensions of", path, e))?;
        Ok(Dimensions { width, height })
    }

    fn resize(&self, params: &ResizeParams) -> Result<(), BackendError> {
        let source = self.decode(&params.source)?;
        let resized = ((source.width(), source.height()) != (params.width, params.height))
            .then(|| source.resize_exact(params.width, params.height, FilterType::Lanczos3));
        let img = resized.as_ref().unwrap_or(&*source);
        let blurred = match params.blur {
            Some(sigma) if sigma > 0.0 => Some(img.blur(sigma)),
            _ => None,
        };
        let bytes = encode_image(
            blurred.as_ref().unwrap_or(img),
            &params.output,
            params.quality.value(),
        )?;
        write_output(&params.output, &bytes)
    }

    fn icon(&self, params: &IconParams) -> Result<(), BackendError> {
        let img = self.decode(&params.source)?;
        let canvas = render_icon(&img, params.size, params.background);
        let mut bytes = Vec::new();
        write_png(&mut bytes, &canvas)
            .map_err(|e| processing_failed("Failed to encode", &params.output, e))?;
        write_output(&params.output, &bytes)
    }

    fn ico(&self, params: &IcoParams) -> Result<(), BackendError> {
        let img = self.decode(&params.source)?;
        let frames = params
            .sizes
            .iter()
            .map(|&size| {
                let canvas = render_icon(&img, size, params.background);
                IcoFrame::as_png(canvas.as_raw(), size, size, ExtendedColorType::Rgba8)
            })
            .collect::<image::ImageResult<Vec<_>>>()
            .map_err(|e| processing_failed("Failed to build ICO frame for", &params.output, e))?;

        let mut bytes = Vec::new();
        IcoEncoder::new(&mut bytes)
            .encode_images(&frames)
            .map_err(|e| processing_failed("Failed to encode", &params.output, e))?;
        write_output(&params.output, &bytes)
    }
}

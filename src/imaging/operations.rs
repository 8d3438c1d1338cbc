//! High-level image operations.
//!
//! These functions combine calculations with backend execution: they turn a
//! source, an output path and a few numbers into backend parameters, and
//! apply the skip-if-exists rule shared by every generated file.

use super::backend::{BackendError, Dimensions, ImageBackend};
use super::calculations::scale_to_width;
use super::params::{Background, IcoParams, IconParams, Quality, ResizeParams};
use std::path::Path;

/// Result type for image operations.
pub type Result<T> = std::result::Result<T, BackendError>;

/// Get image dimensions using the backend.
pub fn get_dimensions(backend: &impl ImageBackend, path: &Path) -> Result<Dimensions> {
    backend.identify(path)
}

/// What happened to a single output path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    /// The backend wrote the file; `bytes` is its size on disk.
    Written { bytes: u64 },
    /// The file was already present and `force` was off.
    Exists,
}

/// Run `write` unless `output` already exists (and `force` is off).
///
/// This is the idempotency rule for every generated file: re-running a
/// command only fills in what is missing.
pub fn write_unless_exists(
    output: &Path,
    force: bool,
    write: impl FnOnce() -> Result<()>,
) -> Result<WriteOutcome> {
    if !force && output.exists() {
        tracing::debug!(path = %output.display(), "skipping existing output");
        return Ok(WriteOutcome::Exists);
    }
    write()?;
    let bytes = std::fs::metadata(output).map(|m| m.len()).unwrap_or(0);
    Ok(WriteOutcome::Written { bytes })
}

/// Plan a width-constrained variant without executing it.
///
/// The width is never enlarged past the source; height follows the aspect
/// ratio.
pub fn plan_variant(
    source: &Path,
    output: &Path,
    original: Dimensions,
    width: u32,
    quality: Quality,
    blur: Option<f32>,
) -> ResizeParams {
    let (width, height) = scale_to_width(original.as_tuple(), width);
    ResizeParams {
        source: source.to_path_buf(),
        output: output.to_path_buf(),
        width,
        height,
        quality,
        blur,
    }
}

/// Plan a full-size re-encode (used for the plain WebP conversion).
pub fn plan_full_size(
    source: &Path,
    output: &Path,
    original: Dimensions,
    quality: Quality,
) -> ResizeParams {
    plan_variant(source, output, original, original.width, quality, None)
}

pub fn plan_icon(source: &Path, output: &Path, size: u32, background: Background) -> IconParams {
    IconParams {
        source: source.to_path_buf(),
        output: output.to_path_buf(),
        size,
        background,
    }
}

pub fn plan_ico(source: &Path, output: &Path, sizes: &[u32], background: Background) -> IcoParams {
    IcoParams {
        source: source.to_path_buf(),
        output: output.to_path_buf(),
        sizes: sizes.to_vec(),
        background,
    }
}

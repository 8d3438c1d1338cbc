//! Image processing backend trait and shared types.
//!
//! The [`ImageBackend`] trait defines the four operations every backend must
//! support: identify, resize, icon, and ico.
//!
//! The production implementation is
//! [`RustBackend`](super::rust_backend::RustBackend), built entirely on the
//! `image` crate. Everything is statically linked into the binary.

use super::params::{IcoParams, IconParams, ResizeParams};
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Processing failed: {0}")]
    ProcessingFailed(String),
}

/// Result of an identify operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    pub fn as_tuple(self) -> (u32, u32) {
        (self.width, self.height)
    }
}

/// Trait for image processing backends.
///
/// The rest of the crate only talks to this trait, so planning, skip logic
/// and batch traversal can be tested with a recording mock.
pub trait ImageBackend {
    /// Get image dimensions without a full decode where possible.
    fn identify(&self, path: &Path) -> Result<Dimensions, BackendError>;

    /// Resize, optionally blur, and encode by the output extension.
    fn resize(&self, params: &ResizeParams) -> Result<(), BackendError>;

    /// Contain-fit the source into a square PNG.
    fn icon(&self, params: &IconParams) -> Result<(), BackendError>;

    /// Write a multi-frame `.ico`.
    fn ico(&self, params: &IcoParams) -> Result<(), BackendError>;
}

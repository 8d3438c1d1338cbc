//! Image processing, pure Rust.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Identify** | `image::image_dimensions` |
//! | **Resize → WebP/JPEG/PNG/GIF** | Lanczos3 + `image` encoders |
//! | **Placeholder** | resize + Gaussian blur |
//! | **Icon** | contain fit on a filled square canvas |
//! | **ICO** | PNG frames in an `IcoEncoder` container |
//!
//! The module is split into:
//! - **Calculations**: Pure functions for dimension math (unit testable)
//! - **Parameters**: Data structures describing image operations
//! - **Backend**: [`ImageBackend`] trait + [`RustBackend`]
//! - **Operations**: Planning helpers and the skip-if-exists rule

pub mod backend;
mod calculations;
pub mod operations;
mod params;
pub mod rust_backend;

pub use backend::{BackendError, Dimensions, ImageBackend};
pub use calculations::{center_offset, contain_dimensions, scale_to_width, size_applies};
pub use operations::{
    WriteOutcome, get_dimensions, plan_full_size, plan_ico, plan_icon, plan_variant,
    write_unless_exists,
};
pub use params::{
    Background, IcoParams, IconParams, OutputFormat, Quality, ResizeParams, TRANSPARENT,
};
pub use rust_backend::{RustBackend, supported_input_extensions};

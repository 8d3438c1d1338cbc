//! Shared test utilities: synthetic source images on disk.
//!
//! ```rust,ignore
//! use crate::test_helpers::*;
//!
//! let tmp = tempfile::TempDir::new().unwrap();
//! let path = tmp.path().join("hero.jpg");
//! create_test_jpeg(&path, 400, 300);
//! ```

use image::codecs::jpeg::JpegEncoder;
use image::{ImageEncoder, Rgb, RgbImage, Rgba, RgbaImage};
use std::path::Path;

/// Pixel value for a simple diagonal gradient, so resizes have real content.
fn gradient(x: u32, y: u32, width: u32, height: u32) -> [u8; 3] {
    [
        (x * 255 / width.max(1)) as u8,
        (y * 255 / height.max(1)) as u8,
        128,
    ]
}

/// Write an RGB JPEG of the given size.
pub fn create_test_jpeg(path: &Path, width: u32, height: u32) {
    let img = RgbImage::from_fn(width, height, |x, y| Rgb(gradient(x, y, width, height)));
    let file = std::fs::File::create(path).unwrap();
    JpegEncoder::new_with_quality(file, 90)
        .write_image(
            img.as_raw(),
            width,
            height,
            image::ExtendedColorType::Rgb8,
        )
        .unwrap();
}

/// Write a fully opaque RGBA PNG of the given size.
pub fn create_test_png(path: &Path, width: u32, height: u32) {
    let img = RgbaImage::from_fn(width, height, |x, y| {
        let [r, g, b] = gradient(x, y, width, height);
        Rgba([r, g, b, 255])
    });
    img.save(path).unwrap();
}

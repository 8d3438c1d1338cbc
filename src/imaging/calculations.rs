//! Pure calculation functions for image dimensions.
//!
//! All functions here are pure and testable without any I/O or images.

/// Scale to a target width without enlarging, preserving aspect ratio.
///
/// If the target is at least as wide as the original, the original
/// dimensions are returned unchanged. Height never drops below 1px.
///
/// ```
/// # use image_tools::imaging::scale_to_width;
/// assert_eq!(scale_to_width((2000, 1000), 640), (640, 320));
/// assert_eq!(scale_to_width((300, 200), 640), (300, 200));
/// ```
pub fn scale_to_width(original: (u32, u32), width: u32) -> (u32, u32) {
    let (orig_w, orig_h) = original;
    if width >= orig_w || orig_w == 0 {
        return original;
    }
    let h = (orig_h as f64 * width as f64 / orig_w as f64).round() as u32;
    (width, h.max(1))
}

/// Dimensions that fit `original` inside an `edge`×`edge` square.
///
/// Unlike [`scale_to_width`] this enlarges small sources: icons must fill
/// their slot. The longer side always equals `edge`.
pub fn contain_dimensions(original: (u32, u32), edge: u32) -> (u32, u32) {
    let (orig_w, orig_h) = original;
    if orig_w == 0 || orig_h == 0 {
        return (edge, edge);
    }
    if orig_w >= orig_h {
        let h = (orig_h as f64 * edge as f64 / orig_w as f64).round() as u32;
        (edge, h.clamp(1, edge))
    } else {
        let w = (orig_w as f64 * edge as f64 / orig_h as f64).round() as u32;
        (w.clamp(1, edge), edge)
    }
}

/// Top-left offset that centers `inner` inside an `edge`×`edge` square.
pub fn center_offset(inner: (u32, u32), edge: u32) -> (i64, i64) {
    let x = (edge.saturating_sub(inner.0) / 2) as i64;
    let y = (edge.saturating_sub(inner.1) / 2) as i64;
    (x, y)
}

/// Whether a responsive size should be generated for an image this wide.
///
/// Sizes at or above the source width are skipped: they would only
/// duplicate the original.
pub fn size_applies(source_width: u32, target_width: u32) -> bool {
    source_width > target_width
}

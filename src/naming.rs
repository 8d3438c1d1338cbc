//! Centralized file naming for sources and generated outputs.
//!
//! Every generated file is named from its source's stem, so reruns find
//! earlier outputs by name alone:
//!
//! ```text
//! hero_main.jpg                    # source
//! hero_main.webp                   # full-size WebP
//! hero_main_sm.webp                # responsive WebP
//! hero_main_sm.jpg                 # responsive, source format
//! hero_main_placeholder.webp       # blurred placeholder
//! hero_main_placeholder.jpg
//! ```
//!
//! The source extension is kept verbatim (`photo.JPG` → `photo_sm.JPG`).
//! [`is_derived_output`] recognizes these names (and a few common
//! minifier suffixes) so batch runs never feed their own outputs back in.

use std::path::Path;

/// Suffix used for blurred placeholder outputs.
pub const PLACEHOLDER_SUFFIX: &str = "placeholder";

/// Name of the multi-resolution icon in the favicon set.
pub const FAVICON_ICO: &str = "favicon.ico";

/// Favicon PNGs: edge length → file name.
pub const FAVICON_PNGS: &[(u32, &str)] = &[
    (16, "favicon-16x16.png"),
    (32, "favicon-32x32.png"),
    (48, "favicon-48x48.png"),
    (180, "apple-touch-icon.png"),
    (192, "android-chrome-192x192.png"),
    (512, "android-chrome-512x512.png"),
];

/// Markers of files produced by other asset tools.
const FOREIGN_MARKERS: &[&str] = &[".min.", ".processed.", ".converted."];

/// Dash-style size suffixes used by other responsive-image tools.
const DASH_SIZE_SUFFIXES: &[&str] = &["-sm", "-md", "-lg", "-xl"];

/// A source file split into the parts output names are built from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceName {
    /// File name without the final extension.
    pub stem: String,
    /// Final extension including the dot, as written (`.JPG`), or empty.
    pub extension: String,
}

impl SourceName {
    /// Split a path's file name. Returns `None` for paths without a file name.
    pub fn parse(path: &Path) -> Option<Self> {
        let file_name = path.file_name()?.to_string_lossy();
        let (stem, extension) = match file_name.rfind('.') {
            Some(0) | None => (file_name.to_string(), String::new()),
            Some(dot) => (
                file_name[..dot].to_string(),
                file_name[dot..].to_string(),
            ),
        };
        Some(Self { stem, extension })
    }

    /// `{stem}.webp`
    pub fn webp(&self) -> String {
        format!("{}.webp", self.stem)
    }

    /// `{stem}_{suffix}.webp`
    pub fn variant_webp(&self, suffix: &str) -> String {
        format!("{}_{}.webp", self.stem, suffix)
    }

    /// `{stem}_{suffix}{original extension}`
    pub fn variant_original(&self, suffix: &str) -> String {
        format!("{}_{}{}", self.stem, suffix, self.extension)
    }

    pub fn is_webp(&self) -> bool {
        self.extension.eq_ignore_ascii_case(".webp")
    }
}

/// `icon-{n}x{n}.png`
pub fn pwa_icon_name(size: u32) -> String {
    format!("icon-{size}x{size}.png")
}

/// Whether `path` has one of `extensions` (case-insensitive, dot optional).
pub fn has_extension(path: &Path, extensions: &[String]) -> bool {
    let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
        return false;
    };
    extensions
        .iter()
        .any(|allowed| allowed.trim_start_matches('.').eq_ignore_ascii_case(ext))
}

/// Whether a file name looks like something this tool (or a minifier) generated.
///
/// `size_names` are the responsive size names in play (`sm`, `md`, ...).
pub fn is_derived_output(file_name: &str, size_names: &[String]) -> bool {
    let lower = file_name.to_lowercase();
    if FOREIGN_MARKERS.iter().any(|m| lower.contains(m)) {
        return true;
    }
    let stem = match lower.rfind('.') {
        Some(dot) if dot > 0 => &lower[..dot],
        _ => lower.as_str(),
    };
    if DASH_SIZE_SUFFIXES.iter().any(|s| stem.ends_with(s)) {
        return true;
    }
    std::iter::once(PLACEHOLDER_SUFFIX)
        .chain(size_names.iter().map(String::as_str))
        .any(|suffix| {
            stem.strip_suffix(suffix)
                .is_some_and(|rest| rest.ends_with('_') && rest.len() > 1)
        })
}

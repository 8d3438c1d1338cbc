//! # Image Tools
//!
//! Batch image optimizer for websites. Point it at a file or a directory of
//! JPEG/PNG/GIF/WebP sources and it writes everything a page needs next to
//! them (or into an output tree): a full-size WebP, responsive widths in WebP
//! and in the source format, and a small blurred placeholder. Logos become
//! favicon and PWA icon sets.
//!
//! ```text
//! src/images/hero_main.jpg
//!   → hero_main.webp
//!   → hero_main_sm.webp   hero_main_sm.jpg
//!   → hero_main_md.webp   hero_main_md.jpg
//!   → hero_main_placeholder.webp   hero_main_placeholder.jpg
//! ```
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`imaging`] | Pure-Rust image operations behind the [`imaging::ImageBackend`] trait |
//! | [`profiles`] | Built-in conversion profiles, name normalization, smart-mode detection |
//! | [`naming`] | Output file names and derived-output detection |
//! | [`config`] | `image-tools.toml` loading, merging, and validation |
//! | [`convert`] | One image → all outputs of its profile; plain WebP conversion |
//! | [`batch`] | Directory traversal, per-file conversion, run summary |
//! | [`icons`] | Favicon and PWA icon sets |
//! | [`output`] | CLI output formatting |
//! | [`logging`] | `tracing` subscriber setup |
//!
//! # Design Decisions
//!
//! ## Idempotent Runs
//!
//! Every output is written only when missing, unless `--force` is given.
//! Running the tool again over the same tree fills gaps and re-encodes
//! nothing, so it can sit in a build script without a cache.
//!
//! ## Profiles From File Names
//!
//! Images on a marketing site fall into a handful of roles (hero banners,
//! team portraits, product shots, thumbnails). Smart mode reads the role from
//! the file name (`hero_main.jpg`, `team-dr-lin.jpg`) so a whole directory can
//! be converted in one call; `--profile` overrides it.
//!
//! ## No Enlargement
//!
//! A responsive width at or above the source width is skipped rather than
//! upscaled, so no output is ever larger than its source in pixels.
//!
//! ## Pure-Rust Imaging
//!
//! Decoding, Lanczos3 resizing, blurring and encoding all use the `image`
//! crate. There are no system dependencies; the binary is self-contained.

pub mod batch;
pub mod config;
pub mod convert;
pub mod icons;
pub mod imaging;
pub mod logging;
pub mod naming;
pub mod output;
pub mod profiles;

#[cfg(test)]
pub(crate) mod test_helpers;

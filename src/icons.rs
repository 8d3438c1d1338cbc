//! Favicon and PWA icon sets.
//!
//! Both sets contain-fit one logo into exact squares, centered on the
//! configured background (transparent by default):
//!
//! ```text
//! public/                          public/icons/
//! ├── favicon-16x16.png            ├── icon-72x72.png
//! ├── favicon-32x32.png            ├── icon-96x96.png
//! ├── favicon-48x48.png            ├── ...
//! ├── apple-touch-icon.png         └── icon-512x512.png
//! ├── android-chrome-192x192.png
//! ├── android-chrome-512x512.png
//! └── favicon.ico  (16, 24, 32, 48, 64)
//! ```
//!
//! Existing files are kept unless `force` is set.

use crate::convert::{OutputRecord, OutputStatus};
use crate::imaging::{
    BackendError, Background, ImageBackend, RustBackend, TRANSPARENT, plan_ico, plan_icon,
    write_unless_exists,
};
use crate::naming::{FAVICON_ICO, FAVICON_PNGS, pwa_icon_name};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum IconError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Image processing failed: {0}")]
    Imaging(#[from] BackendError),
    #[error("Source image not found: {0}")]
    SourceNotFound(PathBuf),
    #[error("Output path exists and is not a directory: {0}")]
    NotADirectory(PathBuf),
}

#[derive(Debug, Clone)]
pub struct IconOptions {
    pub force: bool,
    pub background: Background,
    /// Frames inside `favicon.ico`.
    pub ico_sizes: Vec<u32>,
    /// PWA icon edge lengths.
    pub pwa_sizes: Vec<u32>,
}

impl Default for IconOptions {
    fn default() -> Self {
        Self {
            force: false,
            background: TRANSPARENT,
            ico_sizes: vec![16, 24, 32, 48, 64],
            pwa_sizes: vec![72, 96, 128, 144, 152, 192, 384, 512],
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct IconReport {
    pub source: PathBuf,
    pub target_dir: PathBuf,
    pub outputs: Vec<OutputRecord>,
}

impl IconReport {
    pub fn created(&self) -> usize {
        self.outputs
            .iter()
            .filter(|o| matches!(o.status, OutputStatus::Created { .. }))
            .count()
    }
}

fn prepare(source: &Path, target_dir: &Path) -> Result<(), IconError> {
    if !source.is_file() {
        return Err(IconError::SourceNotFound(source.to_path_buf()));
    }
    if target_dir.exists() && !target_dir.is_dir() {
        return Err(IconError::NotADirectory(target_dir.to_path_buf()));
    }
    fs::create_dir_all(target_dir)?;
    Ok(())
}

/// Favicon set with [`RustBackend`].
pub fn generate_favicons(
    source: &Path,
    target_dir: &Path,
    options: &IconOptions,
) -> Result<IconReport, IconError> {
    generate_favicons_with_backend(&RustBackend::new(), source, target_dir, options)
}

pub fn generate_favicons_with_backend(
    backend: &impl ImageBackend,
    source: &Path,
    target_dir: &Path,
    options: &IconOptions,
) -> Result<IconReport, IconError> {
    prepare(source, target_dir)?;

    let mut outputs = Vec::with_capacity(FAVICON_PNGS.len() + 1);
    for &(size, name) in FAVICON_PNGS {
        let params = plan_icon(source, &target_dir.join(name), size, options.background);
        let outcome = write_unless_exists(&params.output, options.force, || backend.icon(&params))?;
        outputs.push(OutputRecord {
            label: format!("{size}x{size}"),
            path: params.output,
            status: outcome.into(),
        });
    }

    let params = plan_ico(
        source,
        &target_dir.join(FAVICON_ICO),
        &options.ico_sizes,
        options.background,
    );
    let outcome = write_unless_exists(&params.output, options.force, || backend.ico(&params))?;
    outputs.push(OutputRecord {
        label: "ico".into(),
        path: params.output,
        status: outcome.into(),
    });

    Ok(IconReport {
        source: source.to_path_buf(),
        target_dir: target_dir.to_path_buf(),
        outputs,
    })
}

/// PWA icon set with [`RustBackend`].
pub fn generate_pwa_icons(
    source: &Path,
    target_dir: &Path,
    options: &IconOptions,
) -> Result<IconReport, IconError> {
    generate_pwa_icons_with_backend(&RustBackend::new(), source, target_dir, options)
}

pub fn generate_pwa_icons_with_backend(
    backend: &impl ImageBackend,
    source: &Path,
    target_dir: &Path,
    options: &IconOptions,
) -> Result<IconReport, IconError> {
    prepare(source, target_dir)?;

    let outputs = options
        .pwa_sizes
        .iter()
        .map(|&size| -> Result<OutputRecord, IconError> {
            let params = plan_icon(
                source,
                &target_dir.join(pwa_icon_name(size)),
                size,
                options.background,
            );
            let outcome =
                write_unless_exists(&params.output, options.force, || backend.icon(&params))?;
            Ok(OutputRecord {
                label: format!("{size}x{size}"),
                path: params.output,
                status: outcome.into(),
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(IconReport {
        source: source.to_path_buf(),
        target_dir: target_dir.to_path_buf(),
        outputs,
    })
}

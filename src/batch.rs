//! Directory batch conversion.
//!
//! [`process_directory`] walks a source tree, picks every image worth
//! converting, and runs [`convert_image`](crate::convert::convert_image) on
//! each one in turn. The output tree mirrors the source:
//!
//! ```text
//! src/images/                     public/images/
//! ├── hero.jpg              →     ├── hero.webp, hero_sm.webp, ...
//! ├── hero_sm.webp   (ignored: derived output)
//! └── team/                       └── team/
//!     └── dr-lin.jpg        →         └── dr-lin.webp, dr-lin_sm.webp, ...
//! ```
//!
//! ## Ordering
//!
//! Depth-first; a directory's files come before its subdirectories and
//! siblings are sorted by name, so runs are reproducible.
//!
//! ## Failures
//!
//! A file that fails to convert is recorded in the summary and the batch
//! moves on. Unreadable directories are recorded the same way. Only a
//! missing or non-directory source aborts the run.
//!
//! ## Progress
//!
//! When given a channel, the batch emits [`BatchEvent`]s as it goes; the CLI
//! prints them from a separate thread.

use crate::convert::{ConvertOptions, ConvertReport, convert_image_with_backend};
use crate::imaging::{ImageBackend, RustBackend};
use crate::naming::{SourceName, has_extension, is_derived_output};
use crate::profiles::ProfileRegistry;
use serde::Serialize;
use std::collections::HashSet;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum BatchError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Source directory not found: {0}")]
    SourceNotFound(PathBuf),
    #[error("Source is not a directory: {0}")]
    NotADirectory(PathBuf),
}

#[derive(Debug, Clone)]
pub struct BatchOptions {
    pub convert: ConvertOptions,
    pub recursive: bool,
    /// Accepted input extensions (`.jpg` or `jpg`).
    pub extensions: Vec<String>,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            convert: ConvertOptions::default(),
            recursive: false,
            extensions: [".jpg", ".jpeg", ".png", ".gif", ".webp"]
                .into_iter()
                .map(String::from)
                .collect(),
        }
    }
}

/// Progress events sent while a batch runs.
#[derive(Debug, Clone)]
pub enum BatchEvent {
    /// Traversal finished; `count` files will be converted.
    Found { count: usize },
    Started {
        index: usize,
        total: usize,
        path: PathBuf,
    },
    Converted {
        index: usize,
        total: usize,
        report: ConvertReport,
    },
    Failed {
        index: usize,
        total: usize,
        path: PathBuf,
        message: String,
    },
    /// A directory or entry could not be read during traversal.
    WalkFailed { path: PathBuf, message: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileError {
    pub path: PathBuf,
    pub message: String,
}

/// Totals for a batch run.
///
/// `total == succeeded + failed`. `errors` also holds traversal failures,
/// which are not counted as files.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchSummary {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    /// Output files written.
    pub created: usize,
    /// Planned outputs left alone (already present or too small).
    pub skipped: usize,
    pub errors: Vec<FileError>,
}

impl BatchSummary {
    pub fn has_failures(&self) -> bool {
        !self.errors.is_empty()
    }
}

/// A source file and the directory its outputs go to, relative to the
/// batch output root.
#[derive(Debug)]
struct SourceFile {
    path: PathBuf,
    relative_dir: PathBuf,
}

fn send(events: Option<&Sender<BatchEvent>>, event: BatchEvent) {
    if let Some(tx) = events {
        tx.send(event).ok();
    }
}

/// Collect convertible files under `source_dir` in processing order.
fn collect_sources(
    source_dir: &Path,
    output_dir: &Path,
    options: &BatchOptions,
    size_names: &[String],
    events: Option<&Sender<BatchEvent>>,
    errors: &mut Vec<FileError>,
) -> Vec<SourceFile> {
    // Outputs nested inside the source tree must not be walked into.
    let skip_dir = match (fs::canonicalize(source_dir), fs::canonicalize(output_dir)) {
        (Ok(src), Ok(out)) if src != out => Some(out),
        _ => None,
    };

    let mut walker = WalkDir::new(source_dir).min_depth(1);
    if !options.recursive {
        walker = walker.max_depth(1);
    }

    let mut files = Vec::new();
    let entries = walker.into_iter().filter_entry(|entry| {
        let is_output = entry.depth() > 0
            && entry.file_type().is_dir()
            && skip_dir.is_some()
            && fs::canonicalize(entry.path()).ok() == skip_dir;
        if is_output {
            tracing::debug!(path = %entry.path().display(), "skipping output directory");
        }
        !is_output
    });

    for entry in entries {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                let path = err
                    .path()
                    .map(Path::to_path_buf)
                    .unwrap_or_else(|| source_dir.to_path_buf());
                let message = err.to_string();
                tracing::warn!(path = %path.display(), "{message}");
                send(
                    events,
                    BatchEvent::WalkFailed {
                        path: path.clone(),
                        message: message.clone(),
                    },
                );
                errors.push(FileError { path, message });
                continue;
            }
        };

        let path = entry.path();
        if !path.is_file() || !has_extension(path, &options.extensions) {
            continue;
        }
        let file_name = entry.file_name().to_string_lossy();
        if is_derived_output(&file_name, size_names) {
            tracing::debug!(path = %path.display(), "skipping derived output");
            continue;
        }

        let relative_dir = path
            .parent()
            .and_then(|parent| parent.strip_prefix(source_dir).ok())
            .map(Path::to_path_buf)
            .unwrap_or_default();
        files.push(SourceFile {
            path: path.to_path_buf(),
            relative_dir,
        });
    }

    // `photo.webp` next to `photo.jpg` is that file's full-size output.
    let converted: HashSet<(PathBuf, String)> = files
        .iter()
        .filter_map(|f| {
            let name = SourceName::parse(&f.path)?;
            (!name.is_webp()).then(|| (f.relative_dir.clone(), name.stem))
        })
        .collect();
    files.retain(|f| match SourceName::parse(&f.path) {
        Some(name) if name.is_webp() => {
            !converted.contains(&(f.relative_dir.clone(), name.stem))
        }
        _ => true,
    });

    files.sort_by_cached_key(|f| {
        let dirs: Vec<OsString> = f
            .relative_dir
            .components()
            .map(|c| c.as_os_str().to_os_string())
            .collect();
        (dirs, f.path.file_name().map(|n| n.to_os_string()))
    });
    files
}

/// Convert every image in `source_dir` with [`RustBackend`].
pub fn process_directory(
    source_dir: &Path,
    output_dir: &Path,
    registry: &ProfileRegistry,
    options: &BatchOptions,
    events: Option<Sender<BatchEvent>>,
) -> Result<BatchSummary, BatchError> {
    process_directory_with_backend(
        &RustBackend::new(),
        source_dir,
        output_dir,
        registry,
        options,
        events,
    )
}

/// Convert every image in `source_dir` using a specific backend (allows testing with mock).
pub fn process_directory_with_backend(
    backend: &impl ImageBackend,
    source_dir: &Path,
    output_dir: &Path,
    registry: &ProfileRegistry,
    options: &BatchOptions,
    events: Option<Sender<BatchEvent>>,
) -> Result<BatchSummary, BatchError> {
    if !source_dir.exists() {
        return Err(BatchError::SourceNotFound(source_dir.to_path_buf()));
    }
    if !source_dir.is_dir() {
        return Err(BatchError::NotADirectory(source_dir.to_path_buf()));
    }
    let events = events.as_ref();

    let mut summary = BatchSummary::default();
    let files = collect_sources(
        source_dir,
        output_dir,
        options,
        &registry.size_names(),
        events,
        &mut summary.errors,
    );
    let total = files.len();
    summary.total = total;
    send(events, BatchEvent::Found { count: total });

    for (i, file) in files.into_iter().enumerate() {
        let index = i + 1;
        send(
            events,
            BatchEvent::Started {
                index,
                total,
                path: file.path.clone(),
            },
        );

        let target_dir = output_dir.join(&file.relative_dir);
        match convert_image_with_backend(
            backend,
            &file.path,
            &target_dir,
            registry,
            &options.convert,
        ) {
            Ok(report) => {
                summary.succeeded += 1;
                summary.created += report.created();
                summary.skipped += report.skipped();
                send(
                    events,
                    BatchEvent::Converted {
                        index,
                        total,
                        report,
                    },
                );
            }
            Err(err) => {
                let message = err.to_string();
                tracing::warn!(path = %file.path.display(), "conversion failed: {message}");
                summary.failed += 1;
                summary.errors.push(FileError {
                    path: file.path.clone(),
                    message: message.clone(),
                });
                send(
                    events,
                    BatchEvent::Failed {
                        index,
                        total,
                        path: file.path,
                        message,
                    },
                );
            }
        }
    }

    Ok(summary)
}

/// Write a summary as pretty JSON.
pub fn write_report(summary: &BatchSummary, path: &Path) -> Result<(), BatchError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(summary)?;
    fs::write(path, json)?;
    Ok(())
}

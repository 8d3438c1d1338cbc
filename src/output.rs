//! CLI output formatting for every command.
//!
//! # Output Format
//!
//! ## convert
//!
//! ```text
//! hero_main.jpg → hero (smart), 1920×1080, 412.3 KB
//!     full webp: created hero_main.webp (120.5 KB)
//!     sm webp: created hero_main_sm.webp (30 KB)
//!     sm jpg: exists hero_main_sm.jpg
//!     lg webp: skipped hero_main_lg.webp (source 1920px ≤ 1920px)
//! ```
//!
//! ## batch
//!
//! ```text
//! Found 3 images
//! [1/3] hero_main.jpg → hero (smart): 7 created, 2 skipped
//! [2/3] broken.jpg failed: Image processing failed: ...
//! [3/3] team/dr-lin.jpg → teamMember (smart): 7 created, 0 skipped
//!
//! Processed 3 images: 2 succeeded, 1 failed
//! Files: 14 created, 2 skipped
//! Errors:
//!     1. broken.jpg: Image processing failed: ...
//! ```
//!
//! # Architecture
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure: no I/O, no side effects.

use crate::batch::{BatchEvent, BatchSummary};
use crate::convert::{ConvertReport, OutputRecord, OutputStatus, WebpReport};
use crate::icons::IconReport;
use crate::naming::{FAVICON_ICO, FAVICON_PNGS};
use crate::profiles::{Profile, ProfileRegistry, ProfileSource};
use std::path::Path;

const UNITS: [&str; 5] = ["Bytes", "KB", "MB", "GB", "TB"];

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// Human-readable byte count: `0 Bytes`, `1.5 KB`, `2 MB`.
///
/// Two decimals with trailing zeros trimmed, 1024-based units.
pub fn format_file_size(bytes: u64) -> String {
    if bytes == 0 {
        return "0 Bytes".to_string();
    }
    let mut exponent = 0;
    while exponent < UNITS.len() - 1 && bytes >= 1024u64.pow(exponent as u32 + 1) {
        exponent += 1;
    }
    let value = bytes as f64 / 1024f64.powi(exponent as i32);
    let number = format!("{value:.2}");
    let number = number.trim_end_matches('0').trim_end_matches('.');
    format!("{number} {}", UNITS[exponent])
}

/// Size change from `original` to `output`: `saved 42.10%` or `grew 3.00%`.
pub fn format_ratio(original: u64, output: u64) -> String {
    if original == 0 {
        return "n/a".to_string();
    }
    let change = (1.0 - output as f64 / original as f64) * 100.0;
    if change >= 0.0 {
        format!("saved {change:.2}%")
    } else {
        format!("grew {:.2}%", -change)
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn profile_source_label(source: ProfileSource) -> &'static str {
    match source {
        ProfileSource::Explicit => "explicit",
        ProfileSource::Smart => "smart",
        ProfileSource::Default => "default",
    }
}

/// One output line: `sm webp: created hero_sm.webp (30 KB)`.
fn output_line(record: &OutputRecord) -> String {
    let name = file_name(&record.path);
    match record.status {
        OutputStatus::Created { bytes } => format!(
            "{}: created {} ({})",
            record.label,
            name,
            format_file_size(bytes)
        ),
        OutputStatus::Exists => format!("{}: exists {}", record.label, name),
        OutputStatus::TooSmall {
            source_width,
            target_width,
        } => format!(
            "{}: skipped {} (source {}px ≤ {}px)",
            record.label, name, source_width, target_width
        ),
    }
}

// ============================================================================
// convert / webp
// ============================================================================

pub fn format_convert_report(report: &ConvertReport) -> Vec<String> {
    let mut lines = vec![format!(
        "{} → {} ({}), {}×{}, {}",
        file_name(&report.source),
        report.profile,
        profile_source_label(report.profile_source),
        report.dimensions.width,
        report.dimensions.height,
        format_file_size(report.original_bytes)
    )];
    lines.extend(
        report
            .outputs
            .iter()
            .map(|o| format!("{}{}", indent(1), output_line(o))),
    );
    lines
}

pub fn print_convert_report(report: &ConvertReport) {
    for line in format_convert_report(report) {
        println!("{}", line);
    }
}

pub fn format_webp_report(report: &WebpReport) -> Vec<String> {
    let mut lines = vec![format!(
        "{} → {}",
        file_name(&report.source),
        file_name(&report.output)
    )];
    match report.output_bytes() {
        Some(bytes) => lines.push(format!(
            "{}{}×{}, {} → {} ({})",
            indent(1),
            report.dimensions.width,
            report.dimensions.height,
            format_file_size(report.original_bytes),
            format_file_size(bytes),
            format_ratio(report.original_bytes, bytes)
        )),
        None => lines.push(format!(
            "{}exists, use --force to overwrite",
            indent(1)
        )),
    }
    lines
}

pub fn print_webp_report(report: &WebpReport) {
    for line in format_webp_report(report) {
        println!("{}", line);
    }
}

// ============================================================================
// favicon / icons
// ============================================================================

pub fn format_icon_report(title: &str, report: &IconReport) -> Vec<String> {
    let mut lines = vec![format!(
        "{} from {} → {} ({} created)",
        title,
        file_name(&report.source),
        report.target_dir.display(),
        report.created()
    )];
    lines.extend(
        report
            .outputs
            .iter()
            .map(|o| format!("{}{}", indent(1), output_line(o))),
    );
    lines
}

pub fn print_icon_report(title: &str, report: &IconReport) {
    for line in format_icon_report(title, report) {
        println!("{}", line);
    }
}

// ============================================================================
// batch
// ============================================================================

/// Format a single batch progress event.
///
/// `root` is the batch source directory; paths are shown relative to it.
pub fn format_batch_event(event: &BatchEvent, root: &Path) -> Vec<String> {
    let relative = |path: &Path| {
        path.strip_prefix(root)
            .unwrap_or(path)
            .display()
            .to_string()
    };
    match event {
        BatchEvent::Found { count } => vec![match count {
            1 => "Found 1 image".to_string(),
            n => format!("Found {n} images"),
        }],
        // The per-file line is printed once the outcome is known.
        BatchEvent::Started { .. } => Vec::new(),
        BatchEvent::Converted {
            index,
            total,
            report,
        } => vec![format!(
            "[{}/{}] {} → {} ({}): {} created, {} skipped",
            index,
            total,
            relative(&report.source),
            report.profile,
            profile_source_label(report.profile_source),
            report.created(),
            report.skipped()
        )],
        BatchEvent::Failed {
            index,
            total,
            path,
            message,
        } => vec![format!(
            "[{}/{}] {} failed: {}",
            index,
            total,
            relative(path),
            message
        )],
        BatchEvent::WalkFailed { path, message } => {
            vec![format!("Cannot read {}: {}", relative(path), message)]
        }
    }
}

pub fn format_batch_summary(summary: &BatchSummary, root: &Path) -> Vec<String> {
    let mut lines = vec![
        format!(
            "Processed {} images: {} succeeded, {} failed",
            summary.total, summary.succeeded, summary.failed
        ),
        format!(
            "Files: {} created, {} skipped",
            summary.created, summary.skipped
        ),
    ];
    if !summary.errors.is_empty() {
        lines.push("Errors:".to_string());
        for (i, error) in summary.errors.iter().enumerate() {
            lines.push(format!(
                "{}{}. {}: {}",
                indent(1),
                i + 1,
                error.path.strip_prefix(root).unwrap_or(&error.path).display(),
                error.message
            ));
        }
    }
    lines
}

pub fn print_batch_summary(summary: &BatchSummary, root: &Path) {
    for line in format_batch_summary(summary, root) {
        println!("{}", line);
    }
}

// ============================================================================
// list-profiles
// ============================================================================

fn profile_line(name: &str, profile: &Profile, is_default: bool) -> String {
    let sizes = profile
        .sizes
        .iter()
        .map(|s| format!("{} {}", s.name, s.width))
        .collect::<Vec<_>>()
        .join(", ");
    let placeholder = match &profile.placeholder {
        Some(p) => format!("placeholder {}px blur {} q{}", p.width, p.blur, p.quality),
        None => "no placeholder".to_string(),
    };
    format!(
        "{}{}: {}; webp q{}; original q{}; {}",
        name,
        if is_default { " (default)" } else { "" },
        sizes,
        profile.webp_quality,
        profile.original_quality,
        placeholder
    )
}

fn join_sizes(sizes: &[u32]) -> String {
    sizes
        .iter()
        .map(u32::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Profiles and icon sets available to a run.
pub fn format_profiles(
    registry: &ProfileRegistry,
    ico_sizes: &[u32],
    pwa_sizes: &[u32],
) -> Vec<String> {
    let mut lines = vec!["Profiles".to_string()];
    for (name, profile) in registry.iter() {
        lines.push(format!(
            "{}{}",
            indent(1),
            profile_line(name, profile, name == registry.default_name())
        ));
    }

    let favicon_sizes: Vec<u32> = FAVICON_PNGS.iter().map(|(size, _)| *size).collect();
    lines.push(String::new());
    lines.push("Icon sets".to_string());
    lines.push(format!(
        "{}favicon: {} + {} ({})",
        indent(1),
        join_sizes(&favicon_sizes),
        FAVICON_ICO,
        join_sizes(ico_sizes)
    ));
    lines.push(format!("{}icons: {}", indent(1), join_sizes(pwa_sizes)));
    lines
}

pub fn print_profiles(registry: &ProfileRegistry, ico_sizes: &[u32], pwa_sizes: &[u32]) {
    for line in format_profiles(registry, ico_sizes, pwa_sizes) {
        println!("{}", line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::batch::FileError;
    use crate::imaging::Dimensions;
    use std::path::PathBuf;

    #[test]
    fn file_size_formatting() {
        assert_eq!(format_file_size(0), "0 Bytes");
        assert_eq!(format_file_size(500), "500 Bytes");
        assert_eq!(format_file_size(1024), "1 KB");
        assert_eq!(format_file_size(1536), "1.5 KB");
        assert_eq!(format_file_size(1_048_576), "1 MB");
        assert_eq!(format_file_size(1_234_567), "1.18 MB");
        assert_eq!(format_file_size(5 * 1024 * 1024 * 1024), "5 GB");
    }

    #[test]
    fn file_size_caps_at_terabytes() {
        assert_eq!(format_file_size(2048 * 1024u64.pow(4)), "2048 TB");
    }

    #[test]
    fn ratio_formatting() {
        assert_eq!(format_ratio(1000, 579), "saved 42.10%");
        assert_eq!(format_ratio(100, 103), "grew 3.00%");
        assert_eq!(format_ratio(100, 100), "saved 0.00%");
        assert_eq!(format_ratio(0, 10), "n/a");
    }

    fn sample_report() -> ConvertReport {
        ConvertReport {
            source: PathBuf::from("/img/hero_main.jpg"),
            profile: "hero".into(),
            profile_source: ProfileSource::Smart,
            dimensions: Dimensions {
                width: 1920,
                height: 1080,
            },
            original_bytes: 2048,
            outputs: vec![
                OutputRecord {
                    path: "/out/hero_main.webp".into(),
                    label: "full webp".into(),
                    status: OutputStatus::Created { bytes: 1536 },
                },
                OutputRecord {
                    path: "/out/hero_main_sm.jpg".into(),
                    label: "sm jpg".into(),
                    status: OutputStatus::Exists,
                },
                OutputRecord {
                    path: "/out/hero_main_lg.webp".into(),
                    label: "lg webp".into(),
                    status: OutputStatus::TooSmall {
                        source_width: 1920,
                        target_width: 1920,
                    },
                },
            ],
        }
    }

    #[test]
    fn convert_report_lines() {
        let lines = format_convert_report(&sample_report());
        assert_eq!(lines[0], "hero_main.jpg → hero (smart), 1920×1080, 2 KB");
        assert_eq!(lines[1], "    full webp: created hero_main.webp (1.5 KB)");
        assert_eq!(lines[2], "    sm jpg: exists hero_main_sm.jpg");
        assert_eq!(
            lines[3],
            "    lg webp: skipped hero_main_lg.webp (source 1920px ≤ 1920px)"
        );
    }

    #[test]
    fn webp_report_lines() {
        let mut report = WebpReport {
            source: "a/photo.jpg".into(),
            output: "a/photo.webp".into(),
            dimensions: Dimensions {
                width: 10,
                height: 20,
            },
            original_bytes: 1000,
            status: OutputStatus::Created { bytes: 579 },
        };
        let lines = format_webp_report(&report);
        assert_eq!(lines[0], "photo.jpg → photo.webp");
        assert_eq!(
            lines[1],
            "    10×20, 1000 Bytes → 579 Bytes (saved 42.10%)"
        );

        report.status = OutputStatus::Exists;
        assert!(format_webp_report(&report)[1].contains("--force"));
    }

    #[test]
    fn batch_events_are_relative_to_root() {
        let root = Path::new("/img");
        let converted = BatchEvent::Converted {
            index: 1,
            total: 3,
            report: sample_report(),
        };
        assert_eq!(
            format_batch_event(&converted, root),
            vec!["[1/3] hero_main.jpg → hero (smart): 1 created, 2 skipped"]
        );

        let failed = BatchEvent::Failed {
            index: 2,
            total: 3,
            path: "/img/team/broken.jpg".into(),
            message: "bad data".into(),
        };
        assert_eq!(
            format_batch_event(&failed, root),
            vec!["[2/3] team/broken.jpg failed: bad data"]
        );

        let started = BatchEvent::Started {
            index: 1,
            total: 3,
            path: "/img/a.jpg".into(),
        };
        assert!(format_batch_event(&started, root).is_empty());
        assert_eq!(
            format_batch_event(&BatchEvent::Found { count: 1 }, root),
            vec!["Found 1 image"]
        );
    }

    #[test]
    fn batch_summary_numbers_errors() {
        let summary = BatchSummary {
            total: 3,
            succeeded: 1,
            failed: 2,
            created: 7,
            skipped: 1,
            errors: vec![
                FileError {
                    path: "/img/a.jpg".into(),
                    message: "first".into(),
                },
                FileError {
                    path: "/img/b.jpg".into(),
                    message: "second".into(),
                },
            ],
        };
        let lines = format_batch_summary(&summary, Path::new("/img"));
        assert_eq!(lines[0], "Processed 3 images: 1 succeeded, 2 failed");
        assert_eq!(lines[1], "Files: 7 created, 1 skipped");
        assert_eq!(lines[2], "Errors:");
        assert_eq!(lines[3], "    1. a.jpg: first");
        assert_eq!(lines[4], "    2. b.jpg: second");
    }

    #[test]
    fn batch_summary_without_errors_has_no_error_block() {
        let lines = format_batch_summary(&BatchSummary::default(), Path::new("/"));
        assert_eq!(lines.len(), 2);
    }

    #[test]
    fn profile_listing() {
        let registry = ProfileRegistry::builtin();
        let lines = format_profiles(&registry, &[16, 32], &[192, 512]);
        assert_eq!(lines[0], "Profiles");
        let hero = "    hero: sm 768, md 1280, lg 1920; webp q90; original q85; \
                    placeholder 480px blur 15 q30";
        assert!(lines.iter().any(|l| l == hero));
        assert!(lines.iter().any(|l| l.starts_with("    default (default): ")));
        assert!(
            lines
                .iter()
                .any(|l| l.contains("icon: sm 64, md 128") && l.ends_with("no placeholder"))
        );
        let favicon = "    favicon: 16, 32, 48, 180, 192, 512 + favicon.ico (16, 32)";
        assert!(lines.iter().any(|l| l == favicon));
        assert_eq!(lines.last().unwrap(), "    icons: 192, 512");
    }
}

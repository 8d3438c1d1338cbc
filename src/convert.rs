//! Single-image conversion.
//!
//! [`convert_image`] turns one source into the full set of web outputs its
//! profile asks for:
//!
//! ```text
//! hero_main.jpg (1920×1080, profile "hero")
//! ├── hero_main.webp                  full size
//! ├── hero_main_sm.webp / _sm.jpg     768 wide
//! ├── hero_main_md.webp / _md.jpg     1280 wide
//! ├── (lg skipped: 1920 is not smaller than the source)
//! └── hero_main_placeholder.webp / _placeholder.jpg   480 wide, blurred
//! ```
//!
//! Every output is written only if missing (or with `force`), so re-running
//! over a tree fills gaps without re-encoding. A backend error aborts the
//! file; outputs written before the error stay on disk.
//!
//! [`convert_to_webp`] is the single-output variant behind the `webp` command.

use crate::imaging::{
    BackendError, Dimensions, ImageBackend, Quality, ResizeParams, RustBackend, WriteOutcome,
    get_dimensions, plan_full_size, plan_variant, size_applies, write_unless_exists,
};
use crate::naming::{PLACEHOLDER_SUFFIX, SourceName};
use crate::profiles::{ProfileRegistry, ProfileSource, UnknownProfile};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConvertError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Image processing failed: {0}")]
    Imaging(#[from] BackendError),
    #[error(transparent)]
    Profile(#[from] UnknownProfile),
    #[error("Source image not found: {0}")]
    SourceNotFound(PathBuf),
    #[error("Output path exists and is not a directory: {0}")]
    NotADirectory(PathBuf),
}

/// Which responsive sizes to generate.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SizeFilter {
    #[default]
    All,
    /// Lower-cased size names.
    Only(Vec<String>),
}

impl SizeFilter {
    pub fn includes(&self, name: &str) -> bool {
        match self {
            SizeFilter::All => true,
            SizeFilter::Only(names) => names.iter().any(|n| n.eq_ignore_ascii_case(name)),
        }
    }
}

impl FromStr for SizeFilter {
    type Err = String;

    /// `all`, or a comma-separated list of size names (`sm,md`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("all") {
            return Ok(SizeFilter::All);
        }
        let names: Vec<String> = s
            .split(',')
            .map(|n| n.trim().to_ascii_lowercase())
            .filter(|n| !n.is_empty())
            .collect();
        if names.is_empty() {
            return Err("expected 'all' or a comma-separated list of size names".into());
        }
        Ok(SizeFilter::Only(names))
    }
}

/// Which output families to generate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormatFilter {
    pub webp: bool,
    /// Outputs in the source's own format.
    pub original: bool,
}

impl Default for FormatFilter {
    fn default() -> Self {
        Self {
            webp: true,
            original: true,
        }
    }
}

impl FromStr for FormatFilter {
    type Err = String;

    /// `all`, or a comma-separated subset of `webp,original`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut filter = FormatFilter {
            webp: false,
            original: false,
        };
        for part in s.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            match part.to_ascii_lowercase().as_str() {
                "all" => filter = FormatFilter::default(),
                "webp" => filter.webp = true,
                "original" => filter.original = true,
                other => {
                    return Err(format!(
                        "unknown format '{other}' (expected webp, original or all)"
                    ));
                }
            }
        }
        if !filter.webp && !filter.original {
            return Err("at least one of webp, original is required".into());
        }
        Ok(filter)
    }
}

/// Per-run conversion settings.
#[derive(Debug, Clone)]
pub struct ConvertOptions {
    /// Explicit profile; overrides smart mode.
    pub profile: Option<String>,
    pub smart: bool,
    /// Overrides the profile's WebP and original quality (not placeholders).
    pub quality: Option<u32>,
    pub force: bool,
    pub sizes: SizeFilter,
    pub formats: FormatFilter,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            profile: None,
            smart: true,
            quality: None,
            force: false,
            sizes: SizeFilter::All,
            formats: FormatFilter::default(),
        }
    }
}

/// Outcome for one planned output file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum OutputStatus {
    Created { bytes: u64 },
    /// Already present; left untouched.
    Exists,
    /// Requested width is not smaller than the source.
    TooSmall { source_width: u32, target_width: u32 },
}

impl From<WriteOutcome> for OutputStatus {
    fn from(outcome: WriteOutcome) -> Self {
        match outcome {
            WriteOutcome::Written { bytes } => OutputStatus::Created { bytes },
            WriteOutcome::Exists => OutputStatus::Exists,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutputRecord {
    pub path: PathBuf,
    /// Short description, e.g. `sm webp` or `placeholder jpg`.
    pub label: String,
    #[serde(flatten)]
    pub status: OutputStatus,
}

#[derive(Debug, Clone, Serialize)]
pub struct ConvertReport {
    pub source: PathBuf,
    pub profile: String,
    pub profile_source: ProfileSource,
    pub dimensions: Dimensions,
    pub original_bytes: u64,
    pub outputs: Vec<OutputRecord>,
}

impl ConvertReport {
    /// Number of files written this run.
    pub fn created(&self) -> usize {
        self.outputs
            .iter()
            .filter(|o| matches!(o.status, OutputStatus::Created { .. }))
            .count()
    }

    /// Number of planned outputs not written (existing or too small).
    pub fn skipped(&self) -> usize {
        self.outputs.len() - self.created()
    }
}

/// Result of [`convert_to_webp`].
#[derive(Debug, Clone, Serialize)]
pub struct WebpReport {
    pub source: PathBuf,
    pub output: PathBuf,
    pub dimensions: Dimensions,
    pub original_bytes: u64,
    pub status: OutputStatus,
}

impl WebpReport {
    pub fn output_bytes(&self) -> Option<u64> {
        match self.status {
            OutputStatus::Created { bytes } => Some(bytes),
            _ => None,
        }
    }
}

fn check_source(source: &Path) -> Result<SourceName, ConvertError> {
    if !source.is_file() {
        return Err(ConvertError::SourceNotFound(source.to_path_buf()));
    }
    SourceName::parse(source).ok_or_else(|| ConvertError::SourceNotFound(source.to_path_buf()))
}

fn prepare_output_dir(dir: &Path) -> Result<(), ConvertError> {
    if dir.exists() && !dir.is_dir() {
        return Err(ConvertError::NotADirectory(dir.to_path_buf()));
    }
    fs::create_dir_all(dir)?;
    Ok(())
}

/// Whether `output` resolves to the `source` file itself (a WebP source
/// converted into its own directory).
fn is_source_itself(source: &Path, output: &Path) -> bool {
    match (fs::canonicalize(source), fs::canonicalize(output)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

/// Write one planned resize unless it already exists.
fn write_resize(
    backend: &impl ImageBackend,
    params: &ResizeParams,
    force: bool,
) -> Result<OutputStatus, ConvertError> {
    if is_source_itself(&params.source, &params.output) {
        tracing::debug!(path = %params.output.display(), "output is the source, leaving it");
        return Ok(OutputStatus::Exists);
    }
    let outcome = write_unless_exists(&params.output, force, || backend.resize(params))?;
    Ok(outcome.into())
}

/// Convert one image with [`RustBackend`].
pub fn convert_image(
    source: &Path,
    output_dir: &Path,
    registry: &ProfileRegistry,
    options: &ConvertOptions,
) -> Result<ConvertReport, ConvertError> {
    convert_image_with_backend(&RustBackend::new(), source, output_dir, registry, options)
}

/// Convert one image using a specific backend (allows testing with mock).
pub fn convert_image_with_backend(
    backend: &impl ImageBackend,
    source: &Path,
    output_dir: &Path,
    registry: &ProfileRegistry,
    options: &ConvertOptions,
) -> Result<ConvertReport, ConvertError> {
    let name = check_source(source)?;
    let file_name = source
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let resolved = registry.resolve(&file_name, options.profile.as_deref(), options.smart)?;
    prepare_output_dir(output_dir)?;
    let profile = resolved.profile;
    tracing::debug!(
        source = %source.display(),
        profile = resolved.name,
        via = ?resolved.source,
        "resolved profile"
    );

    let dimensions = get_dimensions(backend, source)?;
    let original_bytes = fs::metadata(source)?.len();

    let webp_quality = Quality::new(options.quality.unwrap_or(profile.webp_quality));
    let original_quality = Quality::new(options.quality.unwrap_or(profile.original_quality));
    let want_webp = options.formats.webp;
    let want_original = options.formats.original && !name.is_webp();
    let original_label = name.extension.trim_start_matches('.').to_ascii_lowercase();

    let write = |label: String, params: ResizeParams| -> Result<OutputRecord, ConvertError> {
        let status = write_resize(backend, &params, options.force)?;
        Ok(OutputRecord {
            path: params.output,
            label,
            status,
        })
    };

    let mut outputs = Vec::new();
    if want_webp {
        let output = output_dir.join(name.webp());
        outputs.push(write(
            "full webp".into(),
            plan_full_size(source, &output, dimensions, webp_quality),
        )?);
    }

    for size in profile.sizes.iter().filter(|s| options.sizes.includes(&s.name)) {
        let mut planned = Vec::new();
        if want_webp {
            planned.push((
                format!("{} webp", size.name),
                output_dir.join(name.variant_webp(&size.name)),
                webp_quality,
            ));
        }
        if want_original {
            planned.push((
                format!("{} {original_label}", size.name),
                output_dir.join(name.variant_original(&size.name)),
                original_quality,
            ));
        }

        if !size_applies(dimensions.width, size.width) {
            tracing::debug!(
                size = %size.name,
                width = size.width,
                source_width = dimensions.width,
                "size not smaller than source, skipping"
            );
            outputs.extend(planned.into_iter().map(|(label, path, _)| OutputRecord {
                path,
                label,
                status: OutputStatus::TooSmall {
                    source_width: dimensions.width,
                    target_width: size.width,
                },
            }));
            continue;
        }

        for (label, output, quality) in planned {
            outputs.push(write(
                label,
                plan_variant(source, &output, dimensions, size.width, quality, None),
            )?);
        }
    }

    if let Some(placeholder) = &profile.placeholder {
        let quality = Quality::new(placeholder.quality);
        let blur = Some(placeholder.blur);
        if want_webp {
            let output = output_dir.join(name.variant_webp(PLACEHOLDER_SUFFIX));
            outputs.push(write(
                format!("{PLACEHOLDER_SUFFIX} webp"),
                plan_variant(source, &output, dimensions, placeholder.width, quality, blur),
            )?);
        }
        if want_original {
            let output = output_dir.join(name.variant_original(PLACEHOLDER_SUFFIX));
            outputs.push(write(
                format!("{PLACEHOLDER_SUFFIX} {original_label}"),
                plan_variant(source, &output, dimensions, placeholder.width, quality, blur),
            )?);
        }
    }

    Ok(ConvertReport {
        source: source.to_path_buf(),
        profile: resolved.name.to_string(),
        profile_source: resolved.source,
        dimensions,
        original_bytes,
        outputs,
    })
}

/// Convert one image to a full-size WebP with [`RustBackend`].
///
/// `output_dir` defaults to the source's own directory.
pub fn convert_to_webp(
    source: &Path,
    output_dir: Option<&Path>,
    quality: Quality,
    force: bool,
) -> Result<WebpReport, ConvertError> {
    convert_to_webp_with_backend(&RustBackend::new(), source, output_dir, quality, force)
}

pub fn convert_to_webp_with_backend(
    backend: &impl ImageBackend,
    source: &Path,
    output_dir: Option<&Path>,
    quality: Quality,
    force: bool,
) -> Result<WebpReport, ConvertError> {
    let name = check_source(source)?;
    let output_dir = output_dir
        .map(Path::to_path_buf)
        .or_else(|| source.parent().map(Path::to_path_buf))
        .unwrap_or_default();
    if !output_dir.as_os_str().is_empty() {
        prepare_output_dir(&output_dir)?;
    }

    let dimensions = get_dimensions(backend, source)?;
    let original_bytes = fs::metadata(source)?.len();
    let output = output_dir.join(name.webp());
    let status = write_resize(
        backend,
        &plan_full_size(source, &output, dimensions, quality),
        force,
    )?;

    Ok(WebpReport {
        source: source.to_path_buf(),
        output,
        dimensions,
        original_bytes,
        status,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::backend::tests::{MockBackend, RecordedOp};
    use tempfile::TempDir;

    fn create_dummy_source(path: &Path) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        // The mock backend never decodes, so an empty file will do.
        fs::write(path, "").unwrap();
    }

    fn output_names(report: &ConvertReport) -> Vec<String> {
        report
            .outputs
            .iter()
            .map(|o| o.path.file_name().unwrap().to_string_lossy().into_owned())
            .collect()
    }

    fn resize_ops(backend: &MockBackend) -> Vec<RecordedOp> {
        backend
            .get_operations()
            .into_iter()
            .filter(|op| matches!(op, RecordedOp::Resize { .. }))
            .collect()
    }

    // =========================================================================
    // Filter parsing
    // =========================================================================

    #[test]
    fn size_filter_parsing() {
        assert_eq!("all".parse::<SizeFilter>().unwrap(), SizeFilter::All);
        assert_eq!(
            "sm, MD".parse::<SizeFilter>().unwrap(),
            SizeFilter::Only(vec!["sm".into(), "md".into()])
        );
        assert!(",".parse::<SizeFilter>().is_err());
    }

    #[test]
    fn size_filter_includes_case_insensitively() {
        let filter = SizeFilter::Only(vec!["sm".into()]);
        assert!(filter.includes("SM"));
        assert!(!filter.includes("md"));
        assert!(SizeFilter::All.includes("anything"));
    }

    #[test]
    fn format_filter_parsing() {
        assert_eq!(
            "all".parse::<FormatFilter>().unwrap(),
            FormatFilter::default()
        );
        assert_eq!(
            "webp".parse::<FormatFilter>().unwrap(),
            FormatFilter {
                webp: true,
                original: false
            }
        );
        assert_eq!(
            "original,webp".parse::<FormatFilter>().unwrap(),
            FormatFilter::default()
        );
        assert!("avif".parse::<FormatFilter>().is_err());
        assert!("".parse::<FormatFilter>().is_err());
    }

    // =========================================================================
    // convert_image with mock backend
    // =========================================================================

    #[test]
    fn hero_image_plans_outputs_in_order() {
        let tmp = TempDir::new().unwrap();
        let source = tmp.path().join("hero_main.jpg");
        create_dummy_source(&source);
        let out = tmp.path().join("out");

        let backend = MockBackend::with_dimensions(1920, 1080);
        let report = convert_image_with_backend(
            &backend,
            &source,
            &out,
            &ProfileRegistry::builtin(),
            &ConvertOptions::default(),
        )
        .unwrap();

        assert_eq!(report.profile, "hero");
        assert_eq!(report.profile_source, ProfileSource::Smart);
        assert_eq!(
            output_names(&report),
            vec![
                "hero_main.webp",
                "hero_main_sm.webp",
                "hero_main_sm.jpg",
                "hero_main_md.webp",
                "hero_main_md.jpg",
                "hero_main_lg.webp",
                "hero_main_lg.jpg",
                "hero_main_placeholder.webp",
                "hero_main_placeholder.jpg",
            ]
        );
        assert_eq!(report.created(), 7);
        assert_eq!(report.skipped(), 2);
        assert_eq!(
            report.outputs[5].status,
            OutputStatus::TooSmall {
                source_width: 1920,
                target_width: 1920
            }
        );
    }

    #[test]
    fn variants_use_profile_quality_and_scaled_height() {
        let tmp = TempDir::new().unwrap();
        let source = tmp.path().join("hero.jpg");
        create_dummy_source(&source);

        let backend = MockBackend::with_dimensions(1920, 1080);
        convert_image_with_backend(
            &backend,
            &source,
            tmp.path(),
            &ProfileRegistry::builtin(),
            &ConvertOptions::default(),
        )
        .unwrap();

        let ops = resize_ops(&backend);
        // full webp at source size
        assert!(matches!(
            &ops[0],
            RecordedOp::Resize { width: 1920, height: 1080, quality: 90, blur: None, .. }
        ));
        // sm jpg uses original quality
        assert!(matches!(
            &ops[2],
            RecordedOp::Resize { width: 768, height: 432, quality: 85, .. }
        ));
        // placeholder is blurred at its own quality
        assert!(matches!(
            &ops[5],
            RecordedOp::Resize {
                width: 480,
                height: 270,
                quality: 30,
                blur: Some(b),
                ..
            } if *b == 15.0
        ));
    }

    #[test]
    fn quality_override_skips_placeholders() {
        let tmp = TempDir::new().unwrap();
        let source = tmp.path().join("IMG_1.png");
        create_dummy_source(&source);

        let backend = MockBackend::with_dimensions(1000, 500);
        let options = ConvertOptions {
            quality: Some(50),
            ..Default::default()
        };
        convert_image_with_backend(
            &backend,
            &source,
            tmp.path(),
            &ProfileRegistry::builtin(),
            &options,
        )
        .unwrap();

        let qualities: Vec<u32> = resize_ops(&backend)
            .into_iter()
            .map(|op| match op {
                RecordedOp::Resize { quality, .. } => quality,
                _ => unreachable!(),
            })
            .collect();
        // full, sm webp, sm png, placeholder webp, placeholder png
        assert_eq!(qualities, vec![50, 50, 50, 30, 30]);
    }

    #[test]
    fn rerun_skips_existing_outputs() {
        let tmp = TempDir::new().unwrap();
        let source = tmp.path().join("product_a.jpg");
        create_dummy_source(&source);
        let registry = ProfileRegistry::builtin();

        let first = MockBackend::new();
        convert_image_with_backend(&first, &source, tmp.path(), &registry, &Default::default())
            .unwrap();
        assert!(!resize_ops(&first).is_empty());

        let second = MockBackend::new();
        let report =
            convert_image_with_backend(&second, &source, tmp.path(), &registry, &Default::default())
                .unwrap();
        assert!(resize_ops(&second).is_empty());
        assert_eq!(report.created(), 0);
        assert!(report.outputs.iter().all(|o| o.status == OutputStatus::Exists));
    }

    #[test]
    fn force_rewrites_existing_outputs() {
        let tmp = TempDir::new().unwrap();
        let source = tmp.path().join("thumb.jpg");
        create_dummy_source(&source);
        let registry = ProfileRegistry::builtin();

        convert_image_with_backend(
            &MockBackend::new(),
            &source,
            tmp.path(),
            &registry,
            &Default::default(),
        )
        .unwrap();

        let backend = MockBackend::new();
        let options = ConvertOptions {
            force: true,
            ..Default::default()
        };
        let report =
            convert_image_with_backend(&backend, &source, tmp.path(), &registry, &options).unwrap();
        assert_eq!(report.created(), report.outputs.len());
    }

    #[test]
    fn webp_source_has_no_original_variants() {
        let tmp = TempDir::new().unwrap();
        let source = tmp.path().join("photo.webp");
        create_dummy_source(&source);
        let out = tmp.path().join("out");

        let report = convert_image_with_backend(
            &MockBackend::new(),
            &source,
            &out,
            &ProfileRegistry::builtin(),
            &Default::default(),
        )
        .unwrap();

        assert_eq!(
            output_names(&report),
            vec!["photo.webp", "photo_sm.webp", "photo_placeholder.webp"]
        );
    }

    #[test]
    fn webp_source_in_place_is_never_overwritten() {
        let tmp = TempDir::new().unwrap();
        let source = tmp.path().join("photo.webp");
        create_dummy_source(&source);

        let backend = MockBackend::new();
        let options = ConvertOptions {
            force: true,
            ..Default::default()
        };
        let report = convert_image_with_backend(
            &backend,
            &source,
            tmp.path(),
            &ProfileRegistry::builtin(),
            &options,
        )
        .unwrap();

        assert_eq!(report.outputs[0].status, OutputStatus::Exists);
        assert!(
            !backend
                .written()
                .iter()
                .any(|p| p.ends_with("/photo.webp"))
        );
    }

    #[test]
    fn format_and_size_filters() {
        let tmp = TempDir::new().unwrap();
        let source = tmp.path().join("banner.jpg");
        create_dummy_source(&source);

        let options = ConvertOptions {
            sizes: SizeFilter::Only(vec!["md".into()]),
            formats: FormatFilter {
                webp: false,
                original: true,
            },
            ..Default::default()
        };
        let report = convert_image_with_backend(
            &MockBackend::new(),
            &source,
            tmp.path(),
            &ProfileRegistry::builtin(),
            &options,
        )
        .unwrap();

        assert_eq!(
            output_names(&report),
            vec!["banner_md.jpg", "banner_placeholder.jpg"]
        );
    }

    #[test]
    fn explicit_profile_and_no_smart() {
        let tmp = TempDir::new().unwrap();
        let source = tmp.path().join("hero.jpg");
        create_dummy_source(&source);
        let registry = ProfileRegistry::builtin();

        let explicit = ConvertOptions {
            profile: Some("icon".into()),
            ..Default::default()
        };
        let report = convert_image_with_backend(
            &MockBackend::new(),
            &source,
            tmp.path(),
            &registry,
            &explicit,
        )
        .unwrap();
        assert_eq!(report.profile, "icon");
        assert_eq!(report.profile_source, ProfileSource::Explicit);
        // icon has no placeholder
        assert!(!output_names(&report).iter().any(|n| n.contains("placeholder")));

        let plain = ConvertOptions {
            smart: false,
            force: true,
            ..Default::default()
        };
        let report =
            convert_image_with_backend(&MockBackend::new(), &source, tmp.path(), &registry, &plain)
                .unwrap();
        assert_eq!(report.profile, "default");
    }

    #[test]
    fn small_source_skips_every_size() {
        let tmp = TempDir::new().unwrap();
        let source = tmp.path().join("hero.png");
        create_dummy_source(&source);

        let report = convert_image_with_backend(
            &MockBackend::with_dimensions(500, 300),
            &source,
            tmp.path(),
            &ProfileRegistry::builtin(),
            &Default::default(),
        )
        .unwrap();

        let too_small = report
            .outputs
            .iter()
            .filter(|o| matches!(o.status, OutputStatus::TooSmall { .. }))
            .count();
        assert_eq!(too_small, 6);
        // full-size and both placeholders are still written
        assert_eq!(report.created(), 3);
    }

    #[test]
    fn unknown_profile_is_error() {
        let tmp = TempDir::new().unwrap();
        let source = tmp.path().join("a.jpg");
        create_dummy_source(&source);
        let out = tmp.path().join("public");
        let options = ConvertOptions {
            profile: Some("poster".into()),
            ..Default::default()
        };
        let result = convert_image_with_backend(
            &MockBackend::new(),
            &source,
            &out,
            &ProfileRegistry::builtin(),
            &options,
        );
        assert!(matches!(result, Err(ConvertError::Profile(_))));
        assert!(!out.exists(), "no output dir for a rejected profile");
    }

    #[test]
    fn missing_source_is_error() {
        let tmp = TempDir::new().unwrap();
        let result = convert_image_with_backend(
            &MockBackend::new(),
            &tmp.path().join("missing.jpg"),
            tmp.path(),
            &ProfileRegistry::builtin(),
            &Default::default(),
        );
        assert!(matches!(result, Err(ConvertError::SourceNotFound(_))));
    }

    #[test]
    fn output_path_that_is_a_file_is_error() {
        let tmp = TempDir::new().unwrap();
        let source = tmp.path().join("a.jpg");
        create_dummy_source(&source);
        let blocker = tmp.path().join("out");
        fs::write(&blocker, "").unwrap();

        let result = convert_image_with_backend(
            &MockBackend::new(),
            &source,
            &blocker,
            &ProfileRegistry::builtin(),
            &Default::default(),
        );
        assert!(matches!(result, Err(ConvertError::NotADirectory(_))));
    }

    #[test]
    fn undecodable_source_is_error() {
        let tmp = TempDir::new().unwrap();
        let source = tmp.path().join("broken.jpg");
        create_dummy_source(&source);
        let result = convert_image_with_backend(
            &MockBackend::new(),
            &source,
            tmp.path(),
            &ProfileRegistry::builtin(),
            &Default::default(),
        );
        assert!(matches!(result, Err(ConvertError::Imaging(_))));
    }

    #[test]
    fn report_serializes_status_inline() {
        let record = OutputRecord {
            path: "a_sm.webp".into(),
            label: "sm webp".into(),
            status: OutputStatus::Created { bytes: 12 },
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["status"], "created");
        assert_eq!(json["bytes"], 12);
    }

    // =========================================================================
    // convert_to_webp
    // =========================================================================

    #[test]
    fn convert_to_webp_next_to_source() {
        let tmp = TempDir::new().unwrap();
        let source = tmp.path().join("photo.jpg");
        create_dummy_source(&source);

        let backend = MockBackend::with_dimensions(640, 480);
        let report =
            convert_to_webp_with_backend(&backend, &source, None, Quality::new(75), false).unwrap();

        assert_eq!(report.output, tmp.path().join("photo.webp"));
        assert_eq!(report.output_bytes(), Some(0));
        assert!(matches!(
            &resize_ops(&backend)[0],
            RecordedOp::Resize { width: 640, height: 480, quality: 75, .. }
        ));
    }

    #[test]
    fn convert_to_webp_into_out_dir_and_skip_existing() {
        let tmp = TempDir::new().unwrap();
        let source = tmp.path().join("photo.png");
        create_dummy_source(&source);
        let out = tmp.path().join("nested/out");

        let backend = MockBackend::new();
        convert_to_webp_with_backend(&backend, &source, Some(&out), Quality::default(), false)
            .unwrap();
        assert!(out.join("photo.webp").exists());

        let report =
            convert_to_webp_with_backend(&backend, &source, Some(&out), Quality::default(), false)
                .unwrap();
        assert_eq!(report.status, OutputStatus::Exists);
        assert_eq!(report.output_bytes(), None);
    }
}

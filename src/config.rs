//! Tool configuration.
//!
//! Handles loading, validating, and merging `image-tools.toml`. Stock
//! defaults are overridden by the config file, which is in turn overridden
//! by environment variables and command-line flags (those last two layers
//! live in the CLI).
//!
//! ## Config File Location
//!
//! `image-tools.toml` in the working directory is picked up automatically;
//! `--config <path>` names another file (which must exist).
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! source_dir = "./src/images"   # batch source when no directory is given
//! # target_dir = "./public/images" # unset = write next to each source
//! extensions = [".jpg", ".jpeg", ".png", ".gif", ".webp"]
//! recursive = false
//! smart = true
//! force = false
//! webp_quality = 80             # quality for the `webp` command
//! default_profile = "default"
//!
//! [favicon]
//! target_dir = "./public"
//! ico_sizes = [16, 24, 32, 48, 64]
//! background = [255, 255, 255, 0]
//!
//! [icons]
//! target_dir = "./public/icons"
//! sizes = [72, 96, 128, 144, 152, 192, 384, 512]
//! background = [255, 255, 255, 0]
//!
//! [profiles.hero]
//! webp_quality = 92             # override one field of a built-in profile
//! ```
//!
//! ## Partial Configuration
//!
//! Config files are sparse: tables are merged key-by-key onto the stock
//! defaults, so `[profiles.hero] webp_quality = 92` keeps hero's sizes and
//! placeholder. A new `[profiles.<name>]` table adds a profile and must
//! then be complete.
//!
//! Unknown keys are rejected to catch typos early.

use crate::icons::IconOptions;
use crate::imaging::{Background, TRANSPARENT, supported_input_extensions};
use crate::profiles::{self, Profile, ProfileRegistry, normalize_name};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// File looked up in the working directory when `--config` is absent.
pub const CONFIG_FILE_NAME: &str = "image-tools.toml";

/// ICO directory entries store edge lengths in one byte (0 meaning 256).
const MAX_ICO_SIZE: u32 = 256;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config file not found: {0}")]
    NotFound(PathBuf),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Tool configuration loaded from `image-tools.toml`.
///
/// All fields have defaults. Unknown keys are rejected.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ToolsConfig {
    /// Directory processed by `batch` when none is given.
    pub source_dir: PathBuf,
    /// Output directory when `--out` is absent. Unset writes next to the source.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_dir: Option<PathBuf>,
    /// Input extensions accepted by batch processing.
    pub extensions: Vec<String>,
    /// Recurse into subdirectories by default.
    pub recursive: bool,
    /// Pick profiles from file names by default.
    pub smart: bool,
    /// Overwrite existing outputs by default.
    pub force: bool,
    /// Quality for the standalone `webp` command.
    pub webp_quality: u32,
    /// Profile used when no explicit or smart profile applies.
    pub default_profile: String,
    /// Favicon set settings.
    pub favicon: FaviconConfig,
    /// PWA icon set settings.
    pub icons: PwaIconsConfig,
    /// Conversion profiles by name.
    pub profiles: BTreeMap<String, Profile>,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            source_dir: PathBuf::from("./src/images"),
            target_dir: None,
            extensions: [".jpg", ".jpeg", ".png", ".gif", ".webp"]
                .into_iter()
                .map(String::from)
                .collect(),
            recursive: false,
            smart: true,
            force: false,
            webp_quality: 80,
            default_profile: profiles::DEFAULT_PROFILE.to_string(),
            favicon: FaviconConfig::default(),
            icons: PwaIconsConfig::default(),
            profiles: profiles::builtin_profiles(),
        }
    }
}

/// Favicon set settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FaviconConfig {
    pub target_dir: PathBuf,
    /// Frames packed into `favicon.ico`.
    pub ico_sizes: Vec<u32>,
    /// RGBA fill around the contained logo.
    pub background: Background,
}

impl Default for FaviconConfig {
    fn default() -> Self {
        Self {
            target_dir: PathBuf::from("./public"),
            ico_sizes: vec![16, 24, 32, 48, 64],
            background: TRANSPARENT,
        }
    }
}

/// PWA icon set settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PwaIconsConfig {
    pub target_dir: PathBuf,
    pub sizes: Vec<u32>,
    pub background: Background,
}

impl Default for PwaIconsConfig {
    fn default() -> Self {
        Self {
            target_dir: PathBuf::from("./public/icons"),
            sizes: vec![72, 96, 128, 144, 152, 192, 384, 512],
            background: TRANSPARENT,
        }
    }
}

fn check_quality(value: u32, key: &str) -> Result<(), ConfigError> {
    if !(1..=100).contains(&value) {
        return Err(ConfigError::Validation(format!("{key} must be 1-100")));
    }
    Ok(())
}

fn check_profile(name: &str, profile: &Profile) -> Result<(), ConfigError> {
    check_quality(profile.webp_quality, &format!("profiles.{name}.webp_quality"))?;
    check_quality(
        profile.original_quality,
        &format!("profiles.{name}.original_quality"),
    )?;
    let mut seen = HashSet::new();
    for size in &profile.sizes {
        if size.name.trim().is_empty() {
            return Err(ConfigError::Validation(format!(
                "profiles.{name}.sizes: size names must not be empty"
            )));
        }
        if size.width == 0 {
            return Err(ConfigError::Validation(format!(
                "profiles.{name}.sizes.{}: width must be non-zero",
                size.name
            )));
        }
        if !seen.insert(size.name.to_ascii_lowercase()) {
            return Err(ConfigError::Validation(format!(
                "profiles.{name}.sizes: duplicate size name '{}'",
                size.name
            )));
        }
    }
    if let Some(placeholder) = &profile.placeholder {
        check_quality(
            placeholder.quality,
            &format!("profiles.{name}.placeholder.quality"),
        )?;
        if placeholder.width == 0 {
            return Err(ConfigError::Validation(format!(
                "profiles.{name}.placeholder.width must be non-zero"
            )));
        }
        if placeholder.blur < 0.0 {
            return Err(ConfigError::Validation(format!(
                "profiles.{name}.placeholder.blur must not be negative"
            )));
        }
    }
    Ok(())
}

impl ToolsConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_quality(self.webp_quality, "webp_quality")?;

        if self.extensions.is_empty() {
            return Err(ConfigError::Validation(
                "extensions must not be empty".into(),
            ));
        }
        let decodable = supported_input_extensions();
        for ext in &self.extensions {
            let bare = ext.trim_start_matches('.').to_ascii_lowercase();
            if !decodable.contains(&bare.as_str()) {
                return Err(ConfigError::Validation(format!(
                    "extensions: no decoder for '{ext}' (supported: {})",
                    decodable.join(", ")
                )));
            }
        }

        if self.icons.sizes.is_empty() || self.icons.sizes.contains(&0) {
            return Err(ConfigError::Validation(
                "icons.sizes must be non-empty and non-zero".into(),
            ));
        }
        if self.favicon.ico_sizes.is_empty()
            || self
                .favicon
                .ico_sizes
                .iter()
                .any(|&s| s == 0 || s > MAX_ICO_SIZE)
        {
            return Err(ConfigError::Validation(format!(
                "favicon.ico_sizes must be non-empty and within 1-{MAX_ICO_SIZE}"
            )));
        }

        let mut normalized = HashSet::new();
        for (name, profile) in &self.profiles {
            if !normalized.insert(normalize_name(name)) {
                return Err(ConfigError::Validation(format!(
                    "profiles.{name} collides with another profile name"
                )));
            }
            check_profile(name, profile)?;
        }

        self.registry()?;
        Ok(())
    }

    /// Icon options for the favicon set.
    pub fn favicon_options(&self, force: bool) -> IconOptions {
        IconOptions {
            force: force || self.force,
            background: self.favicon.background,
            ico_sizes: self.favicon.ico_sizes.clone(),
            pwa_sizes: self.icons.sizes.clone(),
        }
    }

    /// Icon options for the PWA icon set.
    pub fn pwa_icon_options(&self, force: bool) -> IconOptions {
        IconOptions {
            background: self.icons.background,
            ..self.favicon_options(force)
        }
    }

    /// Build the profile registry this config describes.
    pub fn registry(&self) -> Result<ProfileRegistry, ConfigError> {
        ProfileRegistry::new(self.profiles.clone(), &self.default_profile).map_err(|e| {
            ConfigError::Validation(format!("default_profile: {e}"))
        })
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
///
/// This is the canonical representation of all default values, used as the
/// base layer for merging user overrides on top.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(ToolsConfig::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load a config file as a raw TOML value.
pub fn load_raw_config(path: &Path) -> Result<toml::Value, ConfigError> {
    let content = fs::read_to_string(path)?;
    Ok(toml::from_str(&content)?)
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<ToolsConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: ToolsConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load the effective config.
///
/// - `explicit = Some(path)`: that file must exist.
/// - `explicit = None`: `image-tools.toml` in `cwd` if present, else stock defaults.
pub fn load_config(explicit: Option<&Path>, cwd: &Path) -> Result<ToolsConfig, ConfigError> {
    let overlay = match explicit {
        Some(path) if !path.is_file() => return Err(ConfigError::NotFound(path.to_path_buf())),
        Some(path) => Some(load_raw_config(path)?),
        None => {
            let implicit = cwd.join(CONFIG_FILE_NAME);
            if implicit.is_file() {
                tracing::debug!(path = %implicit.display(), "loading config");
                Some(load_raw_config(&implicit)?)
            } else {
                None
            }
        }
    };
    resolve_config(stock_defaults_value(), overlay)
}

/// Returns a fully-commented stock `image-tools.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# image-tools configuration
# =========================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
#
# Precedence (lowest to highest): these defaults, this file, environment
# variables (IMAGE_TOOLS_OUT_DIR, IMAGE_TOOLS_QUALITY,
# IMAGE_TOOLS_DEFAULT_PROFILE, IMAGE_TOOLS_VERBOSE), command-line flags.
# Unknown keys will cause an error.

# Directory processed by `batch` when no directory argument is given.
source_dir = "./src/images"

# Output directory when --out is not given. Leave unset to write each
# output next to its source.
# target_dir = "./public/images"

# Input extensions accepted by batch processing.
extensions = [".jpg", ".jpeg", ".png", ".gif", ".webp"]

# Recurse into subdirectories (mirrored under the output directory).
recursive = false

# Pick a profile from the file name (hero_*, *banner*, *logo*, ...).
smart = true

# Overwrite outputs that already exist.
force = false

# Quality for the standalone `webp` command (1-100).
webp_quality = 80

# Profile used when neither --profile nor smart mode selects one.
default_profile = "default"

# ---------------------------------------------------------------------------
# Favicon set: favicon-16/32/48, apple-touch-icon, android-chrome-192/512,
# plus a multi-resolution favicon.ico
# ---------------------------------------------------------------------------
[favicon]
target_dir = "./public"
# Frames packed into favicon.ico (each 1-256).
ico_sizes = [16, 24, 32, 48, 64]
# RGBA fill around the logo when it is not square.
background = [255, 255, 255, 0]

# ---------------------------------------------------------------------------
# PWA icons: icon-<n>x<n>.png for every size
# ---------------------------------------------------------------------------
[icons]
target_dir = "./public/icons"
sizes = [72, 96, 128, 144, 152, 192, 384, 512]
background = [255, 255, 255, 0]

# ---------------------------------------------------------------------------
# Conversion profiles
# ---------------------------------------------------------------------------
# Each profile lists responsive widths (outputs are never enlarged), the
# WebP quality, the quality for outputs kept in the source format, and an
# optional blurred placeholder. Override single keys of a built-in profile,
# or add a complete new [profiles.<name>] table.

[profiles.blogImage]
sizes = [{ name = "sm", width = 640 }, { name = "md", width = 1024 }]
webp_quality = 85
original_quality = 80
placeholder = { width = 320, blur = 10.0, quality = 30 }

[profiles.caseStudy]
sizes = [{ name = "sm", width = 640 }, { name = "md", width = 1024 }]
webp_quality = 85
original_quality = 80
placeholder = { width = 400, blur = 10.0, quality = 30 }

[profiles.default]
sizes = [{ name = "sm", width = 640 }]
webp_quality = 80
original_quality = 75
placeholder = { width = 300, blur = 10.0, quality = 30 }

[profiles.hero]
sizes = [
    { name = "sm", width = 768 },
    { name = "md", width = 1280 },
    { name = "lg", width = 1920 },
]
webp_quality = 90
original_quality = 85
placeholder = { width = 480, blur = 15.0, quality = 30 }

[profiles.icon]
sizes = [{ name = "sm", width = 64 }, { name = "md", width = 128 }]
webp_quality = 95
original_quality = 90
# no placeholder

[profiles.product]
sizes = [{ name = "sm", width = 480 }, { name = "md", width = 800 }]
webp_quality = 90
original_quality = 85
placeholder = { width = 200, blur = 5.0, quality = 30 }

[profiles.teamMember]
sizes = [{ name = "sm", width = 320 }, { name = "md", width = 480 }]
webp_quality = 90
original_quality = 85
placeholder = { width = 100, blur = 5.0, quality = 40 }

[profiles.thumbnail]
sizes = [{ name = "sm", width = 320 }]
webp_quality = 80
original_quality = 75
placeholder = { width = 80, blur = 5.0, quality = 30 }
"##
}

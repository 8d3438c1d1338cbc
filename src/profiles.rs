//! Conversion profiles and smart-mode profile detection.
//!
//! A [`Profile`] says which responsive widths to generate, at what quality,
//! and whether to produce a blurred placeholder. Profiles come from the
//! built-in table below, optionally overridden or extended by the
//! `[profiles.<name>]` tables of `image-tools.toml`.
//!
//! ## Built-in profiles
//!
//! | name | sizes | webp q | original q | placeholder (w / blur / q) |
//! |---|---|---|---|---|
//! | `caseStudy` | sm 640, md 1024 | 85 | 80 | 400 / 10 / 30 |
//! | `hero` | sm 768, md 1280, lg 1920 | 90 | 85 | 480 / 15 / 30 |
//! | `icon` | sm 64, md 128 | 95 | 90 | none |
//! | `product` | sm 480, md 800 | 90 | 85 | 200 / 5 / 30 |
//! | `teamMember` | sm 320, md 480 | 90 | 85 | 100 / 5 / 40 |
//! | `thumbnail` | sm 320 | 80 | 75 | 80 / 5 / 30 |
//! | `blogImage` | sm 640, md 1024 | 85 | 80 | 320 / 10 / 30 |
//! | `default` | sm 640 | 80 | 75 | 300 / 10 / 30 |
//!
//! ## Name matching
//!
//! Profile names are compared after lower-casing and dropping `-` and `_`,
//! so `caseStudy`, `case-study` and `case_study` all name the same profile.
//!
//! ## Smart mode
//!
//! Without an explicit `--profile`, the lower-cased file name is matched
//! against [`SMART_RULES`] in order; the first rule with a hit wins.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One responsive width, named for the output suffix (`hero_sm.webp`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SizeSpec {
    pub name: String,
    pub width: u32,
}

/// Low-quality blurred preview shown while the real image loads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PlaceholderSpec {
    pub width: u32,
    /// Gaussian blur sigma.
    pub blur: f32,
    pub quality: u32,
}

/// A named conversion recipe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Profile {
    pub sizes: Vec<SizeSpec>,
    /// Quality for every WebP output.
    pub webp_quality: u32,
    /// Quality for outputs kept in the source format.
    pub original_quality: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<PlaceholderSpec>,
}

fn sizes(specs: &[(&str, u32)]) -> Vec<SizeSpec> {
    specs
        .iter()
        .map(|&(name, width)| SizeSpec {
            name: name.to_string(),
            width,
        })
        .collect()
}

fn placeholder(width: u32, blur: f32, quality: u32) -> Option<PlaceholderSpec> {
    Some(PlaceholderSpec {
        width,
        blur,
        quality,
    })
}

/// Name of the profile used when nothing else applies.
pub const DEFAULT_PROFILE: &str = "default";

/// The built-in profile table, keyed by canonical name.
pub fn builtin_profiles() -> BTreeMap<String, Profile> {
    let table = [
        (
            "caseStudy",
            Profile {
                sizes: sizes(&[("sm", 640), ("md", 1024)]),
                webp_quality: 85,
                original_quality: 80,
                placeholder: placeholder(400, 10.0, 30),
            },
        ),
        (
            "hero",
            Profile {
                sizes: sizes(&[("sm", 768), ("md", 1280), ("lg", 1920)]),
                webp_quality: 90,
                original_quality: 85,
                placeholder: placeholder(480, 15.0, 30),
            },
        ),
        (
            "icon",
            Profile {
                sizes: sizes(&[("sm", 64), ("md", 128)]),
                webp_quality: 95,
                original_quality: 90,
                placeholder: None,
            },
        ),
        (
            "product",
            Profile {
                sizes: sizes(&[("sm", 480), ("md", 800)]),
                webp_quality: 90,
                original_quality: 85,
                placeholder: placeholder(200, 5.0, 30),
            },
        ),
        (
            "teamMember",
            Profile {
                sizes: sizes(&[("sm", 320), ("md", 480)]),
                webp_quality: 90,
                original_quality: 85,
                placeholder: placeholder(100, 5.0, 40),
            },
        ),
        (
            "thumbnail",
            Profile {
                sizes: sizes(&[("sm", 320)]),
                webp_quality: 80,
                original_quality: 75,
                placeholder: placeholder(80, 5.0, 30),
            },
        ),
        (
            "blogImage",
            Profile {
                sizes: sizes(&[("sm", 640), ("md", 1024)]),
                webp_quality: 85,
                original_quality: 80,
                placeholder: placeholder(320, 10.0, 30),
            },
        ),
        (
            DEFAULT_PROFILE,
            Profile {
                sizes: sizes(&[("sm", 640)]),
                webp_quality: 80,
                original_quality: 75,
                placeholder: placeholder(300, 10.0, 30),
            },
        ),
    ];
    table
        .into_iter()
        .map(|(name, profile)| (name.to_string(), profile))
        .collect()
}

/// A smart-mode rule: any prefix or substring hit selects `profile`.
#[derive(Debug)]
pub struct SmartRule {
    pub profile: &'static str,
    pub prefixes: &'static [&'static str],
    pub contains: &'static [&'static str],
}

impl SmartRule {
    fn matches(&self, lower_name: &str) -> bool {
        self.prefixes.iter().any(|p| lower_name.starts_with(p))
            || self.contains.iter().any(|c| lower_name.contains(c))
    }
}

/// Ordered filename rules for smart mode.
pub const SMART_RULES: &[SmartRule] = &[
    SmartRule {
        profile: "hero",
        prefixes: &[],
        contains: &["hero", "banner", "cover"],
    },
    SmartRule {
        profile: "caseStudy",
        prefixes: &["case_"],
        contains: &["casestudy", "case-study", "case_study"],
    },
    SmartRule {
        profile: "teamMember",
        prefixes: &[],
        contains: &["team", "profile", "avatar", "member"],
    },
    SmartRule {
        profile: "product",
        prefixes: &[],
        contains: &["product", "item"],
    },
    SmartRule {
        profile: "thumbnail",
        prefixes: &[],
        contains: &["thumb"],
    },
    SmartRule {
        profile: "blogImage",
        prefixes: &[],
        contains: &["blog", "article"],
    },
    SmartRule {
        profile: "icon",
        prefixes: &[],
        contains: &["icon", "logo"],
    },
];

/// Canonical comparison key for a profile name.
pub fn normalize_name(name: &str) -> String {
    name.chars()
        .filter(|c| *c != '-' && *c != '_')
        .flat_map(char::to_lowercase)
        .collect()
}

/// How a profile was chosen for a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProfileSource {
    /// Named with `--profile`.
    Explicit,
    /// Matched from the file name.
    Smart,
    /// Fallback `default_profile`.
    Default,
}

/// A profile picked for a specific file.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedProfile<'a> {
    pub name: &'a str,
    pub profile: &'a Profile,
    pub source: ProfileSource,
}

#[derive(Debug, thiserror::Error)]
#[error("Unknown profile '{name}'. Available: {available}")]
pub struct UnknownProfile {
    pub name: String,
    pub available: String,
}

/// Profiles available to a run, with normalized-name lookup.
#[derive(Debug, Clone)]
pub struct ProfileRegistry {
    profiles: BTreeMap<String, Profile>,
    /// normalized name → canonical name
    index: BTreeMap<String, String>,
    default_name: String,
}

impl ProfileRegistry {
    /// Build a registry. `default_name` must name one of `profiles`.
    pub fn new(
        profiles: BTreeMap<String, Profile>,
        default_name: &str,
    ) -> Result<Self, UnknownProfile> {
        let index = profiles
            .keys()
            .map(|name| (normalize_name(name), name.clone()))
            .collect();
        let mut registry = Self {
            profiles,
            index,
            default_name: String::new(),
        };
        registry.default_name = registry.canonical(default_name)?.to_string();
        Ok(registry)
    }

    pub fn builtin() -> Self {
        Self::new(builtin_profiles(), DEFAULT_PROFILE)
            .expect("builtin table contains the default profile")
    }

    fn canonical(&self, name: &str) -> Result<&str, UnknownProfile> {
        self.index
            .get(&normalize_name(name))
            .map(String::as_str)
            .ok_or_else(|| UnknownProfile {
                name: name.to_string(),
                available: self.names().collect::<Vec<_>>().join(", "),
            })
    }

    /// Look up a profile by any spelling of its name.
    pub fn get(&self, name: &str) -> Result<(&str, &Profile), UnknownProfile> {
        let canonical = self.canonical(name)?;
        let (key, profile) = self
            .profiles
            .get_key_value(canonical)
            .ok_or_else(|| UnknownProfile {
                name: name.to_string(),
                available: String::new(),
            })?;
        Ok((key.as_str(), profile))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.profiles.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Profile)> {
        self.profiles.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn default_name(&self) -> &str {
        &self.default_name
    }

    /// Every size name across all profiles (used to recognize derived files).
    pub fn size_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .profiles
            .values()
            .flat_map(|p| p.sizes.iter().map(|s| s.name.to_ascii_lowercase()))
            .collect();
        names.sort();
        names.dedup();
        names
    }

    /// Smart-mode match for a file name, restricted to registered profiles.
    pub fn smart_match(&self, file_name: &str) -> Option<&str> {
        let lower = file_name.to_lowercase();
        SMART_RULES
            .iter()
            .filter(|rule| rule.matches(&lower))
            .find_map(|rule| self.canonical(rule.profile).ok())
    }

    /// Pick the profile for a file: explicit > smart > default.
    pub fn resolve(
        &self,
        file_name: &str,
        explicit: Option<&str>,
        smart: bool,
    ) -> Result<ResolvedProfile<'_>, UnknownProfile> {
        let (name, source) = match explicit {
            Some(name) => (self.canonical(name)?, ProfileSource::Explicit),
            None => match smart.then(|| self.smart_match(file_name)).flatten() {
                Some(name) => (name, ProfileSource::Smart),
                None => (self.default_name.as_str(), ProfileSource::Default),
            },
        };
        let (name, profile) = self.get(name)?;
        Ok(ResolvedProfile {
            name,
            profile,
            source,
        })
    }
}

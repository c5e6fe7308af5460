//! Platform profiles and pipeline configuration
//!
//! A platform is a named set of capability tags (`bw`, `color`, `round`, ...).
//! Tags drive both variant selection and the color mode generators pack
//! bitmaps in.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;

use crate::error::{ResourceError, ResourceResult};

// ============================================================================
// Color Mode
// ============================================================================

/// Pixel format the target display expects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ColorMode {
    /// 1 bit per pixel, black and white
    #[default]
    Mono1Bit,
    /// 8 bits per pixel, 2 bits each of alpha, red, green, blue
    Color8Bit,
}

impl ColorMode {
    /// Derive the color mode from a platform's tags
    pub fn from_tags(tags: &BTreeSet<String>) -> Self {
        if tags.contains("color") {
            ColorMode::Color8Bit
        } else {
            ColorMode::Mono1Bit
        }
    }
}

// ============================================================================
// Platform
// ============================================================================

/// A target device profile
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Platform {
    /// Platform name (also usable as a variant tag)
    pub name: String,
    /// Capability tags, including the platform name itself
    pub tags: BTreeSet<String>,
    /// Color mode used by image generators
    pub color_mode: ColorMode,
}

impl Platform {
    /// Create a platform from a name and its capability tags
    ///
    /// The platform name is always added to its own tag set.
    pub fn new(name: impl Into<String>, tags: &[&str]) -> Self {
        let name = name.into();
        let mut tags: BTreeSet<String> = tags.iter().map(|t| t.to_string()).collect();
        tags.insert(name.clone());
        let color_mode = ColorMode::from_tags(&tags);
        Self {
            name,
            tags,
            color_mode,
        }
    }

    /// Check whether the platform carries a tag
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.contains(tag)
    }
}

/// Known platforms plus the variant-tag vocabulary they imply
#[derive(Debug, Clone)]
pub struct PlatformRegistry {
    platforms: BTreeMap<String, Platform>,
}

impl Default for PlatformRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

impl PlatformRegistry {
    /// Registry with no platforms
    pub fn empty() -> Self {
        Self {
            platforms: BTreeMap::new(),
        }
    }

    /// Registry with the builtin device profiles
    pub fn builtin() -> Self {
        let mut registry = Self::empty();
        registry.add(Platform::new("aplite", &["bw", "rect", "144w", "168h"]));
        registry.add(Platform::new("basalt", &["color", "rect", "144w", "168h"]));
        registry.add(Platform::new("chalk", &["color", "round", "180w", "180h"]));
        registry.add(Platform::new("diorite", &["bw", "rect", "144w", "168h"]));
        registry.add(Platform::new("emery", &["color", "rect", "200w", "228h"]));
        registry
    }

    /// Add or replace a platform
    pub fn add(&mut self, platform: Platform) {
        self.platforms.insert(platform.name.clone(), platform);
    }

    /// Look up a platform by name
    pub fn get(&self, name: &str) -> ResourceResult<&Platform> {
        self.platforms.get(name).ok_or_else(|| {
            ResourceError::Manifest(format!(
                "Unknown platform '{}' (known: {})",
                name,
                self.names().collect::<Vec<_>>().join(", ")
            ))
        })
    }

    /// Names of all registered platforms, sorted
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.platforms.keys().map(String::as_str)
    }
}

// ============================================================================
// Pipeline Configuration
// ============================================================================

/// Default pack file name
pub const PACK_FILE_NAME: &str = "resources.pbpack";
/// Default builtin table file name
pub const BUILTIN_FILE_NAME: &str = "builtin_resources.auto.c";
/// Default resource id header file name
pub const ID_HEADER_FILE_NAME: &str = "resource_ids.auto.h";
/// Default intermediate resource ball file name
pub const BALL_FILE_NAME: &str = "resources.ball.json";

/// Runtime configuration for one build variant
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Directory source file paths are relative to
    pub resource_root: PathBuf,
    /// Directory outputs are written to
    pub output_dir: PathBuf,
    /// Target platform name
    pub platform: String,
    /// Fixed pack version tag; derived from content when unset
    pub pack_version: Option<[u8; 16]>,
}

impl PipelineConfig {
    /// Create a config for a platform with default directories
    pub fn new(platform: impl Into<String>) -> Self {
        Self {
            resource_root: PathBuf::from("resources"),
            output_dir: PathBuf::from("build"),
            platform: platform.into(),
            pack_version: None,
        }
    }

    /// Set the resource root
    pub fn with_resource_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.resource_root = root.into();
        self
    }

    /// Set the output directory
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    /// Pin the pack version tag
    pub fn with_pack_version(mut self, version: [u8; 16]) -> Self {
        self.pack_version = Some(version);
        self
    }

    /// Path of the pack output
    pub fn pack_path(&self) -> PathBuf {
        self.output_dir.join(PACK_FILE_NAME)
    }

    /// Path of the builtin table output
    pub fn builtin_path(&self) -> PathBuf {
        self.output_dir.join(BUILTIN_FILE_NAME)
    }

    /// Path of the id header output
    pub fn id_header_path(&self) -> PathBuf {
        self.output_dir.join(ID_HEADER_FILE_NAME)
    }

    /// Path of the persisted resource ball
    pub fn ball_path(&self) -> PathBuf {
        self.output_dir.join(BALL_FILE_NAME)
    }
}

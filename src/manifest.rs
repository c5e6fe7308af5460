//! Resource manifest parser
//!
//! Resources are declared in a `resources.toml` file:
//!
//! ```toml
//! [[media]]                     # A resource generated from a source file
//! type = "bitmap"               # raw | png | bitmap | png-trans
//! name = "IMAGE_LOGO"
//! file = "images/logo.png"      # generic name, variants resolved per platform
//! storage = "pack"              # pack | builtin | filesystem
//! target_platforms = ["basalt"] # omit for all platforms
//! aliases = ["IMAGE_LOGO_OLD"]
//!
//! [[declarations]]              # A resource supplied elsewhere at runtime
//! type = "raw"
//! name = "LANG_PACK"
//!
//! [platforms.custom]            # Extra platform profiles
//! tags = ["color", "rect"]
//! ```

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};

use crate::config::{Platform, PlatformRegistry};
use crate::definition::{ResourceDeclaration, ResourceDefinition, StorageClass, TargetPlatforms};
use crate::error::{ResourceError, ResourceResult};
use crate::variant::VARIANT_SEPARATOR;

/// Root manifest structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Manifest {
    /// Resources generated from source files, in id order
    #[serde(default)]
    pub media: Vec<MediaEntry>,

    /// Resources declared by name only
    #[serde(default)]
    pub declarations: Vec<DeclarationEntry>,

    /// Additional platform profiles
    #[serde(default)]
    pub platforms: BTreeMap<String, PlatformEntry>,
}

/// A `[[media]]` entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaEntry {
    /// Resource type tag
    #[serde(rename = "type")]
    pub resource_type: String,

    /// Resource name
    pub name: String,

    /// Generic source file, relative to the resource root
    pub file: PathBuf,

    /// Storage class
    #[serde(default)]
    pub storage: StorageClass,

    /// Platforms to build for (all when omitted)
    #[serde(default)]
    pub target_platforms: Option<Vec<String>>,

    /// Alternate names
    #[serde(default)]
    pub aliases: Vec<String>,
}

impl MediaEntry {
    /// Convert to a resource definition
    pub fn to_definition(&self) -> ResourceDefinition {
        let target_platforms = match &self.target_platforms {
            Some(names) => TargetPlatforms::only(names.iter().cloned()),
            None => TargetPlatforms::All,
        };
        ResourceDefinition {
            resource_type: self.resource_type.clone(),
            name: self.name.clone(),
            source_path: self.file.clone(),
            storage_class: self.storage,
            target_platforms,
            aliases: self.aliases.clone(),
        }
    }
}

/// A `[[declarations]]` entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeclarationEntry {
    /// Resource type tag
    #[serde(rename = "type")]
    pub resource_type: String,

    /// Resource name
    pub name: String,
}

/// A `[platforms.<name>]` entry
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlatformEntry {
    /// Capability tags
    #[serde(default)]
    pub tags: Vec<String>,
}

impl Manifest {
    /// Load manifest from file
    pub fn from_file(path: impl AsRef<Path>) -> ResourceResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            ResourceError::Manifest(format!(
                "Failed to read manifest file {}: {}",
                path.display(),
                e
            ))
        })?;
        Self::parse(&content)
    }

    /// Parse manifest from TOML string
    pub fn parse(content: &str) -> ResourceResult<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Find manifest file in directory
    pub fn find_in_dir(dir: impl AsRef<Path>) -> Option<PathBuf> {
        let dir = dir.as_ref();
        ["resources.toml", "respack.toml", "resources/resources.toml"]
            .into_iter()
            .map(|name| dir.join(name))
            .find(|path| path.exists())
    }

    /// Validate the manifest
    pub fn validate(&self) -> ResourceResult<()> {
        if self.media.is_empty() && self.declarations.is_empty() {
            return Err(ResourceError::Manifest(
                "No resources declared in [[media]] or [[declarations]]".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        let names = self
            .media
            .iter()
            .flat_map(|m| std::iter::once(&m.name).chain(&m.aliases))
            .chain(self.declarations.iter().map(|d| &d.name));
        for name in names {
            if name.is_empty() {
                return Err(ResourceError::Manifest("Empty resource name".to_string()));
            }
            if !seen.insert(name.as_str()) {
                return Err(ResourceError::DuplicateName(name.clone()));
            }
        }

        for entry in &self.media {
            let variant_file = entry
                .file
                .file_name()
                .is_some_and(|n| n.to_string_lossy().contains(VARIANT_SEPARATOR));
            if variant_file {
                return Err(ResourceError::InvalidName(format!(
                    "{}: file '{}' must name the generic asset, not a variant",
                    entry.name,
                    entry.file.display()
                )));
            }
            if matches!(&entry.target_platforms, Some(p) if p.is_empty()) {
                return Err(ResourceError::Manifest(format!(
                    "{}: target_platforms must not be empty",
                    entry.name
                )));
            }
        }

        Ok(())
    }

    /// Resource definitions in manifest order
    pub fn definitions(&self) -> Vec<ResourceDefinition> {
        self.media.iter().map(MediaEntry::to_definition).collect()
    }

    /// Pure declarations in manifest order
    pub fn declarations(&self) -> Vec<ResourceDeclaration> {
        self.declarations
            .iter()
            .map(|d| ResourceDeclaration::new(d.resource_type.clone(), d.name.clone()))
            .collect()
    }

    /// Builtin platforms plus those declared in the manifest
    pub fn platform_registry(&self) -> PlatformRegistry {
        let mut registry = PlatformRegistry::builtin();
        for (name, entry) in &self.platforms {
            let tags: Vec<&str> = entry.tags.iter().map(String::as_str).collect();
            registry.add(Platform::new(name.clone(), &tags));
        }
        registry
    }
}

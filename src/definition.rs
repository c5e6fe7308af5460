//! Resource identity model
//!
//! Declarations name a resource, definitions say where its bytes come from,
//! and objects carry the bytes once they have been generated.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::PathBuf;

/// Where a generated resource ends up
///
/// The ordering is the id ordering: packed resources are numbered first so
/// their ids match their pack index entries.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "snake_case")]
pub enum StorageClass {
    /// Stored in the runtime pbpack archive
    #[default]
    #[serde(alias = "pack", alias = "pbpack")]
    ArchivePacked,
    /// Compiled into the firmware image as a static byte array
    #[serde(alias = "builtin")]
    LinkEmbedded,
    /// Loaded at runtime from a separate filesystem area; never packaged here
    #[serde(alias = "filesystem")]
    FilesystemDeferred,
}

/// Platforms a definition applies to
///
/// Serialized as `null` for every platform or a list of names otherwise.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(
    from = "Option<BTreeSet<String>>",
    into = "Option<BTreeSet<String>>"
)]
pub enum TargetPlatforms {
    /// Every platform
    #[default]
    All,
    /// Only the named platforms
    Only(BTreeSet<String>),
}

impl From<Option<BTreeSet<String>>> for TargetPlatforms {
    fn from(names: Option<BTreeSet<String>>) -> Self {
        match names {
            Some(names) => TargetPlatforms::Only(names),
            None => TargetPlatforms::All,
        }
    }
}

impl From<TargetPlatforms> for Option<BTreeSet<String>> {
    fn from(targets: TargetPlatforms) -> Self {
        match targets {
            TargetPlatforms::All => None,
            TargetPlatforms::Only(names) => Some(names),
        }
    }
}

impl TargetPlatforms {
    /// Restrict to a list of platform names
    pub fn only<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        TargetPlatforms::Only(names.into_iter().map(Into::into).collect())
    }

    /// Check whether a platform is targeted
    pub fn includes(&self, platform: &str) -> bool {
        match self {
            TargetPlatforms::All => true,
            TargetPlatforms::Only(names) => names.contains(platform),
        }
    }
}

/// Identity-only record for a resource whose bytes live elsewhere
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceDeclaration {
    /// Resource type tag
    #[serde(rename = "type")]
    pub resource_type: String,
    /// Unique name within a build
    pub name: String,
}

impl ResourceDeclaration {
    /// Create a declaration
    pub fn new(resource_type: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            resource_type: resource_type.into(),
            name: name.into(),
        }
    }
}

/// A declaration plus everything needed to generate its bytes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceDefinition {
    /// Resource type tag
    #[serde(rename = "type")]
    pub resource_type: String,
    /// Unique name within a build
    pub name: String,
    /// Generic source path, relative to the resource root
    pub source_path: PathBuf,
    /// Which packager consumes the generated bytes
    #[serde(default)]
    pub storage_class: StorageClass,
    /// Platforms this resource is built for
    #[serde(default)]
    pub target_platforms: TargetPlatforms,
    /// Alternate names that refer to the same resource
    #[serde(default)]
    pub aliases: Vec<String>,
}

impl ResourceDefinition {
    /// Create a pack-stored definition that targets every platform
    pub fn new(
        resource_type: impl Into<String>,
        name: impl Into<String>,
        source_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            resource_type: resource_type.into(),
            name: name.into(),
            source_path: source_path.into(),
            storage_class: StorageClass::default(),
            target_platforms: TargetPlatforms::default(),
            aliases: Vec::new(),
        }
    }

    /// Set the storage class
    pub fn with_storage(mut self, storage_class: StorageClass) -> Self {
        self.storage_class = storage_class;
        self
    }

    /// Restrict to the given platforms
    pub fn with_platforms(mut self, target_platforms: TargetPlatforms) -> Self {
        self.target_platforms = target_platforms;
        self
    }

    /// Add an alias
    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.aliases.push(alias.into());
        self
    }

    /// Identity of this definition
    pub fn declaration(&self) -> ResourceDeclaration {
        ResourceDeclaration::new(self.resource_type.clone(), self.name.clone())
    }

    /// Copy of this definition with `suffix` appended to its name and aliases
    ///
    /// Used by generators that emit more than one object per source, so an
    /// alias `OLD` of `ICON` becomes `OLD_WHITE` on `ICON_WHITE`.
    pub fn derive(&self, suffix: &str, resource_type: impl Into<String>) -> Self {
        Self {
            resource_type: resource_type.into(),
            name: format!("{}{}", self.name, suffix),
            aliases: self
                .aliases
                .iter()
                .map(|alias| format!("{}{}", alias, suffix))
                .collect(),
            ..self.clone()
        }
    }
}

/// A generated resource: its definition and fully materialized bytes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceObject {
    /// Definition the bytes were generated from
    pub definition: ResourceDefinition,
    data: Vec<u8>,
}

impl ResourceObject {
    /// Wrap generated bytes
    pub fn new(definition: ResourceDefinition, data: Vec<u8>) -> Self {
        Self { definition, data }
    }

    /// Resource name
    pub fn name(&self) -> &str {
        &self.definition.name
    }

    /// Generated bytes
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Storage class of the underlying definition
    pub fn storage_class(&self) -> StorageClass {
        self.definition.storage_class
    }
}

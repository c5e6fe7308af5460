//! Resource ball: the ordered aggregate of a build variant's resources
//!
//! Order is significant. Objects are grouped by storage class with packed
//! resources first, keeping definition order within each group, and pure
//! declarations follow them. Resource ids are positions in that order, so a
//! packed resource's id is also its pack index id and the same definition
//! list always yields the same ids.
//!
//! The ball is persisted as JSON between the aggregation step and the
//! packagers. That file is a build-local artifact only.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::Platform;
use crate::definition::{ResourceDeclaration, ResourceDefinition, ResourceObject, StorageClass};
use crate::error::{ResourceError, ResourceResult};
use crate::generator::GeneratorRegistry;
use crate::variant::VariantResolver;

/// Ordered collection of generated resources and pure declarations
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceBall {
    /// Generated resources, packed first, in definition order within a class
    pub resource_objects: Vec<ResourceObject>,
    /// Resources that exist by name only
    pub resource_declarations: Vec<ResourceDeclaration>,
}

impl ResourceBall {
    /// Assemble a ball, rejecting duplicate names
    ///
    /// Objects are stably reordered by storage class.
    pub fn new(
        mut resource_objects: Vec<ResourceObject>,
        resource_declarations: Vec<ResourceDeclaration>,
    ) -> ResourceResult<Self> {
        resource_objects.sort_by_key(ResourceObject::storage_class);
        let ball = Self {
            resource_objects,
            resource_declarations,
        };
        ball.check_unique_names()?;
        Ok(ball)
    }

    /// Fan-in step: combine per-definition generation results
    ///
    /// Every result must be `Ok`; otherwise the whole variant fails and each
    /// failure is reported against its own resource.
    pub fn collect<I>(results: I, declarations: Vec<ResourceDeclaration>) -> ResourceResult<Self>
    where
        I: IntoIterator<Item = (String, ResourceResult<Vec<ResourceObject>>)>,
    {
        let mut objects = Vec::new();
        let mut failures = Vec::new();

        for (name, result) in results {
            match result {
                Ok(generated) => objects.extend(generated),
                Err(e) => {
                    tracing::warn!("Resource {} failed: {}", name, e);
                    failures.push(format!("{}: {}", name, e));
                }
            }
        }

        if !failures.is_empty() {
            return Err(ResourceError::MissingResources { failures });
        }

        Self::new(objects, declarations)
    }

    fn check_unique_names(&self) -> ResourceResult<()> {
        let mut seen = HashSet::new();
        let names = self
            .resource_objects
            .iter()
            .flat_map(|o| std::iter::once(&o.definition.name).chain(&o.definition.aliases))
            .chain(self.resource_declarations.iter().map(|d| &d.name));
        for name in names {
            if !seen.insert(name.as_str()) {
                return Err(ResourceError::DuplicateName(name.clone()));
            }
        }
        Ok(())
    }

    /// Total number of declared resources (objects plus declarations)
    pub fn len(&self) -> usize {
        self.resource_objects.len() + self.resource_declarations.len()
    }

    /// Check if the ball is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Objects with a given storage class, in order
    pub fn objects_with_storage(
        &self,
        storage_class: StorageClass,
    ) -> impl Iterator<Item = &ResourceObject> {
        self.resource_objects
            .iter()
            .filter(move |o| o.storage_class() == storage_class)
    }

    /// Identity of every resource in id order
    pub fn declarations(&self) -> Vec<ResourceDeclaration> {
        self.resource_objects
            .iter()
            .map(|o| o.definition.declaration())
            .chain(self.resource_declarations.iter().cloned())
            .collect()
    }

    /// `(name, id)` for every resource and alias; ids are 1-based positions
    pub fn resource_ids(&self) -> Vec<(String, u32)> {
        let mut ids = Vec::new();
        let mut next = 1u32;
        for object in &self.resource_objects {
            ids.push((object.definition.name.clone(), next));
            for alias in &object.definition.aliases {
                ids.push((alias.clone(), next));
            }
            next += 1;
        }
        for declaration in &self.resource_declarations {
            ids.push((declaration.name.clone(), next));
            next += 1;
        }
        ids
    }

    /// Id assigned to a name or alias
    pub fn id_of(&self, name: &str) -> Option<u32> {
        self.resource_ids()
            .into_iter()
            .find(|(n, _)| n == name)
            .map(|(_, id)| id)
    }

    /// Content hash (BLAKE3, 16 hex chars) over names and bytes in order
    pub fn content_hash(&self) -> String {
        let mut hasher = blake3::Hasher::new();
        for object in &self.resource_objects {
            hasher.update(object.name().as_bytes());
            hasher.update(&[0]);
            hasher.update(&(object.data().len() as u64).to_le_bytes());
            hasher.update(object.data());
        }
        for declaration in &self.resource_declarations {
            hasher.update(declaration.name.as_bytes());
            hasher.update(&[0]);
        }
        let hash = hasher.finalize().to_hex();
        hash.as_str()[..16].to_string()
    }

    /// Persist the ball as JSON
    pub fn save(&self, path: &Path) -> ResourceResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_vec(self)?;
        fs::write(path, content)?;
        tracing::debug!("Resource ball written to {}", path.display());
        Ok(())
    }

    /// Load a persisted ball
    pub fn load(path: &Path) -> ResourceResult<Self> {
        let content = fs::read(path)?;
        let ball: Self = serde_json::from_slice(&content)?;
        Self::new(ball.resource_objects, ball.resource_declarations)
    }
}

/// Resolves and generates definitions for one platform
#[derive(Debug)]
pub struct Aggregator<'a> {
    platform: &'a Platform,
    registry: &'a GeneratorRegistry,
    resolver: VariantResolver,
}

impl<'a> Aggregator<'a> {
    /// Create an aggregator for a platform and resource root
    pub fn new(
        platform: &'a Platform,
        registry: &'a GeneratorRegistry,
        resource_root: impl AsRef<Path>,
    ) -> Self {
        Self {
            platform,
            registry,
            resolver: VariantResolver::new(resource_root),
        }
    }

    /// Target platform
    pub fn platform(&self) -> &Platform {
        self.platform
    }

    /// Check whether a definition applies to this platform
    pub fn applies(&self, definition: &ResourceDefinition) -> bool {
        definition.target_platforms.includes(&self.platform.name)
    }

    /// Resolve the concrete source file for a definition
    pub fn resolve(&self, definition: &ResourceDefinition) -> ResourceResult<PathBuf> {
        let relative = self
            .resolver
            .resolve(&definition.source_path, self.platform)?;
        Ok(self.resolver.root().join(relative))
    }

    /// Resolve and generate a single definition
    ///
    /// Independent of every other definition, so callers may run it for
    /// several definitions concurrently.
    pub fn generate_one(
        &self,
        definition: &ResourceDefinition,
    ) -> ResourceResult<Vec<ResourceObject>> {
        let source = self.resolve(definition)?;
        let objects = self.registry.generate(definition, &source, self.platform)?;
        for object in &objects {
            tracing::debug!(
                "Generated {} ({} bytes) from {}",
                object.name(),
                object.data().len(),
                source.display()
            );
        }
        Ok(objects)
    }

    /// Build the ball for this platform
    ///
    /// Definitions that do not target the platform are skipped entirely.
    pub fn build(
        &self,
        definitions: &[ResourceDefinition],
        declarations: &[ResourceDeclaration],
    ) -> ResourceResult<ResourceBall> {
        let results = definitions
            .iter()
            .filter(|d| {
                let applies = self.applies(d);
                if !applies {
                    tracing::debug!("Skipping {} on {}", d.name, self.platform.name);
                }
                applies
            })
            .map(|d| (d.name.clone(), self.generate_one(d)));

        let ball = ResourceBall::collect(results, declarations.to_vec())?;
        tracing::info!(
            "Resource ball for {}: {} objects, {} declarations, hash={}",
            self.platform.name,
            ball.resource_objects.len(),
            ball.resource_declarations.len(),
            ball.content_hash()
        );
        Ok(ball)
    }
}

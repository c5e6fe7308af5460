//! End-to-end resource build for one platform
//!
//! define -> resolve -> generate -> aggregate -> serialize. The aggregate is
//! persisted before packaging so the pack and builtin outputs are produced
//! from exactly the same ball.

use std::fs;
use std::path::{Path, PathBuf};

use crate::ball::{Aggregator, ResourceBall};
use crate::config::{Platform, PipelineConfig};
use crate::definition::StorageClass;
use crate::embed::{embed, id_header};
use crate::error::ResourceResult;
use crate::generator::{GeneratorRegistry, ResourceGenerator};
use crate::manifest::Manifest;
use crate::metrics::BuildMetrics;
use crate::pack::ResourcePack;

/// Result of a pipeline run
#[derive(Debug)]
pub struct BuildOutput {
    /// Persisted resource ball
    pub ball_path: PathBuf,
    /// Written pbpack
    pub pack_path: PathBuf,
    /// Written builtin table
    pub builtin_path: PathBuf,
    /// Written id header
    pub id_header_path: PathBuf,
    /// Resources in the pack
    pub packed_count: usize,
    /// Resources in the builtin table
    pub builtin_count: usize,
    /// Content hash of the ball
    pub content_hash: String,
}

/// Resource build pipeline
pub struct Pipeline {
    config: PipelineConfig,
    manifest: Manifest,
    registry: GeneratorRegistry,
}

impl Pipeline {
    /// Create a pipeline with the default generators
    pub fn new(config: PipelineConfig, manifest: Manifest) -> Self {
        Self {
            config,
            manifest,
            registry: GeneratorRegistry::with_defaults(),
        }
    }

    /// Create a pipeline from a manifest file
    pub fn from_manifest_file(config: PipelineConfig, path: &Path) -> ResourceResult<Self> {
        let manifest = Manifest::from_file(path)?;
        Ok(Self::new(config, manifest))
    }

    /// Register an additional generator
    pub fn with_generator(
        mut self,
        resource_type: impl Into<String>,
        generator: impl ResourceGenerator + 'static,
    ) -> Self {
        self.registry.register(resource_type, generator);
        self
    }

    /// Pipeline configuration
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    fn platform(&self) -> ResourceResult<Platform> {
        Ok(self
            .manifest
            .platform_registry()
            .get(&self.config.platform)?
            .clone())
    }

    /// Resolve, generate and aggregate every manifest resource
    pub fn build_ball(&self) -> ResourceResult<ResourceBall> {
        self.manifest.validate()?;
        let platform = self.platform()?;
        let aggregator = Aggregator::new(&platform, &self.registry, &self.config.resource_root);
        aggregator.build(&self.manifest.definitions(), &self.manifest.declarations())
    }

    /// Run the full pipeline and write every output
    pub fn run(&self) -> ResourceResult<BuildOutput> {
        let mut metrics = BuildMetrics::new();

        let ball = metrics.time_phase("aggregate", || self.build_ball())?;
        let ball_path = self.config.ball_path();
        metrics.time_phase("persist", || ball.save(&ball_path))?;

        // packagers only ever see the persisted ball
        let ball = ResourceBall::load(&ball_path)?;
        metrics.resource_count = ball.resource_objects.len();

        let pack = metrics.time_phase("pack", || {
            ResourcePack::from_ball(&ball, self.config.pack_version)
        })?;
        let pack_path = self.config.pack_path();
        pack.write(&pack_path)?;
        metrics.pack_bytes = pack.encoded_len();

        let builtin_path = self.config.builtin_path();
        let id_header_path = self.config.id_header_path();
        metrics.time_phase("embed", || -> ResourceResult<()> {
            fs::write(&builtin_path, embed(&ball))?;
            fs::write(&id_header_path, id_header(&ball))?;
            Ok(())
        })?;

        metrics.log_report();

        Ok(BuildOutput {
            ball_path,
            pack_path,
            builtin_path,
            id_header_path,
            packed_count: pack.len(),
            builtin_count: ball
                .objects_with_storage(StorageClass::LinkEmbedded)
                .count(),
            content_hash: ball.content_hash(),
        })
    }
}

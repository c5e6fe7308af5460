//! respack - Firmware Resource Build Pipeline
//!
//! This crate turns a declarative list of resources (images, raw blobs,
//! language packs) into the binary artifacts a firmware image consumes:
//!
//! - a **pbpack** archive read by the runtime resource loader
//! - a **builtin table** of C byte arrays linked into the firmware
//! - a **resource id header** shared by both
//!
//! # Pipeline
//!
//! 1. **Define**: [`Manifest`] lists [`ResourceDefinition`]s and pure
//!    [`ResourceDeclaration`]s
//! 2. **Resolve**: [`VariantResolver`] picks the most specific
//!    `name~tag~tag.ext` file for the target [`Platform`]
//! 3. **Generate**: [`GeneratorRegistry`] converts the file into bytes
//! 4. **Aggregate**: [`Aggregator`] collects everything into a
//!    [`ResourceBall`], packed resources first so their ids match the pack
//! 5. **Serialize**: [`ResourcePack`] and [`embed()`] consume the ball
//!
//! # Quick Start
//!
//! ```no_run
//! use respack::{Manifest, Pipeline, PipelineConfig};
//!
//! # fn main() -> respack::ResourceResult<()> {
//! let manifest = Manifest::from_file("resources.toml")?;
//! let config = PipelineConfig::new("basalt")
//!     .with_resource_root("resources")
//!     .with_output_dir("build/basalt");
//! let output = Pipeline::new(config, manifest).run()?;
//! println!("{} resources packed", output.packed_count);
//! # Ok(())
//! # }
//! ```
//!
//! # Pack Format
//!
//! ```text
//! [Header]
//!   - Resource count: u32 LE
//!   - Version tag: 16 bytes
//! [Index] count * (id: u32, offset: u32, size: u32, crc: u32)
//! [Blob]
//! ```

mod ball;
pub mod config;
pub mod crc;
mod definition;
pub mod embed;
mod error;
pub mod generator;
mod manifest;
mod metrics;
pub mod pack;
mod pipeline;
pub mod tools;
pub mod variant;

// Re-export public API
pub use ball::{Aggregator, ResourceBall};
pub use config::{ColorMode, PipelineConfig, Platform, PlatformRegistry};
pub use crc::{crc32, crc32_with_seed};
pub use definition::{
    ResourceDeclaration, ResourceDefinition, ResourceObject, StorageClass, TargetPlatforms,
};
pub use embed::{embed, id_header};
pub use error::{ResourceError, ResourceResult};
pub use generator::{GeneratorRegistry, ResourceGenerator};
pub use manifest::{DeclarationEntry, Manifest, MediaEntry, PlatformEntry};
pub use metrics::BuildMetrics;
pub use pack::{deserialize, serialize, PackEntry, PackIndex, ResourcePack, MAX_RESOURCES};
pub use pipeline::{BuildOutput, Pipeline};
pub use variant::VariantResolver;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
